//! Per-user file sharing grants.

pub mod level;
pub mod model;

pub use level::PermissionLevel;
pub use model::{FilePermission, PermissionGrant};
