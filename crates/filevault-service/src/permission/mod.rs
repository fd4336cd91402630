//! Sharing: per-user grants on files.

pub mod service;

pub use service::PermissionService;
