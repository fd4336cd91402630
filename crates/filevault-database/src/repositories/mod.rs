//! PostgreSQL repositories, one per table family.

pub mod file;
pub mod permission;

pub use file::FileRepository;
pub use permission::PermissionRepository;
