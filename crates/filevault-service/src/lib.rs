//! # filevault-service
//!
//! The file orchestration layer. Each service coordinates the metadata
//! store, the blob store, and access control to implement one group of
//! use cases, and holds no state of its own beyond its injected
//! dependencies.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. Every operation takes the
//! caller's [`RequestContext`] explicitly.

pub mod context;
pub mod file;
pub mod permission;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
pub use file::{
    DownloadResult, DownloadService, FileService, FileSummary, RevertOutcome, UploadService,
    VersionService,
};
pub use permission::PermissionService;
