//! # filevault-storage
//!
//! Blob store implementations for FileVault. Supports the local
//! filesystem, process memory, and S3-compatible object stores (behind
//! the `s3` feature).

pub mod manager;
pub mod providers;
pub mod transfer;

pub use manager::build_blob_store;
pub use providers::{LocalBlobStore, MemoryBlobStore};
#[cfg(feature = "s3")]
pub use providers::S3BlobStore;
