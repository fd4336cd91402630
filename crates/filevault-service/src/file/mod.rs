//! File services: listing and metadata, upload, download, and versioning.

pub mod download;
pub mod service;
pub mod upload;
pub mod version;

pub use download::{DownloadResult, DownloadService};
pub use service::{FileService, FileSummary};
pub use upload::UploadService;
pub use version::{RevertOutcome, VersionService};

use tracing::{error, warn};
use uuid::Uuid;

use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::traits::storage::BlobStore;
use filevault_database::FileMetadataStore;
use filevault_entity::file::File;

/// Load a file row, turning a missing row into `NotFound`.
pub(crate) async fn find_file(store: &dyn FileMetadataStore, file_id: Uuid) -> AppResult<File> {
    store
        .get_file(file_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
}

/// Best-effort removal of a blob written by a step that later failed.
///
/// A failed compensation is logged and swallowed; the caller returns the
/// original error.
pub(crate) async fn discard_blob(blobs: &dyn BlobStore, key: &str, cause: &AppError) {
    warn!(storage_key = key, error = %cause, "Removing blob after failed metadata write");
    if let Err(e) = blobs.delete(key).await {
        error!(storage_key = key, error = %e, "Compensating blob delete failed; blob is orphaned");
    }
}
