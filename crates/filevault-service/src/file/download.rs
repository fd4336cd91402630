//! File download: access-checked, chunked streaming of version content.

use std::sync::Arc;

use tracing::{debug, error};
use uuid::Uuid;

use filevault_auth::AccessChecker;
use filevault_core::config::StorageConfig;
use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::traits::storage::{BlobStore, ByteStream};
use filevault_database::FileMetadataStore;
use filevault_entity::file::{File, FileVersion};
use filevault_storage::transfer::rechunk;

use crate::context::RequestContext;

/// Streams file content to callers with read access.
#[derive(Debug, Clone)]
pub struct DownloadService {
    /// Metadata store.
    metadata: Arc<dyn FileMetadataStore>,
    /// Blob store.
    blobs: Arc<dyn BlobStore>,
    /// Access checker.
    access: Arc<AccessChecker>,
    /// Upper bound on emitted chunk size.
    chunk_size: usize,
}

/// A file version opened for reading.
pub struct DownloadResult {
    /// File metadata.
    pub file: File,
    /// The version being streamed.
    pub version: FileVersion,
    /// Lazy content stream; each chunk is at most the configured chunk size.
    pub stream: ByteStream,
}

impl std::fmt::Debug for DownloadResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadResult")
            .field("file", &self.file)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(
        metadata: Arc<dyn FileMetadataStore>,
        blobs: Arc<dyn BlobStore>,
        access: Arc<AccessChecker>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            metadata,
            blobs,
            access,
            chunk_size: config.download_chunk_size_bytes,
        }
    }

    /// Open the latest version of a file.
    pub async fn download(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<DownloadResult> {
        let file = super::find_file(self.metadata.as_ref(), file_id).await?;
        self.access.require_read(&file, ctx.user_id).await?;

        let version = self
            .metadata
            .get_latest_version(file_id)
            .await?
            .ok_or_else(|| {
                error!(file_id = %file_id, "File has no versions");
                AppError::not_found(format!("File {file_id} has no versions"))
            })?;

        self.open(file, version).await
    }

    /// Open a specific historical version of a file.
    pub async fn download_version(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        version_number: i32,
    ) -> AppResult<DownloadResult> {
        let file = super::find_file(self.metadata.as_ref(), file_id).await?;
        self.access.require_read(&file, ctx.user_id).await?;

        let version = self
            .metadata
            .get_version(file_id, version_number)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Version {version_number} of file {file_id} not found"))
            })?;

        self.open(file, version).await
    }

    async fn open(&self, file: File, version: FileVersion) -> AppResult<DownloadResult> {
        let stream = self.blobs.get(&version.storage_key).await.map_err(|e| {
            if e.is_not_found() {
                error!(
                    file_id = %file.id,
                    version = version.version_number,
                    storage_key = %version.storage_key,
                    "Version row points at a missing blob"
                );
                e.into_internal()
            } else {
                e
            }
        })?;

        debug!(
            file_id = %file.id,
            version = version.version_number,
            size = version.size_bytes,
            "Streaming file content"
        );

        Ok(DownloadResult {
            file,
            version,
            stream: rechunk(stream, self.chunk_size),
        })
    }
}
