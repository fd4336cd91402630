//! File upload: write the blob first, then commit the metadata.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use filevault_core::config::StorageConfig;
use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::traits::storage::{BlobStore, ByteStream, DEFAULT_CONTENT_TYPE};
use filevault_database::FileMetadataStore;
use filevault_entity::file::{FIRST_VERSION, File, NewFile, NewFileVersion, normalize_name};

use crate::context::RequestContext;

/// Creates new files from uploaded content.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Metadata store.
    metadata: Arc<dyn FileMetadataStore>,
    /// Blob store.
    blobs: Arc<dyn BlobStore>,
    /// Largest accepted upload, in bytes.
    max_upload_size_bytes: u64,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        metadata: Arc<dyn FileMetadataStore>,
        blobs: Arc<dyn BlobStore>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            metadata,
            blobs,
            max_upload_size_bytes: config.max_upload_size_bytes,
        }
    }

    /// Largest accepted upload, in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_bytes
    }

    /// Store `content` (exactly `size` bytes) as version 1 of a new file
    /// owned by the caller.
    ///
    /// The blob is written before any metadata exists, so an aborted or
    /// failed transfer never leaves a file row without content. If the
    /// metadata insert fails the blob is removed again.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        name: &str,
        content_type: Option<&str>,
        content: ByteStream,
        size: u64,
    ) -> AppResult<File> {
        let name = normalize_name(name)?;
        if size > self.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.max_upload_size_bytes
            )));
        }
        let size_bytes = i64::try_from(size)
            .map_err(|_| AppError::validation("File size is out of range"))?;
        let content_type = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        let file_id = Uuid::new_v4();
        let version = NewFileVersion::new(file_id, FIRST_VERSION, size_bytes, content_type);
        let storage_key = version.storage_key.clone();

        self.blobs
            .put(&storage_key, content, size, content_type)
            .await?;

        let new_file = NewFile {
            id: file_id,
            owner_id: ctx.user_id,
            name,
        };
        let (file, _) = match self.metadata.create_file_with_version(new_file, version).await {
            Ok(created) => created,
            Err(e) => {
                super::discard_blob(self.blobs.as_ref(), &storage_key, &e).await;
                return Err(e);
            }
        };

        info!(
            user_id = ctx.user_id,
            file_id = %file.id,
            name = %file.name,
            size = size_bytes,
            content_type,
            "File uploaded"
        );

        Ok(file)
    }

    /// Upload an in-memory payload.
    pub async fn upload_bytes(
        &self,
        ctx: &RequestContext,
        name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> AppResult<File> {
        let size = data.len() as u64;
        let stream: ByteStream = Box::pin(futures::stream::once(async move { Ok(data) }));
        self.upload(ctx, name, content_type, stream, size).await
    }
}
