//! Blob store construction from configuration.

use std::sync::Arc;

use tracing::info;

use filevault_core::config::{StorageConfig, StorageProviderKind};
use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::traits::storage::BlobStore;

use crate::providers::{LocalBlobStore, MemoryBlobStore};

/// Build the blob store selected by `config.provider`.
///
/// Selecting `s3` in a build without the `s3` feature is a configuration
/// error rather than a silent fallback.
pub async fn build_blob_store(config: &StorageConfig) -> AppResult<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.provider {
        StorageProviderKind::Local => {
            Arc::new(LocalBlobStore::new(&config.local.root_path).await?)
        }
        StorageProviderKind::Memory => Arc::new(MemoryBlobStore::new()),
        #[cfg(feature = "s3")]
        StorageProviderKind::S3 => Arc::new(crate::providers::S3BlobStore::new(&config.s3).await?),
        #[cfg(not(feature = "s3"))]
        StorageProviderKind::S3 => {
            return Err(AppError::configuration(
                "S3 storage requested but this build lacks the `s3` feature",
            ));
        }
    };

    if !store.health_check().await? {
        return Err(AppError::configuration(format!(
            "Blob store '{}' failed its startup health check",
            store.provider_type()
        )));
    }

    info!(provider = store.provider_type(), "Blob store ready");
    Ok(store)
}
