//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use filevault_auth::{AccessChecker, IdentityResolver};
use filevault_core::config::AppConfig;
use filevault_core::traits::storage::BlobStore;
use filevault_database::FileMetadataStore;
use filevault_service::{
    DownloadService, FileService, PermissionService, UploadService, VersionService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// File, version, and permission metadata
    pub metadata: Arc<dyn FileMetadataStore>,
    /// Blob content store
    pub blobs: Arc<dyn BlobStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer token to user ID resolver
    pub identity: Arc<dyn IdentityResolver>,

    // ── Services ─────────────────────────────────────────────
    /// Listing, info, rename, delete
    pub file_service: Arc<FileService>,
    /// Upload service
    pub upload_service: Arc<UploadService>,
    /// Download service
    pub download_service: Arc<DownloadService>,
    /// Version history and revert
    pub version_service: Arc<VersionService>,
    /// Permission management service
    pub permission_service: Arc<PermissionService>,
}

impl AppState {
    /// Wire every service over the given stores and identity resolver.
    pub fn new(
        config: AppConfig,
        metadata: Arc<dyn FileMetadataStore>,
        blobs: Arc<dyn BlobStore>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        let access = Arc::new(AccessChecker::new(Arc::clone(&metadata)));

        let file_service = Arc::new(FileService::new(
            Arc::clone(&metadata),
            Arc::clone(&blobs),
            Arc::clone(&access),
        ));
        let upload_service = Arc::new(UploadService::new(
            Arc::clone(&metadata),
            Arc::clone(&blobs),
            &config.storage,
        ));
        let download_service = Arc::new(DownloadService::new(
            Arc::clone(&metadata),
            Arc::clone(&blobs),
            Arc::clone(&access),
            &config.storage,
        ));
        let version_service = Arc::new(VersionService::new(
            Arc::clone(&metadata),
            Arc::clone(&blobs),
            Arc::clone(&access),
        ));
        let permission_service = Arc::new(PermissionService::new(
            Arc::clone(&metadata),
            Arc::clone(&access),
        ));

        Self {
            config: Arc::new(config),
            metadata,
            blobs,
            identity,
            file_service,
            upload_service,
            download_service,
            version_service,
            permission_service,
        }
    }
}
