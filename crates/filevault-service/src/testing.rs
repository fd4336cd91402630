//! Test fixtures: in-memory stores wrapped in switchable fault injectors.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use filevault_auth::AccessChecker;
use filevault_core::config::StorageConfig;
use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::traits::storage::{BlobStore, ByteStream};
use filevault_database::{FileMetadataStore, InMemoryFileStore};
use filevault_entity::file::{File, FileVersion, NewFile, NewFileVersion};
use filevault_entity::permission::{FilePermission, PermissionLevel};
use filevault_storage::MemoryBlobStore;

use crate::file::{DownloadService, FileService, UploadService, VersionService};
use crate::permission::PermissionService;

#[derive(Debug, Default)]
pub(crate) struct Faults {
    blob_put: AtomicBool,
    blob_delete: AtomicBool,
    metadata_writes: AtomicBool,
    concurrent_append: AtomicBool,
}

impl Faults {
    pub fn fail_blob_put(&self) {
        self.blob_put.store(true, Ordering::SeqCst);
    }

    pub fn fail_blob_delete(&self) {
        self.blob_delete.store(true, Ordering::SeqCst);
    }

    pub fn fail_metadata_writes(&self) {
        self.metadata_writes.store(true, Ordering::SeqCst);
    }

    /// Make the next `append_version` lose a race against another writer.
    pub fn race_next_append(&self) {
        self.concurrent_append.store(true, Ordering::SeqCst);
    }

    fn metadata_write(&self) -> AppResult<()> {
        if self.metadata_writes.load(Ordering::SeqCst) {
            Err(AppError::new(ErrorKind::Database, "injected metadata failure"))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug)]
pub(crate) struct FaultyMetadataStore {
    inner: InMemoryFileStore,
    faults: Arc<Faults>,
}

#[async_trait]
impl FileMetadataStore for FaultyMetadataStore {
    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn get_file(&self, file_id: Uuid) -> AppResult<Option<File>> {
        self.inner.get_file(file_id).await
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<File>> {
        self.inner.list_by_owner(owner_id).await
    }

    async fn list_shared(&self, user_id: i64) -> AppResult<Vec<File>> {
        self.inner.list_shared(user_id).await
    }

    async fn get_version(
        &self,
        file_id: Uuid,
        version_number: i32,
    ) -> AppResult<Option<FileVersion>> {
        self.inner.get_version(file_id, version_number).await
    }

    async fn get_latest_version(&self, file_id: Uuid) -> AppResult<Option<FileVersion>> {
        self.inner.get_latest_version(file_id).await
    }

    async fn list_versions(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>> {
        self.inner.list_versions(file_id).await
    }

    async fn check_permission(
        &self,
        file_id: Uuid,
        user_id: i64,
    ) -> AppResult<Option<PermissionLevel>> {
        self.inner.check_permission(file_id, user_id).await
    }

    async fn list_permissions(&self, file_id: Uuid) -> AppResult<Vec<FilePermission>> {
        self.inner.list_permissions(file_id).await
    }

    async fn create_file_with_version(
        &self,
        file: NewFile,
        version: NewFileVersion,
    ) -> AppResult<(File, FileVersion)> {
        self.faults.metadata_write()?;
        self.inner.create_file_with_version(file, version).await
    }

    async fn append_version(
        &self,
        expected_current: i32,
        version: NewFileVersion,
    ) -> AppResult<(File, FileVersion)> {
        self.faults.metadata_write()?;
        if self.faults.concurrent_append.swap(false, Ordering::SeqCst) {
            let rival = NewFileVersion::new(
                version.file_id,
                version.version_number,
                version.size_bytes,
                version.content_type.clone(),
            );
            self.inner.append_version(expected_current, rival).await?;
        }
        self.inner.append_version(expected_current, version).await
    }

    async fn rename_file(&self, file_id: Uuid, name: &str) -> AppResult<Option<File>> {
        self.faults.metadata_write()?;
        self.inner.rename_file(file_id, name).await
    }

    async fn delete_file_cascade(&self, file_id: Uuid) -> AppResult<Vec<String>> {
        self.faults.metadata_write()?;
        self.inner.delete_file_cascade(file_id).await
    }

    async fn replace_permissions(
        &self,
        file_id: Uuid,
        permissions: &[FilePermission],
    ) -> AppResult<()> {
        self.faults.metadata_write()?;
        self.inner.replace_permissions(file_id, permissions).await
    }
}

#[derive(Debug)]
pub(crate) struct FaultyBlobStore {
    inner: MemoryBlobStore,
    faults: Arc<Faults>,
}

#[async_trait]
impl BlobStore for FaultyBlobStore {
    fn provider_type(&self) -> &str {
        "faulty-memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn put(
        &self,
        key: &str,
        stream: ByteStream,
        size: u64,
        content_type: &str,
    ) -> AppResult<u64> {
        if self.faults.blob_put.load(Ordering::SeqCst) {
            return Err(AppError::storage("injected put failure"));
        }
        self.inner.put(key, stream, size, content_type).await
    }

    async fn get(&self, key: &str) -> AppResult<ByteStream> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        if self.faults.blob_delete.load(Ordering::SeqCst) {
            return Err(AppError::storage("injected delete failure"));
        }
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }
}

/// Every service wired over the same fault-injecting in-memory stores.
pub(crate) struct Fixture {
    pub metadata: Arc<dyn FileMetadataStore>,
    pub raw_blobs: MemoryBlobStore,
    pub faults: Arc<Faults>,
    pub files: FileService,
    pub upload: UploadService,
    pub download: DownloadService,
    pub versions: VersionService,
    pub permissions: PermissionService,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(StorageConfig::default())
    }

    pub fn with_max_upload(max_upload_size_bytes: u64) -> Self {
        Self::with_config(StorageConfig {
            max_upload_size_bytes,
            ..StorageConfig::default()
        })
    }

    pub fn with_config(config: StorageConfig) -> Self {
        let faults = Arc::new(Faults::default());
        let raw_blobs = MemoryBlobStore::new();
        let metadata: Arc<dyn FileMetadataStore> = Arc::new(FaultyMetadataStore {
            inner: InMemoryFileStore::new(),
            faults: faults.clone(),
        });
        let blobs: Arc<dyn BlobStore> = Arc::new(FaultyBlobStore {
            inner: raw_blobs.clone(),
            faults: faults.clone(),
        });
        let access = Arc::new(AccessChecker::new(metadata.clone()));

        Self {
            files: FileService::new(metadata.clone(), blobs.clone(), access.clone()),
            upload: UploadService::new(metadata.clone(), blobs.clone(), &config),
            download: DownloadService::new(metadata.clone(), blobs.clone(), access.clone(), &config),
            versions: VersionService::new(metadata.clone(), blobs.clone(), access.clone()),
            permissions: PermissionService::new(metadata.clone(), access),
            metadata,
            raw_blobs,
            faults,
        }
    }

    pub async fn blob_keys(&self) -> Vec<String> {
        self.raw_blobs.keys().await
    }
}
