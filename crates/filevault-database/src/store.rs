//! The metadata store contract and its PostgreSQL implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_entity::file::{File, FileVersion, NewFile, NewFileVersion};
use filevault_entity::permission::{FilePermission, PermissionLevel};

use crate::repositories::{FileRepository, PermissionRepository};

/// Durable storage of `File`, `FileVersion`, and `FilePermission` records.
///
/// Lookups return `Ok(None)` or an empty list when nothing matches; an
/// `Err` always means the store itself failed. Failures carry
/// `ErrorKind::Database` (or `NotFound`/`Conflict` where documented) and
/// are never retried here.
#[async_trait]
pub trait FileMetadataStore: Send + Sync + std::fmt::Debug + 'static {
    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Find a file by ID.
    async fn get_file(&self, file_id: Uuid) -> AppResult<Option<File>>;

    /// Files owned by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<File>>;

    /// Files on which `user_id` holds a grant of read or higher, newest first.
    async fn list_shared(&self, user_id: i64) -> AppResult<Vec<File>>;

    async fn get_version(
        &self,
        file_id: Uuid,
        version_number: i32,
    ) -> AppResult<Option<FileVersion>>;

    /// The version with the highest number for this file.
    async fn get_latest_version(&self, file_id: Uuid) -> AppResult<Option<FileVersion>>;

    /// All versions of a file, highest version number first.
    async fn list_versions(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>>;

    /// The grant `user_id` holds on `file_id`, if any.
    async fn check_permission(
        &self,
        file_id: Uuid,
        user_id: i64,
    ) -> AppResult<Option<PermissionLevel>>;

    /// All grants on a file, ordered by user ID.
    async fn list_permissions(&self, file_id: Uuid) -> AppResult<Vec<FilePermission>>;

    /// Insert a file and its first version in one transaction.
    async fn create_file_with_version(
        &self,
        file: NewFile,
        version: NewFileVersion,
    ) -> AppResult<(File, FileVersion)>;

    /// Insert `version` and advance the file's current version to it, in one
    /// transaction.
    ///
    /// Fails with `Conflict` when the file's current version is no longer
    /// `expected_current`, and with `NotFound` when the file is gone.
    async fn append_version(
        &self,
        expected_current: i32,
        version: NewFileVersion,
    ) -> AppResult<(File, FileVersion)>;

    /// Change a file's display name. Returns `None` if the file does not exist.
    async fn rename_file(&self, file_id: Uuid, name: &str) -> AppResult<Option<File>>;

    /// Delete a file's grants, versions, and row in one transaction.
    ///
    /// Returns the storage keys of the deleted versions so the caller can
    /// remove the blobs.
    async fn delete_file_cascade(&self, file_id: Uuid) -> AppResult<Vec<String>>;

    /// Replace every grant on a file with `permissions`, in one transaction.
    async fn replace_permissions(
        &self,
        file_id: Uuid,
        permissions: &[FilePermission],
    ) -> AppResult<()>;
}

/// [`FileMetadataStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgMetadataStore {
    pool: PgPool,
    files: FileRepository,
    permissions: PermissionRepository,
}

impl PgMetadataStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            files: FileRepository::new(pool.clone()),
            permissions: PermissionRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl FileMetadataStore for PgMetadataStore {
    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    async fn get_file(&self, file_id: Uuid) -> AppResult<Option<File>> {
        self.files.find_by_id(file_id).await
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<File>> {
        self.files.find_by_owner(owner_id).await
    }

    async fn list_shared(&self, user_id: i64) -> AppResult<Vec<File>> {
        self.permissions.find_shared_files(user_id).await
    }

    async fn get_version(
        &self,
        file_id: Uuid,
        version_number: i32,
    ) -> AppResult<Option<FileVersion>> {
        self.files.find_version(file_id, version_number).await
    }

    async fn get_latest_version(&self, file_id: Uuid) -> AppResult<Option<FileVersion>> {
        self.files.find_latest_version(file_id).await
    }

    async fn list_versions(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>> {
        self.files.find_versions(file_id).await
    }

    async fn check_permission(
        &self,
        file_id: Uuid,
        user_id: i64,
    ) -> AppResult<Option<PermissionLevel>> {
        self.permissions.find_level(file_id, user_id).await
    }

    async fn list_permissions(&self, file_id: Uuid) -> AppResult<Vec<FilePermission>> {
        self.permissions.find_for_file(file_id).await
    }

    async fn create_file_with_version(
        &self,
        file: NewFile,
        version: NewFileVersion,
    ) -> AppResult<(File, FileVersion)> {
        self.files.create_with_version(&file, &version).await
    }

    async fn append_version(
        &self,
        expected_current: i32,
        version: NewFileVersion,
    ) -> AppResult<(File, FileVersion)> {
        self.files.append_version(expected_current, &version).await
    }

    async fn rename_file(&self, file_id: Uuid, name: &str) -> AppResult<Option<File>> {
        self.files.rename(file_id, name).await
    }

    async fn delete_file_cascade(&self, file_id: Uuid) -> AppResult<Vec<String>> {
        self.files.delete_cascade(file_id).await
    }

    async fn replace_permissions(
        &self,
        file_id: Uuid,
        permissions: &[FilePermission],
    ) -> AppResult<()> {
        self.permissions.replace_for_file(file_id, permissions).await
    }
}
