//! File permission repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_entity::file::File;
use filevault_entity::permission::{FilePermission, PermissionLevel};

/// Repository for the `file_permissions` table.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up the level granted to a user on a file.
    pub async fn find_level(
        &self,
        file_id: Uuid,
        user_id: i64,
    ) -> AppResult<Option<PermissionLevel>> {
        sqlx::query_scalar::<_, i32>(
            "SELECT permission_level FROM file_permissions WHERE file_id = $1 AND user_id = $2",
        )
        .bind(file_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map(|level| level.map(PermissionLevel))
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check permission", e))
    }

    /// List every grant on a file.
    pub async fn find_for_file(&self, file_id: Uuid) -> AppResult<Vec<FilePermission>> {
        sqlx::query_as::<_, FilePermission>(
            "SELECT file_id, user_id, permission_level FROM file_permissions \
             WHERE file_id = $1 ORDER BY user_id",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list permissions", e))
    }

    /// Files shared with a user at read level or above, newest first.
    pub async fn find_shared_files(&self, user_id: i64) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT f.id, f.owner_id, f.name, f.current_version, f.created_at \
             FROM files f JOIN file_permissions fp ON f.id = fp.file_id \
             WHERE fp.user_id = $1 AND fp.permission_level >= $2 \
             ORDER BY f.created_at DESC, f.id",
        )
        .bind(user_id)
        .bind(PermissionLevel::READ.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list shared files", e))
    }

    /// Replace every grant on a file in a single transaction.
    pub async fn replace_for_file(
        &self,
        file_id: Uuid,
        permissions: &[FilePermission],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("DELETE FROM file_permissions WHERE file_id = $1")
            .bind(file_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear permissions", e)
            })?;

        for permission in permissions {
            sqlx::query(
                "INSERT INTO file_permissions (file_id, user_id, permission_level) \
                 VALUES ($1, $2, $3)",
            )
            .bind(file_id)
            .bind(permission.user_id)
            .bind(permission.permission_level)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to insert permission", e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit permissions", e)
        })?;

        Ok(())
    }
}
