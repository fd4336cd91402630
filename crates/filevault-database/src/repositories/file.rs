//! File and file-version repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_entity::file::{File, FileVersion, NewFile, NewFileVersion};

/// Repository for the `files` and `file_versions` tables.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

fn db_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a file by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "SELECT id, owner_id, name, current_version, created_at FROM files WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find file"))
    }

    /// List the files owned by a user, newest first.
    pub async fn find_by_owner(&self, owner_id: i64) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT id, owner_id, name, current_version, created_at FROM files \
             WHERE owner_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list files by owner"))
    }

    /// Find one version of a file.
    pub async fn find_version(
        &self,
        file_id: Uuid,
        version_number: i32,
    ) -> AppResult<Option<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 AND version_number = $2",
        )
        .bind(file_id)
        .bind(version_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find file version"))
    }

    /// Find the highest-numbered version of a file.
    pub async fn find_latest_version(&self, file_id: Uuid) -> AppResult<Option<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 \
             ORDER BY version_number DESC LIMIT 1",
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find latest file version"))
    }

    /// List all versions of a file, most recent first.
    pub async fn find_versions(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 ORDER BY version_number DESC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list file versions"))
    }

    /// Insert a file row and its first version row atomically.
    pub async fn create_with_version(
        &self,
        file: &NewFile,
        version: &NewFileVersion,
    ) -> AppResult<(File, FileVersion)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let created = sqlx::query_as::<_, File>(
            "INSERT INTO files (id, owner_id, name, current_version) VALUES ($1, $2, $3, $4) \
             RETURNING id, owner_id, name, current_version, created_at",
        )
        .bind(file.id)
        .bind(file.owner_id)
        .bind(&file.name)
        .bind(version.version_number)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("Failed to create file"))?;

        let version = insert_version(&mut tx, version).await?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit file creation"))?;

        Ok((created, version))
    }

    /// Advance `current_version` and insert the matching version row atomically.
    pub async fn append_version(
        &self,
        expected_current: i32,
        version: &NewFileVersion,
    ) -> AppResult<(File, FileVersion)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let updated = sqlx::query_as::<_, File>(
            "UPDATE files SET current_version = $3 WHERE id = $1 AND current_version = $2 \
             RETURNING id, owner_id, name, current_version, created_at",
        )
        .bind(version.file_id)
        .bind(expected_current)
        .bind(version.version_number)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err("Failed to update current version"))?;

        let Some(updated) = updated else {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM files WHERE id = $1)")
                    .bind(version.file_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(db_err("Failed to check file existence"))?;
            return Err(if exists {
                AppError::conflict(format!(
                    "File {} was modified concurrently",
                    version.file_id
                ))
            } else {
                AppError::not_found(format!("File {} not found", version.file_id))
            });
        };

        let version = insert_version(&mut tx, version).await?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit new version"))?;

        Ok((updated, version))
    }

    /// Change a file's display name.
    pub async fn rename(&self, file_id: Uuid, name: &str) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET name = $2 WHERE id = $1 \
             RETURNING id, owner_id, name, current_version, created_at",
        )
        .bind(file_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to rename file"))
    }

    /// Remove a file with all of its grants and versions.
    ///
    /// Returns the storage keys the deleted versions pointed at.
    pub async fn delete_cascade(&self, file_id: Uuid) -> AppResult<Vec<String>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        sqlx::query("DELETE FROM file_permissions WHERE file_id = $1")
            .bind(file_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to delete file permissions"))?;

        let keys: Vec<String> = sqlx::query_scalar(
            "SELECT storage_key FROM file_versions WHERE file_id = $1 ORDER BY version_number",
        )
        .bind(file_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err("Failed to read storage keys"))?;

        sqlx::query("DELETE FROM file_versions WHERE file_id = $1")
            .bind(file_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to delete file versions"))?;

        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(file_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to delete file"))?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit file deletion"))?;

        Ok(keys)
    }
}

async fn insert_version(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    version: &NewFileVersion,
) -> AppResult<FileVersion> {
    sqlx::query_as::<_, FileVersion>(
        "INSERT INTO file_versions (file_id, version_number, storage_key, size_bytes, content_type) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(version.file_id)
    .bind(version.version_number)
    .bind(&version.storage_key)
    .bind(version.size_bytes)
    .bind(&version.content_type)
    .fetch_one(&mut **tx)
    .await
    .map_err(db_err("Failed to create file version"))
}
