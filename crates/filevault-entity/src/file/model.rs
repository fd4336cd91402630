//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use filevault_core::error::AppError;
use filevault_core::result::AppResult;

use super::version::FIRST_VERSION;

/// Longest display name accepted, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// A user-owned file. Its content lives in [`super::FileVersion`] rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// The owning user. Owner access is implicit and never stored as a grant.
    pub owner_id: i64,
    /// Display name. Mutable and not unique.
    pub name: String,
    /// Highest version number present for this file.
    pub current_version: i32,
    /// When the file was first uploaded.
    pub created_at: DateTime<Utc>,
}

impl File {
    /// Check whether `user_id` owns this file.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }

    /// Version number the next upload or revert will receive.
    ///
    /// Fails with a conflict once the version counter is exhausted.
    pub fn next_version(&self) -> AppResult<i32> {
        self.current_version.checked_add(1).ok_or_else(|| {
            AppError::conflict(format!("File {} has no version numbers left", self.id))
        })
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFile {
    /// Pre-generated identifier, so the blob key can be derived before the row exists.
    pub id: Uuid,
    /// The uploading user.
    pub owner_id: i64,
    /// Display name, already normalized.
    pub name: String,
}

impl NewFile {
    /// Build the row that the first version will be attached to.
    pub fn into_file(self, created_at: DateTime<Utc>) -> File {
        File {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            current_version: FIRST_VERSION,
            created_at,
        }
    }
}

/// Trim a user supplied display name and reject blank or oversized names.
pub fn normalize_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("File name is required"));
    }
    if name.chars().any(char::is_control) {
        return Err(AppError::validation(
            "File name must not contain control characters",
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "File name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}
