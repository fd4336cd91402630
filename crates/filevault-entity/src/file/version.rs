//! File version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Version number assigned to the content of a fresh upload.
pub const FIRST_VERSION: i32 = 1;

/// Derive the blob key for a version: `<file-id>/v<version>`.
///
/// This is the only link between metadata rows and blobs, so the format
/// must never change.
pub fn storage_key(file_id: Uuid, version_number: i32) -> String {
    format!("{file_id}/v{version_number}")
}

/// One immutable revision of a file's content.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileVersion {
    /// The file this version belongs to.
    pub file_id: Uuid,
    /// Dense, increasing version number starting at 1.
    pub version_number: i32,
    /// Key of the write-once blob holding this version's bytes.
    pub storage_key: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type recorded at upload.
    pub content_type: String,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new version record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFileVersion {
    pub file_id: Uuid,
    pub version_number: i32,
    pub storage_key: String,
    pub size_bytes: i64,
    pub content_type: String,
}

impl NewFileVersion {
    /// Describe version `version_number` of `file_id`, deriving its storage key.
    pub fn new(
        file_id: Uuid,
        version_number: i32,
        size_bytes: i64,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            file_id,
            version_number,
            storage_key: storage_key(file_id, version_number),
            size_bytes,
            content_type: content_type.into(),
        }
    }

    pub fn into_version(self, created_at: DateTime<Utc>) -> FileVersion {
        FileVersion {
            file_id: self.file_id,
            version_number: self.version_number,
            storage_key: self.storage_key,
            size_bytes: self.size_bytes,
            content_type: self.content_type,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_format() {
        let id = Uuid::parse_str("6f1c1a2e-0d4b-4c1e-9a51-3a8f7f3c2b10").unwrap();
        assert_eq!(
            storage_key(id, 3),
            "6f1c1a2e-0d4b-4c1e-9a51-3a8f7f3c2b10/v3"
        );
        let v = NewFileVersion::new(id, 1, 2, "text/plain");
        assert_eq!(v.storage_key, storage_key(id, 1));
    }
}
