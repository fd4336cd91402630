//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use filevault_entity::file::FileVersion;
use filevault_entity::permission::FilePermission;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Upload result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// ID of the new file.
    pub file_id: Uuid,
    /// Message.
    pub message: String,
}

/// One entry of a file's version history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    /// Version number, starting at 1.
    pub version_number: i32,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// Content type recorded for this version.
    pub content_type: String,
    /// When the version was created.
    pub created_at: DateTime<Utc>,
}

impl From<FileVersion> for VersionResponse {
    fn from(v: FileVersion) -> Self {
        Self {
            version_number: v.version_number,
            size_bytes: v.size_bytes,
            content_type: v.content_type,
            created_at: v.created_at,
        }
    }
}

/// One grant on a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionResponse {
    /// Grantee user ID.
    pub user_id: i64,
    /// Granted level.
    pub permission_level: i32,
}

impl From<FilePermission> for PermissionResponse {
    fn from(p: FilePermission) -> Self {
        Self {
            user_id: p.user_id,
            permission_level: p.permission_level,
        }
    }
}

/// Revert result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevertResponse {
    /// The reverted file. Reverting never changes a file's ID.
    pub file_id: Uuid,
    /// The newly created current version.
    pub version: i32,
    /// Same value as `file_id`, kept for clients of the older response shape.
    pub new_file_id: Uuid,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` when every backend is reachable, `degraded` otherwise.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Metadata store status.
    pub metadata: String,
    /// Blob store status.
    pub storage: String,
}
