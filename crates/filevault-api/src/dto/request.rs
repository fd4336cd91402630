//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use filevault_core::error::AppError;
use filevault_entity::permission::PermissionGrant;

/// Run `validator` rules, reporting failures as `Validation` errors.
pub fn validate_request<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}

/// Query string of `GET /api/files`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFilesQuery {
    /// Also list files shared with the caller.
    #[serde(default)]
    pub include_shared: bool,
}

/// Rename request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameFileRequest {
    /// New display name.
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub new_name: String,
}

/// One grant in a permission replacement.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PermissionEntry {
    /// Grantee user ID.
    #[validate(range(min = 1, message = "User ID must be positive"))]
    pub user_id: i64,
    /// Level granted; 0 grants nothing.
    #[validate(range(min = 0, message = "Permission level must not be negative"))]
    pub permission_level: i32,
}

impl From<PermissionEntry> for PermissionGrant {
    fn from(entry: PermissionEntry) -> Self {
        PermissionGrant::new(entry.user_id, entry.permission_level)
    }
}

/// Full replacement of a file's grants.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetPermissionsRequest {
    /// New grant set; empty revokes all sharing.
    #[validate(nested)]
    pub permissions: Vec<PermissionEntry>,
}

/// Revert request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RevertFileRequest {
    /// Version whose content becomes the new current version.
    #[validate(range(min = 1, message = "Version must be positive"))]
    pub version: i32,
}
