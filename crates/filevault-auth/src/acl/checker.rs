//! Owner-or-grant access checks against the metadata store.

use std::sync::Arc;

use tracing::debug;

use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_database::FileMetadataStore;
use filevault_entity::file::File;
use filevault_entity::permission::PermissionLevel;

/// The access rule: the owner always has access; anyone else needs a
/// stored grant of read level or above. A missing grant means no access.
pub fn can_access(file: &File, requester_id: i64, grant: Option<PermissionLevel>) -> bool {
    file.is_owned_by(requester_id) || grant.is_some_and(PermissionLevel::grants_read)
}

/// Applies [`can_access`] using grants looked up from the metadata store.
#[derive(Debug, Clone)]
pub struct AccessChecker {
    store: Arc<dyn FileMetadataStore>,
}

impl AccessChecker {
    /// Creates a new access checker.
    pub fn new(store: Arc<dyn FileMetadataStore>) -> Self {
        Self { store }
    }

    /// Whether `requester_id` may read `file`. Owners skip the grant lookup.
    pub async fn can_read(&self, file: &File, requester_id: i64) -> AppResult<bool> {
        if file.is_owned_by(requester_id) {
            return Ok(true);
        }
        let grant = self.store.check_permission(file.id, requester_id).await?;
        Ok(can_access(file, requester_id, grant))
    }

    /// Fails with `Authorization` unless `requester_id` may read `file`.
    pub async fn require_read(&self, file: &File, requester_id: i64) -> AppResult<()> {
        if self.can_read(file, requester_id).await? {
            Ok(())
        } else {
            debug!(file_id = %file.id, user_id = requester_id, "Read access denied");
            Err(AppError::authorization("You do not have access to this file"))
        }
    }

    /// Fails with `Authorization` unless `requester_id` owns `file`.
    pub fn require_owner(&self, file: &File, requester_id: i64, action: &str) -> AppResult<()> {
        if file.is_owned_by(requester_id) {
            Ok(())
        } else {
            debug!(file_id = %file.id, user_id = requester_id, action, "Owner check failed");
            Err(AppError::authorization(format!(
                "Only the file owner can {action}"
            )))
        }
    }
}
