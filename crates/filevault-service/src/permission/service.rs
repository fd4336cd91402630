//! Grant management. Only a file's owner may view or change its grants.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use filevault_auth::AccessChecker;
use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_database::FileMetadataStore;
use filevault_entity::permission::{FilePermission, PermissionGrant};

use crate::context::RequestContext;

/// Replaces and lists the grants on a file.
#[derive(Debug, Clone)]
pub struct PermissionService {
    /// Metadata store.
    metadata: Arc<dyn FileMetadataStore>,
    /// Access checker.
    access: Arc<AccessChecker>,
}

impl PermissionService {
    /// Creates a new permission service.
    pub fn new(metadata: Arc<dyn FileMetadataStore>, access: Arc<AccessChecker>) -> Self {
        Self { metadata, access }
    }

    /// Replace every grant on a file with `grants`. Owner only.
    ///
    /// An empty set revokes all sharing. Grants naming the owner are
    /// dropped since owner access is implicit.
    pub async fn set_permissions(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        grants: Vec<PermissionGrant>,
    ) -> AppResult<()> {
        validate_grants(&grants)?;

        let file = crate::file::find_file(self.metadata.as_ref(), file_id).await?;
        self.access
            .require_owner(&file, ctx.user_id, "change its permissions")?;

        let permissions: Vec<FilePermission> = grants
            .into_iter()
            .filter(|g| {
                let is_owner = file.is_owned_by(g.user_id);
                if is_owner {
                    debug!(file_id = %file_id, "Ignoring grant for the file owner");
                }
                !is_owner
            })
            .map(|g| g.for_file(file_id))
            .collect();

        self.metadata
            .replace_permissions(file_id, &permissions)
            .await?;

        info!(
            user_id = ctx.user_id,
            file_id = %file_id,
            grants = permissions.len(),
            "File permissions replaced"
        );
        Ok(())
    }

    /// All grants on a file, ordered by user ID. Owner only.
    pub async fn list_permissions(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> AppResult<Vec<FilePermission>> {
        let file = crate::file::find_file(self.metadata.as_ref(), file_id).await?;
        self.access
            .require_owner(&file, ctx.user_id, "view its permissions")?;
        self.metadata.list_permissions(file_id).await
    }
}

fn validate_grants(grants: &[PermissionGrant]) -> AppResult<()> {
    let mut seen = HashSet::with_capacity(grants.len());
    for grant in grants {
        if grant.user_id <= 0 {
            return Err(AppError::validation(format!(
                "Invalid user ID {}",
                grant.user_id
            )));
        }
        if grant.level.0 < 0 {
            return Err(AppError::validation(format!(
                "Permission level for user {} must not be negative",
                grant.user_id
            )));
        }
        if !seen.insert(grant.user_id) {
            return Err(AppError::validation(format!(
                "User {} appears more than once",
                grant.user_id
            )));
        }
    }
    Ok(())
}
