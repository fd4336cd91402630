//! Version history and revert.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use filevault_auth::AccessChecker;
use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::traits::storage::BlobStore;
use filevault_database::FileMetadataStore;
use filevault_entity::file::{File, FileVersion, NewFileVersion};

use crate::context::RequestContext;

/// Lists and restores file versions.
#[derive(Debug, Clone)]
pub struct VersionService {
    /// Metadata store.
    metadata: Arc<dyn FileMetadataStore>,
    /// Blob store.
    blobs: Arc<dyn BlobStore>,
    /// Access checker.
    access: Arc<AccessChecker>,
}

/// Result of a successful revert.
#[derive(Debug, Clone)]
pub struct RevertOutcome {
    /// The file with its advanced current version. Its ID is unchanged.
    pub file: File,
    /// The newly appended version holding the restored content.
    pub version: FileVersion,
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(
        metadata: Arc<dyn FileMetadataStore>,
        blobs: Arc<dyn BlobStore>,
        access: Arc<AccessChecker>,
    ) -> Self {
        Self {
            metadata,
            blobs,
            access,
        }
    }

    /// Lists all versions of a file, most recent first. Requires read access.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> AppResult<Vec<FileVersion>> {
        let file = super::find_file(self.metadata.as_ref(), file_id).await?;
        self.access.require_read(&file, ctx.user_id).await?;
        self.metadata.list_versions(file_id).await
    }

    /// Restore the content of `target_version` as a new version. Owner only.
    ///
    /// History is never rewritten: the target blob is copied under the
    /// next version's key and appended. The append only succeeds if no
    /// other writer advanced the file in the meantime; otherwise it fails
    /// with `Conflict`. A failed append removes the copied blob unless a
    /// committed version row now refers to that key.
    pub async fn revert(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        target_version: i32,
    ) -> AppResult<RevertOutcome> {
        let file = super::find_file(self.metadata.as_ref(), file_id).await?;
        self.access
            .require_owner(&file, ctx.user_id, "revert this file")?;

        let target = self
            .metadata
            .get_version(file_id, target_version)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Version {target_version} of file {file_id} not found"))
            })?;

        let new_version = NewFileVersion::new(
            file_id,
            file.next_version()?,
            target.size_bytes,
            target.content_type.clone(),
        );
        let new_number = new_version.version_number;
        let new_key = new_version.storage_key.clone();

        let source = self.blobs.get(&target.storage_key).await.map_err(|e| {
            if e.is_not_found() {
                error!(
                    file_id = %file_id,
                    version = target_version,
                    storage_key = %target.storage_key,
                    "Revert source blob is missing"
                );
                e.into_internal()
            } else {
                e
            }
        })?;

        let size = u64::try_from(target.size_bytes)
            .map_err(|_| AppError::internal(format!("Version {target_version} has a negative size")))?;
        self.blobs
            .put(&new_key, source, size, &target.content_type)
            .await?;

        let (file, version) = match self
            .metadata
            .append_version(file.current_version, new_version)
            .await
        {
            Ok(appended) => appended,
            Err(e) => {
                if e.kind == ErrorKind::Conflict && self.is_claimed(file_id, new_number).await {
                    warn!(
                        file_id = %file_id,
                        storage_key = %new_key,
                        "Version was committed by a concurrent writer; keeping its blob"
                    );
                } else {
                    super::discard_blob(self.blobs.as_ref(), &new_key, &e).await;
                }
                return Err(e);
            }
        };

        info!(
            user_id = ctx.user_id,
            file_id = %file_id,
            from_version = target_version,
            new_version = version.version_number,
            "File reverted"
        );

        Ok(RevertOutcome { file, version })
    }

    /// Whether a version row (possibly from another writer) now owns this
    /// number. An unreadable store counts as claimed: an orphaned blob is
    /// harmless, a deleted one behind a committed row is not.
    async fn is_claimed(&self, file_id: Uuid, version_number: i32) -> bool {
        !matches!(
            self.metadata.get_version(file_id, version_number).await,
            Ok(None)
        )
    }
}
