//! File listing, metadata, rename, and delete.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use filevault_auth::AccessChecker;
use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::traits::storage::BlobStore;
use filevault_database::FileMetadataStore;
use filevault_entity::file::{File, FileVersion, normalize_name};

use crate::context::RequestContext;

/// A file as seen by one caller, with fields taken from its latest version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSummary {
    pub id: Uuid,
    pub name: String,
    /// Size of the latest version, in bytes.
    pub size_bytes: i64,
    /// The file's current version number.
    pub version: i32,
    /// Content type of the latest version.
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    /// Creation time of the latest version.
    pub updated_at: DateTime<Utc>,
    /// Whether the caller owns the file.
    pub is_owner: bool,
}

impl FileSummary {
    fn new(file: File, latest: FileVersion, caller_id: i64) -> Self {
        Self {
            is_owner: file.is_owned_by(caller_id),
            id: file.id,
            name: file.name,
            size_bytes: latest.size_bytes,
            version: file.current_version,
            content_type: latest.content_type,
            created_at: file.created_at,
            updated_at: latest.created_at,
        }
    }
}

/// Core file management: listing, info, rename, delete.
#[derive(Debug, Clone)]
pub struct FileService {
    /// Metadata store.
    metadata: Arc<dyn FileMetadataStore>,
    /// Blob store.
    blobs: Arc<dyn BlobStore>,
    /// Access checker.
    access: Arc<AccessChecker>,
}

impl FileService {
    /// Creates a new file service.
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

    /// Files the caller owns, followed by files shared with them when
    /// `include_shared` is set.
    ///
    /// Both queries are already scoped by the caller's identity. A file
    /// without any version row is skipped with a warning instead of
    /// failing the whole listing.
    pub async fn list_files(
        &self,
        ctx: &RequestContext,
        include_shared: bool,
    ) -> AppResult<Vec<FileSummary>> {
        let mut files = self.metadata.list_by_owner(ctx.user_id).await?;
        if include_shared {
            let mut seen: HashSet<Uuid> = files.iter().map(|f| f.id).collect();
            let shared = self.metadata.list_shared(ctx.user_id).await?;
            files.extend(shared.into_iter().filter(|f| seen.insert(f.id)));
        }

        let mut summaries = Vec::with_capacity(files.len());
        for file in files {
            match self.metadata.get_latest_version(file.id).await? {
                Some(latest) => summaries.push(FileSummary::new(file, latest, ctx.user_id)),
                None => warn!(file_id = %file.id, "Skipping file without versions in listing"),
            }
        }
        Ok(summaries)
    }

    /// Metadata for one file. Requires read access.
    pub async fn get_file_info(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<FileSummary> {
        let file = super::find_file(self.metadata.as_ref(), file_id).await?;
        self.access.require_read(&file, ctx.user_id).await?;

        let latest = self
            .metadata
            .get_latest_version(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} has no versions")))?;

        Ok(FileSummary::new(file, latest, ctx.user_id))
    }

    /// Change a file's display name. Owner only.
    pub async fn rename(&self, ctx: &RequestContext, file_id: Uuid, new_name: &str) -> AppResult<File> {
        let file = super::find_file(self.metadata.as_ref(), file_id).await?;
        self.access.require_owner(&file, ctx.user_id, "rename this file")?;
        let name = normalize_name(new_name)?;

        let renamed = self
            .metadata
            .rename_file(file_id, &name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        info!(
            user_id = ctx.user_id,
            file_id = %file_id,
            old_name = %file.name,
            new_name = %renamed.name,
            "File renamed"
        );
        Ok(renamed)
    }

    /// Delete a file with all of its versions, grants, and blobs. Owner only.
    ///
    /// Metadata is removed first in one transaction; blobs are removed
    /// afterwards. A blob that cannot be removed is reported as an error
    /// even though the metadata is already gone.
    pub async fn delete(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<()> {
        let file = super::find_file(self.metadata.as_ref(), file_id).await?;
        self.access.require_owner(&file, ctx.user_id, "delete this file")?;

        let mut keys: BTreeSet<String> = self
            .metadata
            .list_versions(file_id)
            .await?
            .into_iter()
            .map(|v| v.storage_key)
            .collect();
        keys.extend(self.metadata.delete_file_cascade(file_id).await?);

        let mut failed = 0usize;
        for key in &keys {
            if let Err(e) = self.blobs.delete(key).await {
                error!(file_id = %file_id, storage_key = %key, error = %e, "Failed to delete blob");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(AppError::storage(format!(
                "File {file_id} was deleted but {failed} of {} blobs could not be removed",
                keys.len()
            )));
        }

        info!(
            user_id = ctx.user_id,
            file_id = %file_id,
            blobs = keys.len(),
            "File deleted"
        );
        Ok(())
    }
}
