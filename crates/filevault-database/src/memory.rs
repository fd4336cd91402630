//! In-memory metadata store guarded by a Tokio mutex.
//!
//! Every compound operation runs under a single lock acquisition, which
//! gives it the same all-or-nothing behavior as the PostgreSQL
//! transactions. Suitable for tests and single-process demos only.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_entity::file::{File, FileVersion, NewFile, NewFileVersion};
use filevault_entity::permission::{FilePermission, PermissionLevel};

use crate::store::FileMetadataStore;

#[derive(Debug, Default)]
struct InnerState {
    files: HashMap<Uuid, File>,
    /// Versions per file, keyed by version number.
    versions: HashMap<Uuid, BTreeMap<i32, FileVersion>>,
    /// Grant levels per file, keyed by user ID.
    permissions: HashMap<Uuid, BTreeMap<i64, i32>>,
}

impl InnerState {
    fn newest_first(&self, mut files: Vec<File>) -> Vec<File> {
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        files
    }
}

/// [`FileMetadataStore`] kept entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFileStore {
    state: Arc<Mutex<InnerState>>,
}

impl InMemoryFileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileMetadataStore for InMemoryFileStore {
    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn get_file(&self, file_id: Uuid) -> AppResult<Option<File>> {
        Ok(self.state.lock().await.files.get(&file_id).cloned())
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<File>> {
        let state = self.state.lock().await;
        let owned = state
            .files
            .values()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(state.newest_first(owned))
    }

    async fn list_shared(&self, user_id: i64) -> AppResult<Vec<File>> {
        let state = self.state.lock().await;
        let shared = state
            .permissions
            .iter()
            .filter(|(_, grants)| {
                grants
                    .get(&user_id)
                    .is_some_and(|level| PermissionLevel(*level).grants_read())
            })
            .filter_map(|(file_id, _)| state.files.get(file_id).cloned())
            .collect();
        Ok(state.newest_first(shared))
    }

    async fn get_version(
        &self,
        file_id: Uuid,
        version_number: i32,
    ) -> AppResult<Option<FileVersion>> {
        let state = self.state.lock().await;
        Ok(state
            .versions
            .get(&file_id)
            .and_then(|versions| versions.get(&version_number))
            .cloned())
    }

    async fn get_latest_version(&self, file_id: Uuid) -> AppResult<Option<FileVersion>> {
        let state = self.state.lock().await;
        Ok(state
            .versions
            .get(&file_id)
            .and_then(|versions| versions.values().next_back())
            .cloned())
    }

    async fn list_versions(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>> {
        let state = self.state.lock().await;
        Ok(state
            .versions
            .get(&file_id)
            .map(|versions| versions.values().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn check_permission(
        &self,
        file_id: Uuid,
        user_id: i64,
    ) -> AppResult<Option<PermissionLevel>> {
        let state = self.state.lock().await;
        Ok(state
            .permissions
            .get(&file_id)
            .and_then(|grants| grants.get(&user_id))
            .map(|level| PermissionLevel(*level)))
    }

    async fn list_permissions(&self, file_id: Uuid) -> AppResult<Vec<FilePermission>> {
        let state = self.state.lock().await;
        Ok(state
            .permissions
            .get(&file_id)
            .map(|grants| {
                grants
                    .iter()
                    .map(|(user_id, level)| FilePermission {
                        file_id,
                        user_id: *user_id,
                        permission_level: *level,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_file_with_version(
        &self,
        file: NewFile,
        version: NewFileVersion,
    ) -> AppResult<(File, FileVersion)> {
        let mut state = self.state.lock().await;
        if state.files.contains_key(&file.id) {
            return Err(AppError::conflict(format!("File {} already exists", file.id)));
        }

        let now = Utc::now();
        let mut created = file.into_file(now);
        created.current_version = version.version_number;
        let version = version.into_version(now);

        state.files.insert(created.id, created.clone());
        state
            .versions
            .entry(created.id)
            .or_default()
            .insert(version.version_number, version.clone());

        Ok((created, version))
    }

    async fn append_version(
        &self,
        expected_current: i32,
        version: NewFileVersion,
    ) -> AppResult<(File, FileVersion)> {
        let mut state = self.state.lock().await;
        let file_id = version.file_id;

        let file = state
            .files
            .get_mut(&file_id)
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        if file.current_version != expected_current {
            return Err(AppError::conflict(format!(
                "File {file_id} was modified concurrently"
            )));
        }
        file.current_version = version.version_number;
        let updated = file.clone();

        let version = version.into_version(Utc::now());
        state
            .versions
            .entry(file_id)
            .or_default()
            .insert(version.version_number, version.clone());

        Ok((updated, version))
    }

    async fn rename_file(&self, file_id: Uuid, name: &str) -> AppResult<Option<File>> {
        let mut state = self.state.lock().await;
        Ok(state.files.get_mut(&file_id).map(|file| {
            file.name = name.to_string();
            file.clone()
        }))
    }

    async fn delete_file_cascade(&self, file_id: Uuid) -> AppResult<Vec<String>> {
        let mut state = self.state.lock().await;
        state.permissions.remove(&file_id);
        let keys = state
            .versions
            .remove(&file_id)
            .map(|versions| versions.into_values().map(|v| v.storage_key).collect())
            .unwrap_or_default();
        state.files.remove(&file_id);
        Ok(keys)
    }

    async fn replace_permissions(
        &self,
        file_id: Uuid,
        permissions: &[FilePermission],
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let grants = permissions
            .iter()
            .map(|p| (p.user_id, p.permission_level))
            .collect::<BTreeMap<_, _>>();
        if grants.is_empty() {
            state.permissions.remove(&file_id);
        } else {
            state.permissions.insert(file_id, grants);
        }
        Ok(())
    }
}
