//! File permission entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::level::PermissionLevel;

/// A stored grant of `permission_level` on `file_id` to `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FilePermission {
    pub file_id: Uuid,
    pub user_id: i64,
    pub permission_level: i32,
}

impl FilePermission {
    pub fn level(&self) -> PermissionLevel {
        PermissionLevel(self.permission_level)
    }
}

/// A grant as supplied by the owner when sharing, before it is bound to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub user_id: i64,
    pub level: PermissionLevel,
}

impl PermissionGrant {
    pub fn new(user_id: i64, level: impl Into<PermissionLevel>) -> Self {
        Self {
            user_id,
            level: level.into(),
        }
    }

    /// Bind this grant to a file.
    pub fn for_file(self, file_id: Uuid) -> FilePermission {
        FilePermission {
            file_id,
            user_id: self.user_id,
            permission_level: self.level.0,
        }
    }
}
