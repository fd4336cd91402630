//! Ordered permission levels.

use serde::{Deserialize, Serialize};

/// Integer grant strength for a (file, user) pair.
///
/// `0` grants nothing, `1` grants read. Higher values are accepted and
/// stored but currently behave like read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionLevel(pub i32);

impl PermissionLevel {
    pub const NONE: Self = Self(0);
    pub const READ: Self = Self(1);

    /// Whether this level allows reading content and metadata.
    pub fn grants_read(self) -> bool {
        self >= Self::READ
    }
}

impl From<i32> for PermissionLevel {
    fn from(value: i32) -> Self {
        Self(value)
    }
}
