//! Convenience result type alias for FileVault.

use crate::error::AppError;

/// A specialized `Result` type for FileVault operations.
pub type AppResult<T> = Result<T, AppError>;
