//! Typed path parameter helpers.
//!
//! Path segments are taken as strings and parsed here so malformed IDs
//! produce the same JSON error body as every other validation failure.

use uuid::Uuid;

use filevault_core::error::AppError;

/// Parses a UUID from a path segment.
pub fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|_| AppError::validation(format!("Invalid file ID: {s}")))
}

/// Parses a version number from a path segment.
pub fn parse_version(s: &str) -> Result<i32, AppError> {
    s.parse::<i32>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| AppError::validation(format!("Invalid version number: {s}")))
}
