//! # filevault-core
//!
//! Core crate for FileVault. Contains the blob store trait, configuration
//! schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other FileVault crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
