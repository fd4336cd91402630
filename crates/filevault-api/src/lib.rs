//! # filevault-api
//!
//! HTTP API layer for FileVault built on Axum.
//!
//! Exposes the file operations as REST endpoints under `/api`, resolves
//! the caller from a bearer token before any handler runs, and maps
//! [`AppError`](filevault_core::AppError) kinds onto HTTP status codes
//! through [`error::ApiError`].

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
