//! Route definitions for the FileVault HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with every route and the request logging middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.max_upload_size_bytes).unwrap_or(usize::MAX);

    let api_routes = Router::new()
        .merge(file_routes())
        .merge(version_routes())
        .merge(permission_routes())
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// File upload, listing, info, rename, delete, and content
fn file_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files",
            get(handlers::file::list_files).post(handlers::file::upload_file),
        )
        .route(
            "/files/{id}",
            get(handlers::file::get_file)
                .patch(handlers::file::rename_file)
                .delete(handlers::file::delete_file),
        )
        .route("/files/{id}/content", get(handlers::file::download_file))
}

/// Version history, historical content, and revert
fn version_routes() -> Router<AppState> {
    Router::new()
        .route("/files/{id}/versions", get(handlers::version::list_versions))
        .route(
            "/files/{id}/versions/{version}/content",
            get(handlers::file::download_version),
        )
        .route(
            "/files/{id}/revert",
            post(handlers::version::revert_file),
        )
}

/// Per-file grants
fn permission_routes() -> Router<AppState> {
    Router::new().route(
        "/files/{id}/permissions",
        get(handlers::permission::get_permissions).put(handlers::permission::set_permissions),
    )
}
