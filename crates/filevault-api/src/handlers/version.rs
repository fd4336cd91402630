//! Version history and revert handlers.

use axum::Json;
use axum::extract::{Path, State};

use crate::dto::request::{RevertFileRequest, validate_request};
use crate::dto::response::{ApiResponse, RevertResponse, VersionResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, parse_uuid};
use crate::state::AppState;

/// GET /api/files/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<VersionResponse>>>, ApiError> {
    let id = parse_uuid(&id)?;
    let versions = state.version_service.list_versions(&auth, id).await?;
    Ok(Json(ApiResponse::ok(
        versions.into_iter().map(VersionResponse::from).collect(),
    )))
}

/// POST /api/files/{id}/revert
pub async fn revert_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<RevertFileRequest>,
) -> Result<Json<ApiResponse<RevertResponse>>, ApiError> {
    let id = parse_uuid(&id)?;
    validate_request(&req)?;

    let outcome = state.version_service.revert(&auth, id, req.version).await?;

    Ok(Json(ApiResponse::ok(RevertResponse {
        file_id: outcome.file.id,
        version: outcome.version.version_number,
        new_file_id: outcome.file.id,
    })))
}
