//! File permission handlers.

use axum::Json;
use axum::extract::{Path, State};

use filevault_entity::permission::PermissionGrant;

use crate::dto::request::{SetPermissionsRequest, validate_request};
use crate::dto::response::{ApiResponse, MessageResponse, PermissionResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, parse_uuid};
use crate::state::AppState;

/// GET /api/files/{id}/permissions
pub async fn get_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<PermissionResponse>>>, ApiError> {
    let id = parse_uuid(&id)?;
    let entries = state.permission_service.list_permissions(&auth, id).await?;
    Ok(Json(ApiResponse::ok(
        entries.into_iter().map(PermissionResponse::from).collect(),
    )))
}

/// PUT /api/files/{id}/permissions
pub async fn set_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<SetPermissionsRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = parse_uuid(&id)?;
    validate_request(&req)?;

    let grants: Vec<PermissionGrant> = req.permissions.into_iter().map(Into::into).collect();
    state
        .permission_service
        .set_permissions(&auth, id, grants)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Permissions updated",
    ))))
}
