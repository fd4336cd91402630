//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
///
/// Unauthenticated. Answers 503 when either store is unreachable.
pub async fn health(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let metadata_ok = match state.metadata.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "Metadata store health check failed");
            false
        }
    };
    let storage_ok = match state.blobs.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, provider = state.blobs.provider_type(), "Blob store health check failed");
            false
        }
    };

    let healthy = metadata_ok && storage_ok;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse {
            success: healthy,
            data: HealthResponse {
                status: if healthy { "ok" } else { "degraded" }.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                metadata: describe(metadata_ok, "connected"),
                storage: describe(storage_ok, "available"),
            },
        }),
    )
}

fn describe(ok: bool, healthy: &str) -> String {
    if ok { healthy } else { "unavailable" }.to_string()
}
