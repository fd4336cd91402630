//! File upload, download, listing, rename, and delete handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use filevault_core::error::AppError;
use filevault_core::traits::storage::ByteStream;
use filevault_service::{DownloadResult, FileSummary};
use filevault_storage::transfer::collect_upload;

use crate::dto::request::{ListFilesQuery, RenameFileRequest, validate_request};
use crate::dto::response::{ApiResponse, MessageResponse, UploadResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, parse_uuid, parse_version};
use crate::state::AppState;

/// Header carrying the uploaded file's name, as raw UTF-8.
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// POST /api/files
///
/// The request body is the raw file content. With a `Content-Length` the
/// body is streamed straight to the blob store; without one it is
/// buffered up to the upload limit first.
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    body: Body,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponse>>), ApiError> {
    let name = headers
        .get(FILE_NAME_HEADER)
        .ok_or_else(|| AppError::validation("x-file-name header is required"))
        .and_then(|v| {
            std::str::from_utf8(v.as_bytes())
                .map_err(|_| AppError::validation("x-file-name header must be valid UTF-8"))
        })?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let declared_size = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.parse::<u64>()
                .map_err(|_| AppError::validation("Invalid Content-Length header"))
        })
        .transpose()?;

    let stream: ByteStream = Box::pin(body.into_data_stream().map_err(std::io::Error::other));
    let upload = &state.upload_service;

    let file = match declared_size {
        Some(size) => upload.upload(&auth, name, content_type, stream, size).await?,
        None => {
            let data = collect_upload(stream, upload.max_upload_size_bytes()).await?;
            upload.upload_bytes(&auth, name, content_type, data).await?
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UploadResponse {
            file_id: file.id,
            message: "File uploaded successfully".to_string(),
        })),
    ))
}

/// GET /api/files?include_shared=true
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<Vec<FileSummary>>>, ApiError> {
    let files = state
        .file_service
        .list_files(&auth, query.include_shared)
        .await?;
    Ok(Json(ApiResponse::ok(files)))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FileSummary>>, ApiError> {
    let id = parse_uuid(&id)?;
    let info = state.file_service.get_file_info(&auth, id).await?;
    Ok(Json(ApiResponse::ok(info)))
}

/// PATCH /api/files/{id}
pub async fn rename_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<RenameFileRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = parse_uuid(&id)?;
    validate_request(&req)?;
    state.file_service.rename(&auth, id, &req.new_name).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("File renamed"))))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = parse_uuid(&id)?;
    state.file_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "File deleted successfully",
    ))))
}

/// GET /api/files/{id}/content
pub async fn download_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_uuid(&id)?;
    let result = state.download_service.download(&auth, id).await?;
    stream_response(result)
}

/// GET /api/files/{id}/versions/{version}/content
pub async fn download_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, version)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let id = parse_uuid(&id)?;
    let version = parse_version(&version)?;
    let result = state
        .download_service
        .download_version(&auth, id, version)
        .await?;
    stream_response(result)
}

/// `Content-Disposition` value with an ASCII fallback name and the exact
/// UTF-8 name in `filename*` (RFC 6266).
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();
    let encoded = utf8_percent_encode(name, NON_ALPHANUMERIC);
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

fn stream_response(result: DownloadResult) -> Result<Response, ApiError> {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.version.content_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&result.file.name),
        )
        .header(header::CONTENT_LENGTH, result.version.size_bytes)
        .header("x-file-version", result.version.version_number)
        .body(Body::from_stream(result.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response.into_response())
}
