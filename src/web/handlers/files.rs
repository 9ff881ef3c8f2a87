//! File handlers.
//!
//! Every handler accepts either a bearer JWT or a share token.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};

use crate::storage::{sandbox, UploadItem};
use crate::web::dto::{
    ApiResponse, FileListResponse, MkdirRequest, PathQuery, PathResponse, UploadResponse,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{OptionalAuthUser, ShareToken};

use super::AppState;

/// Multipart field carrying files.
const FILE_FIELD: &str = "file";

/// Build a Content-Disposition header value.
///
/// Non-ASCII names are sent RFC 5987 encoded with an ASCII fallback.
pub fn content_disposition_header(filename: &str) -> String {
    let needs_escaping = |c: char| c.is_control() || c == '"' || c == '\\';

    if filename.is_ascii() && !filename.chars().any(needs_escaping) {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '"' || c == '\\' || !c.is_ascii() { '_' } else { c })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

/// GET /api/files?path= - List a directory.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    user: OptionalAuthUser,
    share: ShareToken,
    Query(query): Query<PathQuery>,
) -> Result<Json<ApiResponse<FileListResponse>>, ApiError> {
    let authority = state.authority(&user, &share)?;
    let entries = state.storage.list(&authority, query.path())?;

    Ok(Json(ApiResponse::new(FileListResponse {
        path: sandbox::clean(query.path())?,
        permission: authority.permission(),
        shared: authority.is_delegated(),
        entries,
    })))
}

/// POST /api/upload?path= - Upload files.
///
/// Request body: multipart/form-data with one or more `file` fields.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    user: OptionalAuthUser,
    share: ShareToken,
    Query(query): Query<PathQuery>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>, ApiError> {
    let authority = state.authority(&user, &share)?;
    authority.require_write()?;

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read file data: {}", e);
            ApiError::bad_request("Failed to read file data")
        })?;
        files.push((file_name, data));
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("No files provided"));
    }

    let items = files
        .iter()
        .map(|(name, data)| UploadItem::new(name.as_str(), &data[..]));
    let outcome = state.storage.upload(&authority, query.path(), items)?;

    Ok(Json(ApiResponse::new(UploadResponse {
        count: outcome.uploaded.len(),
        uploaded: outcome.uploaded,
        skipped: outcome.skipped,
    })))
}

/// GET /api/download/*path - Download a file.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    user: OptionalAuthUser,
    share: ShareToken,
    Path(path): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let authority = state.authority(&user, &share)?;
    let file = state.storage.download(&authority, &path)?;

    let content_type = mime_guess::from_path(&file.name)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&file.name),
        )
        .header(header::CONTENT_LENGTH, file.content.len())
        .body(Body::from(file.content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// DELETE /api/delete/*path - Delete a file or directory.
pub async fn delete_path(
    State(state): State<Arc<AppState>>,
    user: OptionalAuthUser,
    share: ShareToken,
    Path(path): Path<String>,
) -> Result<Json<ApiResponse<PathResponse>>, ApiError> {
    delete_logical(&state, &user, &share, &path)
}

/// DELETE /api/delete - Attempt to delete the root.
pub async fn delete_root(
    State(state): State<Arc<AppState>>,
    user: OptionalAuthUser,
    share: ShareToken,
) -> Result<Json<ApiResponse<PathResponse>>, ApiError> {
    delete_logical(&state, &user, &share, "/")
}

fn delete_logical(
    state: &AppState,
    user: &OptionalAuthUser,
    share: &ShareToken,
    path: &str,
) -> Result<Json<ApiResponse<PathResponse>>, ApiError> {
    let authority = state.authority(user, share)?;
    state.storage.delete(&authority, path)?;

    Ok(Json(ApiResponse::new(PathResponse {
        path: sandbox::clean(path)?,
    })))
}

/// POST /api/mkdir - Create a directory.
pub async fn make_directory(
    State(state): State<Arc<AppState>>,
    user: OptionalAuthUser,
    share: ShareToken,
    ValidatedJson(req): ValidatedJson<MkdirRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PathResponse>>), ApiError> {
    let authority = state.authority(&user, &share)?;
    let path = state.storage.mkdir(&authority, &req.path, &req.name)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(PathResponse { path })),
    ))
}
