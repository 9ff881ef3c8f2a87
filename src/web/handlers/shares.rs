//! Share link handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::share::Permission;
use crate::web::dto::{ApiResponse, CreateShareRequest, ShareResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, OptionalAuthUser, ShareToken};

use super::AppState;

/// POST /api/shares - Create a share link.
///
/// Only the owner of a tree can share it; share bearers cannot re-share.
/// The target must be an existing directory. A missing or non-positive
/// `ttl_hours` uses the configured default.
pub async fn create_share(
    State(state): State<Arc<AppState>>,
    user: OptionalAuthUser,
    share: ShareToken,
    ValidatedJson(req): ValidatedJson<CreateShareRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ShareResponse>>), ApiError> {
    let authority = state.authority(&user, &share)?;
    if authority.is_delegated() {
        return Err(ApiError::forbidden("Share links cannot be re-shared"));
    }

    if !state.storage.exists(&authority, &req.path)? {
        return Err(ApiError::not_found("Path not found"));
    }
    if !state.storage.is_dir(&authority, &req.path)? {
        return Err(ApiError::unprocessable("Only directories can be shared"));
    }

    let ttl_hours = req
        .ttl_hours
        .filter(|hours| *hours > 0)
        .unwrap_or(state.default_share_ttl);
    let capability = state.shares.create(
        authority.owner_id(),
        &req.path,
        Permission::parse(&req.permission),
        ttl_hours,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(ShareResponse::for_owner(capability))),
    ))
}

/// GET /api/shares - List the caller's live share links.
pub async fn list_shares(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Json<ApiResponse<Vec<ShareResponse>>> {
    let links = state
        .shares
        .list_for(&claims.sub)
        .into_iter()
        .map(ShareResponse::for_owner)
        .collect();

    Json(ApiResponse::new(links))
}

/// DELETE /api/shares/:id - Revoke a share link.
pub async fn revoke_share(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.shares.revoke(&claims.sub, &id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Share link not found"))
    }
}

/// GET /api/shares/current - Describe the presented share link.
pub async fn current_share(
    State(state): State<Arc<AppState>>,
    share: ShareToken,
) -> Result<Json<ApiResponse<ShareResponse>>, ApiError> {
    let token = share
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("Missing share token"))?;
    let capability = state
        .shares
        .validate(token)
        .ok_or_else(|| ApiError::unauthorized("Share link is invalid or expired"))?;

    Ok(Json(ApiResponse::new(ShareResponse::for_bearer(capability))))
}
