//! Space usage handler.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::storage::SpaceInfo;
use crate::web::dto::ApiResponse;
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::AppState;

/// GET /api/space - Space used by the authenticated tenant.
pub async fn get_space(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<SpaceInfo>>, ApiError> {
    let info = state.quota.usage(&claims.sub)?;
    Ok(Json(ApiResponse::new(info)))
}
