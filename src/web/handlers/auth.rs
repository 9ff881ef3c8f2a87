//! Account handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::auth::User;
use crate::web::dto::{
    ApiResponse, AuthResponse, LoginRequest, MeResponse, RegisterRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, JwtClaims};

use super::AppState;

fn issue(state: &AppState, user: &User) -> Result<AuthResponse, ApiError> {
    let claims = JwtClaims::new(&user.uid, &user.email, state.token_expiry);
    Ok(AuthResponse {
        token: state.jwt.issue(&claims)?,
        uid: user.uid.clone(),
        expires_in: state.token_expiry,
    })
}

/// POST /api/auth/register - Create an account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let user = state.users.register(&req.email, &req.password)?;
    let response = issue(&state, &user)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(response))))
}

/// POST /api/auth/login - Exchange credentials for a token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let user = state.users.authenticate(&req.email, &req.password)?;
    tracing::info!(uid = %user.uid, "User logged in");

    Ok(Json(ApiResponse::new(issue(&state, &user)?)))
}

/// GET /api/auth/me - Current user.
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let user = state
        .users
        .get_by_uid(&claims.sub)
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ApiResponse::new(MeResponse {
        uid: user.uid,
        email: user.email,
        created_at: user.created_at,
    })))
}
