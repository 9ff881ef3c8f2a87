//! JWT authentication middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::web::error::ApiError;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (tenant ID).
    pub sub: String,
    /// Login email.
    pub email: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
}

impl JwtClaims {
    /// Claims for a freshly issued token.
    pub fn new(uid: &str, email: &str, expiry_secs: u64) -> Self {
        let now = chrono::Utc::now().timestamp() as u64;
        Self {
            sub: uid.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + expiry_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Keys for issuing and verifying tokens.
#[derive(Clone)]
pub struct JwtState {
    /// Encoding key for JWT issuance.
    pub encoding_key: EncodingKey,
    /// Decoding key for JWT verification.
    pub decoding_key: DecodingKey,
    /// Validation settings.
    pub validation: Validation,
}

impl JwtState {
    /// Create a new JWT state from a secret key.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for the given claims.
    pub fn issue(&self, claims: &JwtClaims) -> Result<String, ApiError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, ApiError> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                ApiError::unauthorized("Invalid or expired token")
            })
    }
}

/// Read a query parameter, URL-decoded.
pub(crate) fn query_param(parts: &Parts, name: &str) -> Option<String> {
    parts.uri.query()?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key == name {
            urlencoding::decode(value).ok().map(|s| s.into_owned())
        } else {
            None
        }
    })
}

/// Bearer token from the Authorization header, or the `token` query
/// parameter (browser downloads).
fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .or_else(|| query_param(parts, "token"))
}

/// Extractor for authenticated users.
#[derive(Debug, Clone)]
pub struct AuthUser(pub JwtClaims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(parts).ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

        let jwt_state = parts
            .extensions
            .get::<Arc<JwtState>>()
            .ok_or_else(|| ApiError::internal("JWT state not configured"))?;

        Ok(AuthUser(jwt_state.verify(&token)?))
    }
}

/// Optional authentication extractor.
///
/// A missing or invalid token yields `None`.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<JwtClaims>);

impl OptionalAuthUser {
    /// Tenant ID of the authenticated caller.
    pub fn uid(&self) -> Option<&str> {
        self.0.as_ref().map(|claims| claims.sub.as_str())
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(OptionalAuthUser(None));
        };
        let Some(jwt_state) = parts.extensions.get::<Arc<JwtState>>() else {
            return Ok(OptionalAuthUser(None));
        };

        Ok(OptionalAuthUser(jwt_state.verify(&token).ok()))
    }
}

/// Middleware function to inject JWT state into request extensions.
pub async fn jwt_auth(
    jwt_state: Arc<JwtState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}
