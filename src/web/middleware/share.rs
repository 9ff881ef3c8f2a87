//! Share token extraction.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::auth::query_param;

/// Header carrying a share token.
pub const SHARE_TOKEN_HEADER: &str = "x-share-token";

/// Query parameter carrying a share token.
pub const SHARE_TOKEN_PARAM: &str = "share";

/// The share token presented with a request, if any.
///
/// Read from the `X-Share-Token` header, falling back to the `share` query
/// parameter. Empty values count as absent.
#[derive(Debug, Clone, Default)]
pub struct ShareToken(pub Option<String>);

impl ShareToken {
    /// The presented token.
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ShareToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(SHARE_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .or_else(|| query_param(parts, SHARE_TOKEN_PARAM))
            .filter(|t| !t.is_empty());

        Ok(ShareToken(token))
    }
}
