//! Middleware and extractors for the Web API.

pub mod auth;
pub mod cors;
pub mod share;

pub use auth::{jwt_auth, AuthUser, JwtClaims, JwtState, OptionalAuthUser};
pub use cors::create_cors_layer;
pub use share::{ShareToken, SHARE_TOKEN_HEADER, SHARE_TOKEN_PARAM};
