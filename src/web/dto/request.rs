//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{no_control_chars, valid_permission};

fn default_path() -> String {
    "/".to_string()
}

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login email.
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Directory creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct MkdirRequest {
    /// Parent directory.
    #[serde(default = "default_path")]
    #[validate(custom(function = "no_control_chars"))]
    pub path: String,
    /// Name of the new directory.
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Share link creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateShareRequest {
    /// Path to share.
    #[serde(default = "default_path")]
    #[validate(custom(function = "no_control_chars"))]
    pub path: String,
    /// `read` or `write`.
    #[validate(custom(function = "valid_permission"))]
    pub permission: String,
    /// Lifetime in hours. Missing or non-positive uses the default.
    #[serde(default)]
    #[validate(range(max = 8760, message = "TTL must be at most one year"))]
    pub ttl_hours: Option<i64>,
}

/// `?path=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    /// Requested path; root when absent.
    pub path: Option<String>,
}

impl PathQuery {
    /// Requested path, defaulting to the root.
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("/")
    }
}
