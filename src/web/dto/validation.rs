//! Validation utilities for Web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::share::Permission;
use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Malformed JSON is rejected with 400, failed validation with 422 and
/// field-level details.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

/// Reject strings containing control characters or NUL bytes.
pub fn no_control_chars(value: &str) -> Result<(), ValidationError> {
    if value.chars().any(|c| c.is_control()) {
        return Err(ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}

/// Accept only `read` or `write`.
pub fn valid_permission(value: &str) -> Result<(), ValidationError> {
    if Permission::parse(value) == Permission::Empty {
        return Err(ValidationError::new("permission")
            .with_message("Permission must be \"read\" or \"write\"".into()));
    }
    Ok(())
}
