//! Error types for Sharebox.

use thiserror::Error;

/// Common error type for Sharebox.
///
/// Every core operation classifies its failure into one of these kinds; the
/// web layer maps each kind onto a stable HTTP status.
#[derive(Error, Debug)]
pub enum ShareboxError {
    /// Traversal attempt or malformed path segment.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Missing or invalid identity or share token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Valid identity but insufficient permission.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Target already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<walkdir::Error> for ShareboxError {
    fn from(e: walkdir::Error) -> Self {
        ShareboxError::Io(e.into())
    }
}

/// Result type alias for Sharebox operations.
pub type Result<T> = std::result::Result<T, ShareboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_display() {
        let err = ShareboxError::InvalidPath("path traversal attempt".to_string());
        assert_eq!(err.to_string(), "invalid path: path traversal attempt");
    }

    #[test]
    fn test_forbidden_display() {
        let err = ShareboxError::Forbidden("write permission required".to_string());
        assert_eq!(err.to_string(), "forbidden: write permission required");
    }

    #[test]
    fn test_not_found_display() {
        let err = ShareboxError::NotFound("file".to_string());
        assert_eq!(err.to_string(), "file not found");
    }

    #[test]
    fn test_conflict_display() {
        let err = ShareboxError::Conflict("directory already exists".to_string());
        assert_eq!(err.to_string(), "conflict: directory already exists");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ShareboxError = io_err.into();
        assert!(matches!(err, ShareboxError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(ShareboxError::Unauthorized("test".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
