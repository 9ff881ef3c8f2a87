//! Response DTOs for Web API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::share::{Capability, Permission};
use crate::storage::FileEntry;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Login and registration response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Access token (JWT).
    pub token: String,
    /// Tenant ID.
    pub uid: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Current user.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// Tenant ID.
    pub uid: String,
    /// Login email.
    pub email: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Directory listing.
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    /// Listed path as seen by the caller.
    pub path: String,
    /// Permission in force.
    pub permission: Permission,
    /// Whether the listing is through a share link.
    pub shared: bool,
    /// Entries, directories first.
    pub entries: Vec<FileEntry>,
}

/// Upload result.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Names the files were stored under.
    pub uploaded: Vec<String>,
    /// Client names of skipped files.
    pub skipped: Vec<String>,
    /// Number of stored files.
    pub count: usize,
}

/// Path of a created or deleted entry.
#[derive(Debug, Serialize)]
pub struct PathResponse {
    /// Logical path.
    pub path: String,
}

/// Share link.
#[derive(Debug, Serialize)]
pub struct ShareResponse {
    /// Short link ID.
    pub id: String,
    /// Bearer token. Only shown to the owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Shared path.
    pub path: String,
    /// Permission granted.
    pub permission: Permission,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

impl ShareResponse {
    /// Full view for the owner.
    pub fn for_owner(capability: Capability) -> Self {
        Self {
            id: capability.id,
            token: Some(capability.token),
            path: capability.scoped_path,
            permission: capability.permission,
            created_at: capability.created_at,
            expires_at: capability.expires_at,
        }
    }

    /// View for a share bearer, without the token.
    pub fn for_bearer(capability: Capability) -> Self {
        Self {
            token: None,
            ..Self::for_owner(capability)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::CapabilityRegistry;

    #[test]
    fn test_share_response_hides_token_from_bearer() {
        let registry = CapabilityRegistry::new();
        let link = registry.create("u1", "/docs", Permission::Read, 1).unwrap();

        let owner = serde_json::to_value(ShareResponse::for_owner(link.clone())).unwrap();
        assert_eq!(owner["token"], link.token);
        assert_eq!(owner["permission"], "read");
        assert_eq!(owner["path"], "/docs");

        let bearer = serde_json::to_value(ShareResponse::for_bearer(link)).unwrap();
        assert!(bearer.get("token").is_none());
    }
}
