//! Identity resolution.
//!
//! Requests act either as the tenant themselves or as the bearer of a share
//! link. [`Authority`] captures which, and every storage operation starts
//! from it.

use super::registry::{Capability, CapabilityRegistry, Permission};
use crate::storage::sandbox;
use crate::{Result, ShareboxError};

/// Who a request acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authority {
    /// The authenticated tenant, with full rights over their own tree.
    Owned {
        /// Tenant ID.
        owner_id: String,
    },
    /// The bearer of a share link, confined to its scoped path.
    Delegated {
        /// The validated share link.
        capability: Capability,
    },
}

/// The resolved (owner, base path, permission) tuple a storage operation
/// runs under.
///
/// `base_path` is the root of the caller's view of the owner's tree: `/`
/// for the owner, the share's scope for a share bearer. Requested paths are
/// always relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveAuthority {
    /// Tenant whose tree is accessed.
    pub owner_id: String,
    /// Logical root of the caller's view.
    pub base_path: String,
    /// Permission in force.
    pub permission: Permission,
    /// Whether the request acts through a share link.
    pub is_delegated: bool,
}

impl EffectiveAuthority {
    /// Fail with `Forbidden` unless writes are allowed.
    pub fn require_write(&self) -> Result<()> {
        if self.permission.can_write() {
            Ok(())
        } else {
            Err(ShareboxError::Forbidden(
                "write permission required".to_string(),
            ))
        }
    }

    /// Map a requested path onto a logical path in the owner's tree.
    pub fn logical_path(&self, requested: &str) -> Result<String> {
        sandbox::join_logical(&self.base_path, requested)
    }
}

impl Authority {
    /// Resolve the authority for a request.
    ///
    /// A presented share token always wins over the caller's own identity.
    /// An unknown or expired token is rejected even if the caller is
    /// authenticated.
    pub fn resolve(
        authenticated: Option<&str>,
        share_token: Option<&str>,
        registry: &CapabilityRegistry,
    ) -> Result<Self> {
        if let Some(token) = share_token {
            return registry
                .validate(token)
                .map(|capability| Authority::Delegated { capability })
                .ok_or_else(|| {
                    ShareboxError::Unauthorized("share link is invalid or expired".to_string())
                });
        }

        match authenticated {
            Some(owner_id) => Ok(Authority::Owned {
                owner_id: owner_id.to_string(),
            }),
            None => Err(ShareboxError::Unauthorized(
                "authentication required".to_string(),
            )),
        }
    }

    /// Tenant whose tree is accessed.
    pub fn owner_id(&self) -> &str {
        match self {
            Authority::Owned { owner_id } => owner_id,
            Authority::Delegated { capability } => &capability.owner_id,
        }
    }

    /// Permission in force.
    pub fn permission(&self) -> Permission {
        match self {
            Authority::Owned { .. } => Permission::Write,
            Authority::Delegated { capability } => capability.permission,
        }
    }

    /// Whether the request acts through a share link.
    pub fn is_delegated(&self) -> bool {
        matches!(self, Authority::Delegated { .. })
    }

    /// Fail with `Forbidden` unless writes are allowed.
    pub fn require_write(&self) -> Result<()> {
        self.effective().require_write()
    }

    /// Map a requested path onto a logical path in the owner's tree.
    ///
    /// Owners address their tree directly. Share bearers address paths
    /// relative to the share's scope.
    pub fn logical_path(&self, requested: &str) -> Result<String> {
        self.effective().logical_path(requested)
    }

    /// Collapse into the effective authority storage operations run under.
    pub fn effective(&self) -> EffectiveAuthority {
        let base_path = match self {
            Authority::Owned { .. } => "/".to_string(),
            Authority::Delegated { capability } => capability.scoped_path.clone(),
        };

        EffectiveAuthority {
            owner_id: self.owner_id().to_string(),
            base_path,
            permission: self.permission(),
            is_delegated: self.is_delegated(),
        }
    }
}
