//! API handlers for the Web API.

pub mod auth;
pub mod files;
pub mod shares;
pub mod space;

pub use auth::*;
pub use files::*;
pub use shares::*;
pub use space::*;

use std::sync::Arc;

use crate::auth::UserRegistry;
use crate::config::Config;
use crate::share::{Authority, CapabilityRegistry, Clock, SystemClock};
use crate::storage::{QuotaAccountant, StorageService};
use crate::web::error::ApiError;
use crate::web::middleware::{JwtState, OptionalAuthUser, ShareToken};

/// Application state shared across handlers.
pub struct AppState {
    /// Registered accounts.
    pub users: UserRegistry,
    /// Active share links.
    pub shares: Arc<CapabilityRegistry>,
    /// Tenant file operations.
    pub storage: StorageService,
    /// Space accounting.
    pub quota: QuotaAccountant,
    /// JWT keys.
    pub jwt: Arc<JwtState>,
    /// Access token lifetime in seconds.
    pub token_expiry: u64,
    /// Share lifetime used when a request omits one.
    pub default_share_ttl: i64,
}

impl AppState {
    /// Build the state from configuration, using the system clock.
    pub fn new(config: &Config) -> crate::Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build the state with the share registry on the given clock.
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> crate::Result<Self> {
        let storage = StorageService::new(&config.storage.root_path, config.max_upload_bytes())?;
        let quota = QuotaAccountant::new(storage.root_path(), config.storage.quota_bytes);

        Ok(Self {
            users: UserRegistry::new(),
            shares: Arc::new(CapabilityRegistry::with_clock(clock)),
            storage,
            quota,
            jwt: Arc::new(JwtState::new(&config.auth.jwt_secret)),
            token_expiry: config.auth.jwt_expiry_secs,
            default_share_ttl: config.shares.default_ttl_hours,
        })
    }

    /// Resolve who a request acts for.
    pub fn authority(
        &self,
        user: &OptionalAuthUser,
        share: &ShareToken,
    ) -> Result<Authority, ApiError> {
        Ok(Authority::resolve(user.uid(), share.as_deref(), &self.shares)?)
    }
}
