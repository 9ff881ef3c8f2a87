//! In-memory share link registry.
//!
//! Share links are capabilities: whoever presents the token acts as the
//! owner within the scoped path, limited by the link's permission. Links
//! live only for the process lifetime. Expiry is lazy: an expired link is
//! treated as invalid on lookup and pruned only by [`CapabilityRegistry::cleanup_expired`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};
use serde::Serialize;
use tracing::{debug, info};

use crate::storage::sandbox;
use crate::{Result, ShareboxError};

/// Lifetime used when a share is created with a non-positive TTL.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Longest lifetime a configured default TTL may have (one year).
pub const MAX_TTL_HOURS: i64 = 24 * 365;

/// Random bytes in a share token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Random bytes in a short share ID.
const SHORT_ID_BYTES: usize = 4;

/// Permission granted by a share link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// List and download only.
    Read,
    /// Read plus upload, mkdir and delete.
    Write,
    /// Unrecognized permission string; never allows writes.
    #[serde(rename = "")]
    Empty,
}

impl Permission {
    /// Parse a permission string.
    ///
    /// Anything other than `read` or `write` yields [`Permission::Empty`].
    pub fn parse(s: &str) -> Self {
        match s {
            "read" => Permission::Read,
            "write" => Permission::Write,
            _ => Permission::Empty,
        }
    }

    /// String representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Empty => "",
        }
    }

    /// Whether this permission allows mutating operations.
    pub fn can_write(&self) -> bool {
        matches!(self, Permission::Write)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time source for expiry decisions.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by `Utc::now`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    /// Short, human-referenceable ID. Unique only together with `owner_id`.
    pub id: String,
    /// Full bearer token.
    pub token: String,
    /// Tenant whose tree the link points into.
    pub owner_id: String,
    /// Cleaned logical path the link is rooted at.
    pub scoped_path: String,
    /// Granted permission.
    pub permission: Permission,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time; the link is invalid from this instant on.
    pub expires_at: DateTime<Utc>,
}

impl Capability {
    /// Whether the link is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Generate an unguessable share token from the OS RNG.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a short share ID. Collisions are possible and tolerated.
pub fn generate_short_id() -> String {
    let bytes: [u8; SHORT_ID_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Thread-safe registry of share links, keyed by full token.
pub struct CapabilityRegistry {
    links: RwLock<HashMap<String, Capability>>,
    clock: Arc<dyn Clock>,
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("links", &self.len())
            .finish_non_exhaustive()
    }
}

impl CapabilityRegistry {
    /// Create an empty registry using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty registry using the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            links: RwLock::new(HashMap::new()),
            clock,
        }
    }

    // Poisoning is ignored: every mutation leaves the map consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Capability>> {
        self.links.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Capability>> {
        self.links.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Issue a new share link.
    ///
    /// `ttl_hours <= 0` falls back to [`DEFAULT_TTL_HOURS`]. A TTL whose
    /// expiry cannot be represented is rejected with `Validation`.
    pub fn create(
        &self,
        owner_id: &str,
        scoped_path: &str,
        permission: Permission,
        ttl_hours: i64,
    ) -> Result<Capability> {
        let scoped_path = sandbox::clean(scoped_path)?;
        let ttl_hours = if ttl_hours <= 0 {
            DEFAULT_TTL_HOURS
        } else {
            ttl_hours
        };

        let created_at = self.clock.now();
        let expires_at = Duration::try_hours(ttl_hours)
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .ok_or_else(|| {
                ShareboxError::Validation(format!("TTL of {ttl_hours} hours is too large"))
            })?;

        let capability = Capability {
            id: generate_short_id(),
            token: generate_token(),
            owner_id: owner_id.to_string(),
            scoped_path,
            permission,
            created_at,
            expires_at,
        };

        self.write()
            .insert(capability.token.clone(), capability.clone());

        info!(
            owner = %capability.owner_id,
            share_id = %capability.id,
            path = %capability.scoped_path,
            permission = %capability.permission,
            "Share link created"
        );

        Ok(capability)
    }

    /// Look up a token. Returns `None` if unknown or expired.
    ///
    /// Never mutates the registry.
    pub fn validate(&self, token: &str) -> Option<Capability> {
        let now = self.clock.now();
        let links = self.read();
        match links.get(token) {
            Some(link) if !link.is_expired_at(now) => Some(link.clone()),
            Some(link) => {
                debug!(share_id = %link.id, "Share link expired");
                None
            }
            None => None,
        }
    }

    /// All live share links owned by `owner_id`, newest first.
    pub fn list_for(&self, owner_id: &str) -> Vec<Capability> {
        let now = self.clock.now();
        let mut links: Vec<Capability> = self
            .read()
            .values()
            .filter(|link| link.owner_id == owner_id && !link.is_expired_at(now))
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        links
    }

    /// Revoke a share link by short ID.
    ///
    /// Only removes links that also belong to `owner_id`. Returns `false`
    /// if no such link exists.
    pub fn revoke(&self, owner_id: &str, id: &str) -> bool {
        let mut links = self.write();
        let before = links.len();
        links.retain(|_, link| !(link.id == id && link.owner_id == owner_id));
        let removed = before - links.len();

        if removed > 0 {
            info!(owner = %owner_id, share_id = %id, "Share link revoked");
        }
        removed > 0
    }

    /// Drop every expired link. Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut links = self.write();
        let before = links.len();
        links.retain(|_, link| !link.is_expired_at(now));
        before - links.len()
    }

    /// Number of stored links, including expired ones not yet pruned.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the registry holds no links.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Clock that only moves when told to.
    pub(crate) struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        pub(crate) fn new(start: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(start)))
        }

        pub(crate) fn set(&self, at: DateTime<Utc>) {
            *self.0.lock().unwrap() = at;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn setup() -> (Arc<ManualClock>, CapabilityRegistry) {
        let clock = ManualClock::new(Utc::now());
        let registry = CapabilityRegistry::with_clock(clock.clone());
        (clock, registry)
    }

    #[test]
    fn test_permission_parse() {
        assert_eq!(Permission::parse("read"), Permission::Read);
        assert_eq!(Permission::parse("write"), Permission::Write);
        assert_eq!(Permission::parse("WRITE"), Permission::Empty);
        assert_eq!(Permission::parse("admin"), Permission::Empty);
        assert!(Permission::Write.can_write());
        assert!(!Permission::Read.can_write());
        assert!(!Permission::Empty.can_write());
    }

    #[test]
    fn test_generate_token_and_id() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());

        let id = generate_short_id();
        assert_eq!(id.len(), SHORT_ID_BYTES * 2);
    }

    #[test]
    fn test_create_and_validate() {
        let (_clock, registry) = setup();

        let link = registry
            .create("u1", "docs/", Permission::Read, 1)
            .unwrap();

        assert_eq!(link.owner_id, "u1");
        assert_eq!(link.scoped_path, "/docs");
        assert_eq!(link.expires_at - link.created_at, Duration::hours(1));
        assert_ne!(link.id, link.token);

        let found = registry.validate(&link.token).unwrap();
        assert_eq!(found, link);
        assert!(registry.validate("unknown").is_none());
    }

    #[test]
    fn test_create_rejects_traversal() {
        let (_clock, registry) = setup();
        assert!(registry
            .create("u1", "/a/../../b", Permission::Read, 1)
            .is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_zero_ttl_defaults_to_24_hours() {
        let (clock, registry) = setup();

        let link = registry.create("u1", "/", Permission::Read, 0).unwrap();
        assert_eq!(link.expires_at - link.created_at, Duration::hours(24));

        let negative = registry.create("u1", "/", Permission::Read, -5).unwrap();
        assert_eq!(negative.expires_at - negative.created_at, Duration::hours(24));

        clock.set(link.expires_at - Duration::seconds(1));
        assert!(registry.validate(&link.token).is_some());

        clock.set(link.expires_at);
        assert!(registry.validate(&link.token).is_none());

        clock.set(link.expires_at + Duration::seconds(1));
        assert!(registry.validate(&link.token).is_none());
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        let (_clock, registry) = setup();

        for ttl in [i64::MAX / 3600, i64::MAX] {
            let result = registry.create("u1", "/", Permission::Read, ttl);
            assert!(matches!(result, Err(ShareboxError::Validation(_))));
        }
        assert!(registry.is_empty());

        let year = registry
            .create("u1", "/", Permission::Read, MAX_TTL_HOURS)
            .unwrap();
        assert_eq!(year.expires_at - year.created_at, Duration::hours(MAX_TTL_HOURS));
    }

    #[test]
    fn test_validate_does_not_prune() {
        let (clock, registry) = setup();
        let link = registry.create("u1", "/", Permission::Read, 1).unwrap();

        clock.set(link.expires_at + Duration::seconds(1));
        assert!(registry.validate(&link.token).is_none());
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.cleanup_expired(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_for_owner_only() {
        let (clock, registry) = setup();
        let start = clock.now();

        let a = registry.create("u1", "/a", Permission::Read, 1).unwrap();
        clock.set(start + Duration::seconds(10));
        let b = registry.create("u1", "/b", Permission::Write, 48).unwrap();
        registry.create("u2", "/c", Permission::Read, 1).unwrap();

        let links = registry.list_for("u1");
        assert_eq!(links.len(), 2);
        // Newest first
        assert_eq!(links[0].id, b.id);
        assert_eq!(links[1].id, a.id);

        clock.set(a.expires_at);
        let links = registry.list_for("u1");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, b.id);

        assert!(registry.list_for("u3").is_empty());
    }

    #[test]
    fn test_revoke_requires_owner() {
        let (_clock, registry) = setup();
        let link = registry.create("u2", "/", Permission::Write, 1).unwrap();

        assert!(!registry.revoke("u1", &link.id));
        assert!(registry.validate(&link.token).is_some());
        assert_eq!(registry.list_for("u2").len(), 1);

        assert!(registry.revoke("u2", &link.id));
        assert!(registry.validate(&link.token).is_none());
        assert!(!registry.revoke("u2", &link.id));
    }

    #[test]
    fn test_revoke_with_colliding_ids() {
        let (_clock, registry) = setup();
        let mine = registry.create("u1", "/", Permission::Read, 1).unwrap();
        let theirs = registry.create("u2", "/", Permission::Read, 1).unwrap();

        // Force an ID collision across owners
        {
            let mut links = registry.write();
            links.get_mut(&theirs.token).unwrap().id = mine.id.clone();
        }

        assert!(registry.revoke("u1", &mine.id));
        assert!(registry.validate(&mine.token).is_none());
        assert!(registry.validate(&theirs.token).is_some());
    }

    #[test]
    fn test_concurrent_validate_and_create() {
        let registry = Arc::new(CapabilityRegistry::new());
        let link = registry.create("u1", "/", Permission::Read, 1).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                let token = link.token.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        assert!(registry.validate(&token).is_some());
                        registry
                            .create(&format!("owner{i}"), "/", Permission::Read, 1)
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 1 + 8 * 50);
    }
}
