//! In-memory user accounts.

use std::collections::HashMap;
use std::io;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use tracing::info;

use super::password::{hash_password, verify_password, PasswordError};
use crate::{Result, ShareboxError};

/// Bytes of randomness in a user ID.
const UID_BYTES: usize = 16;

/// A registered account.
#[derive(Debug, Clone)]
pub struct User {
    /// Tenant ID, 32 hex characters.
    pub uid: String,
    /// Login email (lowercase).
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Generate a fresh tenant ID.
pub fn generate_uid() -> String {
    let mut bytes = [0u8; UID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Accounts keyed by email.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: RwLock<HashMap<String, User>>,
}

impl UserRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, User>> {
        self.users.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, User>> {
        self.users.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a new account.
    pub fn register(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        if self.read().contains_key(&email) {
            return Err(ShareboxError::Conflict("email already registered".to_string()));
        }

        let password_hash = hash_password(password).map_err(password_error)?;
        let user = User {
            uid: generate_uid(),
            email: email.clone(),
            password_hash,
            created_at: Utc::now(),
        };

        let mut users = self.write();
        if users.contains_key(&email) {
            return Err(ShareboxError::Conflict("email already registered".to_string()));
        }
        users.insert(email, user.clone());
        drop(users);

        info!(uid = %user.uid, "User registered");
        Ok(user)
    }

    /// Check credentials.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let invalid = || ShareboxError::Unauthorized("invalid email or password".to_string());

        let user = self.read().get(&normalize_email(email)).cloned().ok_or_else(invalid)?;
        verify_password(password, &user.password_hash).map_err(|_| invalid())?;

        Ok(user)
    }

    /// Look up an account by tenant ID.
    pub fn get_by_uid(&self, uid: &str) -> Option<User> {
        self.read().values().find(|u| u.uid == uid).cloned()
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no account exists.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

fn password_error(e: PasswordError) -> ShareboxError {
    match e {
        PasswordError::TooShort | PasswordError::TooLong => {
            ShareboxError::Validation(e.to_string())
        }
        other => ShareboxError::Io(io::Error::other(other.to_string())),
    }
}
