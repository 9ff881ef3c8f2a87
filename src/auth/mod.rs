//! Accounts and password handling.
//!
//! This module provides Argon2id password hashing and the in-memory
//! account registry used for login.

mod password;
mod users;

pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use users::{generate_uid, User, UserRegistry};
