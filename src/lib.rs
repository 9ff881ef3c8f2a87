//! Sharebox - per-tenant sandboxed file storage with share links.
//!
//! Each tenant owns a directory under the storage root. Share links grant
//! time-limited read or write access to one subtree of a tenant's files.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod share;
pub mod storage;
pub mod web;

pub use config::Config;
pub use error::{Result, ShareboxError};
pub use share::{Authority, Capability, CapabilityRegistry, Clock, Permission};
pub use storage::{QuotaAccountant, SpaceInfo, StorageService};
pub use web::{AppState, WebServer};
