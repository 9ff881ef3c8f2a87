//! Tenant file storage.
//!
//! This module provides:
//! - Path sandboxing for tenant trees
//! - File operations (list, upload, download, delete, mkdir)
//! - Space accounting

mod quota;
pub mod sandbox;
mod service;

pub use quota::{QuotaAccountant, SpaceInfo};
pub use service::{
    next_free_name, DownloadedFile, FileEntry, StorageService, UploadItem, UploadOutcome,
};

/// Default per-file upload limit (100 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Default per-tenant quota (5 GiB).
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024 * 1024;
