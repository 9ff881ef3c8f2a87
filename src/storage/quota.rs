//! Space accounting per tenant.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use super::sandbox;
use crate::Result;

const BYTES_PER_GB: f64 = (1u64 << 30) as f64;

/// Space usage of a single tenant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpaceInfo {
    /// Bytes used by regular files.
    pub used: u64,
    /// Configured ceiling in bytes.
    pub max: u64,
    /// `used` in GiB.
    pub used_gb: f64,
    /// `max` in GiB.
    pub max_gb: f64,
    /// Percentage of the ceiling in use.
    pub percent: f64,
}

impl SpaceInfo {
    /// Build a report from a byte count and ceiling.
    pub fn new(used: u64, max: u64) -> Self {
        let percent = if max == 0 {
            0.0
        } else {
            used as f64 / max as f64 * 100.0
        };

        Self {
            used,
            max,
            used_gb: used as f64 / BYTES_PER_GB,
            max_gb: max as f64 / BYTES_PER_GB,
            percent,
        }
    }
}

/// Computes space usage by walking a tenant's tree on every call.
///
/// Nothing is cached: each query costs one full walk of the tenant root.
/// The quota is advisory and is never enforced on writes.
#[derive(Debug, Clone)]
pub struct QuotaAccountant {
    storage_root: PathBuf,
    max_bytes: u64,
}

impl QuotaAccountant {
    /// Create an accountant for tenants living under `storage_root`.
    pub fn new(storage_root: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            storage_root: storage_root.into(),
            max_bytes,
        }
    }

    /// Per-tenant ceiling in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Report the space used by `owner_id`.
    ///
    /// A tenant without a root yet uses zero bytes; the root is not created.
    pub fn usage(&self, owner_id: &str) -> Result<SpaceInfo> {
        sandbox::validate_owner_id(owner_id)?;
        let tenant_root = self.storage_root.join(owner_id);

        if !tenant_root.exists() {
            return Ok(SpaceInfo::new(0, self.max_bytes));
        }

        let used = dir_size(&tenant_root)?;
        Ok(SpaceInfo::new(used, self.max_bytes))
    }
}

/// Sum the sizes of every non-directory entry below `dir`.
///
/// Symbolic links are not followed; their own metadata is counted.
fn dir_size(dir: &Path) -> Result<u64> {
    let mut size = 0;
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            size += entry.metadata()?.len();
        }
    }
    Ok(size)
}
