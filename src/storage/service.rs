//! Storage operations for tenant trees.
//!
//! Every operation resolves its path through the caller's [`Authority`]
//! and then the sandbox, in that order:
//!
//! ```text
//! {root_path}/
//! ├── {owner_id}/
//! │   ├── docs/
//! │   │   └── report.txt
//! │   └── a.txt
//! └── ...
//! ```

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::sandbox;
use crate::share::{Authority, EffectiveAuthority};
use crate::{Result, ShareboxError};

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Entry name.
    pub name: String,
    /// Logical path as seen by the caller.
    pub path: String,
    /// Size in bytes (0 for directories on most platforms).
    pub size: u64,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Last modification time.
    pub modified: DateTime<Utc>,
}

/// One file of an upload batch.
#[derive(Debug)]
pub struct UploadItem<R> {
    /// Client-supplied file name. Any directory part is discarded.
    pub file_name: String,
    /// File content.
    pub reader: R,
}

impl<R: Read> UploadItem<R> {
    /// Create an upload item.
    pub fn new(file_name: impl Into<String>, reader: R) -> Self {
        Self {
            file_name: file_name.into(),
            reader,
        }
    }
}

/// Result of an upload batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    /// Names the files were stored under.
    pub uploaded: Vec<String>,
    /// Client names of files that were skipped.
    pub skipped: Vec<String>,
}

/// A file read for download.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// File name.
    pub name: String,
    /// File content.
    pub content: Vec<u8>,
}

/// Tenant file operations rooted at one storage directory.
#[derive(Debug, Clone)]
pub struct StorageService {
    /// Directory holding one subdirectory per tenant.
    root_path: PathBuf,
    /// Per-file upload limit in bytes.
    max_file_size: u64,
}

impl StorageService {
    /// Create a service rooted at `root_path`.
    ///
    /// The root directory will be created if it doesn't exist.
    pub fn new(root_path: impl Into<PathBuf>, max_file_size: u64) -> Result<Self> {
        let root_path = root_path.into();
        fs::create_dir_all(&root_path)?;

        Ok(Self {
            root_path,
            max_file_size,
        })
    }

    /// Get the storage root.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Per-file upload limit in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Physical root directory of a tenant.
    pub fn tenant_root(&self, owner_id: &str) -> Result<PathBuf> {
        sandbox::validate_owner_id(owner_id)?;
        Ok(self.root_path.join(owner_id))
    }

    /// Resolve a requested path to its physical location.
    fn physical(&self, effective: &EffectiveAuthority, requested: &str) -> Result<PathBuf> {
        let logical = effective.logical_path(requested)?;
        let tenant_root = self.tenant_root(&effective.owner_id)?;
        sandbox::resolve(&tenant_root, &logical)
    }

    /// Whether a path exists. The owner's root always exists.
    pub fn exists(&self, authority: &Authority, requested: &str) -> Result<bool> {
        let effective = authority.effective();
        if sandbox::is_root(requested)? && !effective.is_delegated {
            return Ok(true);
        }
        let physical = self.physical(&effective, requested)?;
        Ok(physical.symlink_metadata().is_ok())
    }

    /// Whether a path is a directory. The owner's root always is.
    pub fn is_dir(&self, authority: &Authority, requested: &str) -> Result<bool> {
        let effective = authority.effective();
        if sandbox::is_root(requested)? && !effective.is_delegated {
            return Ok(true);
        }
        Ok(self.physical(&effective, requested)?.is_dir())
    }

    /// List a directory.
    ///
    /// A missing directory lists as empty. Owners get the directory created
    /// on the way; share bearers never create anything by listing.
    pub fn list(&self, authority: &Authority, requested: &str) -> Result<Vec<FileEntry>> {
        let effective = authority.effective();
        let physical = self.physical(&effective, requested)?;
        let shown = sandbox::clean(requested)?;

        if !physical.exists() && !runs_through_file(&physical) {
            if !effective.is_delegated {
                fs::create_dir_all(&physical)?;
                debug!(owner = %effective.owner_id, path = %shown, "Created directory on list");
            }
            return Ok(Vec::new());
        }

        if !physical.is_dir() {
            return Err(ShareboxError::NotFound(format!("Directory {shown}")));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&physical)? {
            let Ok(entry) = entry else { continue };
            let Some(item) = Self::describe(&entry, &shown) else {
                continue;
            };
            entries.push(item);
        }

        entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
        Ok(entries)
    }

    /// Build a listing entry. Unreadable entries yield `None`.
    fn describe(entry: &fs::DirEntry, parent: &str) -> Option<FileEntry> {
        let name = entry.file_name().into_string().ok()?;
        let metadata = entry.metadata().ok()?;
        let modified = metadata.modified().ok()?;
        let path = sandbox::join_logical(parent, &name).ok()?;

        Some(FileEntry {
            name,
            path,
            size: metadata.len(),
            is_dir: metadata.is_dir(),
            modified: DateTime::<Utc>::from(modified),
        })
    }

    /// Store a batch of files in a directory.
    ///
    /// Name collisions are resolved by renaming to `base (n).ext`. Files
    /// that cannot be stored are skipped; the rest of the batch proceeds.
    pub fn upload<R, I>(
        &self,
        authority: &Authority,
        requested_dir: &str,
        items: I,
    ) -> Result<UploadOutcome>
    where
        R: Read,
        I: IntoIterator<Item = UploadItem<R>>,
    {
        let effective = authority.effective();
        effective.require_write()?;
        let dir = self.physical(&effective, requested_dir)?;

        if (dir.exists() && !dir.is_dir()) || runs_through_file(&dir) {
            return Err(ShareboxError::NotFound(format!(
                "Directory {}",
                sandbox::clean(requested_dir)?
            )));
        }
        fs::create_dir_all(&dir)?;

        let mut outcome = UploadOutcome::default();
        for item in items {
            let client_name = item.file_name.clone();
            match self.store_one(&dir, item) {
                Ok(stored) => outcome.uploaded.push(stored),
                Err(e) => {
                    warn!(
                        owner = %effective.owner_id,
                        file = %client_name,
                        error = %e,
                        "Skipping upload"
                    );
                    outcome.skipped.push(client_name);
                }
            }
        }

        info!(
            owner = %effective.owner_id,
            path = %requested_dir,
            uploaded = outcome.uploaded.len(),
            skipped = outcome.skipped.len(),
            delegated = effective.is_delegated,
            "Upload finished"
        );

        Ok(outcome)
    }

    /// Store a single file under a free name in `dir`.
    fn store_one<R: Read>(&self, dir: &Path, item: UploadItem<R>) -> Result<String> {
        let name = base_name(&item.file_name);
        sandbox::validate_entry_name(name)?;

        let stored_name = next_free_name(dir, name);
        let dest = dir.join(&stored_name);

        let mut file = File::create(&dest)?;
        let limit = self.max_file_size;
        let copied = match io::copy(&mut item.reader.take(limit.saturating_add(1)), &mut file) {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                let _ = fs::remove_file(&dest);
                return Err(e.into());
            }
        };

        if copied > limit {
            drop(file);
            let _ = fs::remove_file(&dest);
            return Err(ShareboxError::Validation(format!(
                "file exceeds {limit} bytes"
            )));
        }

        Ok(stored_name)
    }

    /// Read a regular file.
    pub fn download(&self, authority: &Authority, requested: &str) -> Result<DownloadedFile> {
        let effective = authority.effective();
        let physical = self.physical(&effective, requested)?;

        let metadata = match fs::metadata(&physical) {
            Ok(m) => m,
            Err(e) if is_missing(&e, &physical) => {
                return Err(ShareboxError::NotFound("File".to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(ShareboxError::InvalidPath(
                "cannot download a directory".to_string(),
            ));
        }

        let content = fs::read(&physical)?;
        let name = physical
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("download")
            .to_string();

        debug!(owner = %effective.owner_id, file = %name, size = content.len(), "File read");
        Ok(DownloadedFile { name, content })
    }

    /// Delete a file or directory tree.
    ///
    /// The root of the caller's view can never be deleted.
    pub fn delete(&self, authority: &Authority, requested: &str) -> Result<()> {
        let effective = authority.effective();
        effective.require_write()?;
        if sandbox::is_root(requested)? {
            return Err(ShareboxError::Forbidden(
                "cannot delete the root directory".to_string(),
            ));
        }

        let physical = self.physical(&effective, requested)?;
        let metadata = match physical.symlink_metadata() {
            Ok(m) => m,
            Err(e) if is_missing(&e, &physical) => {
                return Err(ShareboxError::NotFound("Path".to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            fs::remove_dir_all(&physical)?;
        } else {
            fs::remove_file(&physical)?;
        }

        info!(
            owner = %effective.owner_id,
            path = %requested,
            delegated = effective.is_delegated,
            "Deleted"
        );
        Ok(())
    }

    /// Create a new directory named `name` inside `parent`.
    ///
    /// Returns the logical path of the new directory as seen by the caller.
    pub fn mkdir(&self, authority: &Authority, parent: &str, name: &str) -> Result<String> {
        let effective = authority.effective();
        effective.require_write()?;
        sandbox::validate_entry_name(name)?;

        let shown = sandbox::join_logical(parent, name)?;
        let target = self.physical(&effective, &shown)?;

        if target.symlink_metadata().is_ok() {
            return Err(ShareboxError::Conflict(
                "directory already exists".to_string(),
            ));
        }
        if runs_through_file(&target) {
            return Err(ShareboxError::NotFound(format!(
                "Directory {}",
                sandbox::clean(parent)?
            )));
        }
        fs::create_dir_all(&target)?;

        info!(owner = %effective.owner_id, path = %shown, "Directory created");
        Ok(shown)
    }
}

/// Whether some ancestor of `physical` exists but is not a directory.
fn runs_through_file(physical: &Path) -> bool {
    physical
        .ancestors()
        .skip(1)
        .any(|ancestor| ancestor.metadata().is_ok_and(|m| !m.is_dir()))
}

/// Whether a stat failure means the path does not exist.
fn is_missing(err: &io::Error, physical: &Path) -> bool {
    err.kind() == io::ErrorKind::NotFound || runs_through_file(physical)
}

/// Strip any directory part from a client-supplied file name.
fn base_name(file_name: &str) -> &str {
    file_name.rsplit(['/', '\\']).next().unwrap_or(file_name)
}

/// Smallest free name for `name` in `dir`.
///
/// Tries `name`, then `base (1).ext`, `base (2).ext`, ... in order. The
/// scan is not atomic against concurrent writers.
pub fn next_free_name(dir: &Path, name: &str) -> String {
    let taken = |candidate: &str| dir.join(candidate).symlink_metadata().is_ok();
    if !taken(name) {
        return name.to_string();
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let ext = path.extension().and_then(|s| s.to_str());

    let mut n = 1u64;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
