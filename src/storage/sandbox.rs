//! Path sandboxing.
//!
//! Every physical path handed to the filesystem is built here. A logical
//! path is split into segments, `.` and empty segments are dropped, and any
//! `..` segment rejects the whole path. The surviving segments are joined
//! onto the tenant root, so the result can never leave it.

use std::path::{Component, Path, PathBuf};

use crate::{Result, ShareboxError};

/// Maximum length of a single entry name in bytes.
pub const MAX_NAME_LENGTH: usize = 255;

/// Characters that are never allowed in a file or directory name.
const RESERVED_CHARS: &[char] = &['/', '\\', '<', '>', ':', '"', '|', '?', '*'];

/// Split a logical path into its cleaned segments.
fn segments(logical: &str) -> Result<Vec<&str>> {
    let mut out = Vec::new();

    for segment in logical.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(ShareboxError::InvalidPath(
                    "path traversal attempt".to_string(),
                ))
            }
            _ => {}
        }

        if segment.contains('\0') {
            return Err(ShareboxError::InvalidPath(
                "path contains NUL byte".to_string(),
            ));
        }

        // Anything other than one plain component (e.g. a drive prefix) is refused.
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => out.push(segment),
            _ => {
                return Err(ShareboxError::InvalidPath(format!(
                    "invalid path segment: {segment}"
                )))
            }
        }
    }

    Ok(out)
}

/// Normalize a logical path into its canonical `/a/b` form.
///
/// The root is returned as `/`.
pub fn clean(logical: &str) -> Result<String> {
    let parts = segments(logical)?;
    Ok(format!("/{}", parts.join("/")))
}

/// Join a relative logical path onto a logical base path.
///
/// Both halves are cleaned independently, so the relative part cannot climb
/// out of `base`.
pub fn join_logical(base: &str, relative: &str) -> Result<String> {
    let mut parts = segments(base)?;
    parts.extend(segments(relative)?);
    Ok(format!("/{}", parts.join("/")))
}

/// Whether a logical path denotes the root.
pub fn is_root(logical: &str) -> Result<bool> {
    Ok(segments(logical)?.is_empty())
}

/// Resolve a logical path to a physical path under `tenant_root`.
pub fn resolve(tenant_root: &Path, logical: &str) -> Result<PathBuf> {
    let mut physical = tenant_root.to_path_buf();
    for segment in segments(logical)? {
        physical.push(segment);
    }
    Ok(physical)
}

/// Validate an owner ID for use as the tenant's directory name.
pub fn validate_owner_id(owner_id: &str) -> Result<()> {
    validate_entry_name(owner_id)
        .map_err(|_| ShareboxError::InvalidPath(format!("invalid owner id: {owner_id:?}")))
}

/// Validate a single file or directory name.
pub fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(ShareboxError::InvalidPath("invalid name".to_string()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ShareboxError::InvalidPath(format!(
            "name longer than {MAX_NAME_LENGTH} bytes"
        )));
    }
    if name
        .chars()
        .any(|c| c.is_control() || RESERVED_CHARS.contains(&c))
    {
        return Err(ShareboxError::InvalidPath(format!(
            "name contains reserved characters: {name:?}"
        )));
    }
    Ok(())
}
