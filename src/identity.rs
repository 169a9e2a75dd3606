//! Lock identity resolution.
//!
//! The lock identity is the filesystem path that names the singleton. An
//! explicit `-l/--lockfile` path is used verbatim; otherwise the path is
//! derived as `<lock-directory>/solo-lock-<basename-of-command>`, where the
//! lock directory is the first of `/var/lock` and `/tmp` that probes as a
//! directory.

use crate::error::{Result, SoloError};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

/// Candidate lock directories, probed in order.
const LOCK_DIR_CANDIDATES: &[&str] = &["/var/lock", "/tmp"];

/// Fallback when every candidate probes cleanly but none is a directory.
const LOCK_DIR_FALLBACK: &str = ".";

/// Filename prefix for derived lock identities.
const LOCK_NAME_PREFIX: &str = "solo-lock-";

/// Resolve the lock identity for the wrapped command.
///
/// An explicit path short-circuits the search and derivation entirely.
pub fn resolve(explicit: Option<PathBuf>, command: &OsStr) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let dir = find_lock_dir(LOCK_DIR_CANDIDATES)?;
    derive_identity(&dir, command)
}

/// Find the first candidate that is a directory.
///
/// A probe failure aborts the whole search rather than moving on to the
/// next candidate: any filesystem anomaly on the probe is treated as fatal.
fn find_lock_dir(candidates: &[&str]) -> Result<PathBuf> {
    for candidate in candidates {
        let meta = fs::metadata(candidate)
            .map_err(|e| SoloError::Resolution(format!("cannot probe '{}': {}", candidate, e)))?;

        if meta.is_dir() {
            return Ok(PathBuf::from(candidate));
        }
    }

    // Reachable only when every candidate exists as a non-directory.
    Ok(PathBuf::from(LOCK_DIR_FALLBACK))
}

/// Derive `<dir>/solo-lock-<basename>` from the wrapped command's path.
fn derive_identity(dir: &Path, command: &OsStr) -> Result<PathBuf> {
    let basename = Path::new(command)
        .file_name()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| SoloError::InvalidCommandName(command.to_string_lossy().into_owned()))?;

    let mut file_name = OsString::from(LOCK_NAME_PREFIX);
    file_name.push(basename);
    let path = dir.join(file_name);

    let len = path.as_os_str().len();
    if len >= libc::PATH_MAX as usize {
        return Err(SoloError::PathTooLong(len));
    }

    Ok(path)
}
