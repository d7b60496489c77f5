//! Cache path utilities and constants

use std::path::{Path, PathBuf};

use crate::error::{ProvenanceError, Result};
use crate::model::RepositoryIdentity;

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "PROVENANCE_CACHE_DIR";

/// Default cache directory name under user's cache directory
const CACHE_DIR: &str = "provenance";

/// Working trees subdirectory within cache
pub const TREES_DIR: &str = "trees";

/// Provenance storage subdirectory within cache
pub const STORAGE_DIR: &str = "storage";

const READY_EXTENSION: &str = "ready";

const LOCK_EXTENSION: &str = "lock";

/// Get the default cache directory path
///
/// Uses the platform's standard cache location with a `provenance`
/// subdirectory. Can be overridden with the `PROVENANCE_CACHE_DIR` environment
/// variable.
pub fn cache_dir() -> Result<PathBuf> {
    if let Ok(cache_dir) = std::env::var(CACHE_DIR_ENV) {
        if !cache_dir.trim().is_empty() {
            return Ok(PathBuf::from(cache_dir));
        }
    }

    let base = dirs::cache_dir().ok_or_else(|| ProvenanceError::IoError {
        message: "Could not determine cache directory".to_string(),
    })?;

    Ok(base.join(CACHE_DIR))
}

/// Directory name of the working tree for a repository identity.
///
/// Hashing keeps names path-safe and fixed-length whatever the URL.
pub fn tree_dir_name(identity: &RepositoryIdentity) -> String {
    let hash = blake3::hash(identity.to_string().as_bytes());
    hash.to_hex()[..32].to_string()
}

/// Marker recording that the working tree next to it finished initializing
pub fn ready_marker(tree_dir: &Path) -> PathBuf {
    tree_dir.with_extension(READY_EXTENSION)
}

/// Advisory lock file guarding the working tree next to it
pub fn lock_file(tree_dir: &Path) -> PathBuf {
    tree_dir.with_extension(LOCK_EXTENSION)
}
