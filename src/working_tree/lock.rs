//! Cross-process locking of working trees

use std::path::{Path, PathBuf};

use fslock::LockFile;

use crate::error::{Result, working_tree};

/// RAII guard for a working tree on disk
///
/// Acquires an advisory file lock on creation and releases it on drop, so
/// separate processes (or caches) sharing one cache directory never use the
/// same tree at once.
#[derive(Debug)]
pub struct TreeLock {
    lock: LockFile,
    path: PathBuf,
}

impl TreeLock {
    /// Block until the lock at `path` is held
    pub fn acquire(path: &Path, url: &str) -> Result<Self> {
        let mut lock = LockFile::open(path)
            .map_err(|e| working_tree::failed(url, format!("Failed to open lock file {}: {e}", path.display())))?;
        lock.lock()
            .map_err(|e| working_tree::failed(url, format!("Failed to lock {}: {e}", path.display())))?;

        Ok(Self {
            lock,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TreeLock {
    fn drop(&mut self) {
        let _ = self.lock.unlock();
    }
}
