//! Cache statistics and cleanup
//!
//! Operates on the cache directory as laid out on disk, without a running
//! [`WorkingTreeCache`](super::WorkingTreeCache).

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{ProvenanceError, Result};

use super::paths::{STORAGE_DIR, TREES_DIR, ready_marker};

/// Cache statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Working trees that finished initializing
    pub working_trees: usize,
    /// Stored resolution documents
    pub stored_results: usize,
    /// Total size in bytes
    pub total_size: u64,
}

impl CacheStats {
    /// Format total size as human-readable string
    pub fn formatted_size(&self) -> String {
        #[allow(clippy::cast_precision_loss)]
        let size = self.total_size as f64;
        if size < 1024.0 {
            format!("{} B", self.total_size)
        } else if size < 1024.0 * 1024.0 {
            format!("{:.1} KB", size / 1024.0)
        } else if size < 1024.0 * 1024.0 * 1024.0 {
            format!("{:.1} MB", size / (1024.0 * 1024.0))
        } else {
            format!("{:.1} GB", size / (1024.0 * 1024.0 * 1024.0))
        }
    }
}

/// Collect statistics for the cache rooted at `cache_dir`
pub fn cache_stats(cache_dir: &Path) -> Result<CacheStats> {
    let mut stats = CacheStats::default();
    if !cache_dir.exists() {
        return Ok(stats);
    }

    let trees = cache_dir.join(TREES_DIR);
    if trees.is_dir() {
        for entry in fs::read_dir(&trees).map_err(|e| failed("read trees directory", &e))? {
            let path = entry.map_err(|e| failed("read trees entry", &e))?.path();
            if path.is_dir() && ready_marker(&path).exists() {
                stats.working_trees += 1;
            }
        }
    }

    stats.stored_results = WalkDir::new(cache_dir.join(STORAGE_DIR))
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "json"))
        .count();

    stats.total_size = WalkDir::new(cache_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum();

    Ok(stats)
}

/// Remove working trees and stored results under `cache_dir`
pub fn clear_cache(cache_dir: &Path) -> Result<()> {
    for dir in [TREES_DIR, STORAGE_DIR] {
        let path = cache_dir.join(dir);
        if path.exists() {
            fs::remove_dir_all(&path).map_err(|e| failed("clear cache", &e))?;
        }
    }
    Ok(())
}

fn failed(action: &str, err: &std::io::Error) -> ProvenanceError {
    ProvenanceError::IoError {
        message: format!("Failed to {action}: {err}"),
    }
}
