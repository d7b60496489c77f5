//! BLAKE3 file listings per provenance
//!
//! Walks a materialized working tree and attributes every file to the
//! provenance that owns it (the deepest nested repository containing it, or
//! the root), so a downstream scanner can skip provenances it has already
//! seen.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::common::path_normalizer::{is_within, normalize_relative_path};
use crate::error::{ProvenanceError, Result};
use crate::model::{KnownProvenance, NestedProvenance};

/// Digest prefix for BLAKE3 digests
pub const DIGEST_PREFIX: &str = "blake3:";

/// A single file within a provenance
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the provenance root, forward slashes
    pub path: String,
    pub digest: String,
}

/// All files belonging to one provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileListing {
    pub provenance: KnownProvenance,
    pub files: Vec<FileEntry>,
}

/// Calculate the BLAKE3 digest of a file
pub fn digest_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| read_failed(path, &e))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| read_failed(path, &e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{DIGEST_PREFIX}{}", hasher.finalize().to_hex()))
}

/// List the files of a nested provenance materialized at `root_dir`.
///
/// Returns one listing per provenance in the tree, root first. VCS metadata
/// (`.git`) is skipped. If the root repository has a sub-path, root files
/// outside it are left out.
pub fn list_nested(nested: &NestedProvenance, root_dir: &Path) -> Result<Vec<FileListing>> {
    let root_path = nested
        .root
        .as_repository()
        .and_then(|repository| normalize_relative_path(&repository.vcs_info.path))
        .unwrap_or_default();

    let mut buckets: BTreeMap<String, Vec<FileEntry>> = BTreeMap::new();
    buckets.insert(String::new(), Vec::new());
    for sub_path in nested.sub_repositories.keys() {
        buckets.insert(sub_path.clone(), Vec::new());
    }

    let walker = WalkDir::new(root_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|e| ProvenanceError::IoError {
            message: format!("Failed to walk {}: {}", root_dir.display(), e),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root_dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");

        let owner = owning_sub_path(nested, &relative);
        if owner.is_empty() && !is_within(&relative, &root_path) {
            continue;
        }

        let path_in_owner = if owner.is_empty() {
            relative.clone()
        } else {
            relative[owner.len() + 1..].to_string()
        };

        buckets.entry(owner).or_default().push(FileEntry {
            path: path_in_owner,
            digest: digest_file(entry.path())?,
        });
    }

    let mut listings = Vec::with_capacity(buckets.len());
    if let Some(files) = buckets.remove("") {
        listings.push(FileListing {
            provenance: nested.root.clone(),
            files,
        });
    }
    for (sub_path, files) in buckets {
        if let Some(repository) = nested.sub_repositories.get(&sub_path) {
            listings.push(FileListing {
                provenance: KnownProvenance::Repository(repository.clone()),
                files,
            });
        }
    }

    Ok(listings)
}

fn owning_sub_path(nested: &NestedProvenance, relative: &str) -> String {
    nested
        .sub_repositories
        .keys()
        .filter(|sub_path| is_within(relative, sub_path))
        .max_by_key(|sub_path| sub_path.len())
        .cloned()
        .unwrap_or_default()
}

fn read_failed(path: &Path, err: &std::io::Error) -> ProvenanceError {
    ProvenanceError::IoError {
        message: format!("Failed to read file {}: {}", path.display(), err),
    }
}
