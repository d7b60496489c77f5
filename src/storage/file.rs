//! JSON file storage backend
//!
//! Layout under the storage root:
//!
//! ```text
//! packages/<hash(id)>/<hash(origin)>.json   { id, origin, result }
//! nested/<hash(root)>.json                  { root, result }
//! ```
//!
//! Hashes are BLAKE3 over the key's JSON form. Each document is written to a
//! temporary file in the same directory and renamed into place, so readers
//! only ever see a complete document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::trace;

use super::{NestedProvenanceStorage, PackageProvenanceStorage};
use crate::error::{Result, storage};
use crate::model::{
    Identifier, NestedProvenanceResolutionResult, PackageOrigin, PackageProvenanceResolutionResult,
    RepositoryProvenance,
};

const PACKAGES_DIR: &str = "packages";
const NESTED_DIR: &str = "nested";
const EXTENSION: &str = "json";

#[derive(Debug, Serialize, Deserialize)]
struct PackageDocument {
    id: Identifier,
    origin: PackageOrigin,
    result: PackageProvenanceResolutionResult,
}

#[derive(Debug, Serialize, Deserialize)]
struct NestedDocument {
    root: RepositoryProvenance,
    result: NestedProvenanceResolutionResult,
}

/// Both storages backed by JSON documents in one directory
#[derive(Debug, Clone)]
pub struct FileProvenanceStorage {
    root: PathBuf,
}

impl FileProvenanceStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn package_dir(&self, id: &Identifier) -> Result<PathBuf> {
        Ok(self.root.join(PACKAGES_DIR).join(key_hash(id)?))
    }

    fn package_path(&self, id: &Identifier, origin: &PackageOrigin) -> Result<PathBuf> {
        Ok(self
            .package_dir(id)?
            .join(format!("{}.{EXTENSION}", key_hash(origin)?)))
    }

    fn nested_path(&self, root: &RepositoryProvenance) -> Result<PathBuf> {
        Ok(self
            .root
            .join(NESTED_DIR)
            .join(format!("{}.{EXTENSION}", key_hash(root)?)))
    }
}

impl PackageProvenanceStorage for FileProvenanceStorage {
    fn read(&self, id: &Identifier, origin: &PackageOrigin) -> Result<Option<PackageProvenanceResolutionResult>> {
        let document: Option<PackageDocument> = read_document(&self.package_path(id, origin)?)?;
        Ok(document
            .filter(|doc| &doc.id == id && &doc.origin == origin)
            .map(|doc| doc.result))
    }

    fn read_all(&self, id: &Identifier) -> Result<Vec<(PackageOrigin, PackageProvenanceResolutionResult)>> {
        let dir = self.package_dir(id)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage::failed(format!("{}: {e}", dir.display()))),
        };

        let mut results = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != EXTENSION) {
                continue;
            }
            if let Some(doc) = read_document::<PackageDocument>(&path)? {
                if &doc.id == id {
                    results.push((doc.origin, doc.result));
                }
            }
        }
        results.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(results)
    }

    fn write(
        &self,
        id: &Identifier,
        origin: &PackageOrigin,
        result: &PackageProvenanceResolutionResult,
    ) -> Result<()> {
        let document = PackageDocument {
            id: id.clone(),
            origin: origin.clone(),
            result: result.clone(),
        };
        write_document(&self.package_path(id, origin)?, &document)
    }
}

impl NestedProvenanceStorage for FileProvenanceStorage {
    fn read(&self, root: &RepositoryProvenance) -> Result<Option<NestedProvenanceResolutionResult>> {
        let document: Option<NestedDocument> = read_document(&self.nested_path(root)?)?;
        Ok(document.filter(|doc| &doc.root == root).map(|doc| doc.result))
    }

    fn write(&self, root: &RepositoryProvenance, result: &NestedProvenanceResolutionResult) -> Result<()> {
        let document = NestedDocument {
            root: root.clone(),
            result: result.clone(),
        };
        write_document(&self.nested_path(root)?, &document)
    }
}

fn key_hash<K: Serialize>(key: &K) -> Result<String> {
    let json = serde_json::to_vec(key)?;
    Ok(blake3::hash(&json).to_hex()[..32].to_string())
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(storage::failed(format!("{}: {e}", path.display()))),
    };
    trace!(path = %path.display(), "Read storage document");
    serde_json::from_slice(&content)
        .map(Some)
        .map_err(|e| storage::failed(format!("{}: {e}", path.display())))
}

fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| storage::failed(format!("{} has no parent directory", path.display())))?;
    fs::create_dir_all(dir).map_err(|e| storage::failed(format!("{}: {e}", dir.display())))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| storage::failed(format!("{}: {e}", dir.display())))?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.persist(path)
        .map_err(|e| storage::failed(format!("{}: {}", path.display(), e.error)))?;

    trace!(path = %path.display(), "Wrote storage document");
    Ok(())
}
