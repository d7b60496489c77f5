//! In-memory storage backends

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use super::{NestedProvenanceStorage, PackageProvenanceStorage};
use crate::error::Result;
use crate::model::{
    Identifier, NestedProvenanceResolutionResult, PackageOrigin, PackageProvenanceResolutionResult,
    RepositoryProvenance,
};

type PackageEntries = BTreeMap<Identifier, BTreeMap<PackageOrigin, PackageProvenanceResolutionResult>>;

#[derive(Debug, Default)]
pub struct InMemoryPackageProvenanceStorage {
    entries: RwLock<PackageEntries>,
}

impl InMemoryPackageProvenanceStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored (identifier, origin) entries
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PackageProvenanceStorage for InMemoryPackageProvenanceStorage {
    fn read(&self, id: &Identifier, origin: &PackageOrigin) -> Result<Option<PackageProvenanceResolutionResult>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(id).and_then(|origins| origins.get(origin)).cloned())
    }

    fn read_all(&self, id: &Identifier) -> Result<Vec<(PackageOrigin, PackageProvenanceResolutionResult)>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .get(id)
            .map(|origins| {
                origins
                    .iter()
                    .map(|(origin, result)| (origin.clone(), result.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn write(
        &self,
        id: &Identifier,
        origin: &PackageOrigin,
        result: &PackageProvenanceResolutionResult,
    ) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(id.clone())
            .or_default()
            .insert(origin.clone(), result.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNestedProvenanceStorage {
    entries: RwLock<HashMap<RepositoryProvenance, NestedProvenanceResolutionResult>>,
}

impl InMemoryNestedProvenanceStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NestedProvenanceStorage for InMemoryNestedProvenanceStorage {
    fn read(&self, root: &RepositoryProvenance) -> Result<Option<NestedProvenanceResolutionResult>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(root).cloned())
    }

    fn write(&self, root: &RepositoryProvenance, result: &NestedProvenanceResolutionResult) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(root.clone(), result.clone());
        Ok(())
    }
}
