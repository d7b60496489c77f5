//! Provenance storage
//!
//! Two key-value stores back the resolvers:
//! - Package-provenance storage, keyed by package identifier plus the exact
//!   origin candidate that was attempted
//! - Nested-provenance storage, keyed by the root repository provenance
//!
//! Reads return `Ok(None)` for absent keys. Writes replace the previous value
//! for the key; concurrent writers race but never interleave.
//!
//! ## Backends
//!
//! - `memory.rs`: in-process maps, for tests and single runs
//! - `file.rs`: one JSON document per key under the cache directory

pub mod file;
pub mod memory;

pub use file::FileProvenanceStorage;
pub use memory::{InMemoryNestedProvenanceStorage, InMemoryPackageProvenanceStorage};

use crate::error::Result;
use crate::model::{
    Identifier, NestedProvenanceResolutionResult, PackageOrigin, PackageProvenanceResolutionResult,
    RepositoryProvenance,
};

pub trait PackageProvenanceStorage: Send + Sync {
    /// The stored outcome of resolving `origin` for package `id`
    fn read(&self, id: &Identifier, origin: &PackageOrigin) -> Result<Option<PackageProvenanceResolutionResult>>;

    /// Every stored outcome for package `id`, in origin order
    fn read_all(&self, id: &Identifier) -> Result<Vec<(PackageOrigin, PackageProvenanceResolutionResult)>>;

    fn write(
        &self,
        id: &Identifier,
        origin: &PackageOrigin,
        result: &PackageProvenanceResolutionResult,
    ) -> Result<()>;
}

pub trait NestedProvenanceStorage: Send + Sync {
    /// The stored nested tree rooted at `root`
    fn read(&self, root: &RepositoryProvenance) -> Result<Option<NestedProvenanceResolutionResult>>;

    fn write(&self, root: &RepositoryProvenance, result: &NestedProvenanceResolutionResult) -> Result<()>;
}
