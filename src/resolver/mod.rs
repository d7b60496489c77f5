//! Provenance resolution
//!
//! This module handles:
//! - Picking one concrete origin per package (package resolver)
//! - Expanding repository provenances into nested trees (nested resolver)
//! - Resolving many packages concurrently into a run record (batch resolver)
//!
//! ## Module Organization
//!
//! - `artifact.rs`: artifact availability checks
//! - `revision.rs`: revision candidates for VCS origins
//! - `package.rs`: package-provenance resolver
//! - `nested.rs`: nested-provenance resolver and nested revision policy
//! - `batch.rs`: worker-pool batch resolution

pub mod artifact;
pub mod batch;
pub mod nested;
pub mod package;
pub mod revision;

pub use artifact::{ArtifactChecker, UrlArtifactChecker};
pub use batch::BatchResolver;
pub use nested::{NestedProvenanceResolver, NestedRevisionPolicy};
pub use package::{PackageProvenanceResolver, PackageResolverOptions};

use std::sync::Arc;

use tracing::debug;

use crate::config::ResolverConfig;
use crate::error::Result;
use crate::storage::{FileProvenanceStorage, PackageProvenanceStorage};
use crate::vcs::VcsRegistry;
use crate::working_tree::{WorkingTreeCache, paths};

impl BatchResolver {
    /// Wire resolvers from configuration: built-in VCS drivers, working trees
    /// and JSON storage under the cache directory.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let cache_dir = config.cache_dir()?;
        debug!(cache_dir = %cache_dir.display(), "Using cache directory");

        let registry = Arc::new(VcsRegistry::with_defaults());
        let working_trees = Arc::new(WorkingTreeCache::new(&cache_dir, registry, config.max_working_trees)?);
        let storage = Arc::new(FileProvenanceStorage::new(cache_dir.join(paths::STORAGE_DIR)));

        let packages = PackageProvenanceResolver::new(
            Arc::clone(&storage) as Arc<dyn PackageProvenanceStorage>,
            Arc::clone(&working_trees),
            Arc::new(UrlArtifactChecker),
            config.package_options(),
        );
        let nested = NestedProvenanceResolver::new(storage, working_trees, config.nested_revisions);

        Ok(Self::new(packages, nested, config.origin_priority.clone(), config.workers()))
    }
}
