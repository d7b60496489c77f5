//! Version-control drivers
//!
//! A driver knows how to materialize one VCS type in a working tree:
//! - Initializing an empty working tree for a repository URL
//! - Resolving a requested revision to an immutable one
//! - Telling fixed revisions (commits, tags) from moving ones (branches)
//! - Updating the working tree to a revision, optionally with nested repositories
//! - Enumerating the nested repositories present in the working tree
//!
//! Drivers never lock anything themselves; exclusive access to a working tree
//! is the job of [`crate::working_tree::WorkingTreeCache`].

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Result, origin};
use crate::git::GitDriver;
use crate::model::{VcsInfo, VcsType};
use crate::working_tree::WorkingTree;

/// A repository found inside another repository's working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedRepository {
    pub vcs_type: VcsType,
    pub url: String,
    /// The revision currently checked out, always immutable
    pub revision: String,
}

pub trait VcsDriver: Send + Sync {
    /// The VCS type this driver handles
    fn vcs_type(&self) -> VcsType;

    /// Prepare an empty directory as a working tree for `vcs`.
    ///
    /// Called by the working-tree cache before first use; no revision is
    /// checked out yet.
    fn init_working_tree(&self, root: &Path, vcs: &VcsInfo) -> Result<()>;

    /// Resolve a requested revision (empty for the default branch) to an
    /// immutable revision, fetching as needed.
    fn resolve_revision(&self, tree: &WorkingTree, requested: &str) -> Result<String>;

    /// Whether `revision` can never change meaning (not a branch, not empty)
    fn is_fixed_revision(&self, tree: &WorkingTree, revision: &str) -> Result<bool>;

    /// Check out `revision`; with `recursive`, also materialize every nested
    /// repository at the revision pinned by its parent.
    fn update_working_tree(&self, tree: &WorkingTree, revision: &str, recursive: bool) -> Result<()>;

    /// All nested repositories currently present, keyed by path relative to
    /// the working tree root, at any depth.
    fn list_nested_repositories(&self, tree: &WorkingTree) -> Result<BTreeMap<String, NestedRepository>>;
}

/// Registry of drivers by VCS type
#[derive(Clone, Default)]
pub struct VcsRegistry {
    drivers: Vec<Arc<dyn VcsDriver>>,
}

impl VcsRegistry {
    /// Registry without any drivers
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the built-in drivers (Git)
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(GitDriver::new()));
        registry
    }

    /// Register a driver, replacing any previous driver for the same type
    pub fn register(&mut self, driver: Arc<dyn VcsDriver>) {
        let vcs_type = driver.vcs_type();
        self.drivers.retain(|existing| existing.vcs_type() != vcs_type);
        self.drivers.push(driver);
    }

    /// Look up the driver for a VCS type
    pub fn driver_for(&self, vcs_type: &VcsType) -> Result<Arc<dyn VcsDriver>> {
        self.drivers
            .iter()
            .find(|driver| &driver.vcs_type() == vcs_type)
            .cloned()
            .ok_or_else(|| origin::vcs_not_supported(vcs_type.as_str()))
    }
}

impl std::fmt::Debug for VcsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.drivers.iter().map(|driver| driver.vcs_type()))
            .finish()
    }
}
