//! Git driver
//!
//! This module handles:
//! - Initializing working trees with an `origin` remote
//! - Fetching branches and tags, and resolving revisions to commit ids
//! - Detached checkouts and recursive submodule updates
//! - Enumerating submodules at any depth
//!
//! Authentication is delegated entirely to git's native system:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Environment variables (`GIT_SSH_COMMAND`, etc.)

mod auth;
mod checkout;
mod error;
mod fetch;
mod refs;
mod submodules;
mod url;

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::model::vcs::normalize_vcs_url;
use crate::model::{VcsInfo, VcsType};
use crate::vcs::{NestedRepository, VcsDriver};
use crate::working_tree::WorkingTree;

/// [`VcsDriver`] for Git, backed by libgit2
#[derive(Debug, Default, Clone, Copy)]
pub struct GitDriver;

impl GitDriver {
    pub fn new() -> Self {
        Self
    }
}

impl VcsDriver for GitDriver {
    fn vcs_type(&self) -> VcsType {
        VcsType::Git
    }

    fn init_working_tree(&self, root: &Path, vcs: &VcsInfo) -> Result<()> {
        fetch::init_repository(root, &vcs.url).map(|_| ())
    }

    fn resolve_revision(&self, tree: &WorkingTree, requested: &str) -> Result<String> {
        let repo = checkout::open(tree.root())?;
        fetch::fetch_all(&repo, &tree.vcs_info().url)?;
        let resolved = refs::resolve_revision(&repo, requested)?;
        debug!(url = tree.vcs_info().url, requested, resolved, "Resolved revision");
        Ok(resolved)
    }

    fn is_fixed_revision(&self, tree: &WorkingTree, revision: &str) -> Result<bool> {
        let repo = checkout::open(tree.root())?;
        Ok(!refs::is_moving(&repo, revision))
    }

    fn update_working_tree(&self, tree: &WorkingTree, revision: &str, recursive: bool) -> Result<()> {
        let url = &tree.vcs_info().url;
        let repo = checkout::open(tree.root())?;

        if !refs::has_commit(&repo, revision) {
            fetch::fetch_all(&repo, url)?;
        }
        let sha = refs::resolve_revision(&repo, revision)?;
        checkout::checkout_commit(&repo, &sha)?;

        if recursive {
            let mut chain = vec![normalize_vcs_url(url)];
            submodules::update_recursive(&repo, url, &mut chain)?;
        }

        debug!(url, revision = sha, recursive, "Updated working tree");
        Ok(())
    }

    fn list_nested_repositories(&self, tree: &WorkingTree) -> Result<BTreeMap<String, NestedRepository>> {
        let repo = checkout::open(tree.root())?;
        let mut nested = BTreeMap::new();
        submodules::list_recursive(&repo, "", &tree.vcs_info().url, &mut nested)?;
        Ok(nested)
    }
}
