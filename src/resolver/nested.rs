//! Nested-provenance resolution
//!
//! Expands a known provenance into the tree of repositories checked out with
//! it. Artifacts have no nested repositories. For repositories, a stored tree
//! is returned only when it is flagged as containing fixed revisions only;
//! otherwise the working tree is updated recursively, the nested repositories
//! present are enumerated, and the new tree is stored.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::listing::{self, FileListing};
use crate::model::{
    KnownProvenance, NestedProvenance, NestedProvenanceResolutionResult, RepositoryProvenance, VcsInfo,
};
use crate::storage::NestedProvenanceStorage;
use crate::working_tree::WorkingTreeCache;

/// What to assume about revisions of repositories nested in a parent.
///
/// Nested repositories are pinned to a commit by the parent's manifest, so
/// they are normally fixed. `AssumeMoving` stores new trees as stale, which
/// forces re-resolution on every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedRevisionPolicy {
    #[default]
    AssumeFixed,
    AssumeMoving,
}

impl NestedRevisionPolicy {
    /// The `has_only_fixed_revisions` flag stored with newly computed trees
    pub fn has_only_fixed_revisions(self) -> bool {
        matches!(self, NestedRevisionPolicy::AssumeFixed)
    }
}

pub struct NestedProvenanceResolver {
    storage: Arc<dyn NestedProvenanceStorage>,
    working_trees: Arc<WorkingTreeCache>,
    policy: NestedRevisionPolicy,
}

impl NestedProvenanceResolver {
    pub fn new(
        storage: Arc<dyn NestedProvenanceStorage>,
        working_trees: Arc<WorkingTreeCache>,
        policy: NestedRevisionPolicy,
    ) -> Self {
        Self {
            storage,
            working_trees,
            policy,
        }
    }

    /// Resolve the nested provenance tree rooted at `provenance`
    pub fn resolve_nested_provenance(&self, provenance: &KnownProvenance) -> Result<NestedProvenance> {
        let root = match provenance {
            KnownProvenance::Artifact(artifact) => return Ok(NestedProvenance::for_artifact(artifact.clone())),
            KnownProvenance::Repository(repository) => repository,
        };

        match self.read_stored(root) {
            Some(stored) if stored.has_only_fixed_revisions => {
                debug!(root = %provenance, "Nested provenance storage hit");
                return Ok(stored.nested_provenance);
            }
            Some(_) => debug!(root = %provenance, "Stored nested provenance may have moved, re-resolving"),
            None => debug!(root = %provenance, "Nested provenance storage miss"),
        }

        let nested = self.resolve_in_working_tree(root)?;
        info!(
            root = %provenance,
            sub_repositories = nested.sub_repositories.len(),
            "Resolved nested provenance"
        );

        let result = NestedProvenanceResolutionResult {
            nested_provenance: nested.clone(),
            has_only_fixed_revisions: self.policy.has_only_fixed_revisions(),
        };
        if let Err(e) = self.storage.write(root, &result) {
            warn!(root = %provenance, error = %e, "Failed to store nested provenance");
        }

        Ok(nested)
    }

    /// Materialize `nested` and list the files of each provenance in it.
    ///
    /// Artifact roots are not materialized here and yield no listings.
    pub fn file_listings(&self, nested: &NestedProvenance) -> Result<Vec<FileListing>> {
        let Some(root) = nested.root.as_repository() else {
            return Ok(Vec::new());
        };

        self.working_trees.use_working_tree(&root.vcs_info, |driver, tree| {
            driver.update_working_tree(tree, &root.resolved_revision, true)?;
            listing::list_nested(nested, tree.root())
        })
    }

    fn resolve_in_working_tree(&self, root: &RepositoryProvenance) -> Result<NestedProvenance> {
        self.working_trees.use_working_tree(&root.vcs_info, |driver, tree| {
            driver.update_working_tree(tree, &root.resolved_revision, true)?;

            let sub_repositories = driver
                .list_nested_repositories(tree)?
                .into_iter()
                .map(|(path, repository)| {
                    let vcs_info = VcsInfo::new(repository.vcs_type, repository.url, repository.revision.clone());
                    RepositoryProvenance::new(vcs_info, repository.revision).map(|provenance| (path, provenance))
                })
                .collect::<Result<Vec<_>>>()?;

            NestedProvenance::new(root.clone().into(), sub_repositories)
        })
    }

    fn read_stored(&self, root: &RepositoryProvenance) -> Option<NestedProvenanceResolutionResult> {
        match self.storage.read(root) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(url = root.vcs_info.url, error = %e, "Nested provenance storage read failed, treating as miss");
                None
            }
        }
    }
}
