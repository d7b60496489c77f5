//! Nested provenance trees
//!
//! A nested provenance is a root provenance plus every repository discovered
//! inside it (e.g. git submodules), keyed by canonical repository-relative
//! path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::path_normalizer::{is_within, normalize_relative_path};
use crate::error::{ProvenanceError, Result};

use super::provenance::{ArtifactProvenance, KnownProvenance, RepositoryProvenance};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedProvenance {
    pub root: KnownProvenance,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_repositories: BTreeMap<String, RepositoryProvenance>,
}

impl NestedProvenance {
    /// A nested provenance without any sub-repositories
    pub fn leaf(root: impl Into<KnownProvenance>) -> Self {
        Self {
            root: root.into(),
            sub_repositories: BTreeMap::new(),
        }
    }

    /// Artifacts never contain nested repositories
    pub fn for_artifact(artifact: ArtifactProvenance) -> Self {
        Self::leaf(artifact)
    }

    /// Build a nested provenance, canonicalizing sub-repository paths.
    ///
    /// Fails if the root is an artifact but sub-repositories are given, if a
    /// path escapes the repository or names its root, if two paths collapse
    /// to the same key, or if a sub-repository lacks a resolved revision.
    pub fn new(
        root: KnownProvenance,
        sub_repositories: impl IntoIterator<Item = (String, RepositoryProvenance)>,
    ) -> Result<Self> {
        let mut canonical = BTreeMap::new();

        for (path, repository) in sub_repositories {
            if matches!(root, KnownProvenance::Artifact(_)) {
                return Err(invalid(format!(
                    "artifact provenance cannot contain nested repository '{path}'"
                )));
            }

            let key = match normalize_relative_path(&path) {
                Some(key) if !key.is_empty() => key,
                _ => {
                    return Err(invalid(format!(
                        "nested repository path '{path}' is not a relative sub-path"
                    )));
                }
            };

            if repository.resolved_revision.trim().is_empty() {
                return Err(invalid(format!(
                    "nested repository '{key}' has no resolved revision"
                )));
            }

            if canonical.insert(key.clone(), repository).is_some() {
                return Err(invalid(format!("duplicate nested repository path '{key}'")));
            }
        }

        Ok(Self {
            root,
            sub_repositories: canonical,
        })
    }

    /// Root provenance followed by every sub-repository provenance
    pub fn all_provenances(&self) -> Vec<KnownProvenance> {
        std::iter::once(self.root.clone())
            .chain(
                self.sub_repositories
                    .values()
                    .cloned()
                    .map(KnownProvenance::Repository),
            )
            .collect()
    }

    /// The provenance that owns `path`: the deepest sub-repository containing
    /// it, or the root.
    pub fn provenance_at(&self, path: &str) -> KnownProvenance {
        let Some(path) = normalize_relative_path(path) else {
            return self.root.clone();
        };

        self.sub_repositories
            .iter()
            .filter(|(sub_path, _)| is_within(&path, sub_path))
            .max_by_key(|(sub_path, _)| sub_path.len())
            .map(|(_, repository)| KnownProvenance::Repository(repository.clone()))
            .unwrap_or_else(|| self.root.clone())
    }
}

/// A freshly computed or stored nested provenance with its cache-validity flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedProvenanceResolutionResult {
    pub nested_provenance: NestedProvenance,

    /// True only if every revision in the tree is immutable. Stored results
    /// with this flag unset are re-resolved on every read.
    pub has_only_fixed_revisions: bool,
}

fn invalid(message: String) -> ProvenanceError {
    ProvenanceError::InvalidProvenance { message }
}
