//! Known provenances
//!
//! A provenance pins exactly where a unit of source code came from: a remote
//! artifact, or a repository at a resolved (immutable) revision.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProvenanceError, Result};

use super::artifact::RemoteArtifact;
use super::vcs::VcsInfo;

/// Provenance of sources extracted from a remote artifact
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtifactProvenance {
    pub source_artifact: RemoteArtifact,
}

impl ArtifactProvenance {
    pub fn new(source_artifact: RemoteArtifact) -> Self {
        Self { source_artifact }
    }
}

/// Provenance of sources checked out from a repository.
///
/// `vcs_info.revision` is what was requested (possibly a branch);
/// `resolved_revision` is the immutable revision that was actually used.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepositoryProvenance {
    pub vcs_info: VcsInfo,
    pub resolved_revision: String,
}

impl RepositoryProvenance {
    /// Create a repository provenance; the resolved revision must not be empty.
    pub fn new(vcs_info: VcsInfo, resolved_revision: impl Into<String>) -> Result<Self> {
        let resolved_revision = resolved_revision.into();
        if resolved_revision.trim().is_empty() {
            return Err(ProvenanceError::InvalidProvenance {
                message: format!("repository {} has no resolved revision", vcs_info.url),
            });
        }

        Ok(Self {
            vcs_info,
            resolved_revision,
        })
    }

    /// The same repository location pinned to its resolved revision, with
    /// the requested revision replaced as well.
    pub fn pinned(&self) -> VcsInfo {
        self.vcs_info.clone().with_revision(self.resolved_revision.clone())
    }
}

/// A provenance that is known to exist
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum KnownProvenance {
    Artifact(ArtifactProvenance),
    Repository(RepositoryProvenance),
}

impl KnownProvenance {
    pub fn as_repository(&self) -> Option<&RepositoryProvenance> {
        match self {
            KnownProvenance::Repository(repository) => Some(repository),
            KnownProvenance::Artifact(_) => None,
        }
    }
}

impl From<ArtifactProvenance> for KnownProvenance {
    fn from(value: ArtifactProvenance) -> Self {
        KnownProvenance::Artifact(value)
    }
}

impl From<RepositoryProvenance> for KnownProvenance {
    fn from(value: RepositoryProvenance) -> Self {
        KnownProvenance::Repository(value)
    }
}

impl fmt::Display for KnownProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnownProvenance::Artifact(artifact) => {
                write!(f, "artifact {}", artifact.source_artifact.url)
            }
            KnownProvenance::Repository(repository) => {
                write!(
                    f,
                    "{} {}@{}",
                    repository.vcs_info.vcs_type, repository.vcs_info.url, repository.resolved_revision
                )?;
                if !repository.vcs_info.path.is_empty() {
                    write!(f, ":{}", repository.vcs_info.path)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vcs::VcsType;

    #[test]
    fn test_repository_provenance_requires_resolved_revision() {
        let vcs = VcsInfo::new(VcsType::Git, "https://example.com/repo.git", "main");
        assert!(RepositoryProvenance::new(vcs.clone(), "").is_err());
        assert!(RepositoryProvenance::new(vcs, "abc123").is_ok());
    }

    #[test]
    fn test_pinned_replaces_requested_revision() {
        let vcs = VcsInfo::new(VcsType::Git, "https://example.com/repo.git", "main");
        let provenance = RepositoryProvenance::new(vcs, "abc123").unwrap();
        assert_eq!(provenance.pinned().revision, "abc123");
    }

    #[test]
    fn test_display() {
        let vcs = VcsInfo::new(VcsType::Git, "https://example.com/repo.git", "main").with_path("core");
        let provenance: KnownProvenance = RepositoryProvenance::new(vcs, "abc123").unwrap().into();
        assert_eq!(
            provenance.to_string(),
            "Git https://example.com/repo.git@abc123:core"
        );
    }
}
