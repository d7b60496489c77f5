//! Stored outcomes of package-provenance resolution

use serde::{Deserialize, Serialize};

use super::provenance::{ArtifactProvenance, KnownProvenance, RepositoryProvenance};

/// Outcome of resolving one origin candidate of one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PackageProvenanceResolutionResult {
    ResolvedArtifact {
        provenance: ArtifactProvenance,
    },
    ResolvedRepository {
        provenance: RepositoryProvenance,
        /// The revision candidate that was checked out
        cloned_revision: String,
        /// Whether `cloned_revision` can never point elsewhere
        is_fixed_revision: bool,
    },
    Unresolved {
        message: String,
    },
}

impl PackageProvenanceResolutionResult {
    pub fn known_provenance(&self) -> Option<KnownProvenance> {
        match self {
            Self::ResolvedArtifact { provenance } => Some(provenance.clone().into()),
            Self::ResolvedRepository { provenance, .. } => Some(provenance.clone().into()),
            Self::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved { .. })
    }
}
