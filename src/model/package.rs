//! Packages and their candidate source origins

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProvenanceError, Result, config};

use super::artifact::RemoteArtifact;
use super::identifier::Identifier;
use super::vcs::VcsInfo;

/// Kind of source origin a package may be resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceCodeOrigin {
    Vcs,
    Artifact,
}

impl SourceCodeOrigin {
    /// Default priority: version control first, then source artifacts
    pub const DEFAULT_PRIORITY: [SourceCodeOrigin; 2] =
        [SourceCodeOrigin::Vcs, SourceCodeOrigin::Artifact];
}

impl fmt::Display for SourceCodeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceCodeOrigin::Vcs => f.write_str("vcs"),
            SourceCodeOrigin::Artifact => f.write_str("artifact"),
        }
    }
}

impl FromStr for SourceCodeOrigin {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vcs" => Ok(SourceCodeOrigin::Vcs),
            "artifact" => Ok(SourceCodeOrigin::Artifact),
            other => Err(format!(
                "unknown source code origin '{other}' (expected 'vcs' or 'artifact')"
            )),
        }
    }
}

/// A concrete origin candidate that was attempted for a package.
///
/// Together with the package identifier this keys package-provenance storage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PackageOrigin {
    Artifact(RemoteArtifact),
    Vcs(VcsInfo),
}

impl PackageOrigin {
    pub fn kind(&self) -> SourceCodeOrigin {
        match self {
            PackageOrigin::Artifact(_) => SourceCodeOrigin::Artifact,
            PackageOrigin::Vcs(_) => SourceCodeOrigin::Vcs,
        }
    }
}

/// Package metadata relevant to source resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: Identifier,

    #[serde(default, skip_serializing_if = "RemoteArtifact::is_empty")]
    pub source_artifact: RemoteArtifact,

    #[serde(default)]
    pub vcs: VcsInfo,
}

impl Package {
    pub fn new(id: Identifier) -> Self {
        Self {
            id,
            source_artifact: RemoteArtifact::default(),
            vcs: VcsInfo::default(),
        }
    }

    /// Set source artifact
    pub fn with_source_artifact(mut self, artifact: RemoteArtifact) -> Self {
        self.source_artifact = artifact;
        self
    }

    /// Set VCS location
    pub fn with_vcs(mut self, vcs: VcsInfo) -> Self {
        self.vcs = vcs;
        self
    }

    /// The usable origin descriptor of the given kind, if the package has one
    pub fn origin(&self, kind: SourceCodeOrigin) -> Option<PackageOrigin> {
        match kind {
            SourceCodeOrigin::Artifact if !self.source_artifact.is_empty() => {
                Some(PackageOrigin::Artifact(self.source_artifact.clone()))
            }
            SourceCodeOrigin::Vcs if self.vcs.is_usable() => Some(PackageOrigin::Vcs(self.vcs.clone())),
            _ => None,
        }
    }

    /// Load a package description from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| config::read_failed(path.display().to_string(), e.to_string()))?;
        Self::from_yaml(&content).map_err(|e| match e {
            ProvenanceError::ConfigParseFailed { reason, .. } => {
                config::parse_failed(path.display().to_string(), reason)
            }
            other => other,
        })
    }

    /// Parse a package description from YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}
