//! Remote source artifacts

use serde::{Deserialize, Serialize};

/// Checksum of a remote artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash {
    /// Hex-encoded digest value
    #[serde(default)]
    pub value: String,

    /// Algorithm name, e.g. `SHA-256`
    #[serde(default)]
    pub algorithm: String,
}

impl Hash {
    pub fn new(value: impl Into<String>, algorithm: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            algorithm: algorithm.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// A downloadable source archive
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RemoteArtifact {
    #[serde(default)]
    pub url: String,

    #[serde(default, skip_serializing_if = "Hash::is_empty")]
    pub hash: Hash,
}

impl RemoteArtifact {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            hash: Hash::default(),
        }
    }

    /// Set checksum
    pub fn with_hash(mut self, hash: Hash) -> Self {
        self.hash = hash;
        self
    }

    /// An artifact without URL carries no usable origin
    pub fn is_empty(&self) -> bool {
        self.url.trim().is_empty()
    }
}
