//! Version-control locations
//!
//! This module provides the `VcsType` and `VcsInfo` types describing where a
//! package's sources live in version control, plus the `RepositoryIdentity`
//! used to key working trees.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProvenanceError;

/// Kind of version-control system
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VcsType {
    Git,
    GitRepo,
    Mercurial,
    Subversion,
    /// Any other or unknown type, including the empty string
    Other(String),
}

impl VcsType {
    pub fn as_str(&self) -> &str {
        match self {
            VcsType::Git => "Git",
            VcsType::GitRepo => "GitRepo",
            VcsType::Mercurial => "Mercurial",
            VcsType::Subversion => "Subversion",
            VcsType::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, VcsType::Other(_))
    }
}

impl Default for VcsType {
    fn default() -> Self {
        VcsType::Other(String::new())
    }
}

impl From<&str> for VcsType {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "git" => VcsType::Git,
            "gitrepo" | "git-repo" | "repo" => VcsType::GitRepo,
            "mercurial" | "hg" => VcsType::Mercurial,
            "subversion" | "svn" => VcsType::Subversion,
            _ => VcsType::Other(value.trim().to_string()),
        }
    }
}

impl From<String> for VcsType {
    fn from(value: String) -> Self {
        VcsType::from(value.as_str())
    }
}

impl From<VcsType> for String {
    fn from(value: VcsType) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for VcsType {
    type Err = ProvenanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(VcsType::from(s))
    }
}

impl fmt::Display for VcsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A location in version control
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VcsInfo {
    #[serde(rename = "type", default)]
    pub vcs_type: VcsType,

    /// Repository URL (HTTPS, SSH or file)
    #[serde(default)]
    pub url: String,

    /// Requested revision (branch, tag or commit); empty means the default branch
    #[serde(default)]
    pub revision: String,

    /// Path within the repository
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

impl VcsInfo {
    pub fn new(vcs_type: VcsType, url: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            vcs_type,
            url: url.into(),
            revision: revision.into(),
            path: String::new(),
        }
    }

    /// Set path within the repository
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set requested revision
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    /// A VCS location is usable if it names a known VCS type and a URL
    pub fn is_usable(&self) -> bool {
        self.vcs_type.is_known() && !self.url.trim().is_empty()
    }

    /// Physical repository identity: normalized URL plus VCS type.
    ///
    /// Revision and path do not participate, so all revisions of one
    /// repository share a single working tree.
    pub fn repository_identity(&self) -> RepositoryIdentity {
        RepositoryIdentity {
            vcs_type: self.vcs_type.clone(),
            url: normalize_vcs_url(&self.url),
        }
    }
}

/// Identity of a physical repository, used to key working trees
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepositoryIdentity {
    pub vcs_type: VcsType,
    pub url: String,
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vcs_type, self.url)
    }
}

/// Normalize a VCS URL so that spellings of the same repository compare equal.
///
/// SCP-style SSH URLs become `ssh://` URLs, trailing slashes and a trailing
/// `.git` are dropped, and the scheme and host are lower-cased.
pub fn normalize_vcs_url(url: &str) -> String {
    let url = url.trim();

    let url = match url.strip_prefix("git@") {
        Some(rest) if !url.contains("://") => match rest.split_once(':') {
            Some((host, path)) => format!("ssh://git@{host}/{}", path.trim_start_matches('/')),
            None => url.to_string(),
        },
        _ => url.to_string(),
    };

    let trimmed = url.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    match trimmed.split_once("://") {
        Some((scheme, rest)) => {
            let (authority, path) = match rest.find('/') {
                Some(idx) => rest.split_at(idx),
                None => (rest, ""),
            };
            format!(
                "{}://{}{}",
                scheme.to_ascii_lowercase(),
                authority.to_ascii_lowercase(),
                path
            )
        }
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcs_type_parsing_is_case_insensitive() {
        assert_eq!(VcsType::from("git"), VcsType::Git);
        assert_eq!(VcsType::from("GIT"), VcsType::Git);
        assert_eq!(VcsType::from("hg"), VcsType::Mercurial);
        assert_eq!(VcsType::from("svn"), VcsType::Subversion);
        assert_eq!(VcsType::from("Bazaar"), VcsType::Other("Bazaar".to_string()));
    }

    #[test]
    fn test_vcs_type_serde_round_trip_as_string() {
        let json = serde_json::to_string(&VcsType::Git).unwrap();
        assert_eq!(json, "\"Git\"");
        let parsed: VcsType = serde_json::from_str("\"git\"").unwrap();
        assert_eq!(parsed, VcsType::Git);
    }

    #[test]
    fn test_is_usable() {
        assert!(VcsInfo::new(VcsType::Git, "https://example.com/repo.git", "").is_usable());
        assert!(!VcsInfo::new(VcsType::Git, "  ", "main").is_usable());
        assert!(!VcsInfo::new(VcsType::default(), "https://example.com/repo.git", "").is_usable());
    }

    #[test]
    fn test_normalize_vcs_url() {
        assert_eq!(
            normalize_vcs_url("https://Example.COM/Org/Repo.git/"),
            "https://example.com/Org/Repo"
        );
        assert_eq!(
            normalize_vcs_url("git@github.com:user/repo.git"),
            "ssh://git@github.com/user/repo"
        );
        assert_eq!(normalize_vcs_url("/srv/git/repo"), "/srv/git/repo");
    }

    #[test]
    fn test_identity_ignores_revision_and_path() {
        let a = VcsInfo::new(VcsType::Git, "https://example.com/repo.git", "main");
        let b = VcsInfo::new(VcsType::Git, "https://example.com/repo", "v1.0").with_path("sub");
        assert_eq!(a.repository_identity(), b.repository_identity());
    }

    #[test]
    fn test_identity_distinguishes_vcs_type() {
        let a = VcsInfo::new(VcsType::Git, "https://example.com/repo", "");
        let b = VcsInfo::new(VcsType::Mercurial, "https://example.com/repo", "");
        assert_ne!(a.repository_identity(), b.repository_identity());
    }
}
