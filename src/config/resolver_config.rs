//! Resolver configuration (provenance.yaml) data structures
//!
//! Every field is optional; a missing file yields the defaults.
//!
//! ```yaml
//! cache_dir: /var/cache/provenance
//! origin_priority: [artifact, vcs]
//! allow_moving_revisions: false
//! nested_revisions: assume_fixed
//! retry_failed_resolutions: true
//! max_working_trees: 16
//! workers: 8
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, config};
use crate::model::SourceCodeOrigin;
use crate::resolver::{NestedRevisionPolicy, PackageResolverOptions};
use crate::working_tree::paths;

const DEFAULT_MAX_WORKING_TREES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Root for working trees and stored resolutions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    pub origin_priority: Vec<SourceCodeOrigin>,

    /// Whether branch names and the default branch may be used
    pub allow_moving_revisions: bool,

    pub nested_revisions: NestedRevisionPolicy,

    /// Whether stored package failures are attempted again
    pub retry_failed_resolutions: bool,

    pub max_working_trees: usize,

    /// Worker threads for batch resolution; defaults to the number of CPUs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            origin_priority: SourceCodeOrigin::DEFAULT_PRIORITY.to_vec(),
            allow_moving_revisions: true,
            nested_revisions: NestedRevisionPolicy::default(),
            retry_failed_resolutions: true,
            max_working_trees: DEFAULT_MAX_WORKING_TREES,
            workers: None,
        }
    }
}

impl ResolverConfig {
    /// Default configuration file name
    pub const FILE_NAME: &'static str = "provenance.yaml";

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load configuration from `path`, falling back to defaults if it does
    /// not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load configuration from `path`, which must exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(config::not_found(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| config::read_failed(path.display().to_string(), e.to_string()))?;
        Self::from_yaml(&content).map_err(|e| config::parse_failed(path.display().to_string(), e.to_string()))
    }

    /// Effective cache directory: `PROVENANCE_CACHE_DIR`, then `cache_dir`,
    /// then the platform cache directory.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let env_set = std::env::var(paths::CACHE_DIR_ENV).is_ok_and(|dir| !dir.trim().is_empty());
        match &self.cache_dir {
            Some(dir) if !env_set => Ok(dir.clone()),
            _ => paths::cache_dir(),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    pub fn package_options(&self) -> PackageResolverOptions {
        PackageResolverOptions {
            allow_moving_revisions: self.allow_moving_revisions,
            retry_failed_resolutions: self.retry_failed_resolutions,
        }
    }
}
