//! Error types and handling for provenance resolution
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain, each providing
//! small constructor functions:
//! - [`git`]: Git operation errors
//! - [`origin`]: Package origin and artifact errors
//! - [`nested`]: Nested repository errors
//! - [`storage`]: Provenance storage errors
//! - [`working_tree`]: Working-tree cache errors
//! - [`config`]: Configuration errors

pub mod config;
pub mod git;
pub mod nested;
pub mod origin;
pub mod storage;
pub mod working_tree;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for provenance resolution
#[derive(Error, Diagnostic, Debug)]
pub enum ProvenanceError {
    // Origin errors
    #[error("No resolvable origin for package '{id}': {attempts}")]
    #[diagnostic(
        code(provenance::origin::unresolvable),
        help("Check that the package declares a reachable source artifact or VCS location")
    )]
    NoResolvableOrigin { id: String, attempts: String },

    #[error("Source artifact '{url}' is not available: {reason}")]
    #[diagnostic(code(provenance::origin::artifact_unavailable))]
    ArtifactUnavailable { url: String, reason: String },

    #[error("Invalid package identifier '{input}': {reason}")]
    #[diagnostic(
        code(provenance::origin::invalid_identifier),
        help("Identifiers have the form type:namespace:name:version")
    )]
    InvalidIdentifier { input: String, reason: String },

    #[error("Invalid provenance: {message}")]
    #[diagnostic(code(provenance::origin::invalid_provenance))]
    InvalidProvenance { message: String },

    // VCS errors
    #[error("VCS type '{vcs_type}' is not supported")]
    #[diagnostic(
        code(provenance::vcs::not_supported),
        help("Supported VCS types: Git")
    )]
    VcsNotSupported { vcs_type: String },

    #[error("Git operation failed: {message}")]
    #[diagnostic(code(provenance::git::operation_failed))]
    GitOperationFailed { message: String },

    #[error("Failed to initialize repository for {url}: {reason}")]
    #[diagnostic(
        code(provenance::git::clone_failed),
        help("Check that URL is correct and you have access to repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Failed to resolve git ref '{git_ref}': {reason}")]
    #[diagnostic(code(provenance::git::ref_resolve_failed))]
    GitRefResolveFailed { git_ref: String, reason: String },

    #[error("Failed to checkout commit '{sha}': {reason}")]
    #[diagnostic(code(provenance::git::checkout_failed))]
    GitCheckoutFailed { sha: String, reason: String },

    #[error("Failed to fetch from {url}: {reason}")]
    #[diagnostic(code(provenance::git::fetch_failed))]
    GitFetchFailed { url: String, reason: String },

    #[error("Failed to open repository at '{path}': {reason}")]
    #[diagnostic(code(provenance::git::open_failed))]
    GitOpenFailed { path: String, reason: String },

    #[error("Failed to update submodule '{path}': {reason}")]
    #[diagnostic(code(provenance::git::submodule_failed))]
    SubmoduleFailed { path: String, reason: String },

    // Nested repository errors
    #[error("Cyclic nested repository structure: {chain}")]
    #[diagnostic(
        code(provenance::nested::cycle),
        help("A nested repository references one of its ancestors")
    )]
    CyclicNestedRepository { chain: String },

    #[error("Path '{path}' does not exist in {url} at revision '{revision}'")]
    #[diagnostic(code(provenance::nested::path_not_found))]
    PathNotFoundInRepository {
        path: String,
        url: String,
        revision: String,
    },

    // Working-tree errors
    #[error("Working tree for {url} is unusable: {reason}")]
    #[diagnostic(code(provenance::working_tree::failed))]
    WorkingTreeFailed { url: String, reason: String },

    // Storage errors
    #[error("Provenance storage failed: {message}")]
    #[diagnostic(code(provenance::storage::failed))]
    StorageFailed { message: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(provenance::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(provenance::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(provenance::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    // File system errors
    #[error("IO error: {message}")]
    #[diagnostic(code(provenance::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for ProvenanceError {
    fn from(err: std::io::Error) -> Self {
        ProvenanceError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ProvenanceError {
    fn from(err: serde_yaml::Error) -> Self {
        ProvenanceError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ProvenanceError {
    fn from(err: serde_json::Error) -> Self {
        ProvenanceError::StorageFailed {
            message: err.to_string(),
        }
    }
}

impl From<git2::Error> for ProvenanceError {
    fn from(err: git2::Error) -> Self {
        ProvenanceError::GitOperationFailed {
            message: err.message().to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, ProvenanceError>;
