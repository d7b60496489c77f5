//! Provenance data model
//!
//! This module describes packages, their candidate origins and the resolved
//! provenances:
//! - Local identifiers: `type:namespace:name:version`
//! - Remote artifacts: `https://example.com/pkg-1.0.0.tgz` with optional hash
//! - VCS locations: type, URL, requested revision, sub-path
//! - Known provenances: an artifact, or a repository at a resolved revision
//! - Nested provenances: a root plus sub-repositories keyed by path
//!
//! ## Module Organization
//!
//! - `identifier.rs`: package identifiers
//! - `artifact.rs`: remote artifacts and hashes
//! - `vcs.rs`: VCS types, locations and repository identities
//! - `package.rs`: packages and origin descriptors
//! - `provenance.rs`: known provenances
//! - `nested.rs`: nested provenance trees
//! - `resolution.rs`: stored package resolution outcomes
//! - `run.rs`: aggregate run record

pub mod artifact;
pub mod identifier;
pub mod nested;
pub mod package;
pub mod provenance;
pub mod resolution;
pub mod run;
pub mod vcs;

pub use artifact::{Hash, RemoteArtifact};
pub use identifier::Identifier;
pub use nested::{NestedProvenance, NestedProvenanceResolutionResult};
pub use package::{Package, PackageOrigin, SourceCodeOrigin};
pub use provenance::{ArtifactProvenance, KnownProvenance, RepositoryProvenance};
pub use resolution::PackageProvenanceResolutionResult;
pub use run::{PackageResolution, ProvenanceRun, ProvenanceScanResult};
pub use vcs::{RepositoryIdentity, VcsInfo, VcsType};
