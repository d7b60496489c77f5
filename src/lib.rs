//! Provenance resolver
//!
//! Determines where the source code of a software package comes from (a
//! downloadable source artifact or a version-control repository pinned to a
//! concrete revision) and expands repository provenances into the tree of
//! nested repositories checked out with them.
//!
//! The entry points are [`resolver::PackageProvenanceResolver`],
//! [`resolver::NestedProvenanceResolver`] and, for many packages at once,
//! [`resolver::BatchResolver`].

pub mod common;
pub mod config;
pub mod error;
pub mod git;
pub mod listing;
pub mod logging;
pub mod model;
pub mod resolver;
pub mod storage;
pub mod vcs;
pub mod working_tree;

#[cfg(test)]
pub mod test_fixtures;

pub use error::{ProvenanceError, Result};
