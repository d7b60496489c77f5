//! Nested repository errors

use super::ProvenanceError;

/// Creates a cyclic nested repository error from the chain of repository URLs
pub fn cycle(chain: &[String], repeated: &str) -> ProvenanceError {
    let mut parts = chain.to_vec();
    parts.push(repeated.to_string());
    ProvenanceError::CyclicNestedRepository {
        chain: parts.join(" -> "),
    }
}

/// Creates a path-not-found error for a sub-path within a repository
pub fn path_not_found(
    path: impl Into<String>,
    url: impl Into<String>,
    revision: impl Into<String>,
) -> ProvenanceError {
    ProvenanceError::PathNotFoundInRepository {
        path: path.into(),
        url: url.into(),
        revision: revision.into(),
    }
}
