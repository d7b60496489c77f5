//! Package origin errors

use super::ProvenanceError;

/// Creates a "no resolvable origin" error from the individual attempts.
///
/// Each attempt is rendered as `origin: reason`, joined with `; `.
pub fn unresolvable<I, O, R>(id: impl Into<String>, attempts: I) -> ProvenanceError
where
    I: IntoIterator<Item = (O, R)>,
    O: std::fmt::Display,
    R: std::fmt::Display,
{
    let attempts: Vec<String> = attempts
        .into_iter()
        .map(|(origin, reason)| format!("{origin}: {reason}"))
        .collect();

    ProvenanceError::NoResolvableOrigin {
        id: id.into(),
        attempts: if attempts.is_empty() {
            "no origins were attempted".to_string()
        } else {
            attempts.join("; ")
        },
    }
}

/// Creates an artifact unavailable error
pub fn artifact_unavailable(url: impl Into<String>, reason: impl Into<String>) -> ProvenanceError {
    ProvenanceError::ArtifactUnavailable {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid identifier error
pub fn invalid_identifier(input: impl Into<String>, reason: impl Into<String>) -> ProvenanceError {
    ProvenanceError::InvalidIdentifier {
        input: input.into(),
        reason: reason.into(),
    }
}

/// Creates an unsupported VCS type error
pub fn vcs_not_supported(vcs_type: impl Into<String>) -> ProvenanceError {
    ProvenanceError::VcsNotSupported {
        vcs_type: vcs_type.into(),
    }
}
