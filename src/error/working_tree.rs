//! Working-tree cache errors

use super::ProvenanceError;

/// Creates a working-tree failure error
pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> ProvenanceError {
    ProvenanceError::WorkingTreeFailed {
        url: url.into(),
        reason: reason.into(),
    }
}
