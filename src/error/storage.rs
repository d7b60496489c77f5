//! Storage errors

use super::ProvenanceError;

/// Creates a storage operation failed error
pub fn failed(message: impl Into<String>) -> ProvenanceError {
    ProvenanceError::StorageFailed {
        message: message.into(),
    }
}
