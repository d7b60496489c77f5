//! Git operation errors

use super::ProvenanceError;

/// Creates a generic git operation failed error
pub fn operation_failed(message: impl Into<String>) -> ProvenanceError {
    ProvenanceError::GitOperationFailed {
        message: message.into(),
    }
}

/// Creates a repository initialization failed error
pub fn clone_failed(url: impl Into<String>, reason: impl Into<String>) -> ProvenanceError {
    ProvenanceError::GitCloneFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates a ref resolution failed error
pub fn ref_resolve_failed(git_ref: impl Into<String>, reason: impl Into<String>) -> ProvenanceError {
    ProvenanceError::GitRefResolveFailed {
        git_ref: git_ref.into(),
        reason: reason.into(),
    }
}

/// Creates a checkout failed error
pub fn checkout_failed(sha: impl Into<String>, reason: impl Into<String>) -> ProvenanceError {
    ProvenanceError::GitCheckoutFailed {
        sha: sha.into(),
        reason: reason.into(),
    }
}

/// Creates a fetch failed error
pub fn fetch_failed(url: impl Into<String>, reason: impl Into<String>) -> ProvenanceError {
    ProvenanceError::GitFetchFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates an open failed error
pub fn open_failed(path: impl Into<String>, reason: impl Into<String>) -> ProvenanceError {
    ProvenanceError::GitOpenFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a submodule update failed error
pub fn submodule_failed(path: impl Into<String>, reason: impl Into<String>) -> ProvenanceError {
    ProvenanceError::SubmoduleFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
