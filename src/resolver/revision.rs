//! Revision candidates for VCS origins

use crate::model::{Identifier, VcsInfo};

/// Revisions to try, in order, when resolving `vcs` for package `id`.
///
/// The requested revision comes first. Without one, tags derived from the
/// package version are guessed (`1.0`, `v1.0`, `name-1.0`). The empty string,
/// standing for the remote's default branch, is appended last when moving
/// revisions are allowed.
pub fn revision_candidates(vcs: &VcsInfo, id: &Identifier, allow_moving_revisions: bool) -> Vec<String> {
    let mut candidates = Vec::new();
    let requested = vcs.revision.trim();
    let version = id.version.trim();

    if !requested.is_empty() {
        candidates.push(requested.to_string());
    } else if !version.is_empty() {
        candidates.push(version.to_string());
        candidates.push(format!("v{version}"));
        if !id.name.is_empty() {
            candidates.push(format!("{}-{version}", id.name));
        }
    }

    if allow_moving_revisions {
        candidates.push(String::new());
    }

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|candidate| seen.insert(candidate.clone()));
    candidates
}

/// Human-readable name of a candidate
pub fn describe(candidate: &str) -> &str {
    if candidate.is_empty() { "<default branch>" } else { candidate }
}
