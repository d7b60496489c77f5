//! Git revision resolution
//!
//! Requested revisions are matched against, in order: tags, remote branches,
//! full reference names, commit ids, and finally any rev-parse expression
//! (short ids). An empty revision means the remote's default branch.

use git2::{Commit, Oid, Repository};

use super::error::interpret_git_error;
use super::fetch::REMOTE_HEAD;
use crate::error::{Result, git};

fn tag_ref(name: &str) -> String {
    format!("refs/tags/{name}")
}

fn branch_ref(name: &str) -> String {
    format!("refs/remotes/origin/{name}")
}

fn find_commit<'r>(repo: &'r Repository, revision: &str) -> Option<Commit<'r>> {
    let candidates = [tag_ref(revision), branch_ref(revision), revision.to_string()];
    for candidate in &candidates {
        if let Ok(reference) = repo.find_reference(candidate) {
            if let Ok(commit) = reference.peel_to_commit() {
                return Some(commit);
            }
        }
    }

    if let Ok(oid) = Oid::from_str(revision) {
        if let Ok(commit) = repo.find_commit(oid) {
            return Some(commit);
        }
    }

    repo.revparse_single(revision)
        .and_then(|object| object.peel_to_commit())
        .ok()
}

/// Resolve a requested revision to a full commit id
pub fn resolve_revision(repo: &Repository, requested: &str) -> Result<String> {
    let requested = requested.trim();

    if requested.is_empty() {
        let commit = repo
            .find_reference(REMOTE_HEAD)
            .and_then(|reference| reference.peel_to_commit())
            .map_err(|e| git::ref_resolve_failed("HEAD", interpret_git_error(&e)))?;
        return Ok(commit.id().to_string());
    }

    find_commit(repo, requested)
        .map(|commit| commit.id().to_string())
        .ok_or_else(|| git::ref_resolve_failed(requested, "Could not resolve reference"))
}

/// Whether `revision` names a remote branch and no tag of the same name.
///
/// Tags win over branches in [`resolve_revision`], so a name that is both
/// resolves to the (fixed) tag.
pub fn is_moving(repo: &Repository, revision: &str) -> bool {
    let revision = revision.trim();
    if revision.is_empty() {
        return true;
    }
    repo.find_reference(&branch_ref(revision)).is_ok()
        && repo.find_reference(&tag_ref(revision)).is_err()
}

/// Whether the commit `sha` is present in the local object database
pub fn has_commit(repo: &Repository, sha: &str) -> bool {
    Oid::from_str(sha)
        .and_then(|oid| repo.find_commit(oid))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::TempDir;

    fn repo_with_commit() -> (TempDir, Repository, Oid) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let oid = {
            let signature = Signature::now("Test", "test@example.com").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(None, &signature, &signature, "initial", &tree, &[])
                .unwrap()
        };
        (temp, repo, oid)
    }

    #[test]
    fn test_resolve_tag_and_branch() {
        let (_temp, repo, oid) = repo_with_commit();
        repo.reference("refs/tags/v1.0", oid, false, "test").unwrap();
        repo.reference("refs/remotes/origin/main", oid, false, "test").unwrap();

        assert_eq!(resolve_revision(&repo, "v1.0").unwrap(), oid.to_string());
        assert_eq!(resolve_revision(&repo, "main").unwrap(), oid.to_string());
    }

    #[test]
    fn test_resolve_full_and_short_sha() {
        let (_temp, repo, oid) = repo_with_commit();
        let sha = oid.to_string();
        assert_eq!(resolve_revision(&repo, &sha).unwrap(), sha);
        assert_eq!(resolve_revision(&repo, &sha[..8]).unwrap(), sha);
    }

    #[test]
    fn test_resolve_default_branch_uses_remote_head() {
        let (_temp, repo, oid) = repo_with_commit();
        repo.reference(REMOTE_HEAD, oid, false, "test").unwrap();
        assert_eq!(resolve_revision(&repo, "").unwrap(), oid.to_string());
    }

    #[test]
    fn test_resolve_unknown_fails() {
        let (_temp, repo, _) = repo_with_commit();
        assert!(resolve_revision(&repo, "no-such-branch").is_err());
    }

    #[test]
    fn test_is_moving() {
        let (_temp, repo, oid) = repo_with_commit();
        repo.reference("refs/remotes/origin/main", oid, false, "test").unwrap();
        repo.reference("refs/remotes/origin/release", oid, false, "test").unwrap();
        repo.reference("refs/tags/release", oid, false, "test").unwrap();

        assert!(is_moving(&repo, "main"));
        assert!(is_moving(&repo, ""));
        assert!(!is_moving(&repo, "release"));
        assert!(!is_moving(&repo, &oid.to_string()));
    }

    #[test]
    fn test_has_commit() {
        let (_temp, repo, oid) = repo_with_commit();
        assert!(has_commit(&repo, &oid.to_string()));
        assert!(!has_commit(&repo, "0123456789012345678901234567890123456789"));
        assert!(!has_commit(&repo, "not-a-sha"));
    }
}
