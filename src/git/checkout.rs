//! Checkout operations for git working trees

use std::path::Path;

use git2::build::CheckoutBuilder;
use git2::{Oid, Repository};

use crate::error::{Result, git};

/// Check out `sha` as a detached HEAD, discarding local changes and
/// untracked files.
pub fn checkout_commit(repo: &Repository, sha: &str) -> Result<()> {
    let failed = |e: git2::Error| git::checkout_failed(sha, e.message());

    let oid = Oid::from_str(sha).map_err(failed)?;
    let commit = repo.find_commit(oid).map_err(failed)?;

    repo.set_head_detached(commit.id()).map_err(failed)?;

    let mut checkout_builder = CheckoutBuilder::new();
    checkout_builder.force().remove_untracked(true);
    repo.checkout_head(Some(&mut checkout_builder))
        .map_err(failed)?;

    Ok(())
}

/// Open an existing repository
pub fn open(path: &Path) -> Result<Repository> {
    Repository::open(path).map_err(|e| git::open_failed(path.display().to_string(), e.message()))
}
