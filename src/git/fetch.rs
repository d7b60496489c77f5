//! Working-tree initialization and fetching
//!
//! A working tree is an ordinary (non-bare) repository with a single `origin`
//! remote. Fetching mirrors remote branches under `refs/remotes/origin/`,
//! mirrors tags, and records the remote's HEAD as `refs/remotes/origin/HEAD`.

use std::path::Path;

use git2::{AutotagOption, Direction, FetchOptions, FetchPrune, Oid, Repository};
use tracing::debug;

use super::auth::remote_callbacks;
use super::error::interpret_git_error;
use super::url::remote_url;
use crate::error::{Result, git};

pub const REMOTE: &str = "origin";
pub const REMOTE_HEAD: &str = "refs/remotes/origin/HEAD";

const REFSPECS: [&str; 2] = [
    "+refs/heads/*:refs/remotes/origin/*",
    "+refs/tags/*:refs/tags/*",
];

/// Fetch options with credentials and tag download configured
pub fn fetch_options<'a>() -> FetchOptions<'a> {
    let mut options = FetchOptions::new();
    options.remote_callbacks(remote_callbacks());
    options.download_tags(AutotagOption::All);
    options
}

/// Create an empty repository at `root` whose `origin` points at `url`.
pub fn init_repository(root: &Path, url: &str) -> Result<Repository> {
    let repo = Repository::init(root)
        .map_err(|e| git::clone_failed(url, interpret_git_error(&e)))?;
    repo.remote(REMOTE, &remote_url(url))
        .map_err(|e| git::clone_failed(url, interpret_git_error(&e)))?;
    debug!(url, root = %root.display(), "Initialized working tree");
    Ok(repo)
}

fn remote_head(repo: &Repository, url: &str) -> Result<Option<Oid>> {
    let mut remote = repo
        .find_remote(REMOTE)
        .map_err(|e| git::fetch_failed(url, interpret_git_error(&e)))?;
    let connection = remote
        .connect_auth(Direction::Fetch, Some(remote_callbacks()), None)
        .map_err(|e| git::fetch_failed(url, interpret_git_error(&e)))?;
    let head = connection
        .list()
        .map_err(|e| git::fetch_failed(url, interpret_git_error(&e)))?
        .iter()
        .find(|head| head.name() == "HEAD")
        .map(git2::RemoteHead::oid);
    Ok(head)
}

/// Fetch all branches and tags of `origin`.
pub fn fetch_all(repo: &Repository, url: &str) -> Result<()> {
    let head = remote_head(repo, url)?;

    let mut remote = repo
        .find_remote(REMOTE)
        .map_err(|e| git::fetch_failed(url, interpret_git_error(&e)))?;
    let mut options = fetch_options();
    options.prune(FetchPrune::On);
    remote
        .fetch(&REFSPECS, Some(&mut options), None)
        .map_err(|e| git::fetch_failed(url, interpret_git_error(&e)))?;

    if let Some(oid) = head {
        repo.reference(REMOTE_HEAD, oid, true, "fetch: remote HEAD")
            .map_err(|e| git::fetch_failed(url, interpret_git_error(&e)))?;
    }

    debug!(url, "Fetched remote refs");
    Ok(())
}
