//! Nested repositories (git submodules)
//!
//! Updating walks the submodule graph depth-first and carries the chain of
//! repository URLs from the root, so a submodule that refers back to one of
//! its ancestors is reported instead of recursing forever.

use std::collections::BTreeMap;

use git2::{Repository, Submodule, SubmoduleUpdateOptions};
use tracing::{debug, trace};

use super::error::interpret_git_error;
use super::fetch::fetch_options;
use super::url::resolve_submodule_url;
use crate::common::path_normalizer::join_relative;
use crate::error::{Result, git, nested};
use crate::model::VcsType;
use crate::model::vcs::normalize_vcs_url;
use crate::vcs::NestedRepository;

fn submodule_path(submodule: &Submodule<'_>) -> String {
    submodule.path().to_string_lossy().replace('\\', "/")
}

fn submodule_url(parent_url: &str, submodule: &Submodule<'_>) -> String {
    resolve_submodule_url(parent_url, submodule.url().unwrap_or_default())
}

/// Initialize and check out every submodule of `repo` at the commit recorded
/// by `repo`, recursively.
///
/// `chain` holds the normalized URLs from the root down to `repo`.
pub fn update_recursive(repo: &Repository, url: &str, chain: &mut Vec<String>) -> Result<()> {
    let submodules = repo
        .submodules()
        .map_err(|e| git::operation_failed(interpret_git_error(&e)))?;

    for mut submodule in submodules {
        let path = submodule_path(&submodule);
        let sub_url = submodule_url(url, &submodule);
        let key = normalize_vcs_url(&sub_url);
        if chain.contains(&key) {
            return Err(nested::cycle(chain, &key));
        }

        trace!(path, url = sub_url, "Updating submodule");
        let mut options = SubmoduleUpdateOptions::new();
        options.fetch(fetch_options());
        options.allow_fetch(true);
        submodule
            .update(true, Some(&mut options))
            .map_err(|e| git::submodule_failed(&path, interpret_git_error(&e)))?;

        let sub_repo = submodule
            .open()
            .map_err(|e| git::submodule_failed(&path, interpret_git_error(&e)))?;

        chain.push(key);
        let result = update_recursive(&sub_repo, &sub_url, chain);
        chain.pop();
        result?;
    }

    Ok(())
}

/// Collect the submodules present in `repo` at any depth, keyed by their
/// path relative to the outermost working tree.
pub fn list_recursive(
    repo: &Repository,
    prefix: &str,
    url: &str,
    out: &mut BTreeMap<String, NestedRepository>,
) -> Result<()> {
    let submodules = repo
        .submodules()
        .map_err(|e| git::operation_failed(interpret_git_error(&e)))?;

    for submodule in submodules {
        let relative = submodule_path(&submodule);
        let Ok(sub_repo) = submodule.open() else {
            debug!(path = relative, "Submodule not checked out, skipping");
            continue;
        };
        let Some(oid) = submodule.workdir_id().or_else(|| submodule.head_id()) else {
            debug!(path = relative, "Submodule has no commit, skipping");
            continue;
        };

        let path = join_relative(prefix, &relative)
            .ok_or_else(|| git::submodule_failed(&relative, "path escapes the working tree"))?;
        let sub_url = submodule_url(url, &submodule);

        out.insert(
            path.clone(),
            NestedRepository {
                vcs_type: VcsType::Git,
                url: sub_url.clone(),
                revision: oid.to_string(),
            },
        );
        list_recursive(&sub_repo, &path, &sub_url, out)?;
    }

    Ok(())
}
