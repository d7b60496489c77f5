//! URL normalization for libgit2
//!
//! This module handles:
//! - Normalizing SSH URLs from SCP-style to ssh:// format
//! - Normalizing file:// URLs for libgit2 compatibility
//! - Resolving relative submodule URLs against their parent's URL

use std::borrow::Cow;

/// Normalize SSH URLs from SCP-style (git@host:path) to ssh:// format.
///
/// libgit2 may have issues with SCP-style SSH URLs, so they are converted to
/// the explicit ssh:// format.
pub fn normalize_ssh_url(url: &str) -> Cow<'_, str> {
    if !url.starts_with("git@") {
        return Cow::Borrowed(url);
    }

    match url.split_once(':') {
        Some((host_part, path_part)) => {
            let path = path_part.trim_start_matches('/');
            Cow::Owned(format!("ssh://{host_part}/{path}"))
        }
        None => Cow::Borrowed(url),
    }
}

/// Normalize file:// URLs so libgit2 can resolve them on Unix.
pub fn normalize_file_url(url: &str) -> Cow<'_, str> {
    let Some(after) = url.strip_prefix("file://") else {
        return Cow::Borrowed(url);
    };

    if after.contains('\\') {
        return Cow::Owned(format!("file:///{}", after.replace('\\', "/").trim_start_matches('/')));
    }
    if !after.is_empty() && !after.starts_with('/') {
        return Cow::Owned(format!("file:///{after}"));
    }
    Cow::Borrowed(url)
}

/// The URL handed to libgit2 for a repository URL
pub fn remote_url(url: &str) -> String {
    let url = url.trim();
    normalize_file_url(&normalize_ssh_url(url)).into_owned()
}

/// Resolve a submodule URL that may be relative (`../lib.git`) against the
/// URL of the repository declaring it.
pub fn resolve_submodule_url(parent_url: &str, url: &str) -> String {
    if !(url.starts_with("./") || url.starts_with("../")) {
        return url.to_string();
    }

    let mut base: Vec<&str> = parent_url.trim_end_matches('/').split('/').collect();
    for segment in url.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                if base.len() > 1 {
                    base.pop();
                }
            }
            other => base.push(other),
        }
    }
    base.join("/")
}
