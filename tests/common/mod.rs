//! Common test utilities for provenance integration tests
//!
//! Repositories are built with git2 in a temporary directory and addressed
//! through `file://` URLs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

/// A directory of local git repositories
pub struct TestRepos {
    pub temp: TempDir,
}

impl TestRepos {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    /// Create an empty repository named `name`
    pub fn init(&self, name: &str) -> Repository {
        Repository::init(self.path(name)).expect("Failed to init repository")
    }

    pub fn url(&self, name: &str) -> String {
        file_url(&self.path(name))
    }
}

pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.to_str().expect("Path is not valid UTF-8"))
}

/// Write `files` into the working directory and commit them on HEAD
pub fn commit_files(repo: &Repository, files: &[(&str, &str)], message: &str) -> Oid {
    let workdir = repo.workdir().expect("Repository has no workdir").to_path_buf();
    let mut index = repo.index().expect("Failed to open index");
    for (path, content) in files {
        let full = workdir.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full, content).expect("Failed to write file");
        index.add_path(Path::new(path)).expect("Failed to stage file");
    }
    index.write().expect("Failed to write index");
    commit_index(repo, message)
}

/// Commit the current index on HEAD
pub fn commit_index(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().expect("Failed to open index");
    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");
    let signature = Signature::now("Test", "test@example.com").expect("Failed to create signature");
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .expect("Failed to commit")
}

/// Register `url` as a submodule at `path` and commit it
pub fn add_submodule(repo: &Repository, url: &str, path: &str) -> Oid {
    let mut submodule = repo
        .submodule(url, Path::new(path), true)
        .expect("Failed to add submodule");
    submodule.clone(None).expect("Failed to clone submodule");
    submodule.add_finalize().expect("Failed to finalize submodule");
    commit_index(repo, &format!("Add submodule {path}"))
}

pub fn tag(repo: &Repository, name: &str, oid: Oid) {
    let object = repo.find_object(oid, None).expect("Failed to find object");
    repo.tag_lightweight(name, &object, false).expect("Failed to tag");
}

/// Name of the branch HEAD points at
pub fn current_branch(repo: &Repository) -> String {
    repo.head()
        .expect("Repository has no HEAD")
        .shorthand()
        .expect("HEAD is not valid UTF-8")
        .to_string()
}

/// Write a package description file and return its path
pub fn write_package(dir: &Path, file: &str, yaml: &str) -> PathBuf {
    let path = dir.join(file);
    std::fs::write(&path, yaml).expect("Failed to write package file");
    path
}

/// The `provenance` binary with its cache inside `cache_dir`
#[allow(deprecated)]
pub fn provenance_cmd(cache_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("provenance").expect("Binary not built");
    cmd.env("PROVENANCE_CACHE_DIR", cache_dir)
        .env_remove("PROVENANCE_CONFIG")
        .env_remove("PROVENANCE_LOG")
        .current_dir(cache_dir);
    cmd
}
