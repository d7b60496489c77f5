//! Test fixtures shared by unit tests.
//!
//! - [`FakeVcsDriver`]: a scripted [`VcsDriver`] that records every call,
//!   materializes configured files on update, and reports configured nested
//!   repositories
//! - [`CountingPackageStorage`] / [`CountingNestedStorage`]: in-memory
//!   storages that count reads and writes
//! - [`FailingStorage`]: a storage whose every operation fails

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use crate::error::{ProvenanceError, Result, git, storage};
use crate::model::vcs::normalize_vcs_url;
use crate::model::{
    Identifier, NestedProvenanceResolutionResult, PackageOrigin, PackageProvenanceResolutionResult,
    RepositoryProvenance, VcsInfo, VcsType,
};
use crate::storage::{
    InMemoryNestedProvenanceStorage, InMemoryPackageProvenanceStorage, NestedProvenanceStorage,
    PackageProvenanceStorage,
};
use crate::vcs::{NestedRepository, VcsDriver, VcsRegistry};
use crate::working_tree::{WorkingTree, WorkingTreeCache};

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// A working-tree cache in a fresh temp directory using only `driver`
pub fn working_tree_cache(driver: &Arc<FakeVcsDriver>) -> (TempDir, WorkingTreeCache) {
    let temp = create_temp_dir();
    let mut registry = VcsRegistry::empty();
    registry.register(Arc::clone(driver) as Arc<dyn VcsDriver>);
    let cache = WorkingTreeCache::new(temp.path(), Arc::new(registry), 8).expect("working tree cache");
    (temp, cache)
}

/// A call recorded by [`FakeVcsDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    Init { url: String },
    Resolve { url: String, requested: String },
    Update { url: String, revision: String, recursive: bool },
    List { url: String },
}

type RepoKey = (String, String);

#[derive(Debug, Default)]
pub struct FakeVcsDriver {
    refs: HashMap<RepoKey, String>,
    branches: HashSet<RepoKey>,
    nested: HashMap<RepoKey, BTreeMap<String, NestedRepository>>,
    files: HashMap<RepoKey, Vec<String>>,
    update_delay: Option<Duration>,
    fail_init: bool,
    fail_updates: bool,
    calls: Mutex<Vec<DriverCall>>,
    checked_out: Mutex<HashMap<String, (String, bool)>>,
    active_updates: Mutex<HashMap<String, usize>>,
    max_active_updates: AtomicUsize,
}

fn key(url: &str, name: &str) -> RepoKey {
    (normalize_vcs_url(url), name.to_string())
}

impl FakeVcsDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fixed reference (tag or commit) of `url` resolving to `sha`
    pub fn with_ref(mut self, url: &str, name: &str, sha: &str) -> Self {
        self.refs.insert(key(url, name), sha.to_string());
        self
    }

    /// A branch of `url` currently pointing at `sha`; the empty name is the
    /// default branch.
    pub fn with_branch(mut self, url: &str, name: &str, sha: &str) -> Self {
        self.refs.insert(key(url, name), sha.to_string());
        self.branches.insert(key(url, name));
        self
    }

    /// A nested repository present at `path` once `url@sha` is updated
    /// recursively
    pub fn with_nested(mut self, url: &str, sha: &str, path: &str, nested_url: &str, nested_sha: &str) -> Self {
        self.nested.entry(key(url, sha)).or_default().insert(
            path.to_string(),
            NestedRepository {
                vcs_type: VcsType::Git,
                url: nested_url.to_string(),
                revision: nested_sha.to_string(),
            },
        );
        self
    }

    /// Files written into the working tree when `url@sha` is checked out
    pub fn with_files(mut self, url: &str, sha: &str, files: &[&str]) -> Self {
        self.files
            .entry(key(url, sha))
            .or_default()
            .extend(files.iter().map(ToString::to_string));
        self
    }

    pub fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay = Some(delay);
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn init_count(&self) -> usize {
        self.count(|call| matches!(call, DriverCall::Init { .. }))
    }

    pub fn resolve_count(&self) -> usize {
        self.count(|call| matches!(call, DriverCall::Resolve { .. }))
    }

    pub fn update_count(&self) -> usize {
        self.count(|call| matches!(call, DriverCall::Update { .. }))
    }

    /// Total VCS calls of any kind
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Highest number of simultaneous updates seen for a single repository
    pub fn max_concurrent_updates(&self) -> usize {
        self.max_active_updates.load(Ordering::SeqCst)
    }

    fn count(&self, predicate: impl Fn(&DriverCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: DriverCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn known_sha(&self, url: &str, sha: &str) -> bool {
        let url = normalize_vcs_url(url);
        self.refs.iter().any(|((u, _), s)| *u == url && s == sha)
            || self.nested.values().flat_map(BTreeMap::values).any(|n| {
                normalize_vcs_url(&n.url) == url && n.revision == sha
            })
    }

    fn materialize(&self, root: &Path, url: &str, sha: &str) {
        for file in self.files.get(&key(url, sha)).into_iter().flatten() {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, format!("{url}@{sha}:{file}")).unwrap();
        }
    }
}

impl VcsDriver for FakeVcsDriver {
    fn vcs_type(&self) -> VcsType {
        VcsType::Git
    }

    fn init_working_tree(&self, _root: &Path, vcs: &VcsInfo) -> Result<()> {
        self.record(DriverCall::Init { url: vcs.url.clone() });
        if self.fail_init {
            return Err(git::clone_failed(&vcs.url, "init failed"));
        }
        Ok(())
    }

    fn resolve_revision(&self, tree: &WorkingTree, requested: &str) -> Result<String> {
        let url = &tree.vcs_info().url;
        self.record(DriverCall::Resolve {
            url: url.clone(),
            requested: requested.to_string(),
        });

        if let Some(sha) = self.refs.get(&key(url, requested)) {
            return Ok(sha.clone());
        }
        if !requested.is_empty() && self.known_sha(url, requested) {
            return Ok(requested.to_string());
        }
        Err(git::ref_resolve_failed(requested, "Could not resolve reference"))
    }

    fn is_fixed_revision(&self, tree: &WorkingTree, revision: &str) -> Result<bool> {
        Ok(!revision.is_empty() && !self.branches.contains(&key(&tree.vcs_info().url, revision)))
    }

    fn update_working_tree(&self, tree: &WorkingTree, revision: &str, recursive: bool) -> Result<()> {
        let url = tree.vcs_info().url.clone();
        self.record(DriverCall::Update {
            url: url.clone(),
            revision: revision.to_string(),
            recursive,
        });

        let identity = normalize_vcs_url(&url);
        {
            let mut active = self.active_updates.lock().unwrap();
            let count = active.entry(identity.clone()).or_default();
            *count += 1;
            self.max_active_updates.fetch_max(*count, Ordering::SeqCst);
        }
        if let Some(delay) = self.update_delay {
            thread::sleep(delay);
        }
        *self.active_updates.lock().unwrap().get_mut(&identity).unwrap() -= 1;

        if self.fail_updates {
            return Err(git::checkout_failed(revision, "scripted failure"));
        }

        for entry in fs::read_dir(tree.root())? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }

        self.materialize(tree.root(), &url, revision);
        if recursive {
            for (path, nested) in self.nested.get(&key(&url, revision)).into_iter().flatten() {
                self.materialize(&tree.root().join(path), &nested.url, &nested.revision);
            }
        }

        self.checked_out
            .lock()
            .unwrap()
            .insert(identity, (revision.to_string(), recursive));
        Ok(())
    }

    fn list_nested_repositories(&self, tree: &WorkingTree) -> Result<BTreeMap<String, NestedRepository>> {
        let url = tree.vcs_info().url.clone();
        self.record(DriverCall::List { url: url.clone() });

        let checked_out = self.checked_out.lock().unwrap();
        let Some((revision, true)) = checked_out.get(&normalize_vcs_url(&url)) else {
            return Ok(BTreeMap::new());
        };
        Ok(self.nested.get(&key(&url, revision)).cloned().unwrap_or_default())
    }
}

/// Package storage counting every call
#[derive(Debug, Default)]
pub struct CountingPackageStorage {
    pub inner: InMemoryPackageProvenanceStorage,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl CountingPackageStorage {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl PackageProvenanceStorage for CountingPackageStorage {
    fn read(&self, id: &Identifier, origin: &PackageOrigin) -> Result<Option<PackageProvenanceResolutionResult>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(id, origin)
    }

    fn read_all(&self, id: &Identifier) -> Result<Vec<(PackageOrigin, PackageProvenanceResolutionResult)>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_all(id)
    }

    fn write(
        &self,
        id: &Identifier,
        origin: &PackageOrigin,
        result: &PackageProvenanceResolutionResult,
    ) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write(id, origin, result)
    }
}

/// Nested storage counting every call
#[derive(Debug, Default)]
pub struct CountingNestedStorage {
    pub inner: InMemoryNestedProvenanceStorage,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl CountingNestedStorage {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl NestedProvenanceStorage for CountingNestedStorage {
    fn read(&self, root: &RepositoryProvenance) -> Result<Option<NestedProvenanceResolutionResult>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(root)
    }

    fn write(&self, root: &RepositoryProvenance, result: &NestedProvenanceResolutionResult) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write(root, result)
    }
}

/// Storage that is always unavailable
#[derive(Debug, Default)]
pub struct FailingStorage;

fn unavailable() -> ProvenanceError {
    storage::failed("storage unavailable")
}

impl PackageProvenanceStorage for FailingStorage {
    fn read(&self, _: &Identifier, _: &PackageOrigin) -> Result<Option<PackageProvenanceResolutionResult>> {
        Err(unavailable())
    }

    fn read_all(&self, _: &Identifier) -> Result<Vec<(PackageOrigin, PackageProvenanceResolutionResult)>> {
        Err(unavailable())
    }

    fn write(&self, _: &Identifier, _: &PackageOrigin, _: &PackageProvenanceResolutionResult) -> Result<()> {
        Err(unavailable())
    }
}

impl NestedProvenanceStorage for FailingStorage {
    fn read(&self, _: &RepositoryProvenance) -> Result<Option<NestedProvenanceResolutionResult>> {
        Err(unavailable())
    }

    fn write(&self, _: &RepositoryProvenance, _: &NestedProvenanceResolutionResult) -> Result<()> {
        Err(unavailable())
    }
}
