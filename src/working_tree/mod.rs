//! Working-tree cache
//!
//! Working trees are on-disk checkouts reused across resolutions to amortize
//! fetch cost. There is one working tree per repository identity (normalized
//! URL plus VCS type), stored under `<cache>/trees/<hash>/`.
//!
//! Access is scoped: [`WorkingTreeCache::use_working_tree`] hands the tree to
//! a closure while holding that identity's lock, and releases the lock when
//! the closure returns, fails or panics. Different identities never contend.
//! The in-process lock is backed by an advisory `<hash>.lock` file, so caches
//! in other processes sharing the directory are excluded as well.
//!
//! A tree is usable only after its driver finished initializing it, which is
//! recorded by a `<hash>.ready` marker next to it. A scope that panics, or
//! whose initialization fails, clears the marker so the next caller starts
//! from an empty directory.

pub mod lock;
pub mod paths;
pub mod stats;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::error::{Result, working_tree};
use crate::model::{RepositoryIdentity, VcsInfo};
use crate::vcs::{VcsDriver, VcsRegistry};

use self::lock::TreeLock;

/// A working tree lent to a scope
#[derive(Debug, Clone)]
pub struct WorkingTree {
    root: PathBuf,
    vcs_info: VcsInfo,
}

impl WorkingTree {
    /// Directory holding the checkout
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The VCS location this tree was requested for
    pub fn vcs_info(&self) -> &VcsInfo {
        &self.vcs_info
    }
}

#[derive(Debug, Default)]
struct SlotState {
    ready: bool,
}

#[derive(Debug, Default)]
struct Slot {
    state: Mutex<SlotState>,
    last_used: AtomicU64,
}

/// Clears a slot's readiness unless disarmed before drop.
struct UsabilityGuard<'a> {
    state: &'a mut SlotState,
    marker: &'a Path,
    armed: bool,
}

impl<'a> UsabilityGuard<'a> {
    fn new(state: &'a mut SlotState, marker: &'a Path) -> Self {
        Self {
            state,
            marker,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for UsabilityGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.ready = false;
            let _ = fs::remove_file(self.marker);
        }
    }
}

/// Bounded cache of working trees with per-identity exclusive access
#[derive(Debug)]
pub struct WorkingTreeCache {
    trees_dir: PathBuf,
    registry: Arc<VcsRegistry>,
    max_working_trees: usize,
    slots: Mutex<HashMap<RepositoryIdentity, Arc<Slot>>>,
    clock: AtomicU64,
}

impl WorkingTreeCache {
    /// Create a cache keeping its trees under `<cache_dir>/trees`.
    pub fn new(cache_dir: &Path, registry: Arc<VcsRegistry>, max_working_trees: usize) -> Result<Self> {
        let trees_dir = cache_dir.join(paths::TREES_DIR);
        fs::create_dir_all(&trees_dir)
            .map_err(|e| working_tree::failed(trees_dir.display().to_string(), e.to_string()))?;
        let trees_dir = dunce::canonicalize(&trees_dir)?;

        Ok(Self {
            trees_dir,
            registry,
            max_working_trees: max_working_trees.max(1),
            slots: Mutex::new(HashMap::new()),
            clock: AtomicU64::new(0),
        })
    }

    /// Directory containing all working trees
    pub fn trees_dir(&self) -> &Path {
        &self.trees_dir
    }

    /// The driver registry used to prepare trees
    pub fn registry(&self) -> &VcsRegistry {
        &self.registry
    }

    /// Run `f` with exclusive use of the working tree for `vcs`.
    ///
    /// Blocks while another scope holds the same repository identity. The
    /// tree is initialized by the driver on first use.
    pub fn use_working_tree<T>(
        &self,
        vcs: &VcsInfo,
        f: impl FnOnce(&dyn VcsDriver, &WorkingTree) -> Result<T>,
    ) -> Result<T> {
        let driver = self.registry.driver_for(&vcs.vcs_type)?;
        let identity = vcs.repository_identity();
        let tree = WorkingTree {
            root: self.trees_dir.join(paths::tree_dir_name(&identity)),
            vcs_info: vcs.clone(),
        };
        let marker = paths::ready_marker(&tree.root);

        let (slot, evicted) = self.acquire_slot(&identity);
        if let Some(victim) = evicted {
            self.remove_tree(&victim);
        }

        let mut state = lock(&slot.state);
        let _tree_lock = TreeLock::acquire(&paths::lock_file(&tree.root), &vcs.url)?;
        debug!(identity = %identity, root = %tree.root.display(), "Acquired working tree");

        // Another process may have evicted the tree since this slot last saw it.
        let guard = UsabilityGuard::new(&mut state, &marker);
        if !(guard.state.ready && marker.exists()) {
            if marker.exists() && tree.root.is_dir() {
                debug!(identity = %identity, "Reusing working tree from a previous run");
            } else {
                prepare(driver.as_ref(), &tree, &marker)?;
            }
            guard.state.ready = true;
        }

        let result = f(driver.as_ref(), &tree);
        guard.disarm();
        debug!(identity = %identity, ok = result.is_ok(), "Released working tree");
        result
    }

    /// Number of working trees currently tracked in memory
    pub fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up or create the slot for `identity`.
    ///
    /// Also returns the tree evicted to make room, which the caller removes
    /// from disk once the map lock is released.
    fn acquire_slot(&self, identity: &RepositoryIdentity) -> (Arc<Slot>, Option<RepositoryIdentity>) {
        let mut slots = lock(&self.slots);
        let (slot, evicted) = match slots.get(identity) {
            Some(slot) => (Arc::clone(slot), None),
            None => {
                let slot = Arc::new(Slot::default());
                slots.insert(identity.clone(), Arc::clone(&slot));
                let evicted = if slots.len() > self.max_working_trees {
                    self.evict_idle(&mut slots, identity)
                } else {
                    None
                };
                (slot, evicted)
            }
        };
        slot.last_used
            .store(self.clock.fetch_add(1, Ordering::Relaxed), Ordering::Relaxed);
        (slot, evicted)
    }

    /// Forget the least recently used tree nobody is holding or waiting for.
    ///
    /// Holders clone the slot `Arc` under the map lock, so a strong count of
    /// one while that lock is held means the slot is idle.
    fn evict_idle(
        &self,
        slots: &mut HashMap<RepositoryIdentity, Arc<Slot>>,
        keep: &RepositoryIdentity,
    ) -> Option<RepositoryIdentity> {
        let victim = slots
            .iter()
            .filter(|(identity, slot)| *identity != keep && Arc::strong_count(slot) == 1)
            .min_by_key(|(_, slot)| slot.last_used.load(Ordering::Relaxed))
            .map(|(identity, _)| identity.clone());

        match victim {
            Some(victim) => {
                slots.remove(&victim);
                Some(victim)
            }
            None => {
                debug!("All working trees are in use, nothing to evict");
                None
            }
        }
    }

    /// Delete an evicted tree once no other process is using it.
    fn remove_tree(&self, identity: &RepositoryIdentity) {
        let root = self.trees_dir.join(paths::tree_dir_name(identity));
        let _tree_lock = match TreeLock::acquire(&paths::lock_file(&root), &identity.to_string()) {
            Ok(tree_lock) => tree_lock,
            Err(e) => {
                warn!(identity = %identity, error = %e, "Failed to lock evicted working tree");
                return;
            }
        };

        let _ = fs::remove_file(paths::ready_marker(&root));
        if let Err(e) = fs::remove_dir_all(&root) {
            if root.exists() {
                warn!(identity = %identity, error = %e, "Failed to remove evicted working tree");
            }
        }
        debug!(identity = %identity, "Evicted working tree");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn prepare(driver: &dyn VcsDriver, tree: &WorkingTree, marker: &Path) -> Result<()> {
    let url = &tree.vcs_info.url;
    let failed = |e: std::io::Error| working_tree::failed(url, e.to_string());

    if tree.root.exists() {
        fs::remove_dir_all(&tree.root).map_err(failed)?;
    }
    fs::create_dir_all(&tree.root).map_err(failed)?;
    driver.init_working_tree(&tree.root, &tree.vcs_info)?;
    fs::write(marker, url.as_bytes()).map_err(failed)?;

    debug!(url, root = %tree.root.display(), "Prepared working tree");
    Ok(())
}
