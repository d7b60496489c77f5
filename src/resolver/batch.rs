//! Concurrent resolution of many packages
//!
//! Packages are pulled from a shared queue by a fixed number of scoped worker
//! threads. Each package goes through package-provenance resolution, then
//! nested-provenance resolution, then (optionally) file listing. Failures are
//! recorded per package in the resulting [`ProvenanceRun`]; they never stop
//! other packages.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::thread;

use tracing::{debug, warn};

use super::nested::NestedProvenanceResolver;
use super::package::PackageProvenanceResolver;
use crate::error::Result;
use crate::listing::FileListing;
use crate::model::{Identifier, KnownProvenance, NestedProvenance, Package, ProvenanceRun, SourceCodeOrigin};

struct Outcome {
    id: Identifier,
    provenance: Result<KnownProvenance>,
    nested: Option<Result<NestedProvenance>>,
    listings: Option<Result<Vec<FileListing>>>,
}

pub struct BatchResolver {
    packages: PackageProvenanceResolver,
    nested: NestedProvenanceResolver,
    priority: Vec<SourceCodeOrigin>,
    workers: usize,
    list_files: bool,
}

impl BatchResolver {
    pub fn new(
        packages: PackageProvenanceResolver,
        nested: NestedProvenanceResolver,
        priority: Vec<SourceCodeOrigin>,
        workers: usize,
    ) -> Self {
        Self {
            packages,
            nested,
            priority,
            workers: workers.max(1),
            list_files: false,
        }
    }

    /// Also produce per-provenance file listings
    pub fn with_file_listings(mut self, list_files: bool) -> Self {
        self.list_files = list_files;
        self
    }

    pub fn package_resolver(&self) -> &PackageProvenanceResolver {
        &self.packages
    }

    pub fn nested_resolver(&self) -> &NestedProvenanceResolver {
        &self.nested
    }

    /// Resolve every package, returning the aggregate record
    pub fn resolve_all(&self, packages: &[Package]) -> ProvenanceRun {
        let queue: Mutex<VecDeque<&Package>> = Mutex::new(packages.iter().collect());
        let outcomes: Mutex<Vec<Outcome>> = Mutex::new(Vec::with_capacity(packages.len()));
        let workers = self.workers.min(packages.len()).max(1);

        debug!(packages = packages.len(), workers, "Starting batch resolution");
        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    loop {
                        let next = queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
                        let Some(package) = next else { break };
                        let outcome = self.resolve_one(package);
                        outcomes
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(outcome);
                    }
                });
            }
        });

        let mut outcomes = outcomes.into_inner().unwrap_or_else(PoisonError::into_inner);
        outcomes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut run = ProvenanceRun::default();
        for outcome in outcomes {
            record(&mut run, outcome);
        }
        run
    }

    fn resolve_one(&self, package: &Package) -> Outcome {
        let provenance = self.packages.resolve(package, &self.priority);

        let nested = provenance
            .as_ref()
            .ok()
            .map(|provenance| self.nested.resolve_nested_provenance(provenance));

        let listings = match &nested {
            Some(Ok(nested)) if self.list_files => Some(self.nested.file_listings(nested)),
            _ => None,
        };

        Outcome {
            id: package.id.clone(),
            provenance,
            nested,
            listings,
        }
    }
}

fn record(run: &mut ProvenanceRun, outcome: Outcome) {
    let Outcome {
        id,
        provenance,
        nested,
        listings,
    } = outcome;

    match provenance {
        Ok(provenance) => run.record_package(id.clone(), provenance),
        Err(e) => {
            warn!(package = %id, error = %e, "Package could not be resolved");
            run.record_package_issue(id, e.to_string());
            return;
        }
    }

    match nested {
        Some(Ok(nested)) => run.add_nested_provenance(nested),
        Some(Err(e)) => {
            warn!(package = %id, error = %e, "Nested provenance could not be resolved");
            run.record_nested_issue(&id, e.to_string());
        }
        None => {}
    }

    match listings {
        Some(Ok(listings)) => listings.into_iter().for_each(|listing| run.add_file_listing(listing)),
        Some(Err(e)) => {
            warn!(package = %id, error = %e, "Files could not be listed");
            run.record_nested_issue(&id, format!("file listing failed: {e}"));
        }
        None => {}
    }
}
