//! Package-provenance resolution
//!
//! Picks one concrete origin for a package. Origin kinds are tried in the
//! caller's priority order and the first success wins. Every attempted
//! (identifier, origin) pair goes through package-provenance storage: stored
//! successes are reused as-is, stored failures are retried unless disabled,
//! and fresh outcomes are written back.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::artifact::ArtifactChecker;
use super::revision::{describe, revision_candidates};
use crate::common::path_normalizer::normalize_relative_path;
use crate::error::{Result, git, nested, origin};
use crate::model::{
    ArtifactProvenance, Identifier, KnownProvenance, Package, PackageOrigin,
    PackageProvenanceResolutionResult, RemoteArtifact, RepositoryProvenance, SourceCodeOrigin, VcsInfo,
};
use crate::storage::PackageProvenanceStorage;
use crate::vcs::VcsDriver;
use crate::working_tree::{WorkingTree, WorkingTreeCache};

/// Tunables of [`PackageProvenanceResolver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageResolverOptions {
    /// Allow branch names and the default branch as revisions
    pub allow_moving_revisions: bool,
    /// Retry origins whose stored outcome is a failure
    pub retry_failed_resolutions: bool,
}

impl Default for PackageResolverOptions {
    fn default() -> Self {
        Self {
            allow_moving_revisions: true,
            retry_failed_resolutions: true,
        }
    }
}

pub struct PackageProvenanceResolver {
    storage: Arc<dyn PackageProvenanceStorage>,
    working_trees: Arc<WorkingTreeCache>,
    artifact_checker: Arc<dyn ArtifactChecker>,
    options: PackageResolverOptions,
}

impl PackageProvenanceResolver {
    pub fn new(
        storage: Arc<dyn PackageProvenanceStorage>,
        working_trees: Arc<WorkingTreeCache>,
        artifact_checker: Arc<dyn ArtifactChecker>,
        options: PackageResolverOptions,
    ) -> Self {
        Self {
            storage,
            working_trees,
            artifact_checker,
            options,
        }
    }

    /// Resolve `package` to exactly one provenance.
    ///
    /// Fails with [`crate::error::ProvenanceError::NoResolvableOrigin`] listing
    /// each attempted origin and its reason when no origin resolves.
    pub fn resolve(&self, package: &Package, priority: &[SourceCodeOrigin]) -> Result<KnownProvenance> {
        let mut attempted = Vec::new();
        let mut candidates: Vec<PackageOrigin> = Vec::new();
        let mut failures: Vec<(SourceCodeOrigin, String)> = Vec::new();

        for &kind in priority {
            if attempted.contains(&kind) {
                continue;
            }
            attempted.push(kind);

            let Some(candidate) = package.origin(kind) else {
                debug!(package = %package.id, origin = %kind, "No usable origin of this kind");
                continue;
            };

            candidates.push(candidate.clone());
            match self.resolve_origin(&package.id, &candidate, package) {
                Ok(provenance) => {
                    info!(package = %package.id, origin = %kind, provenance = %provenance, "Resolved package provenance");
                    return Ok(provenance);
                }
                Err(reason) => {
                    debug!(package = %package.id, origin = %kind, reason, "Origin did not resolve");
                    failures.push((kind, reason));
                }
            }
        }

        failures.extend(self.earlier_attempts(&package.id, &candidates));
        Err(origin::unresolvable(package.id.to_string(), failures))
    }

    /// Stored outcomes for origins other than `current`, e.g. a repository
    /// URL or artifact the package declared in an earlier run.
    fn earlier_attempts(&self, id: &Identifier, current: &[PackageOrigin]) -> Vec<(SourceCodeOrigin, String)> {
        let stored = match self.storage.read_all(id) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(package = %id, error = %e, "Could not read earlier resolution attempts");
                return Vec::new();
            }
        };

        stored
            .into_iter()
            .filter(|(origin, _)| !current.contains(origin))
            .map(|(origin, result)| {
                let outcome = match (&result, result.known_provenance()) {
                    (PackageProvenanceResolutionResult::Unresolved { message }, _) => format!("failed: {message}"),
                    (_, Some(provenance)) => format!("resolved to {provenance}"),
                    (_, None) => "no provenance".to_string(),
                };
                (origin.kind(), format!("earlier {} {outcome}", origin_label(&origin)))
            })
            .collect()
    }

    /// Resolve one origin, going through storage. Errors are failure reasons.
    fn resolve_origin(
        &self,
        id: &Identifier,
        candidate: &PackageOrigin,
        package: &Package,
    ) -> std::result::Result<KnownProvenance, String> {
        if let Some(stored) = self.read_stored(id, candidate) {
            match stored {
                PackageProvenanceResolutionResult::Unresolved { message } => {
                    if !self.options.retry_failed_resolutions {
                        debug!(package = %id, "Reusing stored failure");
                        return Err(message);
                    }
                    debug!(package = %id, previous = message, "Retrying stored failure");
                }
                resolved => {
                    if let Some(provenance) = resolved.known_provenance() {
                        debug!(package = %id, "Reusing stored resolution");
                        return Ok(provenance);
                    }
                }
            }
        }

        let outcome = match candidate {
            PackageOrigin::Artifact(artifact) => self.resolve_artifact(artifact),
            PackageOrigin::Vcs(vcs) => self.resolve_vcs(package, vcs),
        };

        let result = match &outcome {
            Ok(result) => result.clone(),
            Err(e) => PackageProvenanceResolutionResult::Unresolved { message: e.to_string() },
        };
        self.write_stored(id, candidate, &result);

        outcome.map_err(|e| e.to_string()).and_then(|result| {
            result
                .known_provenance()
                .ok_or_else(|| "resolution produced no provenance".to_string())
        })
    }

    fn resolve_artifact(&self, artifact: &RemoteArtifact) -> Result<PackageProvenanceResolutionResult> {
        self.artifact_checker.check(artifact)?;
        Ok(PackageProvenanceResolutionResult::ResolvedArtifact {
            provenance: ArtifactProvenance::new(artifact.clone()),
        })
    }

    fn resolve_vcs(&self, package: &Package, vcs: &VcsInfo) -> Result<PackageProvenanceResolutionResult> {
        let candidates = revision_candidates(vcs, &package.id, self.options.allow_moving_revisions);
        if candidates.is_empty() {
            return Err(git::ref_resolve_failed(
                &vcs.revision,
                "no revision requested and the package has no version",
            ));
        }

        self.working_trees.use_working_tree(vcs, |driver, tree| {
            let mut failures = Vec::with_capacity(candidates.len());
            for candidate in &candidates {
                match self.try_revision(driver, tree, vcs, candidate) {
                    Ok(result) => return Ok(result),
                    Err(e) => {
                        debug!(url = vcs.url, revision = describe(candidate), error = %e, "Revision candidate rejected");
                        failures.push(format!("{}: {e}", describe(candidate)));
                    }
                }
            }

            let tried: Vec<&str> = candidates.iter().map(|c| describe(c)).collect();
            Err(git::ref_resolve_failed(tried.join(", "), failures.join("; ")))
        })
    }

    fn try_revision(
        &self,
        driver: &dyn VcsDriver,
        tree: &WorkingTree,
        vcs: &VcsInfo,
        candidate: &str,
    ) -> Result<PackageProvenanceResolutionResult> {
        let resolved = driver.resolve_revision(tree, candidate)?;
        let is_fixed_revision = driver.is_fixed_revision(tree, candidate)?;
        if !is_fixed_revision && !self.options.allow_moving_revisions {
            return Err(git::ref_resolve_failed(candidate, "moving revisions are not allowed"));
        }

        if !vcs.path.trim().is_empty() {
            driver.update_working_tree(tree, &resolved, false)?;
            let exists = normalize_relative_path(&vcs.path).is_some_and(|path| tree.root().join(path).exists());
            if !exists {
                return Err(nested::path_not_found(&vcs.path, &vcs.url, &resolved));
            }
        }

        Ok(PackageProvenanceResolutionResult::ResolvedRepository {
            provenance: RepositoryProvenance::new(vcs.clone().with_revision(candidate), resolved)?,
            cloned_revision: candidate.to_string(),
            is_fixed_revision,
        })
    }

    fn read_stored(&self, id: &Identifier, candidate: &PackageOrigin) -> Option<PackageProvenanceResolutionResult> {
        match self.storage.read(id, candidate) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(package = %id, error = %e, "Package provenance storage read failed, treating as miss");
                None
            }
        }
    }

    fn write_stored(&self, id: &Identifier, candidate: &PackageOrigin, result: &PackageProvenanceResolutionResult) {
        if let Err(e) = self.storage.write(id, candidate, result) {
            warn!(package = %id, error = %e, "Failed to store package provenance");
        }
    }
}

fn origin_label(origin: &PackageOrigin) -> String {
    match origin {
        PackageOrigin::Artifact(artifact) => artifact.url.clone(),
        PackageOrigin::Vcs(vcs) if vcs.revision.is_empty() => vcs.url.clone(),
        PackageOrigin::Vcs(vcs) => format!("{}@{}", vcs.url, vcs.revision),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvenanceError;
    use crate::model::VcsType;
    use crate::resolver::artifact::UrlArtifactChecker;
    use crate::test_fixtures::{CountingPackageStorage, FailingStorage, FakeVcsDriver, working_tree_cache};

    const URL: &str = "https://example.com/lib.git";
    const ARTIFACT: &str = "https://example.com/lib-1.0-sources.tgz";

    fn package(revision: &str) -> Package {
        Package::new("Maven:org.example:lib:1.0".parse().unwrap())
            .with_source_artifact(RemoteArtifact::new(ARTIFACT))
            .with_vcs(VcsInfo::new(VcsType::Git, URL, revision))
    }

    struct Setup {
        _temp: tempfile::TempDir,
        driver: Arc<FakeVcsDriver>,
        storage: Arc<CountingPackageStorage>,
        resolver: PackageProvenanceResolver,
    }

    fn setup(driver: FakeVcsDriver, options: PackageResolverOptions) -> Setup {
        let driver = Arc::new(driver);
        let (temp, cache) = working_tree_cache(&driver);
        let storage = Arc::new(CountingPackageStorage::default());
        let resolver = PackageProvenanceResolver::new(
            Arc::clone(&storage) as Arc<dyn PackageProvenanceStorage>,
            Arc::new(cache),
            Arc::new(UrlArtifactChecker),
            options,
        );
        Setup {
            _temp: temp,
            driver,
            storage,
            resolver,
        }
    }

    #[test]
    fn test_artifact_first_never_touches_vcs() {
        let s = setup(FakeVcsDriver::new().with_ref(URL, "v1.0", "abc123"), PackageResolverOptions::default());

        let provenance = s
            .resolver
            .resolve(&package("v1.0"), &[SourceCodeOrigin::Artifact, SourceCodeOrigin::Vcs])
            .unwrap();

        assert!(matches!(provenance, KnownProvenance::Artifact(_)));
        assert_eq!(s.driver.call_count(), 0);
    }

    #[test]
    fn test_vcs_first_resolves_requested_revision() {
        let s = setup(FakeVcsDriver::new().with_ref(URL, "v1.0", "abc123"), PackageResolverOptions::default());

        let provenance = s.resolver.resolve(&package("v1.0"), &SourceCodeOrigin::DEFAULT_PRIORITY).unwrap();

        let repository = provenance.as_repository().unwrap();
        assert_eq!(repository.resolved_revision, "abc123");
        assert_eq!(repository.vcs_info.revision, "v1.0");

        let stored = s
            .storage
            .inner
            .read(&package("v1.0").id, &PackageOrigin::Vcs(package("v1.0").vcs))
            .unwrap();
        assert!(matches!(
            stored,
            Some(PackageProvenanceResolutionResult::ResolvedRepository {
                is_fixed_revision: true,
                ..
            })
        ));
    }

    #[test]
    fn test_falls_back_to_next_origin() {
        let s = setup(FakeVcsDriver::new(), PackageResolverOptions::default());

        let provenance = s.resolver.resolve(&package("v1.0"), &SourceCodeOrigin::DEFAULT_PRIORITY).unwrap();

        assert!(matches!(provenance, KnownProvenance::Artifact(_)));
        // The VCS failure is recorded too.
        assert_eq!(s.storage.writes(), 2);
    }

    #[test]
    fn test_no_resolvable_origin_lists_attempts() {
        let s = setup(FakeVcsDriver::new(), PackageResolverOptions::default());
        let package = Package::new("Maven:org.example:lib:1.0".parse().unwrap())
            .with_source_artifact(RemoteArtifact::new("not a url"))
            .with_vcs(VcsInfo::new(VcsType::Git, URL, "v1.0"));

        let err = s.resolver.resolve(&package, &SourceCodeOrigin::DEFAULT_PRIORITY).unwrap_err();

        assert!(matches!(err, ProvenanceError::NoResolvableOrigin { .. }));
        let message = err.to_string();
        assert!(message.contains("vcs:"), "{message}");
        assert!(message.contains("artifact:"), "{message}");
    }

    #[test]
    fn test_stored_success_is_reused_without_vcs_work() {
        let s = setup(FakeVcsDriver::new().with_ref(URL, "v1.0", "abc123"), PackageResolverOptions::default());
        let priority = [SourceCodeOrigin::Vcs];

        let first = s.resolver.resolve(&package("v1.0"), &priority).unwrap();
        let calls = s.driver.call_count();
        let second = s.resolver.resolve(&package("v1.0"), &priority).unwrap();

        assert_eq!(first, second);
        assert_eq!(s.driver.call_count(), calls);
    }

    #[test]
    fn test_stored_failure_is_retried_by_default() {
        let s = setup(FakeVcsDriver::new().with_ref(URL, "v1.0", "abc123"), PackageResolverOptions::default());
        let package = package("v1.0");
        let candidate = PackageOrigin::Vcs(package.vcs.clone());
        s.storage
            .inner
            .write(
                &package.id,
                &candidate,
                &PackageProvenanceResolutionResult::Unresolved {
                    message: "network down".to_string(),
                },
            )
            .unwrap();

        let provenance = s.resolver.resolve(&package, &[SourceCodeOrigin::Vcs]).unwrap();

        assert!(provenance.as_repository().is_some());
        assert!(s.storage.inner.read(&package.id, &candidate).unwrap().unwrap().is_resolved());
    }

    #[test]
    fn test_stored_failure_surfaces_when_retry_disabled() {
        let options = PackageResolverOptions {
            retry_failed_resolutions: false,
            ..PackageResolverOptions::default()
        };
        let s = setup(FakeVcsDriver::new().with_ref(URL, "v1.0", "abc123"), options);
        let package = package("v1.0");
        s.storage
            .inner
            .write(
                &package.id,
                &PackageOrigin::Vcs(package.vcs.clone()),
                &PackageProvenanceResolutionResult::Unresolved {
                    message: "network down".to_string(),
                },
            )
            .unwrap();

        let err = s.resolver.resolve(&package, &[SourceCodeOrigin::Vcs]).unwrap_err();

        assert!(err.to_string().contains("network down"));
        assert_eq!(s.driver.call_count(), 0);
    }

    #[test]
    fn test_version_tag_guessing() {
        let s = setup(
            FakeVcsDriver::new().with_ref(URL, "v1.0", "abc123"),
            PackageResolverOptions::default(),
        );

        let provenance = s.resolver.resolve(&package(""), &[SourceCodeOrigin::Vcs]).unwrap();

        let repository = provenance.as_repository().unwrap();
        assert_eq!(repository.vcs_info.revision, "v1.0");
        assert_eq!(repository.resolved_revision, "abc123");
    }

    #[test]
    fn test_moving_revision_rejected_when_disallowed() {
        let options = PackageResolverOptions {
            allow_moving_revisions: false,
            ..PackageResolverOptions::default()
        };
        let s = setup(FakeVcsDriver::new().with_branch(URL, "main", "abc123"), options);

        assert!(s.resolver.resolve(&package("main"), &[SourceCodeOrigin::Vcs]).is_err());
    }

    #[test]
    fn test_moving_revision_recorded_as_not_fixed() {
        let s = setup(
            FakeVcsDriver::new().with_branch(URL, "main", "abc123"),
            PackageResolverOptions::default(),
        );
        let package = package("main");

        s.resolver.resolve(&package, &[SourceCodeOrigin::Vcs]).unwrap();

        let stored = s
            .storage
            .inner
            .read(&package.id, &PackageOrigin::Vcs(package.vcs.clone()))
            .unwrap();
        assert!(matches!(
            stored,
            Some(PackageProvenanceResolutionResult::ResolvedRepository {
                is_fixed_revision: false,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_sub_path_rejects_candidate() {
        let s = setup(
            FakeVcsDriver::new()
                .with_ref(URL, "v1.0", "abc123")
                .with_branch(URL, "", "fff999")
                .with_files(URL, "fff999", &["modules/lib/pom.xml"]),
            PackageResolverOptions::default(),
        );
        let mut package = package("v1.0");
        package.vcs = package.vcs.with_path("modules/lib");

        let provenance = s.resolver.resolve(&package, &[SourceCodeOrigin::Vcs]).unwrap();

        let repository = provenance.as_repository().unwrap();
        assert_eq!(repository.resolved_revision, "fff999");
        assert_eq!(repository.vcs_info.path, "modules/lib");
    }

    #[test]
    fn test_storage_failures_do_not_abort_resolution() {
        let driver = Arc::new(FakeVcsDriver::new().with_ref(URL, "v1.0", "abc123"));
        let (_temp, cache) = working_tree_cache(&driver);
        let resolver = PackageProvenanceResolver::new(
            Arc::new(FailingStorage),
            Arc::new(cache),
            Arc::new(UrlArtifactChecker),
            PackageResolverOptions::default(),
        );

        let provenance = resolver.resolve(&package("v1.0"), &[SourceCodeOrigin::Vcs]).unwrap();
        assert!(provenance.as_repository().is_some());
    }

    #[test]
    fn test_unresolvable_report_includes_earlier_origins() {
        let s = setup(FakeVcsDriver::new(), PackageResolverOptions::default());
        let moved = PackageOrigin::Vcs(VcsInfo::new(VcsType::Git, "https://old.example.com/lib.git", "v1.0"));
        s.storage
            .inner
            .write(
                &package("v1.0").id,
                &moved,
                &PackageProvenanceResolutionResult::Unresolved {
                    message: "repository not found".to_string(),
                },
            )
            .unwrap();

        let err = s.resolver.resolve(&package("v1.0"), &[SourceCodeOrigin::Vcs]).unwrap_err();

        match err {
            ProvenanceError::NoResolvableOrigin { attempts, .. } => {
                assert!(attempts.contains("earlier https://old.example.com/lib.git@v1.0 failed: repository not found"));
                assert_eq!(attempts.matches("earlier").count(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
