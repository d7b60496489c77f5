//! Aggregate record of a resolution run
//!
//! Collections are kept side by side and correlated through provenance
//! identity, never by position: a package points at its `KnownProvenance`,
//! and nested trees, file listings and scan results are looked up by it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::listing::FileListing;

use super::identifier::Identifier;
use super::nested::NestedProvenance;
use super::provenance::KnownProvenance;

/// Per-package outcome within a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageResolution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<KnownProvenance>,

    /// Why the package provenance could not be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_issue: Option<String>,

    /// Why the nested provenance could not be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_issue: Option<String>,
}

/// Opaque scan result attached to a provenance by a downstream scanner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceScanResult {
    pub provenance: KnownProvenance,
    pub scanner: String,
    pub summary: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRun {
    pub packages: BTreeMap<Identifier, PackageResolution>,
    pub nested_provenances: Vec<NestedProvenance>,
    pub file_listings: Vec<FileListing>,
    pub scan_results: Vec<ProvenanceScanResult>,
}

impl ProvenanceRun {
    pub fn record_package(&mut self, id: Identifier, provenance: KnownProvenance) {
        self.packages.insert(
            id,
            PackageResolution {
                provenance: Some(provenance),
                package_issue: None,
                nested_issue: None,
            },
        );
    }

    pub fn record_package_issue(&mut self, id: Identifier, issue: impl Into<String>) {
        self.packages.insert(
            id,
            PackageResolution {
                provenance: None,
                package_issue: Some(issue.into()),
                nested_issue: None,
            },
        );
    }

    pub fn record_nested_issue(&mut self, id: &Identifier, issue: impl Into<String>) {
        if let Some(resolution) = self.packages.get_mut(id) {
            resolution.nested_issue = Some(issue.into());
        }
    }

    /// Add a nested tree; a tree with the same root replaces the previous one.
    pub fn add_nested_provenance(&mut self, nested: NestedProvenance) {
        self.nested_provenances.retain(|existing| existing.root != nested.root);
        self.nested_provenances.push(nested);
    }

    /// Add a file listing; a listing for the same provenance replaces the previous one.
    pub fn add_file_listing(&mut self, listing: FileListing) {
        self.file_listings
            .retain(|existing| existing.provenance != listing.provenance);
        self.file_listings.push(listing);
    }

    pub fn add_scan_result(&mut self, result: ProvenanceScanResult) {
        self.scan_results.push(result);
    }

    pub fn nested_provenance(&self, root: &KnownProvenance) -> Option<&NestedProvenance> {
        self.nested_provenances
            .iter()
            .find(|nested| &nested.root == root)
    }

    /// The nested tree for a package, correlated through its provenance
    pub fn nested_for_package(&self, id: &Identifier) -> Option<&NestedProvenance> {
        let provenance = self.packages.get(id)?.provenance.as_ref()?;
        self.nested_provenance(provenance)
    }

    pub fn file_listing(&self, provenance: &KnownProvenance) -> Option<&FileListing> {
        self.file_listings
            .iter()
            .find(|listing| &listing.provenance == provenance)
    }

    pub fn scan_results_for(&self, provenance: &KnownProvenance) -> Vec<&ProvenanceScanResult> {
        self.scan_results
            .iter()
            .filter(|result| &result.provenance == provenance)
            .collect()
    }

    /// Every distinct provenance in the run: package roots and nested repositories
    pub fn all_provenances(&self) -> Vec<KnownProvenance> {
        let mut all: Vec<KnownProvenance> = self
            .nested_provenances
            .iter()
            .flat_map(NestedProvenance::all_provenances)
            .chain(self.packages.values().filter_map(|p| p.provenance.clone()))
            .collect();
        all.sort();
        all.dedup();
        all
    }

    pub fn unresolved_packages(&self) -> Vec<&Identifier> {
        self.packages
            .iter()
            .filter(|(_, resolution)| {
                resolution.package_issue.is_some() || resolution.nested_issue.is_some()
            })
            .map(|(id, _)| id)
            .collect()
    }
}
