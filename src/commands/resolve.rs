use std::path::{Path, PathBuf};

use provenance_resolver::config::ResolverConfig;
use provenance_resolver::error::Result;
use provenance_resolver::model::{Package, ProvenanceRun, SourceCodeOrigin};
use provenance_resolver::resolver::BatchResolver;
use tracing::info;

use crate::cli::ResolveArgs;

/// Resolve the given packages and print the run record as JSON.
///
/// Returns whether every package resolved.
pub fn run(args: ResolveArgs) -> Result<bool> {
    let config = load_config(args.config.as_deref(), args.priority)?;
    let packages = args
        .packages
        .iter()
        .map(|path| Package::load(path))
        .collect::<Result<Vec<_>>>()?;

    let resolver = BatchResolver::from_config(&config)?.with_file_listings(args.list_files);
    let run = resolver.resolve_all(&packages);

    println!("{}", serde_json::to_string_pretty(&run)?);
    report_unresolved(&run);

    Ok(run.unresolved_packages().is_empty())
}

fn load_config(path: Option<&Path>, priority: Option<Vec<SourceCodeOrigin>>) -> Result<ResolverConfig> {
    let mut config = match path {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::load_or_default(&PathBuf::from(ResolverConfig::FILE_NAME))?,
    };
    if let Some(priority) = priority {
        config.origin_priority = priority;
    }
    info!(priority = ?config.origin_priority, "Loaded configuration");
    Ok(config)
}

fn report_unresolved(run: &ProvenanceRun) {
    for (id, resolution) in &run.packages {
        if let Some(issue) = &resolution.package_issue {
            eprintln!("Unresolved: {id}: {issue}");
        }
        if let Some(issue) = &resolution.nested_issue {
            eprintln!("Nested repositories unresolved: {id}: {issue}");
        }
    }
}
