use std::path::Path;

use provenance_resolver::config::ResolverConfig;
use provenance_resolver::error::Result;
use provenance_resolver::working_tree::stats;

use crate::cli::{CacheArgs, CacheSubcommand};

pub fn run(args: CacheArgs) -> Result<()> {
    let config = ResolverConfig::load_or_default(Path::new(ResolverConfig::FILE_NAME))?;
    let cache_dir = config.cache_dir()?;

    match args.command {
        Some(CacheSubcommand::Clean) => {
            stats::clear_cache(&cache_dir)?;
            println!("Cache cleared successfully.");
        }
        None => show_cache_stats(&cache_dir)?,
    }

    Ok(())
}

fn show_cache_stats(cache_dir: &Path) -> Result<()> {
    let stats = stats::cache_stats(cache_dir)?;

    println!("Cache Statistics:");
    println!("  Location: {}", cache_dir.display());
    println!("  Working trees: {}", stats.working_trees);
    println!("  Stored results: {}", stats.stored_results);
    println!("  Size: {}", stats.formatted_size());

    if stats.working_trees == 0 && stats.stored_results == 0 {
        println!("\nCache is empty.");
    } else {
        println!("\nRun 'provenance cache clean' to remove everything from cache.");
    }

    Ok(())
}
