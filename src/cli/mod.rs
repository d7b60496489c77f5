//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - resolve: Resolve command arguments
//! - cache: Cache command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};

pub mod cache;
pub mod resolve;

pub use cache::{CacheArgs, CacheSubcommand};
pub use resolve::ResolveArgs;

/// Provenance resolver
///
/// Find where the source code of packages comes from.
#[derive(Parser, Debug)]
#[command(
    name = "provenance",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Resolve package source provenance and nested repositories",
    long_about = "Resolves each package to a source artifact or a repository pinned to a \
                  concrete revision, then discovers the repositories nested in it.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  provenance resolve package.yaml                   \x1b[90m# Resolve with default priority\x1b[0m\n   \
                  provenance resolve package.yaml -p artifact,vcs   \x1b[90m# Prefer source artifacts\x1b[0m\n   \
                  provenance resolve package.yaml --list-files      \x1b[90m# Include file listings\x1b[0m\n   \
                  provenance cache clean                            \x1b[90m# Remove working trees\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the provenance of packages
    Resolve(ResolveArgs),

    /// Manage cache directory
    #[command(name = "cache")]
    Cache(CacheArgs),
}
