use clap::Parser;
use std::path::PathBuf;

use provenance_resolver::model::SourceCodeOrigin;

/// Arguments for resolve command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Resolve one package:\n    provenance resolve package.yaml\n\n\
                  Resolve several packages, artifacts first:\n    provenance resolve a.yaml b.yaml --priority artifact,vcs\n\n\
                  Use a configuration file:\n    provenance resolve package.yaml --config provenance.yaml")]
pub struct ResolveArgs {
    /// Package description files (YAML)
    #[arg(required = true)]
    pub packages: Vec<PathBuf>,

    /// Origin priority, highest first (overrides configuration)
    #[arg(long, short = 'p', value_delimiter = ',')]
    pub priority: Option<Vec<SourceCodeOrigin>>,

    /// Configuration file (defaults to ./provenance.yaml if present)
    #[arg(long, short = 'c', env = "PROVENANCE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Include per-provenance file listings in the output
    #[arg(long)]
    pub list_files: bool,
}
