//! Provenance - package source provenance resolver
//!
//! Command line front-end over the `provenance_resolver` library.

use clap::Parser;
use miette::Diagnostic;

mod cli;
mod commands;

use cli::{Cli, Commands};
use provenance_resolver::logging;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Resolve(args) => commands::resolve::run(args),
        Commands::Cache(args) => commands::clean_cache::run(args).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(help) = e.help() {
                eprintln!("  help: {help}");
            }
            std::process::exit(1);
        }
    }
}
