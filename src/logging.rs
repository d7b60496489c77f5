//! Tracing subscriber setup for the binary
//!
//! `PROVENANCE_LOG` takes an `EnvFilter` directive and wins over `--verbose`.

use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, prelude::*};

/// Environment variable holding the log filter directive
pub const LOG_ENV: &str = "PROVENANCE_LOG";

fn filter(verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }
    let level = if verbose { "debug" } else { "warn" };
    EnvFilter::new(format!("warn,provenance_resolver={level},provenance={level}"))
}

/// Install the global subscriber, writing to stderr.
///
/// Calling it again after a subscriber is installed has no effect.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(filter(verbose))
        .with(tracing_fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
