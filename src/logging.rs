//! Logging setup for the `anwork-harness` binary and for tests.
//!
//! Logs always go to stderr (or a file) so stdout stays reserved for the
//! output of the commands the harness runs.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{HarnessError, Result};

/// Default filter directive for a verbosity level.
///
/// `RUST_LOG` always wins over this.
#[must_use]
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "anwork_testing=debug,info",
        _ => "trace",
    }
}

fn build_filter(verbose: u8, quiet: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)))
}

/// Initialize the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed.
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = build_filter(verbose, quiet);

    let installed = if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| HarnessError::filesystem(path, e))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init()
    };

    installed.map_err(|e| HarnessError::Config(format!("logging already initialized: {e}")))
}

/// Install a test-friendly subscriber. Safe to call repeatedly.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("anwork_testing=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
