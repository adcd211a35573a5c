//! Materialize command implementation.

use serde::Serialize;

use super::print_json;
use crate::archive::Materializer;
use crate::cli::VersionArg;
use crate::config::HarnessConfig;
use crate::error::Result;
use crate::util::{should_show_progress, spinner};

#[derive(Serialize)]
struct MaterializeOutput {
    version: u32,
    fingerprint: String,
    root: String,
    binary: String,
    extracted: bool,
}

/// Execute the materialize command.
///
/// # Errors
///
/// Returns an error if the version is missing or the release cannot be
/// materialized.
pub fn execute(args: &VersionArg, config: &HarnessConfig, json: bool) -> Result<()> {
    let version = args.resolve()?;
    let materializer = Materializer::from_config(config);

    let progress = spinner(
        format!("Materializing {} v{version}", config.tool_name),
        !json && should_show_progress(),
    );
    let result = materializer.materialize(version);
    progress.finish_and_clear();
    let materialized = result?;

    if json {
        return print_json(&MaterializeOutput {
            version,
            fingerprint: materialized.fingerprint,
            root: materialized.root.display().to_string(),
            binary: materialized.binary.display().to_string(),
            extracted: materializer.extractions() > 0,
        });
    }

    println!("{}", materialized.binary.display());
    println!("fingerprint: {}", materialized.fingerprint);
    Ok(())
}
