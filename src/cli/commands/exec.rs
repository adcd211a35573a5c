//! Exec command implementation.

use serde::Serialize;

use super::print_json;
use crate::anwork::Anwork;
use crate::archive::Materializer;
use crate::cli::ExecArgs;
use crate::config::HarnessConfig;
use crate::error::Result;

#[derive(Serialize)]
struct ExecOutput<'a> {
    version: u32,
    command: &'a [String],
    stdout: &'a str,
}

/// Execute the exec command.
///
/// The context is discarded afterwards, so each invocation starts from an
/// empty task list.
///
/// # Errors
///
/// Returns an error if the version is missing, the release cannot be
/// materialized, or the command fails.
pub fn execute(args: &ExecArgs, config: &HarnessConfig, json: bool) -> Result<()> {
    let version = args.version.resolve()?;
    let materializer = Materializer::from_config(config);
    let mut anwork = Anwork::create(&materializer, version)?;

    let result = anwork.run(&args.args);
    anwork.close()?;
    let stdout = result?;

    if json {
        return print_json(&ExecOutput {
            version,
            command: &args.args,
            stdout: &stdout,
        });
    }
    print!("{stdout}");
    Ok(())
}
