//! Versions command implementation.

use serde::Serialize;

use super::print_json;
use crate::archive::ReleaseLayout;
use crate::config::HarnessConfig;
use crate::error::Result;

#[derive(Serialize)]
struct VersionsOutput<'a> {
    release_dir: String,
    tool: &'a str,
    versions: Vec<u32>,
}

/// Execute the versions command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(config: &HarnessConfig, json: bool) -> Result<()> {
    let layout = ReleaseLayout::new(&config.release_dir, &config.tool_name);
    let versions = layout.probe_versions();

    if json {
        return print_json(&VersionsOutput {
            release_dir: layout.release_dir().display().to_string(),
            tool: layout.tool_name(),
            versions,
        });
    }

    if versions.is_empty() {
        println!(
            "No {} releases found in {}",
            layout.tool_name(),
            layout.release_dir().display()
        );
        return Ok(());
    }
    for version in versions {
        println!("{version}\t{}", layout.archive_path(version).display());
    }
    Ok(())
}
