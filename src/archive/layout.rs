//! Naming conventions for release archives and their contents.

use std::path::{Path, PathBuf};

/// Maps an integer version onto archive and binary paths.
///
/// Archives live at `<release_dir>/v<N>/<tool>-<N>.zip` and unpack to
/// `<tool>-<N>/bin/<tool>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLayout {
    release_dir: PathBuf,
    tool_name: String,
}

impl ReleaseLayout {
    #[must_use]
    pub fn new(release_dir: impl Into<PathBuf>, tool_name: impl Into<String>) -> Self {
        Self {
            release_dir: release_dir.into(),
            tool_name: tool_name.into(),
        }
    }

    #[must_use]
    pub fn release_dir(&self) -> &Path {
        &self.release_dir
    }

    #[must_use]
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Top-level directory name inside the archive, e.g. `anwork-2`.
    #[must_use]
    pub fn package_name(&self, version: u32) -> String {
        format!("{}-{version}", self.tool_name)
    }

    /// Path of the release archive for `version`.
    #[must_use]
    pub fn archive_path(&self, version: u32) -> PathBuf {
        self.release_dir
            .join(format!("v{version}"))
            .join(format!("{}.zip", self.package_name(version)))
    }

    /// Path of the binary relative to the extraction root.
    #[must_use]
    pub fn binary_relative_path(&self, version: u32) -> PathBuf {
        Path::new(&self.package_name(version))
            .join("bin")
            .join(&self.tool_name)
    }

    /// Whether an archive exists for `version`.
    #[must_use]
    pub fn has_release(&self, version: u32) -> bool {
        self.archive_path(version).is_file()
    }

    /// Versions `1..=N` for which archives exist, stopping at the first gap.
    #[must_use]
    pub fn probe_versions(&self) -> Vec<u32> {
        (1..).take_while(|v| self.has_release(*v)).collect()
    }
}
