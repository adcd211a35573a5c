//! Release archive materialization.
//!
//! A [`Materializer`] turns a version number into a runnable binary:
//!
//! 1. resolve `<release_dir>/v<N>/<tool>-<N>.zip` ([`ReleaseLayout`])
//! 2. fingerprint the archive bytes (SHA-256)
//! 3. extract into `<cache_dir>/<tool>-<N>-<fingerprint>` unless that
//!    directory already exists
//! 4. locate `<tool>-<N>/bin/<tool>` and mark it executable
//!
//! The check-then-extract step runs under one lock per materializer, so any
//! number of threads may ask for the same version and at most one of them
//! extracts. Calls for different versions also serialize on that lock; the
//! work done while holding it is a directory check except for the first call
//! per fingerprint.
//!
//! Extracted trees are never deleted by the harness. They are keyed by
//! content, so a later run (or another process) reuses them.

mod extract;
pub mod fingerprint;
mod layout;

pub use extract::{Install, extract_into, install_archive, open_archive};
pub use layout::ReleaseLayout;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};

/// A release that is ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub version: u32,
    pub fingerprint: String,
    /// Extraction root shared by every handle for this archive.
    pub root: PathBuf,
    pub binary: PathBuf,
}

/// Extracts release archives at most once per content fingerprint.
#[derive(Debug)]
pub struct Materializer {
    layout: ReleaseLayout,
    cache_dir: PathBuf,
    context_dir: PathBuf,
    extracted: Mutex<HashMap<String, PathBuf>>,
    extractions: AtomicUsize,
}

impl Materializer {
    /// Contexts for handles default to a `contexts` directory next to
    /// `cache_dir`.
    #[must_use]
    pub fn new(layout: ReleaseLayout, cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        Self {
            layout,
            context_dir: cache_dir.with_file_name("contexts"),
            cache_dir,
            extracted: Mutex::new(HashMap::new()),
            extractions: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(
            ReleaseLayout::new(&config.release_dir, &config.tool_name),
            &config.cache_dir,
        )
        .with_context_dir(&config.context_dir)
    }

    /// Parent directory for the context directories of handles.
    #[must_use]
    pub fn with_context_dir(mut self, context_dir: impl Into<PathBuf>) -> Self {
        self.context_dir = context_dir.into();
        self
    }

    #[must_use]
    pub const fn layout(&self) -> &ReleaseLayout {
        &self.layout
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    #[must_use]
    pub fn context_dir(&self) -> &Path {
        &self.context_dir
    }

    /// Number of extraction passes this materializer has performed.
    #[must_use]
    pub fn extractions(&self) -> usize {
        self.extractions.load(Ordering::SeqCst)
    }

    /// Extraction directory for an archive with the given fingerprint.
    #[must_use]
    pub fn destination_for(&self, version: u32, fingerprint: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}-{fingerprint}", self.layout.package_name(version)))
    }

    /// Materialize `version` and return the path of its binary.
    ///
    /// # Errors
    ///
    /// See [`Materializer::materialize`].
    pub fn binary_path(&self, version: u32) -> Result<PathBuf> {
        self.materialize(version).map(|m| m.binary)
    }

    /// Make the binary for `version` available on disk.
    ///
    /// # Errors
    ///
    /// - `ArchiveNotFound` if no archive exists for `version`
    /// - `ArchiveCorrupt` / `UnsafeEntry` if the archive cannot be unpacked
    /// - `BinaryNotFound` if the archive lacks `<tool>-<N>/bin/<tool>`
    /// - `Filesystem` for create, rename, or permission failures
    pub fn materialize(&self, version: u32) -> Result<Materialized> {
        let archive_path = self.layout.archive_path(version);
        if !archive_path.is_file() {
            return Err(HarnessError::ArchiveNotFound {
                version,
                path: archive_path,
            });
        }

        let fingerprint = fingerprint::file_fingerprint(&archive_path)?;
        let mut archive = open_archive(&archive_path)?;
        let root = self.destination_for(version, &fingerprint);

        {
            let mut extracted = self
                .extracted
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if extracted.contains_key(&fingerprint) || root.is_dir() {
                debug!(version, path = %root.display(), "release already extracted");
            } else {
                match install_archive(&mut archive, &archive_path, &root)? {
                    Install::Extracted { entries } => {
                        self.extractions.fetch_add(1, Ordering::SeqCst);
                        info!(version, entries, path = %root.display(), "extracted release");
                    }
                    Install::Raced => {
                        debug!(version, path = %root.display(), "release extracted elsewhere");
                    }
                }
            }
            extracted.insert(fingerprint.clone(), root.clone());
        }

        let binary = root.join(self.layout.binary_relative_path(version));
        if !binary.is_file() {
            return Err(HarnessError::BinaryNotFound {
                version,
                path: binary,
            });
        }
        make_executable(&binary)?;

        Ok(Materialized {
            version,
            fingerprint,
            root,
            binary,
        })
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|e| HarnessError::filesystem(path, e))
}

#[cfg(not(unix))]
fn make_executable(path: &Path) -> Result<()> {
    fs::metadata(path)
        .map(|_| ())
        .map_err(|e| HarnessError::filesystem(path, e))
}
