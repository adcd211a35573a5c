//! Runnable instances of a materialized release.
//!
//! An [`Anwork`] pairs a shared, extracted binary with a private context
//! directory. Every command runs as `<binary> -o <context> <args...>`, so
//! handles never see each other's tasks even when they run the same version
//! concurrently.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::archive::Materializer;
use crate::error::{HarnessError, Result};

/// Option that points the target CLI at its state directory.
const CONTEXT_FLAG: &str = "-o";
/// Prefix of generated context directory names.
const CONTEXT_PREFIX: &str = "tmp_";
/// Spawn attempts when the binary is busy; see [`Anwork::spawn`].
const SPAWN_ATTEMPTS: u32 = 5;
/// `ETXTBSY` on Linux and the BSDs.
#[cfg(unix)]
const ETXTBSY: i32 = 26;

/// One isolated instance of the target CLI.
#[derive(Debug)]
pub struct Anwork {
    version: u32,
    context_path: PathBuf,
    /// Cleared by [`Anwork::close`]; a handle without a binary is inert.
    binary_path: Option<PathBuf>,
}

impl Anwork {
    /// Materialize `version` and pair it with a fresh context directory.
    ///
    /// # Errors
    ///
    /// Propagates materialization errors, and returns `ContextCollision` if the
    /// randomly chosen context directory already exists.
    pub fn create(materializer: &Materializer, version: u32) -> Result<Self> {
        let binary = materializer.binary_path(version)?;
        Self::with_binary(version, binary, materializer.context_dir())
    }

    /// Same as [`Anwork::create`].
    ///
    /// # Errors
    ///
    /// See [`Anwork::create`].
    pub fn new(materializer: &Materializer, version: u32) -> Result<Self> {
        Self::create(materializer, version)
    }

    /// Build a handle for an already-located binary.
    ///
    /// The context directory is only named here; the target CLI creates it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns `ContextCollision` if the generated path is taken, or
    /// `Filesystem` if `context_root` cannot be created.
    pub fn with_binary(version: u32, binary: PathBuf, context_root: &Path) -> Result<Self> {
        fs::create_dir_all(context_root).map_err(|e| HarnessError::filesystem(context_root, e))?;
        let context_path = context_root.join(format!("{CONTEXT_PREFIX}{:08x}", rand::random::<u32>()));
        if context_path.exists() {
            return Err(HarnessError::ContextCollision { path: context_path });
        }

        debug!(version, context = %context_path.display(), "created anwork handle");
        Ok(Self {
            version,
            context_path,
            binary_path: Some(binary),
        })
    }

    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn context_path(&self) -> &Path {
        &self.context_path
    }

    /// The binary this handle runs, or `None` once closed.
    #[must_use]
    pub fn binary_path(&self) -> Option<&Path> {
        self.binary_path.as_deref()
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.binary_path.is_none()
    }

    /// Run one command and return its stdout.
    ///
    /// Blocks until the child exits. There is no timeout.
    ///
    /// # Errors
    ///
    /// - `HandleClosed` after [`Anwork::close`]
    /// - `ProcessLaunch` if the binary cannot be started
    /// - `ProcessFailure` on a non-zero exit, carrying stdout and stderr
    pub fn run<I, S>(&self, command: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let binary = self.binary_path.as_ref().ok_or_else(|| HarnessError::HandleClosed {
            context: self.context_path.clone(),
        })?;
        let command: Vec<String> = command.into_iter().map(|s| s.as_ref().to_string()).collect();

        debug!(version = self.version, ?command, "running anwork");
        let output = self.spawn(binary, &command)?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            return Err(HarnessError::ProcessFailure {
                command,
                status: output.status,
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(stdout)
    }

    /// Start the child and wait for it.
    ///
    /// Only an `ETXTBSY` failure to start is retried. Once a child has
    /// started, its outcome is returned as is and it is never run again.
    fn spawn(&self, binary: &Path, command: &[String]) -> Result<Output> {
        let mut attempt = 1;
        loop {
            let result = Command::new(binary)
                .arg(CONTEXT_FLAG)
                .arg(&self.context_path)
                .args(command)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output();
            match result {
                Ok(output) => return Ok(output),
                // A freshly extracted binary may still be open for writing in
                // a child forked by another thread.
                Err(e) if is_text_busy(&e) && attempt < SPAWN_ATTEMPTS => {
                    debug!(attempt, binary = %binary.display(), "binary busy, retrying");
                    attempt += 1;
                    thread::sleep(Duration::from_millis(20));
                }
                Err(source) => {
                    return Err(HarnessError::ProcessLaunch {
                        binary: binary.to_path_buf(),
                        source,
                    });
                }
            }
        }
    }

    /// Delete the context directory and make the handle inert.
    ///
    /// The handle is inert even when removal fails. Calling `close` twice is
    /// harmless.
    ///
    /// # Errors
    ///
    /// Returns `Filesystem` if the context directory exists but cannot be
    /// removed.
    pub fn close(&mut self) -> Result<()> {
        self.binary_path = None;
        remove_context(&self.context_path)
    }
}

impl Drop for Anwork {
    fn drop(&mut self) {
        if self.is_closed() {
            return;
        }
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to clean up anwork context");
        }
    }
}

impl std::fmt::Display for Anwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.binary_path {
            Some(binary) => write!(
                f,
                "anwork v{} ({} -o {})",
                self.version,
                binary.display(),
                self.context_path.display()
            ),
            None => write!(f, "anwork v{} (closed)", self.version),
        }
    }
}

#[cfg(unix)]
fn is_text_busy(e: &io::Error) -> bool {
    e.raw_os_error() == Some(ETXTBSY)
}

#[cfg(not(unix))]
fn is_text_busy(_e: &io::Error) -> bool {
    false
}

fn remove_context(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(HarnessError::filesystem(path, e)),
    }
}
