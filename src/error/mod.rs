//! Error types and handling for `anwork_testing`.
//!
//! Every harness operation returns [`Result`]. Variants are grouped by the
//! stage that produces them; [`HarnessError::kind`] collapses them onto the
//! small, stable [`ErrorKind`] taxonomy that callers and the CLI match on.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Keeps captured process output on failures so test logs show what the
//!   target CLI printed
//! - Supports `anyhow` integration through [`HarnessError::Other`]

mod kind;

pub use kind::ErrorKind;

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Primary error type for harness operations.
#[derive(Error, Debug)]
pub enum HarnessError {
    // === Materialization Errors ===
    /// No release archive exists for the requested version.
    #[error("Release archive for version {version} not found at '{path}'")]
    ArchiveNotFound { version: u32, path: PathBuf },

    /// The archive was extracted but the binary is not where the layout says.
    #[error("Cannot find binary for version {version} at '{path}'")]
    BinaryNotFound { version: u32, path: PathBuf },

    /// The archive cannot be opened or one of its entries cannot be read.
    #[error("Release archive '{path}' is unreadable: {reason}")]
    ArchiveCorrupt { path: PathBuf, reason: String },

    /// An archive entry would be written outside the extraction root.
    #[error("Archive entry '{entry}' escapes the extraction directory")]
    UnsafeEntry { entry: String },

    /// The extraction destination already exists and could not be replaced.
    #[error("Extraction destination '{path}' already exists")]
    DestinationCollision { path: PathBuf },

    // === Handle Errors ===
    /// The randomly chosen context directory is already taken.
    #[error("Context directory '{path}' already exists")]
    ContextCollision { path: PathBuf },

    /// The handle was closed and can no longer run commands.
    #[error("Anwork handle is closed (context '{context}')")]
    HandleClosed { context: PathBuf },

    /// The child process could not be started.
    #[error("Failed to launch '{binary}': {source}")]
    ProcessLaunch {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The child process exited unsuccessfully.
    #[error("Command {command:?} failed ({status})")]
    ProcessFailure {
        command: Vec<String>,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },

    // === Expectation Errors ===
    /// The expectation has no usable handle.
    #[error("Invalid expectation: {reason}")]
    InvalidExpectation { reason: String },

    /// A pattern is not a valid regular expression.
    #[error("Invalid pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// One or more acceptance cases did not pass.
    #[error("{failed} of {total} cases failed for version {version}")]
    SuiteFailed {
        version: u32,
        failed: usize,
        total: usize,
    },

    // === Configuration Errors ===
    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No usable version selector was supplied.
    #[error("An anwork version must be selected (got {value:?})")]
    MissingVersion { value: Option<String> },

    // === I/O Errors ===
    /// A filesystem operation on a known path failed.
    #[error("Filesystem error at '{path}': {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HarnessError {
    /// Collapse this error onto the stable kind taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ArchiveNotFound { .. } | Self::BinaryNotFound { .. } => ErrorKind::NotFound,
            Self::ArchiveCorrupt { .. } | Self::UnsafeEntry { .. } => ErrorKind::Corrupt,
            Self::DestinationCollision { .. } | Self::ContextCollision { .. } => {
                ErrorKind::Collision
            }
            Self::HandleClosed { .. }
            | Self::ProcessLaunch { .. }
            | Self::ProcessFailure { .. }
            | Self::SuiteFailed { .. } => ErrorKind::ProcessFailure,
            Self::InvalidExpectation { .. } => ErrorKind::InvalidExpectation,
            Self::Regex { .. } => ErrorKind::Regex,
            Self::Config(_) | Self::MissingVersion { .. } | Self::Yaml(_) => ErrorKind::Config,
            Self::Filesystem { .. } | Self::Io(_) => ErrorKind::Filesystem,
            Self::Json(_) | Self::Other(_) => ErrorKind::Internal,
        }
    }

    /// True when the error means "this version has no release archive".
    ///
    /// Version probing stops on exactly this condition.
    #[must_use]
    pub const fn is_missing_release(&self) -> bool {
        matches!(self, Self::ArchiveNotFound { .. })
    }

    /// Whatever stdout the failed process produced, if any.
    #[must_use]
    pub fn captured_stdout(&self) -> Option<&str> {
        match self {
            Self::ProcessFailure { stdout, .. } => Some(stdout),
            _ => None,
        }
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ArchiveNotFound { .. } => {
                Some("Check --release-dir or run `anwork-harness versions`")
            }
            Self::MissingVersion { .. } => Some("Pass -v <N> or set ANWORK_VERSION"),
            Self::ContextCollision { .. } => Some("Retry; context names are random"),
            Self::HandleClosed { .. } => Some("Create a new handle instead of reusing a closed one"),
            _ => None,
        }
    }

    /// Wrap an I/O error with the path it happened on.
    #[must_use]
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Build an archive-corruption error.
    #[must_use]
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::ArchiveCorrupt {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type using `HarnessError`.
pub type Result<T> = std::result::Result<T, HarnessError>;
