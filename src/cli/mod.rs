//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::bench::BenchWorkload;
use crate::config::{self, CliOverrides};
use crate::error::Result;

pub mod commands;

/// Materialize, run, and check anwork release archives
#[derive(Parser, Debug)]
#[command(name = "anwork-harness", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding v<N>/<tool>-<N>.zip archives
    #[arg(long, global = true)]
    pub release_dir: Option<PathBuf>,

    /// Scratch root for extracted releases and contexts
    #[arg(long, global = true)]
    pub work_dir: Option<PathBuf>,

    /// Name of the tool inside each archive
    #[arg(long, global = true)]
    pub tool_name: Option<String>,

    /// Config file (defaults to ./anwork-harness.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Increase logging verbosity (--verbose, --verbose --verbose)
    #[arg(long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            release_dir: self.release_dir.clone(),
            work_dir: self.work_dir.clone(),
            tool_name: self.tool_name.clone(),
            config: self.config.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List release versions found in the release directory
    Versions,

    /// Extract a release and print its binary path
    Materialize(VersionArg),

    /// Run one command in a fresh context and print its stdout
    Exec(ExecArgs),

    /// Run the acceptance suite for a release
    Check(CheckArgs),

    /// Time a built-in workload against a release
    Bench(BenchArgs),
}

/// Release version selector shared by every per-release command.
#[derive(Args, Debug, Clone, Default)]
pub struct VersionArg {
    /// Release version (positive integer)
    #[arg(short = 'v', long = "anwork-version", env = config::VERSION_ENV)]
    pub anwork_version: Option<String>,
}

impl VersionArg {
    /// Parse the selector; a missing or malformed value aborts the command.
    ///
    /// # Errors
    ///
    /// Returns `MissingVersion` when no usable version was given.
    pub fn resolve(&self) -> Result<u32> {
        config::parse_version_selector(self.anwork_version.as_deref())
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExecArgs {
    #[command(flatten)]
    pub version: VersionArg,

    /// Arguments passed to the tool after `-o <context>`
    #[arg(last = true, required = true)]
    pub args: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub version: VersionArg,

    /// Run only the named case
    #[arg(long)]
    pub case: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct BenchArgs {
    #[command(flatten)]
    pub version: VersionArg,

    /// Number of iterations
    #[arg(long, default_value_t = 5)]
    pub iterations: usize,

    /// Workload run on each iteration
    #[arg(long, value_enum, default_value_t = BenchWorkload::Create)]
    pub workload: BenchWorkload,
}
