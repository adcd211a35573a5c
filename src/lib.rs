//! Acceptance-test harness for versioned anwork release archives.
//!
//! The harness materializes `anwork` release zips on disk once per content
//! fingerprint, runs each test fixture as an isolated subprocess with its own
//! context directory, and asserts on command output with ordered regular
//! expression matching.
//!
//! ```ignore
//! use anwork_testing::{Anwork, Expectation, Materializer, HarnessConfig, assert_expectations};
//!
//! let materializer = Materializer::from_config(&HarnessConfig::default());
//! let anwork = Anwork::create(&materializer, 2)?;
//! assert_expectations(&[
//!     Expectation::ignore_output(&anwork, ["create", "task-a"]),
//!     Expectation::new(&anwork, ["show"], ["WAITING.*", ".*task-a.*"]),
//! ]);
//! ```

pub mod anwork;
pub mod archive;
pub mod bench;
pub mod cli;
pub mod config;
pub mod error;
pub mod expect;
pub mod logging;
pub mod suite;
pub mod util;

pub use anwork::Anwork;
pub use archive::{Materialized, Materializer, ReleaseLayout};
pub use bench::{BenchReport, BenchWorkload, run_benchmark};
pub use config::HarnessConfig;
pub use error::{ErrorKind, HarnessError, Result};
pub use expect::{Expectation, ExpectationFailure, assert_expectations, run_all};
