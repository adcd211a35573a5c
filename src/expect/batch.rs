//! Running lists of expectations and reporting every failure.

use std::fmt;
use std::panic::Location;
use std::path::Path;

use tracing::error;

use super::{Expectation, split_output_lines};
use crate::anwork::Anwork;
use crate::error::ErrorKind;

/// Why one expectation in a batch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The output ran out before `pattern` matched.
    Unmatched {
        pattern: String,
        matched: Vec<String>,
    },
    /// Running the expectation returned an error.
    Error { kind: ErrorKind, message: String },
    /// A line contained text that must not appear.
    Unexpected { needle: String, line: String },
}

/// One failed expectation, attributed to the test that ran the batch.
#[derive(Debug, Clone)]
pub struct ExpectationFailure {
    pub location: &'static Location<'static>,
    /// Position of the expectation within its batch.
    pub index: usize,
    pub expectation: String,
    pub reason: FailureReason,
}

impl fmt::Display for ExpectationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = Path::new(self.location.file())
            .file_name()
            .map_or_else(|| self.location.file().into(), |n| n.to_string_lossy());
        write!(f, "{file}:{}: ", self.location.line())?;
        match &self.reason {
            FailureReason::Unmatched { pattern, .. } => write!(
                f,
                "did not match regex '{pattern}' when running {}",
                self.expectation
            ),
            FailureReason::Error { message, .. } => {
                write!(f, "got error when running {}: {message}", self.expectation)
            }
            FailureReason::Unexpected { needle, line } => write!(
                f,
                "output of {} contains '{needle}': {line:?}",
                self.expectation
            ),
        }
    }
}

/// Run every expectation in order, collecting failures instead of stopping.
///
/// Failures are attributed to the caller's source location.
#[track_caller]
#[must_use]
pub fn run_all(expectations: &[Expectation<'_>]) -> Vec<ExpectationFailure> {
    let location = Location::caller();
    expectations
        .iter()
        .enumerate()
        .filter_map(|(index, expectation)| check(location, index, expectation))
        .collect()
}

/// Run every expectation, then panic once if any of them failed.
///
/// # Panics
///
/// Panics with every failure message when at least one expectation fails.
#[track_caller]
pub fn assert_expectations(expectations: &[Expectation<'_>]) {
    let failures = run_all(expectations);
    if failures.is_empty() {
        return;
    }
    let report: Vec<String> = failures.iter().map(ToString::to_string).collect();
    panic!(
        "{} of {} expectations failed:\n{}",
        failures.len(),
        expectations.len(),
        report.join("\n")
    );
}

/// Run `command` and fail if any output line contains `needle`.
///
/// Returns `None` when the command succeeds and `needle` is absent.
#[track_caller]
#[must_use]
pub fn expect_absent(anwork: &Anwork, command: &[&str], needle: &str) -> Option<ExpectationFailure> {
    let location = Location::caller();
    let expectation = Expectation::ignore_output(anwork, command.iter().copied());
    let failure = |reason| {
        let failure = ExpectationFailure {
            location,
            index: 0,
            expectation: expectation.to_string(),
            reason,
        };
        error!("{failure}");
        Some(failure)
    };

    let output = match anwork.run(&expectation.command) {
        Ok(output) => output,
        Err(e) => {
            return failure(FailureReason::Error {
                kind: e.kind(),
                message: e.to_string(),
            });
        }
    };
    split_output_lines(&output)
        .into_iter()
        .find(|line| line.contains(needle))
        .and_then(|line| {
            failure(FailureReason::Unexpected {
                needle: needle.to_string(),
                line,
            })
        })
}

fn check(
    location: &'static Location<'static>,
    index: usize,
    expectation: &Expectation<'_>,
) -> Option<ExpectationFailure> {
    let reason = match expectation.run() {
        Ok(matched) if matched.len() == expectation.patterns.len() => return None,
        Ok(matched) => FailureReason::Unmatched {
            pattern: expectation.patterns[matched.len()].clone(),
            matched,
        },
        Err(e) => FailureReason::Error {
            kind: e.kind(),
            message: e.to_string(),
        },
    };

    let failure = ExpectationFailure {
        location,
        index,
        expectation: expectation.to_string(),
        reason,
    };
    error!("{failure}");
    Some(failure)
}
