//! Acceptance suites for each API generation of the target CLI.
//!
//! Version 1 namespaces commands under `task` and `journal`. Version 2 and
//! later use flat commands and print per-task details. Every case gets its own
//! handle, and all selected cases run concurrently against a shared
//! [`Materializer`].

mod v1;
mod v2;

use std::fmt;
use std::thread;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::anwork::Anwork;
use crate::archive::Materializer;
use crate::error::{ErrorKind, HarnessError, Result};
use crate::expect::ExpectationFailure;

/// Body of one acceptance case.
pub type CaseFn = fn(&Anwork) -> Vec<ExpectationFailure>;

/// A named acceptance case.
#[derive(Clone, Copy)]
pub struct Case {
    pub name: &'static str,
    pub run: CaseFn,
}

impl fmt::Debug for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Cases for the API generation `version` belongs to.
#[must_use]
pub fn for_version(version: u32) -> &'static [Case] {
    if version == 1 { v1::CASES } else { v2::CASES }
}

/// How a case ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    Failed { failures: Vec<String> },
    /// The case could not run, or its handle could not be cleaned up.
    Error { kind: ErrorKind, message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub name: &'static str,
    #[serde(flatten)]
    pub status: CaseStatus,
    pub duration_ms: f64,
}

impl CaseOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }
}

/// Outcomes of one suite run, in case order.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub version: u32,
    pub started_at: DateTime<Utc>,
    pub cases: Vec<CaseOutcome>,
}

impl SuiteReport {
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.cases.iter().all(CaseOutcome::passed)
    }
}

/// Run the suite for `version`, optionally limited to the case named `only`.
///
/// # Errors
///
/// Fails before running any case if the release cannot be materialized or
/// `only` names no case of this suite. Case failures are reported in the
/// returned [`SuiteReport`].
pub fn run_suite(materializer: &Materializer, version: u32, only: Option<&str>) -> Result<SuiteReport> {
    run_suite_with(materializer, version, only, |_| {})
}

/// Like [`run_suite`], calling `on_finish` as each case completes.
///
/// # Errors
///
/// See [`run_suite`].
pub fn run_suite_with<F>(
    materializer: &Materializer,
    version: u32,
    only: Option<&str>,
    on_finish: F,
) -> Result<SuiteReport>
where
    F: Fn(&CaseOutcome) + Sync,
{
    let cases = select(version, only)?;
    // Surface missing or broken releases once instead of once per case.
    materializer.materialize(version)?;

    let started_at = Utc::now();
    info!(version, cases = cases.len(), "running acceptance suite");

    let outcomes = thread::scope(|scope| {
        let handles: Vec<_> = cases
            .iter()
            .map(|case| {
                let on_finish = &on_finish;
                let handle = scope.spawn(move || {
                    let outcome = run_case(materializer, version, case);
                    on_finish(&outcome);
                    outcome
                });
                (case.name, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(name, handle)| {
                handle.join().unwrap_or_else(|_| CaseOutcome {
                    name,
                    status: CaseStatus::Error {
                        kind: ErrorKind::Internal,
                        message: "case panicked".to_string(),
                    },
                    duration_ms: 0.0,
                })
            })
            .collect()
    });

    Ok(SuiteReport {
        version,
        started_at,
        cases: outcomes,
    })
}

fn select(version: u32, only: Option<&str>) -> Result<Vec<Case>> {
    let cases = for_version(version);
    let Some(name) = only else {
        return Ok(cases.to_vec());
    };

    let selected: Vec<Case> = cases.iter().filter(|c| c.name == name).copied().collect();
    if selected.is_empty() {
        let known: Vec<&str> = cases.iter().map(|c| c.name).collect();
        return Err(HarnessError::Config(format!(
            "no case named '{name}' for version {version} (cases: {})",
            known.join(", ")
        )));
    }
    Ok(selected)
}

fn run_case(materializer: &Materializer, version: u32, case: &Case) -> CaseOutcome {
    let start = Instant::now();
    let status = match Anwork::create(materializer, version) {
        Ok(mut anwork) => {
            let failures = (case.run)(&anwork);
            match anwork.close() {
                Err(e) if failures.is_empty() => error_status(&e),
                _ if failures.is_empty() => CaseStatus::Passed,
                _ => CaseStatus::Failed {
                    failures: failures.iter().map(ToString::to_string).collect(),
                },
            }
        }
        Err(e) => error_status(&e),
    };

    match &status {
        CaseStatus::Passed => info!(case = case.name, "case passed"),
        _ => warn!(case = case.name, ?status, "case did not pass"),
    }
    CaseOutcome {
        name: case.name,
        status,
        duration_ms: start.elapsed().as_secs_f64() * 1000.0,
    }
}

fn error_status(e: &HarnessError) -> CaseStatus {
    CaseStatus::Error {
        kind: e.kind(),
        message: e.to_string(),
    }
}
