//! Check command implementation.

use crate::archive::Materializer;
use crate::cli::CheckArgs;
use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::suite::{self, CaseStatus, SuiteReport};
use crate::util::{case_bar, should_show_progress};

use super::print_json;

/// Execute the check command.
///
/// # Errors
///
/// Returns an error if the suite cannot start, or `SuiteFailed` once the
/// report is printed if any case did not pass.
pub fn execute(args: &CheckArgs, config: &HarnessConfig, json: bool) -> Result<()> {
    let version = args.version.resolve()?;
    let materializer = Materializer::from_config(config);

    let total = args
        .case
        .as_ref()
        .map_or_else(|| suite::for_version(version).len(), |_| 1);
    let bar = case_bar(total, version, !json && should_show_progress());
    let report = suite::run_suite_with(&materializer, version, args.case.as_deref(), |outcome| {
        bar.set_message(outcome.name);
        bar.inc(1);
    });
    bar.finish_and_clear();
    let report = report?;

    if json {
        print_json(&report)?;
    } else {
        print_human(&report);
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(HarnessError::SuiteFailed {
            version,
            failed: report.cases.len() - report.passed_count(),
            total: report.cases.len(),
        })
    }
}

fn print_human(report: &SuiteReport) {
    for case in &report.cases {
        match &case.status {
            CaseStatus::Passed => println!("ok      {} ({:.0} ms)", case.name, case.duration_ms),
            CaseStatus::Failed { failures } => {
                println!("FAILED  {}", case.name);
                for failure in failures {
                    println!("        {failure}");
                }
            }
            CaseStatus::Error { kind, message } => {
                println!("ERROR   {} [{kind}]: {message}", case.name);
            }
        }
    }
    println!(
        "\nversion {}: {}/{} cases passed",
        report.version,
        report.passed_count(),
        report.cases.len()
    );
}
