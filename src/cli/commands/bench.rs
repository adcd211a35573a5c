//! Bench command implementation.

use std::time::Duration;

use super::print_json;
use crate::archive::Materializer;
use crate::bench::run_benchmark;
use crate::cli::BenchArgs;
use crate::config::HarnessConfig;
use crate::error::Result;
use crate::util::{should_show_progress, spinner};

/// Execute the bench command.
///
/// # Errors
///
/// Returns an error if the version is missing, setup fails, or any iteration
/// fails.
pub fn execute(args: &BenchArgs, config: &HarnessConfig, json: bool) -> Result<()> {
    let version = args.version.resolve()?;
    let materializer = Materializer::from_config(config);
    // Extract up front so the spinner only covers the timed loop.
    materializer.materialize(version)?;

    let workload = args.workload;
    let progress = spinner(
        format!("Running {workload:?} x{}", args.iterations),
        !json && should_show_progress(),
    );
    let report = run_benchmark(&materializer, version, args.iterations, |anwork, i| {
        progress.set_message(format!("{workload:?} iteration {}", i + 1));
        workload.run(anwork, i)
    });
    progress.finish_and_clear();
    let report = report?;

    if json {
        return print_json(&report);
    }

    let ms = |d: Duration| d.as_secs_f64() * 1000.0;
    println!("{workload:?} on version {version}: {} iterations", report.iterations);
    println!(
        "  total {:.1} ms, mean {:.1} ms, min {:.1} ms, max {:.1} ms",
        ms(report.total),
        ms(report.mean()),
        ms(report.min()),
        ms(report.max())
    );
    Ok(())
}
