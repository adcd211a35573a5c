//! Timing harness for repeated commands against one handle.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::info;

use crate::anwork::Anwork;
use crate::archive::Materializer;
use crate::error::Result;

/// Timings collected by [`run_benchmark`].
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub version: u32,
    pub iterations: usize,
    pub started_at: DateTime<Utc>,
    /// Wall time of the iteration loop; handle setup is excluded.
    pub total: Duration,
    pub samples: Vec<Duration>,
}

impl BenchReport {
    #[must_use]
    pub fn mean(&self) -> Duration {
        match u32::try_from(self.samples.len()).unwrap_or(u32::MAX) {
            0 => Duration::ZERO,
            n => self.total / n,
        }
    }

    #[must_use]
    pub fn min(&self) -> Duration {
        self.samples.iter().min().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn max(&self) -> Duration {
        self.samples.iter().max().copied().unwrap_or_default()
    }
}

impl Serialize for BenchReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let millis = |d: Duration| d.as_secs_f64() * 1000.0;
        let mut state = serializer.serialize_struct("BenchReport", 7)?;
        state.serialize_field("version", &self.version)?;
        state.serialize_field("iterations", &self.iterations)?;
        state.serialize_field("started_at", &self.started_at.to_rfc3339())?;
        state.serialize_field("total_ms", &millis(self.total))?;
        state.serialize_field("mean_ms", &millis(self.mean()))?;
        state.serialize_field("min_ms", &millis(self.min()))?;
        state.serialize_field("max_ms", &millis(self.max()))?;
        state.end()
    }
}

/// Run `body` `iterations` times on one fresh handle for `version`.
///
/// Timing starts after the handle exists, so materialization is not
/// measured. The handle is closed before returning.
///
/// # Errors
///
/// Setup errors, the first error returned by `body`, or a failure to remove
/// the context directory.
pub fn run_benchmark<F>(
    materializer: &Materializer,
    version: u32,
    iterations: usize,
    mut body: F,
) -> Result<BenchReport>
where
    F: FnMut(&Anwork, usize) -> Result<()>,
{
    let mut anwork = Anwork::create(materializer, version)?;
    let started_at = Utc::now();
    let mut samples = Vec::with_capacity(iterations);

    let start = Instant::now();
    for i in 0..iterations {
        let iteration = Instant::now();
        body(&anwork, i)?;
        samples.push(iteration.elapsed());
    }
    let total = start.elapsed();
    anwork.close()?;

    info!(version, iterations, ?total, "benchmark finished");
    Ok(BenchReport {
        version,
        iterations,
        started_at,
        total,
        samples,
    })
}

/// Built-in benchmark bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BenchWorkload {
    /// Create one task per iteration.
    Create,
    /// Create, show, finish and delete one task per iteration.
    Crud,
}

impl BenchWorkload {
    /// Commands issued for iteration `i`, in the syntax of `version`.
    #[must_use]
    pub fn commands(self, version: u32, i: usize) -> Vec<Vec<String>> {
        let name = format!("task-{i}");
        let steps: Vec<Vec<&str>> = match self {
            Self::Create => vec![vec!["create", name.as_str()]],
            Self::Crud => vec![
                vec!["create", name.as_str()],
                vec!["show"],
                vec!["set-finished", name.as_str()],
                vec!["delete", name.as_str()],
            ],
        };

        steps
            .into_iter()
            .map(|step| {
                // Version 1 namespaced task commands under `task`.
                let prefix = (version == 1).then_some("task");
                prefix
                    .into_iter()
                    .chain(step)
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }

    /// Run one iteration on `anwork`.
    ///
    /// # Errors
    ///
    /// The first failing command.
    pub fn run(self, anwork: &Anwork, i: usize) -> Result<()> {
        for command in self.commands(anwork.version(), i) {
            anwork.run(&command)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(samples_ms: &[u64]) -> BenchReport {
        let samples: Vec<Duration> = samples_ms.iter().map(|ms| Duration::from_millis(*ms)).collect();
        BenchReport {
            version: 2,
            iterations: samples.len(),
            started_at: Utc::now(),
            total: samples.iter().sum(),
            samples,
        }
    }

    #[test]
    fn test_report_statistics() {
        let report = report(&[10, 30, 20]);
        assert_eq!(report.mean(), Duration::from_millis(20));
        assert_eq!(report.min(), Duration::from_millis(10));
        assert_eq!(report.max(), Duration::from_millis(30));
    }

    #[test]
    fn test_empty_report_is_zero() {
        let report = report(&[]);
        assert_eq!(report.mean(), Duration::ZERO);
        assert_eq!(report.min(), Duration::ZERO);
        assert_eq!(report.max(), Duration::ZERO);
    }

    #[test]
    fn test_report_serializes_millis() {
        let json = serde_json::to_value(report(&[5, 15])).expect("serialize");
        assert_eq!(json["iterations"], 2);
        assert_eq!(json["version"], 2);
        assert!((json["mean_ms"].as_f64().expect("number") - 10.0).abs() < 1e-6);
        assert!((json["max_ms"].as_f64().expect("number") - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_v1_commands_are_namespaced() {
        let commands = BenchWorkload::Crud.commands(1, 3);
        assert_eq!(commands[0], ["task", "create", "task-3"]);
        assert_eq!(commands[1], ["task", "show"]);
        assert_eq!(commands[3], ["task", "delete", "task-3"]);
    }

    #[test]
    fn test_v2_commands_are_flat() {
        assert_eq!(BenchWorkload::Create.commands(2, 0), [["create", "task-0"]]);
        assert_eq!(BenchWorkload::Crud.commands(3, 1)[2], ["set-finished", "task-1"]);
    }
}
