use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::time::{Duration, Instant};

use super::fixtures::FakeRelease;

#[derive(Debug)]
pub struct HarnessRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
}

impl HarnessRun {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// `anwork-harness` pointed at `release`, with no inherited `ANWORK_*`
/// settings.
pub fn harness_command(release: &FakeRelease) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("anwork-harness"));
    cmd.current_dir(release.temp.path());
    for var in [
        "ANWORK_VERSION",
        "ANWORK_RELEASE_DIR",
        "ANWORK_WORK_DIR",
        "ANWORK_TOOL_NAME",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("ANWORK_RELEASE_DIR", &release.release_dir);
    cmd.env("ANWORK_WORK_DIR", &release.work_dir);
    cmd.env("RUST_LOG", "anwork_testing=debug");
    cmd
}

/// Run `anwork-harness` against `release` with a clean environment.
pub fn run_harness<I, S>(release: &FakeRelease, args: I, label: &str) -> HarnessRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_harness_with_env(release, args, std::iter::empty::<(String, String)>(), label)
}

pub fn run_harness_with_env<I, S, E, K, V>(
    release: &FakeRelease,
    args: I,
    env_vars: E,
    label: &str,
) -> HarnessRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = harness_command(release);
    cmd.args(args);
    cmd.envs(env_vars);

    let start = Instant::now();
    let output = cmd.output().expect("run anwork-harness");
    let duration = start.elapsed();

    let run = HarnessRun {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status,
        duration,
    };

    let log_dir = release.temp.path().join("logs");
    fs::create_dir_all(&log_dir).expect("log dir");
    fs::write(
        log_dir.join(format!("{label}.log")),
        format!(
            "label: {label}\nduration: {:?}\nstatus: {}\n\nstdout:\n{}\n\nstderr:\n{}\n",
            run.duration, run.status, run.stdout, run.stderr
        ),
    )
    .expect("write log");
    run
}
