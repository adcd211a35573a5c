#![cfg(unix)]

mod common;

use std::sync::Arc;
use std::thread;

use anwork_testing::{Anwork, ErrorKind, HarnessError};
use common::FakeRelease;

#[test]
fn every_release_reports_its_version() {
    let _log = common::test_log("every_release_reports_its_version");
    let release = FakeRelease::with_versions(&[1, 2, 3]);
    let materializer = release.materializer();

    for version in release.layout().probe_versions() {
        let mut anwork = Anwork::create(&materializer, version).expect("handle");
        let output = anwork.run(["version"]).expect("version");
        assert_eq!(output, format!("ANWORK Version = {version}\n"));
        anwork.close().expect("close");
    }
}

#[test]
fn closed_handle_refuses_to_run() {
    let _log = common::test_log("closed_handle_refuses_to_run");
    let release = FakeRelease::with_versions(&[2]);
    let materializer = release.materializer();
    let mut anwork = Anwork::create(&materializer, 2).expect("handle");
    anwork.run(["create", "task-a"]).expect("create");
    assert!(anwork.context_path().is_dir(), "the CLI creates its context");

    anwork.close().expect("close");

    assert!(!anwork.context_path().exists());
    let err = anwork.run(["version"]).expect_err("closed");
    assert!(matches!(err, HarnessError::HandleClosed { .. }));
    assert_eq!(err.kind(), ErrorKind::ProcessFailure);
}

#[test]
fn contexts_are_isolated() {
    let _log = common::test_log("contexts_are_isolated");
    let release = FakeRelease::with_versions(&[2]);
    let materializer = release.materializer();
    let first = Anwork::create(&materializer, 2).expect("first");
    let second = Anwork::create(&materializer, 2).expect("second");

    first.run(["create", "only-in-first"]).expect("create");

    assert!(first.run(["show"]).expect("show").contains("only-in-first"));
    assert!(!second.run(["show"]).expect("show").contains("only-in-first"));
    assert_eq!(first.binary_path(), second.binary_path());
    assert_ne!(first.context_path(), second.context_path());
}

#[test]
fn failing_command_keeps_stdout_and_stderr() {
    let _log = common::test_log("failing_command_keeps_stdout_and_stderr");
    let release = FakeRelease::with_versions(&[2]);
    let anwork = Anwork::create(&release.materializer(), 2).expect("handle");

    let err = anwork.run(["fail"]).expect_err("non-zero exit");
    match &err {
        HarnessError::ProcessFailure {
            command,
            status,
            stdout,
            stderr,
        } => {
            assert_eq!(command, &["fail"]);
            assert_eq!(status.code(), Some(3));
            assert_eq!(stdout, "partial output\n");
            assert_eq!(stderr, "something went wrong\n");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.captured_stdout(), Some("partial output\n"));
}

#[test]
fn dropping_a_handle_removes_its_context() {
    let _log = common::test_log("dropping_a_handle_removes_its_context");
    let release = FakeRelease::with_versions(&[2]);
    let materializer = release.materializer();

    let context = {
        let anwork = Anwork::create(&materializer, 2).expect("handle");
        anwork.run(["create", "task-a"]).expect("create");
        anwork.context_path().to_path_buf()
    };

    assert!(!context.exists());
}

#[test]
fn parallel_creation_and_running() {
    let _log = common::test_log("parallel_creation_and_running");
    let release = FakeRelease::with_versions(&[2]);
    let materializer = Arc::new(release.materializer());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let materializer = Arc::clone(&materializer);
            thread::spawn(move || {
                let mut anwork = Anwork::create(&materializer, 2).expect("handle");
                let name = format!("task-{i}");
                anwork.run(["create", name.as_str()]).expect("create");
                let shown = anwork.run(["show"]).expect("show");
                anwork.close().expect("close");
                (name, shown)
            })
        })
        .collect();

    for handle in handles {
        let (name, shown) = handle.join().expect("thread");
        assert!(shown.contains(&name), "{name} missing from:\n{shown}");
        assert_eq!(shown.matches("task-").count(), 1, "contexts leaked:\n{shown}");
    }
    assert_eq!(materializer.extractions(), 1);
}

#[test]
fn handles_created_up_front_run_in_parallel() {
    let _log = common::test_log("handles_created_up_front_run_in_parallel");
    let release = FakeRelease::with_versions(&[2]);
    let materializer = release.materializer();
    let handles: Vec<Anwork> = (0..4)
        .map(|_| Anwork::create(&materializer, 2).expect("handle"))
        .collect();

    thread::scope(|scope| {
        for anwork in &handles {
            scope.spawn(move || {
                let output = anwork.run(["version"]).expect("version");
                assert!(!output.is_empty());
            });
        }
    });
}
