//! Cases for version 2 and later.

use std::thread;
use std::time::Duration;

use super::Case;
use crate::anwork::Anwork;
use crate::expect::{Expectation, ExpectationFailure, run_all};

const TASK_A: &str = "task-a";
const TASK_A_NOTE_0: &str = "Note a 0";
const TASK_A_NOTE_1: &str = "Note a 1";
const TASK_B: &str = "task-b";
const TASK_B_NOTE_0: &str = "Note b 0";

/// `show` with every section present and nothing in any of them.
const EMPTY_SHOW: &[&str] = &["RUNNING.*", "BLOCKED.*", "WAITING.*", "FINISHED.*"];

pub const CASES: &[Case] = &[
    Case { name: "create", run: create },
    Case { name: "priority", run: priority },
    Case { name: "state", run: state },
    Case { name: "note", run: note },
    Case { name: "delete", run: delete },
    Case { name: "delete_all", run: delete_all },
    Case { name: "reset", run: reset },
    Case { name: "summary", run: summary },
    Case { name: "id_uniqueness", run: id_uniqueness },
];

fn expect<'a>(anwork: &'a Anwork, command: &[&str], patterns: &[&str]) -> Expectation<'a> {
    Expectation::new(anwork, command.iter().copied(), patterns.iter().copied())
}

fn quiet<'a>(anwork: &'a Anwork, command: &[&str]) -> Expectation<'a> {
    Expectation::ignore_output(anwork, command.iter().copied())
}

fn create(anwork: &Anwork) -> Vec<ExpectationFailure> {
    let mut failures = run_all(&[
        quiet(anwork, &["create", TASK_A]),
        quiet(anwork, &["create", TASK_B]),
        expect(
            anwork,
            &["show"],
            &["RUNNING.*", "BLOCKED.*", "WAITING.*", ".*task-a.*", ".*task-b.*", "FINISHED.*"],
        ),
    ]);
    failures.extend(run_all(&[
        expect(anwork, &["show", TASK_A], &["Name: task-a", "ID: 0", "State: WAITING"]),
        expect(anwork, &["show", TASK_B], &["Name: task-b", "ID: 1", "State: WAITING"]),
    ]));
    failures
}

fn priority(anwork: &Anwork) -> Vec<ExpectationFailure> {
    // Lower numbers sort first.
    let mut failures = run_all(&[
        quiet(anwork, &["create", TASK_A]),
        quiet(anwork, &["create", TASK_B]),
        quiet(anwork, &["set-priority", TASK_A, "15"]),
        quiet(anwork, &["set-priority", TASK_B, "5"]),
        expect(
            anwork,
            &["show"],
            &["RUNNING.*", "BLOCKED.*", "WAITING.*", ".*task-b.*", ".*task-a.*", "FINISHED.*"],
        ),
    ]);

    failures.extend(run_all(&[
        quiet(anwork, &["set-priority", TASK_A, "10"]),
        quiet(anwork, &["set-priority", TASK_B, "20"]),
        expect(
            anwork,
            &["show"],
            &["RUNNING.*", "BLOCKED.*", "WAITING.*", ".*task-a.*", ".*task-b.*", "FINISHED.*"],
        ),
    ]));

    // Journals list the newest entry first.
    failures.extend(run_all(&[
        expect(
            anwork,
            &["journal", TASK_A],
            &[
                ".*priority.*task-a.*to 10",
                ".*priority.*task-a.*to 15",
                ".*Created.*task-a.*",
            ],
        ),
        expect(
            anwork,
            &["journal", TASK_B],
            &[
                ".*priority.*task-b.*to 20",
                ".*priority.*task-b.*to 5",
                ".*Created.*task-b.*",
            ],
        ),
        expect(anwork, &["journal"], &[".*"; 6]),
        expect(anwork, &["show", TASK_A], &["Name: task-a", "Priority: 10"]),
        expect(anwork, &["show", TASK_B], &["Name: task-b", "Priority: 20"]),
    ]));
    failures
}

fn state(anwork: &Anwork) -> Vec<ExpectationFailure> {
    let mut failures = run_all(&[
        quiet(anwork, &["create", TASK_A]),
        quiet(anwork, &["create", TASK_B]),
        quiet(anwork, &["set-running", TASK_A]),
        quiet(anwork, &["set-blocked", TASK_B]),
        expect(
            anwork,
            &["show"],
            &["RUNNING.*", ".*task-a.*", "BLOCKED.*", ".*task-b.*", "WAITING.*", "FINISHED.*"],
        ),
    ]);

    failures.extend(run_all(&[
        quiet(anwork, &["set-running", TASK_B]),
        quiet(anwork, &["set-finished", TASK_A]),
        expect(
            anwork,
            &["show"],
            &["RUNNING.*", ".*task-b.*", "BLOCKED.*", "WAITING.*", "FINISHED.*", ".*task-a.*"],
        ),
    ]));

    failures.extend(run_all(&[
        expect(
            anwork,
            &["journal", TASK_A],
            &[
                ".*state.*task-a.*to Finished",
                ".*state.*task-a.*to Running",
                ".*Created.*task-a.*",
            ],
        ),
        expect(
            anwork,
            &["journal", TASK_B],
            &[
                ".*state.*task-b.*to Running",
                ".*state.*task-b.*to Blocked",
                ".*Created.*task-b.*",
            ],
        ),
        expect(anwork, &["journal"], &[".*"; 6]),
        expect(anwork, &["show", TASK_A], &["Name: task-a", "State: FINISHED"]),
        expect(anwork, &["show", TASK_B], &["Name: task-b", "State: RUNNING"]),
    ]));
    failures
}

fn note(anwork: &Anwork) -> Vec<ExpectationFailure> {
    let mut failures = run_all(&[
        quiet(anwork, &["create", TASK_A]),
        quiet(anwork, &["create", TASK_B]),
        quiet(anwork, &["note", TASK_A, TASK_A_NOTE_0]),
        expect(anwork, &["journal", TASK_A], &[".*Note a 0.*", ".*Created.*task-a.*"]),
    ]);

    failures.extend(run_all(&[
        quiet(anwork, &["note", TASK_B, TASK_B_NOTE_0]),
        expect(anwork, &["journal", TASK_A], &[".*Note a 0.*", ".*Created.*task-a.*"]),
        expect(anwork, &["journal", TASK_B], &[".*Note b 0.*", ".*Created.*task-b.*"]),
    ]));

    failures.extend(run_all(&[
        quiet(anwork, &["note", TASK_A, TASK_A_NOTE_1]),
        expect(
            anwork,
            &["journal", TASK_A],
            &[".*Note a 1.*", ".*Note a 0.*", ".*Created.*task-a.*"],
        ),
        expect(anwork, &["journal", TASK_B], &[".*Note b 0.*", ".*Created.*task-b.*"]),
        expect(anwork, &["journal"], &[".*"; 5]),
    ]));
    failures
}

fn delete(anwork: &Anwork) -> Vec<ExpectationFailure> {
    let mut failures = run_all(&[
        quiet(anwork, &["create", TASK_A]),
        quiet(anwork, &["create", TASK_B]),
        quiet(anwork, &["delete", TASK_A]),
        expect(
            anwork,
            &["journal"],
            &[".*Deleted.*task-a.*", ".*Created.*task-b.*", ".*Created.*task-a.*"],
        ),
        expect(
            anwork,
            &["show"],
            &["RUNNING.*", "BLOCKED.*", "WAITING.*", ".*task-b.*", "FINISHED.*"],
        ),
    ]);

    failures.extend(run_all(&[
        quiet(anwork, &["delete", TASK_B]),
        expect(
            anwork,
            &["journal"],
            &[
                ".*Deleted.*task-b.*",
                ".*Deleted.*task-a.*",
                ".*Created.*task-b.*",
                ".*Created.*task-a.*",
            ],
        ),
        expect(anwork, &["show"], EMPTY_SHOW),
    ]));
    failures
}

fn delete_all(anwork: &Anwork) -> Vec<ExpectationFailure> {
    let mut failures = run_all(&[
        quiet(anwork, &["create", TASK_A]),
        quiet(anwork, &["create", TASK_B]),
        quiet(anwork, &["delete", TASK_A]),
        expect(
            anwork,
            &["journal"],
            &[".*Deleted.*task-a.*", ".*Created.*task-b.*", ".*Created.*task-a.*"],
        ),
    ]);

    failures.extend(run_all(&[
        quiet(anwork, &["delete-all"]),
        expect(
            anwork,
            &["journal"],
            &[".*Deleted.*", ".*Deleted.*", ".*Created.*", ".*Created.*"],
        ),
        expect(anwork, &["show"], EMPTY_SHOW),
    ]));
    failures
}

fn reset(anwork: &Anwork) -> Vec<ExpectationFailure> {
    let mut failures = run_all(&[
        quiet(anwork, &["create", TASK_A]),
        quiet(anwork, &["create", TASK_B]),
    ]);
    failures.extend(run_all(&[
        quiet(anwork, &["reset", "y"]),
        quiet(anwork, &["journal"]),
        expect(anwork, &["show"], EMPTY_SHOW),
    ]));
    failures
}

fn summary(anwork: &Anwork) -> Vec<ExpectationFailure> {
    let mut failures = run_all(&[
        quiet(anwork, &["create", TASK_A]),
        quiet(anwork, &["create", TASK_B]),
    ]);

    // The summary reports whole seconds between creation and finish.
    thread::sleep(Duration::from_secs(1));

    failures.extend(run_all(&[
        quiet(anwork, &["set-finished", TASK_A]),
        expect(anwork, &["summary", "1"], &[r"\[.*\]:.*task-a.*", r"  took \ds"]),
    ]));
    failures
}

fn id_uniqueness(anwork: &Anwork) -> Vec<ExpectationFailure> {
    // IDs are never reused after a delete.
    let mut failures = run_all(&[
        quiet(anwork, &["create", TASK_A]),
        expect(anwork, &["show", TASK_A], &["ID: 0"]),
    ]);
    failures.extend(run_all(&[quiet(anwork, &["delete", TASK_A])]));
    failures.extend(run_all(&[
        quiet(anwork, &["create", TASK_B]),
        expect(anwork, &["show", TASK_B], &["ID: 1"]),
    ]));
    failures
}
