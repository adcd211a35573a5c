//! Cases for version 1, where commands live under `task` and `journal`.

use super::Case;
use crate::anwork::Anwork;
use crate::expect::{Expectation, ExpectationFailure, expect_absent, run_all};

const TASK_A: &str = "task-a";
const TASK_A_DESCRIPTION: &str = "This is the description for task-a";
const TASK_A_PRIORITY: &str = "15";
const TASK_A_NOTE_1: &str = "This is the first note for task-a";
const TASK_A_NOTE_2: &str = "This is the second note for task-a";

const TASK_B: &str = "task-b";
const TASK_B_DESCRIPTION: &str = "This is the description for task-b";
const TASK_B_PRIORITY: &str = "25";
const TASK_B_NOTE_1: &str = "This is the first note for task-b";
const TASK_B_NOTE_2: &str = "This is the second note for task-b";

const TASK_C: &str = "task-c";

pub const CASES: &[Case] = &[
    Case { name: "create", run: create },
    Case { name: "set_state", run: set_state },
    Case { name: "change_priority", run: change_priority },
    Case { name: "note", run: note },
    Case { name: "journal", run: journal },
    Case { name: "delete", run: delete },
    Case { name: "delete_all", run: delete_all },
];

fn expect<'a>(anwork: &'a Anwork, command: &[&str], patterns: &[&str]) -> Expectation<'a> {
    Expectation::new(anwork, command.iter().copied(), patterns.iter().copied())
}

fn quiet<'a>(anwork: &'a Anwork, command: &[&str]) -> Expectation<'a> {
    Expectation::ignore_output(anwork, command.iter().copied())
}

fn create(anwork: &Anwork) -> Vec<ExpectationFailure> {
    run_all(&[
        quiet(
            anwork,
            &["task", "create", TASK_A, "-p", TASK_A_PRIORITY, "--description", TASK_A_DESCRIPTION],
        ),
        quiet(
            anwork,
            &["task", "create", TASK_B, "-p", TASK_B_PRIORITY, "--description", TASK_B_DESCRIPTION],
        ),
        // Descriptions are not printed by `task show`.
        expect(
            anwork,
            &["task", "show"],
            &[
                "RUNNING.*",
                "BLOCKED.*",
                "WAITING.*",
                ".*task-a.*",
                ".*priority.*15.*",
                ".*task-b.*",
                ".*priority.*25.*",
                "FINISHED.*",
            ],
        ),
    ])
}

fn set_state(anwork: &Anwork) -> Vec<ExpectationFailure> {
    run_all(&[
        quiet(anwork, &["task", "create", TASK_A]),
        quiet(anwork, &["task", "create", TASK_B]),
        quiet(anwork, &["task", "create", TASK_C]),
        quiet(anwork, &["task", "set-running", TASK_A]),
        quiet(anwork, &["task", "set-blocked", TASK_B]),
        quiet(anwork, &["task", "set-waiting", TASK_C]),
        expect(
            anwork,
            &["task", "show", "-s"],
            &[
                "RUNNING.*",
                ".*task-a.*",
                "BLOCKED.*",
                ".*task-b.*",
                "WAITING.*",
                ".*task-c.*",
                "FINISHED.*",
            ],
        ),
        quiet(anwork, &["task", "set-blocked", TASK_A]),
        quiet(anwork, &["task", "set-running", TASK_B]),
        quiet(anwork, &["task", "set-finished", TASK_C]),
        expect(
            anwork,
            &["task", "show", "-s"],
            &[
                "RUNNING.*",
                ".*task-b.*",
                "BLOCKED.*",
                ".*task-a.*",
                "WAITING.*",
                "FINISHED.*",
                ".*task-c.*",
            ],
        ),
    ])
}

fn change_priority(anwork: &Anwork) -> Vec<ExpectationFailure> {
    run_all(&[
        quiet(anwork, &["task", "create", TASK_A, "-p", TASK_A_PRIORITY]),
        quiet(anwork, &["task", "create", TASK_B, "-p", TASK_B_PRIORITY]),
        quiet(anwork, &["task", "set-priority", TASK_A, TASK_B_PRIORITY]),
        quiet(anwork, &["task", "set-priority", TASK_B, TASK_A_PRIORITY]),
        expect(
            anwork,
            &["task", "show"],
            &[
                "RUNNING.*",
                "BLOCKED.*",
                "WAITING.*",
                ".*task-b.*",
                ".*priority.*15.*",
                ".*task-a.*",
                ".*priority.*25.*",
                "FINISHED.*",
            ],
        ),
    ])
}

fn note(anwork: &Anwork) -> Vec<ExpectationFailure> {
    // `task show` prints the latest note of each task.
    run_all(&[
        quiet(anwork, &["task", "create", TASK_A, "-p", TASK_A_PRIORITY]),
        quiet(anwork, &["task", "create", TASK_B, "-p", TASK_B_PRIORITY]),
        quiet(anwork, &["task", "note", TASK_A, TASK_A_NOTE_1]),
        quiet(anwork, &["task", "note", TASK_B, TASK_B_NOTE_1]),
        expect(
            anwork,
            &["task", "show"],
            &[
                "RUNNING.*",
                "BLOCKED.*",
                "WAITING.*",
                ".*task-a.*",
                ".*This is the first note for task-a.*",
                ".*task-b.*",
                ".*This is the first note for task-b.*",
                "FINISHED.*",
            ],
        ),
        quiet(anwork, &["task", "note", TASK_A, TASK_A_NOTE_2]),
        quiet(anwork, &["task", "note", TASK_B, TASK_B_NOTE_2]),
        expect(
            anwork,
            &["task", "show"],
            &[
                "RUNNING.*",
                "BLOCKED.*",
                "WAITING.*",
                ".*task-a.*",
                ".*This is the second note for task-a.*",
                ".*task-b.*",
                ".*This is the second note for task-b.*",
                "FINISHED.*",
            ],
        ),
    ])
}

fn journal(anwork: &Anwork) -> Vec<ExpectationFailure> {
    // Two notes and a state change give each task at least four entries.
    run_all(&[
        quiet(anwork, &["task", "create", TASK_A]),
        quiet(anwork, &["task", "create", TASK_B]),
        quiet(anwork, &["task", "note", TASK_A, TASK_A_NOTE_1]),
        quiet(anwork, &["task", "note", TASK_B, TASK_B_NOTE_1]),
        quiet(anwork, &["task", "set-running", TASK_A]),
        quiet(anwork, &["task", "set-blocked", TASK_B]),
        quiet(anwork, &["task", "note", TASK_A, TASK_A_NOTE_2]),
        quiet(anwork, &["task", "note", TASK_B, TASK_B_NOTE_2]),
        expect(anwork, &["journal", "show", TASK_A], &[".*"; 4]),
        expect(anwork, &["journal", "show", TASK_B], &[".*"; 4]),
        expect(anwork, &["journal", "show-all"], &[".*"; 8]),
    ])
}

fn delete(anwork: &Anwork) -> Vec<ExpectationFailure> {
    let mut failures = run_all(&[
        quiet(anwork, &["task", "create", TASK_A]),
        quiet(anwork, &["task", "create", TASK_B]),
        quiet(anwork, &["task", "delete", TASK_A]),
    ]);
    failures.extend(expect_absent(anwork, &["task", "show"], TASK_A));

    failures.extend(run_all(&[quiet(anwork, &["task", "delete", TASK_B])]));
    failures.extend(expect_absent(anwork, &["task", "show"], TASK_B));
    failures
}

fn delete_all(anwork: &Anwork) -> Vec<ExpectationFailure> {
    let mut failures = run_all(&[
        quiet(anwork, &["task", "create", TASK_A]),
        quiet(anwork, &["task", "create", TASK_B]),
        quiet(anwork, &["task", "delete-all"]),
    ]);
    failures.extend(expect_absent(anwork, &["task", "show"], TASK_A));
    failures.extend(expect_absent(anwork, &["task", "show"], TASK_B));
    failures
}
