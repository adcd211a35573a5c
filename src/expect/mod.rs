//! Declarative output assertions.
//!
//! An [`Expectation`] is a command plus an ordered list of regular
//! expressions. Running it executes the command on an [`Anwork`] handle and
//! looks for the patterns as an ordered subsequence of the output lines:
//!
//! - lines are scanned once, top to bottom
//! - each line is tested only against the first pattern not yet matched
//! - a matching line is recorded and the next pattern becomes current
//! - scanning stops when either lines or patterns run out
//!
//! The result holds one line per matched pattern. Fewer lines than patterns
//! is not an error here; [`run_all`] and [`assert_expectations`] turn it into
//! a reported failure.

mod batch;

pub use batch::{
    ExpectationFailure, FailureReason, assert_expectations, expect_absent, run_all,
};

use regex::Regex;
use tracing::debug;

use crate::anwork::Anwork;
use crate::error::{HarnessError, Result};

/// A command and the patterns its output must contain, in order.
#[derive(Debug, Clone)]
pub struct Expectation<'a> {
    /// Handle to run on. `None` is rejected by [`Expectation::run`].
    pub anwork: Option<&'a Anwork>,
    pub command: Vec<String>,
    /// Empty means "run the command, ignore its output".
    pub patterns: Vec<String>,
}

impl<'a> Expectation<'a> {
    pub fn new<C, S, P, T>(anwork: &'a Anwork, command: C, patterns: P) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
        P: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            anwork: Some(anwork),
            command: command.into_iter().map(Into::into).collect(),
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Run `command` and only require that it succeeds.
    pub fn ignore_output<C, S>(anwork: &'a Anwork, command: C) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(anwork, command, Vec::<String>::new())
    }

    /// An expectation without a handle. Running it always fails.
    pub fn detached<C, S, P, T>(command: C, patterns: P) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
        P: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            anwork: None,
            command: command.into_iter().map(Into::into).collect(),
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Run the command and return the lines matched by the patterns.
    ///
    /// # Errors
    ///
    /// - `InvalidExpectation` if there is no handle or it is closed; nothing
    ///   is launched in that case
    /// - any error from [`Anwork::run`], unchanged
    /// - `Regex` if a pattern reached during the scan does not compile
    pub fn run(&self) -> Result<Vec<String>> {
        let anwork = self.handle()?;
        let output = anwork.run(&self.command)?;
        debug!(command = ?self.command, "got output:\n{output}");

        let lines = split_output_lines(&output);
        let matched = match_lines(&lines, &self.patterns)?;
        debug!(?matched, patterns = ?self.patterns, "matched lines");
        Ok(matched)
    }

    fn handle(&self) -> Result<&'a Anwork> {
        match self.anwork {
            None => Err(HarnessError::InvalidExpectation {
                reason: format!("no anwork handle for command {:?}", self.command),
            }),
            Some(anwork) if anwork.is_closed() => Err(HarnessError::InvalidExpectation {
                reason: format!("anwork handle for command {:?} is closed", self.command),
            }),
            Some(anwork) => Ok(anwork),
        }
    }
}

impl std::fmt::Display for Expectation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{command: {:?}, patterns: {:?}, anwork: ", self.command, self.patterns)?;
        match self.anwork {
            Some(anwork) => write!(f, "{anwork}}}"),
            None => write!(f, "none}}"),
        }
    }
}

/// Split command output into lines.
///
/// A trailing newline does not produce an empty last line, and empty output
/// has no lines at all.
#[must_use]
pub fn split_output_lines(output: &str) -> Vec<String> {
    let mut lines: Vec<String> = output.split('\n').map(str::to_string).collect();
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

/// Find `patterns` as an ordered subsequence of `lines`.
///
/// Patterns are unanchored and compiled only when the scan reaches them, so a
/// malformed pattern after the last matched line is never noticed.
///
/// # Errors
///
/// Returns `Regex` for the first malformed pattern reached; lines matched
/// before it are discarded.
pub fn match_lines<L, P>(lines: &[L], patterns: &[P]) -> Result<Vec<String>>
where
    L: AsRef<str>,
    P: AsRef<str>,
{
    let mut matched = Vec::with_capacity(patterns.len());
    let mut current: Option<Regex> = None;

    for line in lines {
        let Some(pattern) = patterns.get(matched.len()) else {
            break;
        };
        let regex = match current.take() {
            Some(regex) => regex,
            None => compile(pattern.as_ref())?,
        };

        let line = line.as_ref();
        if regex.is_match(line) {
            matched.push(line.to_string());
        } else {
            current = Some(regex);
        }
    }

    Ok(matched)
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| HarnessError::Regex {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_split_output_lines() {
        let cases: [(&str, &[&str]); 5] = [
            ("", &[]),
            ("one line", &["one line"]),
            ("two\nlines", &["two", "lines"]),
            (
                "many and\nmany\nand many\nlines\n",
                &["many and", "many", "and many", "lines"],
            ),
            ("inner\n\nblank\n", &["inner", "", "blank"]),
        ];

        for (output, expected) in cases {
            assert_eq!(
                split_output_lines(output),
                strings(expected),
                "splitting {output:?}"
            );
        }
    }

    #[test]
    fn test_match_lines_table() {
        let hey_there: &[&str] = &["hey", "there"];
        let cases: [(&[&str], &[&str], &[&str]); 13] = [
            // Matching nothing.
            (&[], &[], &[]),
            (&[], &[".*"], &[]),
            (&[], &[".*", "."], &[]),
            // Nothing matching.
            (hey_there, &[], &[]),
            (hey_there, &[".*tuna.*"], &[]),
            (hey_there, &[".*fish.*", ".*marlin.*"], &[]),
            (hey_there, &["hye", "^ey$"], &[]),
            (hey_there, &["nope", ".*"], &[]),
            // Some things matching.
            (hey_there, &[".*ey$", "nope"], &["hey"]),
            (hey_there, &[".*ere$"], &["there"]),
            // Too many patterns.
            (hey_there, &[".*", ".*", ".*"], &["hey", "there"]),
            // Everything matching.
            (hey_there, &["hey", ".*"], &["hey", "there"]),
            (&["hey", "there", "foo"], &["hey", "foo"], &["hey", "foo"]),
        ];

        for (lines, patterns, expected) in cases {
            let matched = match_lines(lines, patterns).expect("valid patterns");
            assert_eq!(
                matched,
                strings(expected),
                "lines {lines:?} against {patterns:?}"
            );
        }
    }

    #[test]
    fn test_match_never_looks_back() {
        // "b" precedes the line matched by "a", so it can never be matched.
        let matched = match_lines(&["b", "a"], &["a", "b"]).expect("valid");
        assert_eq!(matched, strings(&["a"]));
    }

    #[test]
    fn test_bad_regex_is_an_error() {
        let err = match_lines(&["version 1"], &["["]).expect_err("unclosed class");
        assert_eq!(err.kind(), ErrorKind::Regex);
    }

    #[test]
    fn test_bad_regex_after_exhausted_lines_is_not_reached() {
        let matched = match_lines(&["only"], &["only", "["]).expect("never compiled");
        assert_eq!(matched, strings(&["only"]));
    }

    #[test]
    fn test_bad_regex_discards_partial_matches() {
        let err = match_lines(&["hey", "there"], &["hey", "(", ".*"]).expect_err("bad");
        assert!(matches!(err, HarnessError::Regex { ref pattern, .. } if pattern == "("));
    }

    #[test]
    fn test_detached_expectation_is_invalid() {
        let expectation = Expectation::detached(["foo"], ["", ""]);
        let err = expectation.run().expect_err("no handle");
        assert_eq!(err.kind(), ErrorKind::InvalidExpectation);
    }

    #[test]
    fn test_closed_handle_is_invalid() {
        let temp = TempDir::new().expect("tempdir");
        // The binary does not exist: a launch attempt would be a different error.
        let mut anwork = Anwork::with_binary(1, temp.path().join("missing"), temp.path())
            .expect("handle");
        anwork.close().expect("close");

        let expectation = Expectation::new(&anwork, ["foo"], ["", ""]);
        let err = expectation.run().expect_err("closed handle");
        assert_eq!(err.kind(), ErrorKind::InvalidExpectation);
    }

    #[test]
    fn test_display_renders_command_and_patterns() {
        let expectation = Expectation::detached(["task", "show"], ["WAITING.*"]);
        assert_eq!(
            expectation.to_string(),
            r#"{command: ["task", "show"], patterns: ["WAITING.*"], anwork: none}"#
        );
    }
}
