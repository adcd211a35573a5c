//! Progress indicators for the `anwork-harness` binary.
//!
//! Indicators draw to stderr and only when it is a terminal, so piped and
//! `--json` output stay clean.

use std::io::{IsTerminal, stderr};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Whether stderr is interactive.
#[must_use]
pub fn should_show_progress() -> bool {
    stderr().is_terminal()
}

/// Bar counting finished suite cases.
#[must_use]
pub fn case_bar(total: usize, version: u32, show: bool) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    if !show {
        bar.set_draw_target(ProgressDrawTarget::hidden());
        return bar;
    }

    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("=>-"));
    bar.set_style(style);
    bar.set_message(format!("anwork v{version}"));
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Spinner for a single long step such as extraction or a benchmark loop.
#[must_use]
pub fn spinner(message: impl Into<String>, show: bool) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if !show {
        bar.set_draw_target(ProgressDrawTarget::hidden());
        return bar;
    }

    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
