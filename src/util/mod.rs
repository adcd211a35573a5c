//! Shared helpers for the `anwork-harness` binary.

pub mod progress;

pub use progress::{case_bar, should_show_progress, spinner};
