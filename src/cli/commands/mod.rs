//! Command implementations for `anwork-harness`.

pub mod bench;
pub mod check;
pub mod exec;
pub mod materialize;
pub mod versions;

use serde::Serialize;

use crate::error::Result;

/// Print `value` as a single line of JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string(value)?;
    println!("{payload}");
    Ok(())
}
