//! Content fingerprints for release archives.
//!
//! SHA-256 over the raw archive bytes, rendered as lowercase hex. Extraction
//! directories are keyed by version and fingerprint together, so a rebuilt
//! archive for the same version gets a fresh directory.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{HarnessError, Result};

/// Fingerprint an in-memory buffer.
#[must_use]
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Fingerprint everything a reader yields, without buffering it whole.
///
/// # Errors
///
/// Propagates read errors.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Fingerprint a file on disk.
///
/// # Errors
///
/// Returns a `Filesystem` error if the file cannot be opened or read.
pub fn file_fingerprint(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| HarnessError::filesystem(path, e))?;
    fingerprint_reader(file).map_err(|e| HarnessError::filesystem(path, e))
}
