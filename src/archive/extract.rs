//! Streaming zip extraction.
//!
//! Entries are written in archive order, one at a time. A whole archive is
//! unpacked into a staging directory next to the destination and renamed into
//! place, so the destination only ever exists fully populated.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, trace};
use zip::ZipArchive;

use crate::error::{HarnessError, Result};

/// Open a release archive for reading.
///
/// # Errors
///
/// `Filesystem` if the file cannot be opened, `ArchiveCorrupt` if it is not a
/// readable zip.
pub fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path).map_err(|e| HarnessError::filesystem(path, e))?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| HarnessError::corrupt(path, e))
}

/// Outcome of [`install_archive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Install {
    /// This call unpacked the archive.
    Extracted { entries: usize },
    /// Another writer finished first; its tree was kept.
    Raced,
}

/// Unpack `archive` so that `destination` ends up holding its tree.
///
/// Each call unpacks into its own staging directory next to `destination`,
/// so concurrent writers never touch each other's files. Staging directories
/// left behind by a crashed writer are not cleaned up here.
///
/// # Errors
///
/// Fails on unreadable entries, unsafe entry names, and filesystem errors.
/// `DestinationCollision` if something other than a directory already sits
/// at `destination`.
pub fn install_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    archive_path: &Path,
    destination: &Path,
) -> Result<Install> {
    let parent = destination.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| HarnessError::filesystem(parent, e))?;
    // Removed on drop unless it was renamed into place.
    let staging = tempfile::Builder::new()
        .prefix(&staging_prefix(destination))
        .tempdir_in(parent)
        .map_err(|e| HarnessError::filesystem(parent, e))?;
    trace!(path = %staging.path().display(), "staging extraction");

    let entries = extract_into(archive, archive_path, staging.path())?;

    match fs::rename(staging.path(), destination) {
        Ok(()) => Ok(Install::Extracted { entries }),
        Err(_) if destination.is_dir() => {
            debug!(path = %destination.display(), "destination appeared while extracting");
            Ok(Install::Raced)
        }
        Err(_) if destination.exists() => Err(HarnessError::DestinationCollision {
            path: destination.to_path_buf(),
        }),
        Err(e) => Err(HarnessError::filesystem(destination, e)),
    }
}

/// Write every entry of `archive` below `root`, preserving relative paths.
///
/// Returns the number of entries written.
///
/// # Errors
///
/// Fails on the first entry that cannot be read or written.
pub fn extract_into<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    archive_path: &Path,
    root: &Path,
) -> Result<usize> {
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| HarnessError::corrupt(archive_path, e))?;
        let name = entry.name().to_string();
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| HarnessError::UnsafeEntry {
                entry: name.clone(),
            })?;
        let target = root.join(&relative);
        trace!(entry = %name, "extracting");

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| HarnessError::filesystem(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| HarnessError::filesystem(parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| HarnessError::filesystem(&target, e))?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| HarnessError::corrupt(archive_path, format!("entry '{name}': {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o7777))
                    .map_err(|e| HarnessError::filesystem(&target, e))?;
            }
        }
    }

    Ok(archive.len())
}

/// Name prefix shared by every staging directory for `destination`.
fn staging_prefix(destination: &Path) -> String {
    let name = destination
        .file_name()
        .map_or_else(|| "extract".into(), |n| n.to_string_lossy().into_owned());
    format!("{name}.partial-")
}
