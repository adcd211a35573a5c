//! Synthetic release archives.
//!
//! Real anwork releases are not checked in, so tests build archives on the
//! fly. Each holds a POSIX shell stand-in that keeps a tiny task list under
//! its `-o` directory and understands enough commands for the harness tests:
//! `version`, `create`, `show [NAME]`, `delete`, `delete-all`, a no-op
//! `set-finished`, and `fail`.

use std::fs;
use std::io::{Cursor, Write};
use std::path::PathBuf;

use anwork_testing::{HarnessConfig, Materializer, ReleaseLayout};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const FAKE_ANWORK: &str = r##"#!/bin/sh
set -e
VERSION=@VERSION@

if [ "$1" != "-o" ] || [ -z "$2" ]; then
    echo "usage: anwork -o <dir> <command> [args...]" >&2
    exit 2
fi
ctx=$2
shift 2
mkdir -p "$ctx"
tasks="$ctx/tasks"
touch "$tasks"

if [ "$VERSION" = 1 ] && [ "${1:-}" = task ]; then
    shift
fi
cmd=${1:-}
if [ $# -gt 0 ]; then
    shift
fi

case "$cmd" in
version)
    echo "ANWORK Version = $VERSION"
    ;;
create)
    id=$(cat "$ctx/next_id" 2>/dev/null || echo 0)
    echo "$id $1" >>"$tasks"
    echo $((id + 1)) >"$ctx/next_id"
    ;;
show)
    if [ $# -gt 0 ] && [ "${1#-}" = "$1" ]; then
        found=
        while read -r id name; do
            if [ "$name" = "$1" ]; then
                found=$id
            fi
        done <"$tasks"
        if [ -z "$found" ]; then
            echo "no task named $1" >&2
            exit 1
        fi
        echo "Name: $1"
        echo "ID: $found"
        echo "State: WAITING"
    else
        echo "RUNNING tasks:"
        echo "BLOCKED tasks:"
        echo "WAITING tasks:"
        while read -r id name; do
            echo "  $name ($id)"
        done <"$tasks"
        echo "FINISHED tasks:"
    fi
    ;;
delete)
    : >"$tasks.new"
    while read -r id name; do
        if [ "$name" != "$1" ]; then
            echo "$id $name" >>"$tasks.new"
        fi
    done <"$tasks"
    mv "$tasks.new" "$tasks"
    ;;
delete-all)
    : >"$tasks"
    ;;
set-finished)
    ;;
fail)
    echo "partial output"
    echo "something went wrong" >&2
    exit 3
    ;;
*)
    echo "unknown command: $cmd" >&2
    exit 1
    ;;
esac
"##;

/// Stand-in script that reports itself as `version`.
pub fn fake_anwork_script(version: u32) -> String {
    FAKE_ANWORK.replace("@VERSION@", &version.to_string())
}

/// Zip `entries` in order. `None` contents mark a directory entry.
///
/// Files are stored without execute permission so tests observe the
/// harness granting it.
pub fn build_zip(entries: &[(&str, Option<&str>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().unix_permissions(0o644);
    for (name, contents) in entries {
        match contents {
            Some(body) => {
                writer.start_file(*name, options).expect("start file");
                writer.write_all(body.as_bytes()).expect("write body");
            }
            None => {
                writer.add_directory(*name, options).expect("add dir");
            }
        }
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Archive image with the `test/` tree: each file's contents is its own name.
pub fn tree_zip() -> Vec<u8> {
    build_zip(&[
        ("test/", None),
        ("test/file-1", Some("file-1")),
        ("test/file-2", Some("file-2")),
        ("test/dir-a/", None),
        ("test/dir-a/file-a-1", Some("file-a-1")),
        ("test/dir-a/file-a-2", Some("file-a-2")),
        ("test/dir-b/", None),
        ("test/dir-b/file-b-1", Some("file-b-1")),
    ])
}

/// Same layout as [`tree_zip`] with different contents.
pub fn other_tree_zip() -> Vec<u8> {
    build_zip(&[
        ("test/", None),
        ("test/file-1", Some("something else")),
    ])
}

/// A temporary release directory plus a scratch work directory.
pub struct FakeRelease {
    pub temp: TempDir,
    pub release_dir: PathBuf,
    pub work_dir: PathBuf,
}

impl FakeRelease {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let release_dir = temp.path().join("release");
        let work_dir = temp.path().join("work");
        fs::create_dir_all(&release_dir).expect("release dir");
        Self {
            temp,
            release_dir,
            work_dir,
        }
    }

    /// Release directory holding working archives for `versions`.
    pub fn with_versions(versions: &[u32]) -> Self {
        let release = Self::new();
        for version in versions {
            release.add_version(*version);
        }
        release
    }

    pub fn layout(&self) -> ReleaseLayout {
        ReleaseLayout::new(&self.release_dir, "anwork")
    }

    /// Write a working archive for `version` and return its path.
    pub fn add_version(&self, version: u32) -> PathBuf {
        self.add_version_with_readme(version, "fake anwork release\n")
    }

    /// Like [`FakeRelease::add_version`]; varying `readme_body` changes the
    /// archive fingerprint without changing behavior.
    pub fn add_version_with_readme(&self, version: u32, readme_body: &str) -> PathBuf {
        let script = fake_anwork_script(version);
        let root = format!("anwork-{version}/");
        let bin_dir = format!("anwork-{version}/bin/");
        let binary = format!("anwork-{version}/bin/anwork");
        let readme = format!("anwork-{version}/README");
        let bytes = build_zip(&[
            (root.as_str(), None),
            (bin_dir.as_str(), None),
            (binary.as_str(), Some(script.as_str())),
            (readme.as_str(), Some(readme_body)),
        ]);
        self.add_archive(version, &bytes)
    }

    /// Write raw archive bytes as the release for `version`.
    pub fn add_archive(&self, version: u32, bytes: &[u8]) -> PathBuf {
        let path = self.layout().archive_path(version);
        fs::create_dir_all(path.parent().expect("archive parent")).expect("version dir");
        fs::write(&path, bytes).expect("write archive");
        path
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::new(&self.release_dir, &self.work_dir)
    }

    pub fn materializer(&self) -> Materializer {
        Materializer::from_config(&self.config())
    }
}
