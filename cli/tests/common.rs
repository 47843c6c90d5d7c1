//! # xpld CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration test crates (`inspect.rs`,
//! `create_extract.rs`, `main_tests.rs`):
//!
//! - `Workspace`: a scratch directory plus an `xpld` command that runs inside
//!   it with an empty `$XPLD_CONFIG`, so a developer's own configuration
//!   never leaks into the assertions.
//! - Fixture builders that write archives directly with the `tar`, `flate2`
//!   and `zip` crates, independent of the code under test.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use flate2::{write::GzEncoder, Compression};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Fixed modification time for fixture members (2023-11-14T22:13:20Z).
pub const FIXTURE_MTIME: u64 = 1_700_000_000;

/// # Get xpld Command (`xpld_cmd`)
///
/// Creates an `assert_cmd::Command` for the compiled `xpld` binary.
///
/// ## Panics
/// Panics if the binary cannot be found via `Command::cargo_bin`.
pub fn xpld_cmd() -> Command {
    Command::cargo_bin("xpld").expect("Failed to find xpld binary for testing")
}

/// One fixture member: a name ending in `/` is a directory.
pub struct Member<'a> {
    pub name: &'a str,
    pub content: &'a [u8],
    pub mode: u32,
}

pub fn dir(name: &str) -> Member<'_> {
    Member {
        name,
        content: b"",
        mode: 0o755,
    }
}

pub fn file<'a>(name: &'a str, content: &'a str) -> Member<'a> {
    Member {
        name,
        content: content.as_bytes(),
        mode: 0o644,
    }
}

/// Scratch directory for one test.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("xpld.toml"), "").expect("Failed to write empty config");
        Workspace { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// An `xpld` command running in the workspace with an empty config.
    pub fn cmd(&self) -> Command {
        let mut cmd = xpld_cmd();
        cmd.current_dir(self.path())
            .env("XPLD_CONFIG", self.join("xpld.toml"))
            .env_remove("RUST_LOG");
        cmd
    }

    /// Replaces the configuration file used by `cmd`.
    pub fn write_config(&self, toml: &str) {
        fs::write(self.join("xpld.toml"), toml).expect("Failed to write config");
    }

    /// Writes a gzip-compressed tarball holding `members` and returns its path.
    pub fn tar_gz(&self, name: &str, members: &[Member]) -> PathBuf {
        let path = self.join(name);
        let file = File::create(&path).expect("Failed to create fixture");
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for member in members {
            let mut header = tar::Header::new_gnu();
            header.set_mode(member.mode);
            header.set_mtime(FIXTURE_MTIME);
            header.set_uid(1000);
            header.set_gid(1000);
            if member.name.ends_with('/') {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_size(0);
            } else {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_size(member.content.len() as u64);
            }
            builder
                .append_data(&mut header, member.name, member.content)
                .expect("Failed to append fixture member");
        }
        builder
            .into_inner()
            .and_then(|encoder| encoder.finish())
            .expect("Failed to finish tarball");
        path
    }

    /// Writes a zip archive holding `members` and returns its path.
    pub fn zip(&self, name: &str, members: &[Member]) -> PathBuf {
        let path = self.join(name);
        let file = File::create(&path).expect("Failed to create fixture");
        let mut zip = zip::ZipWriter::new(file);
        for member in members {
            let options = zip::write::FileOptions::default().unix_permissions(member.mode);
            if member.name.ends_with('/') {
                zip.add_directory(member.name, options)
                    .expect("Failed to add fixture directory");
            } else {
                zip.start_file(member.name, options)
                    .expect("Failed to add fixture file");
                zip.write_all(member.content)
                    .expect("Failed to write fixture file");
            }
        }
        zip.finish().expect("Failed to finish zip");
        path
    }
}

/// The standard three-member fixture: `a/`, `a/x.txt`, `b.log`, stored out
/// of order.
pub fn sample_members() -> Vec<Member<'static>> {
    vec![
        file("b.log", "log line\n"),
        dir("a/"),
        file("a/x.txt", "hello"),
    ]
}
