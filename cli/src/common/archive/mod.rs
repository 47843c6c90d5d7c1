//! # xpld Archive Collaborator (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! This module is the boundary between xpld's own logic (filesystem
//! traversal, flag handling, listing) and the archive formats it handles.
//! Container and codec work is delegated to registry crates (`tar`, `zip`,
//! `flate2`, `xz2`, `zstd`, `bzip2`); this module only identifies formats
//! and adapts those crates to one shared shape:
//!
//! - **`format`**: Identifies compression and container from magic bytes and file names.
//! - **`compression`**: Wraps readers and writers in the matching codec.
//! - **`tar`** / **`zip`**: Container-specific reading and writing.
//! - **`fs`**: An in-memory virtual filesystem over an archive's members.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive::{self, format::Format};
//!
//! # fn run(path: &std::path::Path) -> anyhow::Result<()> {
//! let mut file = std::fs::File::open(path)?;
//! let format = Format::identify_file(path, &mut file)?;
//! archive::extract(&format, file, |info, _content| {
//!     println!("{}", info.name);
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```
//!
pub mod compression;
pub mod format;
pub mod fs;
pub mod tar;
pub mod zip;

use crate::core::error::{Result, XpldError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use format::{Container, Format};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;
use tracing::debug;

/// The type of an archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Symbolic link with its target as stored in the archive.
    Symlink(String),
    /// Hard link to another member, named relative to the archive root.
    HardLink(String),
    /// Devices, fifos and anything else without regular content.
    Other,
}

/// Metadata for one archive member.
///
/// Platform attributes are `None` when the container does not record them,
/// so renderers never print a misleading zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// NameInArchive: `/`-separated, no leading `./`, no trailing `/`.
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    /// Permission bits (`0o7777` mask).
    pub mode: u32,
    pub mtime: DateTime<Utc>,
    pub uid: Option<u64>,
    pub gid: Option<u64>,
    pub inode: Option<u64>,
    pub device: Option<u64>,
    pub atime: Option<DateTime<Utc>>,
    pub ctime: Option<DateTime<Utc>>,
}

impl EntryInfo {
    /// A bare record with default permissions and no platform attributes.
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        let mode = if kind == EntryKind::Dir { 0o755 } else { 0o644 };
        Self {
            name: name.into(),
            kind,
            size: 0,
            mode,
            mtime: DateTime::default(),
            uid: None,
            gid: None,
            inode: None,
            device: None,
            atime: None,
            ctime: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// The last path segment of the member name.
    pub fn base_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// One file to be written into a new archive.
///
/// `source` is the on-disk path opened lazily when the member's content is
/// written; directories and symlinks never open it.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub info: EntryInfo,
    pub source: PathBuf,
}

/// Callback invoked once per archive member with its metadata and content.
pub type Visitor<'v> = dyn FnMut(&EntryInfo, &mut dyn Read) -> Result<()> + 'v;

/// Normalizes a raw member name as stored by a container.
///
/// Leading `./` segments and trailing slashes are removed and backslashes are
/// left untouched. A leading `/` is kept so extraction can refuse it.
pub fn normalize_member_name(raw: &str) -> String {
    let mut name = raw;
    while let Some(rest) = name.strip_prefix("./") {
        name = rest;
    }
    let name = name.trim_end_matches('/');
    if name == "." {
        String::new()
    } else {
        name.to_string()
    }
}

/// Converts a Unix timestamp into a UTC date-time, falling back to the epoch.
pub(crate) fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// # Create Archive (`archive`)
///
/// Writes a new archive in `format` to `output`, containing `inputs` in order.
/// Fails with `XpldError::UnsupportedOperation` when `format` is a bare
/// compression format or a compressed zip.
pub fn archive(format: &Format, output: File, inputs: &[FileInput]) -> Result<()> {
    debug!("Writing {} members as {}", inputs.len(), format);
    match format.container {
        Some(Container::Tar) => {
            let encoder = compression::Encoder::new(format.compression, BufWriter::new(output))?;
            let encoder = tar::write_archive(encoder, inputs)?;
            encoder
                .finish()?
                .flush()
                .context("Failed to flush archive output")?;
        }
        Some(Container::Zip) if format.compression.is_none() => {
            zip::write_archive(BufWriter::new(output), inputs)?
                .flush()
                .context("Failed to flush archive output")?;
        }
        _ => {
            return Err(XpldError::UnsupportedOperation {
                format: format.to_string(),
                operation: "create".into(),
            }
            .into())
        }
    }
    Ok(())
}

/// # Walk Archive Members (`extract`)
///
/// Reads the archive in `file` and calls `visitor` once per member with its
/// metadata and a reader over its content. The reader is empty for
/// directories and links. The first error from the container or the visitor
/// aborts the walk.
pub fn extract<F>(format: &Format, file: File, mut visitor: F) -> Result<()>
where
    F: FnMut(&EntryInfo, &mut dyn Read) -> Result<()>,
{
    match format.container {
        Some(Container::Tar) => {
            let reader = compression::decoder(format.compression, std::io::BufReader::new(file))?;
            tar::read_archive(reader, &mut visitor)
        }
        Some(Container::Zip) if format.compression.is_none() => {
            zip::read_archive(std::io::BufReader::new(file), &mut visitor)
        }
        _ => Err(XpldError::UnsupportedOperation {
            format: format.to_string(),
            operation: "extract".into(),
        }
        .into()),
    }
}
