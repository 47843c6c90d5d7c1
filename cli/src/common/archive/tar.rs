//! # xpld TAR Archive Operations (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//!
//! ## Overview
//!
//! Reads and writes the TAR container on top of the `tar` crate. Compression
//! is applied by the caller (`compression::Encoder` / `compression::decoder`),
//! so the functions here work on any `Read` or `Write`.
//!
//! ## Architecture
//!
//! - `write_archive` appends one header per `FileInput`, streaming regular
//!   file content from disk as it goes.
//! - `read_archive` walks the member headers in archive order, converts each
//!   to an `EntryInfo`, and hands the entry (which is itself a reader over
//!   the member's content) to the visitor. Unread content is skipped by the
//!   `tar` crate before the next header is parsed.
//!
//! GNU headers also carry access and change times; those are surfaced when
//! non-zero. Owner ids are always present in a tar header and are reported.
//!
use super::{normalize_member_name, timestamp, EntryInfo, EntryKind, FileInput, Visitor};
use crate::core::error::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{self, Read, Write};
use tar::{Archive, Builder, EntryType, Header};
use tracing::{debug, warn};

/// # Write TAR Archive (`write_archive`)
///
/// Appends every input to a new TAR stream written to `writer` and returns
/// the writer once the closing records are written, so the caller can finish
/// any compression layer around it.
///
/// ## Errors
///
/// Returns an `Err` if a source file cannot be opened or read, or if writing
/// to `writer` fails.
pub fn write_archive<W: Write>(writer: W, inputs: &[FileInput]) -> Result<W> {
    let mut builder = Builder::new(writer);
    for input in inputs {
        append_input(&mut builder, input)
            .with_context(|| format!("Failed to add '{}' to the tar archive", input.info.name))?;
    }
    builder
        .into_inner()
        .context("Failed to finalize tar archive structure")
}

fn append_input<W: Write>(builder: &mut Builder<W>, input: &FileInput) -> Result<()> {
    let info = &input.info;
    let mut header = Header::new_gnu();
    header.set_mode(info.mode);
    header.set_mtime(info.mtime.timestamp().max(0) as u64);
    header.set_uid(info.uid.unwrap_or(0));
    header.set_gid(info.gid.unwrap_or(0));

    match &info.kind {
        EntryKind::Dir => {
            header.set_entry_type(EntryType::Directory);
            header.set_size(0);
            builder.append_data(&mut header, &info.name, io::empty())?;
        }
        EntryKind::File => {
            let file = File::open(&input.source)
                .with_context(|| format!("Failed to open {}", input.source.display()))?;
            // Size the header from the open handle so it matches the bytes copied.
            let size = file
                .metadata()
                .with_context(|| format!("Failed to stat {}", input.source.display()))?
                .len();
            header.set_entry_type(EntryType::Regular);
            header.set_size(size);
            builder.append_data(&mut header, &info.name, file)?;
        }
        EntryKind::Symlink(target) => {
            header.set_entry_type(EntryType::Symlink);
            header.set_size(0);
            builder.append_link(&mut header, &info.name, target)?;
        }
        EntryKind::HardLink(target) => {
            header.set_entry_type(EntryType::Link);
            header.set_size(0);
            builder.append_link(&mut header, &info.name, target)?;
        }
        EntryKind::Other => {
            warn!("Skipping special file '{}'", input.source.display());
        }
    }
    Ok(())
}

/// # Read TAR Archive (`read_archive`)
///
/// Calls `visitor` for every member of the TAR stream in `reader`, in
/// archive order. Extension headers (pax, GNU long names) are consumed by the
/// `tar` crate and never reach the visitor; neither does the `./` root entry.
pub fn read_archive<R: Read>(reader: R, visitor: &mut Visitor<'_>) -> Result<()> {
    let mut archive = Archive::new(reader);
    let entries = archive.entries().context("Failed to read tar archive")?;
    for entry in entries {
        let mut entry = entry.context("Failed to read tar entry header")?;
        let Some(info) = entry_info(&entry)? else {
            continue;
        };
        debug!("tar member: {} ({} bytes)", info.name, info.size);
        visitor(&info, &mut entry)?;
    }
    Ok(())
}

fn entry_info<R: Read>(entry: &tar::Entry<'_, R>) -> Result<Option<EntryInfo>> {
    let raw_name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
    let name = normalize_member_name(&raw_name);
    if name.is_empty() {
        return Ok(None);
    }
    let link = entry
        .link_name_bytes()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default();
    let header = entry.header();

    let kind = match header.entry_type() {
        // Old-style archives mark directories with a trailing slash only.
        EntryType::Regular if raw_name.ends_with('/') => EntryKind::Dir,
        EntryType::Regular | EntryType::Continuous | EntryType::GNUSparse => EntryKind::File,
        EntryType::Directory => EntryKind::Dir,
        EntryType::Symlink => EntryKind::Symlink(link),
        EntryType::Link => EntryKind::HardLink(normalize_member_name(&link)),
        EntryType::XGlobalHeader
        | EntryType::XHeader
        | EntryType::GNULongName
        | EntryType::GNULongLink => return Ok(None),
        _ => EntryKind::Other,
    };

    let device = match (
        header.device_major().ok().flatten(),
        header.device_minor().ok().flatten(),
    ) {
        (Some(major), Some(minor)) if kind == EntryKind::Other => {
            Some((u64::from(major) << 8) | u64::from(minor))
        }
        _ => None,
    };
    let gnu_time = |secs: io::Result<u64>| {
        secs.ok()
            .filter(|&secs| secs > 0)
            .map(|secs| timestamp(secs as i64))
    };
    let (atime, ctime) = match header.as_gnu() {
        Some(gnu) => (gnu_time(gnu.atime()), gnu_time(gnu.ctime())),
        None => (None, None),
    };

    // Blank or garbled numeric fields mean the writer did not record them.
    let mut info = EntryInfo::new(name, kind);
    if info.kind == EntryKind::File {
        info.size = entry.size();
    }
    if let Ok(mode) = header.mode() {
        info.mode = mode & 0o7777;
    }
    if let Ok(mtime) = header.mtime() {
        info.mtime = timestamp(mtime as i64);
    }
    info.uid = header.uid().ok();
    info.gid = header.gid().ok();
    info.device = device;
    info.atime = atime;
    info.ctime = ctime;
    Ok(Some(info))
}
