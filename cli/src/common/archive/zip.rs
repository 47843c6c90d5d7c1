//! # xpld ZIP Archive Operations (`common::archive::zip`)
//!
//! File: cli/src/common/archive/zip.rs
//!
//! ZIP reading and writing on top of the `zip` crate. ZIP needs a seekable
//! stream in both directions, so it never sits under a compression layer.
//! Unix permissions are stored in the external attributes; owner ids,
//! inodes, and access/change times are not recorded by the format and are
//! always reported as absent.
//!
use super::{normalize_member_name, EntryInfo, EntryKind, FileInput, Visitor};
use crate::core::error::Result;
use anyhow::Context;
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use std::fs::File;
use std::io::{self, Read, Seek, Write};
use tracing::{debug, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// Writes every input into a new ZIP archive and returns the finished writer.
pub fn write_archive<W: Write + Seek>(writer: W, inputs: &[FileInput]) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    for input in inputs {
        let info = &input.info;
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(info.mode)
            .last_modified_time(zip_time(info.mtime))
            .large_file(info.size > u64::from(u32::MAX));

        match &info.kind {
            EntryKind::Dir => zip
                .add_directory(info.name.as_str(), options)
                .with_context(|| format!("Failed to add directory '{}'", info.name))?,
            EntryKind::File => {
                let mut file = File::open(&input.source)
                    .with_context(|| format!("Failed to open {}", input.source.display()))?;
                zip.start_file(info.name.as_str(), options)
                    .with_context(|| format!("Failed to add '{}' to the zip archive", info.name))?;
                io::copy(&mut file, &mut zip)
                    .with_context(|| format!("Failed to write '{}'", input.source.display()))?;
            }
            EntryKind::Symlink(target) => zip
                .add_symlink(info.name.as_str(), target.as_str(), options)
                .with_context(|| format!("Failed to add symlink '{}'", info.name))?,
            EntryKind::HardLink(_) | EntryKind::Other => {
                warn!("ZIP cannot store '{}'; skipping", input.source.display());
            }
        }
    }
    zip.finish().context("Failed to finalize zip archive")
}

/// Calls `visitor` for every member of the ZIP archive in `reader`, in
/// central-directory order.
pub fn read_archive<R: Read + Seek>(reader: R, visitor: &mut Visitor<'_>) -> Result<()> {
    let mut archive = ZipArchive::new(reader).context("Failed to read zip central directory")?;
    for index in 0..archive.len() {
        let mut member = archive
            .by_index(index)
            .with_context(|| format!("Failed to read zip member #{index}"))?;
        let name = normalize_member_name(member.name());
        if name.is_empty() {
            continue;
        }
        let unix_mode = member.unix_mode();
        let kind = if member.is_dir() {
            EntryKind::Dir
        } else if unix_mode.is_some_and(|mode| mode & S_IFMT == S_IFLNK) {
            let mut target = String::new();
            member
                .read_to_string(&mut target)
                .with_context(|| format!("Failed to read symlink target of '{name}'"))?;
            EntryKind::Symlink(target)
        } else {
            EntryKind::File
        };

        let mut info = EntryInfo::new(name, kind);
        if let Some(mode) = unix_mode {
            info.mode = mode & 0o7777;
        }
        if info.kind == EntryKind::File {
            info.size = member.size();
        }
        info.mtime = from_zip_time(member.last_modified());
        debug!("zip member: {} ({} bytes)", info.name, info.size);

        if info.kind == EntryKind::File {
            visitor(&info, &mut member)?;
        } else {
            visitor(&info, &mut io::empty())?;
        }
    }
    Ok(())
}

/// ZIP timestamps are local DOS times without a zone; they are taken as UTC.
fn from_zip_time(time: zip::DateTime) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(
        i32::from(time.year()),
        u32::from(time.month()),
        u32::from(time.day()),
    )
    .and_then(|date| {
        date.and_hms_opt(
            u32::from(time.hour()),
            u32::from(time.minute()),
            u32::from(time.second()),
        )
    })
    .map(|naive| naive.and_utc())
    .unwrap_or_default()
}

/// DOS times cannot represent dates before 1980; those fall back to the ZIP epoch.
fn zip_time(time: DateTime<Utc>) -> zip::DateTime {
    let (Ok(year), Ok(month), Ok(day), Ok(hour), Ok(minute), Ok(second)) = (
        u16::try_from(time.year()),
        u8::try_from(time.month()),
        u8::try_from(time.day()),
        u8::try_from(time.hour()),
        u8::try_from(time.minute()),
        u8::try_from(time.second()),
    ) else {
        return zip::DateTime::default();
    };
    zip::DateTime::from_date_and_time(year, month, day, hour, minute, second).unwrap_or_default()
}
