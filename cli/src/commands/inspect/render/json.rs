//! # JSON Renderer (`commands::inspect::render::json`)
//!
//! File: cli/src/commands/inspect/render/json.rs
//!
//! ## Overview
//!
//! Writes the listing as a JSON array, pretty-printed with two-space
//! indentation and followed by a newline. Every object carries `name`,
//! `size`, `mode` and `mtime`; the optional keys appear only when their flag
//! is set and the archive recorded the value.
//!
//! ```json
//! [
//!   {
//!     "name": "a/x.txt",
//!     "size": 12,
//!     "mode": "-rw-r--r--",
//!     "mtime": "2023-11-14T22:13:20Z",
//!     "uid": 1000
//!   }
//! ]
//! ```
//!
//! Names honour `--full-path`. Quoting and colour are text-only cosmetics
//! and never reach the JSON output.
//!
use super::full_name;
use crate::commands::inspect::entry::Entry;
use crate::commands::inspect::options::{DisplayOptions, SortKey};
use crate::common::ui;
use crate::core::error::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct JsonEntry<'e> {
    name: String,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_human: Option<String>,
    mode: String,
    mtime: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inode: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    device: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ctime: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    atime: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extension: Option<&'e str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'e str>,
}

impl<'e> JsonEntry<'e> {
    fn new(entry: &'e Entry, display: &DisplayOptions) -> Self {
        let info = &entry.info;
        let when = |enabled: bool, value: Option<u64>| value.filter(|_| enabled);
        JsonEntry {
            name: full_name(&entry.name, display),
            size: info.size,
            size_human: display.unit_size.then(|| ui::format_bytes(info.size)),
            mode: ui::mode_string(info),
            mtime: info.mtime,
            uid: when(display.show_uid, info.uid),
            gid: when(display.show_gid, info.gid),
            inode: when(display.inodes, info.inode),
            device: when(display.device, info.device),
            ctime: info.ctime.filter(|_| display.show_ctime),
            atime: info.atime.filter(|_| display.show_atime),
            extension: (display.sort_key == SortKey::Extension).then(|| entry.extension()),
            version: entry
                .version_token()
                .filter(|_| display.sort_key == SortKey::Version),
        }
    }
}

pub fn render(entries: &[Entry], display: &DisplayOptions, out: &mut dyn Write) -> Result<()> {
    let items: Vec<JsonEntry<'_>> = entries
        .iter()
        .map(|entry| JsonEntry::new(entry, display))
        .collect();
    serde_json::to_writer_pretty(&mut *out, &items).context("Failed to write JSON listing")?;
    writeln!(out)?;
    Ok(())
}
