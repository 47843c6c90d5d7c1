//! # Listing Renderers (`commands::inspect::render`)
//!
//! File: cli/src/commands/inspect/render/mod.rs
//!
//! ## Overview
//!
//! Turns the final, sorted entry sequence into output. Exactly one renderer
//! runs per listing:
//!
//! - **`text`**: one line per entry, metadata columns before the name.
//! - **`json`**: a pretty-printed JSON array.
//! - **`tree`**: an indented tree under a `.` root, with a summary line.
//!
//! Renderers only read the entries. The helpers here build the pieces that
//! the text and tree views share: the metadata columns and the printed name.
//!
//! ## Metadata Columns
//!
//! Columns appear in this fixed order, each only when its flag is set and
//! the archive recorded the value:
//!
//! ```text
//! size  uid=N  gid=N  mtime  ino=N  dev=N  ctime  atime  ext=E  ver=V
//! ```
//!
pub mod json;
pub mod text;
pub mod tree;

use super::entry::Entry;
use super::options::{DisplayOptions, OutputFormat, SortKey};
use crate::common::ui;
use crate::core::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;

/// Renders `entries` with the renderer selected by `format`.
pub fn render(
    format: OutputFormat,
    entries: &[Entry],
    display: &DisplayOptions,
    out: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Text => text::render(entries, display, out),
        OutputFormat::Json => json::render(entries, display, out),
        OutputFormat::Tree => tree::render(entries, display, out),
    }
}

/// RFC 3339 with whole seconds and a `Z` suffix, e.g. `2023-11-14T22:13:20Z`.
pub(crate) fn rfc3339(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The size column: raw bytes right-aligned to ten places, or a
/// human-readable size under `--unit-size`.
pub(crate) fn size_field(size: u64, display: &DisplayOptions) -> String {
    if display.unit_size {
        ui::format_bytes(size)
    } else {
        format!("{size:>10}")
    }
}

/// # Metadata Columns (`metadata_fields`)
///
/// The enabled, available metadata values for `entry`, in display order.
pub(crate) fn metadata_fields(entry: &Entry, display: &DisplayOptions) -> Vec<String> {
    let info = &entry.info;
    let mut fields = Vec::new();
    if display.sizes || display.unit_size {
        fields.push(size_field(info.size, display));
    }
    if display.show_uid {
        fields.extend(info.uid.map(|uid| format!("uid={uid}")));
    }
    if display.show_gid {
        fields.extend(info.gid.map(|gid| format!("gid={gid}")));
    }
    if display.last_mod {
        fields.push(rfc3339(&info.mtime));
    }
    if display.inodes {
        fields.extend(info.inode.map(|inode| format!("ino={inode}")));
    }
    if display.device {
        fields.extend(info.device.map(|device| format!("dev={device}")));
    }
    if display.show_ctime {
        fields.extend(info.ctime.as_ref().map(rfc3339));
    }
    if display.show_atime {
        fields.extend(info.atime.as_ref().map(rfc3339));
    }
    match display.sort_key {
        SortKey::Extension => fields.push(format!("ext={}", entry.extension())),
        SortKey::Version => {
            fields.extend(entry.version_token().map(|version| format!("ver={version}")));
        }
        _ => {}
    }
    fields
}

/// Prefixes `name` with the archive path under `--full-path`.
pub(crate) fn full_name(name: &str, display: &DisplayOptions) -> String {
    match &display.full_path {
        Some(archive) => format!("{}/{}", archive.trim_end_matches('/'), name),
        None => name.to_string(),
    }
}

/// Applies `--quotes` and then `--color` to an already chosen name.
pub(crate) fn decorate(entry: &Entry, name: String, display: &DisplayOptions) -> String {
    let name = if display.quotes {
        format!("{name:?}")
    } else {
        name
    };
    if display.color {
        ui::colorize(&entry.info, &name)
    } else {
        name
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::archive::{timestamp, EntryInfo, EntryKind};

    fn entry() -> Entry {
        let mut info = EntryInfo::new("dist/pkg-1.2.3.tar.gz", EntryKind::File);
        info.size = 2048;
        info.uid = Some(1000);
        info.gid = Some(100);
        info.mtime = timestamp(1_700_000_000);
        Entry::new(info)
    }

    #[test]
    fn test_fields_follow_fixed_order() {
        let display = DisplayOptions {
            sizes: true,
            show_uid: true,
            show_gid: true,
            last_mod: true,
            inodes: true,
            sort_key: SortKey::Version,
            ..Default::default()
        };
        assert_eq!(
            metadata_fields(&entry(), &display),
            [
                "      2048",
                "uid=1000",
                "gid=100",
                "2023-11-14T22:13:20Z",
                "ver=1.2.3.tar.gz"
            ]
        );
    }

    #[test]
    fn test_absent_values_are_not_rendered() {
        let display = DisplayOptions {
            inodes: true,
            device: true,
            show_ctime: true,
            show_atime: true,
            ..Default::default()
        };
        assert!(metadata_fields(&entry(), &display).is_empty());
    }

    #[test]
    fn test_unit_size_and_extension() {
        let display = DisplayOptions {
            unit_size: true,
            sort_key: SortKey::Extension,
            ..Default::default()
        };
        assert_eq!(metadata_fields(&entry(), &display), ["2.0K", "ext=gz"]);
    }

    #[test]
    fn test_name_decoration() {
        let display = DisplayOptions {
            quotes: true,
            full_path: Some("out/pkg.tar".into()),
            ..Default::default()
        };
        let e = entry();
        let name = decorate(&e, full_name(&e.name, &display), &display);
        assert_eq!(name, "\"out/pkg.tar/dist/pkg-1.2.3.tar.gz\"");
    }
}
