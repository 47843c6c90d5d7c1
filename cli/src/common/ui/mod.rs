//! # xpld UI Utilities Module (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! Small presentation helpers shared by the listing renderers:
//!
//! - **`format_bytes`**: human-readable sizes with binary prefixes.
//! - **`mode_string`**: `ls`-style permission strings (`drwxr-xr-x`).
//! - **`colorize`**: ANSI colouring of names by entry type and permissions.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::ui;
//!
//! assert_eq!(ui::format_bytes(1024), "1.0K");
//! assert_eq!(ui::format_bytes(10240), "10K");
//! ```
//!
use crate::common::archive::{EntryInfo, EntryKind};

/// ANSI escape code to reset text formatting.
const RESET: &str = "\x1b[0m";
/// Bold blue, for directories.
const DIR_COLOR: &str = "\x1b[1;34m";
/// Bold cyan, for symbolic and hard links.
const LINK_COLOR: &str = "\x1b[1;36m";
/// Bold green, for files with any execute bit set.
const EXEC_COLOR: &str = "\x1b[1;32m";
/// Bold yellow, for devices, fifos and other special members.
const SPECIAL_COLOR: &str = "\x1b[1;33m";

/// Binary unit suffixes from kibi (1024) to exbi (1024^6).
const UNITS: [&str; 6] = ["K", "M", "G", "T", "P", "E"];

/// # Human-Readable Size (`format_bytes`)
///
/// Sizes below 1024 are printed as a plain integer. Larger sizes are scaled
/// to the largest unit whose value is at least 1 and printed with one
/// decimal place, or none once the scaled value reaches 10.
///
/// `999` → `"999"`, `1024` → `"1.0K"`, `10240` → `"10K"`, `1073741824` → `"1.0G"`.
pub fn format_bytes(size: u64) -> String {
    let mut unit = None;
    let mut divisor = 1u64;
    for (index, suffix) in UNITS.iter().enumerate() {
        let scale = 1u64 << (10 * (index + 1));
        if size >= scale {
            unit = Some(*suffix);
            divisor = scale;
        }
    }
    let Some(unit) = unit else {
        return size.to_string();
    };
    let scaled = size as f64 / divisor as f64;
    if scaled >= 10.0 {
        format!("{scaled:.0}{unit}")
    } else {
        format!("{scaled:.1}{unit}")
    }
}

/// # Permission String (`mode_string`)
///
/// Renders the type character followed by the nine permission characters,
/// with setuid/setgid/sticky folded into the execute positions as `ls` does.
pub fn mode_string(info: &EntryInfo) -> String {
    let type_char = match info.kind {
        EntryKind::Dir => 'd',
        EntryKind::Symlink(_) => 'l',
        EntryKind::File | EntryKind::HardLink(_) => '-',
        EntryKind::Other => '?',
    };
    let mode = info.mode;
    let mut out = String::with_capacity(10);
    out.push(type_char);
    for (shift, special, special_char) in [(6, 0o4000, 's'), (3, 0o2000, 's'), (0, 0o1000, 't')] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        let exec = bits & 0o1 != 0;
        out.push(match (mode & special != 0, exec) {
            (true, true) => special_char,
            (true, false) => special_char.to_ascii_uppercase(),
            (false, true) => 'x',
            (false, false) => '-',
        });
    }
    out
}

/// Wraps `text` in the ANSI colour for `info`'s type, or returns it as is
/// for plain, non-executable files.
pub fn colorize(info: &EntryInfo, text: &str) -> String {
    let color = match info.kind {
        EntryKind::Dir => Some(DIR_COLOR),
        EntryKind::Symlink(_) | EntryKind::HardLink(_) => Some(LINK_COLOR),
        EntryKind::Other => Some(SPECIAL_COLOR),
        EntryKind::File if info.mode & 0o111 != 0 => Some(EXEC_COLOR),
        EntryKind::File => None,
    };
    match color {
        Some(color) => format!("{color}{text}{RESET}"),
        None => text.to_string(),
    }
}
