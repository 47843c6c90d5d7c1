//! # Version Comparator (`commands::inspect::version`)
//!
//! File: cli/src/commands/inspect/version.rs
//!
//! ## Overview
//!
//! Extracts a dotted version token from a file name and compares tokens
//! numerically, segment by segment.
//!
//! - **Extraction**: the base name is split on `-`; the token is the first
//!   part that contains a `.` anywhere but at its first character. Names
//!   without such a part have no version.
//! - **Comparison**: the token is split on `.` and every segment is read as
//!   an unsigned integer, with non-numeric segments counting as `0`. Shared
//!   segments are compared in order; if they are all equal, the shorter
//!   token sorts first (`1.2 < 1.2.0`).
//!
//! ```text
//! pkg-1.2.tar.gz  -> "1.2.tar.gz" -> [1, 2, 0, 0]
//! tool-0.9-linux  -> "0.9"        -> [0, 9]
//! README          -> none
//! ```
//!

/// A parsed version token. The derived ordering is lexicographic over the
/// numeric segments, which gives the shorter-first rule for equal prefixes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(Vec<u64>);

impl Version {
    pub fn parse(token: &str) -> Version {
        Version(
            token
                .split('.')
                .map(|segment| segment.parse().unwrap_or(0))
                .collect(),
        )
    }

    pub fn segments(&self) -> &[u64] {
        &self.0
    }
}

/// Returns the version token of `base_name`, if one is present.
pub fn extract_token(base_name: &str) -> Option<&str> {
    base_name
        .split('-')
        .find(|part| part.find('.').is_some_and(|index| index > 0))
}
