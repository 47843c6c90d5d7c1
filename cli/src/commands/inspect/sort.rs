//! # Sort Comparator (`commands::inspect::sort`)
//!
//! File: cli/src/commands/inspect/sort.rs
//!
//! ## Overview
//!
//! Orders the filtered entries by the selected key, then applies the two
//! post-processing steps:
//!
//! 1. **Directories first**: a stable partition, so the key order is kept
//!    inside both groups.
//! 2. **Reverse**: the whole sequence is reversed, after the partition.
//!
//! Every comparison ends with a name tie-break, which makes the comparator a
//! total order: equal keys never depend on walk order. Entries without a
//! recorded `ctime`/`atime`, and names without a version token, sort before
//! those that have one.
//!
use super::entry::Entry;
use super::options::{SortKey, SortOptions};
use std::cmp::Ordering;

/// Sorts `entries` in place according to `options`.
pub fn sort_entries(entries: &mut [Entry], options: &SortOptions) {
    entries.sort_by(|a, b| compare(a, b, options.key, options.ignore_case));
    if options.dirs_first {
        entries.sort_by_key(|entry| !entry.is_dir());
    }
    if options.reverse {
        entries.reverse();
    }
}

/// Compares two entries by `key`, falling back to their names.
pub fn compare(a: &Entry, b: &Entry, key: SortKey, ignore_case: bool) -> Ordering {
    let by_key = match key {
        SortKey::Name => Ordering::Equal,
        SortKey::Size => a.info.size.cmp(&b.info.size),
        SortKey::Mtime => a.info.mtime.cmp(&b.info.mtime),
        SortKey::Ctime => a.info.ctime.cmp(&b.info.ctime),
        SortKey::Atime => a.info.atime.cmp(&b.info.atime),
        SortKey::Extension => a.extension().cmp(b.extension()),
        SortKey::Version => a.version().cmp(&b.version()),
    };
    by_key.then_with(|| compare_names(&a.name, &b.name, ignore_case))
}

/// Byte-wise name order; with `ignore_case`, lowercase first and exact
/// bytes only between names that differ in case alone.
fn compare_names(a: &str, b: &str, ignore_case: bool) -> Ordering {
    if ignore_case {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    } else {
        a.cmp(b)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::archive::{timestamp, EntryInfo, EntryKind};
    use clap::ValueEnum;

    fn file(name: &str) -> Entry {
        Entry::new(EntryInfo::new(name, EntryKind::File))
    }

    fn dir(name: &str) -> Entry {
        Entry::new(EntryInfo::new(name, EntryKind::Dir))
    }

    fn sized(name: &str, size: u64) -> Entry {
        let mut info = EntryInfo::new(name, EntryKind::File);
        info.size = size;
        Entry::new(info)
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn sorted(mut entries: Vec<Entry>, options: SortOptions) -> Vec<Entry> {
        sort_entries(&mut entries, &options);
        entries
    }

    #[test]
    fn test_name_sort() {
        let entries = sorted(
            vec![file("b.log"), file("a/x.txt"), dir("a")],
            SortOptions::default(),
        );
        assert_eq!(names(&entries), ["a/", "a/x.txt", "b.log"]);
    }

    #[test]
    fn test_ignore_case_name_sort() {
        let options = SortOptions {
            ignore_case: true,
            ..Default::default()
        };
        let entries = sorted(vec![file("b"), file("B"), file("a"), file("C")], options);
        assert_eq!(names(&entries), ["a", "B", "b", "C"]);

        let entries = sorted(vec![file("b"), file("a"), file("C")], SortOptions::default());
        assert_eq!(names(&entries), ["C", "a", "b"]);
    }

    #[test]
    fn test_size_sort_breaks_ties_by_name() {
        let options = SortOptions {
            key: SortKey::Size,
            ..Default::default()
        };
        let entries = sorted(
            vec![sized("c", 10), sized("b", 5), sized("a", 10)],
            options,
        );
        assert_eq!(names(&entries), ["b", "a", "c"]);
    }

    #[test]
    fn test_missing_times_sort_first() {
        let mut early = EntryInfo::new("early", EntryKind::File);
        early.ctime = Some(timestamp(100));
        let mut late = EntryInfo::new("late", EntryKind::File);
        late.ctime = Some(timestamp(200));
        let options = SortOptions {
            key: SortKey::Ctime,
            ..Default::default()
        };
        let entries = sorted(
            vec![Entry::new(late), file("unknown"), Entry::new(early)],
            options,
        );
        assert_eq!(names(&entries), ["unknown", "early", "late"]);
    }

    #[test]
    fn test_version_sort() {
        let options = SortOptions {
            key: SortKey::Version,
            ..Default::default()
        };
        let entries = sorted(
            vec![
                file("pkg-1.10.0.tgz"),
                file("pkg-1.9.2.tgz"),
                file("README"),
                file("pkg-1.9.tgz"),
            ],
            options,
        );
        assert_eq!(
            names(&entries),
            ["README", "pkg-1.9.tgz", "pkg-1.9.2.tgz", "pkg-1.10.0.tgz"]
        );
    }

    #[test]
    fn test_extension_sort() {
        let options = SortOptions {
            key: SortKey::Extension,
            ..Default::default()
        };
        let entries = sorted(
            vec![file("b.txt"), file("a.zip"), file("Makefile"), file("a.txt")],
            options,
        );
        assert_eq!(names(&entries), ["Makefile", "a.txt", "b.txt", "a.zip"]);
    }

    #[test]
    fn test_dirs_first_is_stable_and_idempotent() {
        let options = SortOptions {
            dirs_first: true,
            ..Default::default()
        };
        let once = sorted(
            vec![file("a.txt"), dir("z"), file("b.txt"), dir("m")],
            options,
        );
        assert_eq!(names(&once), ["m/", "z/", "a.txt", "b.txt"]);
        let twice = sorted(once.clone(), options);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reverse_is_exact_inverse() {
        let stamped = |name: &str, size: u64, secs: i64| {
            let mut info = EntryInfo::new(name, EntryKind::File);
            info.size = size;
            info.mtime = timestamp(secs);
            info.ctime = Some(timestamp(secs * 2));
            info.atime = Some(timestamp(secs * 3));
            Entry::new(info)
        };
        let input = vec![
            stamped("pkg-1.10.tar", 1, 30),
            stamped("b.txt", 1, 10),
            sized("a.txt", 1),
            stamped("pkg-1.9.zip", 3, 20),
            dir("d"),
            dir("c-2.0"),
        ];
        for &key in SortKey::value_variants() {
            for dirs_first in [false, true] {
                let forward = sorted(
                    input.clone(),
                    SortOptions {
                        key,
                        dirs_first,
                        ..Default::default()
                    },
                );
                let mut backward = sorted(
                    input.clone(),
                    SortOptions {
                        key,
                        dirs_first,
                        reverse: true,
                        ..Default::default()
                    },
                );
                backward.reverse();
                assert_eq!(
                    forward, backward,
                    "reverse mismatch for {key} (dirs_first: {dirs_first})"
                );
            }
        }
    }

    #[test]
    fn test_reverse_applies_after_dirs_first() {
        let options = SortOptions {
            dirs_first: true,
            reverse: true,
            ..Default::default()
        };
        let entries = sorted(vec![file("a"), dir("b"), file("c")], options);
        assert_eq!(names(&entries), ["c", "a", "b/"]);
    }
}
