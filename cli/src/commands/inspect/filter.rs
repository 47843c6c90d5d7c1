//! # Predicate Filters (`commands::inspect::filter`)
//!
//! File: cli/src/commands/inspect/filter.rs
//!
//! ## Overview
//!
//! Decides, for every entry met while walking an archive, whether it is
//! listed and whether the walk descends below it. The checks run in this
//! order and the first failing one decides:
//!
//! 1. **Depth**: entries below the configured depth are dropped and such
//!    directories pruned. A directory exactly at the limit is listed, but
//!    nothing below it can qualify, so it is not descended into either.
//! 2. **Hidden**: base names starting with `.` are dropped unless `--all`;
//!    hidden directories are pruned.
//! 3. **Directories only**: non-directories are dropped.
//! 4. **Pattern**: entries whose base name does not match are dropped.
//! 5. **Inverse pattern**: entries whose base name matches are dropped.
//!
//! Directories are only subject to the two glob checks with `--match-dirs`;
//! a directory that fails them is still descended into.
//!
//! ## Glob Matching
//!
//! Globs are compiled with `globset`, case-insensitively under
//! `--ignore-case`. A glob that fails to compile matches nothing: `--pattern`
//! then lists no files, `--ipattern` excludes nothing. Both cases are logged.
//!
use super::entry::Entry;
use super::options::FilterOptions;
use crate::common::archive::fs::{ArchiveFs, WalkControl};
use crate::core::error::Result;
use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, trace, warn};

/// The outcome of filtering one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub include: bool,
    /// Whether the walk continues below this entry. Ignored for non-directories.
    pub descend: bool,
}

impl Decision {
    const PRUNE: Decision = Decision {
        include: false,
        descend: false,
    };
}

/// A compiled glob, or one that never matches because compilation failed.
#[derive(Debug, Clone)]
enum Matcher {
    Glob(GlobMatcher),
    Never,
}

impl Matcher {
    fn compile(glob: &str, ignore_case: bool) -> Matcher {
        match GlobBuilder::new(glob)
            .case_insensitive(ignore_case)
            .literal_separator(true)
            .build()
        {
            Ok(glob) => Matcher::Glob(glob.compile_matcher()),
            Err(e) => {
                warn!("Invalid glob pattern '{}' matches nothing: {}", glob, e);
                Matcher::Never
            }
        }
    }

    fn is_match(&self, name: &str) -> bool {
        match self {
            Matcher::Glob(matcher) => matcher.is_match(name),
            Matcher::Never => false,
        }
    }
}

/// The active predicate filters with their globs compiled once.
#[derive(Debug, Clone)]
pub struct EntryFilter<'o> {
    options: &'o FilterOptions,
    pattern: Option<Matcher>,
    ipattern: Option<Matcher>,
}

impl<'o> EntryFilter<'o> {
    pub fn new(options: &'o FilterOptions) -> Self {
        let compile = |glob: &Option<String>| {
            glob.as_deref()
                .map(|glob| Matcher::compile(glob, options.ignore_case))
        };
        EntryFilter {
            pattern: compile(&options.pattern),
            ipattern: compile(&options.ipattern),
            options,
        }
    }

    /// # Filter One Entry (`decide`)
    ///
    /// Returns whether `entry` is listed and whether its subtree is walked.
    pub fn decide(&self, entry: &Entry) -> Decision {
        let options = self.options;
        let is_dir = entry.is_dir();
        let mut descend = true;

        if let Some(max_depth) = options.depth {
            let depth = entry.depth();
            if depth > max_depth {
                return Decision::PRUNE;
            }
            if depth == max_depth {
                descend = false;
            }
        }
        let rejected = Decision {
            include: false,
            descend,
        };

        if !options.all && entry.is_hidden() {
            return Decision::PRUNE;
        }
        if options.dirs_only && !is_dir {
            return rejected;
        }

        let globs_apply = !is_dir || options.match_dirs;
        if globs_apply {
            let name = entry.base_name();
            if let Some(pattern) = &self.pattern {
                if !pattern.is_match(name) {
                    return rejected;
                }
            }
            if let Some(ipattern) = &self.ipattern {
                if ipattern.is_match(name) {
                    return rejected;
                }
            }
        }

        Decision {
            include: true,
            descend,
        }
    }
}

/// # Collect Listing Entries (`collect_entries`)
///
/// Walks `fs` depth-first in lexical order and returns the entries that pass
/// the filters, in walk order.
pub fn collect_entries(fs: &ArchiveFs, options: &FilterOptions) -> Result<Vec<Entry>> {
    let filter = EntryFilter::new(options);
    let mut entries = Vec::new();
    fs.walk(|info| {
        let entry = Entry::new(info.clone());
        let decision = filter.decide(&entry);
        trace!("{} -> {:?}", entry.name, decision);
        if decision.include {
            entries.push(entry);
        }
        Ok(if decision.descend {
            WalkControl::Continue
        } else {
            WalkControl::SkipDir
        })
    })?;
    debug!("{} entries passed the filters", entries.len());
    Ok(entries)
}
