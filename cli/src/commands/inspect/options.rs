//! # xpld Inspect Options (`commands::inspect::options`)
//!
//! File: cli/src/commands/inspect/options.rs
//!
//! ## Overview
//!
//! Defines the `xpld inspect` command-line arguments and turns them, together
//! with the `[inspect]` section of the configuration file, into a single
//! immutable `InspectOptions` value. Every pipeline stage receives only the
//! slice of options it needs:
//!
//! - `FilterOptions` for the predicate filters,
//! - `SortOptions` for the comparator and post-processing,
//! - `DisplayOptions` for the renderers.
//!
//! ## Precedence
//!
//! Explicit command-line values win. Where a flag was not given, the config
//! file's value is used, then the built-in default. Boolean flags can only
//! switch a feature on; a config file that enables `color` therefore keeps
//! colour on for every run using that file.
//!
use crate::core::config::InspectConfig;
use crate::core::error::{Result, XpldError};
use clap::{Args, ValueEnum};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Key used to order listing entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Extension,
    Version,
    Size,
    Atime,
    Ctime,
    Mtime,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Extension => "extension",
            SortKey::Version => "version",
            SortKey::Size => "size",
            SortKey::Atime => "atime",
            SortKey::Ctime => "ctime",
            SortKey::Mtime => "mtime",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The renderer used for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Tree,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Tree => "tree",
        })
    }
}

/// # Inspect Command Arguments (`InspectArgs`)
///
/// Arguments accepted by `xpld inspect`.
#[derive(Args, Debug, Default)]
pub struct InspectArgs {
    /// Archive file to inspect
    pub archive: Option<PathBuf>,

    /// Print the listing as a JSON array
    #[arg(long, conflicts_with_all = ["txt", "tree"])]
    pub json: bool,

    /// Print one line per entry (the default)
    #[arg(long, conflicts_with = "tree")]
    pub txt: bool,

    /// Print the listing as an indented tree
    #[arg(long)]
    pub tree: bool,

    /// Colorize names by entry type
    #[arg(short, long)]
    pub color: bool,

    /// Show entry sizes in bytes
    #[arg(short, long)]
    pub sizes: bool,

    /// Sort entries by this key
    #[arg(long, value_enum)]
    pub sort: Option<SortKey>,

    /// Reverse the sort order
    #[arg(short, long)]
    pub reverse: bool,

    /// List directories before files
    #[arg(short, long)]
    pub dirs_first: bool,

    /// Include hidden entries (names starting with '.')
    #[arg(short, long)]
    pub all: bool,

    /// List directories only
    #[arg(long)]
    pub dirs_only: bool,

    /// Prefix names with the archive path
    #[arg(long)]
    pub full_path: bool,

    /// Ignore case when sorting by name and matching patterns
    #[arg(long)]
    pub ignore_case: bool,

    /// Descend at most this many levels below the top level
    #[arg(long, value_name = "N")]
    pub depth: Option<usize>,

    /// Only list entries whose name matches this glob
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Do not list entries whose name matches this glob
    #[arg(long, value_name = "GLOB")]
    pub ipattern: Option<String>,

    /// Apply --pattern and --ipattern to directories too
    #[arg(long)]
    pub match_dirs: bool,

    /// Omit directories with no files below them (tree view)
    #[arg(long)]
    pub prune: bool,

    /// Show sizes with binary unit suffixes (K, M, G, ...)
    #[arg(long)]
    pub unit_size: bool,

    /// Show the owner uid
    #[arg(long)]
    pub show_uid: bool,

    /// Show the group gid
    #[arg(long)]
    pub show_gid: bool,

    /// Show the last modification time
    #[arg(long)]
    pub last_mod: bool,

    /// Show the status change time when recorded
    #[arg(long)]
    pub show_ctime: bool,

    /// Show the last access time when recorded
    #[arg(long)]
    pub show_atime: bool,

    /// Quote names
    #[arg(long)]
    pub quotes: bool,

    /// Show inode numbers when recorded
    #[arg(long)]
    pub inodes: bool,

    /// Show device numbers when recorded
    #[arg(long)]
    pub device: bool,

    /// Do not draw tree connectors
    #[arg(long)]
    pub no_indent: bool,
}

/// Inclusion and exclusion rules applied while walking the archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub pattern: Option<String>,
    pub ipattern: Option<String>,
    pub match_dirs: bool,
    pub ignore_case: bool,
    pub all: bool,
    pub dirs_only: bool,
    /// Deepest separator count still listed; `None` is unlimited.
    pub depth: Option<usize>,
}

/// Ordering applied to the filtered entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOptions {
    pub key: SortKey,
    pub ignore_case: bool,
    pub reverse: bool,
    pub dirs_first: bool,
}

/// Columns and cosmetics for the renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    pub color: bool,
    pub sizes: bool,
    pub unit_size: bool,
    pub show_uid: bool,
    pub show_gid: bool,
    pub last_mod: bool,
    pub show_ctime: bool,
    pub show_atime: bool,
    pub inodes: bool,
    pub device: bool,
    pub quotes: bool,
    pub no_indent: bool,
    /// The tree summary then counts directories only.
    pub dirs_only: bool,
    pub prune: bool,
    /// Archive path used as the prefix for `--full-path`.
    pub full_path: Option<String>,
    /// The active sort key; `extension` and `version` add their own column.
    pub sort_key: SortKey,
}

/// The complete, immutable configuration of one `inspect` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectOptions {
    pub archive: PathBuf,
    pub format: OutputFormat,
    pub filter: FilterOptions,
    pub sort: SortOptions,
    pub display: DisplayOptions,
}

impl InspectOptions {
    /// # Build Options (`from_args`)
    ///
    /// Merges parsed arguments with the config file's `[inspect]` section.
    ///
    /// ## Errors
    ///
    /// - `XpldError::MissingArgument` when no archive path was given.
    /// - `XpldError::UnsupportedTreeSort` when the tree view is combined with a
    ///   sort key it cannot honour. This is checked here so the archive is
    ///   never opened for a listing that cannot be rendered.
    pub fn from_args(args: &InspectArgs, config: &InspectConfig) -> Result<Self> {
        let archive = args
            .archive
            .clone()
            .ok_or_else(|| XpldError::MissingArgument("archive".into()))?;

        let format = if args.json {
            OutputFormat::Json
        } else if args.tree {
            OutputFormat::Tree
        } else if args.txt {
            OutputFormat::Text
        } else {
            config.format.unwrap_or_default()
        };
        let sort_key = args.sort.or(config.sort).unwrap_or_default();
        let ignore_case = args.ignore_case || config.ignore_case.unwrap_or(false);

        if format == OutputFormat::Tree {
            super::render::tree::check_sort_key(sort_key)?;
        }

        let options = InspectOptions {
            format,
            filter: FilterOptions {
                pattern: args.pattern.clone(),
                ipattern: args.ipattern.clone(),
                match_dirs: args.match_dirs,
                ignore_case,
                all: args.all || config.all.unwrap_or(false),
                dirs_only: args.dirs_only,
                depth: args.depth,
            },
            sort: SortOptions {
                key: sort_key,
                ignore_case,
                reverse: args.reverse,
                dirs_first: args.dirs_first || config.dirs_first.unwrap_or(false),
            },
            display: DisplayOptions {
                color: args.color || config.color.unwrap_or(false),
                sizes: args.sizes,
                unit_size: args.unit_size || config.unit_size.unwrap_or(false),
                show_uid: args.show_uid,
                show_gid: args.show_gid,
                last_mod: args.last_mod,
                show_ctime: args.show_ctime,
                show_atime: args.show_atime,
                inodes: args.inodes,
                device: args.device,
                quotes: args.quotes,
                no_indent: args.no_indent,
                dirs_only: args.dirs_only,
                prune: args.prune,
                full_path: args
                    .full_path
                    .then(|| archive.to_string_lossy().into_owned()),
                sort_key,
            },
            archive,
        };
        debug!("Effective inspect options: {:?}", options);
        Ok(options)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn args_for(archive: &str) -> InspectArgs {
        InspectArgs {
            archive: Some(PathBuf::from(archive)),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let options = InspectOptions::from_args(&args_for("a.tar"), &InspectConfig::default())?;
        assert_eq!(options.format, OutputFormat::Text);
        assert_eq!(options.sort.key, SortKey::Name);
        assert_eq!(options.filter.depth, None);
        assert!(!options.filter.all);
        assert_eq!(options.display.full_path, None);
        Ok(())
    }

    #[test]
    fn test_missing_archive() {
        let err =
            InspectOptions::from_args(&InspectArgs::default(), &InspectConfig::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<XpldError>(),
            Some(XpldError::MissingArgument(_))
        ));
    }

    #[test]
    fn test_config_supplies_defaults_and_args_win() -> Result<()> {
        let config = InspectConfig {
            format: Some(OutputFormat::Json),
            sort: Some(SortKey::Size),
            dirs_first: Some(true),
            ..Default::default()
        };
        let options = InspectOptions::from_args(&args_for("a.tar"), &config)?;
        assert_eq!(options.format, OutputFormat::Json);
        assert_eq!(options.sort.key, SortKey::Size);
        assert!(options.sort.dirs_first);

        let mut args = args_for("a.tar");
        args.tree = true;
        args.sort = Some(SortKey::Version);
        let options = InspectOptions::from_args(&args, &config)?;
        assert_eq!(options.format, OutputFormat::Tree);
        assert_eq!(options.sort.key, SortKey::Version);
        Ok(())
    }

    #[test]
    fn test_tree_refuses_atime_and_extension() {
        for key in [SortKey::Atime, SortKey::Extension] {
            let mut args = args_for("a.tar");
            args.tree = true;
            args.sort = Some(key);
            let err = InspectOptions::from_args(&args, &InspectConfig::default()).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("{key} sort is unsupported when using `--tree`")
            );
        }
    }

    #[test]
    fn test_full_path_uses_archive_path() -> Result<()> {
        let mut args = args_for("dist/pkg.tar.gz");
        args.full_path = true;
        let options = InspectOptions::from_args(&args, &InspectConfig::default())?;
        assert_eq!(options.display.full_path.as_deref(), Some("dist/pkg.tar.gz"));
        Ok(())
    }
}
