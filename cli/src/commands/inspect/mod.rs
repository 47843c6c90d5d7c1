//! # xpld Inspect Command
//!
//! File: cli/src/commands/inspect/mod.rs
//!
//! ## Overview
//!
//! Lists the contents of an archive without extracting it. The listing is a
//! single synchronous pass through four stages:
//!
//! 1. **Index**: open the archive and build its virtual filesystem
//!    (`common::archive::fs::ArchiveFs`).
//! 2. **Filter**: walk the index depth-first, applying the predicate filters
//!    (`filter`).
//! 3. **Sort**: order the surviving entries (`sort`, `version`).
//! 4. **Render**: print them as text, JSON, or a tree (`render`).
//!
//! Every stage receives its part of one immutable `InspectOptions` value,
//! built from the arguments and the configuration file (`options`).
//!
//! ## Examples
//!
//! ```bash
//! # Plain listing
//! xpld inspect release.tar.gz
//!
//! # Largest files first, human-readable sizes
//! xpld inspect release.tar.gz --sort size -r --unit-size
//!
//! # Two levels of directories as a tree
//! xpld inspect release.zip --tree --dirs-only --depth 1
//! ```
//!
use crate::common::archive::fs::ArchiveFs;
use crate::core::config;
use crate::core::error::Result;
use anyhow::Context;
use std::io::{self, BufWriter, Write};
use tracing::{debug, info};

pub mod entry;
pub mod filter;
pub mod options;
pub mod render;
pub mod sort;
pub mod version;

pub use options::InspectArgs;
use options::InspectOptions;

/// # Handle Inspect Command (`handle_inspect`)
///
/// Entry point for `xpld inspect`. Loads configuration, builds the options,
/// and writes the listing to standard output.
///
/// ## Errors
///
/// Returns an error if the archive argument is missing, the configuration is
/// invalid, the archive cannot be read or identified, or the tree view is
/// combined with an unsupported sort key.
pub fn handle_inspect(args: InspectArgs) -> Result<()> {
    info!("Handling inspect command with args: {:?}", args);
    let cfg = config::load_config()?;
    let options = InspectOptions::from_args(&args, &cfg.inspect)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    inspect_archive(&options, &mut out)?;
    out.flush().context("Failed to write listing")?;
    Ok(())
}

/// # Inspect Archive (`inspect_archive`)
///
/// Runs the listing pipeline for `options.archive` and writes the rendered
/// result to `out`.
pub fn inspect_archive(options: &InspectOptions, out: &mut dyn Write) -> Result<()> {
    let index = ArchiveFs::open(&options.archive)
        .with_context(|| format!("Failed to inspect {}", options.archive.display()))?;
    if index.is_empty() {
        debug!("{} has no members", options.archive.display());
    }

    let mut entries = filter::collect_entries(&index, &options.filter)?;
    sort::sort_entries(&mut entries, &options.sort);
    debug!(
        "Rendering {} of {} entries as {}",
        entries.len(),
        index.len(),
        options.format
    );
    render::render(options.format, &entries, &options.display, out)
}
