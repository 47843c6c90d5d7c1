//! # Text Renderer (`commands::inspect::render::text`)
//!
//! File: cli/src/commands/inspect/render/text.rs
//!
//! One line per entry: the enabled metadata columns separated by single
//! spaces, then the name. Without columns the line is just the name.
//!
//! ```text
//!       4096 2023-11-14T22:13:20Z a/
//!         12 2023-11-14T22:13:20Z a/x.txt
//! ```
//!
use super::{decorate, full_name, metadata_fields};
use crate::commands::inspect::entry::Entry;
use crate::commands::inspect::options::DisplayOptions;
use crate::core::error::Result;
use std::io::Write;

pub fn render(entries: &[Entry], display: &DisplayOptions, out: &mut dyn Write) -> Result<()> {
    for entry in entries {
        let name = decorate(entry, full_name(&entry.name, display), display);
        let fields = metadata_fields(entry, display);
        if fields.is_empty() {
            writeln!(out, "{name}")?;
        } else {
            writeln!(out, "{} {}", fields.join(" "), name)?;
        }
    }
    Ok(())
}
