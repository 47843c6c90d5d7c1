//! # xpld Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared utilities used by the command handlers, kept apart from
//! command-specific logic (`commands::`) and core infrastructure (`core::`).
//!
//! ## Architecture
//!
//! - **`archive`**: Format identification, archive creation and reading, and
//!   the in-memory virtual filesystem over an archive's members.
//! - **`fs`**: Filesystem operations for materialising extracted members.
//! - **`ui`**: Terminal presentation helpers (human sizes, mode strings, colour).
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::{archive::fs::ArchiveFs, ui};
//! use crate::core::error::Result;
//! use std::path::Path;
//!
//! # fn run_example() -> Result<()> {
//! let index = ArchiveFs::open(Path::new("release.tar.gz"))?;
//! println!("{} entries, largest unit {}", index.len(), ui::format_bytes(1 << 20));
//! # Ok(())
//! # }
//! ```
//!

/// Archive formats, codecs, and the archive virtual filesystem.
pub mod archive;
/// Filesystem operations (directory creation, streaming writes, path safety).
pub mod fs;
/// Terminal presentation helpers for listings.
pub mod ui;
