//! # xpld Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Filesystem helpers used by `xpld extract` when writing members to disk.
//!
//! - **`io`**: Directory creation, streaming file writes, and safe mapping
//!   of member names onto the output directory.
//!
//! The structure requires importing from the submodule
//! (e.g., `crate::common::fs::io::ensure_dir_exists`).
//!

/// Basic file I/O operations (`ensure_dir_exists`, `write_stream_to_file`, `resolve_member_path`).
pub mod io;
