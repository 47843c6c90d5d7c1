//! # xpld Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the top-level commands of the xpld CLI and the
//! arguments that `create` and `extract` share.
//!
//! ## Commands
//!
//! - `create`: Archive a file or directory tree
//! - `extract`: Extract an archive into a directory
//! - `inspect`: List an archive's contents (filter, sort, render)
//!
//! Each command defines its own arguments structure and handler function.
//!
use clap::Args;
use std::path::PathBuf;

/// Creates archives from files and directories.
pub mod create;
/// Extracts archives to a directory.
pub mod extract;
/// Lists archive contents. Includes the filter, sort, and render pipeline.
pub mod inspect;

/// # Shared Archive Arguments (`CommonArgs`)
///
/// Output path and metadata handling flags accepted by both `create` and
/// `extract`.
#[derive(Args, Debug, Default, Clone)]
pub struct CommonArgs {
    /// Output archive (create) or directory (extract)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Do not keep permission bits; directories get 0755 and files the default mode
    #[arg(long)]
    pub no_preserve_permissions: bool,

    /// Keep owner and group ids (Unix only)
    #[arg(long)]
    pub preserve_ownership: bool,

    /// Keep only the owner id (Unix only)
    #[arg(long)]
    pub uid_ownership: bool,

    /// Leave root-owned entries with the current user's ownership
    #[arg(long)]
    pub ignore_root_ownership: bool,
}

/// Which ownership ids are carried over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnershipPolicy {
    #[default]
    Ignore,
    Full,
    UidOnly,
}

/// Owner ids to record or restore, after applying the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ownership {
    pub policy: OwnershipPolicy,
    pub ignore_root: bool,
}

impl Ownership {
    /// The `(uid, gid)` pair that should be applied to a member owned by
    /// `uid:gid`. `None` leaves that id unchanged.
    pub fn select(&self, uid: Option<u64>, gid: Option<u64>) -> (Option<u64>, Option<u64>) {
        if self.ignore_root && uid == Some(0) {
            return (None, None);
        }
        match self.policy {
            OwnershipPolicy::Ignore => (None, None),
            OwnershipPolicy::Full => (uid, gid),
            OwnershipPolicy::UidOnly => (uid, None),
        }
    }
}

impl CommonArgs {
    pub fn ownership(&self) -> Ownership {
        let policy = if self.preserve_ownership {
            OwnershipPolicy::Full
        } else if self.uid_ownership {
            OwnershipPolicy::UidOnly
        } else {
            OwnershipPolicy::Ignore
        };
        Ownership {
            policy,
            ignore_root: self.ignore_root_ownership,
        }
    }
}
