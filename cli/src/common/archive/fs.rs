//! # Archive Virtual Filesystem (`common::archive::fs`)
//!
//! File: cli/src/common/archive/fs.rs
//!
//! ## Overview
//!
//! Presents an archive's member list as a directory tree that can be walked
//! like a real filesystem. Archives often omit entries for intermediate
//! directories (`a/b/c.txt` with no `a/` or `a/b/` member); the index
//! synthesises those so every member has a parent to be listed under.
//!
//! ## Architecture
//!
//! - `ArchiveFs::open` reads every member header once (content is skipped)
//!   and builds the index. The archive file is not kept open afterwards.
//! - Children of each directory are kept sorted by base name, so `walk`
//!   visits entries depth-first in lexical order, the same order a
//!   `read_dir`-based walk over sorted entries would produce.
//! - The walk visitor returns `WalkControl::SkipDir` to keep the walk out of
//!   a directory's subtree.
//!
//! Duplicate member names are kept as separate entries.
//!
use super::{format::Format, EntryInfo, EntryKind};
use crate::core::error::{Result, XpldError};
use anyhow::Context;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// What the walk should do after visiting an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    /// Do not descend into this directory. Ignored for non-directories.
    SkipDir,
}

/// An in-memory index of an archive's members.
#[derive(Debug, Default)]
pub struct ArchiveFs {
    entries: Vec<EntryInfo>,
    /// Parent path ("" for the root) to child indices, sorted by base name.
    children: HashMap<String, Vec<usize>>,
}

impl ArchiveFs {
    /// # Open Archive Filesystem (`open`)
    ///
    /// Identifies the archive at `path` and indexes all of its members.
    ///
    /// ## Errors
    ///
    /// - `XpldError::UnknownFormat` if the format cannot be identified.
    /// - `XpldError::UnsupportedOperation` if it is a bare compressed file.
    /// - Any I/O or container error while reading member headers.
    pub fn open(path: &Path) -> Result<ArchiveFs> {
        let mut file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let format = Format::identify_file(path, &mut file)?;
        if !format.is_archive() {
            return Err(XpldError::UnsupportedOperation {
                format: format.to_string(),
                operation: "inspect".into(),
            }
            .into());
        }

        let mut members = Vec::new();
        super::extract(&format, file, |member, _content| {
            members.push(member.clone());
            Ok(())
        })
        .with_context(|| format!("Failed to read archive {}", path.display()))?;

        info!("Indexed {} members from {}", members.len(), path.display());
        Ok(ArchiveFs::from_entries(members))
    }

    /// Builds the index from an already-enumerated member list.
    pub fn from_entries(members: Vec<EntryInfo>) -> ArchiveFs {
        let mut entries: Vec<EntryInfo> = Vec::with_capacity(members.len());
        for mut member in members {
            // Absolute names are listed relative to the archive root.
            let trimmed = member.name.trim_start_matches('/');
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.len() != member.name.len() {
                member.name = trimmed.to_string();
            }
            entries.push(member);
        }

        let mut known_dirs: HashSet<String> = entries
            .iter()
            .filter(|e| e.is_dir())
            .map(|e| e.name.clone())
            .collect();
        let mut synthesized = Vec::new();
        for entry in &entries {
            let mut parent = parent_of(&entry.name);
            while !parent.is_empty() && known_dirs.insert(parent.to_string()) {
                debug!("Synthesizing implicit directory '{}'", parent);
                synthesized.push(EntryInfo::new(parent, EntryKind::Dir));
                parent = parent_of(parent);
            }
        }
        entries.extend(synthesized);

        let mut children: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            children
                .entry(parent_of(&entry.name).to_string())
                .or_default()
                .push(index);
        }
        for list in children.values_mut() {
            // Stable: duplicates keep archive order.
            list.sort_by(|&a, &b| entries[a].base_name().cmp(entries[b].base_name()));
        }

        ArchiveFs { entries, children }
    }

    /// Number of indexed entries, implicit directories included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// # Walk the Tree (`walk`)
    ///
    /// Visits every entry depth-first, siblings in lexical order. A directory
    /// is visited before its children; returning `SkipDir` for it prunes the
    /// subtree. The first visitor error stops the walk and is returned.
    pub fn walk<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&EntryInfo) -> Result<WalkControl>,
    {
        let mut descended = HashSet::new();
        self.walk_dir("", &mut visit, &mut descended)
    }

    fn walk_dir<'a, F>(
        &'a self,
        dir: &str,
        visit: &mut F,
        descended: &mut HashSet<&'a str>,
    ) -> Result<()>
    where
        F: FnMut(&EntryInfo) -> Result<WalkControl>,
    {
        let Some(children) = self.children.get(dir) else {
            return Ok(());
        };
        for &index in children {
            let entry = &self.entries[index];
            let control = visit(entry)?;
            // A directory listed twice is only descended into once.
            if entry.is_dir()
                && control == WalkControl::Continue
                && descended.insert(entry.name.as_str())
            {
                self.walk_dir(&entry.name, visit, descended)?;
            }
        }
        Ok(())
    }
}

/// The parent path of a member name ("" at the top level).
fn parent_of(name: &str) -> &str {
    name.rsplit_once('/').map_or("", |(parent, _)| parent)
}
