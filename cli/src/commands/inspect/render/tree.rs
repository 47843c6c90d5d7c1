//! # Tree Renderer (`commands::inspect::render::tree`)
//!
//! File: cli/src/commands/inspect/render/tree.rs
//!
//! ## Overview
//!
//! Draws the filtered, sorted listing as a tree under a `.` root, similar to
//! the output of the `tree` command-line utility, followed by a summary line.
//!
//! ```text
//! .
//! ├── a
//! │   └── x.txt
//! └── b.log
//!
//! 1 directory, 2 files
//! ```
//!
//! ## Architecture
//!
//! - The tree is built from the entry sequence, which is already filtered and
//!   sorted, so each directory's children appear in the listing's order.
//!   Parents that were not themselves listed (a directory excluded by
//!   `--match-dirs`, or met after its children in a reversed order) are
//!   added where they are first needed.
//! - Printing recurses through the tree, keeping the connector prefix in one
//!   `String` that grows by `│   ` or `    ` per level and is truncated back
//!   on the way out.
//! - `--prune` drops directories that have no file anywhere below them.
//! - `--no-indent` prints the same lines without connectors.
//!
//! The `atime` and `extension` sort keys are refused (`check_sort_key`).
//!
use super::{decorate, full_name, metadata_fields};
use crate::commands::inspect::entry::Entry;
use crate::commands::inspect::options::{DisplayOptions, SortKey};
use crate::common::archive::{EntryInfo, EntryKind};
use crate::core::error::{Result, XpldError};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Write;
use tracing::debug;

// --- Constants for Tree Drawing ---

/// Connector for intermediate items in a directory listing ("T" shape).
const TEE: &str = "├── ";
/// Connector for the last item in a directory listing ("L" shape).
const ELBOW: &str = "└── ";
/// Vertical line used for ongoing indentation levels.
const PIPE: &str = "│   ";
/// Spacer used for indentation levels after the last item has been printed.
const SPACER: &str = "    ";

/// Index of the `.` root in the node arena.
const ROOT: usize = 0;

/// # Check Tree Sort Key (`check_sort_key`)
///
/// The tree view has no ordering for access times or extensions.
///
/// ## Errors
///
/// Returns `XpldError::UnsupportedTreeSort` for `SortKey::Atime` and
/// `SortKey::Extension`.
pub fn check_sort_key(key: SortKey) -> Result<()> {
    match key {
        SortKey::Atime | SortKey::Extension => Err(XpldError::UnsupportedTreeSort {
            key: key.to_string(),
        }
        .into()),
        _ => Ok(()),
    }
}

/// A node of the drawn tree.
struct Node<'e> {
    entry: Cow<'e, Entry>,
    children: Vec<usize>,
    /// Whether a regular (non-directory) entry exists at or below this node.
    has_file: bool,
}

/// Nodes in an arena, addressed by index; `dirs` maps a directory path to
/// its node.
struct Tree<'e> {
    nodes: Vec<Node<'e>>,
    dirs: HashMap<&'e str, usize>,
}

impl<'e> Tree<'e> {
    fn build(entries: &'e [Entry]) -> Tree<'e> {
        let root = Node {
            entry: Cow::Owned(Entry::new(EntryInfo::new("", EntryKind::Dir))),
            children: Vec::new(),
            has_file: false,
        };
        let mut tree = Tree {
            nodes: vec![root],
            dirs: HashMap::new(),
        };

        for entry in entries {
            let path = entry.info.name.as_str();
            if entry.is_dir() {
                if let Some(&existing) = tree.dirs.get(path) {
                    // Added earlier as a parent; it keeps that position.
                    if let Cow::Owned(_) = tree.nodes[existing].entry {
                        tree.nodes[existing].entry = Cow::Borrowed(entry);
                    } else {
                        debug!("Duplicate directory '{}' merged in tree view", path);
                    }
                    continue;
                }
            }
            let parent = tree.dir_node(parent_of(path));
            let index = tree.push(parent, Cow::Borrowed(entry));
            if entry.is_dir() {
                tree.dirs.insert(path, index);
            }
        }
        tree.mark_files(ROOT);
        tree
    }

    /// Returns the node for directory `path`, adding it and any missing
    /// ancestors.
    fn dir_node(&mut self, path: &'e str) -> usize {
        if path.is_empty() {
            return ROOT;
        }
        if let Some(&index) = self.dirs.get(path) {
            return index;
        }
        let parent = self.dir_node(parent_of(path));
        let implicit = Entry::new(EntryInfo::new(path, EntryKind::Dir));
        let index = self.push(parent, Cow::Owned(implicit));
        self.dirs.insert(path, index);
        index
    }

    fn push(&mut self, parent: usize, entry: Cow<'e, Entry>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            entry,
            children: Vec::new(),
            has_file: false,
        });
        self.nodes[parent].children.push(index);
        index
    }

    fn mark_files(&mut self, index: usize) -> bool {
        let mut has_file = !self.nodes[index].entry.is_dir();
        for child in self.nodes[index].children.clone() {
            has_file |= self.mark_files(child);
        }
        self.nodes[index].has_file = has_file;
        has_file
    }
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

/// Running totals for the summary line.
#[derive(Debug, Default)]
struct Counts {
    dirs: usize,
    files: usize,
}

/// # Render Tree (`render`)
///
/// Writes the tree for `entries` and the summary line to `out`.
///
/// ## Errors
///
/// Returns `XpldError::UnsupportedTreeSort` if the active sort key cannot be
/// drawn, or an I/O error from `out`.
pub fn render(entries: &[Entry], display: &DisplayOptions, out: &mut dyn Write) -> Result<()> {
    check_sort_key(display.sort_key)?;
    let tree = Tree::build(entries);
    debug!("Tree view with {} nodes", tree.nodes.len() - 1);

    writeln!(out, ".")?;
    let mut counts = Counts::default();
    walk_and_print(&tree, ROOT, &mut String::new(), display, &mut counts, out)?;

    writeln!(out)?;
    let directories = plural(counts.dirs, "directory", "directories");
    if display.dirs_only {
        writeln!(out, "{directories}")?;
    } else {
        writeln!(
            out,
            "{directories}, {}",
            plural(counts.files, "file", "files")
        )?;
    }
    Ok(())
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{count} {}", if count == 1 { one } else { many })
}

/// # Recursive Tree Printer (`walk_and_print`)
///
/// Prints the children of `index`, each behind the accumulated `prefix` and
/// its connector, recursing into directories.
fn walk_and_print(
    tree: &Tree<'_>,
    index: usize,
    prefix: &mut String,
    display: &DisplayOptions,
    counts: &mut Counts,
    out: &mut dyn Write,
) -> Result<()> {
    let visible: Vec<usize> = tree.nodes[index]
        .children
        .iter()
        .copied()
        .filter(|&child| {
            let node = &tree.nodes[child];
            !(display.prune && node.entry.is_dir() && !node.has_file)
        })
        .collect();

    let count = visible.len();
    for (position, &child) in visible.iter().enumerate() {
        let is_last = position + 1 == count;
        let node = &tree.nodes[child];
        let entry: &Entry = &node.entry;

        if !display.no_indent {
            write!(out, "{}{}", prefix, if is_last { ELBOW } else { TEE })?;
        }
        writeln!(out, "{}", node_line(entry, display))?;

        if entry.is_dir() {
            counts.dirs += 1;
            let previous = prefix.len();
            prefix.push_str(if is_last { SPACER } else { PIPE });
            walk_and_print(tree, child, prefix, display, counts, out)?;
            prefix.truncate(previous);
        } else {
            counts.files += 1;
        }
    }
    Ok(())
}

/// The text after the connector: `[columns] name`.
fn node_line(entry: &Entry, display: &DisplayOptions) -> String {
    let name = if display.full_path.is_some() {
        full_name(&entry.info.name, display)
    } else {
        entry.base_name().to_string()
    };
    let name = decorate(entry, name, display);
    let fields = metadata_fields(entry, display);
    if fields.is_empty() {
        name
    } else {
        format!("[{}] {}", fields.join(" "), name)
    }
}
