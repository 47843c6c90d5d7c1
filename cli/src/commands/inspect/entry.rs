//! # Listing Entry (`commands::inspect::entry`)
//!
//! File: cli/src/commands/inspect/entry.rs
//!
//! One archive member as it flows through the listing pipeline. The display
//! name carries a trailing `/` for directories; everything else is read from
//! the underlying `EntryInfo`.
//!
use super::version::{self, Version};
use crate::common::archive::EntryInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Archive-relative path, `/`-terminated for directories.
    pub name: String,
    pub info: EntryInfo,
}

impl Entry {
    pub fn new(info: EntryInfo) -> Self {
        let name = if info.is_dir() {
            format!("{}/", info.name)
        } else {
            info.name.clone()
        };
        Entry { name, info }
    }

    pub fn is_dir(&self) -> bool {
        self.info.is_dir()
    }

    /// Last path segment without the directory slash.
    pub fn base_name(&self) -> &str {
        self.info.base_name()
    }

    pub fn is_hidden(&self) -> bool {
        self.base_name().starts_with('.')
    }

    /// Number of separators in the path; top-level entries are depth 0.
    pub fn depth(&self) -> usize {
        self.info.name.matches('/').count()
    }

    /// Text after the last `.` of the base name, or `""` when there is none.
    pub fn extension(&self) -> &str {
        self.base_name()
            .rsplit_once('.')
            .map_or("", |(_, extension)| extension)
    }

    /// The raw version token of the base name, if any.
    pub fn version_token(&self) -> Option<&str> {
        version::extract_token(self.base_name())
    }

    pub fn version(&self) -> Option<Version> {
        self.version_token().map(Version::parse)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::archive::EntryKind;

    #[test]
    fn test_directory_names_end_with_slash() {
        let dir = Entry::new(EntryInfo::new("a/b", EntryKind::Dir));
        assert_eq!(dir.name, "a/b/");
        assert_eq!(dir.base_name(), "b");
        assert_eq!(dir.depth(), 1);

        let file = Entry::new(EntryInfo::new("a/b/c.txt", EntryKind::File));
        assert_eq!(file.name, "a/b/c.txt");
        assert_eq!(file.depth(), 2);
    }

    #[test]
    fn test_extension() {
        let entry = |name: &str| Entry::new(EntryInfo::new(name, EntryKind::File));
        assert_eq!(entry("x.tar.gz").extension(), "gz");
        assert_eq!(entry("Makefile").extension(), "");
        assert_eq!(entry("dir.d/plain").extension(), "");
        assert_eq!(entry(".bashrc").extension(), "bashrc");
    }

    #[test]
    fn test_hidden_uses_base_name() {
        let entry = |name: &str| Entry::new(EntryInfo::new(name, EntryKind::File));
        // Only the last segment counts; the walk prunes hidden parents.
        assert!(!entry(".git/config").is_hidden());
        assert!(entry("a/.env").is_hidden());
    }

    #[test]
    fn test_version_token() {
        let entry = Entry::new(EntryInfo::new("dist/pkg-1.10.0-linux", EntryKind::Dir));
        assert_eq!(entry.version_token(), Some("1.10.0"));
        assert_eq!(entry.version(), Some(Version::parse("1.10.0")));
    }
}
