//! # xpld Filesystem I/O Utilities (`common::fs::io`)
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! Basic filesystem operations used when materialising archive members on
//! disk:
//!
//! - **`ensure_dir_exists`**: `mkdir -p` that refuses to treat a file as a directory.
//! - **`write_stream_to_file`**: Streams a member's content into a new file.
//! - **`resolve_member_path`**: Maps a member name onto the output directory,
//!   refusing names that would land outside it.
//!
//! All functions return `anyhow::Result` with the offending path in the
//! error context.
//!
use crate::core::error::{Result, XpldError};
use anyhow::Context;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Ensures that a directory exists at the specified path.
///
/// Missing parents are created as well. If the path exists but is not a
/// directory, `XpldError::FileSystem` is returned.
///
/// # Errors
///
/// Returns an `Err` if the path is a non-directory or creation fails.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
        debug!("Created directory: {}", path.display());
    } else if !path.is_dir() {
        anyhow::bail!(XpldError::FileSystem(format!(
            "Path exists but is not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Copies everything readable from `content` into a new file at `path`,
/// creating parent directories first. An existing file is truncated; an
/// existing symlink is replaced rather than written through.
///
/// Returns the number of bytes written.
pub fn write_stream_to_file(path: &Path, content: &mut dyn Read) -> Result<u64> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }
    if is_symlink(path) {
        fs::remove_file(path)
            .with_context(|| format!("Failed to replace symlink {}", path.display()))?;
        debug!("Replaced symlink: {}", path.display());
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let written = io::copy(content, &mut writer)
        .with_context(|| format!("Failed to write file {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush file {}", path.display()))?;
    Ok(written)
}

/// # Resolve Member Path (`resolve_member_path`)
///
/// Joins an archive member name onto `root`.
///
/// ## Errors
///
/// Returns `XpldError::UnsafePath` when `name` is absolute, carries a
/// Windows prefix, or contains a `..` component, or when a directory between
/// `root` and the member is already a symlink on disk. `.` components are
/// dropped.
/// The final component itself is not checked; callers replace it.
pub fn resolve_member_path(root: &Path, name: &str) -> Result<PathBuf> {
    let unsafe_path = || -> anyhow::Error {
        XpldError::UnsafePath {
            name: name.to_string(),
        }
        .into()
    };
    let mut parts = Vec::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_path());
            }
        }
    }

    let mut resolved = root.to_path_buf();
    let last = parts.len().saturating_sub(1);
    for (index, part) in parts.into_iter().enumerate() {
        resolved.push(part);
        if index < last && is_symlink(&resolved) {
            debug!("'{}' passes through symlink {}", name, resolved.display());
            return Err(unsafe_path());
        }
    }
    Ok(resolved)
}

/// Whether `path` exists and is a symlink, without following it.
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_exists_creates_new() -> Result<()> {
        let base_dir = tempdir()?;
        let new_dir = base_dir.path().join("new/subdir");
        assert!(!new_dir.exists());
        ensure_dir_exists(&new_dir)?;
        assert!(new_dir.is_dir());
        // A second call is a no-op.
        ensure_dir_exists(&new_dir)?;
        Ok(())
    }

    #[test]
    fn test_ensure_dir_exists_fails_on_file() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("a_file.txt");
        fs::write(&file_path, "content")?;
        let err = ensure_dir_exists(&file_path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<XpldError>(),
            Some(XpldError::FileSystem(_))
        ));
        Ok(())
    }

    #[test]
    fn test_write_stream_creates_parents() -> Result<()> {
        let base_dir = tempdir()?;
        let target = base_dir.path().join("deep/nested/out.txt");
        let written = write_stream_to_file(&target, &mut "payload".as_bytes())?;
        assert_eq!(written, 7);
        assert_eq!(fs::read_to_string(&target)?, "payload");
        Ok(())
    }

    #[test]
    fn test_resolve_member_path() -> Result<()> {
        let root = Path::new("/out");
        assert_eq!(resolve_member_path(root, "a/b.txt")?, root.join("a/b.txt"));
        assert_eq!(resolve_member_path(root, "./a")?, root.join("a"));

        for unsafe_name in ["/etc/passwd", "../escape", "a/../../b"] {
            let err = resolve_member_path(root, unsafe_name).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<XpldError>(),
                    Some(XpldError::UnsafePath { .. })
                ),
                "{unsafe_name} should be refused"
            );
        }
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_refuses_symlinked_parent() -> Result<()> {
        let base_dir = tempdir()?;
        let root = base_dir.path().join("out");
        let outside = base_dir.path().join("outside");
        fs::create_dir_all(&root)?;
        fs::create_dir_all(&outside)?;
        std::os::unix::fs::symlink(&outside, root.join("link"))?;

        let err = resolve_member_path(&root, "link/pwned.txt").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<XpldError>(),
            Some(XpldError::UnsafePath { .. })
        ));
        // The link itself can still be named, e.g. to be replaced.
        assert_eq!(resolve_member_path(&root, "link")?, root.join("link"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_write_stream_replaces_symlink() -> Result<()> {
        let base_dir = tempdir()?;
        let outside = base_dir.path().join("outside.txt");
        fs::write(&outside, "original")?;
        let target = base_dir.path().join("member.txt");
        std::os::unix::fs::symlink(&outside, &target)?;

        write_stream_to_file(&target, &mut "payload".as_bytes())?;
        assert!(!is_symlink(&target));
        assert_eq!(fs::read_to_string(&target)?, "payload");
        assert_eq!(fs::read_to_string(&outside)?, "original");
        Ok(())
    }
}
