//! # xpld Create Command
//!
//! File: cli/src/commands/create.rs
//!
//! ## Overview
//!
//! Implements `xpld create`, which archives a file or directory tree. The
//! archive format is chosen from the output file name:
//!
//! | Extension              | Format           |
//! |------------------------|------------------|
//! | `.tar`                 | plain tar        |
//! | `.tar.gz`, `.tgz`      | gzip tar         |
//! | `.tar.xz`, `.txz`      | xz tar           |
//! | `.tar.zst`, `.tzst`    | zstd tar         |
//! | `.tar.bz2`, `.tbz2`    | bzip2 tar        |
//! | `.zip`                 | zip              |
//!
//! ## Architecture
//!
//! 1. Validate arguments and identify the format from the output name, so
//!    nothing is created for an unsupported name.
//! 2. Walk the source with `walkdir` (sorted by file name, links not
//!    followed) and describe every entry as a `FileInput` named relative to
//!    the source directory.
//! 3. Stream the inputs into the output through `common::archive::archive`.
//!
//! A directory source contributes its contents, not itself: `xpld create
//! site -o site.tar` stores `index.html`, not `site/index.html`.
//!
//! ## Examples
//!
//! ```bash
//! xpld create ./dist -o release.tar.gz
//! xpld c ./dist -o release.zip --no-preserve-permissions
//! ```
//!
use super::{CommonArgs, Ownership};
use crate::common::archive::{self, format::Format, EntryInfo, EntryKind, FileInput};
use crate::core::error::{Result, XpldError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Args;
use std::fs::{self, File, Metadata};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// # Create Command Arguments (`CreateArgs`)
#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// File or directory to archive
    pub source: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// # Handle Create Command (`handle_create`)
///
/// Entry point for `xpld create`.
///
/// ## Errors
///
/// - `XpldError::MissingArgument` if the source or output is missing.
/// - `XpldError::UnknownFormat` / `UnsupportedOperation` if the output name
///   does not name an archive format.
/// - Any filesystem error while walking the source or writing the output.
pub fn handle_create(args: CreateArgs) -> Result<()> {
    info!("Handling create command with args: {:?}", args);
    let source = args
        .source
        .as_deref()
        .ok_or_else(|| XpldError::MissingArgument("source".into()))?;
    let output = args
        .common
        .output
        .as_deref()
        .ok_or_else(|| XpldError::MissingArgument("output".into()))?;

    let format = Format::from_extension(output).ok_or_else(|| XpldError::UnknownFormat {
        path: output.display().to_string(),
    })?;
    if !format.is_archive() {
        return Err(XpldError::UnsupportedOperation {
            format: format.to_string(),
            operation: "create".into(),
        }
        .into());
    }

    let settings = CreateSettings {
        preserve_permissions: !args.common.no_preserve_permissions,
        ownership: args.common.ownership(),
    };
    let inputs = collect_inputs(source, Some(output), &settings)?;

    let file = File::create(output)
        .with_context(|| format!("Failed to create archive {}", output.display()))?;
    archive::archive(&format, file, &inputs)
        .with_context(|| format!("Failed to write archive {}", output.display()))?;

    info!(
        "Created {} ({}) with {} entries",
        output.display(),
        format,
        inputs.len()
    );
    Ok(())
}

/// Metadata handling for `collect_inputs`.
#[derive(Debug, Clone, Copy)]
struct CreateSettings {
    preserve_permissions: bool,
    ownership: Ownership,
}

/// # Collect Archive Inputs (`collect_inputs`)
///
/// Walks `source` and returns one `FileInput` per entry, in walk order.
/// `skip` (normally the output file) is left out if it lies inside `source`.
fn collect_inputs(
    source: &Path,
    skip: Option<&Path>,
    settings: &CreateSettings,
) -> Result<Vec<FileInput>> {
    let source_meta = fs::symlink_metadata(source)
        .with_context(|| format!("Failed to read source {}", source.display()))?;
    // A single file is archived under its own name.
    let (base, min_depth) = if source_meta.is_dir() {
        (source.to_path_buf(), 1)
    } else {
        let parent = source.parent().unwrap_or_else(|| Path::new(""));
        (parent.to_path_buf(), 0)
    };
    let skip = skip.and_then(|path| fs::canonicalize(path).ok());

    let mut inputs = Vec::new();
    for entry in WalkDir::new(source)
        .min_depth(min_depth)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
        let path = entry.path();
        if skip.is_some() && fs::canonicalize(path).ok() == skip {
            debug!("Skipping the output archive itself: {}", path.display());
            continue;
        }
        let relative = path.strip_prefix(&base).with_context(|| {
            format!("{} is not inside {}", path.display(), base.display())
        })?;
        let name = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let metadata = entry
            .metadata()
            .with_context(|| format!("Failed to read metadata of {}", path.display()))?;

        let info = entry_info(name, path, &metadata, settings)?;
        debug!("Adding {} as '{}'", path.display(), info.name);
        inputs.push(FileInput {
            info,
            source: path.to_path_buf(),
        });
    }
    Ok(inputs)
}

fn entry_info(
    name: String,
    path: &Path,
    metadata: &Metadata,
    settings: &CreateSettings,
) -> Result<EntryInfo> {
    let file_type = metadata.file_type();
    let kind = if file_type.is_dir() {
        EntryKind::Dir
    } else if file_type.is_file() {
        EntryKind::File
    } else if file_type.is_symlink() {
        let target = fs::read_link(path)
            .with_context(|| format!("Failed to read link {}", path.display()))?;
        EntryKind::Symlink(target.to_string_lossy().into_owned())
    } else {
        EntryKind::Other
    };

    let mut info = EntryInfo::new(name, kind);
    if info.kind == EntryKind::File {
        info.size = metadata.len();
    }
    if let Ok(modified) = metadata.modified() {
        info.mtime = DateTime::<Utc>::from(modified);
    }
    apply_unix_metadata(&mut info, metadata, settings);
    Ok(info)
}

#[cfg(unix)]
fn apply_unix_metadata(info: &mut EntryInfo, metadata: &Metadata, settings: &CreateSettings) {
    use std::os::unix::fs::MetadataExt;

    if settings.preserve_permissions {
        info.mode = metadata.mode() & 0o7777;
    } else if matches!(info.kind, EntryKind::Symlink(_)) {
        info.mode = 0o777;
    }
    let (uid, gid) = settings
        .ownership
        .select(Some(u64::from(metadata.uid())), Some(u64::from(metadata.gid())));
    info.uid = uid;
    info.gid = gid;
}

#[cfg(not(unix))]
fn apply_unix_metadata(info: &mut EntryInfo, metadata: &Metadata, _settings: &CreateSettings) {
    if metadata.permissions().readonly() {
        info.mode &= !0o222;
    }
}
