//! # xpld Extract Command
//!
//! File: cli/src/commands/extract.rs
//!
//! ## Overview
//!
//! Implements `xpld extract`, which unpacks an archive into a directory. The
//! format is identified from the archive's leading bytes, falling back to its
//! name, so a misnamed `.tgz` that is really a zip still extracts.
//!
//! ## Architecture
//!
//! Members are streamed through `common::archive::extract` and written one at
//! a time by `Extractor::visit`:
//!
//! - Every member name is checked with `resolve_member_path` first; absolute
//!   names, names containing `..`, and names whose parent directory is a
//!   symlink on disk abort extraction with `XpldError::UnsafePath`. Nothing
//!   is ever written through a symlink: a file member replaces a link of the
//!   same name, and a directory member refuses one.
//! - Directories are created immediately, but their permission bits are
//!   applied after the walk (deepest first) so a read-only directory does not
//!   block its own contents.
//! - Files are streamed to disk and then given their recorded mode.
//! - Symbolic links are recreated on Unix; hard links point at the already
//!   extracted target. Devices and fifos are skipped with a warning.
//! - With `--flatten`, every file lands directly in the output directory
//!   under its base name and directories are not created.
//!
//! ## Examples
//!
//! ```bash
//! xpld extract release.tar.gz -o ./release
//! xpld e photos.zip -o ./all-photos --flatten
//! ```
//!
use super::{CommonArgs, Ownership};
use crate::common::archive::{self, format::Format, EntryInfo, EntryKind};
use crate::common::fs::io::{
    ensure_dir_exists, is_symlink, resolve_member_path, write_stream_to_file,
};
use crate::core::config::{self, ExtractConfig};
use crate::core::error::{Result, XpldError};
use anyhow::Context;
use clap::Args;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// # Extract Command Arguments (`ExtractArgs`)
#[derive(Args, Debug, Default)]
pub struct ExtractArgs {
    /// Archive to extract
    pub archive: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Write every file directly into the output directory
    #[arg(short, long)]
    pub flatten: bool,
}

/// Settings for one extraction, merged from arguments and configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub archive: PathBuf,
    pub output: PathBuf,
    pub flatten: bool,
    pub preserve_permissions: bool,
    pub ownership: Ownership,
}

impl ExtractOptions {
    /// Builds the options; a flag given on the command line wins over the
    /// configured default.
    pub fn from_args(args: &ExtractArgs, cfg: &ExtractConfig) -> Result<Self> {
        let archive = args
            .archive
            .clone()
            .ok_or_else(|| XpldError::MissingArgument("archive".into()))?;
        let output = args
            .common
            .output
            .clone()
            .ok_or_else(|| XpldError::MissingArgument("output".into()))?;
        let preserve_permissions = if args.common.no_preserve_permissions {
            false
        } else {
            cfg.preserve_permissions.unwrap_or(true)
        };
        Ok(Self {
            archive,
            output,
            flatten: args.flatten || cfg.flatten.unwrap_or(false),
            preserve_permissions,
            ownership: args.common.ownership(),
        })
    }
}

/// # Handle Extract Command (`handle_extract`)
///
/// Entry point for `xpld extract`.
///
/// ## Errors
///
/// - `XpldError::MissingArgument` if the archive or output is missing.
/// - `XpldError::UnknownFormat` / `UnsupportedOperation` if the input is not
///   a readable archive.
/// - `XpldError::UnsafePath` if a member would land outside the output.
/// - Any filesystem error; extraction stops at the first one and files
///   already written are left in place.
pub fn handle_extract(args: ExtractArgs) -> Result<()> {
    info!("Handling extract command with args: {:?}", args);
    let cfg = config::load_config()?;
    let options = ExtractOptions::from_args(&args, &cfg.extract)?;
    let count = extract_archive(&options)?;
    info!(
        "Extracted {} members from {} into {}",
        count,
        options.archive.display(),
        options.output.display()
    );
    Ok(())
}

/// # Extract Archive (`extract_archive`)
///
/// Extracts `options.archive` into `options.output` and returns the number
/// of members written.
pub fn extract_archive(options: &ExtractOptions) -> Result<usize> {
    let mut file = File::open(&options.archive)
        .with_context(|| format!("Failed to open archive {}", options.archive.display()))?;
    let format = Format::identify_file(&options.archive, &mut file)?;
    if !format.is_archive() {
        return Err(XpldError::UnsupportedOperation {
            format: format.to_string(),
            operation: "extract".into(),
        }
        .into());
    }
    ensure_dir_exists(&options.output)?;

    let mut extractor = Extractor::new(options);
    archive::extract(&format, file, |info, content| extractor.visit(info, content))
        .with_context(|| format!("Failed to extract {}", options.archive.display()))?;
    extractor.finish()
}

/// Per-run extraction state.
struct Extractor<'o> {
    options: &'o ExtractOptions,
    /// Directory modes applied once all members are written.
    dir_modes: Vec<(PathBuf, u32)>,
    written: usize,
}

impl<'o> Extractor<'o> {
    fn new(options: &'o ExtractOptions) -> Self {
        Self {
            options,
            dir_modes: Vec::new(),
            written: 0,
        }
    }

    /// Where `name` is written, or `None` when the member produces nothing.
    fn destination(&self, name: &str, is_dir: bool) -> Result<Option<PathBuf>> {
        let resolved = resolve_member_path(&self.options.output, name)?;
        if resolved == self.options.output {
            return Ok(None);
        }
        if !self.options.flatten {
            return Ok(Some(resolved));
        }
        if is_dir {
            return Ok(None);
        }
        Ok(resolved
            .file_name()
            .map(|base| self.options.output.join(base)))
    }

    fn visit(&mut self, info: &EntryInfo, content: &mut dyn Read) -> Result<()> {
        let Some(path) = self.destination(&info.name, info.is_dir())? else {
            debug!("Nothing to write for member '{}'", info.name);
            return Ok(());
        };

        match &info.kind {
            EntryKind::Dir => {
                if is_symlink(&path) {
                    return Err(XpldError::UnsafePath {
                        name: info.name.clone(),
                    }
                    .into());
                }
                ensure_dir_exists(&path)?;
                let mode = if self.options.preserve_permissions {
                    info.mode
                } else {
                    0o755
                };
                self.dir_modes.push((path.clone(), mode));
            }
            EntryKind::File => {
                write_stream_to_file(&path, content)?;
                if self.options.preserve_permissions {
                    set_mode(&path, info.mode)?;
                }
            }
            EntryKind::Symlink(target) => {
                if let Some(parent) = path.parent() {
                    ensure_dir_exists(parent)?;
                }
                create_symlink(target, &path)?;
            }
            EntryKind::HardLink(target) => {
                let original = self
                    .destination(target, false)?
                    .ok_or_else(|| XpldError::UnsafePath {
                        name: target.clone(),
                    })?;
                if let Some(parent) = path.parent() {
                    ensure_dir_exists(parent)?;
                }
                remove_existing(&path)?;
                fs::hard_link(&original, &path).with_context(|| {
                    format!(
                        "Failed to link {} to {}",
                        path.display(),
                        original.display()
                    )
                })?;
            }
            EntryKind::Other => {
                warn!("Skipping special member '{}'", info.name);
                return Ok(());
            }
        }

        let (uid, gid) = self.options.ownership.select(info.uid, info.gid);
        if uid.is_some() || gid.is_some() {
            set_owner(&path, uid, gid)?;
        }
        debug!("Extracted '{}' to {}", info.name, path.display());
        self.written += 1;
        Ok(())
    }

    fn finish(self) -> Result<usize> {
        for (path, mode) in self.dir_modes.iter().rev() {
            set_mode(path, *mode)?;
        }
        Ok(self.written)
    }
}

fn remove_existing(path: &Path) -> Result<()> {
    if fs::symlink_metadata(path).is_ok() {
        fs::remove_file(path)
            .with_context(|| format!("Failed to replace existing {}", path.display()))?;
    }
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn create_symlink(target: &str, path: &Path) -> Result<()> {
    remove_existing(path)?;
    std::os::unix::fs::symlink(target, path)
        .with_context(|| format!("Failed to create symlink {} -> {}", path.display(), target))
}

#[cfg(not(unix))]
fn create_symlink(target: &str, path: &Path) -> Result<()> {
    warn!(
        "Symbolic links are not supported here; skipping {} -> {}",
        path.display(),
        target
    );
    Ok(())
}

#[cfg(unix)]
fn set_owner(path: &Path, uid: Option<u64>, gid: Option<u64>) -> Result<()> {
    let to_id = |id: u64| {
        u32::try_from(id).map_err(|_| XpldError::FileSystem(format!("Owner id {id} out of range")))
    };
    let uid = uid.map(to_id).transpose()?;
    let gid = gid.map(to_id).transpose()?;
    std::os::unix::fs::lchown(path, uid, gid)
        .with_context(|| format!("Failed to set ownership of {}", path.display()))
}

#[cfg(not(unix))]
fn set_owner(_path: &Path, _uid: Option<u64>, _gid: Option<u64>) -> Result<()> {
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::archive::FileInput;
    use tempfile::tempdir;

    fn options(archive: PathBuf, output: PathBuf) -> ExtractOptions {
        ExtractOptions {
            archive,
            output,
            flatten: false,
            preserve_permissions: true,
            ownership: Ownership::default(),
        }
    }

    /// Writes `inputs` (content from `src`) to `path`.
    fn write_archive(path: &Path, inputs: &[FileInput]) -> Result<()> {
        let format = Format::from_extension(path).unwrap();
        archive::archive(&format, File::create(path)?, inputs)
    }

    fn sample(temp: &Path, archive_name: &str) -> Result<PathBuf> {
        let src = temp.join("src");
        fs::create_dir_all(src.join("docs"))?;
        fs::write(src.join("docs/guide.md"), "guide")?;
        fs::write(src.join("top.txt"), "top")?;
        let path = temp.join(archive_name);
        let mut guide = EntryInfo::new("docs/guide.md", EntryKind::File);
        guide.size = 5;
        guide.mode = 0o600;
        let mut top = EntryInfo::new("top.txt", EntryKind::File);
        top.size = 3;
        write_archive(
            &path,
            &[
                FileInput {
                    info: EntryInfo::new("docs", EntryKind::Dir),
                    source: src.join("docs"),
                },
                FileInput {
                    info: guide,
                    source: src.join("docs/guide.md"),
                },
                FileInput {
                    info: top,
                    source: src.join("top.txt"),
                },
            ],
        )?;
        Ok(path)
    }

    #[test]
    fn test_extract_tar_and_zip() -> Result<()> {
        let temp_dir = tempdir()?;
        for name in ["sample.tar.gz", "sample.zip", "sample.tar.xz"] {
            let archive = sample(temp_dir.path(), name)?;
            let out = temp_dir.path().join(format!("out-{name}"));
            let count = extract_archive(&options(archive, out.clone()))?;
            assert_eq!(count, 3, "members of {name}");
            assert_eq!(fs::read_to_string(out.join("docs/guide.md"))?, "guide");
            assert_eq!(fs::read_to_string(out.join("top.txt"))?, "top");
        }
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_preserved_or_reset() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir()?;
        let archive = sample(temp_dir.path(), "sample.tar")?;

        let kept = temp_dir.path().join("kept");
        extract_archive(&options(archive.clone(), kept.clone()))?;
        let mode = fs::metadata(kept.join("docs/guide.md"))?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let reset = temp_dir.path().join("reset");
        let mut opts = options(archive, reset.clone());
        opts.preserve_permissions = false;
        extract_archive(&opts)?;
        let mode = fs::metadata(reset.join("docs"))?.permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        Ok(())
    }

    #[test]
    fn test_flatten() -> Result<()> {
        let temp_dir = tempdir()?;
        let archive = sample(temp_dir.path(), "sample.tar.bz2")?;
        let out = temp_dir.path().join("flat");
        let mut opts = options(archive, out.clone());
        opts.flatten = true;
        let count = extract_archive(&opts)?;
        assert_eq!(count, 2);
        assert!(out.join("guide.md").is_file());
        assert!(out.join("top.txt").is_file());
        assert!(!out.join("docs").exists());
        Ok(())
    }

    #[test]
    fn test_unsafe_member_is_refused() -> Result<()> {
        let temp_dir = tempdir()?;
        let src = temp_dir.path().join("evil.txt");
        fs::write(&src, "x")?;
        let archive = temp_dir.path().join("evil.zip");
        let mut info = EntryInfo::new("../evil.txt", EntryKind::File);
        info.size = 1;
        write_archive(&archive, &[FileInput { info, source: src }])?;

        let out = temp_dir.path().join("out");
        let err = extract_archive(&options(archive, out.clone())).unwrap_err();
        assert!(err
            .chain()
            .any(|cause| matches!(cause.downcast_ref(), Some(XpldError::UnsafePath { .. }))));
        assert!(fs::read_dir(&out)?.next().is_none());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_recreated() -> Result<()> {
        let temp_dir = tempdir()?;
        let src = temp_dir.path().join("target.txt");
        fs::write(&src, "t")?;
        let archive = temp_dir.path().join("links.tar");
        let mut target = EntryInfo::new("target.txt", EntryKind::File);
        target.size = 1;
        write_archive(
            &archive,
            &[
                FileInput {
                    info: target,
                    source: src.clone(),
                },
                FileInput {
                    info: EntryInfo::new("link", EntryKind::Symlink("target.txt".into())),
                    source: src,
                },
            ],
        )?;
        let out = temp_dir.path().join("out");
        extract_archive(&options(archive, out.clone()))?;
        assert_eq!(fs::read_link(out.join("link"))?, PathBuf::from("target.txt"));
        assert_eq!(fs::read_to_string(out.join("link"))?, "t");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_member_through_symlink_is_refused() -> Result<()> {
        let temp_dir = tempdir()?;
        let outside = temp_dir.path().join("outside");
        fs::create_dir_all(&outside)?;
        let payload = temp_dir.path().join("payload.txt");
        fs::write(&payload, "pwned")?;

        for name in ["escape.tar", "escape.zip"] {
            let archive = temp_dir.path().join(name);
            let mut pwned = EntryInfo::new("link/pwned.txt", EntryKind::File);
            pwned.size = 5;
            write_archive(
                &archive,
                &[
                    FileInput {
                        info: EntryInfo::new(
                            "link",
                            EntryKind::Symlink(outside.to_string_lossy().into_owned()),
                        ),
                        source: payload.clone(),
                    },
                    FileInput {
                        info: pwned,
                        source: payload.clone(),
                    },
                ],
            )?;

            let out = temp_dir.path().join(format!("out-{name}"));
            let err = extract_archive(&options(archive, out)).unwrap_err();
            assert!(
                err.chain().any(|cause| matches!(
                    cause.downcast_ref(),
                    Some(XpldError::UnsafePath { .. })
                )),
                "{name}: {err:#}"
            );
            assert!(!outside.join("pwned.txt").exists(), "{name} wrote outside");
        }
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_over_symlink_is_refused() -> Result<()> {
        let temp_dir = tempdir()?;
        let outside = temp_dir.path().join("outside");
        fs::create_dir_all(&outside)?;
        let archive = temp_dir.path().join("dir-over-link.tar");
        write_archive(
            &archive,
            &[
                FileInput {
                    info: EntryInfo::new(
                        "docs",
                        EntryKind::Symlink(outside.to_string_lossy().into_owned()),
                    ),
                    source: outside.clone(),
                },
                FileInput {
                    info: EntryInfo::new("docs", EntryKind::Dir),
                    source: outside.clone(),
                },
            ],
        )?;
        let out = temp_dir.path().join("out");
        let err = extract_archive(&options(archive, out)).unwrap_err();
        assert!(err
            .chain()
            .any(|cause| matches!(cause.downcast_ref(), Some(XpldError::UnsafePath { .. }))));
        Ok(())
    }

    #[test]
    fn test_options_merge_config() -> Result<()> {
        let args = ExtractArgs {
            archive: Some("a.tar".into()),
            common: CommonArgs {
                output: Some("out".into()),
                ..Default::default()
            },
            flatten: false,
        };
        let cfg = ExtractConfig {
            preserve_permissions: Some(false),
            flatten: Some(true),
        };
        let opts = ExtractOptions::from_args(&args, &cfg)?;
        assert!(opts.flatten);
        assert!(!opts.preserve_permissions);

        let opts = ExtractOptions::from_args(&args, &ExtractConfig::default())?;
        assert!(!opts.flatten);
        assert!(opts.preserve_permissions);

        let missing = ExtractArgs::default();
        let err = ExtractOptions::from_args(&missing, &cfg).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<XpldError>(),
            Some(XpldError::MissingArgument(_))
        ));
        Ok(())
    }
}
