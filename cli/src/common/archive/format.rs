//! # Archive Format Identification (`common::archive::format`)
//!
//! File: cli/src/common/archive/format.rs
//!
//! ## Overview
//!
//! Decides how a file is encoded: an optional compression layer (gzip, xz,
//! zstd, bzip2) around an optional container (tar, zip). Magic bytes win
//! over the file name when both are available; the extension is the only
//! signal when creating a new archive.
//!
//! A compressed stream that does not hold a tar archive is identified as a
//! bare compression format (`container == None`). Such formats can be named
//! in error messages but cannot be created, extracted, or listed.
//!
use super::compression;
use crate::core::error::{Result, XpldError};
use anyhow::Context;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];
const BZIP2_MAGIC: &[u8] = b"BZh";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";
const TAR_MAGIC_OFFSET: usize = 257;
const TAR_MAGIC: &[u8] = b"ustar";
const TAR_BLOCK: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Xz,
    Zstd,
    Bzip2,
}

impl Compression {
    fn extension(self) -> &'static str {
        match self {
            Compression::Gzip => "gz",
            Compression::Xz => "xz",
            Compression::Zstd => "zst",
            Compression::Bzip2 => "bz2",
        }
    }

    fn from_magic(head: &[u8]) -> Option<Self> {
        if head.starts_with(GZIP_MAGIC) {
            Some(Compression::Gzip)
        } else if head.starts_with(XZ_MAGIC) {
            Some(Compression::Xz)
        } else if head.starts_with(ZSTD_MAGIC) {
            Some(Compression::Zstd)
        } else if head.starts_with(BZIP2_MAGIC) {
            Some(Compression::Bzip2)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Tar,
    Zip,
}

/// A compression layer and/or a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    pub compression: Option<Compression>,
    pub container: Option<Container>,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.container, self.compression) {
            (Some(Container::Zip), None) => write!(f, "zip"),
            (Some(Container::Zip), Some(c)) => write!(f, "zip.{}", c.extension()),
            (Some(Container::Tar), None) => write!(f, "tar"),
            (Some(Container::Tar), Some(c)) => write!(f, "tar.{}", c.extension()),
            (None, Some(c)) => write!(f, "{}", c.extension()),
            (None, None) => write!(f, "unknown"),
        }
    }
}

/// Suffixes checked longest-first against the lowercased file name.
const EXTENSIONS: &[(&str, Option<Compression>, Option<Container>)] = &[
    (".tar.gz", Some(Compression::Gzip), Some(Container::Tar)),
    (".tgz", Some(Compression::Gzip), Some(Container::Tar)),
    (".tar.xz", Some(Compression::Xz), Some(Container::Tar)),
    (".txz", Some(Compression::Xz), Some(Container::Tar)),
    (".tar.zst", Some(Compression::Zstd), Some(Container::Tar)),
    (".tzst", Some(Compression::Zstd), Some(Container::Tar)),
    (".tar.bz2", Some(Compression::Bzip2), Some(Container::Tar)),
    (".tbz2", Some(Compression::Bzip2), Some(Container::Tar)),
    (".tbz", Some(Compression::Bzip2), Some(Container::Tar)),
    (".tar", None, Some(Container::Tar)),
    (".zip", None, Some(Container::Zip)),
    (".gz", Some(Compression::Gzip), None),
    (".xz", Some(Compression::Xz), None),
    (".zst", Some(Compression::Zstd), None),
    (".bz2", Some(Compression::Bzip2), None),
];

impl Format {
    pub fn is_archive(&self) -> bool {
        self.container.is_some()
    }

    /// Identifies a format from the file name alone.
    pub fn from_extension(path: &Path) -> Option<Format> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        EXTENSIONS
            .iter()
            .find(|(suffix, _, _)| name.ends_with(suffix))
            .map(|&(_, compression, container)| Format {
                compression,
                container,
            })
    }

    /// # Identify From Name and Leading Bytes (`identify`)
    ///
    /// `head` holds the first bytes of the file when a stream is available.
    /// For compressed input it can only reveal the compression; use
    /// `identify_file` to also look inside the compressed stream.
    pub fn identify(path: &Path, head: Option<&[u8]>) -> Result<Format> {
        let by_name = Format::from_extension(path);
        let Some(head) = head else {
            return by_name.ok_or_else(|| unknown(path));
        };

        if head.starts_with(ZIP_MAGIC) || head.starts_with(ZIP_EMPTY_MAGIC) {
            return Ok(Format {
                compression: None,
                container: Some(Container::Zip),
            });
        }
        if is_tar_header(head) {
            return Ok(Format {
                compression: None,
                container: Some(Container::Tar),
            });
        }
        if let Some(compression) = Compression::from_magic(head) {
            let container = by_name.and_then(|f| f.container);
            return Ok(Format {
                compression: Some(compression),
                container,
            });
        }
        by_name.ok_or_else(|| unknown(path))
    }

    /// # Identify an Open Archive (`identify_file`)
    ///
    /// Reads the head of `file` and, for compressed input, the head of the
    /// decompressed stream, to tell a compressed tarball from a single
    /// compressed file. The file is rewound before returning.
    pub fn identify_file(path: &Path, file: &mut File) -> Result<Format> {
        let head = read_head(&mut *file)
            .with_context(|| format!("Failed to read archive header: {}", path.display()))?;
        let mut format = Format::identify(path, Some(&head))?;

        if let Some(compression) = format.compression {
            file.seek(SeekFrom::Start(0))
                .with_context(|| format!("Failed to rewind archive: {}", path.display()))?;
            let inner = compression::decoder(Some(compression), &mut *file)
                .and_then(|decoder| Ok(read_head(decoder)?));
            match inner {
                Ok(inner) if is_tar_header(&inner) => format.container = Some(Container::Tar),
                Ok(_) => {}
                Err(e) => debug!("Could not peek into compressed stream: {:#}", e),
            }
        }

        file.seek(SeekFrom::Start(0))
            .with_context(|| format!("Failed to rewind archive: {}", path.display()))?;
        debug!("Identified '{}' as {}", path.display(), format);
        Ok(format)
    }
}

fn unknown(path: &Path) -> anyhow::Error {
    XpldError::UnknownFormat {
        path: path.display().to_string(),
    }
    .into()
}

fn is_tar_header(head: &[u8]) -> bool {
    head.len() >= TAR_MAGIC_OFFSET + TAR_MAGIC.len()
        && &head[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + TAR_MAGIC.len()] == TAR_MAGIC
}

fn read_head<R: Read>(reader: R) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(TAR_BLOCK);
    reader.take(TAR_BLOCK as u64).read_to_end(&mut head)?;
    Ok(head)
}
