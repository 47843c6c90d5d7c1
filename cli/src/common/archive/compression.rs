//! # xpld Compression Layer (`common::archive::compression`)
//!
//! File: cli/src/common/archive/compression.rs
//!
//! ## Overview
//!
//! Wraps readers and writers in the codec named by a `Compression` value.
//! The codecs themselves come from `flate2`, `xz2`, `zstd`, and `bzip2`.
//!
//! - **`decoder`**: boxes a decompressing reader (or passes the input through).
//! - **`Encoder`**: an enum over the compressing writers with a single
//!   `finish` that flushes the codec trailer and hands back the inner writer.
//!
use super::format::Compression;
use crate::core::error::Result;
use anyhow::Context;
use std::io::{self, Read, Write};

/// Default xz preset, matching the `xz` command-line tool.
const XZ_LEVEL: u32 = 6;
/// `0` selects zstd's own default level.
const ZSTD_LEVEL: i32 = 0;

/// Wraps `reader` in a decompressor for `compression`.
pub fn decoder<'a, R: Read + 'a>(
    compression: Option<Compression>,
    reader: R,
) -> Result<Box<dyn Read + 'a>> {
    Ok(match compression {
        None => Box::new(reader),
        // Multi-member gzip streams (e.g. concatenated .gz files) are one logical stream.
        Some(Compression::Gzip) => Box::new(flate2::read::MultiGzDecoder::new(reader)),
        Some(Compression::Xz) => Box::new(xz2::read::XzDecoder::new(reader)),
        Some(Compression::Zstd) => Box::new(
            zstd::stream::read::Decoder::new(reader).context("Failed to start zstd decoder")?,
        ),
        Some(Compression::Bzip2) => Box::new(bzip2::read::BzDecoder::new(reader)),
    })
}

/// A writer that compresses everything written to it.
pub enum Encoder<W: Write> {
    Plain(W),
    Gzip(flate2::write::GzEncoder<W>),
    Xz(xz2::write::XzEncoder<W>),
    Zstd(zstd::stream::write::Encoder<'static, W>),
    Bzip2(bzip2::write::BzEncoder<W>),
}

impl<W: Write> Encoder<W> {
    pub fn new(compression: Option<Compression>, writer: W) -> Result<Self> {
        Ok(match compression {
            None => Encoder::Plain(writer),
            Some(Compression::Gzip) => Encoder::Gzip(flate2::write::GzEncoder::new(
                writer,
                flate2::Compression::default(),
            )),
            Some(Compression::Xz) => Encoder::Xz(xz2::write::XzEncoder::new(writer, XZ_LEVEL)),
            Some(Compression::Zstd) => Encoder::Zstd(
                zstd::stream::write::Encoder::new(writer, ZSTD_LEVEL)
                    .context("Failed to start zstd encoder")?,
            ),
            Some(Compression::Bzip2) => Encoder::Bzip2(bzip2::write::BzEncoder::new(
                writer,
                bzip2::Compression::default(),
            )),
        })
    }

    /// Writes the codec trailer and returns the inner writer.
    pub fn finish(self) -> Result<W> {
        let inner = match self {
            Encoder::Plain(w) => Ok(w),
            Encoder::Gzip(e) => e.finish(),
            Encoder::Xz(e) => e.finish(),
            Encoder::Zstd(e) => e.finish(),
            Encoder::Bzip2(e) => e.finish(),
        };
        inner.context("Failed to finish compression stream")
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Encoder::Plain(w) => w.write(buf),
            Encoder::Gzip(e) => e.write(buf),
            Encoder::Xz(e) => e.write(buf),
            Encoder::Zstd(e) => e.write(buf),
            Encoder::Bzip2(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Encoder::Plain(w) => w.flush(),
            Encoder::Gzip(e) => e.flush(),
            Encoder::Xz(e) => e.flush(),
            Encoder::Zstd(e) => e.flush(),
            Encoder::Bzip2(e) => e.flush(),
        }
    }
}
