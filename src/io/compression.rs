//! Transparent decompression of rotated log files, and compression of exports.
//!
//! Access logs are routinely rotated into `u_ex240101.log.gz` and friends. The
//! read path checks the file name first and falls back to the leading magic
//! bytes, so a renamed archive is still decoded. Plain files pass through a
//! [`BufReader`] untouched.
//!
//! ## Built-in codecs
//!
//! - **Gzip** (`.gz`) - `flate2`, multi-member aware (feature `compression-gzip`)
//! - **Zstd** (`.zst`) - `zstd` (feature `compression-zstd`)
//! - **Bzip2** (`.bz2`) - `bzip2` (feature `compression-bzip2`)
//! - **Xz** (`.xz`) - `xz2` (feature `compression-xz`)
//!
//! Additional codecs can be plugged in with [`register_codec`].

use crate::io::source::open_shared;
use anyhow::{Context, Result};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// A compression format the I/O layer can detect and apply.
///
/// Codecs live in a process-wide registry and must be `Send + Sync`.
pub trait CompressionCodec: Send + Sync {
    fn name(&self) -> &str;

    /// Lowercase file suffixes including the dot, e.g. `&[".gz"]`.
    fn extensions(&self) -> &[&str];

    /// Leading signature of the compressed stream, if the format has one.
    fn magic_bytes(&self) -> Option<&[u8]>;

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>>;

    fn wrap_writer_dyn(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn Write>>;
}

// longest built-in signature is xz at 6 bytes
const MAGIC_HEAD_LEN: usize = 16;

type Registry = RwLock<Vec<Arc<dyn CompressionCodec>>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(builtin_codecs()))
}

fn builtin_codecs() -> Vec<Arc<dyn CompressionCodec>> {
    vec![
        #[cfg(feature = "compression-gzip")]
        Arc::new(GzipCodec),
        #[cfg(feature = "compression-zstd")]
        Arc::new(ZstdCodec),
        #[cfg(feature = "compression-bzip2")]
        Arc::new(Bzip2Codec),
        #[cfg(feature = "compression-xz")]
        Arc::new(XzCodec),
    ]
}

fn codecs() -> Vec<Arc<dyn CompressionCodec>> {
    // a panic while registering cannot leave the Vec half-written
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Add a codec to the registry. Later registrations are consulted last.
pub fn register_codec(codec: Arc<dyn CompressionCodec>) {
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(codec);
}

/// Codec whose extension matches the end of `path`, ignoring case.
pub fn codec_for_path(path: impl AsRef<Path>) -> Option<Arc<dyn CompressionCodec>> {
    let name = path.as_ref().to_string_lossy().to_ascii_lowercase();
    codecs()
        .into_iter()
        .find(|c| c.extensions().iter().any(|ext| name.ends_with(ext)))
}

fn codec_for_magic(head: &[u8]) -> Option<Arc<dyn CompressionCodec>> {
    if head.is_empty() {
        return None;
    }
    codecs().into_iter().find(|c| {
        c.magic_bytes()
            .is_some_and(|magic| head.len() >= magic.len() && head.starts_with(magic))
    })
}

/// `true` if the file at `path` would be decoded by a registered codec,
/// judged by its name first and its leading bytes second.
pub fn is_compressed(path: impl AsRef<Path>) -> io::Result<bool> {
    let path = path.as_ref();
    if codec_for_path(path).is_some() {
        return Ok(true);
    }
    let mut head = Vec::with_capacity(MAGIC_HEAD_LEN);
    open_shared(path)?
        .take(MAGIC_HEAD_LEN as u64)
        .read_to_end(&mut head)?;
    Ok(codec_for_magic(&head).is_some())
}

/// Wrap `reader` with the decompressor matching `path_hint` or its magic bytes.
///
/// Returns a buffered reader in every case.
pub fn decoding_reader<R: Read + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> io::Result<Box<dyn BufRead>> {
    if let Some(codec) = codec_for_path(&path_hint) {
        let decoded = codec.wrap_reader_dyn(Box::new(reader))?;
        return Ok(Box::new(BufReader::new(decoded)));
    }

    let mut buffered = BufReader::new(reader);
    let codec = codec_for_magic(buffered.fill_buf()?);
    match codec {
        Some(codec) => {
            let decoded = codec.wrap_reader_dyn(Box::new(buffered))?;
            Ok(Box::new(BufReader::new(decoded)))
        }
        None => Ok(Box::new(buffered)),
    }
}

/// Wrap `writer` with the compressor matching the extension of `path_hint`.
///
/// Without a match the writer is only buffered.
pub fn encoding_writer<W: Write + 'static>(
    writer: W,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Write>> {
    let path_hint = path_hint.as_ref();
    match codec_for_path(path_hint) {
        Some(codec) => codec
            .wrap_writer_dyn(Box::new(BufWriter::new(writer)))
            .with_context(|| format!("{} encoder for {}", codec.name(), path_hint.display())),
        None => Ok(Box::new(BufWriter::new(writer))),
    }
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x1f, 0x8b])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        // rotation tools append members to the same archive
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }

    fn wrap_writer_dyn(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(flate2::write::GzEncoder::new(
            writer,
            flate2::Compression::default(),
        )))
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &str {
        "zstd"
    }

    fn extensions(&self) -> &[&str] {
        &[".zst", ".zstd"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x28, 0xb5, 0x2f, 0xfd])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        let decoder = zstd::stream::read::Decoder::new(reader)?;
        Ok(Box::new(decoder))
    }

    fn wrap_writer_dyn(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn Write>> {
        let encoder = zstd::stream::write::Encoder::new(writer, 3)?;
        Ok(Box::new(encoder.auto_finish()))
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl CompressionCodec for Bzip2Codec {
    fn name(&self) -> &str {
        "bzip2"
    }

    fn extensions(&self) -> &[&str] {
        &[".bz2", ".bzip2"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        // "BZh"; two bytes alone collide with plain text starting with "BZ"
        Some(b"BZh")
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader)))
    }

    fn wrap_writer_dyn(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(bzip2::write::BzEncoder::new(
            writer,
            bzip2::Compression::default(),
        )))
    }
}

#[cfg(feature = "compression-xz")]
struct XzCodec;

#[cfg(feature = "compression-xz")]
impl CompressionCodec for XzCodec {
    fn name(&self) -> &str {
        "xz"
    }

    fn extensions(&self) -> &[&str] {
        &[".xz"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)))
    }

    fn wrap_writer_dyn(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(xz2::write::XzEncoder::new(writer, 6)))
    }
}
