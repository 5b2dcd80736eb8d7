//! # picozip Deflate
//!
//! Default [`CompressionBackend`] for picozip, built on `flate2` (raw
//! DEFLATE, RFC 1951) and `crc32fast`.
//!
//! The backend answers `None` when the deflated form would be no smaller
//! than the input, letting the archive writer fall back to storing the
//! entry uncompressed.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;
use picozip_core::{CompressedBlock, CompressionBackend, CompressionLevel, PicoZipError, Result};

/// DEFLATE backend over `flate2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeflateBackend;

impl DeflateBackend {
    /// Create a new backend.
    pub fn new() -> Self {
        Self
    }
}

impl CompressionBackend for DeflateBackend {
    fn deflate(&self, data: &[u8], level: CompressionLevel) -> Result<Option<CompressedBlock>> {
        let crc32 = crc32fast::hash(data);
        let mut encoder =
            DeflateEncoder::new(Vec::new(), Compression::new(u32::from(level.level())));
        encoder
            .write_all(data)
            .map_err(|e| PicoZipError::backend(e.to_string()))?;
        let bytes = encoder
            .finish()
            .map_err(|e| PicoZipError::backend(e.to_string()))?;

        if bytes.len() >= data.len() {
            return Ok(None);
        }
        Ok(Some(CompressedBlock { bytes, crc32 }))
    }

    fn crc32(&self, data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}
