//! Compression backend trait.
//!
//! The archive writer never compresses anything itself; it hands entry data
//! to a [`CompressionBackend`] and decides between Store and Deflate from the
//! result. Backends must be shareable across the threads that call
//! `add_entry` concurrently, hence the `Send + Sync` bound.

use crate::error::Result;

/// Compression level for backends that support it (0 = store, 9 = best).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// No compression (store only).
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Default compression (balanced).
    pub const DEFAULT: Self = Self(6);
    /// Best compression (slowest).
    pub const BEST: Self = Self(9);

    /// Create a custom compression level (0-9).
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    /// Get the level value.
    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

/// A compressed entry payload together with the checksum of the original data.
#[derive(Debug, Clone)]
pub struct CompressedBlock {
    /// Raw DEFLATE stream (no zlib/gzip framing).
    pub bytes: Vec<u8>,
    /// CRC-32 of the uncompressed input.
    pub crc32: u32,
}

/// A pluggable one-shot compressor used by the archive writer.
pub trait CompressionBackend: Send + Sync {
    /// Compress `data` as a raw DEFLATE stream.
    ///
    /// Returns `Ok(None)` when the compressed form would not be smaller than
    /// the input; the caller then stores the data uncompressed. Internal
    /// backend failures surface as [`PicoZipError::Backend`].
    ///
    /// [`PicoZipError::Backend`]: crate::error::PicoZipError::Backend
    fn deflate(&self, data: &[u8], level: CompressionLevel) -> Result<Option<CompressedBlock>>;

    /// CRC-32 of `data`, for entries that are stored uncompressed.
    fn crc32(&self, data: &[u8]) -> u32;
}
