//! Error types for picozip operations.
//!
//! One error enum covers the whole workspace: stream I/O failures, malformed
//! archives discovered while opening for append, size-limit violations, and
//! failures reported by a compression backend.

use std::io;
use thiserror::Error;

/// The main error type for picozip operations.
#[derive(Debug, Error)]
pub enum PicoZipError {
    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive being opened for append is not a readable ZIP file.
    #[error("Invalid archive format: {message}")]
    InvalidFormat {
        /// Description of what made the archive unreadable.
        message: String,
    },

    /// An entry or the archive itself exceeds the 32-bit format limits.
    #[error("Size limit exceeded for {subject}: {size} bytes (limit {limit})")]
    SizeExceeded {
        /// What grew too large (an entry name, or "archive").
        subject: String,
        /// The offending size or offset.
        size: u64,
        /// The maximum the format can represent.
        limit: u64,
    },

    /// The compression backend reported an internal failure.
    #[error("Compression backend failure: {message}")]
    Backend {
        /// Description from the backend.
        message: String,
    },

    /// A timestamp cannot be represented in DOS date/time format.
    #[error("Timestamp out of DOS range: {message}")]
    InvalidTimestamp {
        /// Description of the out-of-range component.
        message: String,
    },

    /// A name or comment cannot be represented in the selected encoding.
    #[error("Encoding error: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },

    /// The writer was already finalized.
    #[error("Archive already finalized")]
    Finished,
}

/// Result type alias for picozip operations.
pub type Result<T> = std::result::Result<T, PicoZipError>;

impl PicoZipError {
    /// Create an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create a size limit error.
    pub fn size_exceeded(subject: impl Into<String>, size: u64, limit: u64) -> Self {
        Self::SizeExceeded {
            subject: subject.into(),
            size,
            limit,
        }
    }

    /// Create a backend failure error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Create an out-of-range timestamp error.
    pub fn invalid_timestamp(message: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            message: message.into(),
        }
    }

    /// Create an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }
}
