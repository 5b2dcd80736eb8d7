//! # picozip Archive
//!
//! A minimal, appendable ZIP container writer.
//!
//! - [`writer`]: the [`ZipWriter`] itself
//! - [`record`]: on-disk record encoding and name normalization
//! - [`tail`]: end-record recovery for append mode
//! - [`gate`]: the append gate serializing stream writes
//! - [`date`]: DOS date/time timestamps
//!
//! The writer produces a fixed format subset: Store and DEFLATE entries,
//! 32-bit sizes and offsets, no ZIP64, no extra fields. Entries compress in
//! parallel on the calling threads; only the final stream write is
//! serialized.
//!
//! ## Example
//!
//! ```rust
//! use picozip_archive::{DosDateTime, ZipWriter};
//! use std::io::Cursor;
//!
//! let mut buf = Cursor::new(Vec::new());
//! let writer = ZipWriter::create(&mut buf);
//! writer.add_entry("hello.txt", b"Hello, World!", DosDateTime::default())?;
//! writer.finish()?;
//! # Ok::<(), picozip_archive::PicoZipError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod date;
pub mod gate;
pub mod record;
pub mod tail;
pub mod writer;

// Re-exports for convenience
pub use date::DosDateTime;
pub use gate::{AppendGate, GateGuard};
pub use picozip_core::{
    CompressedBlock, CompressionBackend, CompressionLevel, PicoZipError, Result,
};
pub use picozip_deflate::DeflateBackend;
pub use record::{CompressionMethod, EntryRecord, SIZE_LIMIT, normalize_name};
pub use tail::{RecoveredDirectory, recover_directory};
pub use writer::ZipWriter;
