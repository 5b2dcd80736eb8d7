//! # picozip Core
//!
//! Core components for the picozip archive writer.
//!
//! This crate provides the building blocks shared by the workspace:
//!
//! - [`traits`]: the [`CompressionBackend`] trait and [`CompressionLevel`]
//! - [`error`]: error types
//!
//! The container logic lives in `picozip-archive`; the default DEFLATE
//! backend lives in `picozip-deflate`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;

// Re-exports for convenience
pub use error::{PicoZipError, Result};
pub use traits::{CompressedBlock, CompressionBackend, CompressionLevel};
