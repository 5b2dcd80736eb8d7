//! The archive writer.
//!
//! [`ZipWriter`] appends entries to a seekable stream, either a fresh one
//! or an existing archive recovered by the tail scan. Entry compression
//! happens on the calling thread outside the append gate, so any number of
//! threads can prepare entries in parallel while the stream writes stay
//! serialized.

use std::borrow::Cow;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, Write};
use std::path::Path;

use picozip_core::{CompressionBackend, CompressionLevel, PicoZipError, Result};
use picozip_deflate::DeflateBackend;

use crate::date::DosDateTime;
use crate::gate::AppendGate;
use crate::record::{
    CompressionMethod, EntryRecord, SIZE_LIMIT, encode_central_record, encode_end_record,
    encode_local_header, encode_text, normalize_name,
};
use crate::tail::recover_directory;

/// Everything the gate guards: the stream plus the entry bookkeeping that
/// must stay consistent with it.
#[derive(Debug)]
struct ArchiveState<S> {
    /// `None` once the archive has been finalized.
    stream: Option<S>,
    /// Entries written by this writer, in completion order.
    entries: Vec<EntryRecord>,
    /// Entry count carried over from an appended archive.
    existing_entries: u16,
    /// Central directory image carried over from an appended archive,
    /// replayed verbatim at finalize.
    central_image: Vec<u8>,
}

/// A multi-threaded, appendable ZIP archive writer.
///
/// Shared by reference across threads; every `add_*` method takes `&self`.
/// [`finish`](Self::finish) consumes the writer, so an archive cannot be
/// finalized twice or written to afterwards. A writer dropped without
/// `finish` finalizes itself, discarding any error.
#[derive(Debug)]
pub struct ZipWriter<S: Write + Seek, B: CompressionBackend = DeflateBackend> {
    gate: AppendGate<ArchiveState<S>>,
    backend: B,
    level: CompressionLevel,
    utf8_names: bool,
    comment: String,
}

impl<S: Write + Seek> ZipWriter<S> {
    /// Start a new archive on `stream` with the default DEFLATE backend.
    pub fn create(stream: S) -> Self {
        Self::create_with_backend(stream, DeflateBackend::new())
    }

    /// Open an existing archive on `stream` for appending with the default
    /// DEFLATE backend.
    pub fn append(stream: S) -> Result<Self>
    where
        S: Read,
    {
        Self::append_with_backend(stream, DeflateBackend::new())
    }
}

impl ZipWriter<File> {
    /// Create a new archive file at `path`, truncating anything there.
    pub fn create_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::create(File::create(path)?))
    }

    /// Open the archive file at `path` for appending.
    pub fn append_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Self::append(file)
    }
}

impl<S: Write + Seek, B: CompressionBackend> ZipWriter<S, B> {
    /// Start a new archive on `stream` with a custom backend.
    pub fn create_with_backend(stream: S, backend: B) -> Self {
        Self {
            gate: AppendGate::new(ArchiveState {
                stream: Some(stream),
                entries: Vec::new(),
                existing_entries: 0,
                central_image: Vec::new(),
            }),
            backend,
            level: CompressionLevel::default(),
            utf8_names: true,
            comment: String::new(),
        }
    }

    /// Open an existing archive for appending with a custom backend.
    ///
    /// Runs the end-record scan; the recovered central directory is held in
    /// memory and the stream is positioned so new entries overwrite it.
    pub fn append_with_backend(mut stream: S, backend: B) -> Result<Self>
    where
        S: Read,
    {
        let recovered = recover_directory(&mut stream)?;
        Ok(Self {
            gate: AppendGate::new(ArchiveState {
                stream: Some(stream),
                entries: Vec::new(),
                existing_entries: recovered.entries,
                central_image: recovered.image,
            }),
            backend,
            level: CompressionLevel::default(),
            utf8_names: true,
            comment: String::new(),
        })
    }

    /// Set the default compression level for subsequent entries.
    pub fn with_level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Choose between UTF-8 names (the default) and the ASCII subset.
    pub fn with_utf8_names(mut self, utf8: bool) -> Self {
        self.utf8_names = utf8;
        self
    }

    /// Set the archive comment written into the end record.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Number of entries added through this writer so far.
    pub fn entry_count(&self) -> usize {
        self.gate.enter().entries.len()
    }

    /// Add an entry with the writer's default level and no comment.
    pub fn add_entry(&self, name: &str, data: &[u8], modified: DosDateTime) -> Result<()> {
        self.add_entry_with_options(name, data, modified, self.level, "")
    }

    /// Add an entry with an explicit level and per-entry comment.
    ///
    /// The data is compressed before the gate is taken; the entry is stored
    /// uncompressed when the level is 0, the data is empty, or DEFLATE does
    /// not make it smaller. Safe to call from many threads at once.
    pub fn add_entry_with_options(
        &self,
        name: &str,
        data: &[u8],
        modified: DosDateTime,
        level: CompressionLevel,
        comment: &str,
    ) -> Result<()> {
        let name = normalize_name(name);
        if data.len() as u64 > SIZE_LIMIT {
            return Err(PicoZipError::size_exceeded(name, data.len() as u64, SIZE_LIMIT));
        }

        let (method, payload, crc32): (CompressionMethod, Cow<'_, [u8]>, u32) =
            if level == CompressionLevel::NONE || data.is_empty() {
                (CompressionMethod::Store, Cow::Borrowed(data), self.backend.crc32(data))
            } else {
                match self.backend.deflate(data, level)? {
                    Some(block) => (
                        CompressionMethod::Deflate,
                        Cow::Owned(block.bytes),
                        block.crc32,
                    ),
                    None => (
                        CompressionMethod::Store,
                        Cow::Borrowed(data),
                        self.backend.crc32(data),
                    ),
                }
            };

        let mut entry = EntryRecord {
            method,
            name,
            crc32,
            compressed_size: payload.len() as u32,
            uncompressed_size: data.len() as u32,
            header_offset: 0,
            modified,
            comment: comment.to_string(),
            utf8: self.utf8_names,
        };
        // The local header does not depend on the offset, so it can be
        // rendered before the gate. This also validates both encodings, so
        // neither this entry's write nor finalize can fail on them later.
        let header = encode_local_header(&entry)?;
        encode_text(&entry.comment, entry.utf8)?;

        let mut state = self.gate.enter();
        let stream = state.stream.as_mut().ok_or(PicoZipError::Finished)?;
        let offset = stream.stream_position()?;
        // Where the entry would end, header included. Rejecting here keeps
        // the stream untouched and every 32-bit offset field representable.
        let projected_end = offset + header.len() as u64 + payload.len() as u64;
        if projected_end > SIZE_LIMIT {
            return Err(PicoZipError::size_exceeded(
                entry.name.clone(),
                projected_end,
                SIZE_LIMIT,
            ));
        }
        entry.header_offset = offset as u32;
        stream.write_all(&header)?;
        stream.write_all(&payload)?;
        state.entries.push(entry);
        Ok(())
    }

    /// Read a file from disk and add it under `name` with a per-entry
    /// comment (pass `""` for none).
    ///
    /// The entry timestamp comes from the file's modification time, falling
    /// back to the DOS epoch when it is unavailable or out of range.
    pub fn add_path(&self, path: impl AsRef<Path>, name: &str, comment: &str) -> Result<()> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let modified = fs::metadata(path)?
            .modified()
            .ok()
            .and_then(|t| DosDateTime::try_from(t).ok())
            .unwrap_or_default();
        self.add_entry_with_options(name, &data, modified, self.level, comment)
    }

    /// Finalize the archive: replay any recovered central directory, write
    /// one central record per new entry, then the end record, and flush.
    pub fn finish(self) -> Result<()> {
        self.finish_inner()
    }

    fn finish_inner(&self) -> Result<()> {
        let comment = encode_text(&self.comment, self.utf8_names)?;

        let mut state = self.gate.enter();
        let Some(mut stream) = state.stream.take() else {
            return Ok(());
        };
        let central_offset = stream.stream_position()?;
        if central_offset > SIZE_LIMIT {
            return Err(PicoZipError::size_exceeded("archive", central_offset, SIZE_LIMIT));
        }

        stream.write_all(&state.central_image)?;
        let mut central_size = state.central_image.len() as u64;
        for entry in &state.entries {
            let record = encode_central_record(entry)?;
            stream.write_all(&record)?;
            central_size += record.len() as u64;
        }

        // Count fields are 16-bit; larger archives wrap, as the format
        // subset without ZIP64 cannot express them.
        let total = state
            .existing_entries
            .wrapping_add((state.entries.len() & 0xFFFF) as u16);
        let end = encode_end_record(total, central_size as u32, central_offset as u32, &comment)?;
        stream.write_all(&end)?;
        stream.flush()?;
        Ok(())
    }
}

impl<S: Write + Seek, B: CompressionBackend> Drop for ZipWriter<S, B> {
    fn drop(&mut self) {
        let _ = self.finish_inner();
    }
}
