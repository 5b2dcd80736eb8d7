//! ZIP record encoding.
//!
//! Pure functions that render the three on-disk record kinds as byte
//! vectors: the local file header written before each payload, the central
//! directory record written per entry at finalize, and the single end
//! record that closes the archive. All multi-byte fields are little-endian.
//!
//! The writer emits a fixed subset of the format: version-needed 2.0, no
//! extra fields, no ZIP64, entry counts and sizes capped at their 16/32-bit
//! widths.

use picozip_core::{PicoZipError, Result};

use crate::date::DosDateTime;

/// Local file header signature, `PK\x03\x04`.
pub const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4B50;
/// Central directory record signature, `PK\x01\x02`.
pub const CENTRAL_RECORD_SIGNATURE: u32 = 0x0201_4B50;
/// End of central directory signature, `PK\x05\x06`.
pub const END_RECORD_SIGNATURE: u32 = 0x0605_4B50;

/// Minimum ZIP version needed to extract (2.0: Deflate, no ZIP64).
pub const VERSION_NEEDED: u16 = 20;
/// Version-made-by: format 2.3 (0x17), host 11.
const VERSION_MADE_BY: [u8; 2] = [0x17, 0x0B];
/// General purpose flag bit 11: names and comments are UTF-8.
const UTF8_FLAG: u16 = 0x0800;
/// External file attributes for a plain archive file.
const EXTERNAL_ATTRIBUTES: u32 = 0x8100;

/// Largest size or offset the writer accepts. Staying 56 bytes short of
/// `i32::MAX` leaves room for the entry's own records without any 32-bit
/// field overflowing.
pub const SIZE_LIMIT: u64 = i32::MAX as u64 - 56;

/// How an entry's payload is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Uncompressed.
    Store,
    /// Raw DEFLATE (RFC 1951).
    Deflate,
}

impl CompressionMethod {
    /// The method identifier used in headers.
    pub fn id(&self) -> u16 {
        match self {
            Self::Store => 0,
            Self::Deflate => 8,
        }
    }
}

/// Everything recorded about one written entry, enough to render its
/// central directory record at finalize time.
#[derive(Debug, Clone)]
pub struct EntryRecord {
    /// Payload encoding.
    pub method: CompressionMethod,
    /// Normalized name inside the archive.
    pub name: String,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Payload size as written.
    pub compressed_size: u32,
    /// Original data size.
    pub uncompressed_size: u32,
    /// Absolute stream offset of the local file header.
    pub header_offset: u32,
    /// Modification timestamp.
    pub modified: DosDateTime,
    /// Per-entry comment, central record only.
    pub comment: String,
    /// Whether name and comment are encoded as UTF-8.
    pub utf8: bool,
}

impl EntryRecord {
    fn flags(&self) -> u16 {
        if self.utf8 { UTF8_FLAG } else { 0 }
    }
}

/// Normalize a path for storage inside the archive.
///
/// Backslashes become forward slashes, any drive or scheme prefix up to and
/// including the last colon is removed, and leading/trailing slashes are
/// trimmed. The result is deterministic and the function is idempotent:
/// stripping through the last colon leaves no colon for a second pass to
/// act on.
pub fn normalize_name(name: &str) -> String {
    let slashed = name.replace('\\', "/");
    let without_drive = match slashed.rfind(':') {
        Some(pos) => &slashed[pos + 1..],
        None => slashed.as_str(),
    };
    without_drive.trim_matches('/').to_string()
}

/// Encode a name or comment in the archive's text encoding.
///
/// With the UTF-8 flag the string's bytes pass through unchanged. Without
/// it, text must fall in the ASCII subset shared with code page 437; other
/// characters are rejected rather than mangled.
pub fn encode_text(text: &str, utf8: bool) -> Result<Vec<u8>> {
    if !utf8 && !text.is_ascii() {
        return Err(PicoZipError::encoding(format!(
            "{text:?} is not representable without the UTF-8 flag"
        )));
    }
    Ok(text.as_bytes().to_vec())
}

/// Render the local file header (30 bytes plus the name).
pub fn encode_local_header(entry: &EntryRecord) -> Result<Vec<u8>> {
    let name = encode_text(&entry.name, entry.utf8)?;
    let name_len = text_len(&entry.name, &name)?;

    let mut buf = Vec::with_capacity(30 + name.len());
    buf.extend_from_slice(&LOCAL_HEADER_SIGNATURE.to_le_bytes());
    buf.extend_from_slice(&VERSION_NEEDED.to_le_bytes());
    buf.extend_from_slice(&entry.flags().to_le_bytes());
    buf.extend_from_slice(&entry.method.id().to_le_bytes());
    buf.extend_from_slice(&entry.modified.packed().to_le_bytes());
    buf.extend_from_slice(&entry.crc32.to_le_bytes());
    buf.extend_from_slice(&entry.compressed_size.to_le_bytes());
    buf.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
    buf.extend_from_slice(&name_len.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes()); // extra field length
    buf.extend_from_slice(&name);
    Ok(buf)
}

/// Render one central directory record (46 bytes plus name and comment).
pub fn encode_central_record(entry: &EntryRecord) -> Result<Vec<u8>> {
    let name = encode_text(&entry.name, entry.utf8)?;
    let comment = encode_text(&entry.comment, entry.utf8)?;
    let name_len = text_len(&entry.name, &name)?;
    let comment_len = text_len(&entry.comment, &comment)?;

    let mut buf = Vec::with_capacity(46 + name.len() + comment.len());
    buf.extend_from_slice(&CENTRAL_RECORD_SIGNATURE.to_le_bytes());
    buf.extend_from_slice(&VERSION_MADE_BY);
    buf.extend_from_slice(&VERSION_NEEDED.to_le_bytes());
    buf.extend_from_slice(&entry.flags().to_le_bytes());
    buf.extend_from_slice(&entry.method.id().to_le_bytes());
    buf.extend_from_slice(&entry.modified.packed().to_le_bytes());
    buf.extend_from_slice(&entry.crc32.to_le_bytes());
    buf.extend_from_slice(&entry.compressed_size.to_le_bytes());
    buf.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
    buf.extend_from_slice(&name_len.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes()); // extra field length
    buf.extend_from_slice(&comment_len.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes()); // disk number start
    buf.extend_from_slice(&0u16.to_le_bytes()); // internal attributes
    buf.extend_from_slice(&EXTERNAL_ATTRIBUTES.to_le_bytes());
    buf.extend_from_slice(&entry.header_offset.to_le_bytes());
    buf.extend_from_slice(&name);
    buf.extend_from_slice(&comment);
    Ok(buf)
}

/// Render the end-of-central-directory record (22 bytes plus the comment).
///
/// `total_entries` already includes entries carried over from an appended
/// archive; counts wrap at 65536, a limit inherited from the no-ZIP64
/// format subset.
pub fn encode_end_record(
    total_entries: u16,
    central_size: u32,
    central_offset: u32,
    comment: &[u8],
) -> Result<Vec<u8>> {
    let comment_len = u16::try_from(comment.len()).map_err(|_| {
        PicoZipError::encoding(format!("archive comment of {} bytes", comment.len()))
    })?;

    let mut buf = Vec::with_capacity(22 + comment.len());
    buf.extend_from_slice(&END_RECORD_SIGNATURE.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes()); // this disk
    buf.extend_from_slice(&0u16.to_le_bytes()); // disk with central directory
    buf.extend_from_slice(&total_entries.to_le_bytes());
    buf.extend_from_slice(&total_entries.to_le_bytes());
    buf.extend_from_slice(&central_size.to_le_bytes());
    buf.extend_from_slice(&central_offset.to_le_bytes());
    buf.extend_from_slice(&comment_len.to_le_bytes());
    buf.extend_from_slice(comment);
    Ok(buf)
}

fn text_len(text: &str, encoded: &[u8]) -> Result<u16> {
    u16::try_from(encoded.len())
        .map_err(|_| PicoZipError::encoding(format!("{text:?} exceeds 65535 encoded bytes")))
}
