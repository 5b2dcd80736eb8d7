//! Recovery of an existing archive's central directory for append mode.
//!
//! The end record sits at the tail of the file, followed only by the
//! archive comment. It is located by scanning backwards for its signature:
//! starting 17 bytes from the end (the last position where a 22-byte record
//! followed by a non-empty comment could still begin within the probe
//! stride), stepping back 5 bytes and reading a 4-byte signature each
//! round, for a net movement of one byte per iteration.
//!
//! The central directory bytes are kept verbatim as an opaque image and
//! replayed unchanged at finalize; they are never re-parsed into entries.

use std::io::{Read, Seek, SeekFrom};

use picozip_core::{PicoZipError, Result};

use crate::record::END_RECORD_SIGNATURE;

/// Smallest possible archive: one bare end record.
const END_RECORD_LEN: u64 = 22;

/// What append mode carries over from an existing archive.
#[derive(Debug, Clone)]
pub struct RecoveredDirectory {
    /// The central directory bytes, copied verbatim.
    pub image: Vec<u8>,
    /// Total entry count from the end record.
    pub entries: u16,
}

/// Locate the end record, copy the central directory image, and leave the
/// stream positioned at the start of the central directory so that new
/// entry data overwrites it.
pub fn recover_directory<S: Read + Seek>(stream: &mut S) -> Result<RecoveredDirectory> {
    let stream_len = stream.seek(SeekFrom::End(0))?;
    if stream_len < END_RECORD_LEN {
        return Err(PicoZipError::invalid_format(format!(
            "{stream_len} bytes is too short to hold an end record"
        )));
    }

    let mut pos = stream_len - 17;
    loop {
        if pos < 5 {
            return Err(PicoZipError::invalid_format("end record signature not found"));
        }
        pos -= 5;
        stream.seek(SeekFrom::Start(pos))?;
        if read_u32(stream)? == END_RECORD_SIGNATURE {
            break;
        }
        // The read advanced 4 bytes, so the next probe lands 1 byte earlier.
        pos += 4;
    }

    // Skip disk number, central directory disk, and this-disk entry count.
    stream.seek(SeekFrom::Current(6))?;
    let entries = read_u16(stream)?;
    let central_size = u64::from(read_u32(stream)?);
    let central_offset = u64::from(read_u32(stream)?);
    let comment_len = u64::from(read_u16(stream)?);

    if pos + END_RECORD_LEN + comment_len != stream_len {
        return Err(PicoZipError::invalid_format(
            "end record does not terminate the stream",
        ));
    }
    if central_offset + central_size > pos {
        return Err(PicoZipError::invalid_format(
            "central directory extends past its end record",
        ));
    }

    stream.seek(SeekFrom::Start(central_offset))?;
    let mut image = vec![0u8; central_size as usize];
    stream.read_exact(&mut image)?;

    stream.seek(SeekFrom::Start(central_offset))?;
    Ok(RecoveredDirectory { image, entries })
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::encode_end_record;
    use std::io::Cursor;

    fn archive_with(image: &[u8], entries: u16, comment: &[u8]) -> Vec<u8> {
        let mut bytes = image.to_vec();
        let end = encode_end_record(entries, image.len() as u32, 0, comment).unwrap();
        bytes.extend_from_slice(&end);
        bytes
    }

    #[test]
    fn test_recover_empty_archive() {
        let bytes = archive_with(&[], 0, b"");
        let mut cursor = Cursor::new(bytes);
        let recovered = recover_directory(&mut cursor).unwrap();
        assert_eq!(recovered.entries, 0);
        assert!(recovered.image.is_empty());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_recover_with_image_and_comment() {
        let image = vec![0xAB; 130];
        let bytes = archive_with(&image, 7, b"trailing comment");
        let mut cursor = Cursor::new(bytes);
        let recovered = recover_directory(&mut cursor).unwrap();
        assert_eq!(recovered.entries, 7);
        assert_eq!(recovered.image, image);
        // Positioned at the central directory, ready to be overwritten.
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_image_at_nonzero_offset() {
        let mut bytes = vec![0x11; 40]; // stands in for entry data
        let image = vec![0xCD; 46];
        bytes.extend_from_slice(&image);
        let end = encode_end_record(1, image.len() as u32, 40, b"").unwrap();
        bytes.extend_from_slice(&end);
        let mut cursor = Cursor::new(bytes);
        let recovered = recover_directory(&mut cursor).unwrap();
        assert_eq!(recovered.image, image);
        assert_eq!(cursor.position(), 40);
    }

    #[test]
    fn test_too_short_stream() {
        let mut cursor = Cursor::new(vec![0u8; 21]);
        assert!(matches!(
            recover_directory(&mut cursor),
            Err(PicoZipError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_garbage_stream() {
        let mut cursor = Cursor::new(vec![0x42u8; 200]);
        assert!(matches!(
            recover_directory(&mut cursor),
            Err(PicoZipError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_truncated_after_end_record() {
        // Comment length claims more bytes than the stream holds.
        let mut bytes = archive_with(&[], 0, b"comment");
        bytes.truncate(bytes.len() - 3);
        let mut cursor = Cursor::new(bytes);
        assert!(matches!(
            recover_directory(&mut cursor),
            Err(PicoZipError::InvalidFormat { .. })
        ));
    }
}
