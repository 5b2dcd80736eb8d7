//! End-to-end tests writing a fresh archive into a memory buffer and
//! checking the produced bytes field by field.

use flate2::read::DeflateDecoder;
use picozip_archive::{CompressionLevel, DosDateTime, ZipWriter};
use std::io::{Cursor, Read};

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[test]
fn test_hello_txt_stored() {
    let mut cursor = Cursor::new(Vec::new());
    let writer = ZipWriter::create(&mut cursor);
    writer
        .add_entry("hello.txt", b"Hello, World!", DosDateTime::default())
        .unwrap();
    writer.finish().unwrap();

    let bytes = cursor.into_inner();
    println!("Archive size: {} bytes", bytes.len());

    // 13 bytes of text cannot shrink under DEFLATE, so the entry is stored:
    // local header (30 + 9), payload (13), central record (46 + 9), end (22).
    assert_eq!(bytes.len(), 30 + 9 + 13 + 46 + 9 + 22);

    // Local file header
    assert_eq!(&bytes[0..4], &[0x50, 0x4B, 0x03, 0x04]);
    assert_eq!(read_u16(&bytes, 4), 20); // version needed
    assert_eq!(read_u16(&bytes, 6), 0x0800); // UTF-8 names
    assert_eq!(read_u16(&bytes, 8), 0); // stored
    assert_eq!(read_u32(&bytes, 14), crc32fast::hash(b"Hello, World!"));
    assert_eq!(read_u32(&bytes, 18), 13); // compressed size
    assert_eq!(read_u32(&bytes, 22), 13); // uncompressed size
    assert_eq!(read_u16(&bytes, 26), 9); // name length
    assert_eq!(read_u16(&bytes, 28), 0); // extra length
    assert_eq!(&bytes[30..39], b"hello.txt");
    assert_eq!(&bytes[39..52], b"Hello, World!");

    // Central directory record
    let cd = 52;
    assert_eq!(&bytes[cd..cd + 4], &[0x50, 0x4B, 0x01, 0x02]);
    assert_eq!(&bytes[cd + 4..cd + 6], &[0x17, 0x0B]);
    assert_eq!(read_u32(&bytes, cd + 42), 0); // header offset

    // End record
    let end = cd + 55;
    assert_eq!(&bytes[end..end + 4], &[0x50, 0x4B, 0x05, 0x06]);
    assert_eq!(read_u16(&bytes, end + 8), 1); // entries on this disk
    assert_eq!(read_u16(&bytes, end + 10), 1); // total entries
    assert_eq!(read_u32(&bytes, end + 12), 55); // central size
    assert_eq!(read_u32(&bytes, end + 16), 52); // central offset
    assert_eq!(read_u16(&bytes, end + 20), 0); // no comment
}

#[test]
fn test_compressible_entry_deflates_and_decodes() {
    let data = b"The quick brown fox jumps over the lazy dog. ".repeat(64);
    let mut cursor = Cursor::new(Vec::new());
    let writer = ZipWriter::create(&mut cursor);
    writer
        .add_entry("fox.txt", &data, DosDateTime::default())
        .unwrap();
    writer.finish().unwrap();

    let bytes = cursor.into_inner();
    assert_eq!(read_u16(&bytes, 8), 8); // deflate
    let compressed_size = read_u32(&bytes, 18) as usize;
    assert!(compressed_size < data.len());
    assert_eq!(read_u32(&bytes, 22) as usize, data.len());

    let payload = &bytes[30 + 7..30 + 7 + compressed_size];
    let mut decoded = Vec::new();
    DeflateDecoder::new(payload).read_to_end(&mut decoded).unwrap();
    assert_eq!(decoded, data);
    assert_eq!(read_u32(&bytes, 14), crc32fast::hash(&data));
}

#[test]
fn test_empty_entry_is_stored() {
    let mut cursor = Cursor::new(Vec::new());
    let writer = ZipWriter::create(&mut cursor);
    writer
        .add_entry("empty", b"", DosDateTime::default())
        .unwrap();
    writer.finish().unwrap();

    let bytes = cursor.into_inner();
    assert_eq!(read_u16(&bytes, 8), 0); // stored
    assert_eq!(read_u32(&bytes, 14), 0); // CRC of nothing
    assert_eq!(read_u32(&bytes, 18), 0);
    assert_eq!(read_u32(&bytes, 22), 0);
}

#[test]
fn test_archive_comment_and_entry_comment() {
    let mut cursor = Cursor::new(Vec::new());
    let writer = ZipWriter::create(&mut cursor).with_comment("made by picozip");
    writer
        .add_entry_with_options(
            "a.txt",
            b"abc",
            DosDateTime::default(),
            CompressionLevel::DEFAULT,
            "entry note",
        )
        .unwrap();
    writer.finish().unwrap();

    let bytes = cursor.into_inner();
    let comment = b"made by picozip";
    assert_eq!(&bytes[bytes.len() - comment.len()..], comment);
    let end = bytes.len() - 22 - comment.len();
    assert_eq!(&bytes[end..end + 4], &[0x50, 0x4B, 0x05, 0x06]);
    assert_eq!(read_u16(&bytes, end + 20) as usize, comment.len());

    let cd = read_u32(&bytes, end + 16) as usize;
    assert_eq!(read_u16(&bytes, cd + 32), 10); // entry comment length
    let name_len = read_u16(&bytes, cd + 28) as usize;
    assert_eq!(&bytes[cd + 46 + name_len..cd + 46 + name_len + 10], b"entry note");
}

#[test]
fn test_names_are_normalized() {
    let mut cursor = Cursor::new(Vec::new());
    let writer = ZipWriter::create(&mut cursor);
    writer
        .add_entry("C:\\docs\\readme.md", b"hi", DosDateTime::default())
        .unwrap();
    writer.finish().unwrap();

    let bytes = cursor.into_inner();
    let name_len = read_u16(&bytes, 26) as usize;
    assert_eq!(&bytes[30..30 + name_len], b"docs/readme.md");
}

#[test]
fn test_entries_in_completion_order() {
    let mut cursor = Cursor::new(Vec::new());
    let writer = ZipWriter::create(&mut cursor);
    for name in ["z.txt", "a.txt", "m.txt"] {
        writer
            .add_entry(name, name.as_bytes(), DosDateTime::default())
            .unwrap();
    }
    writer.finish().unwrap();

    let bytes = cursor.into_inner();
    let end = bytes.len() - 22;
    let mut cd = read_u32(&bytes, end + 16) as usize;
    let mut names = Vec::new();
    for _ in 0..read_u16(&bytes, end + 10) {
        assert_eq!(&bytes[cd..cd + 4], &[0x50, 0x4B, 0x01, 0x02]);
        let name_len = read_u16(&bytes, cd + 28) as usize;
        let comment_len = read_u16(&bytes, cd + 32) as usize;
        names.push(String::from_utf8(bytes[cd + 46..cd + 46 + name_len].to_vec()).unwrap());
        cd += 46 + name_len + comment_len;
    }
    // Single-threaded additions keep their call order on disk.
    assert_eq!(names, ["z.txt", "a.txt", "m.txt"]);
}
