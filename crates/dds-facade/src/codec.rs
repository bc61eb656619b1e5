// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CDR little-endian codec for [`Record`].
//!
//! # Layout
//!
//! ```text
//! offset  size  field
//! 0       4     encapsulation header 00 01 00 00 (CDR_LE)
//! 4       4     index (u32 LE)
//! 8       4     string length incl. NUL (u32 LE)
//! 12      n     UTF-8 bytes
//! 12+n    1     NUL terminator
//! ```
//!
//! This is the byte form a `struct HelloWorld { unsigned long index;
//! string message; }` takes inside a DDS serialized payload.

use crate::{Error, Record, Result};

/// CDR_LE encapsulation identifier + options.
pub const ENCAPSULATION_CDR_LE: [u8; 4] = [0x00, 0x01, 0x00, 0x00];

const HEADER_LEN: usize = ENCAPSULATION_CDR_LE.len();
const FIXED_LEN: usize = HEADER_LEN + 4 + 4;

/// Generate write methods for primitive types.
macro_rules! impl_write_le {
    ($name:ident, $type:ty) => {
        fn $name(&mut self, value: $type) -> Result<()> {
            self.write_bytes(&value.to_le_bytes())
        }
    };
}

/// Generate read methods for primitive types.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        fn $name(&mut self) -> Result<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.read_bytes($size)?);
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Bounds-checked write cursor
struct CursorMut<'a> {
    buffer: &'a mut [u8],
    offset: usize,
}

impl<'a> CursorMut<'a> {
    fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_write_le!(write_u32_le, u32);

    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        if self.offset + data.len() > self.buffer.len() {
            return Err(Error::MalformedRecord(format!(
                "write overflow at offset {}",
                self.offset
            )));
        }
        self.buffer[self.offset..self.offset + data.len()].copy_from_slice(data);
        self.offset += data.len();
        Ok(())
    }
}

/// Bounds-checked read cursor
struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_le!(read_u32_le, u32, 4);

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::MalformedRecord(format!(
                "unexpected end of buffer at offset {} (need {}, have {})",
                self.offset,
                len,
                self.remaining()
            )));
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }
}

/// Size of `record` once encoded.
pub fn encoded_len(record: &Record) -> usize {
    FIXED_LEN + record.message().len() + 1
}

/// Encode a record into a fresh buffer.
///
/// Fails only when the message does not fit the `u32` length field.
pub fn encode(record: &Record) -> Result<Vec<u8>> {
    wire_len(record)?;
    let mut buf = vec![0u8; encoded_len(record)];
    encode_into(record, &mut buf)?;
    Ok(buf)
}

/// Encode into a caller-provided buffer, returning the bytes written.
pub fn encode_into(record: &Record, buf: &mut [u8]) -> Result<usize> {
    let text = record.message().as_bytes();
    let wire_len = wire_len(record)?;

    let mut cursor = CursorMut::new(buf);
    cursor.write_bytes(&ENCAPSULATION_CDR_LE)?;
    cursor.write_u32_le(record.index())?;
    cursor.write_u32_le(wire_len)?;
    cursor.write_bytes(text)?;
    cursor.write_u8(0)?;
    Ok(cursor.offset)
}

fn wire_len(record: &Record) -> Result<u32> {
    u32::try_from(record.message().len() + 1)
        .map_err(|_| Error::MalformedRecord("message length exceeds u32".into()))
}

/// Decode a record, rejecting anything that is not exactly one record.
pub fn decode(buf: &[u8]) -> Result<Record> {
    let mut cursor = Cursor::new(buf);

    let header = cursor.read_bytes(HEADER_LEN)?;
    if header != ENCAPSULATION_CDR_LE {
        return Err(Error::MalformedRecord(format!(
            "unsupported encapsulation {:02x?}",
            header
        )));
    }

    let index = cursor.read_u32_le()?;
    let wire_len = cursor.read_u32_le()? as usize;
    if wire_len == 0 {
        return Err(Error::MalformedRecord(
            "string length 0 (missing terminator)".into(),
        ));
    }

    let bytes = cursor.read_bytes(wire_len)?;
    let (text, terminator) = bytes.split_at(wire_len - 1);
    if terminator != [0] {
        return Err(Error::MalformedRecord("string not NUL-terminated".into()));
    }

    if cursor.remaining() != 0 {
        return Err(Error::MalformedRecord(format!(
            "{} trailing bytes",
            cursor.remaining()
        )));
    }

    let message = std::str::from_utf8(text)
        .map_err(|e| Error::MalformedRecord(format!("invalid UTF-8: {}", e)))?;

    Ok(Record::new(index, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let buf = encode(&Record::new(0x0102_0304, "hi")).expect("encode");
        assert_eq!(
            buf,
            [0x00, 0x01, 0x00, 0x00, 0x04, 0x03, 0x02, 0x01, 0x03, 0x00, 0x00, 0x00, b'h', b'i', 0x00]
        );
        assert_eq!(buf.len(), encoded_len(&Record::new(0, "hi")));
    }

    #[test]
    fn test_roundtrip_empty_and_unicode() {
        for record in [Record::new(0, ""), Record::new(u32::MAX, "température °C ✓")] {
            let bytes = encode(&record).expect("encode");
            assert_eq!(decode(&bytes).expect("decode"), record);
        }
    }

    #[test]
    fn test_encode_into_small_buffer_fails() {
        let mut buf = [0u8; 8];
        assert!(matches!(
            encode_into(&Record::new(1, "x"), &mut buf),
            Err(Error::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_decode_truncated() {
        let buf = encode(&Record::new(1, "hello")).expect("encode");
        for cut in [0, 3, 7, 11, buf.len() - 1] {
            assert!(
                matches!(decode(&buf[..cut]), Err(Error::MalformedRecord(_))),
                "cut at {} should fail",
                cut
            );
        }
    }

    #[test]
    fn test_decode_bad_header() {
        let mut buf = encode(&Record::new(1, "hello")).expect("encode");
        buf[1] = 0x00; // CDR_BE
        assert!(matches!(decode(&buf), Err(Error::MalformedRecord(_))));
    }

    #[test]
    fn test_decode_missing_terminator() {
        let mut buf = encode(&Record::new(1, "hello")).expect("encode");
        let last = buf.len() - 1;
        buf[last] = b'!';
        assert!(matches!(decode(&buf), Err(Error::MalformedRecord(_))));
    }

    #[test]
    fn test_decode_zero_length_string() {
        let mut buf = encode(&Record::new(1, "")).expect("encode");
        buf[8..12].copy_from_slice(&0u32.to_le_bytes());
        buf.truncate(12);
        assert!(matches!(decode(&buf), Err(Error::MalformedRecord(_))));
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut buf = encode(&Record::new(1, "hello")).expect("encode");
        buf.push(0xAA);
        assert!(matches!(decode(&buf), Err(Error::MalformedRecord(_))));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut buf = encode(&Record::new(1, "ab")).expect("encode");
        buf[12] = 0xFF;
        assert!(matches!(decode(&buf), Err(Error::MalformedRecord(_))));
    }
}
