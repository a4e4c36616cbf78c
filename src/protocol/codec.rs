// src/protocol/codec.rs

//! Binary codec for the plugin-messaging wire format.
//!
//! The format is the DataOutput-style layout the proxy expects:
//!
//! - strings: 2-byte big-endian length prefix, then that many UTF-8 bytes
//! - integers: big-endian, fixed width
//! - opaque blobs: 2-byte big-endian length prefix, then raw bytes
//!
//! [`ByteReader`] advances a cursor over a borrowed input slice and never
//! copies the remaining buffer. [`ByteWriter`] appends to a growable output
//! buffer. Neither retains buffers across calls.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{Error, Result};

/// Advancing read cursor over an inbound frame.
pub struct ByteReader<'a> {
    // ---
    buf: &'a [u8],
}

impl<'a> ByteReader<'a> {
    // ---

    /// Wrap a frame for decoding.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Split off the next `n` bytes, advancing the cursor.
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        // ---
        if self.buf.len() < n {
            return Err(Error::TruncatedInput {
                needed: n - self.buf.len(),
                remaining: self.buf.len(),
            });
        }

        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    /// Read a big-endian unsigned 16-bit integer.
    pub fn read_u16(&mut self) -> Result<u16> {
        let mut head = self.take(2)?;
        Ok(head.get_u16())
    }

    /// Read a big-endian signed 32-bit integer.
    pub fn read_i32(&mut self) -> Result<i32> {
        let mut head = self.take(4)?;
        Ok(head.get_i32())
    }

    /// Read a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// - `TruncatedInput` if fewer bytes remain than the prefix declares
    /// - `MalformedFrame` if the body is not valid UTF-8
    pub fn read_string(&mut self) -> Result<String> {
        // ---
        let len = self.read_u16()? as usize;
        let raw = self.take(len)?;

        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|e| Error::MalformedFrame(format!("invalid utf-8 in string field: {e}")))
    }

    /// Read a length-prefixed opaque payload.
    pub fn read_blob(&mut self) -> Result<Vec<u8>> {
        // ---
        let len = self.read_u16()? as usize;
        Ok(self.take(len)?.to_vec())
    }
}

/// Growable output buffer for outbound frames.
#[derive(Default)]
pub struct ByteWriter {
    // ---
    buf: BytesMut,
}

impl ByteWriter {
    // ---

    pub fn new() -> Self {
        Self::default()
    }

    /// Append a big-endian unsigned 16-bit integer.
    pub fn write_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    /// Append a big-endian signed 32-bit integer.
    pub fn write_i32(&mut self, v: i32) {
        self.buf.put_i32(v);
    }

    /// Append a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Oversized`] if the string's UTF-8 encoding exceeds
    /// the 16-bit length prefix.
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_len_prefixed(s.as_bytes())
    }

    /// Append a length-prefixed opaque payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Oversized`] if the payload exceeds the 16-bit length
    /// prefix.
    pub fn write_blob(&mut self, data: &[u8]) -> Result<()> {
        self.write_len_prefixed(data)
    }

    fn write_len_prefixed(&mut self, body: &[u8]) -> Result<()> {
        // ---
        let len = u16::try_from(body.len()).map_err(|_| Error::Oversized { len: body.len() })?;

        self.buf.put_u16(len);
        self.buf.put_slice(body);
        Ok(())
    }

    /// Freeze the accumulated frame.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_string_round_trip() {
        // ---
        let mut w = ByteWriter::new();
        w.write_string("lobby-1").unwrap();
        let frame = w.into_bytes();

        assert_eq!(&frame[..2], &[0x00, 0x07]);

        let mut r = ByteReader::new(&frame);
        assert_eq!(r.read_string().unwrap(), "lobby-1");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_empty_string_round_trip() {
        // ---
        let mut w = ByteWriter::new();
        w.write_string("").unwrap();
        let frame = w.into_bytes();

        let mut r = ByteReader::new(&frame);
        assert_eq!(r.read_string().unwrap(), "");
    }

    #[test]
    fn test_non_ascii_string_round_trip() {
        // ---
        let mut w = ByteWriter::new();
        w.write_string("Überserver").unwrap();
        let frame = w.into_bytes();

        let mut r = ByteReader::new(&frame);
        assert_eq!(r.read_string().unwrap(), "Überserver");
    }

    #[test]
    fn test_ints_big_endian() {
        // ---
        let mut w = ByteWriter::new();
        w.write_i32(25565);
        w.write_u16(25577);
        let frame = w.into_bytes();

        assert_eq!(&frame[..], &[0x00, 0x00, 0x63, 0xDD, 0x63, 0xE9]);

        let mut r = ByteReader::new(&frame);
        assert_eq!(r.read_i32().unwrap(), 25565);
        assert_eq!(r.read_u16().unwrap(), 25577);
    }

    #[test]
    fn test_blob_round_trip() {
        // ---
        let data = vec![0xDE, 0xAD, 0xBE, 0xEF];

        let mut w = ByteWriter::new();
        w.write_blob(&data).unwrap();
        let frame = w.into_bytes();

        let mut r = ByteReader::new(&frame);
        assert_eq!(r.read_blob().unwrap(), data);
    }

    #[test]
    fn test_truncated_string_body() {
        // ---
        // Declares 5 bytes, provides 2.
        let frame = [0x00, 0x05, b'a', b'b'];

        let mut r = ByteReader::new(&frame);
        let err = r.read_string().unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedInput {
                needed: 3,
                remaining: 2
            }
        ));
    }

    #[test]
    fn test_truncated_int() {
        // ---
        let frame = [0x00, 0x00, 0x01];

        let mut r = ByteReader::new(&frame);
        assert!(matches!(r.read_i32(), Err(Error::TruncatedInput { .. })));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        // ---
        let frame = [0x00, 0x02, 0xFF, 0xFE];

        let mut r = ByteReader::new(&frame);
        assert!(matches!(r.read_string(), Err(Error::MalformedFrame(_))));
    }

    #[test]
    fn test_oversized_blob_rejected() {
        // ---
        let data = vec![0u8; u16::MAX as usize + 1];

        let mut w = ByteWriter::new();
        let err = w.write_blob(&data).unwrap_err();
        assert!(matches!(err, Error::Oversized { len } if len == data.len()));
    }

    #[test]
    fn test_reader_advances_without_copy() {
        // ---
        let mut w = ByteWriter::new();
        w.write_string("a").unwrap();
        w.write_string("b").unwrap();
        let frame = w.into_bytes();

        let mut r = ByteReader::new(&frame);
        assert_eq!(r.read_string().unwrap(), "a");
        assert_eq!(r.remaining(), 3);
        assert_eq!(r.read_string().unwrap(), "b");
        assert_eq!(r.remaining(), 0);
    }
}
