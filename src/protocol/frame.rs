//! Frame struct with typed accessors.
//!
//! Represents a complete protocol frame with header and payload.
//! Uses `bytes::Bytes` for zero-copy payload sharing, so a frame can be
//! handed to many connection writers without copying.
//!
//! # Example
//!
//! ```
//! use shapewire::protocol::{Frame, HEADER_SIZE};
//!
//! let frame = Frame::build(&b"hello"[..]).unwrap();
//! assert_eq!(frame.payload(), b"hello");
//! assert_eq!(frame.to_bytes().len(), HEADER_SIZE + 5);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{Header, HEADER_SIZE, MAX_DATA_LEN};
use crate::error::{Result, WireError};

/// Characters stripped from raw text frames.
const TEXT_TRIM: &[char] = &['\r', '\n', ' ', '\t'];

/// A complete protocol frame. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    header: Header,
    payload: Bytes,
}

impl Frame {
    /// Build a frame around a payload, stamping the current version.
    ///
    /// Fails with `PayloadTooLarge` above [`MAX_DATA_LEN`].
    pub fn build(payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        if payload.len() > MAX_DATA_LEN {
            return Err(WireError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_DATA_LEN,
            });
        }
        Ok(Self {
            header: Header::new(payload.len() as u16),
            payload,
        })
    }

    /// Build a raw text frame: UTF-8 bytes with no length prefix.
    pub fn text(text: &str) -> Result<Self> {
        Self::build(Bytes::copy_from_slice(text.as_bytes()))
    }

    /// Reassemble a frame from a parsed header and its payload.
    pub(crate) fn from_parts(header: Header, payload: Bytes) -> Self {
        debug_assert_eq!(header.payload_length as usize, payload.len());
        Self { header, payload }
    }

    /// The frame header.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Packed version byte.
    #[inline]
    pub fn version(&self) -> u8 {
        self.header.version
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get a clone of the payload as Bytes (cheap, zero-copy).
    #[inline]
    pub fn payload_bytes(&self) -> Bytes {
        self.payload.clone()
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Interpret the payload as raw text, trimming surrounding whitespace
    /// and line endings.
    pub fn payload_text(&self) -> Result<String> {
        let text = String::from_utf8(self.payload.to_vec())?;
        Ok(text.trim_matches(TEXT_TRIM).to_string())
    }

    /// Serialize as `version ++ len_hi ++ len_lo ++ payload`.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + self.payload.len());
        buf.put_slice(&self.header.encode());
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Encoded header and payload for scatter/gather writes.
    pub fn parts(&self) -> ([u8; HEADER_SIZE], &[u8]) {
        (self.header.encode(), &self.payload)
    }

    /// Total size on the wire (header + payload).
    #[inline]
    pub fn wire_len(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire_format::CURRENT_VERSION;

    #[test]
    fn test_build_hello_world() {
        let data = b"Hello world";
        let frame = Frame::build(&data[..]).unwrap();

        assert_eq!(frame.version(), CURRENT_VERSION);
        assert_eq!(frame.header().payload_length, 11);
        assert_eq!(frame.payload(), data);

        let bytes = frame.to_bytes();
        assert_eq!(bytes.len(), 14);
        assert_eq!(bytes[0], CURRENT_VERSION);
        assert_eq!(&bytes[3..], data);
    }

    #[test]
    fn test_build_rejects_oversized_payload() {
        let result = Frame::build(vec![0u8; MAX_DATA_LEN + 10]);
        assert!(matches!(
            result,
            Err(WireError::PayloadTooLarge { len, max }) if len == MAX_DATA_LEN + 10 && max == MAX_DATA_LEN
        ));
    }

    #[test]
    fn test_build_accepts_max_payload() {
        let frame = Frame::build(vec![7u8; MAX_DATA_LEN]).unwrap();
        assert_eq!(frame.header().payload_length as usize, MAX_DATA_LEN);
        assert_eq!(frame.wire_len(), MAX_DATA_LEN + HEADER_SIZE);
    }

    #[test]
    fn test_empty_payload() {
        let frame = Frame::build(Bytes::new()).unwrap();
        assert_eq!(frame.payload_len(), 0);
        assert_eq!(&frame.to_bytes()[..], &[CURRENT_VERSION, 0, 0]);
    }

    #[test]
    fn test_text_frame_trims() {
        let frame = Frame::text("  Tobias\r\n").unwrap();
        assert_eq!(frame.payload_len(), 10);
        assert_eq!(frame.payload_text().unwrap(), "Tobias");
    }

    #[test]
    fn test_payload_text_rejects_invalid_utf8() {
        let frame = Frame::build(vec![0xff, 0xfe]).unwrap();
        assert!(matches!(frame.payload_text(), Err(WireError::InvalidText(_))));
    }

    #[test]
    fn test_payload_bytes_zero_copy() {
        let original = Bytes::from_static(b"test data");
        let frame = Frame::build(original.clone()).unwrap();

        let cloned = frame.payload_bytes();
        assert_eq!(cloned.as_ptr(), original.as_ptr());
    }

    #[test]
    fn test_parts_match_to_bytes() {
        let frame = Frame::build(&b"abc"[..]).unwrap();
        let (header, payload) = frame.parts();

        let mut joined = header.to_vec();
        joined.extend_from_slice(payload);
        assert_eq!(&joined[..], &frame.to_bytes()[..]);
    }
}
