//! Push-based frame assembly for chunked socket reads.
//!
//! Bytes arrive in whatever pieces the socket hands out. The buffer keeps
//! them in a `BytesMut` and moves between two states:
//! - `WaitingForHeader`: fewer than [`HEADER_SIZE`] bytes buffered
//! - `WaitingForPayload`: header validated, `payload_length` bytes to go
//!
//! # Example
//!
//! ```
//! use shapewire::protocol::{Frame, FrameBuffer};
//!
//! let bytes = Frame::build(&b"chunked"[..]).unwrap().to_bytes();
//! let mut buffer = FrameBuffer::new();
//!
//! assert!(buffer.push(&bytes[..4]).unwrap().is_empty());
//! let frames = buffer.push(&bytes[4..]).unwrap();
//! assert_eq!(frames[0].payload(), b"chunked");
//! ```

use bytes::{Bytes, BytesMut};

use super::wire_format::{Header, HEADER_SIZE};
use super::Frame;
use crate::error::Result;

/// Default initial buffer capacity.
const DEFAULT_CAPACITY: usize = 8 * 1024;

/// Assembly state.
#[derive(Debug, Clone)]
enum State {
    /// Header not complete yet.
    WaitingForHeader,
    /// Header accepted; its payload is still arriving.
    WaitingForPayload { header: Header },
}

/// Accumulates stream bytes and yields every frame they complete.
///
/// The version is checked as soon as a header is complete, so a bad peer is
/// rejected before its payload arrives.
pub struct FrameBuffer {
    buffer: BytesMut,
    state: State,
}

impl FrameBuffer {
    /// Create a new frame buffer.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new frame buffer with a custom initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            state: State::WaitingForHeader,
        }
    }

    /// Append `data` and return the frames it completes, in order.
    ///
    /// Partial data is kept for the next push.
    ///
    /// # Errors
    ///
    /// Returns `InvalidVersion` when a header carries a foreign version.
    /// The buffer is unusable afterwards until [`clear`](Self::clear).
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Frame>> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    fn try_extract_one(&mut self) -> Result<Option<Frame>> {
        match &self.state {
            State::WaitingForHeader => {
                if self.buffer.len() < HEADER_SIZE {
                    return Ok(None);
                }

                let mut raw = [0u8; HEADER_SIZE];
                raw.copy_from_slice(&self.buffer[..HEADER_SIZE]);
                let header = Header::parse(&raw)?;

                let _ = self.buffer.split_to(HEADER_SIZE);

                if header.payload_length == 0 {
                    return Ok(Some(Frame::from_parts(header, Bytes::new())));
                }

                self.state = State::WaitingForPayload { header };
                self.try_extract_one()
            }

            State::WaitingForPayload { header } => {
                let remaining = header.payload_length as usize;
                if self.buffer.len() < remaining {
                    return Ok(None);
                }

                let payload = self.buffer.split_to(remaining).freeze();
                let header = *header;
                self.state = State::WaitingForHeader;

                Ok(Some(Frame::from_parts(header, payload)))
            }
        }
    }

    /// Bytes held that belong to no finished frame.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// True when a frame is partially received.
    pub fn is_mid_frame(&self) -> bool {
        matches!(self.state, State::WaitingForPayload { .. }) || !self.buffer.is_empty()
    }

    /// Bytes still missing before the next frame (or its header) completes.
    pub fn bytes_needed(&self) -> usize {
        let target = match &self.state {
            State::WaitingForHeader => HEADER_SIZE,
            State::WaitingForPayload { header } => header.payload_length as usize,
        };
        target.saturating_sub(self.buffer.len())
    }

    /// Drop buffered bytes and start over at a header boundary.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match &self.state {
            State::WaitingForHeader => "WaitingForHeader",
            State::WaitingForPayload { .. } => "WaitingForPayload",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WireError;

    fn frame_bytes(payload: &[u8]) -> Vec<u8> {
        Frame::build(Bytes::copy_from_slice(payload))
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    #[test]
    fn test_whole_frame_in_one_chunk() {
        let mut buffer = FrameBuffer::new();
        let frames = buffer.push(&frame_bytes(b"hello")).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), b"hello");
        assert!(buffer.is_empty());
        assert!(!buffer.is_mid_frame());
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut buffer = FrameBuffer::new();
        let mut combined = frame_bytes(b"first");
        combined.extend(frame_bytes(b"second"));
        combined.extend(frame_bytes(b"third"));

        let frames = buffer.push(&combined).unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].payload(), b"first");
        assert_eq!(frames[1].payload(), b"second");
        assert_eq!(frames[2].payload(), b"third");
    }

    #[test]
    fn test_header_split_across_chunks() {
        let mut buffer = FrameBuffer::new();
        let bytes = frame_bytes(b"test");

        assert!(buffer.push(&bytes[..2]).unwrap().is_empty());
        assert_eq!(buffer.state_name(), "WaitingForHeader");

        let frames = buffer.push(&bytes[2..]).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), b"test");
    }

    #[test]
    fn test_payload_split_across_chunks() {
        let mut buffer = FrameBuffer::new();
        let payload = b"Welcome! What is your username?";
        let bytes = frame_bytes(payload);

        let split = HEADER_SIZE + 10;
        assert!(buffer.push(&bytes[..split]).unwrap().is_empty());
        assert_eq!(buffer.state_name(), "WaitingForPayload");
        assert!(buffer.is_mid_frame());

        let frames = buffer.push(&bytes[split..]).unwrap();
        assert_eq!(frames[0].payload(), payload);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_zero_length_frame() {
        let mut buffer = FrameBuffer::new();
        let frames = buffer.push(&frame_bytes(b"")).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload_len(), 0);
    }

    #[test]
    fn test_bad_version_rejected_before_payload() {
        let mut buffer = FrameBuffer::new();
        let result = buffer.push(&[0x20, 0x10, 0x00]);
        assert!(matches!(result, Err(WireError::InvalidVersion { .. })));
    }

    #[test]
    fn test_clear_discards_partial_frame() {
        let mut buffer = FrameBuffer::new();
        let bytes = frame_bytes(b"test");

        buffer.push(&bytes[..HEADER_SIZE + 1]).unwrap();
        assert_eq!(buffer.state_name(), "WaitingForPayload");

        buffer.clear();
        assert_eq!(buffer.state_name(), "WaitingForHeader");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_frame_followed_by_partial() {
        let mut buffer = FrameBuffer::new();
        let first = frame_bytes(b"first");
        let second = frame_bytes(b"second");

        let mut data = first.clone();
        data.extend_from_slice(&second[..4]);

        let frames = buffer.push(&data).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(buffer.state_name(), "WaitingForPayload");

        let frames = buffer.push(&second[4..]).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), b"second");
    }

    #[test]
    fn test_bytes_needed() {
        let mut buffer = FrameBuffer::new();
        assert_eq!(buffer.bytes_needed(), HEADER_SIZE);

        let bytes = frame_bytes(b"abcdef");
        buffer.push(&bytes[..1]).unwrap();
        assert_eq!(buffer.bytes_needed(), HEADER_SIZE - 1);

        buffer.push(&bytes[1..HEADER_SIZE + 2]).unwrap();
        assert_eq!(buffer.bytes_needed(), 4);
    }
}
