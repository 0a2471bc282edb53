//! Error types for shapewire.

use std::string::FromUtf8Error;

use thiserror::Error;

use crate::codec::Kind;

/// Main error type for all framing and codec operations.
#[derive(Debug, Error)]
pub enum WireError {
    /// Header version does not match the compiled-in major/minor.
    #[error("Invalid version: expected {expected_major}.{expected_minor}, received {major}.{minor}")]
    InvalidVersion {
        expected_major: u8,
        expected_minor: u8,
        major: u8,
        minor: u8,
    },

    /// Payload exceeds what the header can describe.
    #[error("Payload too large: {len} bytes (max: {max})")]
    PayloadTooLarge { len: usize, max: usize },

    /// Decoder tried to read past the end of the payload.
    #[error("Truncated payload: need {needed} bytes at offset {offset}, only {available} available")]
    TruncatedPayload {
        needed: usize,
        offset: usize,
        available: usize,
    },

    /// Stream closed before a whole frame arrived.
    #[error("End of stream: expected {expected} bytes, received {received}")]
    EndOfStream { expected: usize, received: usize },

    /// Value kind outside the set this codec understands.
    #[error("Unsupported type: {0}")]
    UnsupportedType(Kind),

    /// Value cannot be encoded in its current state (e.g. absent reference).
    #[error("Invalid type: {0}")]
    InvalidType(String),

    /// Decode target cannot receive a value (e.g. absent reference).
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Fixed-size array target disagrees with the encoded element count.
    #[error("Mismatched length of array: length in data {actual}, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Text or sequence too long for its one-byte length prefix.
    #[error("{kind} of length {len} exceeds the maximum of 255")]
    LengthOverflow { kind: Kind, len: usize },

    /// Text bytes were not valid UTF-8.
    #[error("Invalid text: {0}")]
    InvalidText(#[from] FromUtf8Error),

    /// Strict decode left bytes unconsumed.
    #[error("Trailing bytes: {remaining} bytes left after decoding")]
    TrailingBytes { remaining: usize },

    /// I/O error during stream operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Peer or channel went away.
    #[error("Connection closed")]
    ConnectionClosed,
}

impl WireError {
    /// True when the error means the peer simply went away.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, WireError::EndOfStream { .. } | WireError::ConnectionClosed)
    }
}

/// Result type alias using WireError.
pub type Result<T> = std::result::Result<T, WireError>;
