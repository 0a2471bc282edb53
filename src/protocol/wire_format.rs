//! Wire format encoding and decoding.
//!
//! Implements the 3-byte header format:
//! ```text
//! ┌───────────────────┬──────────────────┐
//! │ Version           │ Payload length   │
//! │ 1 byte            │ 2 bytes          │
//! │ major<<4 | minor  │ uint16 BE        │
//! └───────────────────┴──────────────────┘
//! ```
//!
//! The length carries all 16 bits, so every payload up to
//! [`MAX_DATA_LEN`] survives a header round trip.

use crate::error::{Result, WireError};

/// Header size in bytes (fixed, exactly 3).
pub const HEADER_SIZE: usize = 3;

/// Protocol major version (high nibble of the version byte).
pub const MAJOR_VERSION: u8 = 1;

/// Protocol minor version (low nibble of the version byte).
pub const MINOR_VERSION: u8 = 0;

/// Version byte stamped on every frame this crate builds.
pub const CURRENT_VERSION: u8 = pack_version(MAJOR_VERSION, MINOR_VERSION);

/// Maximum payload size in bytes.
pub const MAX_DATA_LEN: usize = u16::MAX as usize;

/// Pack a major/minor pair into one version byte.
#[inline]
pub const fn pack_version(major: u8, minor: u8) -> u8 {
    (major << 4) | (minor & 0x0f)
}

/// Decoded header from wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Packed version byte.
    pub version: u8,
    /// Payload length in bytes.
    pub payload_length: u16,
}

impl Header {
    /// Create a header stamped with the current version.
    pub fn new(payload_length: u16) -> Self {
        Self {
            version: CURRENT_VERSION,
            payload_length,
        }
    }

    /// Create a header with an explicit version byte.
    pub fn with_version(version: u8, payload_length: u16) -> Self {
        Self {
            version,
            payload_length,
        }
    }

    /// Major version component.
    #[inline]
    pub fn major(&self) -> u8 {
        self.version >> 4
    }

    /// Minor version component.
    #[inline]
    pub fn minor(&self) -> u8 {
        self.version & 0x0f
    }

    /// Version as `"major.minor"`.
    pub fn version_string(&self) -> String {
        format!("{}.{}", self.major(), self.minor())
    }

    /// Encode header to bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use shapewire::protocol::Header;
    ///
    /// let bytes = Header::new(0x0102).encode();
    /// assert_eq!(bytes, [0x10, 0x01, 0x02]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let [hi, lo] = self.payload_length.to_be_bytes();
        [self.version, hi, lo]
    }

    /// Decode header from bytes without checking the version.
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            version: buf[0],
            payload_length: u16::from_be_bytes([buf[1], buf[2]]),
        })
    }

    /// Decode and validate a header.
    pub fn parse(buf: &[u8; HEADER_SIZE]) -> Result<Self> {
        let header = Self {
            version: buf[0],
            payload_length: u16::from_be_bytes([buf[1], buf[2]]),
        };
        header.validate()?;
        Ok(header)
    }

    /// Check that both version components match this build.
    pub fn validate(&self) -> Result<()> {
        if self.major() != MAJOR_VERSION || self.minor() != MINOR_VERSION {
            return Err(WireError::InvalidVersion {
                expected_major: MAJOR_VERSION,
                expected_minor: MINOR_VERSION,
                major: self.major(),
                minor: self.minor(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_encode_decode_roundtrip() {
        let original = Header::new(100);
        let decoded = Header::decode(&original.encode()).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_current_version_byte() {
        assert_eq!(CURRENT_VERSION, 0x10);
        let header = Header::new(0);
        assert_eq!(header.major(), 1);
        assert_eq!(header.minor(), 0);
        assert_eq!(header.version_string(), "1.0");
    }

    #[test]
    fn test_length_big_endian_byte_order() {
        let bytes = Header::new(0xABCD).encode();
        assert_eq!(bytes[0], CURRENT_VERSION);
        assert_eq!(bytes[1], 0xAB);
        assert_eq!(bytes[2], 0xCD);
    }

    #[test]
    fn test_every_length_survives_roundtrip() {
        for len in 0..=MAX_DATA_LEN {
            let header = Header::new(len as u16);
            let parsed = Header::parse(&header.encode()).unwrap();
            assert_eq!(parsed.payload_length as usize, len);
        }
    }

    #[test]
    fn test_every_mismatching_version_rejected() {
        for version in 0..=u8::MAX {
            let bytes = [version, 0, 0];
            let result = Header::parse(&bytes);
            if version == CURRENT_VERSION {
                assert!(result.is_ok());
            } else {
                assert!(
                    matches!(result, Err(WireError::InvalidVersion { .. })),
                    "version byte {version:#04x} accepted"
                );
            }
        }
    }

    #[test]
    fn test_invalid_version_reports_components() {
        let err = Header::with_version(pack_version(2, 7), 0)
            .validate()
            .unwrap_err();
        match err {
            WireError::InvalidVersion { major, minor, .. } => {
                assert_eq!(major, 2);
                assert_eq!(minor, 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_too_short_buffer() {
        assert!(Header::decode(&[0x10, 0]).is_none());
    }
}
