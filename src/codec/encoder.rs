//! Value encoder.
//!
//! Values write themselves into an [`Encoder`] through [`WireEncode`]. The
//! output carries no type information: scalars are bare big-endian bytes,
//! text and sequences get a single length byte, records are their fields
//! back to back.

use bytes::{BufMut, Bytes, BytesMut};

use super::Kind;
use crate::error::{Result, WireError};

/// Largest element count a one-byte length prefix can carry.
pub const MAX_ELEMENTS: usize = u8::MAX as usize;

/// Byte sink for one encode call.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn put_u8(&mut self, byte: u8) {
        self.buf.put_u8(byte);
    }

    #[inline]
    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Write a one-byte length prefix, refusing anything above 255.
    pub fn put_len(&mut self, kind: Kind, len: usize) -> Result<()> {
        if len > MAX_ELEMENTS {
            return Err(WireError::LengthOverflow { kind, len });
        }
        self.buf.put_u8(len as u8);
        Ok(())
    }

    /// Take the encoded payload.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

/// A value that can write itself in wire format.
pub trait WireEncode {
    /// Append this value's encoding.
    fn encode(&self, enc: &mut Encoder) -> Result<()>;

    /// Structural kind, used in error reports.
    fn kind(&self) -> Kind;
}

macro_rules! impl_encode_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl WireEncode for $ty {
                #[inline]
                fn encode(&self, enc: &mut Encoder) -> Result<()> {
                    enc.put_slice(&self.to_be_bytes());
                    Ok(())
                }

                fn kind(&self) -> Kind {
                    Kind::$kind
                }
            }
        )*
    };
}

impl_encode_scalar! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

// Pointer-sized integers always travel as 64 bits.
impl WireEncode for usize {
    fn encode(&self, enc: &mut Encoder) -> Result<()> {
        (*self as u64).encode(enc)
    }

    fn kind(&self) -> Kind {
        Kind::U64
    }
}

impl WireEncode for isize {
    fn encode(&self, enc: &mut Encoder) -> Result<()> {
        (*self as i64).encode(enc)
    }

    fn kind(&self) -> Kind {
        Kind::I64
    }
}

impl WireEncode for bool {
    #[inline]
    fn encode(&self, enc: &mut Encoder) -> Result<()> {
        enc.put_u8(u8::from(*self));
        Ok(())
    }

    fn kind(&self) -> Kind {
        Kind::Bool
    }
}

impl WireEncode for str {
    fn encode(&self, enc: &mut Encoder) -> Result<()> {
        enc.put_len(Kind::Text, self.len())?;
        enc.put_slice(self.as_bytes());
        Ok(())
    }

    fn kind(&self) -> Kind {
        Kind::Text
    }
}

impl WireEncode for String {
    fn encode(&self, enc: &mut Encoder) -> Result<()> {
        self.as_str().encode(enc)
    }

    fn kind(&self) -> Kind {
        Kind::Text
    }
}

impl<T: WireEncode> WireEncode for [T] {
    fn encode(&self, enc: &mut Encoder) -> Result<()> {
        enc.put_len(Kind::Sequence, self.len())?;
        for item in self {
            item.encode(enc)?;
        }
        Ok(())
    }

    fn kind(&self) -> Kind {
        Kind::Sequence
    }
}

impl<T: WireEncode> WireEncode for Vec<T> {
    fn encode(&self, enc: &mut Encoder) -> Result<()> {
        self.as_slice().encode(enc)
    }

    fn kind(&self) -> Kind {
        Kind::Sequence
    }
}

impl<T: WireEncode, const N: usize> WireEncode for [T; N] {
    fn encode(&self, enc: &mut Encoder) -> Result<()> {
        enc.put_len(Kind::Array, N)?;
        for item in self {
            item.encode(enc)?;
        }
        Ok(())
    }

    fn kind(&self) -> Kind {
        Kind::Array
    }
}

impl<T: WireEncode> WireEncode for Option<T> {
    fn encode(&self, enc: &mut Encoder) -> Result<()> {
        match self {
            Some(inner) => inner.encode(enc),
            None => Err(WireError::InvalidType(
                "cannot encode an absent reference".to_string(),
            )),
        }
    }

    fn kind(&self) -> Kind {
        Kind::Reference
    }
}

impl<T: WireEncode + ?Sized> WireEncode for Box<T> {
    fn encode(&self, enc: &mut Encoder) -> Result<()> {
        (**self).encode(enc)
    }

    fn kind(&self) -> Kind {
        Kind::Reference
    }
}

impl<T: WireEncode + ?Sized> WireEncode for &T {
    fn encode(&self, enc: &mut Encoder) -> Result<()> {
        (**self).encode(enc)
    }

    fn kind(&self) -> Kind {
        Kind::Reference
    }
}
