//! Value decoder.
//!
//! A [`Decoder`] is a cursor over one payload. Targets implementing
//! [`WireDecode`] fill themselves in place, consuming bytes in exactly the
//! order [`WireEncode`](super::WireEncode) produced them. The target's own
//! type decides how many bytes each step takes.

use super::Kind;
use crate::error::{Result, WireError};

/// Read cursor over a payload.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to consume.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Consume exactly `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(WireError::TruncatedPayload {
                needed: n,
                offset: self.pos,
                available: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Consume a fixed-size chunk, e.g. for `from_be_bytes`.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Consume a one-byte length prefix.
    #[inline]
    pub fn read_len(&mut self) -> Result<usize> {
        self.read_u8().map(usize::from)
    }

    /// Require that the whole payload was consumed.
    pub fn finish(self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(WireError::TrailingBytes { remaining }),
        }
    }
}

/// An addressable target that can be filled from wire format.
pub trait WireDecode {
    /// Overwrite `self` with the next value in `dec`.
    ///
    /// On error the target may be partially written and should be discarded.
    fn decode_into(&mut self, dec: &mut Decoder<'_>) -> Result<()>;
}

macro_rules! impl_decode_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl WireDecode for $ty {
                #[inline]
                fn decode_into(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
                    *self = <$ty>::from_be_bytes(dec.read_array()?);
                    Ok(())
                }
            }
        )*
    };
}

impl_decode_scalar!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl WireDecode for usize {
    fn decode_into(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        let wide = u64::from_be_bytes(dec.read_array()?);
        *self = usize::try_from(wide).map_err(|_| {
            WireError::InvalidTarget(format!("value {wide} does not fit in usize"))
        })?;
        Ok(())
    }
}

impl WireDecode for isize {
    fn decode_into(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        let wide = i64::from_be_bytes(dec.read_array()?);
        *self = isize::try_from(wide).map_err(|_| {
            WireError::InvalidTarget(format!("value {wide} does not fit in isize"))
        })?;
        Ok(())
    }
}

impl WireDecode for bool {
    #[inline]
    fn decode_into(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        *self = dec.read_u8()? == 1;
        Ok(())
    }
}

impl WireDecode for String {
    fn decode_into(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        let len = dec.read_len()?;
        let bytes = dec.take(len)?;
        *self = String::from_utf8(bytes.to_vec())?;
        Ok(())
    }
}

// New elements start from `Default`, so `Vec<Option<T>>` cannot be filled.
impl<T: WireDecode + Default> WireDecode for Vec<T> {
    fn decode_into(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        let count = dec.read_len()?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let mut item = T::default();
            item.decode_into(dec)?;
            items.push(item);
        }
        *self = items;
        Ok(())
    }
}

impl<T: WireDecode, const N: usize> WireDecode for [T; N] {
    fn decode_into(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        let count = dec.read_len()?;
        if count != N {
            return Err(WireError::LengthMismatch {
                expected: N,
                actual: count,
            });
        }
        for item in self.iter_mut() {
            item.decode_into(dec)?;
        }
        Ok(())
    }
}

impl<T: WireDecode> WireDecode for Option<T> {
    fn decode_into(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        match self {
            Some(inner) => inner.decode_into(dec),
            None => Err(WireError::InvalidTarget(format!(
                "cannot decode into an absent {}",
                Kind::Reference
            ))),
        }
    }
}

impl<T: WireDecode + ?Sized> WireDecode for Box<T> {
    fn decode_into(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        (**self).decode_into(dec)
    }
}
