//! Codec module - shape-driven value encoding and decoding.
//!
//! Payloads carry no type tags. The sender's value decides what is written
//! and the receiver's target decides how it is read:
//!
//! | kind | encoding |
//! |---|---|
//! | record | fields back to back, declared order |
//! | text | 1 length byte + UTF-8 bytes |
//! | sequence / array | 1 count byte + elements |
//! | integers, floats | big-endian, fixed width |
//! | bool | 1 byte, `1` is true |
//! | reference | the referenced value; absent is an error |
//!
//! Typed values use [`WireEncode`] / [`WireDecode`] (records via
//! [`wire_record!`](crate::wire_record)); untyped payloads use [`Value`]
//! and [`Shape`].
//!
//! # Example
//!
//! ```
//! use shapewire::codec::{decode_frame_into, encode_value};
//!
//! let frame = encode_value(&vec![1u8, 255, 42, 69]).unwrap();
//! assert_eq!(frame.payload(), &[4, 1, 255, 42, 69]);
//!
//! let mut decoded: Vec<u8> = Vec::new();
//! decode_frame_into(&frame, &mut decoded).unwrap();
//! assert_eq!(decoded, vec![1, 255, 42, 69]);
//! ```

mod decoder;
mod encoder;
mod kind;
mod record;
mod value;

use bytes::Bytes;

pub use decoder::{Decoder, WireDecode};
pub use encoder::{Encoder, WireEncode, MAX_ELEMENTS};
pub use kind::Kind;
pub use value::{decode_shape, HasShape, Shape, Value};

use crate::error::Result;
use crate::protocol::Frame;

/// Encode a value into a bare payload.
///
/// Fixed-width scalars get an exactly sized buffer up front.
pub fn encode_payload<T: WireEncode + ?Sized>(value: &T) -> Result<Bytes> {
    let mut enc = match value.kind().fixed_width() {
        Some(width) => Encoder::with_capacity(width),
        None => Encoder::new(),
    };
    value.encode(&mut enc)?;
    Ok(enc.finish())
}

/// Encode a value and wrap it in a frame.
pub fn encode_value<T: WireEncode + ?Sized>(value: &T) -> Result<Frame> {
    let payload = encode_payload(value)?;
    tracing::trace!(kind = %value.kind(), len = payload.len(), "encoded value");
    Frame::build(payload)
}

/// Fill `target` from a bare payload. Trailing bytes are ignored.
///
/// Decoding runs on a copy of `target`, so a failed decode leaves it
/// exactly as it was. The copy keeps the target's shape: present
/// references, array lengths and a [`Value`]'s layout all carry over.
pub fn decode_payload_into<T: WireDecode + Clone>(payload: &[u8], target: &mut T) -> Result<()> {
    let mut scratch = target.clone();
    scratch.decode_into(&mut Decoder::new(payload))?;
    *target = scratch;
    Ok(())
}

/// Fill `target` from a frame's payload; unchanged on failure.
pub fn decode_frame_into<T: WireDecode + Clone>(frame: &Frame, target: &mut T) -> Result<()> {
    decode_payload_into(frame.payload(), target)
}

/// Decode a frame into a fresh value; nothing is returned on failure.
pub fn decode_frame<T: WireDecode + Default>(frame: &Frame) -> Result<T> {
    let mut target = T::default();
    target.decode_into(&mut Decoder::new(frame.payload()))?;
    Ok(target)
}

/// Decode a bare payload against a shape.
pub fn decode_value(payload: &[u8], shape: &Shape) -> Result<Value> {
    decode_shape(&mut Decoder::new(payload), shape)
}
