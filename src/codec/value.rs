//! Dynamic values and shapes.
//!
//! [`Value`] holds any encodable tree without a Rust type behind it, and
//! [`Shape`] describes what a payload is expected to contain. Decoding a
//! payload needs only a shape; encoding needs only a value.
//!
//! ```
//! use shapewire::codec::{decode_value, encode_payload, Shape, Value};
//!
//! let value = Value::record([
//!     ("name", Value::from("Tobias")),
//!     ("age", Value::U32(3_000_000)),
//! ]);
//! let payload = encode_payload(&value).unwrap();
//! assert_eq!(decode_value(&payload, &value.shape()).unwrap(), value);
//! ```

use super::{Decoder, Encoder, Kind, WireDecode, WireEncode};
use crate::error::{Result, WireError};

/// Expected layout of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Named fields in declared order.
    Record(Vec<(String, Shape)>),
    Text,
    /// Variable-length sequence of one element shape.
    List(Box<Shape>),
    /// Fixed-length sequence; decode checks the encoded count.
    Array(Box<Shape>, usize),
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    /// Reference to a value; `None` is a null target.
    Ref(Option<Box<Shape>>),
    /// A kind with no wire encoding.
    Unsupported(Kind),
}

impl Shape {
    pub fn record<N: Into<String>>(fields: impl IntoIterator<Item = (N, Shape)>) -> Self {
        Shape::Record(
            fields
                .into_iter()
                .map(|(name, shape)| (name.into(), shape))
                .collect(),
        )
    }

    pub fn list(elem: Shape) -> Self {
        Shape::List(Box::new(elem))
    }

    pub fn array(elem: Shape, len: usize) -> Self {
        Shape::Array(Box::new(elem), len)
    }

    pub fn reference(inner: Shape) -> Self {
        Shape::Ref(Some(Box::new(inner)))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Shape::Record(_) => Kind::Record,
            Shape::Text => Kind::Text,
            Shape::List(_) => Kind::Sequence,
            Shape::Array(..) => Kind::Array,
            Shape::U8 => Kind::U8,
            Shape::U16 => Kind::U16,
            Shape::U32 => Kind::U32,
            Shape::U64 => Kind::U64,
            Shape::I8 => Kind::I8,
            Shape::I16 => Kind::I16,
            Shape::I32 => Kind::I32,
            Shape::I64 => Kind::I64,
            Shape::F32 => Kind::F32,
            Shape::F64 => Kind::F64,
            Shape::Bool => Kind::Bool,
            Shape::Ref(_) => Kind::Reference,
            Shape::Unsupported(kind) => *kind,
        }
    }
}

/// A dynamically shaped value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Record(Vec<(String, Value)>),
    Text(String),
    List { elem: Shape, items: Vec<Value> },
    Array { elem: Shape, items: Vec<Value> },
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Ref(Option<Box<Value>>),
    Complex { re: f64, im: f64 },
    Map(Vec<(Value, Value)>),
    /// Channels, functions and other handles with no data to send.
    ///
    /// Only meaningful for kinds without a wire encoding; a supported kind
    /// here is refused with `InvalidType`.
    Opaque(Kind),
}

impl Value {
    pub fn record<N: Into<String>>(fields: impl IntoIterator<Item = (N, Value)>) -> Self {
        Value::Record(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    pub fn list(elem: Shape, items: impl IntoIterator<Item = Value>) -> Self {
        Value::List {
            elem,
            items: items.into_iter().collect(),
        }
    }

    pub fn array(elem: Shape, items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array {
            elem,
            items: items.into_iter().collect(),
        }
    }

    pub fn reference(inner: Value) -> Self {
        Value::Ref(Some(Box::new(inner)))
    }

    /// Look up a record field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// The shape this value decodes from.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Record(fields) => Shape::Record(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.shape()))
                    .collect(),
            ),
            Value::Text(_) => Shape::Text,
            Value::List { elem, .. } => Shape::List(Box::new(elem.clone())),
            Value::Array { elem, items } => Shape::Array(Box::new(elem.clone()), items.len()),
            Value::U8(_) => Shape::U8,
            Value::U16(_) => Shape::U16,
            Value::U32(_) => Shape::U32,
            Value::U64(_) => Shape::U64,
            Value::I8(_) => Shape::I8,
            Value::I16(_) => Shape::I16,
            Value::I32(_) => Shape::I32,
            Value::I64(_) => Shape::I64,
            Value::F32(_) => Shape::F32,
            Value::F64(_) => Shape::F64,
            Value::Bool(_) => Shape::Bool,
            Value::Ref(inner) => Shape::Ref(inner.as_ref().map(|v| Box::new(v.shape()))),
            Value::Complex { .. } => Shape::Unsupported(Kind::Complex),
            Value::Map(_) => Shape::Unsupported(Kind::Map),
            Value::Opaque(kind) => Shape::Unsupported(*kind),
        }
    }
}

fn encode_items(enc: &mut Encoder, kind: Kind, elem: &Shape, items: &[Value]) -> Result<()> {
    enc.put_len(kind, items.len())?;
    for item in items {
        if item.shape() != *elem {
            return Err(WireError::InvalidType(format!(
                "{} element does not match declared element {}",
                item.kind(),
                elem.kind()
            )));
        }
        item.encode(enc)?;
    }
    Ok(())
}

impl WireEncode for Value {
    fn encode(&self, enc: &mut Encoder) -> Result<()> {
        match self {
            Value::Record(fields) => {
                for (_, value) in fields {
                    value.encode(enc)?;
                }
                Ok(())
            }
            Value::Text(text) => text.encode(enc),
            Value::List { elem, items } => encode_items(enc, Kind::Sequence, elem, items),
            Value::Array { elem, items } => encode_items(enc, Kind::Array, elem, items),
            Value::U8(v) => v.encode(enc),
            Value::U16(v) => v.encode(enc),
            Value::U32(v) => v.encode(enc),
            Value::U64(v) => v.encode(enc),
            Value::I8(v) => v.encode(enc),
            Value::I16(v) => v.encode(enc),
            Value::I32(v) => v.encode(enc),
            Value::I64(v) => v.encode(enc),
            Value::F32(v) => v.encode(enc),
            Value::F64(v) => v.encode(enc),
            Value::Bool(v) => v.encode(enc),
            Value::Ref(inner) => inner.encode(enc),
            Value::Opaque(kind) if kind.is_supported() => Err(WireError::InvalidType(format!(
                "opaque value cannot stand in for supported kind {kind}"
            ))),
            Value::Complex { .. } | Value::Map(_) | Value::Opaque(_) => {
                Err(WireError::UnsupportedType(self.kind()))
            }
        }
    }

    fn kind(&self) -> Kind {
        match self {
            Value::Complex { .. } => Kind::Complex,
            Value::Map(_) => Kind::Map,
            Value::Opaque(kind) => *kind,
            other => other.shape().kind(),
        }
    }
}

impl WireDecode for Value {
    /// Decode using the value's current shape as the target.
    fn decode_into(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        *self = decode_shape(dec, &self.shape())?;
        Ok(())
    }
}

fn decode_scalar<T: WireDecode + Default>(dec: &mut Decoder<'_>) -> Result<T> {
    let mut value = T::default();
    value.decode_into(dec)?;
    Ok(value)
}

fn decode_items(dec: &mut Decoder<'_>, elem: &Shape, count: usize) -> Result<Vec<Value>> {
    (0..count).map(|_| decode_shape(dec, elem)).collect()
}

/// Decode the next value of `shape` from `dec`.
pub fn decode_shape(dec: &mut Decoder<'_>, shape: &Shape) -> Result<Value> {
    let value = match shape {
        Shape::Record(fields) => Value::Record(
            fields
                .iter()
                .map(|(name, field)| -> Result<(String, Value)> {
                    Ok((name.clone(), decode_shape(dec, field)?))
                })
                .collect::<Result<_>>()?,
        ),
        Shape::Text => Value::Text(decode_scalar(dec)?),
        Shape::List(elem) => {
            let count = dec.read_len()?;
            Value::List {
                elem: (**elem).clone(),
                items: decode_items(dec, elem, count)?,
            }
        }
        Shape::Array(elem, len) => {
            let count = dec.read_len()?;
            if count != *len {
                return Err(WireError::LengthMismatch {
                    expected: *len,
                    actual: count,
                });
            }
            Value::Array {
                elem: (**elem).clone(),
                items: decode_items(dec, elem, count)?,
            }
        }
        Shape::U8 => Value::U8(decode_scalar(dec)?),
        Shape::U16 => Value::U16(decode_scalar(dec)?),
        Shape::U32 => Value::U32(decode_scalar(dec)?),
        Shape::U64 => Value::U64(decode_scalar(dec)?),
        Shape::I8 => Value::I8(decode_scalar(dec)?),
        Shape::I16 => Value::I16(decode_scalar(dec)?),
        Shape::I32 => Value::I32(decode_scalar(dec)?),
        Shape::I64 => Value::I64(decode_scalar(dec)?),
        Shape::F32 => Value::F32(decode_scalar(dec)?),
        Shape::F64 => Value::F64(decode_scalar(dec)?),
        Shape::Bool => Value::Bool(decode_scalar(dec)?),
        Shape::Ref(Some(inner)) => Value::Ref(Some(Box::new(decode_shape(dec, inner)?))),
        Shape::Ref(None) => {
            return Err(WireError::InvalidTarget(
                "cannot decode into a null reference".to_string(),
            ))
        }
        Shape::Unsupported(kind) if kind.is_supported() => {
            return Err(WireError::InvalidTarget(format!(
                "shape marks supported kind {kind} as unsupported"
            )))
        }
        Shape::Unsupported(kind) => return Err(WireError::UnsupportedType(*kind)),
    };
    Ok(value)
}

/// Types with a shape known at compile time.
pub trait HasShape {
    fn shape() -> Shape;
}

macro_rules! impl_has_shape {
    ($($ty:ty => $shape:ident),* $(,)?) => {
        $(
            impl HasShape for $ty {
                fn shape() -> Shape {
                    Shape::$shape
                }
            }
        )*
    };
}

impl_has_shape! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => I64,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    String => Text,
}

impl<T: HasShape> HasShape for Vec<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }
}

impl<T: HasShape, const N: usize> HasShape for [T; N] {
    fn shape() -> Shape {
        Shape::array(T::shape(), N)
    }
}

impl<T: HasShape> HasShape for Option<T> {
    fn shape() -> Shape {
        Shape::reference(T::shape())
    }
}

impl<T: HasShape> HasShape for Box<T> {
    fn shape() -> Shape {
        Shape::reference(T::shape())
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
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
    bool => Bool,
    String => Text,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_payload;

    fn decode(payload: &[u8], shape: &Shape) -> Result<Value> {
        decode_shape(&mut Decoder::new(payload), shape)
    }

    fn person() -> Value {
        Value::record([("name", Value::from("Tobias")), ("age", Value::U32(256))])
    }

    #[test]
    fn test_record_layout() {
        let payload = encode_payload(&person()).unwrap();
        assert_eq!(&payload[..], b"\x06Tobias\x00\x00\x01\x00");
    }

    #[test]
    fn test_record_roundtrip() {
        let value = person();
        let payload = encode_payload(&value).unwrap();
        assert_eq!(decode(&payload, &value.shape()).unwrap(), value);
    }

    #[test]
    fn test_nested_record_roundtrip() {
        let value = Value::record([(
            "data",
            Value::record([
                ("fame", Value::I16(-345)),
                ("ratio", Value::F32(0.5)),
                (
                    "tags",
                    Value::list(Shape::Text, [Value::from("a"), Value::from("bc")]),
                ),
                (
                    "flags",
                    Value::array(Shape::Bool, [Value::Bool(true), Value::Bool(false)]),
                ),
                ("owner", Value::reference(Value::U64(9))),
            ]),
        )]);
        let payload = encode_payload(&value).unwrap();
        assert_eq!(decode(&payload, &value.shape()).unwrap(), value);
    }

    #[test]
    fn test_field_lookup() {
        let value = person();
        assert_eq!(value.field("age"), Some(&Value::U32(256)));
        assert_eq!(value.field("missing"), None);
        assert_eq!(Value::U8(1).field("age"), None);
    }

    #[test]
    fn test_unsupported_values_rejected() {
        let complex = Value::Complex { re: 3.14, im: 10.0 };
        assert!(matches!(
            encode_payload(&complex),
            Err(WireError::UnsupportedType(Kind::Complex))
        ));

        let function = Value::Opaque(Kind::Function);
        assert!(matches!(
            encode_payload(&function),
            Err(WireError::UnsupportedType(Kind::Function))
        ));

        // Nested inside an otherwise valid record.
        let record = Value::record([
            ("ok", Value::U8(1)),
            ("chan", Value::Opaque(Kind::Channel)),
        ]);
        assert!(matches!(
            encode_payload(&record),
            Err(WireError::UnsupportedType(Kind::Channel))
        ));
    }

    #[test]
    fn test_unsupported_shape_rejected() {
        assert!(matches!(
            decode(&[0; 16], &Shape::Unsupported(Kind::Map)),
            Err(WireError::UnsupportedType(Kind::Map))
        ));
    }

    #[test]
    fn test_opaque_supported_kind_rejected() {
        assert!(matches!(
            encode_payload(&Value::Opaque(Kind::U8)),
            Err(WireError::InvalidType(_))
        ));
        assert!(matches!(
            decode(&[0; 16], &Shape::Unsupported(Kind::U8)),
            Err(WireError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_null_reference() {
        let null = Value::Ref(None);
        assert!(matches!(
            encode_payload(&null),
            Err(WireError::InvalidType(_))
        ));
        assert!(matches!(
            decode(&[1], &null.shape()),
            Err(WireError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_array_shape_length_mismatch() {
        let shape = Shape::array(Shape::Bool, 4);
        assert!(matches!(
            decode(&[3, 1, 1, 0], &shape),
            Err(WireError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_heterogeneous_list_rejected() {
        let list = Value::list(Shape::U8, [Value::U8(1), Value::U16(2)]);
        assert!(matches!(
            encode_payload(&list),
            Err(WireError::InvalidType(_))
        ));
    }

    #[test]
    fn test_value_decodes_in_place() {
        let payload = encode_payload(&person()).unwrap();
        let mut target = Value::record([
            ("name", Value::Text(String::new())),
            ("age", Value::U32(0)),
        ]);
        target.decode_into(&mut Decoder::new(&payload)).unwrap();
        assert_eq!(target, person());
    }

    #[test]
    fn test_typed_shapes() {
        assert_eq!(<Vec<u8>>::shape(), Shape::list(Shape::U8));
        assert_eq!(<[bool; 4]>::shape(), Shape::array(Shape::Bool, 4));
        assert_eq!(<Option<String>>::shape(), Shape::reference(Shape::Text));
        assert_eq!(usize::shape(), Shape::U64);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(person().kind(), Kind::Record);
        assert_eq!(Value::Complex { re: 0.0, im: 0.0 }.kind(), Kind::Complex);
        assert_eq!(Value::Opaque(Kind::Channel).kind(), Kind::Channel);
        assert_eq!(Shape::list(Shape::U8).kind(), Kind::Sequence);
    }
}
