//! Compile-time record support.

/// Declare a struct and derive its wire encoding from the field list.
///
/// Fields are encoded in declaration order with nothing between them, so
/// reordering fields changes the wire format. Every field type must
/// implement [`WireEncode`](crate::codec::WireEncode),
/// [`WireDecode`](crate::codec::WireDecode) and
/// [`HasShape`](crate::codec::HasShape).
///
/// ```
/// use shapewire::codec::{decode_frame_into, encode_value};
/// use shapewire::wire_record;
///
/// wire_record! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct Person {
///         pub name: String,
///         pub age: u32,
///     }
/// }
///
/// let person = Person { name: "Jesus".into(), age: 2024 };
/// let frame = encode_value(&person).unwrap();
///
/// let mut decoded = Person::default();
/// decode_frame_into(&frame, &mut decoded).unwrap();
/// assert_eq!(decoded, person);
/// ```
#[macro_export]
macro_rules! wire_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::codec::WireEncode for $name {
            #[allow(unused_variables)]
            fn encode(&self, enc: &mut $crate::codec::Encoder) -> $crate::Result<()> {
                $( $crate::codec::WireEncode::encode(&self.$field, enc)?; )*
                Ok(())
            }

            fn kind(&self) -> $crate::codec::Kind {
                $crate::codec::Kind::Record
            }
        }

        impl $crate::codec::WireDecode for $name {
            #[allow(unused_variables)]
            fn decode_into(
                &mut self,
                dec: &mut $crate::codec::Decoder<'_>,
            ) -> $crate::Result<()> {
                $( $crate::codec::WireDecode::decode_into(&mut self.$field, dec)?; )*
                Ok(())
            }
        }

        impl $crate::codec::HasShape for $name {
            fn shape() -> $crate::codec::Shape {
                $crate::codec::Shape::Record(vec![
                    $(
                        (
                            stringify!($field).to_string(),
                            <$ty as $crate::codec::HasShape>::shape(),
                        ),
                    )*
                ])
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::codec::{
        decode_payload_into, decode_value, encode_payload, HasShape, Kind, Shape, Value,
        WireEncode,
    };
    use crate::error::WireError;

    wire_record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Fame {
            fame: i16,
        }
    }

    wire_record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Nested {
            data: Fame,
        }
    }

    wire_record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Everything {
            name: String,
            small: u8,
            wide: u64,
            signed: i32,
            ratio: f64,
            enabled: bool,
            bytes: Vec<u8>,
            grid: [u16; 3],
            boxed: Box<Fame>,
            maybe: Option<u32>,
        }
    }

    wire_record! {
        #[derive(Debug, Default)]
        struct Empty {}
    }

    fn everything() -> Everything {
        Everything {
            name: "Tobias".into(),
            small: 7,
            wide: u64::MAX - 1,
            signed: -40_000,
            ratio: 2.5,
            enabled: true,
            bytes: vec![1, 2, 3],
            grid: [10, 20, 30],
            boxed: Box::new(Fame { fame: -1 }),
            maybe: Some(99),
        }
    }

    #[test]
    fn test_nested_record_layout() {
        let value = Nested {
            data: Fame { fame: -345 },
        };
        let payload = encode_payload(&value).unwrap();
        assert_eq!(&payload[..], &[0xFE, 0xA7]);
        assert_eq!(value.kind(), Kind::Record);
    }

    #[test]
    fn test_everything_roundtrip() {
        let value = everything();
        let payload = encode_payload(&value).unwrap();

        let mut decoded = Everything {
            maybe: Some(0),
            ..Everything::default()
        };
        decode_payload_into(&payload, &mut decoded).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_absent_field_target_rejected() {
        let payload = encode_payload(&everything()).unwrap();

        // Default leaves `maybe` as None, which cannot be filled.
        let mut decoded = Everything::default();
        assert!(matches!(
            decode_payload_into(&payload, &mut decoded),
            Err(WireError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_absent_field_rejected_on_encode() {
        let value = Everything {
            maybe: None,
            ..everything()
        };
        assert!(matches!(
            encode_payload(&value),
            Err(WireError::InvalidType(_))
        ));
    }

    #[test]
    fn test_empty_record() {
        let payload = encode_payload(&Empty {}).unwrap();
        assert!(payload.is_empty());
        assert_eq!(Empty::shape(), Shape::Record(vec![]));
    }

    #[test]
    fn test_record_shape_drives_dynamic_decode() {
        let payload = encode_payload(&Nested {
            data: Fame { fame: 12 },
        })
        .unwrap();

        let value = decode_value(&payload, &Nested::shape()).unwrap();
        assert_eq!(
            value,
            Value::record([("data", Value::record([("fame", Value::I16(12))]))])
        );
    }

    #[test]
    fn test_truncated_record() {
        let payload = encode_payload(&everything()).unwrap();
        let mut decoded = Everything {
            maybe: Some(0),
            ..Everything::default()
        };
        assert!(matches!(
            decode_payload_into(&payload[..payload.len() - 1], &mut decoded),
            Err(WireError::TruncatedPayload { .. })
        ));
        // Nothing from the partial read leaks into the target.
        assert_eq!(
            decoded,
            Everything {
                maybe: Some(0),
                ..Everything::default()
            }
        );
    }
}
