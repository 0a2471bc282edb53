//! The closed set of value kinds.

use std::fmt;

/// Structural kind of a value.
///
/// Everything up to and including [`Kind::Reference`] has a wire encoding;
/// the remaining kinds exist so callers can name what was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Record,
    Text,
    Sequence,
    Array,
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
    Reference,
    Complex,
    Map,
    Channel,
    Function,
}

impl Kind {
    /// Whether the codec can encode and decode this kind.
    pub fn is_supported(self) -> bool {
        !matches!(
            self,
            Kind::Complex | Kind::Map | Kind::Channel | Kind::Function
        )
    }

    /// Encoded width for fixed-size scalars, `None` for everything else.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Kind::U8 | Kind::I8 | Kind::Bool => Some(1),
            Kind::U16 | Kind::I16 => Some(2),
            Kind::U32 | Kind::I32 | Kind::F32 => Some(4),
            Kind::U64 | Kind::I64 | Kind::F64 => Some(8),
            _ => None,
        }
    }

    /// Lowercase name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Record => "record",
            Kind::Text => "text",
            Kind::Sequence => "sequence",
            Kind::Array => "array",
            Kind::U8 => "u8",
            Kind::U16 => "u16",
            Kind::U32 => "u32",
            Kind::U64 => "u64",
            Kind::I8 => "i8",
            Kind::I16 => "i16",
            Kind::I32 => "i32",
            Kind::I64 => "i64",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Bool => "bool",
            Kind::Reference => "reference",
            Kind::Complex => "complex",
            Kind::Map => "map",
            Kind::Channel => "channel",
            Kind::Function => "function",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
