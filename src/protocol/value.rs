//! Value definitions
//!
//! The six value shapes an entry can carry, and the tags that select them.

use std::fmt;

/// Type tags as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    Bool = 0x00,
    Number = 0x01,
    String = 0x02,
    BoolArray = 0x10,
    NumberArray = 0x11,
    StringArray = 0x12,
}

impl TypeTag {
    /// Map a raw tag byte, `None` for tags this client does not know
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(TypeTag::Bool),
            0x01 => Some(TypeTag::Number),
            0x02 => Some(TypeTag::String),
            0x10 => Some(TypeTag::BoolArray),
            0x11 => Some(TypeTag::NumberArray),
            0x12 => Some(TypeTag::StringArray),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::BoolArray => "bool[]",
            TypeTag::NumberArray => "number[]",
            TypeTag::StringArray => "string[]",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded entry value
///
/// Strings are kept as raw bytes; the protocol does not promise UTF-8.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(Vec<u8>),
    BoolArray(Vec<bool>),
    NumberArray(Vec<f64>),
    StringArray(Vec<Vec<u8>>),
}

impl Value {
    /// The tag this value is encoded under
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Bool(_) => TypeTag::Bool,
            Value::Number(_) => TypeTag::Number,
            Value::String(_) => TypeTag::String,
            Value::BoolArray(_) => TypeTag::BoolArray,
            Value::NumberArray(_) => TypeTag::NumberArray,
            Value::StringArray(_) => TypeTag::StringArray,
        }
    }

    /// Convenience constructor for string values
    pub fn string(s: impl AsRef<[u8]>) -> Self {
        Value::String(s.as_ref().to_vec())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{:?}", String::from_utf8_lossy(s)),
            Value::BoolArray(items) => write_list(f, items.iter()),
            Value::NumberArray(items) => write_list(f, items.iter()),
            Value::StringArray(items) => {
                write_list(f, items.iter().map(|s| format!("{:?}", String::from_utf8_lossy(s))))
            }
        }
    }
}

fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}
