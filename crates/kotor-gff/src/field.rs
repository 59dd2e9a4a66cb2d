use crate::{List, LocalizedString, Struct, Vector3, Vector4};
use kotor_support::ResRef;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// The type tag of a GFF field, with the numeric IDs used in the binary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum FieldType {
    UInt8 = 0,
    Int8 = 1,
    UInt16 = 2,
    Int16 = 3,
    UInt32 = 4,
    Int32 = 5,
    UInt64 = 6,
    Int64 = 7,
    Single = 8,
    Double = 9,
    String = 10,
    ResRef = 11,
    LocalizedString = 12,
    Binary = 13,
    Struct = 14,
    List = 15,
    Vector4 = 16,
    Vector3 = 17,
}

impl FieldType {
    /// The name the toolset uses for this field type.
    pub fn name(self) -> &'static str {
        match self {
            FieldType::UInt8 => "Byte",
            FieldType::Int8 => "Char",
            FieldType::UInt16 => "Word",
            FieldType::Int16 => "Short",
            FieldType::UInt32 => "DWORD",
            FieldType::Int32 => "Int",
            FieldType::UInt64 => "DWORD64",
            FieldType::Int64 => "Int64",
            FieldType::Single => "Float",
            FieldType::Double => "Double",
            FieldType::String => "ExoString",
            FieldType::ResRef => "ResRef",
            FieldType::LocalizedString => "ExoLocString",
            FieldType::Binary => "Binary",
            FieldType::Struct => "Struct",
            FieldType::List => "List",
            FieldType::Vector4 => "Orientation",
            FieldType::Vector3 => "Position",
        }
    }

    /// Whether values of this type are integers.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            FieldType::UInt8
                | FieldType::Int8
                | FieldType::UInt16
                | FieldType::Int16
                | FieldType::UInt32
                | FieldType::Int32
                | FieldType::UInt64
                | FieldType::Int64
        )
    }

    /// Whether values of this type are floating point numbers.
    pub fn is_float(self) -> bool {
        matches!(self, FieldType::Single | FieldType::Double)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value of a GFF field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    UInt8(u8),
    Int8(i8),
    UInt16(u16),
    Int16(i16),
    UInt32(u32),
    Int32(i32),
    UInt64(u64),
    Int64(i64),
    Single(f32),
    Double(f64),
    String(String),
    ResRef(ResRef),
    LocalizedString(LocalizedString),
    Binary(Vec<u8>),
    Struct(Struct),
    List(List),
    Vector4(Vector4),
    Vector3(Vector3),
}

impl FieldValue {
    /// Get the type tag of this value.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::UInt8(_) => FieldType::UInt8,
            FieldValue::Int8(_) => FieldType::Int8,
            FieldValue::UInt16(_) => FieldType::UInt16,
            FieldValue::Int16(_) => FieldType::Int16,
            FieldValue::UInt32(_) => FieldType::UInt32,
            FieldValue::Int32(_) => FieldType::Int32,
            FieldValue::UInt64(_) => FieldType::UInt64,
            FieldValue::Int64(_) => FieldType::Int64,
            FieldValue::Single(_) => FieldType::Single,
            FieldValue::Double(_) => FieldType::Double,
            FieldValue::String(_) => FieldType::String,
            FieldValue::ResRef(_) => FieldType::ResRef,
            FieldValue::LocalizedString(_) => FieldType::LocalizedString,
            FieldValue::Binary(_) => FieldType::Binary,
            FieldValue::Struct(_) => FieldType::Struct,
            FieldValue::List(_) => FieldType::List,
            FieldValue::Vector4(_) => FieldType::Vector4,
            FieldValue::Vector3(_) => FieldType::Vector3,
        }
    }

    /// Get the value as a signed 128-bit integer, if it is an integer.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            FieldValue::UInt8(n) => Some(n.into()),
            FieldValue::Int8(n) => Some(n.into()),
            FieldValue::UInt16(n) => Some(n.into()),
            FieldValue::Int16(n) => Some(n.into()),
            FieldValue::UInt32(n) => Some(n.into()),
            FieldValue::Int32(n) => Some(n.into()),
            FieldValue::UInt64(n) => Some(n.into()),
            FieldValue::Int64(n) => Some(n.into()),
            _ => None,
        }
    }

    /// Get the value as a float, if it is a float.
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            FieldValue::Single(n) => Some(n.into()),
            FieldValue::Double(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::UInt8(n) => write!(f, "{}", n),
            FieldValue::Int8(n) => write!(f, "{}", n),
            FieldValue::UInt16(n) => write!(f, "{}", n),
            FieldValue::Int16(n) => write!(f, "{}", n),
            FieldValue::UInt32(n) => write!(f, "{}", n),
            FieldValue::Int32(n) => write!(f, "{}", n),
            FieldValue::UInt64(n) => write!(f, "{}", n),
            FieldValue::Int64(n) => write!(f, "{}", n),
            FieldValue::Single(n) => write!(f, "{}", n),
            FieldValue::Double(n) => write!(f, "{}", n),
            FieldValue::String(s) => f.write_str(s),
            FieldValue::ResRef(r) => write!(f, "{}", r),
            FieldValue::LocalizedString(l) => write!(f, "{}", l),
            FieldValue::Binary(b) => write!(f, "<{} bytes>", b.len()),
            FieldValue::Struct(s) => write!(f, "Struct#{} ({} fields)", s.struct_id, s.len()),
            FieldValue::List(l) => write!(f, "List ({} structs)", l.len()),
            FieldValue::Vector4(v) => write!(f, "{}", v),
            FieldValue::Vector3(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! field_value_from {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for FieldValue {
            fn from(v: $ty) -> Self {
                FieldValue::$variant(v)
            }
        }
    };
}

field_value_from!(UInt8, u8);
field_value_from!(Int8, i8);
field_value_from!(UInt16, u16);
field_value_from!(Int16, i16);
field_value_from!(UInt32, u32);
field_value_from!(Int32, i32);
field_value_from!(UInt64, u64);
field_value_from!(Int64, i64);
field_value_from!(Single, f32);
field_value_from!(Double, f64);
field_value_from!(String, String);
field_value_from!(ResRef, ResRef);
field_value_from!(LocalizedString, LocalizedString);
field_value_from!(Struct, Struct);
field_value_from!(List, List);
field_value_from!(Vector4, Vector4);
field_value_from!(Vector3, Vector3);

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}
