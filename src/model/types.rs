//! Element types and typed values of the classic netCDF data model.

use std::fmt;

/// Default fill value for `byte` variables.
pub const FILL_BYTE: i8 = -127;
/// Default fill value for `char` variables.
pub const FILL_CHAR: u8 = 0;
/// Default fill value for `short` variables.
pub const FILL_SHORT: i16 = -32767;
/// Default fill value for `int` variables.
pub const FILL_INT: i32 = -2_147_483_647;
/// Default fill value for `float` variables.
pub const FILL_FLOAT: f32 = 9.969_21e36;
/// Default fill value for `double` variables.
pub const FILL_DOUBLE: f64 = 9.969_209_968_386_869e36;

/// Name of the attribute that overrides a variable's fill value.
pub const FILL_VALUE_ATTRIBUTE: &str = "_FillValue";

/// Element type of a variable or attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NcType {
    Byte,
    Char,
    Short,
    Int,
    Float,
    Double,
}

impl NcType {
    /// Parse a type keyword, including the `integer`, `long` and `real` aliases.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "byte" => Some(Self::Byte),
            "char" => Some(Self::Char),
            "short" => Some(Self::Short),
            "int" | "integer" | "long" => Some(Self::Int),
            "float" | "real" => Some(Self::Float),
            "double" => Some(Self::Double),
            _ => None,
        }
    }

    /// Canonical CDL keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Integer-valued storage (char counts as an unsigned 8-bit integer).
    pub fn is_integral(&self) -> bool {
        matches!(self, Self::Byte | Self::Char | Self::Short | Self::Int)
    }

    /// Position in the numeric widening order byte < short < int < float < double.
    pub fn widening_rank(&self) -> u8 {
        match self {
            Self::Byte | Self::Char => 0,
            Self::Short => 1,
            Self::Int => 2,
            Self::Float => 3,
            Self::Double => 4,
        }
    }

    /// The wider of two types.
    pub fn widest(self, other: Self) -> Self {
        if other.widening_rank() > self.widening_rank() {
            other
        } else {
            self
        }
    }

    /// Default netCDF-3 fill value for this type.
    pub fn default_fill(&self) -> Value {
        match self {
            Self::Byte => Value::Byte(FILL_BYTE),
            Self::Char => Value::Char(FILL_CHAR),
            Self::Short => Value::Short(FILL_SHORT),
            Self::Int => Value::Int(FILL_INT),
            Self::Float => Value::Float(FILL_FLOAT),
            Self::Double => Value::Double(FILL_DOUBLE),
        }
    }
}

impl fmt::Display for NcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A single typed value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Byte(i8),
    Char(u8),
    Short(i16),
    Int(i32),
    Float(f32),
    Double(f64),
}

impl Value {
    pub fn nc_type(&self) -> NcType {
        match self {
            Self::Byte(_) => NcType::Byte,
            Self::Char(_) => NcType::Char,
            Self::Short(_) => NcType::Short,
            Self::Int(_) => NcType::Int,
            Self::Float(_) => NcType::Float,
            Self::Double(_) => NcType::Double,
        }
    }

    /// Numeric value as `f64`.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Byte(v) => v as f64,
            Self::Char(v) => v as f64,
            Self::Short(v) => v as f64,
            Self::Int(v) => v as f64,
            Self::Float(v) => v as f64,
            Self::Double(v) => v,
        }
    }

    /// Integer value, `None` for floating-point values.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Byte(v) => Some(v as i64),
            Self::Char(v) => Some(v as i64),
            Self::Short(v) => Some(v as i64),
            Self::Int(v) => Some(v as i64),
            Self::Float(_) | Self::Double(_) => None,
        }
    }
}

impl fmt::Display for Value {
    /// Formats the value as a CDL constant that re-parses to the same type.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Byte(v) => write!(f, "{}b", v),
            Self::Char(v) => write!(f, "'{}'", escape_char(v)),
            Self::Short(v) => write!(f, "{}s", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write_float(f, v as f64, &format!("{:?}", v), "f"),
            Self::Double(v) => write_float(f, v, &format!("{:?}", v), ""),
        }
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f64, repr: &str, suffix: &str) -> fmt::Result {
    if value.is_nan() {
        write!(f, "NaN{}", suffix)
    } else if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        write!(f, "{}Infinity{}", sign, suffix)
    } else {
        write!(f, "{}{}", repr, suffix)
    }
}

/// Escape one byte for use inside a CDL string or character constant.
pub(crate) fn escape_char(byte: u8) -> String {
    match byte {
        b'\n' => "\\n".to_string(),
        b'\t' => "\\t".to_string(),
        b'\r' => "\\r".to_string(),
        b'"' => "\\\"".to_string(),
        b'\'' => "\\'".to_string(),
        b'\\' => "\\\\".to_string(),
        0x20..=0x7e => (byte as char).to_string(),
        _ => format!("\\{:03o}", byte),
    }
}
