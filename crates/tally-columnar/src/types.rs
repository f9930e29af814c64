#![forbid(unsafe_code)]

use std::fmt;

/// Fixed-width scalar types storable in a column vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// Pointer-width unsigned integer; also carries hashes and row counters.
    UInt64,
    /// 64-bit IEEE float.
    Float64,
    /// Calendar date as days since the epoch, stored as `i32`.
    Date,
}

impl ScalarType {
    /// Width in bytes of one value's binary image.
    pub const fn width(self) -> usize {
        match self {
            ScalarType::Int8 => 1,
            ScalarType::Int16 => 2,
            ScalarType::Int32 | ScalarType::Date => 4,
            ScalarType::Int64 | ScalarType::UInt64 | ScalarType::Float64 => 8,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Int8 => "int8",
            ScalarType::Int16 => "int16",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::UInt64 => "uint64",
            ScalarType::Float64 => "float64",
            ScalarType::Date => "date",
        };
        f.write_str(name)
    }
}

/// One scalar value tagged with its type. Used at API edges; the bulk
/// operations in [`crate::ops`] stay on the typed storage directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    Date(i32),
}

impl ScalarValue {
    pub fn scalar_type(self) -> ScalarType {
        match self {
            ScalarValue::Int8(_) => ScalarType::Int8,
            ScalarValue::Int16(_) => ScalarType::Int16,
            ScalarValue::Int32(_) => ScalarType::Int32,
            ScalarValue::Int64(_) => ScalarType::Int64,
            ScalarValue::UInt64(_) => ScalarType::UInt64,
            ScalarValue::Float64(_) => ScalarType::Float64,
            ScalarValue::Date(_) => ScalarType::Date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ScalarType, ScalarValue};

    #[test]
    fn widths_match_binary_images() {
        assert_eq!(ScalarType::Int8.width(), 1);
        assert_eq!(ScalarType::Int16.width(), 2);
        assert_eq!(ScalarType::Int32.width(), 4);
        assert_eq!(ScalarType::Date.width(), 4);
        assert_eq!(ScalarType::Int64.width(), 8);
        assert_eq!(ScalarType::UInt64.width(), 8);
        assert_eq!(ScalarType::Float64.width(), 8);
    }

    #[test]
    fn value_reports_its_type() {
        assert_eq!(ScalarValue::Date(19_000).scalar_type(), ScalarType::Date);
        assert_eq!(ScalarValue::Float64(1.5).scalar_type(), ScalarType::Float64);
    }
}
