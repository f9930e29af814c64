#![forbid(unsafe_code)]

use crate::types::{ScalarType, ScalarValue};

/// Typed backing storage of a column vector.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorData {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float64(Vec<f64>),
    Date(Vec<i32>),
}

/// One column of a batch: contiguous fixed-width scalars of a single type.
///
/// Per-row subsets ("selection vectors") are not stored on the vector;
/// they are passed explicitly to the operations in [`crate::ops`], which
/// keeps borrowed input batches immutable across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnVector {
    data: VectorData,
}

impl ColumnVector {
    pub fn with_capacity(scalar_type: ScalarType, capacity: usize) -> Self {
        let data = match scalar_type {
            ScalarType::Int8 => VectorData::Int8(Vec::with_capacity(capacity)),
            ScalarType::Int16 => VectorData::Int16(Vec::with_capacity(capacity)),
            ScalarType::Int32 => VectorData::Int32(Vec::with_capacity(capacity)),
            ScalarType::Int64 => VectorData::Int64(Vec::with_capacity(capacity)),
            ScalarType::UInt64 => VectorData::UInt64(Vec::with_capacity(capacity)),
            ScalarType::Float64 => VectorData::Float64(Vec::with_capacity(capacity)),
            ScalarType::Date => VectorData::Date(Vec::with_capacity(capacity)),
        };
        Self { data }
    }

    pub fn int8(values: Vec<i8>) -> Self {
        Self { data: VectorData::Int8(values) }
    }

    pub fn int16(values: Vec<i16>) -> Self {
        Self { data: VectorData::Int16(values) }
    }

    pub fn int32(values: Vec<i32>) -> Self {
        Self { data: VectorData::Int32(values) }
    }

    pub fn int64(values: Vec<i64>) -> Self {
        Self { data: VectorData::Int64(values) }
    }

    pub fn uint64(values: Vec<u64>) -> Self {
        Self { data: VectorData::UInt64(values) }
    }

    pub fn float64(values: Vec<f64>) -> Self {
        Self { data: VectorData::Float64(values) }
    }

    pub fn date(values: Vec<i32>) -> Self {
        Self { data: VectorData::Date(values) }
    }

    pub fn scalar_type(&self) -> ScalarType {
        match &self.data {
            VectorData::Int8(_) => ScalarType::Int8,
            VectorData::Int16(_) => ScalarType::Int16,
            VectorData::Int32(_) => ScalarType::Int32,
            VectorData::Int64(_) => ScalarType::Int64,
            VectorData::UInt64(_) => ScalarType::UInt64,
            VectorData::Float64(_) => ScalarType::Float64,
            VectorData::Date(_) => ScalarType::Date,
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            VectorData::Int8(v) => v.len(),
            VectorData::Int16(v) => v.len(),
            VectorData::Int32(v) => v.len(),
            VectorData::Int64(v) => v.len(),
            VectorData::UInt64(v) => v.len(),
            VectorData::Float64(v) => v.len(),
            VectorData::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        match &mut self.data {
            VectorData::Int8(v) => v.clear(),
            VectorData::Int16(v) => v.clear(),
            VectorData::Int32(v) => v.clear(),
            VectorData::Int64(v) => v.clear(),
            VectorData::UInt64(v) => v.clear(),
            VectorData::Float64(v) => v.clear(),
            VectorData::Date(v) => v.clear(),
        }
    }

    /// Append one value. The value's type must match the column's type;
    /// a mismatch is a caller bug and the value is dropped.
    pub fn push(&mut self, value: ScalarValue) {
        let column_type = self.scalar_type();
        match (&mut self.data, value) {
            (VectorData::Int8(v), ScalarValue::Int8(x)) => v.push(x),
            (VectorData::Int16(v), ScalarValue::Int16(x)) => v.push(x),
            (VectorData::Int32(v), ScalarValue::Int32(x)) => v.push(x),
            (VectorData::Int64(v), ScalarValue::Int64(x)) => v.push(x),
            (VectorData::UInt64(v), ScalarValue::UInt64(x)) => v.push(x),
            (VectorData::Float64(v), ScalarValue::Float64(x)) => v.push(x),
            (VectorData::Date(v), ScalarValue::Date(x)) => v.push(x),
            (_, value) => {
                debug_assert!(false, "pushed {value:?} into a {column_type} column");
            }
        }
    }

    pub fn value(&self, row: usize) -> ScalarValue {
        match &self.data {
            VectorData::Int8(v) => ScalarValue::Int8(v[row]),
            VectorData::Int16(v) => ScalarValue::Int16(v[row]),
            VectorData::Int32(v) => ScalarValue::Int32(v[row]),
            VectorData::Int64(v) => ScalarValue::Int64(v[row]),
            VectorData::UInt64(v) => ScalarValue::UInt64(v[row]),
            VectorData::Float64(v) => ScalarValue::Float64(v[row]),
            VectorData::Date(v) => ScalarValue::Date(v[row]),
        }
    }

    /// Copy the little-endian binary image of one value into `out`, which
    /// must be exactly [`ScalarType::width`] bytes long.
    pub fn copy_image(&self, row: usize, out: &mut [u8]) {
        match &self.data {
            VectorData::Int8(v) => out.copy_from_slice(&v[row].to_le_bytes()),
            VectorData::Int16(v) => out.copy_from_slice(&v[row].to_le_bytes()),
            VectorData::Int32(v) => out.copy_from_slice(&v[row].to_le_bytes()),
            VectorData::Int64(v) => out.copy_from_slice(&v[row].to_le_bytes()),
            VectorData::UInt64(v) => out.copy_from_slice(&v[row].to_le_bytes()),
            VectorData::Float64(v) => out.copy_from_slice(&v[row].to_le_bytes()),
            VectorData::Date(v) => out.copy_from_slice(&v[row].to_le_bytes()),
        }
    }

    pub fn data(&self) -> &VectorData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut VectorData {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::ColumnVector;
    use crate::types::{ScalarType, ScalarValue};

    #[test]
    fn push_and_read_back() {
        let mut col = ColumnVector::with_capacity(ScalarType::Int32, 4);
        col.push(ScalarValue::Int32(7));
        col.push(ScalarValue::Int32(-1));
        assert_eq!(col.len(), 2);
        assert_eq!(col.value(0), ScalarValue::Int32(7));
        assert_eq!(col.value(1), ScalarValue::Int32(-1));
    }

    #[test]
    fn image_is_little_endian_and_width_sized() {
        let col = ColumnVector::int16(vec![0x1234]);
        let mut buf = [0u8; 2];
        col.copy_image(0, &mut buf);
        assert_eq!(buf, [0x34, 0x12]);

        let col = ColumnVector::date(vec![-2]);
        let mut buf = [0u8; 4];
        col.copy_image(0, &mut buf);
        assert_eq!(buf, (-2i32).to_le_bytes());
    }

    #[test]
    fn clear_keeps_type() {
        let mut col = ColumnVector::float64(vec![1.0, 2.0]);
        col.clear();
        assert!(col.is_empty());
        assert_eq!(col.scalar_type(), ScalarType::Float64);
    }
}
