#![forbid(unsafe_code)]

use crate::types::ScalarType;
use crate::vector::ColumnVector;

/// Default number of rows per batch.
pub const BATCH_SIZE: usize = 1024;

/// An ordered collection of column vectors sharing one logical row count.
///
/// Output chunks are created with a fixed `maximum_size` and refilled in
/// place via [`DataChunk::reset`]; input chunks are usually built once with
/// [`DataChunk::from_columns`].
#[derive(Debug, Clone)]
pub struct DataChunk {
    columns: Vec<ColumnVector>,
    count: usize,
    maximum_size: usize,
}

impl DataChunk {
    /// An empty chunk with one column per entry of `types`, each sized to
    /// hold up to `maximum_size` rows.
    pub fn new(types: &[ScalarType], maximum_size: usize) -> Self {
        let columns = types
            .iter()
            .map(|&ty| ColumnVector::with_capacity(ty, maximum_size))
            .collect();
        Self {
            columns,
            count: 0,
            maximum_size,
        }
    }

    /// Wrap fully-populated columns as a chunk. All columns must have the
    /// same length, which becomes the logical count.
    pub fn from_columns(columns: Vec<ColumnVector>) -> Self {
        let count = columns.first().map_or(0, ColumnVector::len);
        debug_assert!(
            columns.iter().all(|c| c.len() == count),
            "ragged columns in chunk"
        );
        Self {
            columns,
            count,
            maximum_size: count.max(BATCH_SIZE),
        }
    }

    pub fn column(&self, index: usize) -> &ColumnVector {
        &self.columns[index]
    }

    pub fn column_mut(&mut self, index: usize) -> &mut ColumnVector {
        &mut self.columns[index]
    }

    pub fn columns(&self) -> &[ColumnVector] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [ColumnVector] {
        &mut self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn set_count(&mut self, count: usize) {
        debug_assert!(count <= self.maximum_size, "chunk overfilled");
        self.count = count;
    }

    pub fn maximum_size(&self) -> usize {
        self.maximum_size
    }

    /// Drop all rows, keeping column types and capacity.
    pub fn reset(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
        self.count = 0;
    }

    /// Split off the first `n` columns, preserving the row count on both
    /// halves. No row data is copied.
    pub fn split_columns(mut self, n: usize) -> (DataChunk, DataChunk) {
        debug_assert!(n <= self.columns.len());
        let rest = self.columns.split_off(n);
        let right = DataChunk {
            columns: rest,
            count: self.count,
            maximum_size: self.maximum_size,
        };
        (self, right)
    }

    /// Append `other`'s columns after this chunk's. Both sides must carry
    /// the same number of rows.
    pub fn merge(mut self, mut other: DataChunk) -> DataChunk {
        debug_assert_eq!(self.count, other.count, "row count mismatch in merge");
        self.columns.append(&mut other.columns);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{DataChunk, BATCH_SIZE};
    use crate::types::ScalarType;
    use crate::vector::ColumnVector;

    #[test]
    fn from_columns_takes_count_from_data() {
        let chunk = DataChunk::from_columns(vec![
            ColumnVector::int64(vec![1, 2, 3]),
            ColumnVector::float64(vec![0.5, 1.5, 2.5]),
        ]);
        assert_eq!(chunk.count(), 3);
        assert_eq!(chunk.column_count(), 2);
        assert_eq!(chunk.maximum_size(), BATCH_SIZE);
    }

    #[test]
    fn split_and_merge_round_trip() {
        let chunk = DataChunk::from_columns(vec![
            ColumnVector::int64(vec![1, 2]),
            ColumnVector::int32(vec![10, 20]),
            ColumnVector::float64(vec![0.1, 0.2]),
        ]);
        let (keys, args) = chunk.split_columns(1);
        assert_eq!(keys.column_count(), 1);
        assert_eq!(args.column_count(), 2);
        assert_eq!(keys.count(), 2);
        assert_eq!(args.count(), 2);

        let merged = keys.merge(args);
        assert_eq!(merged.column_count(), 3);
        assert_eq!(merged.count(), 2);
    }

    #[test]
    fn reset_clears_rows_but_not_shape() {
        let mut chunk = DataChunk::new(&[ScalarType::Int64, ScalarType::UInt64], 16);
        chunk.column_mut(0).push(crate::ScalarValue::Int64(5));
        chunk.column_mut(1).push(crate::ScalarValue::UInt64(1));
        chunk.set_count(1);

        chunk.reset();
        assert_eq!(chunk.count(), 0);
        assert_eq!(chunk.column_count(), 2);
        assert_eq!(chunk.column(0).scalar_type(), ScalarType::Int64);
        assert!(chunk.column(0).is_empty());
    }
}
