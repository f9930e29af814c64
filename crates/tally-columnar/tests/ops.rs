use tally_columnar::ops::{self, gather, scatter};
use tally_columnar::{ColumnVector, DataChunk, ScalarType, ScalarValue};

#[test]
fn composite_hashes_agree_for_equal_key_pairs() {
    let first = ColumnVector::int32(vec![1, 2, 1, 1]);
    let second = ColumnVector::int64(vec![10, 10, 11, 10]);

    let mut hashes = Vec::new();
    ops::hash(&first, &mut hashes);
    ops::combine_hash(&mut hashes, &second);

    // Rows 0 and 3 carry the same (1, 10) key; the others differ.
    assert_eq!(hashes[0], hashes[3]);
    assert_ne!(hashes[0], hashes[1]);
    assert_ne!(hashes[0], hashes[2]);
    assert_ne!(hashes[1], hashes[2]);
}

#[test]
fn offsets_scatter_and_gather_through_a_strided_heap() {
    // Three 16-byte records: an i64 field at offset 0, an f64 field at 8.
    let stride = 16;
    let mut heap = vec![0u8; 3 * stride];
    let mut offsets: Vec<usize> = vec![0, 1, 2];
    ops::multiply_scalar(&mut offsets, stride);

    let ids = ColumnVector::int64(vec![7, 8, 9]);
    scatter::set(&ids, &mut heap, &offsets, None);

    ops::add_scalar(&mut offsets, 8);
    let amounts = ColumnVector::float64(vec![0.25, 0.5, 0.75]);
    scatter::set(&amounts, &mut heap, &offsets, None);
    scatter::add(&amounts, &mut heap, &offsets, Some(&[2]));

    let mut read = ColumnVector::with_capacity(ScalarType::Float64, 3);
    gather::set(&heap, &offsets, &mut read);
    assert_eq!(read, ColumnVector::float64(vec![0.25, 0.5, 1.5]));

    let back: Vec<usize> = offsets.iter().map(|o| o - 8).collect();
    let mut read_ids = ColumnVector::with_capacity(ScalarType::Int64, 3);
    gather::set(&heap, &back, &mut read_ids);
    assert_eq!(read_ids, ids);
}

#[test]
fn chunks_carry_columns_through_split_and_merge() {
    let chunk = DataChunk::from_columns(vec![
        ColumnVector::int32(vec![1, 2]),
        ColumnVector::uint64(vec![5, 6]),
    ]);
    let (left, right) = chunk.split_columns(1);
    assert_eq!(left.column(0).value(1), ScalarValue::Int32(2));
    assert_eq!(right.column(0).value(0), ScalarValue::UInt64(5));

    let merged = left.merge(right);
    assert_eq!(merged.column_count(), 2);
    assert_eq!(merged.count(), 2);
}
