#![cfg(not(target_arch = "wasm32"))]

//! Splitting a fixed multiset of input rows into any sequence of batches
//! must not change any aggregate result.

use std::collections::HashMap;

use proptest::prelude::*;
use tally_columnar::{ColumnVector, DataChunk, ScalarType, ScalarValue};
use tally_engine::{AggregateSpec, AggregatorOptions, GroupedAggregator};

const CASES: u32 = 64;

type GroupRow = (u64, u64, i64, i64, i64, i64);

fn aggregate_in_batches(rows: &[(i64, i64)], batch_sizes: &[usize]) -> HashMap<i64, GroupRow> {
    let mut aggregator = GroupedAggregator::try_new(
        vec![ScalarType::Int64],
        vec![
            AggregateSpec::count_star(),
            AggregateSpec::count(),
            AggregateSpec::sum(ScalarType::Int64),
            AggregateSpec::avg(ScalarType::Int64),
            AggregateSpec::min(ScalarType::Int64),
            AggregateSpec::max(ScalarType::Int64),
        ],
        AggregatorOptions {
            expected_groups: 64,
            output_batch_size: 13,
        },
    )
    .unwrap();

    let mut next = 0;
    for &size in batch_sizes {
        let batch = &rows[next..next + size];
        next += size;
        let keys: Vec<i64> = batch.iter().map(|(k, _)| *k).collect();
        let values: Vec<i64> = batch.iter().map(|(_, v)| *v).collect();
        aggregator.add_chunk(DataChunk::from_columns(vec![
            ColumnVector::int64(keys),
            ColumnVector::uint64(vec![0; batch.len()]),
            ColumnVector::int64(values.clone()),
            ColumnVector::int64(values.clone()),
            ColumnVector::int64(values.clone()),
            ColumnVector::int64(values.clone()),
            ColumnVector::int64(values),
        ]));
    }
    assert_eq!(next, rows.len(), "partition must cover every row");

    let mut by_key = HashMap::new();
    while let Some(batch) = aggregator.next_batch() {
        for row in 0..batch.count() {
            let ScalarValue::Int64(key) = batch.column(0).value(row) else {
                panic!("unexpected key type");
            };
            let ScalarValue::UInt64(count_star) = batch.column(1).value(row) else {
                panic!("unexpected COUNT(*) type");
            };
            let ScalarValue::UInt64(count) = batch.column(2).value(row) else {
                panic!("unexpected COUNT type");
            };
            let ScalarValue::Int64(sum) = batch.column(3).value(row) else {
                panic!("unexpected SUM type");
            };
            let ScalarValue::Int64(avg) = batch.column(4).value(row) else {
                panic!("unexpected AVG type");
            };
            let ScalarValue::Int64(min) = batch.column(5).value(row) else {
                panic!("unexpected MIN type");
            };
            let ScalarValue::Int64(max) = batch.column(6).value(row) else {
                panic!("unexpected MAX type");
            };
            let previous = by_key.insert(key, (count_star, count, sum, avg, min, max));
            assert!(previous.is_none(), "key {key} emitted twice");
        }
    }
    by_key
}

/// Cut `total` rows into non-empty batch sizes derived from `cuts`.
fn partition_sizes(total: usize, cuts: &[usize]) -> Vec<usize> {
    let mut sizes = Vec::new();
    let mut remaining = total;
    for &cut in cuts {
        if remaining == 0 {
            break;
        }
        let take = (cut % remaining) + 1;
        sizes.push(take);
        remaining -= take;
    }
    if remaining > 0 {
        sizes.push(remaining);
    }
    sizes
}

fn arb_rows() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0i64..12, -1_000i64..1_000), 1..120)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: CASES, ..ProptestConfig::default() })]

    #[test]
    fn any_partition_matches_the_single_batch_run(
        rows in arb_rows(),
        cuts in prop::collection::vec(0usize..40, 0..20),
    ) {
        let whole = aggregate_in_batches(&rows, &[rows.len()]);
        let sizes = partition_sizes(rows.len(), &cuts);
        let split = aggregate_in_batches(&rows, &sizes);
        prop_assert_eq!(&whole, &split);

        // Reference results computed row-at-a-time.
        let mut reference: HashMap<i64, (u64, i64, i64)> = HashMap::new();
        for &(key, value) in &rows {
            let entry = reference.entry(key).or_insert((0, 0, value));
            entry.0 += 1;
            entry.1 += value;
            entry.2 = entry.2.min(value);
        }
        prop_assert_eq!(whole.len(), reference.len());
        for (key, &(count, sum, min)) in &reference {
            let emitted = whole[key];
            prop_assert_eq!(emitted.0, count);
            prop_assert_eq!(emitted.1, count);
            prop_assert_eq!(emitted.2, sum);
            prop_assert_eq!(emitted.3, sum / count as i64);
            prop_assert_eq!(emitted.4, min);
        }
    }
}
