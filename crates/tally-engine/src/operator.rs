#![forbid(unsafe_code)]

use crate::aggregate::{payload_width, AggregateSpec};
use crate::error::Result;
use crate::hash_table::AggregateHashTable;
use tally_columnar::{DataChunk, ScalarType, BATCH_SIZE};

/// Sizing and batching knobs for [`GroupedAggregator`].
#[derive(Debug, Clone, Copy)]
pub struct AggregatorOptions {
    /// Upper bound on the distinct groups the input is expected to
    /// produce. The table is sized once from this; exceeding it lengthens
    /// probe chains and an occupied table cannot be resized.
    pub expected_groups: usize,
    /// Rows per emitted output chunk.
    pub output_batch_size: usize,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            expected_groups: 16_384,
            output_batch_size: BATCH_SIZE,
        }
    }
}

/// The grouped-aggregation operator.
///
/// Feed it input batches laid out as the group key columns followed by one
/// argument column per aggregate; it splits each batch and absorbs it into
/// an [`AggregateHashTable`]. Once the input is exhausted, call
/// [`GroupedAggregator::next_batch`] until it returns `None` to drain one
/// result row per group, keys first, aggregates after.
pub struct GroupedAggregator {
    table: AggregateHashTable,
    group_types: Vec<ScalarType>,
    result_types: Vec<ScalarType>,
    aggregate_count: usize,
    output_batch_size: usize,
    scan_position: usize,
    occupancy_warned: bool,
}

impl GroupedAggregator {
    pub fn try_new(
        group_types: Vec<ScalarType>,
        aggregates: Vec<AggregateSpec>,
        options: AggregatorOptions,
    ) -> Result<Self> {
        let group_width = group_types.iter().map(|ty| ty.width()).sum();
        let payload = payload_width(&aggregates);
        // Twice the expected groups preserves the always-an-empty-slot
        // invariant the probe loop relies on.
        let capacity = options
            .expected_groups
            .max(1)
            .saturating_mul(2)
            .next_power_of_two();
        let result_types = aggregates.iter().map(AggregateSpec::output_type).collect();
        let aggregate_count = aggregates.len();
        let table = AggregateHashTable::try_new(capacity, group_width, payload, aggregates, false)?;
        Ok(Self {
            table,
            group_types,
            result_types,
            aggregate_count,
            output_batch_size: options.output_batch_size,
            scan_position: 0,
            occupancy_warned: false,
        })
    }

    /// Absorb one input batch.
    pub fn add_chunk(&mut self, chunk: DataChunk) {
        debug_assert_eq!(
            chunk.column_count(),
            self.group_types.len() + self.aggregate_count,
            "input batch must carry key columns then one argument per aggregate"
        );
        let (groups, payload) = chunk.split_columns(self.group_types.len());
        self.table.add_chunk(&groups, &payload);

        if !self.occupancy_warned && self.table.entries() * 2 > self.table.capacity() {
            self.occupancy_warned = true;
            log::warn!(
                "aggregate table past half occupancy ({} of {} slots); probe chains degrade from here",
                self.table.entries(),
                self.table.capacity(),
            );
        }
    }

    /// Next batch of results, or `None` once every group has been emitted.
    pub fn next_batch(&mut self) -> Option<DataChunk> {
        let mut groups = DataChunk::new(&self.group_types, self.output_batch_size);
        let mut result = DataChunk::new(&self.result_types, self.output_batch_size);
        let emitted = self
            .table
            .scan(&mut self.scan_position, &mut groups, &mut result);
        if emitted == 0 {
            None
        } else {
            Some(groups.merge(result))
        }
    }

    /// Number of distinct groups seen so far.
    pub fn group_count(&self) -> usize {
        self.table.entries()
    }

    /// Longest probe chain any insert has walked.
    pub fn max_chain(&self) -> usize {
        self.table.max_chain()
    }
}
