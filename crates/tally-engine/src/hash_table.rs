#![forbid(unsafe_code)]

use crate::aggregate::{payload_width, AggregateKind, AggregateSpec};
use crate::error::{EngineError, Result};
use tally_columnar::ops::{self, gather, scatter};
use tally_columnar::{ColumnVector, DataChunk, VectorData};

// Slot flags. A zero-filled buffer is an all-empty table.
const SLOT_EMPTY: u8 = 0;
const SLOT_FULL: u8 = 1;

const FLAG_SIZE: usize = 1;
const COUNTER_SIZE: usize = 8;

/// A byte-packed, linear-probed hash table keeping one tuple per distinct
/// grouping key.
///
/// Tuple layout, fixed at construction:
///
/// ```text
/// [ FLAG : 1 ][ GROUP KEYS : group_width ][ PAYLOAD : payload_width ][ COUNT : 8 ]
/// ```
///
/// `GROUP KEYS` is the concatenated binary image of the key columns;
/// `PAYLOAD` concatenates the running state of every aggregate that keeps
/// one; `COUNT` counts the rows absorbed into the group and doubles as the
/// `COUNT(*)` result and the `AVG` divisor.
///
/// The table never grows while it holds entries. Callers size it with
/// enough headroom that an empty slot always remains; the probe loop
/// depends on that invariant rather than defending against a full table.
#[derive(Debug)]
pub struct AggregateHashTable {
    data: Vec<u8>,
    capacity: usize,
    entries: usize,
    group_width: usize,
    payload_width: usize,
    tuple_size: usize,
    aggregates: Vec<AggregateSpec>,
    max_chain: usize,
}

impl AggregateHashTable {
    /// Allocate a table of `initial_capacity` slots for keys of
    /// `group_width` bytes and the given aggregates. `parallel` is
    /// reserved and must be `false`.
    pub fn try_new(
        initial_capacity: usize,
        group_width: usize,
        payload_width_bytes: usize,
        aggregates: Vec<AggregateSpec>,
        parallel: bool,
    ) -> Result<Self> {
        if parallel {
            return Err(EngineError::NotImplemented("parallel aggregation"));
        }
        debug_assert_eq!(
            payload_width_bytes,
            payload_width(&aggregates),
            "payload width disagrees with aggregate state widths"
        );

        let tuple_size = FLAG_SIZE + group_width + payload_width_bytes + COUNTER_SIZE;
        let mut table = Self {
            data: Vec::new(),
            capacity: 0,
            entries: 0,
            group_width,
            payload_width: payload_width_bytes,
            tuple_size,
            aggregates,
            max_chain: 0,
        };
        table.resize(initial_capacity)?;
        log::debug!(
            "aggregate table: {} slots, {}B stride ({}B keys, {}B payload)",
            table.capacity,
            table.tuple_size,
            table.group_width,
            table.payload_width,
        );
        Ok(table)
    }

    /// Grow the table to `capacity` slots. Only an empty table can change
    /// size, and only upward.
    pub fn resize(&mut self, capacity: usize) -> Result<()> {
        if capacity <= self.capacity {
            return Err(EngineError::NotImplemented("downsizing the aggregate table"));
        }
        if self.entries > 0 {
            return Err(EngineError::NotImplemented(
                "resizing a non-empty aggregate table",
            ));
        }

        let bytes = capacity
            .checked_mul(self.tuple_size)
            .ok_or(EngineError::OutOfMemory { bytes: usize::MAX })?;
        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| EngineError::OutOfMemory { bytes })?;
        // Zero fill: every flag byte starts out SLOT_EMPTY.
        data.resize(bytes, 0);

        self.data = data;
        self.capacity = capacity;
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live groups.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Longest probe chain walked by any insert so far.
    pub fn max_chain(&self) -> usize {
        self.max_chain
    }

    /// Absorb one batch. `groups` carries the key columns; `payload` one
    /// argument column per aggregate, index-aligned with the aggregate
    /// list (`COUNT(*)` positions are ignored).
    pub fn add_chunk(&mut self, groups: &DataChunk, payload: &DataChunk) {
        if groups.count() == 0 {
            return;
        }
        debug_assert_eq!(payload.count(), groups.count(), "ragged input batch");
        debug_assert_eq!(
            payload.column_count(),
            self.aggregates.len(),
            "one payload column per aggregate"
        );
        debug_assert_eq!(
            groups
                .columns()
                .iter()
                .map(|c| c.scalar_type().width())
                .sum::<usize>(),
            self.group_width,
            "key columns disagree with the table's group width"
        );

        let count = groups.count();

        // One 64-bit hash per row: hash the first key column, fold in the
        // rest.
        let mut hashes = Vec::new();
        ops::hash(groups.column(0), &mut hashes);
        for column in &groups.columns()[1..] {
            ops::combine_hash(&mut hashes, column);
        }

        // Home-slot byte offsets: hash -> slot index -> byte offset.
        let mut offsets = Vec::new();
        ops::cast_to_offsets(&hashes, &mut offsets);
        ops::modulo_scalar(&mut offsets, self.capacity);
        ops::multiply_scalar(&mut offsets, self.tuple_size);

        // Probe each row: claim an empty slot or find the row's group,
        // splitting the batch into first-seen and already-seen rows. The
        // table is updated eagerly, so a key duplicated within this batch
        // classifies its first occurrence as new and the rest as updates.
        let mut key = vec![0u8; self.group_width];
        let mut new_rows: Vec<usize> = Vec::new();
        let mut updated_rows: Vec<usize> = Vec::new();
        let end = self.capacity * self.tuple_size;

        for row in 0..count {
            let mut at = 0;
            for column in groups.columns() {
                let width = column.scalar_type().width();
                column.copy_image(row, &mut key[at..at + width]);
                at += width;
            }

            let mut entry = offsets[row];
            let mut chain = 0usize;
            loop {
                if self.data[entry] == SLOT_EMPTY {
                    self.data[entry] = SLOT_FULL;
                    self.data[entry + FLAG_SIZE..entry + FLAG_SIZE + self.group_width]
                        .copy_from_slice(&key);
                    // Fresh group: zero payload state and row counter.
                    self.data[entry + FLAG_SIZE + self.group_width..entry + self.tuple_size]
                        .fill(0);
                    new_rows.push(row);
                    self.entries += 1;
                    debug_assert!(self.entries < self.capacity, "aggregate table overfull");
                    break;
                }
                if self.data[entry + FLAG_SIZE..entry + FLAG_SIZE + self.group_width] == key[..] {
                    updated_rows.push(row);
                    break;
                }

                // Collision: next slot, wrapping at the buffer end.
                chain += 1;
                entry += self.tuple_size;
                if entry >= end {
                    entry = 0;
                }
            }

            // Leave the offset pointing at the slot's payload.
            offsets[row] = entry + FLAG_SIZE + self.group_width;
            self.max_chain = self.max_chain.max(chain);
        }

        // Walk the aggregates, one vectorized scatter per subset, advancing
        // every offset by the aggregate's state width as we go.
        for index in 0..self.aggregates.len() {
            let spec = self.aggregates[index];
            if spec.kind == AggregateKind::CountStar {
                continue;
            }
            let column = payload.column(index);
            debug_assert_eq!(column.len(), count, "short payload column");
            // COUNT never reads its argument values, so any column type is
            // acceptable there.
            debug_assert!(
                spec.kind == AggregateKind::Count || column.scalar_type() == spec.state_type,
                "payload column type disagrees with aggregate state"
            );

            if !new_rows.is_empty() {
                match spec.kind {
                    AggregateKind::Count => {
                        scatter::set_count(&mut self.data, &offsets, count, Some(&new_rows))
                    }
                    _ => scatter::set(column, &mut self.data, &offsets, Some(&new_rows)),
                }
            }
            if !updated_rows.is_empty() {
                match spec.kind {
                    AggregateKind::Count => {
                        scatter::add_one(&mut self.data, &offsets, count, Some(&updated_rows))
                    }
                    AggregateKind::Sum | AggregateKind::Avg => {
                        scatter::add(column, &mut self.data, &offsets, Some(&updated_rows))
                    }
                    AggregateKind::Min => {
                        scatter::min(column, &mut self.data, &offsets, Some(&updated_rows))
                    }
                    AggregateKind::Max => {
                        scatter::max(column, &mut self.data, &offsets, Some(&updated_rows))
                    }
                    AggregateKind::CountStar => unreachable!(),
                }
            }
            ops::add_scalar(&mut offsets, spec.state_width());
        }

        // The offsets now point past the payload, at each tuple's row
        // counter: one increment per absorbed row.
        scatter::add_one(&mut self.data, &offsets, count, None);
    }

    /// Emit up to `result.maximum_size()` live groups in slot order,
    /// starting at slot `position`. Advances `position` past the last slot
    /// examined; once it reaches the capacity the table is drained and the
    /// output chunks stay empty. Returns the number of groups emitted.
    pub fn scan(
        &self,
        position: &mut usize,
        groups: &mut DataChunk,
        result: &mut DataChunk,
    ) -> usize {
        groups.reset();
        result.reset();
        debug_assert_eq!(
            groups
                .columns()
                .iter()
                .map(|c| c.scalar_type().width())
                .sum::<usize>(),
            self.group_width,
            "output key columns disagree with the table's group width"
        );
        debug_assert_eq!(result.column_count(), self.aggregates.len());
        debug_assert!(groups.maximum_size() >= result.maximum_size());

        // Collect offsets of full slots, each pointing at its group keys.
        let limit = result.maximum_size();
        let mut offsets: Vec<usize> = Vec::with_capacity(limit);
        let mut slot = *position;
        while slot < self.capacity && offsets.len() < limit {
            let at = slot * self.tuple_size;
            if self.data[at] == SLOT_FULL {
                offsets.push(at + FLAG_SIZE);
            }
            slot += 1;
        }
        *position = slot;
        if offsets.is_empty() {
            return 0;
        }
        let found = offsets.len();

        // Gather the key columns, walking the offsets across the tuple.
        for column in groups.columns_mut() {
            gather::set(&self.data, &offsets, column);
            ops::add_scalar(&mut offsets, column.scalar_type().width());
        }

        // First pass: every aggregate with payload state, in layout order.
        let mut consumed = 0usize;
        for index in 0..self.aggregates.len() {
            let spec = self.aggregates[index];
            if spec.kind == AggregateKind::CountStar {
                continue;
            }
            if spec.kind == AggregateKind::Avg {
                // Only the sum is stored; divide by the row counter sitting
                // at the end of the payload, a fixed distance ahead.
                let counter_offset = self.payload_width - consumed;
                gather_average(&self.data, &offsets, counter_offset, result.column_mut(index));
            } else {
                gather::set(&self.data, &offsets, result.column_mut(index));
            }
            ops::add_scalar(&mut offsets, spec.state_width());
            consumed += spec.state_width();
        }

        // Second pass: the offsets now rest on the row counter, which is
        // exactly the COUNT(*) result.
        for index in 0..self.aggregates.len() {
            if self.aggregates[index].kind == AggregateKind::CountStar {
                gather::set(&self.data, &offsets, result.column_mut(index));
            }
        }

        groups.set_count(found);
        result.set_count(found);
        found
    }
}

fn read_counter(heap: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; COUNTER_SIZE];
    bytes.copy_from_slice(&heap[at..at + COUNTER_SIZE]);
    u64::from_le_bytes(bytes)
}

/// Gather `sum / count` per tuple, dispatched on the output column's
/// scalar type. Integer division truncates; `count` is never zero because
/// a tuple only exists once a row has been counted into it.
fn gather_average(heap: &[u8], offsets: &[usize], counter_offset: usize, out: &mut ColumnVector) {
    out.clear();
    match out.data_mut() {
        VectorData::Int8(v) => {
            for &at in offsets {
                let count = read_counter(heap, at + counter_offset) as i64;
                let sum = i8::from_le_bytes([heap[at]]) as i64;
                v.push((sum / count) as i8);
            }
        }
        VectorData::Int16(v) => {
            for &at in offsets {
                let count = read_counter(heap, at + counter_offset) as i64;
                let sum = i16::from_le_bytes([heap[at], heap[at + 1]]) as i64;
                v.push((sum / count) as i16);
            }
        }
        VectorData::Int32(v) => {
            for &at in offsets {
                let count = read_counter(heap, at + counter_offset) as i64;
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(&heap[at..at + 4]);
                v.push((i32::from_le_bytes(bytes) as i64 / count) as i32);
            }
        }
        VectorData::Int64(v) => {
            for &at in offsets {
                let count = read_counter(heap, at + counter_offset) as i64;
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&heap[at..at + 8]);
                v.push(i64::from_le_bytes(bytes) / count);
            }
        }
        VectorData::UInt64(v) => {
            for &at in offsets {
                let count = read_counter(heap, at + counter_offset);
                let sum = read_counter(heap, at);
                v.push(sum / count);
            }
        }
        VectorData::Float64(v) => {
            for &at in offsets {
                let count = read_counter(heap, at + counter_offset);
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&heap[at..at + 8]);
                v.push(f64::from_le_bytes(bytes) / count as f64);
            }
        }
        VectorData::Date(v) => {
            for &at in offsets {
                let count = read_counter(heap, at + counter_offset) as i64;
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(&heap[at..at + 4]);
                v.push((i32::from_le_bytes(bytes) as i64 / count) as i32);
            }
        }
    }
}
