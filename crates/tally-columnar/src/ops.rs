#![forbid(unsafe_code)]

//! Batch-at-a-time operations.
//!
//! The hashing and arithmetic functions transform whole columns; the
//! [`scatter`] and [`gather`] modules move values between columns and a
//! caller-owned byte heap addressed by a column of byte offsets. Operations
//! taking a `selection` visit only the listed rows; `None` means all rows.
//! A selected row `i` always pairs `values[i]` with `offsets[i]`.

use crate::vector::{ColumnVector, VectorData};

// Fixed seeds keep hashes (and therefore probe chains) reproducible
// across runs.
const HASH_SEEDS: [u64; 4] = [
    0x2f1b_7a5e_9d3c_8e41,
    0x84a9_1c6f_d02b_5e77,
    0x5bd1_e995_7b42_ca13,
    0xc2b2_ae3d_27d4_eb4f,
];

fn hash_state() -> ahash::RandomState {
    ahash::RandomState::with_seeds(HASH_SEEDS[0], HASH_SEEDS[1], HASH_SEEDS[2], HASH_SEEDS[3])
}

/// 64-bit hash of every row of `col`, replacing the contents of `out`.
pub fn hash(col: &ColumnVector, out: &mut Vec<u64>) {
    out.clear();
    let state = hash_state();
    match col.data() {
        VectorData::Int8(v) => out.extend(v.iter().map(|x| state.hash_one(*x))),
        VectorData::Int16(v) => out.extend(v.iter().map(|x| state.hash_one(*x))),
        VectorData::Int32(v) => out.extend(v.iter().map(|x| state.hash_one(*x))),
        VectorData::Int64(v) => out.extend(v.iter().map(|x| state.hash_one(*x))),
        VectorData::UInt64(v) => out.extend(v.iter().map(|x| state.hash_one(*x))),
        VectorData::Float64(v) => out.extend(v.iter().map(|x| state.hash_one(x.to_bits()))),
        VectorData::Date(v) => out.extend(v.iter().map(|x| state.hash_one(*x))),
    }
}

/// Fold a further key column into running hashes: `hashes[i]` becomes the
/// combination of its previous value and the hash of `col[i]`.
pub fn combine_hash(hashes: &mut [u64], col: &ColumnVector) {
    debug_assert_eq!(hashes.len(), col.len(), "hash/column length mismatch");
    let state = hash_state();
    match col.data() {
        VectorData::Int8(v) => fold_into(hashes, v.iter().map(|x| state.hash_one(*x))),
        VectorData::Int16(v) => fold_into(hashes, v.iter().map(|x| state.hash_one(*x))),
        VectorData::Int32(v) => fold_into(hashes, v.iter().map(|x| state.hash_one(*x))),
        VectorData::Int64(v) => fold_into(hashes, v.iter().map(|x| state.hash_one(*x))),
        VectorData::UInt64(v) => fold_into(hashes, v.iter().map(|x| state.hash_one(*x))),
        VectorData::Float64(v) => {
            fold_into(hashes, v.iter().map(|x| state.hash_one(x.to_bits())))
        }
        VectorData::Date(v) => fold_into(hashes, v.iter().map(|x| state.hash_one(*x))),
    }
}

fn fold_into(hashes: &mut [u64], incoming: impl Iterator<Item = u64>) {
    for (seed, hash) in hashes.iter_mut().zip(incoming) {
        let s = *seed;
        *seed = s
            ^ hash
                .wrapping_add(0x9e37_79b9_7f4a_7c15)
                .wrapping_add(s << 6)
                .wrapping_add(s >> 2);
    }
}

/// Element-wise narrowing cast of hashes into heap offsets, replacing the
/// contents of `out`.
pub fn cast_to_offsets(hashes: &[u64], out: &mut Vec<usize>) {
    out.clear();
    out.extend(hashes.iter().map(|&h| h as usize));
}

/// `offsets[i] := offsets[i] mod k`, element-wise.
pub fn modulo_scalar(offsets: &mut [usize], k: usize) {
    for offset in offsets.iter_mut() {
        *offset %= k;
    }
}

/// `offsets[i] := offsets[i] * k`, element-wise.
pub fn multiply_scalar(offsets: &mut [usize], k: usize) {
    for offset in offsets.iter_mut() {
        *offset *= k;
    }
}

/// Advance every offset by `k` bytes.
pub fn add_scalar(offsets: &mut [usize], k: usize) {
    for offset in offsets.iter_mut() {
        *offset += k;
    }
}

fn for_each_row(selection: Option<&[usize]>, count: usize, mut f: impl FnMut(usize)) {
    match selection {
        Some(rows) => {
            for &row in rows {
                f(row);
            }
        }
        None => {
            for row in 0..count {
                f(row);
            }
        }
    }
}

fn load<const N: usize>(heap: &[u8], at: usize) -> [u8; N] {
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&heap[at..at + N]);
    bytes
}

fn store<const N: usize>(heap: &mut [u8], at: usize, bytes: [u8; N]) {
    heap[at..at + N].copy_from_slice(&bytes);
}

/// Column-to-heap writes through a column of byte offsets.
pub mod scatter {
    use super::{for_each_row, load, store};
    use crate::vector::{ColumnVector, VectorData};

    /// Store each selected row's value at its offset.
    pub fn set(
        values: &ColumnVector,
        heap: &mut [u8],
        offsets: &[usize],
        selection: Option<&[usize]>,
    ) {
        match values.data() {
            VectorData::Int8(v) => for_each_row(selection, v.len(), |i| {
                store(heap, offsets[i], v[i].to_le_bytes())
            }),
            VectorData::Int16(v) => for_each_row(selection, v.len(), |i| {
                store(heap, offsets[i], v[i].to_le_bytes())
            }),
            VectorData::Int32(v) => for_each_row(selection, v.len(), |i| {
                store(heap, offsets[i], v[i].to_le_bytes())
            }),
            VectorData::Int64(v) => for_each_row(selection, v.len(), |i| {
                store(heap, offsets[i], v[i].to_le_bytes())
            }),
            VectorData::UInt64(v) => for_each_row(selection, v.len(), |i| {
                store(heap, offsets[i], v[i].to_le_bytes())
            }),
            VectorData::Float64(v) => for_each_row(selection, v.len(), |i| {
                store(heap, offsets[i], v[i].to_le_bytes())
            }),
            VectorData::Date(v) => for_each_row(selection, v.len(), |i| {
                store(heap, offsets[i], v[i].to_le_bytes())
            }),
        }
    }

    /// Store each selected row's logical count image: one row, one count.
    /// Null filtering happens upstream, so the image is always 1.
    pub fn set_count(heap: &mut [u8], offsets: &[usize], count: usize, selection: Option<&[usize]>) {
        for_each_row(selection, count, |i| {
            store(heap, offsets[i], 1u64.to_le_bytes());
        });
    }

    /// `heap[offsets[i]] += values[i]` for each selected row. Integer
    /// addition wraps.
    pub fn add(
        values: &ColumnVector,
        heap: &mut [u8],
        offsets: &[usize],
        selection: Option<&[usize]>,
    ) {
        match values.data() {
            VectorData::Int8(v) => for_each_row(selection, v.len(), |i| {
                let cur = i8::from_le_bytes(load(heap, offsets[i]));
                store(heap, offsets[i], cur.wrapping_add(v[i]).to_le_bytes());
            }),
            VectorData::Int16(v) => for_each_row(selection, v.len(), |i| {
                let cur = i16::from_le_bytes(load(heap, offsets[i]));
                store(heap, offsets[i], cur.wrapping_add(v[i]).to_le_bytes());
            }),
            VectorData::Int32(v) => for_each_row(selection, v.len(), |i| {
                let cur = i32::from_le_bytes(load(heap, offsets[i]));
                store(heap, offsets[i], cur.wrapping_add(v[i]).to_le_bytes());
            }),
            VectorData::Int64(v) => for_each_row(selection, v.len(), |i| {
                let cur = i64::from_le_bytes(load(heap, offsets[i]));
                store(heap, offsets[i], cur.wrapping_add(v[i]).to_le_bytes());
            }),
            VectorData::UInt64(v) => for_each_row(selection, v.len(), |i| {
                let cur = u64::from_le_bytes(load(heap, offsets[i]));
                store(heap, offsets[i], cur.wrapping_add(v[i]).to_le_bytes());
            }),
            VectorData::Float64(v) => for_each_row(selection, v.len(), |i| {
                let cur = f64::from_le_bytes(load(heap, offsets[i]));
                store(heap, offsets[i], (cur + v[i]).to_le_bytes());
            }),
            VectorData::Date(v) => for_each_row(selection, v.len(), |i| {
                let cur = i32::from_le_bytes(load(heap, offsets[i]));
                store(heap, offsets[i], cur.wrapping_add(v[i]).to_le_bytes());
            }),
        }
    }

    /// Add one to the 64-bit counter at each selected offset.
    pub fn add_one(heap: &mut [u8], offsets: &[usize], count: usize, selection: Option<&[usize]>) {
        for_each_row(selection, count, |i| {
            let cur = u64::from_le_bytes(load(heap, offsets[i]));
            store(heap, offsets[i], cur.wrapping_add(1).to_le_bytes());
        });
    }

    /// `heap[offsets[i]] := min(heap[offsets[i]], values[i])` per selected row.
    pub fn min(
        values: &ColumnVector,
        heap: &mut [u8],
        offsets: &[usize],
        selection: Option<&[usize]>,
    ) {
        match values.data() {
            VectorData::Int8(v) => for_each_row(selection, v.len(), |i| {
                if v[i] < i8::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
            VectorData::Int16(v) => for_each_row(selection, v.len(), |i| {
                if v[i] < i16::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
            VectorData::Int32(v) => for_each_row(selection, v.len(), |i| {
                if v[i] < i32::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
            VectorData::Int64(v) => for_each_row(selection, v.len(), |i| {
                if v[i] < i64::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
            VectorData::UInt64(v) => for_each_row(selection, v.len(), |i| {
                if v[i] < u64::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
            VectorData::Float64(v) => for_each_row(selection, v.len(), |i| {
                if v[i] < f64::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
            VectorData::Date(v) => for_each_row(selection, v.len(), |i| {
                if v[i] < i32::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
        }
    }

    /// `heap[offsets[i]] := max(heap[offsets[i]], values[i])` per selected row.
    pub fn max(
        values: &ColumnVector,
        heap: &mut [u8],
        offsets: &[usize],
        selection: Option<&[usize]>,
    ) {
        match values.data() {
            VectorData::Int8(v) => for_each_row(selection, v.len(), |i| {
                if v[i] > i8::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
            VectorData::Int16(v) => for_each_row(selection, v.len(), |i| {
                if v[i] > i16::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
            VectorData::Int32(v) => for_each_row(selection, v.len(), |i| {
                if v[i] > i32::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
            VectorData::Int64(v) => for_each_row(selection, v.len(), |i| {
                if v[i] > i64::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
            VectorData::UInt64(v) => for_each_row(selection, v.len(), |i| {
                if v[i] > u64::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
            VectorData::Float64(v) => for_each_row(selection, v.len(), |i| {
                if v[i] > f64::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
            VectorData::Date(v) => for_each_row(selection, v.len(), |i| {
                if v[i] > i32::from_le_bytes(load(heap, offsets[i])) {
                    store(heap, offsets[i], v[i].to_le_bytes());
                }
            }),
        }
    }
}

/// Heap-to-column reads through a column of byte offsets.
pub mod gather {
    use super::load;
    use crate::vector::{ColumnVector, VectorData};

    /// Load one value per offset into `out`, replacing its contents. The
    /// value width is taken from `out`'s scalar type.
    pub fn set(heap: &[u8], offsets: &[usize], out: &mut ColumnVector) {
        out.clear();
        match out.data_mut() {
            VectorData::Int8(v) => {
                v.extend(offsets.iter().map(|&at| i8::from_le_bytes(load(heap, at))))
            }
            VectorData::Int16(v) => {
                v.extend(offsets.iter().map(|&at| i16::from_le_bytes(load(heap, at))))
            }
            VectorData::Int32(v) => {
                v.extend(offsets.iter().map(|&at| i32::from_le_bytes(load(heap, at))))
            }
            VectorData::Int64(v) => {
                v.extend(offsets.iter().map(|&at| i64::from_le_bytes(load(heap, at))))
            }
            VectorData::UInt64(v) => {
                v.extend(offsets.iter().map(|&at| u64::from_le_bytes(load(heap, at))))
            }
            VectorData::Float64(v) => {
                v.extend(offsets.iter().map(|&at| f64::from_le_bytes(load(heap, at))))
            }
            VectorData::Date(v) => {
                v.extend(offsets.iter().map(|&at| i32::from_le_bytes(load(heap, at))))
            }
        }
    }
}
