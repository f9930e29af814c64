//! Columnar batch primitives for the tally aggregation engine.
//!
//! This crate provides:
//! - Fixed-width [`ColumnVector`]s of one scalar type each.
//! - [`DataChunk`], the column-major batch unit shared by operators.
//! - Batch-at-a-time operations in [`ops`]: hashing, offset arithmetic, and
//!   the scatter/gather primitives that move values between columns and a
//!   caller-owned byte heap.
//!
//! Everything operates one whole batch per call; per-row subsets are named
//! by explicit selection slices instead of copies.

#![forbid(unsafe_code)]

mod chunk;
pub mod ops;
mod types;
mod vector;

pub use crate::chunk::{DataChunk, BATCH_SIZE};
pub use crate::types::{ScalarType, ScalarValue};
pub use crate::vector::{ColumnVector, VectorData};
