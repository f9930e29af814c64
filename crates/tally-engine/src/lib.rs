//! Vectorized grouped aggregation.
//!
//! The heart of this crate is [`AggregateHashTable`], a byte-packed,
//! linear-probed hash table keeping one fixed-stride tuple per distinct
//! grouping key, with running aggregate state updated a whole batch at a
//! time. [`GroupedAggregator`] wraps it as an operator: feed it batches
//! laid out as key columns followed by aggregate argument columns, then
//! drain result batches.
//!
//! Inputs are assumed null-free; callers filter nulls before aggregation.

#![forbid(unsafe_code)]

mod aggregate;
mod error;
mod hash_table;
mod operator;

pub use crate::aggregate::{payload_width, AggregateKind, AggregateSpec};
pub use crate::error::{EngineError, Result};
pub use crate::hash_table::AggregateHashTable;
pub use crate::operator::{AggregatorOptions, GroupedAggregator};
