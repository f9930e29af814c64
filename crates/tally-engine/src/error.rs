#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The operation is recognized but deliberately unsupported in this
    /// revision (table downsizing, resizing a non-empty table, parallel
    /// aggregation).
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// The table's backing buffer could not be allocated.
    #[error("out of memory allocating {bytes} bytes")]
    OutOfMemory { bytes: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
