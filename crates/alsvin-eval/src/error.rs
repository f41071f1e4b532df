//! Error types for the evaluation crate.

use thiserror::Error;

/// Errors produced by the divergence estimator.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum EvalError {
    /// The generated sample must contain at least two points.
    #[error("first sample has {0} points, need at least 2")]
    SampleTooSmall(usize),

    /// The reference sample is empty.
    #[error("second sample is empty")]
    EmptyReference,

    /// Both samples must live in the same space.
    #[error("samples have mismatched dimensions: {left} vs {right}")]
    DimensionMismatch {
        /// Columns of the first sample.
        left: usize,
        /// Columns of the second sample.
        right: usize,
    },

    /// A zero nearest-neighbour distance or a zero neighbour count makes
    /// the digamma term undefined.  Surfaced rather than clamped: the
    /// caller (checkpoint selection) skips the evaluation round.
    #[error("degenerate neighbourhood at sample index {index} (duplicate point or zero count)")]
    DegenerateNeighborhood {
        /// Index into the first sample.
        index: usize,
    },
}

/// Result type for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;
