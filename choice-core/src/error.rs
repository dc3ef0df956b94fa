//! Error type shared by every selector and selection method.
//!
//! All variants are contract violations raised synchronously at the offending
//! call. Nothing is retried internally.

use thiserror::Error;

/// Errors from weighted selector construction, mutation and strategy setup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectorError {
    #[error("key not found")]
    KeyNotFound,

    #[error("key is already present")]
    DuplicateKey,

    #[error("invalid weight {weight} at index {index}: integer alias requires weights >= 1")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("expanded weight count {count} exceeds the index limit {limit}")]
    WeightCountOverflow { count: u64, limit: u64 },

    #[error("{0} is missing")]
    NullSource(&'static str),

    #[error("unknown selection method: {0}")]
    UnknownMethod(String),
}
