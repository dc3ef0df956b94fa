//! Choice Core: weighted random selection over a mutable item → weight table.
//!
//! The probability of picking item *i* is `weight(i) / sum(weights)`. This crate contains:
//! - Pooled buffers: owned storage borrowed from a thread-local pool
//! - Selection methods: linear scan, binary search, Vose alias, integer alias
//! - The weighted selector: parallel item/weight buffers kept in sync with one method
//!
//! The uniform value driving a selection is supplied by the caller, either
//! directly as an `f64` in `[0, 1]` or through any `rand::Rng`.
//!
//! ```
//! use choice_core::{SelectMethod, WeightedSelector};
//!
//! let selector =
//!     WeightedSelector::from_pairs([("A", 1.0), ("B", 2.0), ("C", 3.0)], SelectMethod::Alias)
//!         .unwrap();
//! assert_eq!(selector.select_item(0.0), Some(&"A"));
//! assert_eq!(selector.select_item(1.0), Some(&"C"));
//! ```

pub mod buffer;
pub mod error;
pub mod method;
pub mod selector;

pub use buffer::PooledBuffer;
pub use error::SelectorError;
pub use method::{
    AliasMethod, BinaryMethod, IntegerAliasMethod, LinearMethod, SelectMethod, SelectionStrategy,
    WeightedSelectMethod,
};
pub use selector::{
    IntoWeightedSelector, ReadOnlyWeightedSelector, SelectorBuilder, WeightedSelector,
};
