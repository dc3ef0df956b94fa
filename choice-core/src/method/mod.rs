//! Selection methods: turn a uniform value in `[0, 1]` plus a weight set into
//! a chosen index.
//!
//! Every method follows the same two-phase contract:
//! 1. `calculate(weights)` rebuilds all precomputed state from scratch
//! 2. `select_index(weights, value)` answers queries against that state,
//!    any number of times, until the next `calculate`
//!
//! ## Variants
//!
//! - [`LinearMethod`]: running subtraction, O(1) setup, O(n) query
//! - [`BinaryMethod`]: cumulative sums, O(n) setup, O(log n) query
//! - [`AliasMethod`]: Vose's alias table, O(n) setup, O(1) query
//! - [`IntegerAliasMethod`]: expanded index table, O(Σw) setup, O(1) query
//!
//! A weight is selectable when it is positive and finite. Zero, negative,
//! NaN and infinite weights are never selected by the tolerant methods and
//! are rejected by IntegerAlias.

pub mod alias;
pub mod binary;
pub mod integer_alias;
pub mod linear;

pub use alias::AliasMethod;
pub use binary::BinaryMethod;
pub use integer_alias::IntegerAliasMethod;
pub use linear::LinearMethod;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SelectorError;

/// Trait for selection methods.
///
/// # Contract
/// - `calculate` must replace all state atomically: on error, the state from
///   the previous successful `calculate` stays in place.
/// - `select_index` must only see the weights last passed to `calculate`.
/// - `value` is expected in `[0, 1]`; 0 selects the first positive weight and
///   1 the last.
pub trait WeightedSelectMethod: Send + Sync {
    /// Human-readable name (e.g., "linear", "alias").
    fn name(&self) -> &str;

    /// Precompute whatever the method needs from `weights`.
    fn calculate(&mut self, weights: &[f64]) -> Result<(), SelectorError>;

    /// Index chosen by `value`, or `None` when nothing is selectable.
    fn select_index(&self, weights: &[f64], value: f64) -> Option<usize>;
}

/// Which selection method a collection uses. Serializable configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectMethod {
    /// Linear scan. Cheapest to rebuild; best for few selections per mutation.
    #[default]
    Linear,
    /// Binary search over cumulative weights.
    Binary,
    /// Vose's alias method. Best for high-volume sampling.
    Alias,
    /// Alias over integer weights expanded into a lookup table.
    IntegerAlias,
}

impl SelectMethod {
    pub const ALL: [SelectMethod; 4] = [
        SelectMethod::Linear,
        SelectMethod::Binary,
        SelectMethod::Alias,
        SelectMethod::IntegerAlias,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Binary => "binary",
            Self::Alias => "alias",
            Self::IntegerAlias => "integer_alias",
        }
    }

    /// True when the method accepts zero, negative and non-finite weights
    /// (and never selects them). False only for IntegerAlias, whose
    /// `calculate` rejects any weight below 1.
    pub fn tolerates_non_positive(self) -> bool {
        !matches!(self, Self::IntegerAlias)
    }
}

impl fmt::Display for SelectMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SelectMethod {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| SelectorError::UnknownMethod(s.to_string()))
    }
}

/// Runtime state of one selection method. Closed set of variants.
#[derive(Debug, Clone)]
pub enum SelectionStrategy {
    Linear(LinearMethod),
    Binary(BinaryMethod),
    Alias(AliasMethod),
    IntegerAlias(IntegerAliasMethod),
}

impl SelectionStrategy {
    /// Fresh, uncalculated strategy for `method`.
    pub fn from_method(method: SelectMethod) -> Self {
        match method {
            SelectMethod::Linear => Self::Linear(LinearMethod::new()),
            SelectMethod::Binary => Self::Binary(BinaryMethod::new()),
            SelectMethod::Alias => Self::Alias(AliasMethod::new()),
            SelectMethod::IntegerAlias => Self::IntegerAlias(IntegerAliasMethod::new()),
        }
    }

    pub fn method(&self) -> SelectMethod {
        match self {
            Self::Linear(_) => SelectMethod::Linear,
            Self::Binary(_) => SelectMethod::Binary,
            Self::Alias(_) => SelectMethod::Alias,
            Self::IntegerAlias(_) => SelectMethod::IntegerAlias,
        }
    }

    fn inner(&self) -> &dyn WeightedSelectMethod {
        match self {
            Self::Linear(m) => m,
            Self::Binary(m) => m,
            Self::Alias(m) => m,
            Self::IntegerAlias(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn WeightedSelectMethod {
        match self {
            Self::Linear(m) => m,
            Self::Binary(m) => m,
            Self::Alias(m) => m,
            Self::IntegerAlias(m) => m,
        }
    }
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        Self::from_method(SelectMethod::default())
    }
}

impl From<SelectMethod> for SelectionStrategy {
    fn from(method: SelectMethod) -> Self {
        Self::from_method(method)
    }
}

impl WeightedSelectMethod for SelectionStrategy {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn calculate(&mut self, weights: &[f64]) -> Result<(), SelectorError> {
        self.inner_mut().calculate(weights)
    }

    fn select_index(&self, weights: &[f64], value: f64) -> Option<usize> {
        self.inner().select_index(weights, value)
    }
}

/// True when `weight` takes part in selection: positive and finite.
pub(crate) fn is_selectable(weight: f64) -> bool {
    weight > 0.0 && weight.is_finite()
}

/// Sum of the selectable weights, in order.
pub(crate) fn positive_sum(weights: &[f64]) -> f64 {
    weights.iter().copied().filter(|&w| is_selectable(w)).sum()
}
