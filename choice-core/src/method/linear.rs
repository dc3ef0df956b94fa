//! Linear method: walk the weights, subtracting each from the target distance.
//!
//! `calculate` only stores the total of the selectable weights. A query scales
//! the value by that total and returns the first index where the remaining
//! distance reaches zero.

use crate::error::SelectorError;

use super::{is_selectable, positive_sum, WeightedSelectMethod};

#[derive(Debug, Clone, Default)]
pub struct LinearMethod {
    total: f64,
}

impl LinearMethod {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total of the positive weights seen by the last `calculate`.
    pub fn total(&self) -> f64 {
        self.total
    }
}

impl WeightedSelectMethod for LinearMethod {
    fn name(&self) -> &str {
        "linear"
    }

    fn calculate(&mut self, weights: &[f64]) -> Result<(), SelectorError> {
        self.total = positive_sum(weights);
        Ok(())
    }

    fn select_index(&self, weights: &[f64], value: f64) -> Option<usize> {
        let mut remaining = value * self.total;
        let mut last_positive = None;
        for (i, &weight) in weights.iter().enumerate() {
            if !is_selectable(weight) {
                continue;
            }
            remaining -= weight;
            if remaining <= 0.0 {
                return Some(i);
            }
            last_positive = Some(i);
        }
        // Rounding residual at value ~= 1 belongs to the last positive entry.
        last_positive
    }
}
