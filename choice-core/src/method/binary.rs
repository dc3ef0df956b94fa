//! Binary method: binary search over the running totals of the positive weights.
//!
//! `calculate` builds two parallel arrays over the positive weights only:
//! the cumulative sums and the original index of each entry. Zero, negative
//! and non-finite weights never appear in either array, so they cannot be
//! selected.

use crate::buffer::PooledBuffer;
use crate::error::SelectorError;

use super::{is_selectable, WeightedSelectMethod};

#[derive(Debug, Clone, Default)]
pub struct BinaryMethod {
    running_totals: PooledBuffer<f64>,
    indices: PooledBuffer<usize>,
}

impl BinaryMethod {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative sums over the positive weights.
    pub fn running_totals(&self) -> &[f64] {
        &self.running_totals
    }
}

impl WeightedSelectMethod for BinaryMethod {
    fn name(&self) -> &str {
        "binary"
    }

    fn calculate(&mut self, weights: &[f64]) -> Result<(), SelectorError> {
        let mut running_totals = PooledBuffer::with_capacity(weights.len());
        let mut indices = PooledBuffer::with_capacity(weights.len());
        let mut sum = 0.0;
        for (i, &weight) in weights.iter().enumerate() {
            if !is_selectable(weight) {
                continue;
            }
            sum += weight;
            running_totals.push(sum);
            indices.push(i);
        }

        // The old buffers go back to the pool on drop.
        self.running_totals = running_totals;
        self.indices = indices;
        Ok(())
    }

    fn select_index(&self, _weights: &[f64], value: f64) -> Option<usize> {
        let total = *self.running_totals.last()?;
        let target = value * total;
        // First running total >= target.
        let position = self
            .running_totals
            .partition_point(|&running| running < target)
            .min(self.running_totals.len() - 1);
        self.indices.get(position).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculated(weights: &[f64]) -> BinaryMethod {
        let mut method = BinaryMethod::new();
        method.calculate(weights).unwrap();
        method
    }

    #[test]
    fn running_totals_skip_non_positive() {
        let method = calculated(&[0.0, 5.0, -1.0, 5.0]);
        assert_eq!(method.running_totals(), &[5.0, 10.0]);
        assert_eq!(method.indices.as_slice(), &[1, 3]);
    }

    #[test]
    fn selects_first_total_at_or_above_target() {
        let weights = [1.0, 2.0, 3.0];
        let method = calculated(&weights);
        assert_eq!(method.select_index(&weights, 0.0), Some(0));
        assert_eq!(method.select_index(&weights, 0.1), Some(0));
        // exact hit on running total 3
        assert_eq!(method.select_index(&weights, 0.5), Some(1));
        assert_eq!(method.select_index(&weights, 0.51), Some(2));
        assert_eq!(method.select_index(&weights, 1.0), Some(2));
    }

    #[test]
    fn maps_back_to_original_indices() {
        let weights = [0.0, 5.0, -1.0, 5.0];
        let method = calculated(&weights);
        assert_eq!(method.select_index(&weights, 0.0), Some(1));
        assert_eq!(method.select_index(&weights, 0.3), Some(1));
        assert_eq!(method.select_index(&weights, 0.7), Some(3));
        assert_eq!(method.select_index(&weights, 1.0), Some(3));
    }

    #[test]
    fn non_finite_weights_stay_out_of_running_totals() {
        let weights = [1.0, f64::NAN, 1.0, f64::INFINITY, f64::NEG_INFINITY];
        let method = calculated(&weights);
        assert_eq!(method.running_totals(), &[1.0, 2.0]);
        assert_eq!(method.select_index(&weights, 0.25), Some(0));
        assert_eq!(method.select_index(&weights, 0.75), Some(2));
    }

    #[test]
    fn no_positive_weight_selects_nothing() {
        let weights = [0.0, 0.0];
        let method = calculated(&weights);
        assert_eq!(method.select_index(&weights, 0.5), None);
    }

    #[test]
    fn recalculate_replaces_state() {
        let mut method = calculated(&[1.0, 1.0, 1.0]);
        method.calculate(&[4.0]).unwrap();
        assert_eq!(method.running_totals(), &[4.0]);
        assert_eq!(method.select_index(&[4.0], 0.9), Some(0));
    }
}
