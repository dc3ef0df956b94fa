//! Integer alias method: expand each weight into that many copies of its index.
//!
//! Weights are truncated to integers and must be at least 1. A query reads
//! slot `floor(len * value)` of the expanded table, so selection is a single
//! array read. Setup and memory are O(Σw), which limits this method to
//! small integer weights.

use crate::buffer::PooledBuffer;
use crate::error::SelectorError;

use super::WeightedSelectMethod;

/// Largest expanded table this method will build.
pub const MAX_EXPANDED_LEN: u64 = u32::MAX as u64;

#[derive(Debug, Clone, Default)]
pub struct IntegerAliasMethod {
    slots: PooledBuffer<u32>,
}

impl IntegerAliasMethod {
    pub fn new() -> Self {
        Self::default()
    }

    /// Length of the expanded table.
    pub fn expanded_len(&self) -> usize {
        self.slots.len()
    }

    /// Validate and total the integer weights without allocating.
    fn expanded_count(weights: &[f64]) -> Result<u64, SelectorError> {
        let mut count: u64 = 0;
        for (index, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() || weight < 1.0 {
                return Err(SelectorError::InvalidWeight { index, weight });
            }
            count = count
                .checked_add(weight as u64)
                .filter(|&c| c <= MAX_EXPANDED_LEN)
                .ok_or(SelectorError::WeightCountOverflow {
                    count: count.saturating_add(weight as u64),
                    limit: MAX_EXPANDED_LEN,
                })?;
        }
        Ok(count)
    }
}

impl WeightedSelectMethod for IntegerAliasMethod {
    fn name(&self) -> &str {
        "integer_alias"
    }

    fn calculate(&mut self, weights: &[f64]) -> Result<(), SelectorError> {
        let count = Self::expanded_count(weights)?;
        let mut slots = PooledBuffer::with_capacity(count as usize);
        for (index, &weight) in weights.iter().enumerate() {
            let copies = weight as u64;
            slots.extend(std::iter::repeat(index as u32).take(copies as usize));
        }

        self.slots = slots;
        Ok(())
    }

    fn select_index(&self, _weights: &[f64], value: f64) -> Option<usize> {
        let last = self.slots.len().checked_sub(1)?;
        let slot = if value >= 1.0 {
            last
        } else {
            ((self.slots.len() as f64 * value.max(0.0)) as usize).min(last)
        };
        Some(self.slots[slot] as usize)
    }
}
