//! Alias method (Vose): O(n) setup, O(1) selection.
//!
//! The positive weights are spread over `m` equal-width buckets. Each bucket
//! keeps its own entry with some probability and hands the rest of its width
//! to one donor entry:
//!
//! ```text
//! value → r = value * m → bucket i = floor(r)
//!       → own entry if frac(r) <= keep[i], donor[i] otherwise
//! ```
//!
//! Setup pairs "small" entries (weight below the average) with "big" ones.
//! The big entry fills the small bucket's remaining width, and is then
//! reclassified by what it has left. Entries still unpaired when either side
//! runs out keep their whole bucket.
//!
//! Non-positive and non-finite weights get no bucket at all; bucket positions are mapped
//! back to original indices through a remap table.

use crate::buffer::PooledBuffer;
use crate::error::SelectorError;

use super::{is_selectable, positive_sum, WeightedSelectMethod};

/// One bucket of the alias table.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Alias {
    /// Bucket position of the donor entry.
    donor: usize,
    /// Fraction of the bucket that selects its own entry.
    keep: f64,
}

/// Bucket position tagged with its scaled probability, used during setup.
#[derive(Debug, Clone, Copy)]
struct Scaled {
    position: usize,
    probability: f64,
}

#[derive(Debug, Clone, Default)]
pub struct AliasMethod {
    table: PooledBuffer<Alias>,
    /// Bucket position → original weight index.
    indices: PooledBuffer<usize>,
}

impl AliasMethod {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buckets (positive weights) in the current table.
    pub fn bucket_count(&self) -> usize {
        self.table.len()
    }

    fn build_table(weights: &[f64], indices: &[usize]) -> PooledBuffer<Alias> {
        let size = indices.len();
        let mut table: PooledBuffer<Alias> = (0..size)
            .map(|position| Alias {
                donor: position,
                keep: 1.0,
            })
            .collect();
        if size <= 1 {
            return table;
        }

        let average = positive_sum(weights) / size as f64;
        let mut smalls = PooledBuffer::with_capacity(size);
        let mut bigs = PooledBuffer::with_capacity(size);
        for (position, &index) in indices.iter().enumerate() {
            let weight = weights[index];
            let scaled = Scaled {
                position,
                probability: weight / average,
            };
            if weight < average {
                smalls.push(scaled);
            } else {
                bigs.push(scaled);
            }
        }

        let mut next_small = 1;
        let mut next_big = 1;
        let mut small = smalls.first().copied();
        let mut big = bigs.first().copied();
        while let (Some(s), Some(b)) = (small, big) {
            table[s.position] = Alias {
                donor: b.position,
                keep: s.probability,
            };
            let remaining = Scaled {
                position: b.position,
                probability: b.probability - (1.0 - s.probability),
            };

            if remaining.probability < 1.0 {
                // The donor is now small itself and pairs next.
                small = Some(remaining);
                big = bigs.get(next_big).copied();
                next_big += 1;
            } else {
                big = Some(remaining);
                small = smalls.get(next_small).copied();
                next_small += 1;
            }
        }

        table
    }
}

impl WeightedSelectMethod for AliasMethod {
    fn name(&self) -> &str {
        "alias"
    }

    fn calculate(&mut self, weights: &[f64]) -> Result<(), SelectorError> {
        let indices: PooledBuffer<usize> = weights
            .iter()
            .enumerate()
            .filter(|&(_, &w)| is_selectable(w))
            .map(|(i, _)| i)
            .collect();
        let table = Self::build_table(weights, &indices);

        self.table = table;
        self.indices = indices;
        Ok(())
    }

    fn select_index(&self, _weights: &[f64], value: f64) -> Option<usize> {
        let size = self.table.len();
        let last = size.checked_sub(1)?;
        if value >= 1.0 {
            return self.indices.get(last).copied();
        }

        let r = value.max(0.0) * size as f64;
        let bucket = (r.floor() as usize).min(last);
        let alias = self.table[bucket];
        let position = if r - bucket as f64 > alias.keep {
            alias.donor
        } else {
            bucket
        };
        self.indices.get(position).copied()
    }
}
