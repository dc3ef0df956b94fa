//! Weighted selector: a mutable item → weight table bound to one selection method.
//!
//! Items and weights live in two parallel pooled buffers: index `i` of one
//! always corresponds to index `i` of the other. Every mutation reruns the
//! method's `calculate` over the full weight buffer before returning, so
//! precomputed state is never stale.
//!
//! Mutations are O(n) at minimum because of that rebuild. To apply many
//! changes, build a new selector from the final (item, weight) set instead.
//!
//! Code that should only read and select can take a
//! [`ReadOnlyWeightedSelector`], either generically or as a trait object.
//!
//! Disposal is deterministic: [`WeightedSelector::dispose`] consumes the
//! selector, and dropping it releases the same buffers. A disposed selector
//! cannot be used at all.

pub mod creation;

pub use creation::{IntoWeightedSelector, SelectorBuilder};

use std::fmt;

use rand::Rng;

use crate::buffer::PooledBuffer;
use crate::error::SelectorError;
use crate::method::{SelectMethod, SelectionStrategy, WeightedSelectMethod};

pub struct WeightedSelector<T: 'static> {
    items: PooledBuffer<T>,
    weights: PooledBuffer<f64>,
    strategy: SelectionStrategy,
}

impl<T: 'static> WeightedSelector<T> {
    /// Take ownership of prepared buffers and run the first `calculate`.
    pub(crate) fn from_buffers(
        items: PooledBuffer<T>,
        weights: PooledBuffer<f64>,
        method: SelectMethod,
    ) -> Result<Self, SelectorError> {
        debug_assert_eq!(items.len(), weights.len(), "items and weights out of step");
        let mut strategy = SelectionStrategy::from_method(method);
        strategy.calculate(&weights)?;
        Ok(Self {
            items,
            weights,
            strategy,
        })
    }

    /// Selector with no items. Selects nothing for every value.
    pub fn empty(method: SelectMethod) -> Self {
        Self {
            items: PooledBuffer::default(),
            weights: PooledBuffer::default(),
            strategy: SelectionStrategy::from_method(method),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn method(&self) -> SelectMethod {
        self.strategy.method()
    }

    /// Items in insertion order.
    pub fn keys(&self) -> &[T] {
        &self.items
    }

    /// Weights in insertion order, parallel to [`keys`](Self::keys).
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sum of the positive weights, the total a selection is scaled by.
    pub fn total_weight(&self) -> f64 {
        crate::method::positive_sum(&self.weights)
    }

    /// Lazy (item, weight) view in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            items: self.items.iter(),
            weights: self.weights.iter(),
        }
    }

    /// Pick the item for a uniform `value` in `[0, 1]`.
    ///
    /// 0 selects the first positive-weight item and 1 the last. Values outside
    /// the interval are clamped; NaN counts as 0. Returns `None` when no item
    /// has a positive weight.
    pub fn select_item(&self, value: f64) -> Option<&T> {
        let value = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
        let index = self.strategy.select_index(&self.weights, value)?;
        self.items.get(index)
    }

    /// Like [`select_item`](Self::select_item), falling back to `T::default()`.
    pub fn select_item_or_default(&self, value: f64) -> T
    where
        T: Clone + Default,
    {
        self.select_item(value).cloned().unwrap_or_default()
    }

    /// Pick an item using one uniform draw in `[0, 1)` from `rng`.
    pub fn select_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        self.select_item(rng.gen::<f64>())
    }

    /// Remove every pair and recalculate on the empty weight set.
    pub fn clear(&mut self) {
        self.items.clear();
        self.weights.clear();
        let recalculated = self.strategy.calculate(&self.weights);
        debug_assert!(recalculated.is_ok());
    }

    /// Release the buffers back to the pool. Equivalent to dropping.
    pub fn dispose(self) {
        drop(self);
    }
}

impl<T: PartialEq + 'static> WeightedSelector<T> {
    fn index_of(&self, key: &T) -> Option<usize> {
        self.items.iter().position(|item| item == key)
    }

    pub fn contains_key(&self, key: &T) -> bool {
        self.index_of(key).is_some()
    }

    pub fn try_get(&self, key: &T) -> Option<f64> {
        self.index_of(key).map(|i| self.weights[i])
    }

    /// Weight of `key`.
    pub fn get(&self, key: &T) -> Result<f64, SelectorError> {
        self.try_get(key).ok_or(SelectorError::KeyNotFound)
    }

    /// Overwrite the weight of `key` and recalculate.
    ///
    /// On a failed recalculation the previous weight is restored.
    pub fn set(&mut self, key: &T, weight: f64) -> Result<(), SelectorError> {
        let index = self.index_of(key).ok_or(SelectorError::KeyNotFound)?;
        let previous = std::mem::replace(&mut self.weights[index], weight);
        if let Err(e) = self.strategy.calculate(&self.weights) {
            self.weights[index] = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Append a new (key, weight) pair and recalculate.
    pub fn add(&mut self, key: T, weight: f64) -> Result<(), SelectorError> {
        if self.contains_key(&key) {
            return Err(SelectorError::DuplicateKey);
        }
        self.items.push(key);
        self.weights.push(weight);
        if let Err(e) = self.strategy.calculate(&self.weights) {
            self.items.remove(self.items.len() - 1);
            self.weights.remove(self.weights.len() - 1);
            return Err(e);
        }
        Ok(())
    }

    /// Remove `key`, keeping the order of the rest. Returns whether it was present.
    pub fn remove(&mut self, key: &T) -> bool {
        let Some(index) = self.index_of(key) else {
            return false;
        };
        self.items.remove(index);
        self.weights.remove(index);
        // Dropping an entry from a weight set that passed `calculate` cannot fail.
        let recalculated = self.strategy.calculate(&self.weights);
        debug_assert!(recalculated.is_ok());
        true
    }
}

/// Read and select access to a weighted selector, without mutation.
pub trait ReadOnlyWeightedSelector<T> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn keys(&self) -> &[T];

    fn weights(&self) -> &[f64];

    /// Pick the item for a uniform `value` in `[0, 1]`.
    fn select_item(&self, value: f64) -> Option<&T>;
}

impl<T: 'static> ReadOnlyWeightedSelector<T> for WeightedSelector<T> {
    fn len(&self) -> usize {
        WeightedSelector::len(self)
    }

    fn keys(&self) -> &[T] {
        WeightedSelector::keys(self)
    }

    fn weights(&self) -> &[f64] {
        WeightedSelector::weights(self)
    }

    fn select_item(&self, value: f64) -> Option<&T> {
        WeightedSelector::select_item(self, value)
    }
}

impl<T: 'static> Default for WeightedSelector<T> {
    fn default() -> Self {
        Self::empty(SelectMethod::default())
    }
}

impl<T: Clone + 'static> Clone for WeightedSelector<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            weights: self.weights.clone(),
            strategy: self.strategy.clone(),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for WeightedSelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedSelector")
            .field("method", &self.method())
            .field("entries", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Iterator over `(item, weight)` pairs in insertion order.
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    items: std::slice::Iter<'a, T>,
    weights: std::slice::Iter<'a, f64>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a T, f64);

    fn next(&mut self) -> Option<Self::Item> {
        Some((self.items.next()?, *self.weights.next()?))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T: 'static> IntoIterator for &'a WeightedSelector<T> {
    type Item = (&'a T, f64);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn abc(method: SelectMethod) -> WeightedSelector<&'static str> {
        WeightedSelector::from_pairs([("A", 1.0), ("B", 2.0), ("C", 3.0)], method).unwrap()
    }

    #[test]
    fn get_and_set() {
        let mut selector = abc(SelectMethod::Linear);
        assert_eq!(selector.get(&"B"), Ok(2.0));
        selector.set(&"B", 10.0).unwrap();
        assert_eq!(selector.get(&"B"), Ok(10.0));
        assert_eq!(selector.total_weight(), 14.0);
        // B now covers (1/14, 11/14]
        assert_eq!(selector.select_item(0.5), Some(&"B"));
    }

    #[test]
    fn missing_key_errors() {
        let mut selector = abc(SelectMethod::Binary);
        assert_eq!(selector.get(&"Z"), Err(SelectorError::KeyNotFound));
        assert_eq!(selector.set(&"Z", 1.0), Err(SelectorError::KeyNotFound));
        assert_eq!(selector.try_get(&"Z"), None);
        assert!(!selector.contains_key(&"Z"));
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut selector = abc(SelectMethod::Alias);
        assert_eq!(selector.add("A", 4.0), Err(SelectorError::DuplicateKey));
        assert_eq!(selector.len(), 3);
        selector.add("D", 4.0).unwrap();
        assert_eq!(selector.keys(), &["A", "B", "C", "D"]);
        assert_eq!(selector.select_item(1.0), Some(&"D"));
    }

    #[test]
    fn remove_keeps_order_and_recalculates() {
        let mut selector = abc(SelectMethod::Binary);
        assert!(selector.remove(&"B"));
        assert_eq!(selector.keys(), &["A", "C"]);
        assert_eq!(selector.weights(), &[1.0, 3.0]);
        assert_eq!(selector.select_item(0.5), Some(&"C"));
        assert!(!selector.remove(&"B"));
        assert_eq!(selector.len(), 2);
    }

    #[test]
    fn clear_empties_and_selects_nothing() {
        for method in SelectMethod::ALL {
            let mut selector = abc(method);
            selector.clear();
            assert!(selector.is_empty());
            assert_eq!(selector.select_item(0.5), None, "{method}");
            assert_eq!(selector.select_item_or_default(0.5), "");
        }
    }

    #[test]
    fn failed_set_rolls_back() {
        let mut selector = abc(SelectMethod::IntegerAlias);
        let err = selector.set(&"B", 0.0).unwrap_err();
        assert!(matches!(err, SelectorError::InvalidWeight { index: 1, .. }));
        assert_eq!(selector.get(&"B"), Ok(2.0));
        assert_eq!(selector.select_item(0.25), Some(&"B"));
    }

    #[test]
    fn failed_add_rolls_back() {
        let mut selector = abc(SelectMethod::IntegerAlias);
        assert!(selector.add("D", -1.0).is_err());
        assert_eq!(selector.keys(), &["A", "B", "C"]);
        assert_eq!(selector.weights(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let selector = abc(SelectMethod::Linear);
        assert_eq!(selector.select_item(-3.0), Some(&"A"));
        assert_eq!(selector.select_item(7.5), Some(&"C"));
        assert_eq!(selector.select_item(f64::NAN), Some(&"A"));
    }

    #[test]
    fn iter_is_restartable() {
        let selector = abc(SelectMethod::Linear);
        let first: Vec<_> = selector.iter().collect();
        let second: Vec<_> = (&selector).into_iter().collect();
        assert_eq!(first, vec![(&"A", 1.0), (&"B", 2.0), (&"C", 3.0)]);
        assert_eq!(first, second);
        assert_eq!(selector.iter().len(), 3);
    }

    #[test]
    fn rng_selection_follows_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        for method in SelectMethod::ALL {
            let selector = abc(method);
            let mut counts = [0usize; 3];
            for _ in 0..60_000 {
                match selector.select_with_rng(&mut rng) {
                    Some(&"A") => counts[0] += 1,
                    Some(&"B") => counts[1] += 1,
                    Some(&"C") => counts[2] += 1,
                    other => panic!("unexpected selection {other:?}"),
                }
            }
            for (count, expected) in counts.iter().zip([10_000, 20_000, 30_000]) {
                assert!(
                    count.abs_diff(expected) < 1_500,
                    "{method}: counts {counts:?}"
                );
            }
        }
    }

    #[test]
    fn dispose_returns_buffers() {
        let selector = WeightedSelector::from_pairs([(1u64, 1.0), (2, 2.0)], SelectMethod::Linear)
            .unwrap();
        selector.dispose();
        assert_eq!(crate::buffer::pool::stats::<u64>().pooled, 1);
    }

    fn first_and_last<T: Copy>(selector: &dyn ReadOnlyWeightedSelector<T>) -> Option<(T, T)> {
        Some((*selector.select_item(0.0)?, *selector.select_item(1.0)?))
    }

    #[test]
    fn read_only_view_selects_without_mutation() {
        let selector = abc(SelectMethod::Alias);
        assert_eq!(first_and_last::<&str>(&selector), Some(("A", "C")));

        let view: &dyn ReadOnlyWeightedSelector<&str> = &selector;
        assert_eq!(view.len(), 3);
        assert!(!view.is_empty());
        assert_eq!(view.keys(), &["A", "B", "C"]);
        assert_eq!(view.weights(), &[1.0, 2.0, 3.0]);

        let empty = WeightedSelector::<&str>::empty(SelectMethod::Binary);
        assert!(ReadOnlyWeightedSelector::is_empty(&empty));
        assert_eq!(first_and_last::<&str>(&empty), None);
    }

    #[test]
    fn default_is_empty_linear() {
        let selector = WeightedSelector::<String>::default();
        assert_eq!(selector.method(), SelectMethod::Linear);
        assert_eq!(selector.select_item(0.3), None);
        assert_eq!(selector.select_item_or_default(0.3), String::new());
    }
}
