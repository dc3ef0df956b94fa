//! Constructors: every way of turning a source into a [`WeightedSelector`].
//!
//! Sources are copied into owned pooled buffers in one pass. When the source
//! reports its length (slices, `Vec`, maps, any `ExactSizeIterator`) the
//! buffers are sized exactly; otherwise they grow by doubling.
//!
//! The chosen method's `calculate` runs once, right after the copy.

use std::fmt;

use crate::buffer::PooledBuffer;
use crate::error::SelectorError;
use crate::method::SelectMethod;

use super::WeightedSelector;

fn collect_pairs<T: 'static>(
    pairs: impl Iterator<Item = (T, f64)>,
) -> (PooledBuffer<T>, PooledBuffer<f64>) {
    let (lower, _) = pairs.size_hint();
    let mut items = PooledBuffer::with_capacity(lower);
    let mut weights = PooledBuffer::with_capacity(lower);
    for (item, weight) in pairs {
        items.push(item);
        weights.push(weight);
    }
    (items, weights)
}

impl<T: 'static> WeightedSelector<T> {
    /// Build from items and a function computing each item's weight.
    pub fn from_items<I, F>(
        source: I,
        mut weight_of: F,
        method: SelectMethod,
    ) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&T) -> f64,
    {
        let (items, weights) = collect_pairs(source.into_iter().map(|item| {
            let weight = weight_of(&item);
            (item, weight)
        }));
        Self::from_buffers(items, weights, method)
    }

    /// Build from a slice. The length is known, so nothing ever regrows.
    pub fn from_slice<F>(
        source: &[T],
        weight_of: F,
        method: SelectMethod,
    ) -> Result<Self, SelectorError>
    where
        T: Clone,
        F: FnMut(&T) -> f64,
    {
        let items = PooledBuffer::from_slice(source);
        let weights = items.iter().map(weight_of).collect();
        Self::from_buffers(items, weights, method)
    }

    /// Build from pre-paired `(item, weight)` entries.
    pub fn from_pairs<I>(source: I, method: SelectMethod) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let (items, weights) = collect_pairs(source.into_iter());
        Self::from_buffers(items, weights, method)
    }

    /// Build from an existing key → weight map (`&HashMap`, `&BTreeMap`, ...).
    ///
    /// Entries keep the map's iteration order.
    pub fn from_map<'m, M>(source: M, method: SelectMethod) -> Result<Self, SelectorError>
    where
        M: IntoIterator<Item = (&'m T, &'m f64)>,
        T: Clone,
    {
        Self::from_pairs(
            source.into_iter().map(|(key, &weight)| (key.clone(), weight)),
            method,
        )
    }

    /// Build from arbitrary records, projecting each into an item and a weight.
    pub fn from_records<S, I, FI, FW>(
        source: I,
        mut item_of: FI,
        mut weight_of: FW,
        method: SelectMethod,
    ) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = S>,
        FI: FnMut(&S) -> T,
        FW: FnMut(&S) -> f64,
    {
        Self::from_pairs(
            source
                .into_iter()
                .map(|record| (item_of(&record), weight_of(&record))),
            method,
        )
    }

    pub fn builder<'a>() -> SelectorBuilder<'a, T> {
        SelectorBuilder::new()
    }
}

impl<T: 'static> FromIterator<(T, f64)> for WeightedSelector<T> {
    /// Collect `(item, weight)` pairs into a selector using the linear method.
    fn from_iter<I: IntoIterator<Item = (T, f64)>>(iter: I) -> Self {
        let (items, weights) = collect_pairs(iter.into_iter());
        // Linear `calculate` never fails.
        Self::from_buffers(items, weights, SelectMethod::Linear).unwrap_or_default()
    }
}

/// Step-by-step construction. Source and weight selector are both required.
pub struct SelectorBuilder<'a, T> {
    items: Option<Box<dyn Iterator<Item = T> + 'a>>,
    weight_of: Option<Box<dyn FnMut(&T) -> f64 + 'a>>,
    method: SelectMethod,
}

impl<'a, T: 'static> SelectorBuilder<'a, T> {
    pub fn new() -> Self {
        Self {
            items: None,
            weight_of: None,
            method: SelectMethod::default(),
        }
    }

    pub fn items<I>(mut self, source: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        self.items = Some(Box::new(source.into_iter()));
        self
    }

    pub fn weight_selector<F>(mut self, weight_of: F) -> Self
    where
        F: FnMut(&T) -> f64 + 'a,
    {
        self.weight_of = Some(Box::new(weight_of));
        self
    }

    pub fn method(mut self, method: SelectMethod) -> Self {
        self.method = method;
        self
    }

    /// Copy the source and run the first `calculate`.
    pub fn build(self) -> Result<WeightedSelector<T>, SelectorError> {
        let items = self.items.ok_or(SelectorError::NullSource("item source"))?;
        let weight_of = self
            .weight_of
            .ok_or(SelectorError::NullSource("weight selector"))?;
        WeightedSelector::from_items(items, weight_of, self.method)
    }
}

impl<T: 'static> Default for SelectorBuilder<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SelectorBuilder<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorBuilder")
            .field("has_items", &self.items.is_some())
            .field("has_weight_selector", &self.weight_of.is_some())
            .field("method", &self.method)
            .finish()
    }
}

/// Conversion of any iterable into a selector.
pub trait IntoWeightedSelector: IntoIterator + Sized {
    fn into_weighted_selector<F>(
        self,
        weight_of: F,
        method: SelectMethod,
    ) -> Result<WeightedSelector<Self::Item>, SelectorError>
    where
        Self::Item: 'static,
        F: FnMut(&Self::Item) -> f64,
    {
        WeightedSelector::from_items(self, weight_of, method)
    }
}

impl<I: IntoIterator> IntoWeightedSelector for I {}
