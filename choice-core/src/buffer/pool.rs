//! Thread-local pool of backing vectors, stratified by capacity class.
//!
//! Each element type gets its own pool, keyed by `TypeId`. A vector is parked
//! in the class `floor(log2(capacity))` and handed out for any request whose
//! `ceil(log2(len))` matches, so a pooled vector always satisfies the request.
//!
//! Vectors are cleared *before* the pool is borrowed, which keeps element
//! destructors that themselves release buffers from re-entering the pool.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;

/// Keep at most this many vectors per capacity class.
const MAX_POOLED_PER_CLASS: usize = 8;

/// Vectors above `2^MAX_CLASS` elements are never pooled.
const MAX_CLASS: u32 = 24;

struct TypedPool<T> {
    classes: Vec<Vec<Vec<T>>>,
}

impl<T> TypedPool<T> {
    fn new() -> Self {
        Self {
            classes: (0..=MAX_CLASS).map(|_| Vec::new()).collect(),
        }
    }

    fn take(&mut self, class: u32) -> Option<Vec<T>> {
        self.classes.get_mut(class as usize)?.pop()
    }

    fn park(&mut self, vec: Vec<T>, class: u32) {
        if let Some(slot) = self.classes.get_mut(class as usize) {
            if slot.len() < MAX_POOLED_PER_CLASS {
                slot.push(vec);
            }
        }
    }

    fn pooled(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }
}

thread_local! {
    static POOLS: RefCell<HashMap<TypeId, Box<dyn Any>>> = RefCell::new(HashMap::new());
}

fn with_pool<T: 'static, R>(f: impl FnOnce(&mut TypedPool<T>) -> R) -> Option<R> {
    POOLS
        .try_with(|pools| {
            let mut pools = pools.try_borrow_mut().ok()?;
            let entry = pools
                .entry(TypeId::of::<T>())
                .or_insert_with(|| Box::new(TypedPool::<T>::new()));
            entry.downcast_mut::<TypedPool<T>>().map(f)
        })
        .ok()
        .flatten()
}

/// Smallest class whose vectors hold at least `capacity` elements.
fn request_class(capacity: usize) -> u32 {
    capacity.next_power_of_two().trailing_zeros()
}

/// Class a vector of this capacity can serve.
fn parking_class(capacity: usize) -> u32 {
    usize::BITS - 1 - capacity.leading_zeros()
}

/// Acquire an empty vector with room for at least `capacity` elements.
pub fn acquire<T: 'static>(capacity: usize) -> Vec<T> {
    if capacity == 0 {
        return Vec::new();
    }
    let class = request_class(capacity);
    if class > MAX_CLASS {
        return Vec::with_capacity(capacity);
    }
    with_pool::<T, _>(|pool| pool.take(class))
        .flatten()
        .unwrap_or_else(|| Vec::with_capacity(1 << class))
}

/// Return a vector to the pool. Its elements are dropped first.
pub fn release<T: 'static>(mut vec: Vec<T>) {
    vec.clear();
    let capacity = vec.capacity();
    if capacity == 0 {
        return;
    }
    let class = parking_class(capacity);
    if class > MAX_CLASS {
        return;
    }
    with_pool::<T, _>(move |pool| pool.park(vec, class));
}

/// Snapshot of the current thread's pool for one element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Vectors parked and ready for reuse.
    pub pooled: usize,
}

pub fn stats<T: 'static>() -> PoolStats {
    PoolStats {
        pooled: with_pool::<T, _>(|pool| pool.pooled()).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_satisfies_requested_capacity() {
        for cap in [1, 3, 4, 5, 100, 1000] {
            let vec = acquire::<u64>(cap);
            assert!(vec.capacity() >= cap);
            assert!(vec.is_empty());
        }
    }

    #[test]
    fn released_vector_is_reused() {
        let vec = acquire::<u16>(100);
        let ptr = vec.as_ptr();
        release(vec);
        assert_eq!(stats::<u16>().pooled, 1);

        let again = acquire::<u16>(90);
        assert_eq!(again.as_ptr(), ptr);
        assert_eq!(stats::<u16>().pooled, 0);
    }

    #[test]
    fn smaller_class_is_not_handed_out_for_larger_request() {
        release(acquire::<i32>(8));
        let big = acquire::<i32>(64);
        assert!(big.capacity() >= 64);
        // The small one is still parked.
        assert_eq!(stats::<i32>().pooled, 1);
    }

    #[test]
    fn pools_are_separate_per_type() {
        release(acquire::<u8>(16));
        assert_eq!(stats::<u8>().pooled, 1);
        assert_eq!(stats::<i8>().pooled, 0);
    }

    #[test]
    fn class_size_is_capped() {
        for _ in 0..(MAX_POOLED_PER_CLASS + 5) {
            release(Vec::<u32>::with_capacity(32));
        }
        assert_eq!(stats::<u32>().pooled, MAX_POOLED_PER_CLASS);
    }

    #[test]
    fn zero_capacity_is_not_pooled() {
        release(Vec::<f32>::new());
        assert_eq!(stats::<f32>().pooled, 0);
        assert_eq!(acquire::<f32>(0).capacity(), 0);
    }

    #[test]
    fn release_drops_elements() {
        use std::rc::Rc;
        let shared = Rc::new(());
        let mut vec = acquire::<Rc<()>>(4);
        vec.push(Rc::clone(&shared));
        vec.push(Rc::clone(&shared));
        assert_eq!(Rc::strong_count(&shared), 3);
        release(vec);
        assert_eq!(Rc::strong_count(&shared), 1);
    }
}
