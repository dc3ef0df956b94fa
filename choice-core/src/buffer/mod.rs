//! Pooled buffers: owned, resizable blocks of storage checked out from the
//! thread-local pool and returned on release.
//!
//! A [`PooledBuffer`] is move-only. Its backing vector goes back to the pool
//! exactly once: on an explicit [`PooledBuffer::release`] or on drop,
//! whichever comes first. Releasing twice is a no-op.
//!
//! Two creation modes:
//! - fixed length ([`PooledBuffer::with_len`]): every slot initialized to `T::default()`
//! - list mode ([`PooledBuffer::with_capacity`]): length 0, filled by [`PooledBuffer::push`]
//!
//! `push` past the current capacity trades the backing vector for one twice
//! as large; elements are never dropped on the floor.

pub mod pool;

use std::fmt;
use std::ops::{Deref, DerefMut};

/// Owned buffer whose backing storage is borrowed from the pool.
pub struct PooledBuffer<T: 'static> {
    storage: Option<Vec<T>>,
}

impl<T: 'static> PooledBuffer<T> {
    /// Empty buffer with room for `capacity` elements (list mode).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Some(pool::acquire(capacity)),
        }
    }

    /// Buffer of exactly `len` default-initialized elements.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut storage = pool::acquire(len);
        storage.resize_with(len, T::default);
        Self {
            storage: Some(storage),
        }
    }

    /// Copy a slice. The length is known up front, so the buffer never grows.
    pub fn from_slice(source: &[T]) -> Self
    where
        T: Clone,
    {
        let mut storage = pool::acquire(source.len());
        storage.extend_from_slice(source);
        Self {
            storage: Some(storage),
        }
    }

    /// Logical length.
    pub fn len(&self) -> usize {
        self.storage.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the backing storage. Always `>= len()`.
    pub fn capacity(&self) -> usize {
        self.storage.as_ref().map_or(0, Vec::capacity)
    }

    pub fn is_released(&self) -> bool {
        self.storage.is_none()
    }

    /// Append one element, growing the backing storage when it is full.
    ///
    /// A released buffer is revived with fresh storage from the pool.
    pub fn push(&mut self, item: T) {
        let storage = self.storage.get_or_insert_with(Vec::new);
        if storage.len() == storage.capacity() {
            let grown_capacity = (storage.capacity() * 2).max(4);
            let mut grown = pool::acquire(grown_capacity);
            grown.append(storage);
            pool::release(std::mem::replace(storage, grown));
        }
        storage.push(item);
    }

    /// Remove the element at `index`, shifting the tail left.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len();
        match self.storage.as_mut() {
            Some(storage) if index < len => storage.remove(index),
            _ => panic!("remove index {index} out of range for buffer of length {len}"),
        }
    }

    /// Drop all elements, keeping the backing storage.
    pub fn clear(&mut self) {
        if let Some(storage) = self.storage.as_mut() {
            storage.clear();
        }
    }

    /// Return the backing storage to the pool. Length drops to zero.
    pub fn release(&mut self) {
        if let Some(storage) = self.storage.take() {
            pool::release(storage);
        }
    }

    pub fn as_slice(&self) -> &[T] {
        self.storage.as_deref().unwrap_or(&[])
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.storage.as_deref_mut().unwrap_or(&mut [])
    }
}

impl<T: 'static> Default for PooledBuffer<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T: Clone + 'static> Clone for PooledBuffer<T> {
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice())
    }
}

impl<T: 'static> Drop for PooledBuffer<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: 'static> Deref for PooledBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: 'static> DerefMut for PooledBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: 'static> FromIterator<T> for PooledBuffer<T> {
    /// Copy a sequence of unknown length.
    ///
    /// Storage is sized from the iterator's lower size bound and then grows
    /// by doubling, so an exact-size source is copied without regrowth.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut buffer = Self::with_capacity(iter.size_hint().0);
        for item in iter {
            buffer.push(item);
        }
        buffer
    }
}

impl<T: 'static> Extend<T> for PooledBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for PooledBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("items", &self.as_slice())
            .finish()
    }
}
