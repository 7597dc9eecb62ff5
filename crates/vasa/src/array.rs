//! The typed growable array.
//!
//! [`DynamicArray`] stores `Copy` elements contiguously and grows
//! geometrically up to a configured ceiling. Elements are moved as plain
//! bytes; there are no destructors to run and no deep copies to make.
//!
//! References returned by [`get`](DynamicArray::get) borrow the array, so
//! any call that could reallocate (`append`, `insert`, `remove`, `clear`,
//! `deinit`) is rejected by the borrow checker while they are alive.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;

use crate::alloc::{AllocStrategy, System};
use crate::config::ArrayConfig;
use crate::error::ArrayError;
use crate::raw::{RawArray, Released};
use crate::stats::ArrayStats;

/// A growable, bounded, contiguous array of `T`.
///
/// Not `Clone`: storage is exclusively owned. Use
/// [`try_clone`](Self::try_clone) for an explicit deep copy. `Send` when
/// `T` and `A` are; never `Sync`.
pub struct DynamicArray<T: Copy, A: AllocStrategy = System> {
    raw: RawArray<A>,
    _marker: PhantomData<T>,
}

impl<T: Copy> DynamicArray<T> {
    /// Create an array with the default config (capacity 1, ceiling 4096,
    /// doubling growth) on the system allocator.
    pub fn new() -> Result<Self, ArrayError> {
        Self::with_config(ArrayConfig::default())
    }

    /// Create an array with `config` on the system allocator.
    pub fn with_config(config: ArrayConfig) -> Result<Self, ArrayError> {
        Self::with_config_in(config, System)
    }
}

impl<T: Copy, A: AllocStrategy> DynamicArray<T, A> {
    /// Create an array with `config`, drawing storage from `alloc`.
    ///
    /// Fails with [`ArrayError::ZeroSizedElement`] for zero-sized `T`,
    /// [`ArrayError::Config`] for an invalid config, and
    /// [`ArrayError::AllocationFailed`] if the initial block cannot be
    /// obtained.
    pub fn with_config_in(config: ArrayConfig, alloc: A) -> Result<Self, ArrayError> {
        Ok(Self {
            raw: RawArray::new(Layout::new::<T>(), config, alloc)?,
            _marker: PhantomData,
        })
    }

    /// Release storage and consume the array.
    ///
    /// Dropping the array has the same effect; this form reports what was
    /// released.
    pub fn deinit(self) -> Released {
        self.raw.release()
    }

    /// Append `item` at the end, growing first if full.
    pub fn append(&mut self, item: T) -> Result<(), ArrayError> {
        let len = self.raw.len();
        self.insert(len, item)
    }

    /// Insert `item` at `index`, shifting later elements right.
    ///
    /// `index == len()` appends. On any error the array is unchanged.
    pub fn insert(&mut self, index: usize, item: T) -> Result<(), ArrayError> {
        self.raw.insert_with(index, |dst| {
            // SAFETY: dst is a freshly vacated, T-aligned slot of
            // size_of::<T>() bytes.
            unsafe { dst.cast::<T>().write(item) }
        })
    }

    /// Remove and return the element at `index`, shifting later elements
    /// left. Capacity is never reduced.
    pub fn remove(&mut self, index: usize) -> Result<T, ArrayError> {
        self.raw.remove_with(index, |src| {
            // SAFETY: src is a live, T-aligned slot holding a T.
            unsafe { src.cast::<T>().read() }
        })
    }

    /// Set the length to zero, keeping storage.
    ///
    /// Without [`ArrayConfig::scrub_released`] the old element bytes stay in
    /// memory until overwritten.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Borrow the element at `index`.
    pub fn get(&self, index: usize) -> Result<&T, ArrayError> {
        let ptr = self.raw.live_slot(index)?;
        // SAFETY: live slot, T-aligned, initialised; the borrow is tied to
        // &self so no reallocation can happen while it is held.
        Ok(unsafe { &*ptr.cast::<T>() })
    }

    /// Mutably borrow the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, ArrayError> {
        let ptr = self.raw.live_slot(index)?;
        // SAFETY: as for `get`, and &mut self guarantees uniqueness.
        Ok(unsafe { &mut *ptr.cast::<T>() })
    }

    /// Copy out the element at `index`.
    pub fn get_copied(&self, index: usize) -> Result<T, ArrayError> {
        self.get(index).copied()
    }

    /// Deep copy into freshly allocated storage of the same capacity.
    pub fn try_clone(&self) -> Result<Self, ArrayError>
    where
        A: Clone,
    {
        Ok(Self {
            raw: self.raw.try_clone()?,
            _marker: PhantomData,
        })
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Number of slots allocated.
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// The configured capacity ceiling.
    pub fn max_capacity(&self) -> usize {
        self.raw.config().max_capacity
    }

    /// The config this array was built with.
    pub fn config(&self) -> &ArrayConfig {
        self.raw.config()
    }

    /// The allocation strategy backing this array.
    pub fn allocator(&self) -> &A {
        self.raw.allocator()
    }

    /// Growth counters since construction.
    pub fn stats(&self) -> ArrayStats {
        self.raw.stats()
    }

    /// Bytes of backing storage currently held.
    pub fn memory_bytes(&self) -> usize {
        self.raw.memory_bytes()
    }
}

impl<T: Copy + fmt::Debug, A: AllocStrategy> fmt::Debug for DynamicArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for i in 0..self.len() {
            if let Ok(item) = self.get(i) {
                list.entry(item);
            }
        }
        list.finish()
    }
}
