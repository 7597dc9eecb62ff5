//! Shared storage for the typed and type-erased arrays.
//!
//! [`RawArray`] owns one contiguous block of `capacity` slots, each
//! `slot.size()` bytes wide and aligned to `slot.align()`. It knows nothing
//! about element types: front ends read and write slots through raw
//! pointers obtained from [`RawArray::slot_ptr`]. Every structural change
//! (growth, gap opening/closing, scrubbing, release) happens here.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::{self, NonNull};
use std::slice;

use zeroize::Zeroize;

use crate::alloc::AllocStrategy;
use crate::config::ArrayConfig;
use crate::error::ArrayError;
use crate::stats::ArrayStats;

/// Summary of the storage returned by `deinit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Released {
    /// Live elements at the time of release.
    pub len: usize,
    /// Slots that were allocated.
    pub capacity: usize,
    /// Bytes returned to the allocation strategy.
    pub bytes: usize,
}

pub(crate) struct RawArray<A: AllocStrategy> {
    ptr: NonNull<u8>,
    /// Per-slot layout; `size()` is the stride and a multiple of `align()`.
    slot: Layout,
    len: usize,
    capacity: usize,
    config: ArrayConfig,
    stats: ArrayStats,
    alloc: A,
}

// SAFETY: the block is exclusively owned; moving the owner moves the only
// access path. Sharing (`Sync`) is deliberately not implemented.
unsafe impl<A: AllocStrategy + Send> Send for RawArray<A> {}

impl<A: AllocStrategy> RawArray<A> {
    /// Allocate `config.initial_capacity` slots of `slot`.
    pub(crate) fn new(slot: Layout, config: ArrayConfig, alloc: A) -> Result<Self, ArrayError> {
        if slot.size() == 0 {
            return Err(ArrayError::ZeroSizedElement);
        }
        config.validate()?;
        let slot = slot.pad_to_align();
        let capacity = config.initial_capacity;
        let layout = block_layout(slot, capacity, config.max_capacity)?;
        let ptr = alloc.allocate(layout).ok_or(ArrayError::AllocationFailed {
            requested_bytes: layout.size(),
        })?;
        Ok(Self {
            ptr,
            slot,
            len: 0,
            capacity,
            config,
            stats: ArrayStats::default(),
            alloc,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn stride(&self) -> usize {
        self.slot.size()
    }

    pub(crate) fn align(&self) -> usize {
        self.slot.align()
    }

    pub(crate) fn config(&self) -> &ArrayConfig {
        &self.config
    }

    pub(crate) fn stats(&self) -> ArrayStats {
        self.stats
    }

    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    pub(crate) fn memory_bytes(&self) -> usize {
        self.capacity * self.slot.size()
    }

    /// Pointer to the start of slot `index`.
    ///
    /// `index` may equal `capacity` (one-past-the-end).
    pub(crate) fn slot_ptr(&self, index: usize) -> *mut u8 {
        debug_assert!(index <= self.capacity);
        // SAFETY: index <= capacity, so the offset stays within (or one past)
        // the allocated block, whose size fits in isize.
        unsafe { self.ptr.as_ptr().add(index * self.slot.size()) }
    }

    /// Pointer to a live slot, or `InvalidIndex`.
    pub(crate) fn live_slot(&self, index: usize) -> Result<*mut u8, ArrayError> {
        if index >= self.len {
            return Err(ArrayError::InvalidIndex {
                index,
                len: self.len,
            });
        }
        Ok(self.slot_ptr(index))
    }

    /// Insert one element at `index`, shifting the tail right.
    ///
    /// `write` receives a pointer to the freed slot and must initialise
    /// `stride()` bytes there. Index and growth are checked first; on
    /// failure nothing moves.
    pub(crate) fn insert_with(
        &mut self,
        index: usize,
        write: impl FnOnce(*mut u8),
    ) -> Result<(), ArrayError> {
        if index > self.len {
            return Err(ArrayError::InvalidIndex {
                index,
                len: self.len,
            });
        }
        self.reserve_one()?;
        let tail = self.len - index;
        if tail > 0 {
            // SAFETY: len < capacity after reserve_one, so slots
            // [index, len] are in bounds; ptr::copy handles the overlap.
            unsafe {
                ptr::copy(
                    self.slot_ptr(index),
                    self.slot_ptr(index + 1),
                    tail * self.slot.size(),
                );
            }
        }
        write(self.slot_ptr(index));
        self.len += 1;
        self.stats.observe_len(self.len);
        Ok(())
    }

    /// Remove the element at `index`, shifting the tail left.
    ///
    /// `read` sees the slot before it is overwritten.
    pub(crate) fn remove_with<R>(
        &mut self,
        index: usize,
        read: impl FnOnce(*const u8) -> R,
    ) -> Result<R, ArrayError> {
        let src = self.live_slot(index)?;
        let out = read(src);
        let tail = self.len - index - 1;
        if tail > 0 {
            // SAFETY: slots [index, len) are live and in bounds; ptr::copy
            // handles the overlap.
            unsafe {
                ptr::copy(
                    self.slot_ptr(index + 1),
                    self.slot_ptr(index),
                    tail * self.slot.size(),
                );
            }
        }
        self.len -= 1;
        if self.config.scrub_released {
            self.scrub(self.len, 1);
        }
        Ok(out)
    }

    /// Drop the logical contents; storage is kept.
    pub(crate) fn clear(&mut self) {
        if self.config.scrub_released {
            self.scrub(0, self.len);
        }
        self.len = 0;
    }

    /// Deep copy into a fresh block of the same capacity.
    pub(crate) fn try_clone(&self) -> Result<Self, ArrayError>
    where
        A: Clone,
    {
        let config = self.config.clone().with_initial_capacity(self.capacity);
        let mut copy = Self::new(self.slot, config, self.alloc.clone())?;
        // SAFETY: both blocks hold at least `len` slots of the same stride
        // and are distinct allocations.
        unsafe {
            ptr::copy_nonoverlapping(
                self.ptr.as_ptr(),
                copy.ptr.as_ptr(),
                self.len * self.slot.size(),
            );
        }
        copy.len = self.len;
        copy.config.initial_capacity = self.config.initial_capacity;
        copy.stats.observe_len(copy.len);
        Ok(copy)
    }

    /// Release storage, reporting what was freed.
    pub(crate) fn release(self) -> Released {
        let released = Released {
            len: self.len,
            capacity: self.capacity,
            bytes: self.memory_bytes(),
        };
        tracing::trace!(
            target: "vasa::lifecycle",
            len = released.len,
            capacity = released.capacity,
            bytes = released.bytes,
            "array released"
        );
        drop(self);
        released
    }

    /// Make room for one more element, growing if the array is full.
    fn reserve_one(&mut self) -> Result<(), ArrayError> {
        if self.len < self.capacity {
            return Ok(());
        }
        let max_capacity = self.config.max_capacity;
        let Some(new_capacity) = self.config.next_capacity(self.capacity) else {
            self.stats.capacity_rejections += 1;
            tracing::warn!(
                target: "vasa::growth",
                capacity = self.capacity,
                max_capacity,
                "growth rejected at capacity ceiling"
            );
            return Err(ArrayError::CapacityExceeded { max_capacity });
        };
        let new_layout = match block_layout(self.slot, new_capacity, max_capacity) {
            Ok(layout) => layout,
            Err(e) => {
                self.stats.capacity_rejections += 1;
                tracing::warn!(
                    target: "vasa::growth",
                    capacity = self.capacity,
                    new_capacity,
                    stride = self.slot.size(),
                    "growth rejected: block size overflows"
                );
                return Err(e);
            }
        };
        let old_layout = self.current_layout();

        let grown = if self.config.scrub_released {
            self.relocate(old_layout, new_layout)
        } else {
            // SAFETY: ptr was allocated by this strategy with old_layout and
            // both layouts share the slot alignment.
            unsafe { self.alloc.reallocate(self.ptr, old_layout, new_layout) }
        };
        let Some(ptr) = grown else {
            self.stats.failed_grows += 1;
            tracing::warn!(
                target: "vasa::growth",
                capacity = self.capacity,
                requested_bytes = new_layout.size(),
                "allocation strategy refused growth"
            );
            return Err(ArrayError::AllocationFailed {
                requested_bytes: new_layout.size(),
            });
        };

        tracing::debug!(
            target: "vasa::growth",
            old_capacity = self.capacity,
            new_capacity,
            bytes = new_layout.size(),
            "array grew"
        );
        self.ptr = ptr;
        self.capacity = new_capacity;
        self.stats.grow_events += 1;
        Ok(())
    }

    /// Allocate-copy-scrub-free, so no stale copy of the contents is left
    /// in a block handed back to the strategy.
    fn relocate(&mut self, old: Layout, new: Layout) -> Option<NonNull<u8>> {
        let fresh = self.alloc.allocate(new)?;
        // SAFETY: fresh holds at least `capacity` slots, the old block holds
        // `len` live slots, and the two blocks are distinct.
        unsafe {
            ptr::copy_nonoverlapping(
                self.ptr.as_ptr(),
                fresh.as_ptr(),
                self.len * self.slot.size(),
            );
        }
        self.scrub(0, self.capacity);
        // SAFETY: ptr/old describe the current block, which is not used again.
        unsafe { self.alloc.deallocate(self.ptr, old) };
        Some(fresh)
    }

    /// Zero `count` slots starting at `start`.
    ///
    /// Volatile writes, so the wipe survives even when the block is freed
    /// right after.
    fn scrub(&mut self, start: usize, count: usize) {
        debug_assert!(start + count <= self.capacity);
        // SAFETY: the range lies within the allocated block and nothing else
        // borrows it while `&mut self` is held.
        let bytes = unsafe { slice::from_raw_parts_mut(self.slot_ptr(start), count * self.slot.size()) };
        bytes.zeroize();
    }

    fn current_layout(&self) -> Layout {
        // SAFETY: this exact size/align pair was validated when the block
        // was allocated.
        unsafe {
            Layout::from_size_align_unchecked(self.capacity * self.slot.size(), self.slot.align())
        }
    }
}

impl<A: AllocStrategy> Drop for RawArray<A> {
    fn drop(&mut self) {
        if self.config.scrub_released {
            self.scrub(0, self.capacity);
        }
        let layout = self.current_layout();
        // SAFETY: ptr was allocated by this strategy with `layout` and is
        // released exactly once.
        unsafe { self.alloc.deallocate(self.ptr, layout) };
    }
}

/// Layout of a block holding `capacity` slots.
fn block_layout(slot: Layout, capacity: usize, max_capacity: usize) -> Result<Layout, ArrayError> {
    slot.size()
        .checked_mul(capacity)
        .and_then(|bytes| Layout::from_size_align(bytes, slot.align()).ok())
        .ok_or(ArrayError::CapacityExceeded { max_capacity })
}
