//! Type-erased array with a runtime element size.
//!
//! [`ByteArray`] is for callers that only know the element size at runtime,
//! mainly the C ABI in `vasa-ffi`. Elements go in and come out as byte
//! slices of exactly [`element_size`](ByteArray::element_size) bytes and are
//! copied verbatim.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::ptr;

use crate::alloc::{AllocStrategy, System};
use crate::config::ArrayConfig;
use crate::error::{ArrayError, ConfigError};
use crate::raw::{RawArray, Released};
use crate::stats::ArrayStats;

/// A growable, bounded, contiguous array of opaque fixed-size elements.
pub struct ByteArray<A: AllocStrategy = System> {
    raw: RawArray<A>,
    element_size: usize,
}

impl ByteArray {
    /// Default element alignment, matching what `malloc` guarantees for
    /// scalar types on 64-bit targets.
    pub const DEFAULT_ALIGN: usize = 8;

    /// Create an array of `element_size`-byte elements with the default
    /// config on the system allocator.
    pub fn new(element_size: usize) -> Result<Self, ArrayError> {
        Self::with_config_in(element_size, ArrayConfig::default(), System)
    }
}

impl<A: AllocStrategy> ByteArray<A> {
    /// Create an array with `config`, drawing storage from `alloc`.
    ///
    /// Elements are aligned to [`ByteArray::DEFAULT_ALIGN`].
    pub fn with_config_in(
        element_size: usize,
        config: ArrayConfig,
        alloc: A,
    ) -> Result<Self, ArrayError> {
        Self::with_layout_in(element_size, ByteArray::<System>::DEFAULT_ALIGN, config, alloc)
    }

    /// Create an array whose slots are aligned to `element_align`.
    ///
    /// The slot stride is `element_size` rounded up to `element_align`.
    pub fn with_layout_in(
        element_size: usize,
        element_align: usize,
        config: ArrayConfig,
        alloc: A,
    ) -> Result<Self, ArrayError> {
        if element_size == 0 {
            return Err(ArrayError::ZeroSizedElement);
        }
        if !element_align.is_power_of_two() {
            return Err(ArrayError::Config(ConfigError::InvalidAlignment {
                align: element_align,
            }));
        }
        // With a valid alignment the only failure left is a padded size
        // past isize::MAX, which no capacity could hold.
        let slot = Layout::from_size_align(element_size, element_align).map_err(|_| {
            ArrayError::CapacityExceeded {
                max_capacity: config.max_capacity,
            }
        })?;
        Ok(Self {
            raw: RawArray::new(slot, config, alloc)?,
            element_size,
        })
    }

    /// Release storage and consume the array.
    pub fn deinit(self) -> Released {
        self.raw.release()
    }

    /// Append one element.
    pub fn append(&mut self, item: &[u8]) -> Result<(), ArrayError> {
        let len = self.raw.len();
        self.insert(len, item)
    }

    /// Insert one element at `index`, shifting later elements right.
    pub fn insert(&mut self, index: usize, item: &[u8]) -> Result<(), ArrayError> {
        self.check_size(item.len())?;
        self.raw.insert_with(index, |dst| {
            // SAFETY: dst is a vacated slot of at least element_size bytes;
            // item is a separate borrow of exactly element_size bytes.
            unsafe { ptr::copy_nonoverlapping(item.as_ptr(), dst, item.len()) }
        })
    }

    /// Remove the element at `index`, shifting later elements left.
    pub fn remove(&mut self, index: usize) -> Result<(), ArrayError> {
        self.raw.remove_with(index, |_| ())
    }

    /// Remove the element at `index`, copying its bytes into `out` first.
    ///
    /// `out` must be exactly `element_size` bytes.
    pub fn remove_into(&mut self, index: usize, out: &mut [u8]) -> Result<(), ArrayError> {
        self.check_size(out.len())?;
        self.raw.remove_with(index, |src| {
            // SAFETY: src is a live slot of element_size initialised bytes.
            unsafe { ptr::copy_nonoverlapping(src, out.as_mut_ptr(), out.len()) }
        })
    }

    /// Set the length to zero, keeping storage.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Borrow the bytes of the element at `index`.
    pub fn get(&self, index: usize) -> Result<&[u8], ArrayError> {
        let ptr = self.raw.live_slot(index)?;
        // SAFETY: live slot holding element_size bytes written by
        // `insert`; borrow tied to &self.
        Ok(unsafe { std::slice::from_raw_parts(ptr, self.element_size) })
    }

    /// Mutably borrow the bytes of the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut [u8], ArrayError> {
        let ptr = self.raw.live_slot(index)?;
        // SAFETY: as for `get`, with uniqueness from &mut self.
        Ok(unsafe { std::slice::from_raw_parts_mut(ptr, self.element_size) })
    }

    /// Copy the element at `index` into `out`, which must be exactly
    /// `element_size` bytes.
    pub fn copy_into(&self, index: usize, out: &mut [u8]) -> Result<(), ArrayError> {
        self.check_size(out.len())?;
        out.copy_from_slice(self.get(index)?);
        Ok(())
    }

    /// Deep copy into freshly allocated storage of the same capacity.
    pub fn try_clone(&self) -> Result<Self, ArrayError>
    where
        A: Clone,
    {
        Ok(Self {
            raw: self.raw.try_clone()?,
            element_size: self.element_size,
        })
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Alignment of each slot.
    pub fn element_align(&self) -> usize {
        self.raw.align()
    }

    /// Distance between consecutive slots in bytes.
    pub fn stride(&self) -> usize {
        self.raw.stride()
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

    fn check_size(&self, actual: usize) -> Result<(), ArrayError> {
        if actual != self.element_size {
            return Err(ArrayError::ElementSizeMismatch {
                expected: self.element_size,
                actual,
            });
        }
        Ok(())
    }
}

impl<A: AllocStrategy> fmt::Debug for ByteArray<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteArray")
            .field("element_size", &self.element_size)
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i32) -> [u8; 4] {
        v.to_ne_bytes()
    }

    fn read_int(arr: &ByteArray, i: usize) -> i32 {
        i32::from_ne_bytes(arr.get(i).unwrap().try_into().unwrap())
    }

    #[test]
    fn header_example_sequence() {
        let mut arr = ByteArray::new(4).unwrap();
        arr.append(&int(10)).unwrap();
        arr.append(&int(20)).unwrap();
        arr.insert(1, &int(15)).unwrap();
        assert_eq!(
            (0..3).map(|i| read_int(&arr, i)).collect::<Vec<_>>(),
            vec![10, 15, 20]
        );
        arr.remove(0).unwrap();
        assert_eq!(read_int(&arr, 0), 15);
        assert_eq!(arr.len(), 2);
    }

    #[test]
    fn zero_element_size_rejected() {
        assert!(matches!(
            ByteArray::new(0),
            Err(ArrayError::ZeroSizedElement)
        ));
    }

    #[test]
    fn bad_alignment_rejected() {
        let r = ByteArray::with_layout_in(4, 3, ArrayConfig::default(), System);
        assert!(matches!(
            r,
            Err(ArrayError::Config(ConfigError::InvalidAlignment { align: 3 }))
        ));
        let zero = ByteArray::with_layout_in(4, 0, ArrayConfig::default(), System);
        assert!(matches!(
            zero,
            Err(ArrayError::Config(ConfigError::InvalidAlignment { align: 0 }))
        ));
    }

    #[test]
    fn oversized_element_is_capacity_error_not_alignment() {
        let r = ByteArray::with_layout_in(usize::MAX - 2, 8, ArrayConfig::default(), System);
        assert!(matches!(
            r,
            Err(ArrayError::CapacityExceeded { max_capacity: 4096 })
        ));
    }

    #[test]
    fn size_mismatch_rejected_without_mutation() {
        let mut arr = ByteArray::new(4).unwrap();
        assert_eq!(
            arr.append(&[1, 2, 3]),
            Err(ArrayError::ElementSizeMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert!(arr.is_empty());
    }

    #[test]
    fn odd_sizes_are_padded_to_alignment() {
        let mut arr = ByteArray::new(3).unwrap();
        assert_eq!(arr.stride(), 8);
        arr.append(&[1, 2, 3]).unwrap();
        arr.append(&[4, 5, 6]).unwrap();
        assert_eq!(arr.get(1).unwrap(), &[4, 5, 6]);
        assert_eq!(arr.memory_bytes(), 16);
    }

    #[test]
    fn byte_aligned_layout_is_dense() {
        let arr = ByteArray::with_layout_in(3, 1, ArrayConfig::default(), System).unwrap();
        assert_eq!(arr.stride(), 3);
        assert_eq!(arr.element_align(), 1);
    }

    #[test]
    fn remove_into_returns_bytes() {
        let mut arr = ByteArray::new(2).unwrap();
        arr.append(&[1, 1]).unwrap();
        arr.append(&[2, 2]).unwrap();
        let mut out = [0u8; 2];
        arr.remove_into(0, &mut out).unwrap();
        assert_eq!(out, [1, 1]);
        assert_eq!(arr.get(0).unwrap(), &[2, 2]);
    }

    #[test]
    fn copy_into_checks_index_and_size() {
        let mut arr = ByteArray::new(2).unwrap();
        arr.append(&[7, 8]).unwrap();
        let mut short = [0u8; 1];
        assert!(matches!(
            arr.copy_into(0, &mut short),
            Err(ArrayError::ElementSizeMismatch { .. })
        ));
        let mut out = [0u8; 2];
        assert_eq!(
            arr.copy_into(1, &mut out),
            Err(ArrayError::InvalidIndex { index: 1, len: 1 })
        );
        arr.copy_into(0, &mut out).unwrap();
        assert_eq!(out, [7, 8]);
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut arr = ByteArray::new(1).unwrap();
        arr.append(&[0]).unwrap();
        arr.get_mut(0).unwrap()[0] = 42;
        assert_eq!(arr.get(0).unwrap(), &[42]);
    }

    #[test]
    fn deinit_and_clone() {
        let mut arr = ByteArray::new(4).unwrap();
        arr.append(&int(1)).unwrap();
        let copy = arr.try_clone().unwrap();
        let released = arr.deinit();
        assert_eq!(released.len, 1);
        assert_eq!(read_int(&copy, 0), 1);
    }
}
