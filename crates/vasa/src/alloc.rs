//! Swappable allocation strategies.
//!
//! Arrays obtain, resize, and release their storage through an
//! [`AllocStrategy`]. [`System`] forwards to the global allocator; tests and
//! FFI hosts substitute their own.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;

/// Source of backing memory for an array.
///
/// Failure is reported as `None`; a strategy never panics or aborts on
/// exhaustion.
///
/// # Safety
///
/// Implementors must return blocks that are valid for reads and writes of
/// `layout.size()` bytes and aligned to `layout.align()`, and must not
/// hand out a block that overlaps another live block. On a failed
/// `reallocate` the original block must remain valid and unchanged.
pub unsafe trait AllocStrategy {
    /// Allocate a block for `layout`. `layout.size()` is never zero.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Resize a block, preserving the first `min(old.size(), new.size())`
    /// bytes. `old` and `new` share an alignment.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this strategy for layout `old` and
    /// not yet released.
    unsafe fn reallocate(&self, ptr: NonNull<u8>, old: Layout, new: Layout)
        -> Option<NonNull<u8>>;

    /// Release a block.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this strategy for `layout` and not
    /// yet released.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide allocator (`std::alloc`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct System;

// SAFETY: forwards to the global allocator, which upholds the contract.
unsafe impl AllocStrategy for System {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() > 0);
        // SAFETY: layout has non-zero size (checked by every caller).
        NonNull::new(unsafe { std::alloc::alloc(layout) })
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Option<NonNull<u8>> {
        debug_assert_eq!(old.align(), new.align());
        // SAFETY: caller guarantees ptr/old came from `allocate`; new.size()
        // is non-zero and was produced by a valid Layout.
        NonNull::new(unsafe { std::alloc::realloc(ptr.as_ptr(), old, new.size()) })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees ptr/layout came from `allocate`.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

// SAFETY: a shared reference delegates to the referent.
unsafe impl<A: AllocStrategy + ?Sized> AllocStrategy for &A {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).allocate(layout)
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Option<NonNull<u8>> {
        // SAFETY: forwarded caller contract.
        unsafe { (**self).reallocate(ptr, old, new) }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}
