//! Reusable allocation-strategy fixtures.
//!
//! - [`CountingAlloc`]: forwards to [`System`] and records every call.
//! - [`FailingAlloc`]: forwards to [`System`] until a budget of successful
//!   allocations is spent, then refuses everything.
//!
//! Both use atomics so a single fixture can be shared by reference
//! (`&CountingAlloc` is itself an [`AllocStrategy`]) and inspected while
//! arrays built on it are alive.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use vasa::{AllocStrategy, System};

/// Counts allocate/reallocate/deallocate calls and tracks live bytes.
#[derive(Debug, Default)]
pub struct CountingAlloc {
    allocations: AtomicUsize,
    reallocations: AtomicUsize,
    deallocations: AtomicUsize,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
}

impl CountingAlloc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    pub fn reallocations(&self) -> usize {
        self.reallocations.load(Ordering::Relaxed)
    }

    pub fn deallocations(&self) -> usize {
        self.deallocations.load(Ordering::Relaxed)
    }

    /// Bytes currently held by blocks from this strategy.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Relaxed)
    }

    /// Largest value `live_bytes` has reached.
    pub fn peak_bytes(&self) -> usize {
        self.peak_bytes.load(Ordering::Relaxed)
    }

    fn add_live(&self, bytes: usize) {
        let now = self.live_bytes.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.peak_bytes.fetch_max(now, Ordering::Relaxed);
    }
}

// SAFETY: every block comes from `System`.
unsafe impl AllocStrategy for CountingAlloc {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        let ptr = System.allocate(layout)?;
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.add_live(layout.size());
        Some(ptr)
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Option<NonNull<u8>> {
        // SAFETY: forwarded caller contract.
        let grown = unsafe { System.reallocate(ptr, old, new) }?;
        self.reallocations.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(old.size(), Ordering::Relaxed);
        self.add_live(new.size());
        Some(grown)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.deallocations.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(layout.size(), Ordering::Relaxed);
        // SAFETY: forwarded caller contract.
        unsafe { System.deallocate(ptr, layout) }
    }
}

/// Succeeds for the first `budget` allocate/reallocate calls, then fails.
///
/// Deallocation always succeeds.
#[derive(Debug)]
pub struct FailingAlloc {
    remaining: AtomicUsize,
    refused: AtomicUsize,
}

impl FailingAlloc {
    /// Allow `budget` successful allocations or reallocations.
    pub fn new(budget: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(budget),
            refused: AtomicUsize::new(0),
        }
    }

    /// Reset the remaining budget.
    pub fn set_budget(&self, budget: usize) {
        self.remaining.store(budget, Ordering::Relaxed);
    }

    /// Refuse every request from now on.
    pub fn fail_now(&self) {
        self.set_budget(0);
    }

    /// Number of requests refused so far.
    pub fn refused(&self) -> usize {
        self.refused.load(Ordering::Relaxed)
    }

    fn take(&self) -> bool {
        let granted = self
            .remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if !granted {
            self.refused.fetch_add(1, Ordering::Relaxed);
        }
        granted
    }
}

// SAFETY: every block comes from `System`; refusals hand out nothing.
unsafe impl AllocStrategy for FailingAlloc {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if !self.take() {
            return None;
        }
        System.allocate(layout)
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Option<NonNull<u8>> {
        if !self.take() {
            return None;
        }
        // SAFETY: forwarded caller contract.
        unsafe { System.reallocate(ptr, old, new) }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { System.deallocate(ptr, layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_tracks_live_bytes() {
        let alloc = CountingAlloc::new();
        let small = Layout::from_size_align(16, 8).unwrap();
        let large = Layout::from_size_align(64, 8).unwrap();
        let ptr = alloc.allocate(small).unwrap();
        assert_eq!(alloc.live_bytes(), 16);
        let ptr = unsafe { alloc.reallocate(ptr, small, large) }.unwrap();
        assert_eq!(alloc.live_bytes(), 64);
        unsafe { alloc.deallocate(ptr, large) };
        assert_eq!(alloc.live_bytes(), 0);
        assert_eq!(alloc.peak_bytes(), 64);
        assert_eq!(alloc.allocations(), 1);
        assert_eq!(alloc.reallocations(), 1);
        assert_eq!(alloc.deallocations(), 1);
    }

    #[test]
    fn failing_honours_budget() {
        let alloc = FailingAlloc::new(1);
        let layout = Layout::from_size_align(8, 8).unwrap();
        let ptr = alloc.allocate(layout).unwrap();
        assert!(alloc.allocate(layout).is_none());
        assert_eq!(alloc.refused(), 1);
        unsafe { alloc.deallocate(ptr, layout) };
    }

    #[test]
    fn failing_budget_can_be_reset() {
        let alloc = FailingAlloc::new(0);
        let layout = Layout::from_size_align(8, 8).unwrap();
        assert!(alloc.allocate(layout).is_none());
        alloc.set_budget(1);
        let ptr = alloc.allocate(layout).unwrap();
        unsafe { alloc.deallocate(ptr, layout) };
    }
}
