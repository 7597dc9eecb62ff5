//! Host-supplied allocation callbacks.
//!
//! C callers that manage their own heap pass a [`VasaAllocator`] to
//! `vasa_array_init_with`; every block the array obtains, resizes, or
//! releases then goes through those callbacks. Without one, arrays use the
//! system allocator.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ffi::c_void;
use std::ptr::{self, NonNull};

use vasa::{AllocStrategy, System};

/// Allocate `size` bytes aligned to `align`. Return null on failure.
pub type VasaAllocFn = unsafe extern "C" fn(user_data: *mut c_void, size: usize, align: usize) -> *mut c_void;

/// Resize a block from `old_size` to `new_size` bytes, preserving the
/// prefix. Return null on failure and leave the old block intact.
pub type VasaReallocFn = unsafe extern "C" fn(
    user_data: *mut c_void,
    ptr: *mut c_void,
    old_size: usize,
    new_size: usize,
    align: usize,
) -> *mut c_void;

/// Release a block previously returned by the alloc or realloc callback.
pub type VasaFreeFn = unsafe extern "C" fn(user_data: *mut c_void, ptr: *mut c_void, size: usize, align: usize);

/// Allocation callbacks supplied by the host.
///
/// `alloc` and `free` are required. `realloc` may be null, in which case
/// growth is done as alloc + copy + free. Callbacks may be invoked from
/// whichever thread calls into the array.
///
/// The fields spell out the function types instead of using the aliases
/// above: cbindgen only lowers `Option<fn>` to a nullable C function
/// pointer when the `fn` type is written inline.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct VasaAllocator {
    /// Opaque pointer passed back to every callback.
    pub user_data: *mut c_void,
    /// Allocation callback (required). Same signature as [`VasaAllocFn`].
    pub alloc: Option<unsafe extern "C" fn(user_data: *mut c_void, size: usize, align: usize) -> *mut c_void>,
    /// Reallocation callback (optional). Same signature as [`VasaReallocFn`].
    pub realloc: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            ptr: *mut c_void,
            old_size: usize,
            new_size: usize,
            align: usize,
        ) -> *mut c_void,
    >,
    /// Release callback (required). Same signature as [`VasaFreeFn`].
    pub free: Option<unsafe extern "C" fn(user_data: *mut c_void, ptr: *mut c_void, size: usize, align: usize)>,
}

/// Callbacks after null checks.
#[derive(Clone, Copy, Debug)]
struct Callbacks {
    user_data: *mut c_void,
    alloc: VasaAllocFn,
    realloc: Option<VasaReallocFn>,
    free: VasaFreeFn,
}

/// Allocation strategy for FFI arrays: host callbacks or the system
/// allocator.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HostAlloc {
    host: Option<Callbacks>,
}

// SAFETY: the host contract on `VasaAllocator` requires the callbacks and
// `user_data` to be usable from any thread that calls into the array.
unsafe impl Send for HostAlloc {}

impl HostAlloc {
    pub(crate) fn system() -> Self {
        Self { host: None }
    }

    /// Validate host callbacks. Returns `None` if a required one is null.
    pub(crate) fn from_host(a: &VasaAllocator) -> Option<Self> {
        Some(Self {
            host: Some(Callbacks {
                user_data: a.user_data,
                alloc: a.alloc?,
                realloc: a.realloc,
                free: a.free?,
            }),
        })
    }

    pub(crate) fn is_host(&self) -> bool {
        self.host.is_some()
    }
}

impl Callbacks {
    /// Accept a host block only if it honours the requested alignment.
    /// A misaligned block is handed straight back.
    fn checked(&self, raw: *mut c_void, layout: Layout) -> Option<NonNull<u8>> {
        let ptr = NonNull::new(raw.cast::<u8>())?;
        if ptr.as_ptr() as usize % layout.align() != 0 {
            tracing::warn!(
                target: "vasa::ffi",
                align = layout.align(),
                "host allocator returned a misaligned block"
            );
            // SAFETY: the block came from this host's alloc/realloc.
            unsafe { (self.free)(self.user_data, raw, layout.size(), layout.align()) };
            return None;
        }
        Some(ptr)
    }
}

// SAFETY: host blocks are checked for null and alignment before use; the
// host is responsible for size and exclusivity per the callback contract.
unsafe impl AllocStrategy for HostAlloc {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        let Some(cb) = &self.host else {
            return System.allocate(layout);
        };
        // SAFETY: calling host code per its documented contract.
        let raw = unsafe { (cb.alloc)(cb.user_data, layout.size(), layout.align()) };
        cb.checked(raw, layout)
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Option<NonNull<u8>> {
        let Some(cb) = &self.host else {
            // SAFETY: forwarded caller contract.
            return unsafe { System.reallocate(ptr, old, new) };
        };
        match cb.realloc {
            Some(realloc) => {
                // SAFETY: ptr came from this host with `old`.
                let raw = unsafe {
                    realloc(
                        cb.user_data,
                        ptr.as_ptr().cast(),
                        old.size(),
                        new.size(),
                        new.align(),
                    )
                };
                let grown = NonNull::new(raw.cast::<u8>())?;
                if grown.as_ptr() as usize % new.align() != 0 {
                    // The old block is already gone, so there is nothing
                    // valid to fall back to.
                    tracing::error!(
                        target: "vasa::ffi",
                        align = new.align(),
                        "host realloc returned a misaligned block; aborting"
                    );
                    std::process::abort();
                }
                Some(grown)
            }
            None => {
                let fresh = self.allocate(new)?;
                // SAFETY: distinct blocks; both hold at least the copied prefix.
                unsafe {
                    ptr::copy_nonoverlapping(
                        ptr.as_ptr(),
                        fresh.as_ptr(),
                        old.size().min(new.size()),
                    );
                    (cb.free)(cb.user_data, ptr.as_ptr().cast(), old.size(), old.align());
                }
                Some(fresh)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        match &self.host {
            // SAFETY: ptr came from this host with `layout`.
            Some(cb) => unsafe {
                (cb.free)(cb.user_data, ptr.as_ptr().cast(), layout.size(), layout.align())
            },
            // SAFETY: forwarded caller contract.
            None => unsafe { System.deallocate(ptr, layout) },
        }
    }
}
