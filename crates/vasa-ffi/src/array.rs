//! Array lifecycle and element FFI.
//!
//! Each array lives behind its own `Arc<Mutex<..>>` so the global `ARRAYS`
//! table lock is held only for handle lookup. Elements cross the boundary
//! by copy: `append`/`insert` read exactly `element_size` bytes from the
//! caller, `get` writes exactly `element_size` bytes back.

use std::ffi::c_void;
use std::sync::{Arc, Mutex};

use vasa::{ArrayConfig, ArrayStats, ByteArray};

use crate::config::VasaArrayConfig;
use crate::handle::HandleTable;
use crate::host_alloc::{HostAlloc, VasaAllocator};
use crate::status::VasaStatus;

type ArrayArc = Arc<Mutex<ByteArray<HostAlloc>>>;

static ARRAYS: Mutex<HandleTable<ArrayArc>> = Mutex::new(HandleTable::new());

/// Growth counters for one array.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VasaArrayStats {
    /// Successful capacity increases.
    pub grow_events: u64,
    /// Growth attempts the allocator refused.
    pub failed_grows: u64,
    /// Appends/inserts rejected at the capacity ceiling.
    pub capacity_rejections: u64,
    /// Highest length observed.
    pub peak_len: usize,
}

impl From<ArrayStats> for VasaArrayStats {
    fn from(s: ArrayStats) -> Self {
        Self {
            grow_events: s.grow_events,
            failed_grows: s.failed_grows,
            capacity_rejections: s.capacity_rejections,
            peak_len: s.peak_len,
        }
    }
}

/// Clone the Arc for an array handle, briefly locking the global table.
///
/// Returns `None` if the handle is invalid or the mutex is poisoned.
fn get_array(handle: u64) -> Option<ArrayArc> {
    ARRAYS.lock().ok()?.get(handle).cloned()
}

/// Build an array and register it, writing the handle to `handle_out`.
#[allow(unsafe_code)]
fn register(
    element_size: usize,
    element_align: usize,
    config: ArrayConfig,
    alloc: HostAlloc,
    handle_out: *mut u64,
) -> i32 {
    let host = alloc.is_host();
    let array = match ByteArray::with_layout_in(element_size, element_align, config, alloc) {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!(target: "vasa::ffi", element_size, host, error = %e, "array init failed");
            return VasaStatus::from(&e) as i32;
        }
    };
    let handle = match ARRAYS.lock() {
        Ok(mut table) => table.insert(Arc::new(Mutex::new(array))),
        Err(_) => return VasaStatus::InternalError as i32,
    };
    tracing::trace!(target: "vasa::ffi", handle, element_size, host, "array registered");
    // SAFETY: handle_out checked non-null by the caller of this helper.
    unsafe { *handle_out = handle };
    VasaStatus::Ok as i32
}

/// Create an array of `element_size`-byte elements with default settings
/// (capacity 1, ceiling 4096, doubling growth, system allocator).
///
/// On success, writes the handle to `handle_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_init(element_size: usize, handle_out: *mut u64) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return VasaStatus::InvalidArgument as i32;
        }
        register(
            element_size,
            ByteArray::<vasa::System>::DEFAULT_ALIGN,
            ArrayConfig::default(),
            HostAlloc::system(),
            handle_out,
        )
    })
}

/// Create an array with explicit settings.
///
/// `config` may be null for defaults. `allocator` may be null for the
/// system allocator; otherwise its `alloc` and `free` callbacks must be
/// set, and it must stay valid until the array is deinitialised.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_init_with(
    element_size: usize,
    config: *const VasaArrayConfig,
    allocator: *const VasaAllocator,
    handle_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return VasaStatus::InvalidArgument as i32;
        }
        let settings = if config.is_null() {
            VasaArrayConfig::default()
        } else {
            // SAFETY: config is non-null and valid per caller contract.
            unsafe { *config }
        };
        let alloc = if allocator.is_null() {
            HostAlloc::system()
        } else {
            // SAFETY: allocator is non-null and valid per caller contract.
            match HostAlloc::from_host(unsafe { &*allocator }) {
                Some(a) => a,
                None => return VasaStatus::InvalidArgument as i32,
            }
        };
        let (config, align) = settings.to_rust();
        register(element_size, align, config, alloc, handle_out)
    })
}

/// Release an array's storage and invalidate its handle.
///
/// A second call with the same handle returns `InvalidHandle`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_deinit(handle: u64) -> i32 {
    ffi_guard!({
        let removed = ffi_lock!(ARRAYS).remove(handle);
        let Some(arc) = removed else {
            return VasaStatus::InvalidHandle as i32;
        };
        // Another thread may still hold a clone of the Arc mid-call; the
        // storage is then released when that call finishes.
        if let Ok(mutex) = Arc::try_unwrap(arc) {
            if let Ok(array) = mutex.into_inner() {
                let released = array.deinit();
                tracing::trace!(
                    target: "vasa::ffi",
                    handle,
                    bytes = released.bytes,
                    "array deinitialised"
                );
            }
        }
        VasaStatus::Ok as i32
    })
}

/// Append one element, reading `element_size` bytes from `item`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_append(handle: u64, item: *const c_void) -> i32 {
    ffi_guard!({
        let Some(arc) = get_array(handle) else {
            return VasaStatus::InvalidHandle as i32;
        };
        let mut array = ffi_lock!(arc);
        if item.is_null() {
            return VasaStatus::InvalidArgument as i32;
        }
        // SAFETY: item points to at least element_size readable bytes per
        // caller contract.
        let bytes = unsafe { std::slice::from_raw_parts(item.cast::<u8>(), array.element_size()) };
        VasaStatus::from(array.append(bytes)) as i32
    })
}

/// Insert one element at `index` (`0..=len`), shifting later elements right.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_insert(handle: u64, item: *const c_void, index: usize) -> i32 {
    ffi_guard!({
        let Some(arc) = get_array(handle) else {
            return VasaStatus::InvalidHandle as i32;
        };
        let mut array = ffi_lock!(arc);
        if item.is_null() {
            return VasaStatus::InvalidArgument as i32;
        }
        // SAFETY: as in vasa_array_append.
        let bytes = unsafe { std::slice::from_raw_parts(item.cast::<u8>(), array.element_size()) };
        VasaStatus::from(array.insert(index, bytes)) as i32
    })
}

/// Remove the element at `index`, shifting later elements left.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_remove(handle: u64, index: usize) -> i32 {
    ffi_guard!({
        let Some(arc) = get_array(handle) else {
            return VasaStatus::InvalidHandle as i32;
        };
        let mut array = ffi_lock!(arc);
        VasaStatus::from(array.remove(index)) as i32
    })
}

/// Drop all elements, keeping capacity.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_clear(handle: u64) -> i32 {
    ffi_guard!({
        let Some(arc) = get_array(handle) else {
            return VasaStatus::InvalidHandle as i32;
        };
        ffi_lock!(arc).clear();
        VasaStatus::Ok as i32
    })
}

/// Copy the element at `index` into `out`.
///
/// `out_len` must be at least the element size; only `element_size` bytes
/// are written.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_get(
    handle: u64,
    index: usize,
    out: *mut c_void,
    out_len: usize,
) -> i32 {
    ffi_guard!({
        let Some(arc) = get_array(handle) else {
            return VasaStatus::InvalidHandle as i32;
        };
        let array = ffi_lock!(arc);
        if out.is_null() {
            return VasaStatus::InvalidArgument as i32;
        }
        let size = array.element_size();
        if out_len < size {
            return VasaStatus::BufferTooSmall as i32;
        }
        // SAFETY: out points to at least out_len >= size writable bytes per
        // caller contract.
        let dst = unsafe { std::slice::from_raw_parts_mut(out.cast::<u8>(), size) };
        match array.copy_into(index, dst) {
            Ok(()) => VasaStatus::Ok as i32,
            Err(e) => VasaStatus::from(&e) as i32,
        }
    })
}

/// Read one `usize` property of an array into `out`.
#[allow(unsafe_code)]
fn read_usize(handle: u64, out: *mut usize, f: fn(&ByteArray<HostAlloc>) -> usize) -> i32 {
    if out.is_null() {
        return VasaStatus::InvalidArgument as i32;
    }
    let Some(arc) = get_array(handle) else {
        return VasaStatus::InvalidHandle as i32;
    };
    let value = match arc.lock() {
        Ok(array) => f(&array),
        Err(_) => return VasaStatus::InternalError as i32,
    };
    // SAFETY: out is non-null and valid per caller contract.
    unsafe { *out = value };
    VasaStatus::Ok as i32
}

/// Write the number of live elements to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_len(handle: u64, out: *mut usize) -> i32 {
    ffi_guard!({ read_usize(handle, out, ByteArray::len) })
}

/// Write the number of allocated slots to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_capacity(handle: u64, out: *mut usize) -> i32 {
    ffi_guard!({ read_usize(handle, out, ByteArray::capacity) })
}

/// Write the element size in bytes to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_element_size(handle: u64, out: *mut usize) -> i32 {
    ffi_guard!({ read_usize(handle, out, ByteArray::element_size) })
}

/// Write the array's growth counters to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_stats(handle: u64, out: *mut VasaArrayStats) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return VasaStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_array(handle) else {
            return VasaStatus::InvalidHandle as i32;
        };
        let stats = ffi_lock!(arc).stats();
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = stats.into() };
        VasaStatus::Ok as i32
    })
}

/// Deep-copy an array into a new handle with the same settings and
/// allocator.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_clone(handle: u64, handle_out: *mut u64) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return VasaStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_array(handle) else {
            return VasaStatus::InvalidHandle as i32;
        };
        let copy = match ffi_lock!(arc).try_clone() {
            Ok(c) => c,
            Err(e) => return VasaStatus::from(&e) as i32,
        };
        let new_handle = ffi_lock!(ARRAYS).insert(Arc::new(Mutex::new(copy)));
        // SAFETY: handle_out is non-null and valid per caller contract.
        unsafe { *handle_out = new_handle };
        VasaStatus::Ok as i32
    })
}

/// Write the number of arrays not yet deinitialised to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vasa_array_live_count(out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return VasaStatus::InvalidArgument as i32;
        }
        let live = ffi_lock!(ARRAYS).live();
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = live };
        VasaStatus::Ok as i32
    })
}
