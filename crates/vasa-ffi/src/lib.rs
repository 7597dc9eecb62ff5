//! C FFI bindings for vasa growable arrays.
//!
//! Exposes the type-erased [`ByteArray`](vasa::ByteArray) through opaque
//! `u64` handles. Every entry point returns an `i32` [`VasaStatus`]
//! (`0` on success), catches panics, and copies elements in and out so no
//! pointer into array storage ever reaches the caller. This crate is one
//! of two that may contain `unsafe` code (along with `vasa`).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, converting a panic into `VasaStatus::Panicked`.
macro_rules! ffi_guard {
    ($body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(code) => code,
            Err(_) => {
                tracing::warn!(target: "vasa::ffi", "panic caught at FFI boundary");
                $crate::status::VasaStatus::Panicked as i32
            }
        }
    };
}

/// Lock a mutex inside an `ffi_guard!` body, returning
/// `VasaStatus::InternalError` if it is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::VasaStatus::InternalError as i32,
        }
    };
}

pub mod array;
pub mod config;
mod handle;
pub mod host_alloc;
pub mod status;

pub use array::VasaArrayStats;
pub use config::VasaArrayConfig;
pub use host_alloc::VasaAllocator;
pub use status::VasaStatus;
