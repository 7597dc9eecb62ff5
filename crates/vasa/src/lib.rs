//! Growable contiguous arrays with bounded geometric growth.
//!
//! Provides an owned, exclusively-held buffer of fixed-size elements that
//! grows by a configurable factor up to a configurable ceiling. This crate
//! is one of two that may contain `unsafe` code (along with `vasa-ffi`).
//!
//! # Architecture
//!
//! ```text
//! DynamicArray<T, A>   (typed front end, T: Copy)
//! ByteArray<A>         (type-erased front end, runtime element size)
//! └── RawArray<A>      (shared storage: pointer, slot layout, len, capacity)
//!     ├── ArrayConfig  (initial/max capacity, growth factor, scrubbing)
//!     ├── ArrayStats   (growth counters)
//!     └── A: AllocStrategy (System by default, swappable)
//! ```
//!
//! # Failure model
//!
//! Every mutating operation either completes or leaves the array exactly
//! as it was. Growth happens before any element moves; out-of-range
//! indices are reported as [`ArrayError::InvalidIndex`] rather than
//! asserted.
//!
//! ```
//! use vasa::DynamicArray;
//!
//! let mut arr = DynamicArray::<i32>::new()?;
//! arr.append(10)?;
//! arr.append(20)?;
//! arr.insert(1, 15)?;
//! assert_eq!(arr.remove(0)?, 10);
//! assert_eq!(*arr.get(0)?, 15);
//! # Ok::<(), vasa::ArrayError>(())
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod alloc;
pub mod array;
pub mod config;
pub mod erased;
pub mod error;
mod raw;
pub mod stats;

// Public re-exports for the primary API surface.
pub use alloc::{AllocStrategy, System};
pub use array::DynamicArray;
pub use config::ArrayConfig;
pub use erased::ByteArray;
pub use error::{ArrayError, ConfigError};
pub use raw::Released;
pub use stats::ArrayStats;
