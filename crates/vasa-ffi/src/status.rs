//! C-compatible status codes.
//!
//! [`VasaStatus`] is a `repr(i32)` enum covering every error an FFI call can
//! report. Conversions from [`ArrayError`] and [`ConfigError`] are provided.

use vasa::{ArrayError, ConfigError};

/// C-compatible status code returned by all FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VasaStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid or the array was already deinitialised.
    InvalidHandle = -1,
    /// A pointer argument is null or an argument is otherwise unusable.
    InvalidArgument = -2,
    /// Index outside the valid range for the operation.
    InvalidIndex = -3,
    /// Growth would exceed the configured maximum capacity.
    CapacityExceeded = -4,
    /// The allocator could not satisfy a request.
    AllocationFailed = -5,
    /// Configuration (or element size) failed validation.
    ConfigError = -6,
    /// Element bytes did not match the array's element size.
    ElementSizeMismatch = -7,
    /// Caller-provided output buffer is too small.
    BufferTooSmall = -8,
    /// Internal error (e.g. poisoned lock after a prior panic).
    InternalError = -9,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&ArrayError> for VasaStatus {
    fn from(e: &ArrayError) -> Self {
        match e {
            ArrayError::AllocationFailed { .. } => VasaStatus::AllocationFailed,
            ArrayError::CapacityExceeded { .. } => VasaStatus::CapacityExceeded,
            ArrayError::InvalidIndex { .. } => VasaStatus::InvalidIndex,
            ArrayError::ZeroSizedElement => VasaStatus::ConfigError,
            ArrayError::ElementSizeMismatch { .. } => VasaStatus::ElementSizeMismatch,
            ArrayError::Config(e) => VasaStatus::from(e),
        }
    }
}

impl From<&ConfigError> for VasaStatus {
    fn from(_e: &ConfigError) -> Self {
        VasaStatus::ConfigError
    }
}

impl From<Result<(), ArrayError>> for VasaStatus {
    fn from(r: Result<(), ArrayError>) -> Self {
        match r {
            Ok(()) => VasaStatus::Ok,
            Err(e) => VasaStatus::from(&e),
        }
    }
}
