//! Array error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during array operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// The allocation strategy could not satisfy a request.
    ///
    /// The array is unchanged; the previous storage is still owned.
    AllocationFailed {
        /// Size of the block that was requested, in bytes.
        requested_bytes: usize,
    },
    /// Growth would take capacity past the configured ceiling, or the
    /// resulting byte size is not representable.
    CapacityExceeded {
        /// The configured maximum capacity in elements.
        max_capacity: usize,
    },
    /// An index was outside the valid range for the operation.
    InvalidIndex {
        /// The offending index.
        index: usize,
        /// Array length at the time of the call.
        len: usize,
    },
    /// Element size is zero. Zero-sized elements have no storage to manage.
    ZeroSizedElement,
    /// A type-erased element did not match the array's element size.
    ElementSizeMismatch {
        /// The array's element size in bytes.
        expected: usize,
        /// The size of the slice that was passed.
        actual: usize,
    },
    /// The construction config failed validation.
    Config(ConfigError),
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed { requested_bytes } => {
                write!(f, "allocation failed: requested {requested_bytes} bytes")
            }
            Self::CapacityExceeded { max_capacity } => {
                write!(f, "capacity exceeded: maximum is {max_capacity} elements")
            }
            Self::InvalidIndex { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::ZeroSizedElement => write!(f, "element size must be non-zero"),
            Self::ElementSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "element size mismatch: expected {expected} bytes, got {actual}"
                )
            }
            Self::Config(e) => write!(f, "invalid array config: {e}"),
        }
    }
}

impl Error for ArrayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for ArrayError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Errors detected by [`ArrayConfig::validate()`](crate::ArrayConfig::validate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Initial capacity is zero; live arrays always own storage.
    ZeroInitialCapacity,
    /// Initial capacity is larger than the ceiling.
    InitialExceedsMax {
        /// The configured initial capacity.
        initial: usize,
        /// The configured maximum capacity.
        max: usize,
    },
    /// Growth factor below 2 would never add a slot.
    GrowthFactorTooSmall {
        /// The configured factor.
        factor: usize,
    },
    /// Element alignment is zero or not a power of two.
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroInitialCapacity => write!(f, "initial capacity must be at least 1"),
            Self::InitialExceedsMax { initial, max } => {
                write!(
                    f,
                    "initial capacity {initial} exceeds maximum capacity {max}"
                )
            }
            Self::GrowthFactorTooSmall { factor } => {
                write!(f, "growth factor must be at least 2, got {factor}")
            }
            Self::InvalidAlignment { align } => {
                write!(f, "alignment {align} is not a power of two")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_index_and_len() {
        let e = ArrayError::InvalidIndex { index: 3, len: 3 };
        assert_eq!(e.to_string(), "index 3 out of range for length 3");
    }

    #[test]
    fn capacity_and_allocation_are_distinct() {
        let cap = ArrayError::CapacityExceeded { max_capacity: 4096 };
        let oom = ArrayError::AllocationFailed {
            requested_bytes: 64,
        };
        assert_ne!(cap, oom);
        assert!(cap.to_string().contains("4096"));
        assert!(oom.to_string().contains("64 bytes"));
    }

    #[test]
    fn config_error_is_source() {
        let e: ArrayError = ConfigError::ZeroInitialCapacity.into();
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("invalid array config"));
    }
}
