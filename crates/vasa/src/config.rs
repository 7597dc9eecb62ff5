//! Array configuration parameters.

use crate::error::ConfigError;

/// Configuration for a [`DynamicArray`](crate::DynamicArray) or
/// [`ByteArray`](crate::ByteArray).
///
/// Controls initial sizing, the growth curve, and the capacity ceiling.
/// Validated at construction; immutable for the lifetime of the array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayConfig {
    /// Number of slots allocated at construction.
    ///
    /// Default: 1. Must be at least 1 and no larger than `max_capacity`.
    pub initial_capacity: usize,

    /// Hard ceiling on capacity in elements.
    ///
    /// Default: 4096. Once the array holds this many elements, further
    /// appends and inserts fail with `CapacityExceeded`.
    pub max_capacity: usize,

    /// Multiplier applied to capacity on each growth.
    ///
    /// Default: 2. Must be at least 2.
    pub growth_factor: usize,

    /// Zero slots vacated by `clear` and `remove`, and the whole buffer
    /// before it is released.
    ///
    /// Default: false. Without this, stale element bytes stay in memory
    /// past the logical length until overwritten.
    pub scrub_released: bool,
}

impl ArrayConfig {
    /// Default number of slots allocated at construction.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 1;

    /// Default capacity ceiling.
    pub const DEFAULT_MAX_CAPACITY: usize = 4096;

    /// Default growth multiplier.
    pub const DEFAULT_GROWTH_FACTOR: usize = 2;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            max_capacity: Self::DEFAULT_MAX_CAPACITY,
            growth_factor: Self::DEFAULT_GROWTH_FACTOR,
            scrub_released: false,
        }
    }

    /// A config with no element-count ceiling.
    ///
    /// Growth is then limited only by `isize::MAX` bytes and by allocator
    /// failure.
    pub fn unbounded() -> Self {
        Self {
            max_capacity: isize::MAX as usize,
            ..Self::new()
        }
    }

    /// Set the initial capacity.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Set the capacity ceiling.
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set the growth multiplier.
    pub fn with_growth_factor(mut self, growth_factor: usize) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    /// Enable or disable scrubbing of vacated slots.
    pub fn with_scrub_released(mut self, scrub: bool) -> Self {
        self.scrub_released = scrub;
        self
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroInitialCapacity);
        }
        if self.initial_capacity > self.max_capacity {
            return Err(ConfigError::InitialExceedsMax {
                initial: self.initial_capacity,
                max: self.max_capacity,
            });
        }
        if self.growth_factor < 2 {
            return Err(ConfigError::GrowthFactorTooSmall {
                factor: self.growth_factor,
            });
        }
        Ok(())
    }

    /// Capacity after one growth step from `current`.
    ///
    /// Returns `None` when `current` is already at the ceiling. A step that
    /// would overshoot the ceiling is clamped to it.
    pub fn next_capacity(&self, current: usize) -> Option<usize> {
        if current >= self.max_capacity {
            return None;
        }
        let grown = current
            .checked_mul(self.growth_factor)
            .unwrap_or(self.max_capacity);
        Some(grown.clamp(current + 1, self.max_capacity))
    }
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self::new()
    }
}
