//! C-compatible array configuration.
//!
//! [`VasaArrayConfig`] mirrors [`ArrayConfig`] plus the element alignment.
//! Zero in any numeric field means "use the default", so a zero-initialised
//! struct reproduces `vasa_array_init`.

use vasa::{ArrayConfig, ByteArray, System};

/// Construction parameters for `vasa_array_init_with`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VasaArrayConfig {
    /// Slots allocated up front. 0 = 1.
    pub initial_capacity: usize,
    /// Capacity ceiling in elements. 0 = 4096.
    pub max_capacity: usize,
    /// Growth multiplier. 0 = 2.
    pub growth_factor: usize,
    /// Slot alignment in bytes (power of two). 0 = 8.
    pub element_align: usize,
    /// Non-zero to zero vacated slots and released blocks.
    pub scrub_released: u8,
}

fn or_default(value: usize, default: usize) -> usize {
    if value == 0 {
        default
    } else {
        value
    }
}

impl VasaArrayConfig {
    /// Resolve defaults, returning the Rust config and the slot alignment.
    ///
    /// Validation is left to array construction.
    pub fn to_rust(&self) -> (ArrayConfig, usize) {
        let config = ArrayConfig::new()
            .with_initial_capacity(or_default(
                self.initial_capacity,
                ArrayConfig::DEFAULT_INITIAL_CAPACITY,
            ))
            .with_max_capacity(or_default(
                self.max_capacity,
                ArrayConfig::DEFAULT_MAX_CAPACITY,
            ))
            .with_growth_factor(or_default(
                self.growth_factor,
                ArrayConfig::DEFAULT_GROWTH_FACTOR,
            ))
            .with_scrub_released(self.scrub_released != 0);
        let align = or_default(self.element_align, ByteArray::<System>::DEFAULT_ALIGN);
        (config, align)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_config_is_default() {
        let (config, align) = VasaArrayConfig::default().to_rust();
        assert_eq!(config, ArrayConfig::default());
        assert_eq!(align, 8);
    }

    #[test]
    fn explicit_values_pass_through() {
        let c = VasaArrayConfig {
            initial_capacity: 4,
            max_capacity: 64,
            growth_factor: 4,
            element_align: 16,
            scrub_released: 1,
        };
        let (config, align) = c.to_rust();
        assert_eq!(config.initial_capacity, 4);
        assert_eq!(config.max_capacity, 64);
        assert_eq!(config.growth_factor, 4);
        assert!(config.scrub_released);
        assert_eq!(align, 16);
    }

    #[test]
    fn growth_factor_one_survives_to_validation() {
        let c = VasaArrayConfig {
            growth_factor: 1,
            ..Default::default()
        };
        let (config, _) = c.to_rust();
        assert!(config.validate().is_err());
    }
}
