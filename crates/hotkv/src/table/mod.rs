//! Resizable hash tables keyed by byte strings
//!
//! Two collision strategies share one [`TableConfig`]:
//! - [`HashTable`]: separate chaining, new entries at the chain head
//! - [`ProbingTable`]: linear probing with tombstones
//!
//! Both keep `len / capacity` inside `[minimum_threshold, maximum_threshold]`
//! by doubling after an insert and halving after a removal, never going
//! below `minimum_capacity`.

mod chained;
mod probing;

pub use chained::HashTable;
pub use probing::ProbingTable;

use crate::error::{Error, Result};
use crate::fnv::HashWidth;

/// Default floor capacity
pub const DEFAULT_MINIMUM_CAPACITY: usize = 16;

/// Default shrink threshold
pub const DEFAULT_MINIMUM_THRESHOLD: f64 = 0.25;

/// Default grow threshold
pub const DEFAULT_MAXIMUM_THRESHOLD: f64 = 0.75;

/// Largest capacity a table may be created with
///
/// Tables may still grow past it through inserts.
pub const MAXIMUM_INITIAL_CAPACITY: usize = 1 << 24;

/// Sizing policy and hash variant for a table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    /// Capacity the table never shrinks below
    pub minimum_capacity: usize,
    /// Shrink when the load factor drops below this
    pub minimum_threshold: f64,
    /// Grow when the load factor rises above this
    pub maximum_threshold: f64,
    /// FNV variant used for bucket selection
    pub hash: HashWidth,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            minimum_capacity: DEFAULT_MINIMUM_CAPACITY,
            minimum_threshold: DEFAULT_MINIMUM_THRESHOLD,
            maximum_threshold: DEFAULT_MAXIMUM_THRESHOLD,
            hash: HashWidth::Bits32,
        }
    }
}

impl TableConfig {
    /// Check the floor and thresholds
    ///
    /// Requires `0 < minimum_threshold` and
    /// `2 * minimum_threshold <= maximum_threshold <= 1`, so a table that
    /// just halved is never over its grow threshold.
    pub fn validate(&self) -> Result<()> {
        if self.minimum_capacity == 0 {
            return Err(Error::InvalidMinimumCapacity(self.minimum_capacity));
        }
        let (minimum, maximum) = (self.minimum_threshold, self.maximum_threshold);
        let in_range = minimum.is_finite()
            && maximum.is_finite()
            && minimum > 0.0
            && maximum <= 1.0
            && minimum * 2.0 <= maximum;
        if !in_range {
            return Err(Error::InvalidThreshold { minimum, maximum });
        }
        Ok(())
    }

    pub(crate) fn initial_capacity(&self, requested: usize) -> Result<usize> {
        let capacity = requested.max(self.minimum_capacity);
        if capacity > MAXIMUM_INITIAL_CAPACITY {
            return Err(Error::CapacityTooLarge {
                requested: capacity,
                maximum: MAXIMUM_INITIAL_CAPACITY,
            });
        }
        Ok(capacity)
    }

    pub(crate) fn should_grow(&self, occupied: usize, capacity: usize) -> bool {
        occupied > (capacity as f64 * self.maximum_threshold) as usize
    }

    pub(crate) fn should_shrink(&self, len: usize, capacity: usize) -> bool {
        capacity > self.minimum_capacity
            && len < (capacity as f64 * self.minimum_threshold) as usize
    }

    pub(crate) fn shrunk_capacity(&self, capacity: usize) -> usize {
        (capacity / 2).max(self.minimum_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TableConfig::default();
        config.validate().unwrap();
        assert_eq!(config.minimum_capacity, 16);
        assert_eq!(config.hash, HashWidth::Bits32);
    }

    #[test]
    fn test_invalid_configs() {
        let zero_floor = TableConfig {
            minimum_capacity: 0,
            ..TableConfig::default()
        };
        assert_eq!(zero_floor.validate(), Err(Error::InvalidMinimumCapacity(0)));

        for (minimum, maximum) in [(0.0, 0.75), (0.5, 0.75), (0.25, 1.5), (f64::NAN, 0.75)] {
            let config = TableConfig {
                minimum_threshold: minimum,
                maximum_threshold: maximum,
                ..TableConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(Error::InvalidThreshold { .. })
            ));
        }
    }

    #[test]
    fn test_resize_rules() {
        let config = TableConfig::default();

        assert!(!config.should_grow(12, 16));
        assert!(config.should_grow(13, 16));

        assert!(!config.should_shrink(0, 16)); // at the floor
        assert!(config.should_shrink(7, 32));
        assert!(!config.should_shrink(8, 32));

        assert_eq!(config.shrunk_capacity(32), 16);
        assert_eq!(config.shrunk_capacity(17), 16);
        assert_eq!(config.initial_capacity(3), Ok(16));
        assert_eq!(config.initial_capacity(100), Ok(100));
    }

    #[test]
    fn test_initial_capacity_ceiling() {
        let config = TableConfig::default();
        assert_eq!(
            config.initial_capacity(MAXIMUM_INITIAL_CAPACITY),
            Ok(MAXIMUM_INITIAL_CAPACITY)
        );
        assert_eq!(
            config.initial_capacity(usize::MAX),
            Err(Error::CapacityTooLarge {
                requested: usize::MAX,
                maximum: MAXIMUM_INITIAL_CAPACITY,
            })
        );

        let huge_floor = TableConfig {
            minimum_capacity: MAXIMUM_INITIAL_CAPACITY + 1,
            ..TableConfig::default()
        };
        assert!(matches!(
            huge_floor.initial_capacity(0),
            Err(Error::CapacityTooLarge { .. })
        ));
    }
}
