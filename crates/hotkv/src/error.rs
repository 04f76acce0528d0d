//! Error types for hotkv

use std::fmt;

/// Result type alias for hotkv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for construction and invariant checks
///
/// Lookup misses are not errors; they surface as `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Capacity must be greater than zero
    ZeroCapacity,

    /// Load-factor thresholds are out of range
    InvalidThreshold {
        /// Shrink threshold
        minimum: f64,
        /// Grow threshold
        maximum: f64,
    },

    /// Table floor capacity must be greater than zero
    InvalidMinimumCapacity(usize),

    /// Requested table capacity is above the allowed ceiling
    CapacityTooLarge {
        /// Capacity asked for, after clamping to the floor
        requested: usize,
        /// Largest capacity a table may start with
        maximum: usize,
    },

    /// Internal bookkeeping disagrees with itself
    Invariant(String),
}

impl Error {
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Error::Invariant(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ZeroCapacity => write!(f, "Capacity must be greater than 0"),
            Error::InvalidThreshold { minimum, maximum } => write!(
                f,
                "Invalid load-factor thresholds: minimum {} maximum {}",
                minimum, maximum
            ),
            Error::InvalidMinimumCapacity(cap) => {
                write!(f, "Invalid minimum capacity: {} (must be > 0)", cap)
            }
            Error::CapacityTooLarge { requested, maximum } => write!(
                f,
                "Capacity {} exceeds the maximum of {}",
                requested, maximum
            ),
            Error::Invariant(msg) => write!(f, "Invariant violated: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::ZeroCapacity.to_string(),
            "Capacity must be greater than 0"
        );
        assert_eq!(
            Error::InvalidMinimumCapacity(0).to_string(),
            "Invalid minimum capacity: 0 (must be > 0)"
        );
        assert_eq!(
            Error::CapacityTooLarge {
                requested: 20,
                maximum: 10
            }
            .to_string(),
            "Capacity 20 exceeds the maximum of 10"
        );
        assert!(Error::invariant("size drift")
            .to_string()
            .contains("size drift"));
    }
}
