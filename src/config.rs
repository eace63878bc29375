//! Construction-time knobs and the error types they can produce.

use core::fmt;

/// Bucket count used by `ChainedHashMap::new`.
pub const DEFAULT_BUCKETS: usize = 8;

/// Occupancy ratio (entries / buckets) above which the map doubles.
pub const DEFAULT_LOAD_THRESHOLD: f64 = 0.75;

/// Smallest accepted load threshold. Below it a single entry would call
/// for an unreasonably large bucket array.
pub const MIN_LOAD_THRESHOLD: f64 = 1.0 / 64.0;

/// Per-instance configuration for a `ChainedHashMap`.
///
/// The load threshold is owned by each map; changing one map's threshold
/// never affects another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    pub initial_buckets: usize,
    pub load_threshold: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_BUCKETS,
            load_threshold: DEFAULT_LOAD_THRESHOLD,
        }
    }
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_buckets(mut self, buckets: usize) -> Self {
        self.initial_buckets = buckets;
        self
    }

    pub fn load_threshold(mut self, threshold: f64) -> Self {
        self.load_threshold = threshold;
        self
    }

    /// Checks the threshold and returns the bucket count rounded up to a
    /// power of two (minimum 1).
    pub fn validate(&self) -> Result<usize, ConfigError> {
        if !self.load_threshold.is_finite() || self.load_threshold < MIN_LOAD_THRESHOLD {
            return Err(ConfigError::InvalidLoadThreshold);
        }
        crate::buckets::round_up_buckets(self.initial_buckets).ok_or(ConfigError::CapacityOverflow)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Threshold was NaN, infinite or below `MIN_LOAD_THRESHOLD`.
    InvalidLoadThreshold,
    CapacityOverflow,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidLoadThreshold => {
                write!(
                    f,
                    "load threshold must be finite and at least {MIN_LOAD_THRESHOLD}"
                )
            }
            ConfigError::CapacityOverflow => f.write_str("capacity overflow"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryReserveError {
    CapacityOverflow,
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryReserveError::CapacityOverflow => f.write_str("capacity overflow"),
        }
    }
}

impl std::error::Error for TryReserveError {}
