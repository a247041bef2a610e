//! Walk configuration
//!
//! Callers hand in plain signed integers; out-of-range values are replaced
//! by defaults instead of being rejected.

use tracing::debug;

/// Worker threads used when the caller asks for zero or fewer
pub const DEFAULT_THREADS: usize = 4;

/// Queue capacity used when the caller asks for a negative capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Normalized runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkConfig {
    /// Number of worker threads (always >= 1)
    pub threads: usize,

    /// Work queue capacity; 0 means synchronous handoff
    pub queue_capacity: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl WalkConfig {
    /// Build a configuration, substituting defaults for invalid values
    pub fn new(threads: i64, queue_capacity: i64) -> Self {
        Self {
            threads: normalize_threads(threads),
            queue_capacity: normalize_queue_capacity(queue_capacity),
        }
    }
}

pub(crate) fn normalize_threads(threads: i64) -> usize {
    if threads <= 0 {
        debug!(requested = threads, default = DEFAULT_THREADS, "Using default thread count");
        return DEFAULT_THREADS;
    }
    usize::try_from(threads).unwrap_or(DEFAULT_THREADS)
}

pub(crate) fn normalize_queue_capacity(capacity: i64) -> usize {
    if capacity < 0 {
        debug!(
            requested = capacity,
            default = DEFAULT_QUEUE_CAPACITY,
            "Using default queue capacity"
        );
        return DEFAULT_QUEUE_CAPACITY;
    }
    usize::try_from(capacity).unwrap_or(DEFAULT_QUEUE_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WalkConfig::default();
        assert_eq!(config.threads, 4);
        assert_eq!(config.queue_capacity, 1024);
    }

    #[test]
    fn test_non_positive_threads_default() {
        assert_eq!(WalkConfig::new(0, 10).threads, DEFAULT_THREADS);
        assert_eq!(WalkConfig::new(-7, 10).threads, DEFAULT_THREADS);
        assert_eq!(WalkConfig::new(16, 10).threads, 16);
    }

    #[test]
    fn test_queue_capacity_zero_is_kept() {
        let config = WalkConfig::new(1, 0);
        assert_eq!(config.queue_capacity, 0);
    }

    #[test]
    fn test_negative_queue_capacity_defaults() {
        assert_eq!(WalkConfig::new(1, -1).queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(WalkConfig::new(1, 5).queue_capacity, 5);
    }
}
