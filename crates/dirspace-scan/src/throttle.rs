//! Snapshot publication throttling.

use dirspace_core::DEFAULT_PUBLISH_THRESHOLD;

/// Decides when the worker should hand a snapshot to the observer.
///
/// The throttler accumulates file bytes processed since the last
/// publication; crossing the threshold triggers a publish and resets the
/// accumulator. The mandatory initial and final snapshots are the
/// controller's responsibility, not the throttler's.
#[derive(Debug)]
pub struct SnapshotThrottler {
    threshold: u64,
    accumulated: u64,
}

impl SnapshotThrottler {
    /// Create a throttler with the given byte threshold.
    ///
    /// A threshold of 0 publishes on every observed file.
    pub fn new(threshold: u64) -> Self {
        Self {
            threshold,
            accumulated: 0,
        }
    }

    /// Record `bytes` of newly processed file data.
    ///
    /// Returns `true` when a snapshot should be published now; the
    /// accumulator is reset in that case.
    pub fn observe(&mut self, bytes: u64) -> bool {
        self.accumulated += bytes;
        if self.accumulated >= self.threshold {
            self.accumulated = 0;
            true
        } else {
            false
        }
    }

    /// Bytes accumulated since the last publication.
    pub fn accumulated(&self) -> u64 {
        self.accumulated
    }
}

impl Default for SnapshotThrottler {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLISH_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_does_not_publish() {
        let mut throttler = SnapshotThrottler::new(100);
        assert!(!throttler.observe(40));
        assert!(!throttler.observe(40));
        assert_eq!(throttler.accumulated(), 80);
    }

    #[test]
    fn test_crossing_threshold_publishes_once_and_resets() {
        let mut throttler = SnapshotThrottler::new(100);
        assert!(!throttler.observe(60));
        assert!(throttler.observe(60));
        assert_eq!(throttler.accumulated(), 0);
        assert!(!throttler.observe(99));
        assert!(throttler.observe(1));
    }

    #[test]
    fn test_single_large_observation_publishes_once() {
        let mut throttler = SnapshotThrottler::new(100);
        // One huge file still yields exactly one publication
        assert!(throttler.observe(1_000_000));
        assert!(!throttler.observe(99));
    }

    #[test]
    fn test_exactly_one_publication_per_span() {
        let mut throttler = SnapshotThrottler::new(100);
        let mut published = 0;
        for _ in 0..10 {
            if throttler.observe(25) {
                published += 1;
            }
        }
        // 250 bytes total at threshold 100: two full spans crossed
        assert_eq!(published, 2);
    }

    #[test]
    fn test_default_threshold() {
        let throttler = SnapshotThrottler::default();
        assert_eq!(throttler.threshold, DEFAULT_PUBLISH_THRESHOLD);
    }
}
