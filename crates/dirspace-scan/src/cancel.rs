//! Cooperative cancellation flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag set by `ScanController::stop` and polled by the scan worker
/// between records.
///
/// Cancellation is cooperative: the worker checks the flag at defined
/// points and never interrupts an in-flight filesystem call. A fresh flag
/// is created for every scan, so a worker winding down from a cancelled
/// scan can never observe the next scan's flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a new, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unset() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());
    }

    #[test]
    fn test_cancel_visible_through_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();

        clone.cancel();
        assert!(flag.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_fresh_flags_are_independent() {
        let old = CancelFlag::new();
        old.cancel();

        let fresh = CancelFlag::new();
        assert!(!fresh.is_cancelled());
    }
}
