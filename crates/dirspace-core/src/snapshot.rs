//! Published scan snapshots.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::stats::ScanStats;

/// Immutable point-in-time view of a scan in progress (or finished).
///
/// Snapshots are value copies of the worker's live tree and stats; the
/// worker keeps mutating its own state after publication, so observers may
/// read a snapshot at leisure without any synchronization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSnapshot {
    /// Root of the scanned tree as known at publication time.
    pub tree: Entity,
    /// Statistics consistent with `tree` to within one record.
    pub stats: ScanStats,
}

impl ScanSnapshot {
    /// Capture a snapshot from the worker's live state.
    pub fn capture(tree: &Entity, stats: &ScanStats) -> Self {
        Self {
            tree: tree.clone(),
            stats: stats.clone(),
        }
    }

    /// Total size of the scanned tree in bytes.
    pub fn total_size(&self) -> u64 {
        self.tree.size
    }
}
