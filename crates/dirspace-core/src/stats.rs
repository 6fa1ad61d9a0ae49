//! Running scan statistics.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;

/// Summary statistics accumulated over the course of one scan.
///
/// All counters are strictly non-decreasing while the scan is running and
/// frozen once it reaches a terminal status. `duration` is recomputed
/// against `started_at` on every update so it tracks wall-clock progress
/// even when records arrive in bursts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStats {
    /// When the scan started.
    pub started_at: SystemTime,
    /// Wall-clock time elapsed since `started_at`, as of the last update.
    pub duration: Duration,
    /// Total bytes across all recorded files.
    pub total_size: u64,
    /// Number of directories recorded.
    pub folder_count: u64,
    /// Number of files recorded.
    pub file_count: u64,
    /// Number of entities recorded (files plus directories).
    pub entity_count: u64,
}

impl ScanStats {
    /// Create fresh stats with the clock started now.
    pub fn new() -> Self {
        Self {
            started_at: SystemTime::now(),
            duration: Duration::ZERO,
            total_size: 0,
            folder_count: 0,
            file_count: 0,
            entity_count: 0,
        }
    }

    /// Record one accepted entity.
    ///
    /// Files contribute to `file_count` and `total_size`; directories to
    /// `folder_count`. Every record bumps `entity_count` and refreshes
    /// `duration`.
    pub fn record(&mut self, kind: EntityKind, size: u64) {
        self.touch();
        self.entity_count += 1;
        match kind {
            EntityKind::Directory => self.folder_count += 1,
            EntityKind::File => {
                self.file_count += 1;
                self.total_size += size;
            }
        }
    }

    /// Refresh `duration` against the start time.
    pub fn touch(&mut self) {
        self.duration = self.started_at.elapsed().unwrap_or_default();
    }

    /// Finalize the duration at scan termination.
    pub fn finish(&mut self) {
        self.touch();
    }

    /// Scan rate in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.total_size as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Scan rate in entities per second.
    pub fn entities_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.entity_count as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_start_empty() {
        let stats = ScanStats::new();
        assert_eq!(stats.total_size, 0);
        assert_eq!(stats.file_count, 0);
        assert_eq!(stats.folder_count, 0);
        assert_eq!(stats.entity_count, 0);
    }

    #[test]
    fn test_record_file() {
        let mut stats = ScanStats::new();
        stats.record(EntityKind::File, 1024);

        assert_eq!(stats.file_count, 1);
        assert_eq!(stats.folder_count, 0);
        assert_eq!(stats.entity_count, 1);
        assert_eq!(stats.total_size, 1024);
    }

    #[test]
    fn test_record_directory_ignores_size() {
        let mut stats = ScanStats::new();
        stats.record(EntityKind::Directory, 0);

        assert_eq!(stats.folder_count, 1);
        assert_eq!(stats.file_count, 0);
        assert_eq!(stats.entity_count, 1);
        assert_eq!(stats.total_size, 0);
    }

    #[test]
    fn test_mixed_records() {
        let mut stats = ScanStats::new();
        stats.record(EntityKind::Directory, 0);
        stats.record(EntityKind::File, 100);
        stats.record(EntityKind::File, 50);

        assert_eq!(stats.entity_count, 3);
        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.folder_count, 1);
        assert_eq!(stats.total_size, 150);
    }
}
