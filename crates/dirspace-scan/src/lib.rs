//! Incremental directory scanning engine for dirspace.
//!
//! This crate walks a directory subtree, builds an in-memory tree of
//! files and folders with aggregated sizes, and publishes throttled
//! progress snapshots to observers while staying cancellable mid-scan.
//!
//! # Overview
//!
//! - [`PathWalker`] streams `(path, kind, size)` records under a root,
//!   applying the inclusion policy from `ScanConfig`.
//! - [`TreeBuilder`] inserts records into the entity tree in any order,
//!   materializing missing ancestor directories on demand.
//! - [`SnapshotThrottler`] bounds how often snapshots are published.
//! - [`ScanController`] owns the lifecycle: one background worker per
//!   scan, cooperative cancellation, and a permission seam for
//!   inaccessible roots.
//!
//! # Example
//!
//! ```rust,no_run
//! use dirspace_scan::{ScanConfig, ScanController, ScanEvent};
//!
//! # async fn demo() {
//! let controller = ScanController::new();
//! let mut events = controller.subscribe();
//!
//! controller.start(ScanConfig::new("/path/to/scan")).unwrap();
//!
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         ScanEvent::Snapshot(snapshot) => {
//!             println!("{} bytes so far", snapshot.total_size());
//!         }
//!         ScanEvent::Status(status) if status.is_terminal() => break,
//!         ScanEvent::Status(_) => {}
//!     }
//! }
//! # }
//! ```

mod builder;
mod cancel;
mod controller;
mod throttle;
mod walker;

pub use builder::TreeBuilder;
pub use cancel::CancelFlag;
pub use controller::{NoPrompt, PermissionProvider, ScanController, ScanEvent, ScanStatus};
pub use throttle::SnapshotThrottler;
pub use walker::{PathWalker, WalkRecord};

// Re-export core types for convenience
pub use dirspace_core::{
    DEFAULT_PUBLISH_THRESHOLD, Entity, EntityKind, ScanConfig, ScanError, ScanSnapshot, ScanStats,
    SkipRules,
};
