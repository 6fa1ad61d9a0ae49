//! Core types for dirspace.
//!
//! This crate provides the data model shared across the dirspace
//! ecosystem: the entity tree, running statistics, snapshots, scan
//! configuration, and error types. It performs no I/O of its own.

mod config;
mod entity;
mod error;
mod snapshot;
mod stats;

pub use config::{DEFAULT_PUBLISH_THRESHOLD, ScanConfig, ScanConfigBuilder, SkipRules};
pub use entity::{Entity, EntityKind};
pub use error::ScanError;
pub use snapshot::ScanSnapshot;
pub use stats::ScanStats;
