//! Scan lifecycle management.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use dirspace_core::{Entity, EntityKind, ScanConfig, ScanError, ScanSnapshot, ScanStats};

use crate::builder::TreeBuilder;
use crate::cancel::CancelFlag;
use crate::throttle::SnapshotThrottler;
use crate::walker::PathWalker;

const EVENT_CHANNEL_SIZE: usize = 100;

/// Lifecycle status of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    /// No scan has run, or the last start was declined.
    Idle,
    /// A worker is enumerating the filesystem.
    Running,
    /// The walk finished without cancellation.
    Completed,
    /// `stop` was called; the published tree is a valid partial result.
    Cancelled,
    /// The root was invalid before any record was produced.
    Failed,
}

impl ScanStatus {
    /// Check whether this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanStatus::Completed | ScanStatus::Cancelled | ScanStatus::Failed
        )
    }

    /// Check whether a scan is in progress.
    pub fn is_running(&self) -> bool {
        matches!(self, ScanStatus::Running)
    }
}

/// Event delivered to scan observers.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// A progress or final snapshot per the throttling rules.
    Snapshot(ScanSnapshot),
    /// A state transition of the controller.
    Status(ScanStatus),
}

/// External collaborator that resolves an inaccessible root to an
/// accessible one, typically by asking the user.
///
/// Only consulted when the initial root path cannot be read. Returning
/// `None` means the user declined; the controller then stays `Idle`.
pub trait PermissionProvider: Send + Sync + 'static {
    /// Ask for access, suggesting the path the caller wanted.
    fn request_access(&self, suggested: PathBuf) -> impl Future<Output = Option<PathBuf>> + Send;
}

/// Provider that never grants access. Suitable for non-interactive
/// front ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl PermissionProvider for NoPrompt {
    fn request_access(&self, _suggested: PathBuf) -> impl Future<Output = Option<PathBuf>> + Send {
        std::future::ready(None)
    }
}

/// Handles shared between the controller, the permission continuation, and
/// the scan worker.
#[derive(Clone)]
struct Shared {
    status_tx: watch::Sender<ScanStatus>,
    events_tx: broadcast::Sender<ScanEvent>,
    cancel: Arc<Mutex<CancelFlag>>,
}

impl Shared {
    fn status(&self) -> ScanStatus {
        *self.status_tx.borrow()
    }

    fn set_status(&self, status: ScanStatus) {
        self.status_tx.send_replace(status);
        let _ = self.events_tx.send(ScanEvent::Status(status));
    }

    fn publish(&self, tree: &Entity, stats: &ScanStats) {
        let _ = self
            .events_tx
            .send(ScanEvent::Snapshot(ScanSnapshot::capture(tree, stats)));
    }

    fn current_cancel(&self) -> CancelFlag {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_cancel(&self, flag: CancelFlag) {
        *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = flag;
    }
}

/// Owns the scan lifecycle: start, cancel, status, and event publication.
///
/// One controller runs at most one scan at a time. Exactly one background
/// worker owns and mutates the live tree and stats for the lifetime of a
/// scan; observers only ever see immutable snapshot copies through the
/// event channel, so no locking guards the tree itself.
///
/// `start` and `stop` must be called within a Tokio runtime.
pub struct ScanController<P: PermissionProvider = NoPrompt> {
    permissions: Arc<P>,
    shared: Shared,
}

impl ScanController<NoPrompt> {
    /// Create a controller that never prompts for access.
    pub fn new() -> Self {
        Self::with_permissions(NoPrompt)
    }
}

impl Default for ScanController<NoPrompt> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PermissionProvider> ScanController<P> {
    /// Create a controller with a permission collaborator.
    pub fn with_permissions(permissions: P) -> Self {
        let (status_tx, _) = watch::channel(ScanStatus::Idle);
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            permissions: Arc::new(permissions),
            shared: Shared {
                status_tx,
                events_tx,
                cancel: Arc::new(Mutex::new(CancelFlag::new())),
            },
        }
    }

    /// Current lifecycle status.
    pub fn status(&self) -> ScanStatus {
        self.shared.status()
    }

    /// Subscribe to snapshot and status events.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.shared.events_tx.subscribe()
    }

    /// Watch status transitions only.
    pub fn watch_status(&self) -> watch::Receiver<ScanStatus> {
        self.shared.status_tx.subscribe()
    }

    /// Start scanning under `config.root`.
    ///
    /// Rejected with [`ScanError::AlreadyRunning`] while a scan is in
    /// progress. If the root is unreadable the permission collaborator is
    /// consulted asynchronously; this call returns immediately and the
    /// scan begins once (and if) access is granted. A root that exists but
    /// is not a directory fails the controller without launching a worker.
    pub fn start(&self, config: ScanConfig) -> Result<(), ScanError> {
        if self.status().is_running() {
            return Err(ScanError::AlreadyRunning);
        }

        match probe_root(&config.root) {
            Ok(RootAccess::Readable) => {
                spawn_worker(config, self.shared.clone());
                Ok(())
            }
            Ok(RootAccess::NeedsPermission) => {
                self.resolve_and_start(config);
                Ok(())
            }
            Err(err) => {
                self.shared.set_status(ScanStatus::Failed);
                Err(err)
            }
        }
    }

    /// Request cancellation of the running scan.
    ///
    /// The status flips to `Cancelled` immediately; the worker notices the
    /// flag at its next check, stops enumerating, and publishes the final
    /// snapshot of whatever was scanned so far. No-op unless `Running`.
    pub fn stop(&self) {
        if !self.status().is_running() {
            return;
        }
        self.shared.current_cancel().cancel();
        self.shared.set_status(ScanStatus::Cancelled);
    }

    /// Resume the start sequence once the permission collaborator answers.
    /// The caller is not blocked while the user decides.
    fn resolve_and_start(&self, mut config: ScanConfig) {
        let shared = self.shared.clone();
        let permissions = Arc::clone(&self.permissions);
        tokio::spawn(async move {
            let suggested = config.root.clone();
            match permissions.request_access(suggested).await {
                Some(approved) => {
                    config.root = approved;
                    match probe_root(&config.root) {
                        Ok(RootAccess::Readable) => spawn_worker(config, shared),
                        Ok(RootAccess::NeedsPermission) => {
                            warn!(
                                path = %config.root.display(),
                                "approved path is still inaccessible"
                            );
                            shared.set_status(ScanStatus::Failed);
                        }
                        Err(err) => {
                            warn!(error = %err, "approved path is not scannable");
                            shared.set_status(ScanStatus::Failed);
                        }
                    }
                }
                None => {
                    // Declined: stay Idle, nothing to surface.
                    debug!("no path selected");
                }
            }
        });
    }
}

enum RootAccess {
    Readable,
    NeedsPermission,
}

/// Check whether the root can be scanned right away, needs the permission
/// collaborator, or is invalid.
fn probe_root(path: &Path) -> Result<RootAccess, ScanError> {
    use std::io::ErrorKind;

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if matches!(err.kind(), ErrorKind::PermissionDenied | ErrorKind::NotFound) => {
            return Ok(RootAccess::NeedsPermission);
        }
        Err(err) => return Err(ScanError::io(path, err)),
    };

    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    match std::fs::read_dir(path) {
        Ok(_) => Ok(RootAccess::Readable),
        Err(err) if err.kind() == ErrorKind::PermissionDenied => Ok(RootAccess::NeedsPermission),
        Err(err) => Err(ScanError::io(path, err)),
    }
}

/// Transition to `Running` with a fresh cancel flag and launch the worker.
fn spawn_worker(config: ScanConfig, shared: Shared) {
    if shared.status().is_running() {
        // A permission continuation raced a direct start; keep the one
        // worker that already owns the tree.
        warn!("scan already running, not launching another worker");
        return;
    }

    let cancel = CancelFlag::new();
    shared.replace_cancel(cancel.clone());

    if shared.status() != ScanStatus::Idle {
        shared.set_status(ScanStatus::Idle);
    }
    shared.set_status(ScanStatus::Running);

    tokio::task::spawn_blocking(move || run_scan(config, cancel, shared));
}

/// The scan worker: sole writer of the tree and stats for one scan.
fn run_scan(config: ScanConfig, cancel: CancelFlag, shared: Shared) {
    let root_name = config
        .root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.root.to_string_lossy().into_owned());
    let mut root = Entity::new_directory(root_name, config.root.clone());
    let mut stats = ScanStats::new();

    // Root confirmed: give the observer an empty tree to render before any
    // data arrives.
    if !cancel.is_cancelled() {
        shared.publish(&root, &stats);
    }

    let builder = TreeBuilder::new(&config.root);
    let mut throttler = SnapshotThrottler::new(config.publish_threshold);

    for record in PathWalker::new(&config, cancel.clone()) {
        let is_file = record.kind == EntityKind::File;
        if builder.insert(&mut root, &record) {
            // Tree and stats mutate in lockstep per record, so a snapshot
            // can never show them out of sync.
            stats.record(record.kind, record.size);
            if is_file && throttler.observe(record.size) {
                shared.publish(&root, &stats);
            }
        }
    }

    stats.finish();

    // Mandatory final snapshot, exactly once, for every terminal outcome.
    shared.publish(&root, &stats);
    if !cancel.is_cancelled() {
        shared.set_status(ScanStatus::Completed);
    }
}
