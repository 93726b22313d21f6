//! Background refresh orchestrator.
//!
//! Runs the [`DataManager`] in a tokio task and forwards every published
//! snapshot (or refresh failure) through an `mpsc` channel, so the TUI event
//! loop never shares mutable state with the fetcher.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;

use crate::data_manager::{DataManager, Snapshot};

// ── Public types ──────────────────────────────────────────────────────────────

/// One message from the refresh loop.
#[derive(Debug, Clone)]
pub enum SnapshotUpdate {
    /// The current snapshot. After a failed refresh this is the previous
    /// snapshot and `stale_error` holds the failure.
    Ready {
        snapshot: Arc<Snapshot>,
        stale_error: Option<String>,
    },
    /// No snapshot could be produced.
    Failed(String),
}

// ── RefreshOrchestrator ───────────────────────────────────────────────────────

/// Periodic refresh coordinator.
pub struct RefreshOrchestrator {
    data_manager: DataManager,
    refresh_interval: Duration,
}

impl RefreshOrchestrator {
    pub fn new(data_manager: DataManager, refresh_interval_secs: u64) -> Self {
        Self {
            data_manager,
            refresh_interval: Duration::from_secs(refresh_interval_secs.max(1)),
        }
    }

    /// Spawn the refresh loop.
    ///
    /// Returns the update receiver and a [`RefreshHandle`] that aborts the
    /// loop.
    pub fn start(self) -> (mpsc::Receiver<SnapshotUpdate>, RefreshHandle) {
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            self.refresh_loop(tx).await;
        });

        (rx, RefreshHandle { handle })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Fetch immediately, then once per interval until the receiver is gone.
    async fn refresh_loop(mut self, tx: mpsc::Sender<SnapshotUpdate>) {
        if !self.refresh_and_send(&tx, true).await {
            return;
        }

        let mut interval = time::interval(self.refresh_interval);
        // The first tick fires immediately; the initial fetch already ran.
        interval.tick().await;

        loop {
            interval.tick().await;

            if tx.is_closed() {
                tracing::debug!("refresh channel closed; exiting loop");
                break;
            }

            if !self.refresh_and_send(&tx, false).await {
                break;
            }
        }
    }

    /// Returns `false` once the receiver has been dropped.
    async fn refresh_and_send(&mut self, tx: &mpsc::Sender<SnapshotUpdate>, force: bool) -> bool {
        let update = match self.data_manager.get_snapshot(force).await {
            Ok(snapshot) => SnapshotUpdate::Ready {
                snapshot,
                stale_error: self.data_manager.last_error().map(str::to_string),
            },
            Err(e) => {
                tracing::error!(error = %e, "no snapshot available");
                SnapshotUpdate::Failed(e.to_string())
            }
        };

        if let Err(e) = tx.send(update).await {
            tracing::debug!(error = %e, "receiver dropped; stopping refresh loop");
            return false;
        }
        true
    }
}

// ── RefreshHandle ─────────────────────────────────────────────────────────────

/// Handle to the background refresh task.
pub struct RefreshHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop the refresh loop immediately.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
