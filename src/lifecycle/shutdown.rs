//! Shutdown coordination.
//!
//! # Design Decisions
//! - One broadcast per scope: the process (server) and the server (its
//!   background tasks) each own a `Shutdown`
//! - Background tasks get a grace period, then are aborted

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Broadcast stop signal for a group of long-running tasks.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver that yields once shutdown is triggered.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscriber. Harmless with none.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Trigger, then give `task` up to `grace` to finish before aborting it.
    ///
    /// Returns true when the task stopped on its own.
    pub async fn trigger_and_join(&self, task: JoinHandle<()>, grace: Duration) -> bool {
        self.trigger();
        let abort = task.abort_handle();
        match tokio::time::timeout(grace, task).await {
            Ok(_) => true,
            Err(_) => {
                tracing::warn!(
                    grace_ms = grace.as_millis() as u64,
                    "Task ignored shutdown within grace period; aborting"
                );
                abort.abort();
                false
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
