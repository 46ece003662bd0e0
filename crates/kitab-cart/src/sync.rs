//! # Cart Sync
//!
//! Fire-and-forget mirroring of the cart to the server.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartStore mutation                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SyncHandle.queue(snapshot) ── try_send, never blocks ──┐              │
//! │       │ channel full/closed?                             │              │
//! │       └── warn + drop (best effort)                      ▼              │
//! │                                          ┌────────────────────────┐     │
//! │                                          │ sync worker (task)     │     │
//! │                                          │  recv → push(snapshot) │     │
//! │                                          │  Err → warn + continue │     │
//! │                                          └────────────────────────┘     │
//! │                                                                         │
//! │  A failed or dropped push NEVER rolls back local state; the server     │
//! │  re-prices everything at checkout, so the mirror is advisory.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::storage::PersistedCart;

/// Sync push failures. Only ever logged; never surfaced to the user.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(String),
}

/// Sender half of the sync channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    tx: mpsc::Sender<PersistedCart>,
}

impl SyncHandle {
    /// Queues a snapshot for background push.
    ///
    /// Never blocks: a full or closed channel drops the snapshot with a
    /// warning. The next mutation queues a fresh, more current snapshot
    /// anyway.
    pub fn queue(&self, snapshot: PersistedCart) {
        match self.tx.try_send(snapshot) {
            Ok(()) => debug!("Cart snapshot queued for sync"),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Cart sync channel full, dropping snapshot");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Cart sync worker gone, dropping snapshot");
            }
        }
    }
}

/// Creates the sync channel: a handle for the store and a receiver for the
/// worker.
pub fn sync_channel(capacity: usize) -> (SyncHandle, mpsc::Receiver<PersistedCart>) {
    let (tx, rx) = mpsc::channel(capacity);
    (SyncHandle { tx }, rx)
}

/// Spawns the background worker that drains the channel and pushes each
/// snapshot with `push` (an HTTP POST to `/cart/sync` in production, a
/// recorder in tests).
///
/// Push failures are logged and swallowed; the worker keeps draining.
pub fn spawn_sync_worker<F, Fut>(
    mut rx: mpsc::Receiver<PersistedCart>,
    mut push: F,
) -> JoinHandle<()>
where
    F: FnMut(PersistedCart) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), SyncError>> + Send,
{
    tokio::spawn(async move {
        while let Some(snapshot) = rx.recv().await {
            match push(snapshot).await {
                Ok(()) => debug!("Cart snapshot synced"),
                Err(e) => warn!(error = %e, "Cart sync failed, keeping local state"),
            }
        }
        debug!("Cart sync worker stopped");
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_worker_drains_snapshots() {
        let (handle, rx) = sync_channel(8);
        let pushed = Arc::new(AtomicUsize::new(0));

        let counter = pushed.clone();
        let worker = spawn_sync_worker(rx, move |_snapshot| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), SyncError>(())
            }
        });

        handle.queue(PersistedCart::default());
        handle.queue(PersistedCart::default());
        drop(handle);

        worker.await.unwrap();
        assert_eq!(pushed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_push_failures_are_swallowed() {
        let (handle, rx) = sync_channel(8);
        let attempts = Arc::new(AtomicUsize::new(0));

        let counter = attempts.clone();
        let worker = spawn_sync_worker(rx, move |_snapshot| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(SyncError::Transport("server unreachable".to_string()))
            }
        });

        handle.queue(PersistedCart::default());
        handle.queue(PersistedCart::default());
        drop(handle);

        // The worker survives failures and drains everything
        worker.await.unwrap();
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_queue_never_blocks_when_full() {
        let (handle, _rx) = sync_channel(1);

        // Second queue hits a full channel; it must return, not block
        handle.queue(PersistedCart::default());
        handle.queue(PersistedCart::default());
    }
}
