//! Live ledger watcher.
//!
//! Consumes the ledger's snapshot stream on a background task and keeps the
//! latest snapshot plus its recomputed aggregate behind a
//! [`tokio::sync::watch`] channel. Every dependent view reads the same
//! `WatchState`, so consistency reduces to "re-run pure aggregation on every
//! snapshot".
//!
//! If the subscription delivers its terminal error (or simply ends), the
//! watcher keeps the last snapshot but flags it stale: dependent views show
//! a degraded state until the user retries by building a fresh watcher,
//! which re-subscribes.

use futures::StreamExt;
use llavero_core::aggregate::{AggregateSnapshot, aggregate};
use llavero_core::event::UsageEvent;
use llavero_core::ledger::{EventLedger, LedgerError, Snapshot};
use llavero_core::member::MemberRegistry;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Latest ledger state as seen by every view.
#[derive(Clone, Debug, Default)]
pub struct WatchState {
    /// The full event set, most recent first
    pub snapshot: Snapshot,
    /// Aggregation of `snapshot`, recomputed on every delivery
    pub aggregate: AggregateSnapshot,
    /// True once the live feed broke; cached data may be outdated
    pub stale: bool,
}

impl WatchState {
    /// The member currently holding the key: the most recent event.
    #[must_use]
    pub fn current_holder(&self) -> Option<&UsageEvent> {
        self.snapshot.first()
    }
}

/// Background consumer of the ledger subscription.
///
/// Dropping the watcher aborts the consumer task, which drops the
/// subscription stream and releases the live channel.
pub struct LedgerWatcher {
    state: watch::Receiver<WatchState>,
    task: JoinHandle<()>,
}

impl LedgerWatcher {
    /// Subscribes to the ledger and starts consuming snapshots.
    ///
    /// Waits for the initial snapshot before returning, so the watcher is
    /// never observed empty while the ledger has events.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Transport`]: the subscription could not be opened
    pub async fn spawn(
        ledger: Arc<dyn EventLedger>,
        registry: MemberRegistry,
    ) -> Result<Self, LedgerError> {
        let mut stream = ledger.subscribe().await?;

        let initial = match stream.next().await {
            Some(Ok(snapshot)) => with_aggregate(snapshot, &registry, false),
            Some(Err(error)) => {
                tracing::error!(%error, "ledger feed failed before first snapshot");
                with_aggregate(Vec::new(), &registry, true)
            }
            None => {
                tracing::error!("ledger feed ended before first snapshot");
                with_aggregate(Vec::new(), &registry, true)
            }
        };
        let (tx, rx) = watch::channel(initial);

        let task = tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(snapshot) => {
                        tracing::debug!(events = snapshot.len(), "snapshot delivered");
                        let state = with_aggregate(snapshot, &registry, false);
                        if tx.send(state).is_err() {
                            // Every receiver is gone; the watcher was dropped.
                            return;
                        }
                    }
                    Err(error) => {
                        tracing::error!(%error, "ledger feed broke, marking state stale");
                        tx.send_modify(|state| state.stale = true);
                        return;
                    }
                }
            }
            tracing::warn!("ledger feed ended, marking state stale");
            tx.send_modify(|state| state.stale = true);
        });

        Ok(Self { state: rx, task })
    }

    /// The latest state. Cheap clone of the watch value.
    #[must_use]
    pub fn state(&self) -> WatchState {
        self.state.borrow().clone()
    }

    /// A receiver for views that want to await changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WatchState> {
        self.state.clone()
    }

    /// Waits until the next state change is observed.
    ///
    /// # Errors
    ///
    /// Returns an error if the consumer task is gone (watcher shut down).
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.state.changed().await
    }
}

impl Drop for LedgerWatcher {
    fn drop(&mut self) {
        // Drops the subscription stream with the task.
        self.task.abort();
    }
}

fn with_aggregate(snapshot: Snapshot, registry: &MemberRegistry, stale: bool) -> WatchState {
    let aggregate = aggregate(&snapshot, registry);
    WatchState {
        snapshot,
        aggregate,
        stale,
    }
}
