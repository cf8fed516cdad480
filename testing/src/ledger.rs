//! In-memory event ledger.
//!
//! The reference implementation of [`EventLedger`], used everywhere a real
//! backing store is not: unit tests, integration tests, and local demos. It
//! honors the full contract — store-assigned ids and timestamps, registry
//! guarding, and a live subscription that delivers the current ordered set
//! immediately and again on every change by any actor.

use llavero_core::environment::{ActorId, Clock};
use llavero_core::event::{EventId, UsageEvent};
use llavero_core::ledger::{EventLedger, LedgerError, Snapshot, SnapshotStream, SubscriptionError};
use llavero_core::member::{MemberId, MemberRegistry};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

/// How many snapshots a slow subscriber may fall behind before it is lagged.
const CHANNEL_CAPACITY: usize = 16;

/// In-memory, realtime-observable event ledger.
///
/// Events are kept in insertion order; delivered snapshots are stable-sorted
/// by `occurred_at` descending, so ties keep insertion order as the ledger
/// contract requires.
///
/// # Fault injection
///
/// [`fail_next_operation`](Self::fail_next_operation) makes the next append
/// or remove fail with [`LedgerError::Transport`], for exercising the
/// transient-failure paths of callers.
pub struct InMemoryLedger {
    registry: MemberRegistry,
    clock: Arc<dyn Clock>,
    events: Mutex<Vec<UsageEvent>>,
    updates: broadcast::Sender<Snapshot>,
    fail_next: AtomicBool,
}

impl InMemoryLedger {
    /// Creates an empty ledger guarding against the given registry.
    #[must_use]
    pub fn new(registry: MemberRegistry, clock: Arc<dyn Clock>) -> Self {
        let (updates, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            registry,
            clock,
            events: Mutex::new(Vec::new()),
            updates,
            fail_next: AtomicBool::new(false),
        }
    }

    /// Makes the next append or remove fail with a transport error.
    pub fn fail_next_operation(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// The current snapshot, ordered most recent first.
    pub async fn snapshot(&self) -> Snapshot {
        let events = self.events.lock().await;
        Self::ordered(&events)
    }

    /// Number of active subscribers, for leak checks in tests.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.updates.receiver_count()
    }

    fn ordered(events: &[UsageEvent]) -> Snapshot {
        let mut snapshot = events.to_vec();
        // Stable sort: equal timestamps keep insertion order.
        snapshot.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        snapshot
    }

    fn take_injected_failure(&self) -> Result<(), LedgerError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(LedgerError::Transport(
                "injected transport failure".to_string(),
            ));
        }
        Ok(())
    }
}

impl EventLedger for InMemoryLedger {
    fn append(
        &self,
        member_id: MemberId,
        actor: ActorId,
    ) -> Pin<Box<dyn Future<Output = Result<UsageEvent, LedgerError>> + Send + '_>> {
        Box::pin(async move {
            self.take_injected_failure()?;

            let member = self
                .registry
                .find(member_id.as_str())
                .ok_or_else(|| LedgerError::UnknownMember(member_id.clone()))?;

            let event = UsageEvent::record(
                EventId::new(Uuid::new_v4().to_string()),
                member_id,
                member.display_name.clone(),
                actor,
                self.clock.now(),
            );

            let snapshot = {
                let mut events = self.events.lock().await;
                events.push(event.clone());
                Self::ordered(&events)
            };
            tracing::info!(member = %event.member_id, event = %event.id, "usage recorded");
            let _ = self.updates.send(snapshot);

            Ok(event)
        })
    }

    fn remove(
        &self,
        event_id: EventId,
    ) -> Pin<Box<dyn Future<Output = Result<(), LedgerError>> + Send + '_>> {
        Box::pin(async move {
            self.take_injected_failure()?;

            let snapshot = {
                let mut events = self.events.lock().await;
                let index = events
                    .iter()
                    .position(|e| e.id == event_id)
                    .ok_or_else(|| LedgerError::NotFound(event_id.clone()))?;
                events.remove(index);
                Self::ordered(&events)
            };
            tracing::info!(event = %event_id, "usage record deleted");
            let _ = self.updates.send(snapshot);

            Ok(())
        })
    }

    fn subscribe(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotStream, LedgerError>> + Send + '_>> {
        Box::pin(async move {
            // Subscribe before reading the current set so no change between
            // the two is ever missed; a duplicate of the initial snapshot is
            // harmless under last-snapshot-wins.
            let mut rx = self.updates.subscribe();
            let initial = self.snapshot().await;

            let stream = async_stream::stream! {
                yield Ok(initial);
                loop {
                    match rx.recv().await {
                        Ok(snapshot) => yield Ok(snapshot),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            yield Err(SubscriptionError::Lagged { missed });
                            return;
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            yield Err(SubscriptionError::Closed(
                                "ledger dropped".to_string(),
                            ));
                            return;
                        }
                    }
                }
            };

            Ok(Box::pin(stream) as SnapshotStream)
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

    use super::*;
    use crate::mocks::{SteppingClock, test_clock};
    use futures::StreamExt;

    fn ledger() -> InMemoryLedger {
        InMemoryLedger::new(
            MemberRegistry::default_community(),
            Arc::new(SteppingClock::from_test_epoch()),
        )
    }

    #[tokio::test]
    async fn append_assigns_id_timestamp_and_snapshot_name() {
        let ledger = ledger();
        let event = ledger
            .append(MemberId::new("vecino_03"), ActorId::new("op-1"))
            .await
            .unwrap();

        assert_eq!(event.member_id.as_str(), "vecino_03");
        assert_eq!(event.member_name_snapshot, "Japa");
        assert_eq!(event.recorded_by.as_str(), "op-1");
        assert!(!event.id.as_str().is_empty());
    }

    #[tokio::test]
    async fn append_guards_against_unknown_members() {
        let ledger = ledger();
        let error = ledger
            .append(MemberId::new("vecino_99"), ActorId::new("op-1"))
            .await
            .unwrap_err();

        assert_eq!(error, LedgerError::UnknownMember(MemberId::new("vecino_99")));
        assert!(ledger.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn snapshots_are_most_recent_first() {
        let ledger = ledger();
        for id in ["vecino_01", "vecino_02", "vecino_03"] {
            ledger
                .append(MemberId::new(id), ActorId::new("op-1"))
                .await
                .unwrap();
        }

        let snapshot = ledger.snapshot().await;
        let order: Vec<&str> = snapshot.iter().map(|e| e.member_id.as_str()).collect();
        assert_eq!(order, vec!["vecino_03", "vecino_02", "vecino_01"]);
        assert!(snapshot.windows(2).all(|w| w[0].occurred_at >= w[1].occurred_at));
    }

    #[tokio::test]
    async fn equal_timestamps_keep_insertion_order() {
        let fixed = InMemoryLedger::new(
            MemberRegistry::default_community(),
            Arc::new(test_clock()),
        );
        for id in ["vecino_01", "vecino_02", "vecino_03"] {
            fixed
                .append(MemberId::new(id), ActorId::new("op-1"))
                .await
                .unwrap();
        }

        let snapshot = fixed.snapshot().await;
        let order: Vec<&str> = snapshot
            .iter()
            .map(|e| e.member_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["vecino_01", "vecino_02", "vecino_03"]);
    }

    #[tokio::test]
    async fn remove_is_terminal_and_guards_unknown_ids() {
        let ledger = ledger();
        let event = ledger
            .append(MemberId::new("vecino_05"), ActorId::new("op-1"))
            .await
            .unwrap();

        ledger.remove(event.id.clone()).await.unwrap();
        assert!(ledger.snapshot().await.is_empty());

        let error = ledger.remove(event.id.clone()).await.unwrap_err();
        assert_eq!(error, LedgerError::NotFound(event.id));
        assert!(ledger.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn subscription_delivers_current_set_then_every_change() {
        let ledger = ledger();
        ledger
            .append(MemberId::new("vecino_01"), ActorId::new("op-1"))
            .await
            .unwrap();

        let mut feed = ledger.subscribe().await.unwrap();

        let initial = feed.next().await.unwrap().unwrap();
        assert_eq!(initial.len(), 1);

        let second = ledger
            .append(MemberId::new("vecino_02"), ActorId::new("op-2"))
            .await
            .unwrap();
        let after_append = feed.next().await.unwrap().unwrap();
        assert_eq!(after_append.len(), 2);
        assert_eq!(after_append[0].id, second.id);

        ledger.remove(second.id).await.unwrap();
        let after_remove = feed.next().await.unwrap().unwrap();
        assert_eq!(after_remove.len(), 1);
    }

    #[tokio::test]
    async fn appends_minus_removes_equals_snapshot_len() {
        let ledger = ledger();
        let mut ids = Vec::new();
        for n in 0..6 {
            let member = format!("vecino_0{}", 1 + n % 3);
            let event = ledger
                .append(MemberId::new(member), ActorId::new("op-1"))
                .await
                .unwrap();
            ids.push(event.id);
        }
        for id in ids.drain(..2) {
            ledger.remove(id).await.unwrap();
        }

        assert_eq!(ledger.snapshot().await.len(), 4);
    }

    #[tokio::test]
    async fn dropping_the_stream_unsubscribes() {
        let ledger = ledger();
        let feed = ledger.subscribe().await.unwrap();
        assert_eq!(ledger.subscriber_count(), 1);

        drop(feed);
        // The broadcast receiver is owned by the stream; dropping it closes
        // the live channel.
        assert_eq!(ledger.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn injected_transport_failure_is_transient() {
        let ledger = ledger();
        ledger.fail_next_operation();

        let error = ledger
            .append(MemberId::new("vecino_01"), ActorId::new("op-1"))
            .await
            .unwrap_err();
        assert!(matches!(error, LedgerError::Transport(_)));

        // Re-issuing the same operation succeeds.
        ledger
            .append(MemberId::new("vecino_01"), ActorId::new("op-1"))
            .await
            .unwrap();
        assert_eq!(ledger.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn lagged_subscriber_gets_one_terminal_error() {
        let ledger = ledger();
        let mut feed = ledger.subscribe().await.unwrap();

        // Overrun the broadcast capacity without draining the feed.
        for _ in 0..(CHANNEL_CAPACITY + 8) {
            ledger
                .append(MemberId::new("vecino_01"), ActorId::new("op-1"))
                .await
                .unwrap();
        }

        // Initial snapshot was buffered by the stream before the overrun.
        assert!(feed.next().await.unwrap().is_ok());

        let mut saw_error = false;
        while let Some(item) = feed.next().await {
            match item {
                Ok(_) => {}
                Err(SubscriptionError::Lagged { missed }) => {
                    assert!(missed > 0);
                    saw_error = true;
                    // Terminal: the stream must end now.
                    assert!(feed.next().await.is_none());
                    break;
                }
                Err(other) => panic!("unexpected subscription error: {other}"),
            }
        }
        assert!(saw_error, "expected a lagged error after overrun");
    }
}
