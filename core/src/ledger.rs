//! Event ledger contract: append, remove and live subscription.
//!
//! The ledger is the single source of truth for usage events. It is
//! append-only (events are immutable; the only mutation is a terminal
//! delete), and every observer stays consistent through a push-based live
//! subscription: the stream delivers the full ordered event set immediately
//! on subscribe and again after every append or remove, by any actor,
//! anywhere in the system.
//!
//! Correctness for every dependent view then reduces to "re-run pure
//! aggregation on every snapshot" — there is no separate cache-invalidation
//! logic.
//!
//! # Ordering
//!
//! Delivered snapshots are always sorted by `occurred_at` descending (most
//! recent first); ties are broken by insertion order at the backing store.
//!
//! # Dyn Compatibility
//!
//! This trait uses explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` to enable trait object usage (`Arc<dyn EventLedger>`), so the
//! application glue never depends on a concrete transport.

use crate::environment::ActorId;
use crate::event::{EventId, UsageEvent};
use crate::member::MemberId;
use futures::Stream;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Append was asked to credit an id that is not in the member registry.
    ///
    /// A correctly functioning resolver never lets this reach the ledger,
    /// but the ledger still guards.
    #[error("Unknown member: {0}")]
    UnknownMember(MemberId),

    /// Remove was asked for an event id that is not in the ledger.
    ///
    /// The snapshot is unchanged. Callers that want idempotent removal can
    /// discard this variant.
    #[error("Event not found: {0}")]
    NotFound(EventId),

    /// The backing store failed.
    ///
    /// Transient from the caller's perspective: the operation is safely
    /// re-issuable, and is not retried automatically.
    #[error("Ledger transport error: {0}")]
    Transport(String),
}

/// Errors delivered through an active subscription.
///
/// At most one error is delivered per subscription, and it terminates
/// delivery. The subscriber must treat any cached snapshot as stale and may
/// recover by re-subscribing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The live feed was closed by the backing store.
    #[error("Ledger subscription closed: {0}")]
    Closed(String),

    /// The subscriber fell too far behind the feed and missed snapshots.
    #[error("Ledger subscription lagged ({missed} snapshots missed)")]
    Lagged {
        /// How many snapshots were dropped before the lag was detected
        missed: u64,
    },
}

/// The full, ordered current set of usage events.
///
/// Sorted by `occurred_at` descending; `first()` is therefore "who has the
/// key now".
pub type Snapshot = Vec<UsageEvent>;

/// Live snapshot feed returned by [`EventLedger::subscribe`].
///
/// Yields the current snapshot immediately, then a new snapshot on every
/// change. An `Err` item is terminal. Dropping the stream unsubscribes and
/// releases the live channel.
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Result<Snapshot, SubscriptionError>> + Send>>;

/// Append-only, realtime-observable ledger of usage events.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to be safely shared across tasks.
pub trait EventLedger: Send + Sync {
    /// Records that `member_id` took the key, on behalf of operator `actor`.
    ///
    /// The ledger assigns the event id and timestamp and derives the period
    /// fields from its own clock; the caller supplies only the member and
    /// the operator. On success every active subscriber observes a snapshot
    /// containing the new event.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UnknownMember`]: `member_id` is not in the registry
    /// - [`LedgerError::Transport`]: the backing store failed; safe to re-issue
    fn append(
        &self,
        member_id: MemberId,
        actor: ActorId,
    ) -> Pin<Box<dyn Future<Output = Result<UsageEvent, LedgerError>> + Send + '_>>;

    /// Removes an event. Terminal and irreversible — there is no soft delete.
    ///
    /// Callers must put an explicit confirmation step in front of this
    /// operation; the ledger itself does not ask twice.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`]: no such event; the snapshot is unchanged
    /// - [`LedgerError::Transport`]: the backing store failed; safe to re-issue
    fn remove(
        &self,
        event_id: EventId,
    ) -> Pin<Box<dyn Future<Output = Result<(), LedgerError>> + Send + '_>>;

    /// Opens a live subscription to the full event set.
    ///
    /// See [`SnapshotStream`] for the delivery contract.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Transport`]: the live channel could not be established
    fn subscribe(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotStream, LedgerError>> + Send + '_>>;
}
