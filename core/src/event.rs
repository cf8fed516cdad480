//! Usage event types and period labelling.
//!
//! A [`UsageEvent`] is an immutable fact: a member took custody of the shared
//! key at a point in time. Events are created only by the ledger (which
//! assigns the id and timestamp) and destroyed only by an explicit,
//! operator-confirmed delete. They are never mutated.

use crate::environment::ActorId;
use crate::member::MemberId;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spanish month names, lowercase, as shown on the dashboard and in exports.
const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// The period label for a timestamp: lowercase Spanish month name.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use llavero_core::event::period_label;
///
/// let ts = Utc.with_ymd_and_hms(2026, 8, 26, 10, 0, 0).unwrap();
/// assert_eq!(period_label(ts), "agosto");
/// ```
#[must_use]
pub fn period_label(at: DateTime<Utc>) -> String {
    MONTH_NAMES[at.month0() as usize].to_string()
}

/// Position of a period label within the calendar year (1-12), if it is a
/// known month name. Used to emit per-period totals in calendar order.
#[must_use]
pub fn period_ordinal(label: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| *m == label)
        .and_then(|i| u32::try_from(i + 1).ok())
}

/// Ledger-assigned unique identifier for a usage event.
///
/// Opaque to the core: the backing store generates it on append and it is
/// assigned exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(String);

impl EventId {
    /// Create an `EventId` from a store-generated string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the event ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable record that a member took the shared key.
///
/// All fields except `member_id` are assigned by the ledger at append time:
/// the id comes from the backing store, `occurred_at` from the ledger clock
/// (never the caller, to avoid clock-skew ordering bugs), and the period
/// fields are derived from `occurred_at`.
///
/// `member_name_snapshot` is a denormalized copy of the member's display name
/// at record time, so history stays readable even if registry entries change
/// later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// Store-assigned unique identifier
    pub id: EventId,
    /// The member credited with taking the key
    pub member_id: MemberId,
    /// Member display name as of append time
    pub member_name_snapshot: String,
    /// Operator of the capture device that recorded this event
    pub recorded_by: ActorId,
    /// Ledger-assigned timestamp
    pub occurred_at: DateTime<Utc>,
    /// Derived period label (lowercase Spanish month name)
    pub period_label: String,
    /// Derived period year
    pub period_year: i32,
}

impl UsageEvent {
    /// Constructs an event with period fields derived from `occurred_at`.
    ///
    /// Intended for ledger implementations; application code receives events
    /// from [`append`](crate::ledger::EventLedger::append) rather than
    /// building them.
    #[must_use]
    pub fn record(
        id: EventId,
        member_id: MemberId,
        member_name_snapshot: impl Into<String>,
        recorded_by: ActorId,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            member_id,
            member_name_snapshot: member_name_snapshot.into(),
            recorded_by,
            occurred_at,
            period_label: period_label(occurred_at),
            period_year: occurred_at.year(),
        }
    }
}
