//! Ambient dependencies injected at the edges.
//!
//! Time and operator identity are the two environmental inputs the domain
//! logic needs. Both live behind small traits so production wires the real
//! system clock and session identity while tests substitute deterministic
//! values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source of the current wall-clock time.
///
/// Dyn-compatible so it can be shared as `Arc<dyn Clock>` across services.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Opaque identifier of the operator running the station.
///
/// Distinct from [`MemberId`](crate::member::MemberId): the actor is who
/// recorded an event, not who the event is about.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(String);

impl ActorId {
    /// Create a new `ActorId` from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the actor ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of the current operator identity.
///
/// Session bootstrap is asynchronous in deployments, so the actor may be
/// absent for a while after startup. Ledger mutations are disabled until one
/// is available.
pub trait ActorProvider: Send + Sync {
    /// The operator currently signed in, if bootstrap has completed.
    fn current_actor(&self) -> Option<ActorId>;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

    use super::*;

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn actor_id_display_roundtrip() {
        let id = ActorId::new("op-1");
        assert_eq!(format!("{id}"), "op-1");
        assert_eq!(id.as_str(), "op-1");
    }
}
