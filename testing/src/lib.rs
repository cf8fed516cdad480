//! # Llavero Testing
//!
//! Test doubles and the in-memory ledger for the llavero architecture.
//!
//! This crate provides:
//! - [`InMemoryLedger`]: full [`EventLedger`](llavero_core::ledger::EventLedger)
//!   implementation with live subscriptions and fault injection
//! - [`ScriptedCamera`]: camera capture double scripted per facing
//! - [`mocks`]: deterministic clocks and a fixed actor provider
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use llavero_core::environment::ActorId;
//! use llavero_core::ledger::EventLedger;
//! use llavero_core::member::{MemberId, MemberRegistry};
//! use llavero_testing::{mocks::test_clock, InMemoryLedger};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ledger = InMemoryLedger::new(
//!     MemberRegistry::default_community(),
//!     Arc::new(test_clock()),
//! );
//! let event = ledger
//!     .append(MemberId::new("vecino_03"), ActorId::new("op-1"))
//!     .await
//!     .unwrap();
//! assert_eq!(event.member_name_snapshot, "Japa");
//! # }
//! ```

/// In-memory event ledger implementation.
pub mod ledger;

/// Scripted camera capture double.
pub mod camera;

/// Mock implementations of environment traits.
pub mod mocks {
    use chrono::{DateTime, Duration, Utc};
    use llavero_core::environment::{ActorId, ActorProvider, Clock};
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use llavero_testing::mocks::FixedClock;
    /// use llavero_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances one second per call, for tests that need distinct
    /// `occurred_at` values with a deterministic order.
    #[derive(Debug)]
    pub struct SteppingClock {
        base: DateTime<Utc>,
        ticks: AtomicI64,
    }

    impl SteppingClock {
        /// Starts stepping from the given instant.
        #[must_use]
        pub const fn new(base: DateTime<Utc>) -> Self {
            Self {
                base,
                ticks: AtomicI64::new(0),
            }
        }

        /// Starts stepping from the shared test epoch.
        #[must_use]
        pub fn from_test_epoch() -> Self {
            Self::new(test_clock().now())
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
            self.base + Duration::seconds(tick)
        }
    }

    /// Actor provider with a fixed answer.
    ///
    /// `FixedActor::named("op-1")` models a completed session bootstrap;
    /// `FixedActor::missing()` models "no actor yet", under which ledger
    /// operations must be treated as disabled.
    #[derive(Debug, Clone)]
    pub struct FixedActor {
        actor: Option<ActorId>,
    }

    impl FixedActor {
        /// A bootstrap that produced the given operator.
        #[must_use]
        pub fn named(id: impl Into<String>) -> Self {
            Self {
                actor: Some(ActorId::new(id)),
            }
        }

        /// A bootstrap that has not completed.
        #[must_use]
        pub const fn missing() -> Self {
            Self { actor: None }
        }
    }

    impl ActorProvider for FixedActor {
        fn current_actor(&self) -> Option<ActorId> {
            self.actor.clone()
        }
    }

    /// Create a default fixed clock for tests (2026-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use camera::{ScriptedCamera, ScriptedFrames};
pub use ledger::InMemoryLedger;
pub use mocks::{FixedActor, FixedClock, SteppingClock, test_clock};

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

    use super::*;
    use llavero_core::environment::{ActorProvider, Clock};

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn stepping_clock_is_strictly_increasing() {
        let clock = SteppingClock::from_test_epoch();
        let t1 = clock.now();
        let t2 = clock.now();
        assert!(t2 > t1);
    }

    #[test]
    fn fixed_actor_models_both_bootstrap_states() {
        assert!(FixedActor::named("op-1").current_actor().is_some());
        assert!(FixedActor::missing().current_actor().is_none());
    }
}
