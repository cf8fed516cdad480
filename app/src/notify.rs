//! Transient user-facing status messages.
//!
//! Every recorded hand-over, failed operation or unknown token surfaces as a
//! short-lived notice. Notices expire after a fixed TTL; expiry is driven by
//! the injected clock so it is testable without sleeping.

use chrono::{DateTime, Duration, Utc};
use llavero_core::environment::Clock;
use std::sync::{Arc, Mutex};

/// How long a notice stays visible.
const NOTICE_TTL_SECONDS: i64 = 3;

/// Visual weight of a notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Operation succeeded
    Success,
    /// Operation failed; the message says what to do
    Error,
    /// Neutral information (e.g. rescan prompt)
    Info,
}

/// One transient status message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Message text, ready to display
    pub text: String,
    /// Visual weight
    pub level: NoticeLevel,
    /// When the notice was posted
    pub posted_at: DateTime<Utc>,
}

/// Holds the currently visible notices and prunes expired ones.
pub struct NoticeBoard {
    clock: Arc<dyn Clock>,
    notices: Mutex<Vec<Notice>>,
}

impl NoticeBoard {
    /// Creates an empty board over the given clock.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            notices: Mutex::new(Vec::new()),
        }
    }

    /// Posts a notice; it stays active for the TTL.
    pub fn post(&self, level: NoticeLevel, text: impl Into<String>) {
        let notice = Notice {
            text: text.into(),
            level,
            posted_at: self.clock.now(),
        };
        tracing::debug!(text = %notice.text, "notice posted");
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        self.notices.lock().unwrap().push(notice);
    }

    /// The notices still within their TTL, oldest first. Expired notices are
    /// dropped as a side effect.
    #[must_use]
    pub fn active(&self) -> Vec<Notice> {
        let cutoff = self.clock.now() - Duration::seconds(NOTICE_TTL_SECONDS);
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        let mut notices = self.notices.lock().unwrap();
        notices.retain(|n| n.posted_at > cutoff);
        notices.clone()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock the test can move forward by hand.
    struct ManualClock {
        base: DateTime<Utc>,
        offset_seconds: AtomicI64,
    }

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                base: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
                offset_seconds: AtomicI64::new(0),
            })
        }

        fn advance(&self, seconds: i64) {
            self.offset_seconds.fetch_add(seconds, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.base + Duration::seconds(self.offset_seconds.load(Ordering::SeqCst))
        }
    }

    #[test]
    fn notices_expire_after_ttl() {
        let clock = ManualClock::new();
        let board = NoticeBoard::new(Arc::clone(&clock) as Arc<dyn Clock>);

        board.post(NoticeLevel::Success, "Entrega de llave registrada");
        assert_eq!(board.active().len(), 1);

        clock.advance(2);
        board.post(NoticeLevel::Info, "Segundo aviso");
        assert_eq!(board.active().len(), 2);

        clock.advance(2);
        // First notice is now 4s old, second 2s old.
        let active = board.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].text, "Segundo aviso");
    }
}
