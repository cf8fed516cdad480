//! Usage recording service.
//!
//! The imperative shell around the ledger: it checks that an operator is
//! available, turns scan resolutions into appends, guards the irreversible
//! delete behind an explicit confirmation token, and posts the transient
//! notices the operator sees. All domain decisions stay in `llavero-core`;
//! this module only wires collaborators together.

use crate::notify::{NoticeBoard, NoticeLevel};
use llavero_core::environment::{ActorProvider, Clock};
use llavero_core::event::{EventId, UsageEvent};
use llavero_core::export::{export_file_name, to_delimited_text};
use llavero_core::ledger::{EventLedger, LedgerError};
use llavero_core::member::Member;
use llavero_core::resolver::Resolution;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the usage service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The session bootstrap has not produced an operator yet; ledger
    /// mutations are disabled until it does.
    #[error("ledger operations are disabled until an operator is available")]
    OperationsDisabled,

    /// The ledger rejected or failed the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Proof that the operator confirmed an irreversible action.
///
/// Deletion has no undo, so the UI boundary must ask first; requiring this
/// token makes "forgot to ask" a compile error rather than a code review
/// finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Confirmed;

/// A ready-to-save export artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvExport {
    /// Deterministic, date-stamped file name
    pub file_name: String,
    /// Delimited text contents
    pub contents: String,
}

/// Coordinates ledger mutations, operator identity and notices.
pub struct UsageService {
    ledger: Arc<dyn EventLedger>,
    actors: Arc<dyn ActorProvider>,
    clock: Arc<dyn Clock>,
    notices: NoticeBoard,
}

impl UsageService {
    /// Wires the service over its collaborators.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn EventLedger>,
        actors: Arc<dyn ActorProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let notices = NoticeBoard::new(Arc::clone(&clock));
        Self {
            ledger,
            actors,
            clock,
            notices,
        }
    }

    /// The notice board views render from.
    #[must_use]
    pub const fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Records that `member` took the key, credited to the current operator.
    ///
    /// Fire-and-forget from the operator's point of view: the outcome is
    /// reported as a notice either way, and a failed append is never retried
    /// automatically — the operation is safe to re-issue by hand.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::OperationsDisabled`]: no operator yet
    /// - [`ServiceError::Ledger`]: the append failed
    pub async fn record_usage(&self, member: &Member) -> Result<UsageEvent, ServiceError> {
        let actor = self
            .actors
            .current_actor()
            .ok_or(ServiceError::OperationsDisabled)?;

        match self.ledger.append(member.id.clone(), actor).await {
            Ok(event) => {
                self.notices.post(
                    NoticeLevel::Success,
                    format!("Entrega de llave registrada para: {}", member.display_name),
                );
                Ok(event)
            }
            Err(error) => {
                tracing::error!(%error, member = %member.id, "failed to record usage");
                self.notices
                    .post(NoticeLevel::Error, "Error al registrar la entrega");
                Err(error.into())
            }
        }
    }

    /// Handles the outcome of a scan.
    ///
    /// A resolved member is recorded; an unresolved token posts a rescan
    /// prompt and records nothing, leaving the scan session free to retry.
    ///
    /// # Errors
    ///
    /// Same as [`record_usage`](Self::record_usage) for the resolved case.
    pub async fn record_scan(
        &self,
        resolution: Resolution,
    ) -> Result<Option<UsageEvent>, ServiceError> {
        match resolution {
            Resolution::Member(member) => Ok(Some(self.record_usage(&member).await?)),
            Resolution::Unresolved { raw_id } => {
                self.notices.post(
                    NoticeLevel::Info,
                    format!("Usuario no encontrado (ID: {raw_id}). Vuelve a escanear."),
                );
                Ok(None)
            }
        }
    }

    /// Deletes a usage record. Irreversible; the caller must have asked the
    /// operator first, which the [`Confirmed`] token attests.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::OperationsDisabled`]: no operator yet
    /// - [`ServiceError::Ledger`]: unknown id ([`LedgerError::NotFound`]) or
    ///   transport failure
    pub async fn delete_event(
        &self,
        event_id: EventId,
        _confirmed: Confirmed,
    ) -> Result<(), ServiceError> {
        if self.actors.current_actor().is_none() {
            return Err(ServiceError::OperationsDisabled);
        }

        match self.ledger.remove(event_id.clone()).await {
            Ok(()) => {
                self.notices.post(NoticeLevel::Success, "Registro eliminado");
                Ok(())
            }
            Err(error) => {
                tracing::error!(%error, event = %event_id, "failed to delete usage record");
                self.notices
                    .post(NoticeLevel::Error, "No se pudo eliminar el registro");
                Err(error.into())
            }
        }
    }

    /// Formats the given snapshot as the downloadable spreadsheet artifact,
    /// named after today's date.
    #[must_use]
    pub fn export_csv(&self, events: &[UsageEvent]) -> CsvExport {
        CsvExport {
            file_name: export_file_name(self.clock.now().date_naive()),
            contents: to_delimited_text(events),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

    use super::*;
    use llavero_core::member::{MemberId, MemberRegistry};
    use llavero_core::resolver::resolve;
    use llavero_testing::mocks::{FixedActor, SteppingClock};
    use llavero_testing::InMemoryLedger;

    fn service_with(actors: FixedActor) -> (Arc<InMemoryLedger>, UsageService) {
        let registry = MemberRegistry::default_community();
        let clock = Arc::new(SteppingClock::from_test_epoch());
        let ledger = Arc::new(InMemoryLedger::new(registry, Arc::clone(&clock) as _));
        let service = UsageService::new(
            Arc::clone(&ledger) as Arc<dyn EventLedger>,
            Arc::new(actors),
            clock,
        );
        (ledger, service)
    }

    fn japa() -> Member {
        MemberRegistry::default_community()
            .find("vecino_03")
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn record_usage_snapshots_name_and_posts_notice() {
        let (ledger, service) = service_with(FixedActor::named("op-1"));

        let event = service.record_usage(&japa()).await.unwrap();
        assert_eq!(event.member_id, MemberId::new("vecino_03"));
        assert_eq!(event.member_name_snapshot, "Japa");
        assert_eq!(event.recorded_by.as_str(), "op-1");

        assert_eq!(ledger.snapshot().await.len(), 1);
        let notices = service.notices().active();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].text.contains("Japa"));
    }

    #[tokio::test]
    async fn no_actor_disables_ledger_operations() {
        let (ledger, service) = service_with(FixedActor::missing());

        let error = service.record_usage(&japa()).await.unwrap_err();
        assert!(matches!(error, ServiceError::OperationsDisabled));
        assert!(ledger.snapshot().await.is_empty());

        let error = service
            .delete_event(EventId::new("whatever"), Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(error, ServiceError::OperationsDisabled));
    }

    #[tokio::test]
    async fn unresolved_scan_records_nothing_and_prompts_rescan() {
        let (ledger, service) = service_with(FixedActor::named("op-1"));
        let registry = MemberRegistry::default_community();

        let outcome = service
            .record_scan(resolve(&registry, "vecino_99"))
            .await
            .unwrap();
        assert!(outcome.is_none());
        assert!(ledger.snapshot().await.is_empty());

        let notices = service.notices().active();
        assert!(notices[0].text.contains("vecino_99"));
    }

    #[tokio::test]
    async fn resolved_scan_is_recorded() {
        let (ledger, service) = service_with(FixedActor::named("op-1"));
        let registry = MemberRegistry::default_community();

        let outcome = service
            .record_scan(resolve(&registry, r#"{"id":"vecino_03"}"#))
            .await
            .unwrap();
        assert_eq!(
            outcome.map(|e| e.member_name_snapshot),
            Some("Japa".to_string())
        );
        assert_eq!(ledger.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn delete_requires_existing_event() {
        let (_ledger, service) = service_with(FixedActor::named("op-1"));

        let error = service
            .delete_event(EventId::new("missing"), Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            ServiceError::Ledger(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn transport_failure_posts_error_notice_and_is_reissuable() {
        let (ledger, service) = service_with(FixedActor::named("op-1"));
        ledger.fail_next_operation();

        let error = service.record_usage(&japa()).await.unwrap_err();
        assert!(matches!(
            error,
            ServiceError::Ledger(LedgerError::Transport(_))
        ));
        assert!(
            service
                .notices()
                .active()
                .iter()
                .any(|n| n.level == NoticeLevel::Error)
        );

        // Not retried automatically, but safe to re-issue.
        service.record_usage(&japa()).await.unwrap();
        assert_eq!(ledger.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn export_is_date_stamped_and_parseable() {
        let (ledger, service) = service_with(FixedActor::named("op-1"));
        service.record_usage(&japa()).await.unwrap();

        let export = service.export_csv(&ledger.snapshot().await);
        assert!(export.file_name.starts_with("registro_llave_2026-01-01"));
        assert_eq!(export.contents.lines().count(), 2);
    }
}
