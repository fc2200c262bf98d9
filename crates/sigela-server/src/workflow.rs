//! Reservation handoff workflow.
//!
//! Delivery and return are gated on [`HANDOFF_ROLES`]. Authorization happens
//! before any collaborator call. The collaborator owns the source-state check
//! and the atomic update; the workflow passes the ids through unchanged and
//! checks that the audit record it gets back names the right reservation,
//! the right actor and a forward transition.

use std::sync::Arc;

use sigela_core::{HANDOFF_ROLES, ReservationId, Transition};
use sigela_store::{ReservationStore, TransitionRecord};

use crate::authz::authorize;
use crate::error::{ApiError, ApiResult};
use crate::session::SessionClaims;

/// Drives the delivered/returned transitions.
#[derive(Clone)]
pub struct ReservationWorkflow {
    store: Arc<dyn ReservationStore>,
}

impl ReservationWorkflow {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    /// Hand an approved reservation to its requester.
    pub async fn deliver(
        &self,
        actor: &SessionClaims,
        reservation_id: ReservationId,
    ) -> ApiResult<Option<TransitionRecord>> {
        self.apply(Transition::Deliver, actor, reservation_id).await
    }

    /// Receive a delivered reservation back.
    pub async fn return_reservation(
        &self,
        actor: &SessionClaims,
        reservation_id: ReservationId,
    ) -> ApiResult<Option<TransitionRecord>> {
        self.apply(Transition::Return, actor, reservation_id).await
    }

    async fn apply(
        &self,
        transition: Transition,
        actor: &SessionClaims,
        reservation_id: ReservationId,
    ) -> ApiResult<Option<TransitionRecord>> {
        authorize(actor.role, HANDOFF_ROLES)?;

        let result = match transition {
            Transition::Deliver => self.store.deliver(reservation_id, actor.id).await,
            Transition::Return => self.store.return_reservation(reservation_id, actor.id).await,
        };

        let record = result.inspect_err(|e| {
            tracing::error!(
                %reservation_id,
                actor_id = %actor.id,
                %transition,
                error = %e,
                "Reservation transition failed"
            );
        })?;

        if let Some(record) = &record {
            check_record(transition, actor, reservation_id, record)?;
        }

        tracing::info!(
            %reservation_id,
            actor_id = %actor.id,
            %transition,
            "Reservation transition recorded"
        );
        Ok(record)
    }
}

/// Reject an audit record that does not describe the transition requested.
fn check_record(
    transition: Transition,
    actor: &SessionClaims,
    reservation_id: ReservationId,
    record: &TransitionRecord,
) -> ApiResult<()> {
    let problem = if record.reservation_id != reservation_id {
        Some(format!(
            "record is for reservation {}, expected {}",
            record.reservation_id, reservation_id
        ))
    } else if record.actor_id != actor.id {
        Some(format!(
            "record names actor {}, expected {}",
            record.actor_id, actor.id
        ))
    } else if record.status != transition.target()
        || !record.previous_status.can_transition_to(record.status)
    {
        Some(format!(
            "record moves {} -> {}, expected {} -> {}",
            record.previous_status,
            record.status,
            transition.source(),
            transition.target()
        ))
    } else {
        None
    };

    match problem {
        Some(detail) => Err(ApiError::Internal(format!(
            "{} of reservation {} returned an inconsistent record: {}",
            transition, reservation_id, detail
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use chrono::Utc;
    use sigela_core::{ReservationStatus, Role, UserId};
    use sigela_store::{HistoryRange, Reservation, StoreResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Collaborator that counts calls and answers with a canned record.
    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
        forged_actor: Option<UserId>,
    }

    impl CountingStore {
        fn record(&self, t: Transition, id: ReservationId, actor: UserId) -> TransitionRecord {
            TransitionRecord {
                reservation_id: id,
                transition: t,
                previous_status: t.source(),
                status: t.target(),
                actor_id: self.forged_actor.unwrap_or(actor),
                at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl ReservationStore for CountingStore {
        async fn deliver(
            &self,
            id: ReservationId,
            by: UserId,
        ) -> StoreResult<Option<TransitionRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(self.record(Transition::Deliver, id, by)))
        }

        async fn return_reservation(
            &self,
            id: ReservationId,
            by: UserId,
        ) -> StoreResult<Option<TransitionRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(self.record(Transition::Return, id, by)))
        }

        async fn upcoming_for_user(&self, _: UserId, _: u32) -> StoreResult<Vec<Reservation>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }

        async fn history_for_user(
            &self,
            _: UserId,
            _: HistoryRange,
        ) -> StoreResult<Vec<Reservation>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
    }

    fn actor(role: Role) -> SessionClaims {
        SessionClaims {
            id: UserId(9),
            username: "someone".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_unauthorized_roles_never_reach_the_store() {
        let store = Arc::new(CountingStore::default());
        let workflow = ReservationWorkflow::new(store.clone());

        for role in [Role::Student, Role::Professor, Role::Department] {
            let err = workflow
                .deliver(&actor(role), ReservationId(42))
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

            let err = workflow
                .return_reservation(&actor(role), ReservationId(42))
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        }

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_authorized_roles_pass_ids_through() {
        let store = Arc::new(CountingStore::default());
        let workflow = ReservationWorkflow::new(store.clone());

        for role in [Role::Technician, Role::LabManager, Role::Admin] {
            let record = workflow
                .deliver(&actor(role), ReservationId(42))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(record.reservation_id, ReservationId(42));
            assert_eq!(record.actor_id, UserId(9));
            assert_eq!(record.status, ReservationStatus::Delivered);
        }

        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_record_with_wrong_actor_is_rejected() {
        let store = Arc::new(CountingStore {
            forged_actor: Some(UserId(1)),
            ..Default::default()
        });
        let workflow = ReservationWorkflow::new(store);

        let err = workflow
            .return_reservation(&actor(Role::Admin), ReservationId(7))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_backwards_record_is_rejected() {
        let record = TransitionRecord {
            reservation_id: ReservationId(1),
            transition: Transition::Deliver,
            previous_status: ReservationStatus::Returned,
            status: ReservationStatus::Delivered,
            actor_id: UserId(9),
            at: Utc::now(),
        };
        assert!(
            check_record(
                Transition::Deliver,
                &actor(Role::Technician),
                ReservationId(1),
                &record
            )
            .is_err()
        );
    }
}
