//! In-memory implementation of the collaborator traits.
//!
//! Mirrors the semantics of the stored functions (scoped mark-read,
//! newest-first listing, forward-only transitions) so the server can run
//! without a database. Every trait call is counted per operation name.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sigela_core::{
    NotificationId, NotificationKind, ReservationId, ReservationStatus, Role, Transition, UserId,
};
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::models::*;
use crate::repository::{IdentityStore, NotificationStore, ReservationStore};

#[derive(Debug, Clone)]
struct UserRecord {
    credentials: StoredCredentials,
}

#[derive(Debug, Clone)]
struct ReservationRecord {
    reservation: Reservation,
    delivered_by: Option<(UserId, DateTime<Utc>)>,
    returned_by: Option<(UserId, DateTime<Utc>)>,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<UserRecord>,
    reservations: Vec<ReservationRecord>,
    notifications: Vec<Notification>,
    next_id: i32,
    calls: HashMap<&'static str, usize>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn count(&mut self, operation: &'static str) {
        *self.calls.entry(operation).or_default() += 1;
    }

    fn unread(&self, owner_id: UserId) -> u32 {
        let n = self
            .notifications
            .iter()
            .filter(|n| n.owner_id == owner_id && n.is_unread())
            .count();
        u32::try_from(n).unwrap_or(u32::MAX)
    }
}

/// Audit fields of a reservation held by a [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoffAudit {
    pub status: ReservationStatus,
    pub delivered_by: Option<UserId>,
    pub returned_by: Option<UserId>,
}

/// In-memory persistence collaborator.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Seeding ====================

    /// Add an identity. `password_hash` must be an Argon2 PHC string.
    pub async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
        active: bool,
    ) -> UserId {
        let mut t = self.tables.lock().await;
        let id = UserId(t.next_id());
        t.users.push(UserRecord {
            credentials: StoredCredentials {
                id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                role,
                active,
            },
        });
        id
    }

    /// Add a reservation in the given status.
    pub async fn insert_reservation(
        &self,
        requester_id: UserId,
        resource_name: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        status: ReservationStatus,
    ) -> ReservationId {
        let mut t = self.tables.lock().await;
        let id = ReservationId(t.next_id());
        let resource_id = t.next_id();
        t.reservations.push(ReservationRecord {
            reservation: Reservation {
                id,
                resource_id,
                resource_name: resource_name.to_string(),
                requester_id,
                start_time,
                end_time,
                status,
            },
            delivered_by: None,
            returned_by: None,
        });
        id
    }

    /// Add a notification with an explicit creation time.
    pub async fn insert_notification_at(
        &self,
        notification: NewNotification,
        created_at: DateTime<Utc>,
        read_at: Option<DateTime<Utc>>,
    ) -> NotificationId {
        let mut t = self.tables.lock().await;
        let id = NotificationId(t.next_id());
        t.notifications.push(Notification {
            id,
            owner_id: notification.owner_id,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            created_at,
            read_at,
        });
        id
    }

    /// Populate a small demo dataset: one identity per role (usernames are
    /// the lowercase canonical role names, plus `ana` as a student), an
    /// approved and a delivered reservation for `ana`, and a welcome
    /// notification.
    pub async fn seed_demo(&self, password_hash: &str) {
        let now = Utc::now();
        let ana = self
            .insert_user("ana", password_hash, Role::Student, true)
            .await;
        for role in Role::ALL {
            self.insert_user(&role.as_str().to_lowercase(), password_hash, role, true)
                .await;
        }
        self.insert_reservation(
            ana,
            "Osciloscopio Tektronix",
            now + Duration::hours(2),
            now + Duration::hours(4),
            ReservationStatus::Approved,
        )
        .await;
        self.insert_reservation(
            ana,
            "Microscopio óptico",
            now - Duration::hours(1),
            now + Duration::hours(1),
            ReservationStatus::Delivered,
        )
        .await;
        self.insert_notification_at(
            NewNotification {
                owner_id: ana,
                title: "Bienvenida".to_string(),
                message: "Tu cuenta está lista para reservar.".to_string(),
                kind: NotificationKind::Info,
            },
            now,
            None,
        )
        .await;
    }

    // ==================== Inspection ====================

    /// Number of trait calls made for `operation` (the stored function name).
    pub async fn call_count(&self, operation: &str) -> usize {
        self.tables
            .lock()
            .await
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Total number of trait calls.
    pub async fn total_calls(&self) -> usize {
        self.tables.lock().await.calls.values().sum()
    }

    pub async fn notification(&self, id: NotificationId) -> Option<Notification> {
        self.tables
            .lock()
            .await
            .notifications
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    pub async fn handoff_audit(&self, id: ReservationId) -> Option<HandoffAudit> {
        self.tables
            .lock()
            .await
            .reservations
            .iter()
            .find(|r| r.reservation.id == id)
            .map(|r| HandoffAudit {
                status: r.reservation.status,
                delivered_by: r.delivered_by.map(|(u, _)| u),
                returned_by: r.returned_by.map(|(u, _)| u),
            })
    }

    async fn transition(
        &self,
        operation: &'static str,
        transition: Transition,
        reservation_id: ReservationId,
        actor: UserId,
    ) -> StoreResult<Option<TransitionRecord>> {
        let mut t = self.tables.lock().await;
        t.count(operation);

        let record = t
            .reservations
            .iter_mut()
            .find(|r| r.reservation.id == reservation_id)
            .ok_or(StoreError::ReservationNotFound(reservation_id))?;

        let previous = record.reservation.status;
        if previous != transition.source() || !previous.can_transition_to(transition.target()) {
            return Err(StoreError::IllegalTransition {
                reservation_id,
                transition,
                detail: format!(
                    "reservation {} is {}, expected {}",
                    reservation_id,
                    previous,
                    transition.source()
                ),
            });
        }

        let at = Utc::now();
        record.reservation.status = transition.target();
        match transition {
            Transition::Deliver => record.delivered_by = Some((actor, at)),
            Transition::Return => record.returned_by = Some((actor, at)),
        }

        Ok(Some(TransitionRecord {
            reservation_id,
            transition,
            previous_status: previous,
            status: transition.target(),
            actor_id: actor,
            at,
        }))
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn lookup_credentials(
        &self,
        username: &str,
        role: Option<Role>,
    ) -> StoreResult<CredentialLookup> {
        let mut t = self.tables.lock().await;
        t.count("auth_get_user_by_username_role");

        let user = t
            .users
            .iter()
            .find(|u| u.credentials.username == username)
            .filter(|u| role.is_none_or(|r| r == u.credentials.role));

        Ok(match user {
            None => CredentialLookup {
                code: LookupCode::NotFoundOrRoleMismatch,
                credentials: None,
            },
            Some(u) if !u.credentials.active => CredentialLookup {
                code: LookupCode::Inactive,
                credentials: None,
            },
            Some(u) => CredentialLookup {
                code: LookupCode::Found,
                credentials: Some(u.credentials.clone()),
            },
        })
    }

    async fn find_identity(&self, id: UserId) -> StoreResult<Option<Identity>> {
        let mut t = self.tables.lock().await;
        t.count("get_user_by_id");
        Ok(t
            .users
            .iter()
            .find(|u| u.credentials.id == id)
            .map(|u| u.credentials.identity()))
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn deliver(
        &self,
        reservation_id: ReservationId,
        delivered_by: UserId,
    ) -> StoreResult<Option<TransitionRecord>> {
        self.transition(
            "reservation_deliver",
            Transition::Deliver,
            reservation_id,
            delivered_by,
        )
        .await
    }

    async fn return_reservation(
        &self,
        reservation_id: ReservationId,
        returned_by: UserId,
    ) -> StoreResult<Option<TransitionRecord>> {
        self.transition(
            "reservation_return",
            Transition::Return,
            reservation_id,
            returned_by,
        )
        .await
    }

    async fn upcoming_for_user(&self, user_id: UserId, top: u32) -> StoreResult<Vec<Reservation>> {
        let mut t = self.tables.lock().await;
        t.count("reservations_upcoming_by_user");
        let now = Utc::now();

        let mut rows: Vec<Reservation> = t
            .reservations
            .iter()
            .map(|r| &r.reservation)
            .filter(|r| r.requester_id == user_id && r.end_time >= now && !r.status.is_terminal())
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.start_time, r.id));
        rows.truncate(top as usize);
        Ok(rows)
    }

    async fn history_for_user(
        &self,
        user_id: UserId,
        range: HistoryRange,
    ) -> StoreResult<Vec<Reservation>> {
        let mut t = self.tables.lock().await;
        t.count("reservations_history_by_user");
        let now = Utc::now();

        let mut rows: Vec<Reservation> = t
            .reservations
            .iter()
            .map(|r| &r.reservation)
            .filter(|r| r.requester_id == user_id)
            .filter(|r| r.end_time < now || r.status.is_terminal())
            .filter(|r| range.contains(r.start_time))
            .cloned()
            .collect();
        rows.sort_by_key(|r| std::cmp::Reverse((r.start_time, r.id)));
        Ok(rows)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn list_notifications(
        &self,
        owner_id: UserId,
        only_unread: bool,
        limit: u32,
    ) -> StoreResult<Vec<Notification>> {
        let mut t = self.tables.lock().await;
        t.count("notifications_list_by_user");

        let mut rows: Vec<Notification> = t
            .notifications
            .iter()
            .filter(|n| n.owner_id == owner_id && (!only_unread || n.is_unread()))
            .cloned()
            .collect();
        rows.sort_by_key(|n| std::cmp::Reverse((n.created_at, n.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<NotificationId> {
        let mut t = self.tables.lock().await;
        t.count("notifications_create");
        let id = NotificationId(t.next_id());
        t.notifications.push(Notification {
            id,
            owner_id: notification.owner_id,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            created_at: Utc::now(),
            read_at: None,
        });
        Ok(id)
    }

    async fn mark_read(&self, owner_id: UserId, id: NotificationId) -> StoreResult<u32> {
        let mut t = self.tables.lock().await;
        t.count("notifications_mark_read");
        let now = Utc::now();
        if let Some(n) = t
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.owner_id == owner_id && n.is_unread())
        {
            n.read_at = Some(now);
        }
        Ok(t.unread(owner_id))
    }

    async fn mark_all_read(&self, owner_id: UserId) -> StoreResult<u32> {
        let mut t = self.tables.lock().await;
        t.count("notifications_mark_read");
        let now = Utc::now();
        for n in t
            .notifications
            .iter_mut()
            .filter(|n| n.owner_id == owner_id && n.is_unread())
        {
            n.read_at = Some(now);
        }
        Ok(t.unread(owner_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(owner_id: UserId, title: &str) -> NewNotification {
        NewNotification {
            owner_id,
            title: title.to_string(),
            message: "body".to_string(),
            kind: NotificationKind::Info,
        }
    }

    #[tokio::test]
    async fn lookup_codes() {
        let store = MemoryStore::new();
        store.insert_user("ana", "h", Role::Student, true).await;
        store.insert_user("old", "h", Role::Technician, false).await;

        let found = store.lookup_credentials("ana", None).await.unwrap();
        assert_eq!(found.code, LookupCode::Found);

        let found_with_role = store
            .lookup_credentials("ana", Some(Role::Student))
            .await
            .unwrap();
        assert_eq!(found_with_role.code, LookupCode::Found);

        let mismatch = store
            .lookup_credentials("ana", Some(Role::Admin))
            .await
            .unwrap();
        assert_eq!(mismatch.code, LookupCode::NotFoundOrRoleMismatch);

        let missing = store.lookup_credentials("nobody", None).await.unwrap();
        assert_eq!(missing.code, LookupCode::NotFoundOrRoleMismatch);

        let inactive = store.lookup_credentials("old", None).await.unwrap();
        assert_eq!(inactive.code, LookupCode::Inactive);
        assert!(inactive.credentials.is_none());
    }

    #[tokio::test]
    async fn deliver_then_return_records_actors() {
        let store = MemoryStore::new();
        let ana = store.insert_user("ana", "h", Role::Student, true).await;
        let tech = store.insert_user("tech", "h", Role::Technician, true).await;
        let boss = store.insert_user("boss", "h", Role::LabManager, true).await;
        let now = Utc::now();
        let id = store
            .insert_reservation(
                ana,
                "Centrífuga",
                now,
                now + Duration::hours(1),
                ReservationStatus::Approved,
            )
            .await;

        let delivered = store.deliver(id, tech).await.unwrap().unwrap();
        assert_eq!(delivered.previous_status, ReservationStatus::Approved);
        assert_eq!(delivered.status, ReservationStatus::Delivered);
        assert_eq!(delivered.actor_id, tech);

        let returned = store.return_reservation(id, boss).await.unwrap().unwrap();
        assert_eq!(returned.status, ReservationStatus::Returned);

        let audit = store.handoff_audit(id).await.unwrap();
        assert_eq!(audit.delivered_by, Some(tech));
        assert_eq!(audit.returned_by, Some(boss));
    }

    #[tokio::test]
    async fn transitions_are_monotonic() {
        let store = MemoryStore::new();
        let ana = store.insert_user("ana", "h", Role::Student, true).await;
        let now = Utc::now();
        let id = store
            .insert_reservation(
                ana,
                "Balanza",
                now,
                now + Duration::hours(1),
                ReservationStatus::Approved,
            )
            .await;

        assert!(matches!(
            store.return_reservation(id, ana).await,
            Err(StoreError::IllegalTransition { .. })
        ));
        store.deliver(id, ana).await.unwrap();
        assert!(matches!(
            store.deliver(id, ana).await,
            Err(StoreError::IllegalTransition { .. })
        ));
        assert!(matches!(
            store.deliver(ReservationId(999), ana).await,
            Err(StoreError::ReservationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn notifications_are_listed_newest_first() {
        let store = MemoryStore::new();
        let owner = UserId(1);
        let base = Utc::now();
        for i in 0..4 {
            store
                .insert_notification_at(
                    note(owner, &format!("n{}", i)),
                    base + Duration::minutes(i),
                    None,
                )
                .await;
        }

        let rows = store.list_notifications(owner, false, 3).await.unwrap();
        let titles: Vec<_> = rows.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["n3", "n2", "n1"]);
    }

    #[tokio::test]
    async fn mark_read_ignores_foreign_notifications() {
        let store = MemoryStore::new();
        let owner = UserId(1);
        let other = UserId(2);
        let id = store
            .insert_notification_at(note(owner, "mine"), Utc::now(), None)
            .await;
        store
            .insert_notification_at(note(other, "theirs"), Utc::now(), None)
            .await;

        let unread = store.mark_read(other, id).await.unwrap();
        assert_eq!(unread, 1);
        assert!(store.notification(id).await.unwrap().read_at.is_none());

        let unread = store.mark_read(owner, id).await.unwrap();
        assert_eq!(unread, 0);
        assert!(store.notification(id).await.unwrap().read_at.is_some());
    }

    #[tokio::test]
    async fn mark_all_read_is_idempotent() {
        let store = MemoryStore::new();
        let owner = UserId(1);
        for i in 0..3 {
            store
                .create_notification(note(owner, &format!("n{}", i)))
                .await
                .unwrap();
        }

        assert_eq!(store.mark_all_read(owner).await.unwrap(), 0);
        let first: Vec<_> = store
            .list_notifications(owner, false, 20)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.read_at)
            .collect();

        assert_eq!(store.mark_all_read(owner).await.unwrap(), 0);
        let second: Vec<_> = store
            .list_notifications(owner, false, 20)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.read_at)
            .collect();

        assert_eq!(first, second);
        assert!(
            store
                .list_notifications(owner, true, 20)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn calls_are_counted() {
        let store = MemoryStore::new();
        assert_eq!(store.total_calls().await, 0);
        store.mark_all_read(UserId(1)).await.unwrap();
        store.find_identity(UserId(1)).await.unwrap();
        assert_eq!(store.call_count("notifications_mark_read").await, 1);
        assert_eq!(store.call_count("get_user_by_id").await, 1);
        assert_eq!(store.total_calls().await, 2);
    }

    #[tokio::test]
    async fn demo_seed_has_every_role() {
        let store = MemoryStore::new();
        store.seed_demo("hash").await;
        for role in Role::ALL {
            let lookup = store
                .lookup_credentials(&role.as_str().to_lowercase(), Some(role))
                .await
                .unwrap();
            assert_eq!(lookup.code, LookupCode::Found);
        }
    }
}
