//! Collaborator interfaces.
//!
//! The server only ever talks to persistence through these traits. Each
//! method is a single round-trip; atomicity of the underlying change is the
//! implementation's responsibility.

use async_trait::async_trait;
use sigela_core::{NotificationId, ReservationId, Role, UserId};

use crate::error::StoreResult;
use crate::models::{
    CredentialLookup, HistoryRange, Identity, NewNotification, Notification, Reservation,
    TransitionRecord,
};

/// Identity lookups.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up credentials by username, optionally requiring a role.
    async fn lookup_credentials(
        &self,
        username: &str,
        role: Option<Role>,
    ) -> StoreResult<CredentialLookup>;

    /// Fetch an identity by id.
    async fn find_identity(&self, id: UserId) -> StoreResult<Option<Identity>>;
}

/// Reservation reads and the two handoff transitions.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Mark an approved reservation as delivered, recording `delivered_by`.
    async fn deliver(
        &self,
        reservation_id: ReservationId,
        delivered_by: UserId,
    ) -> StoreResult<Option<TransitionRecord>>;

    /// Mark a delivered reservation as returned, recording `returned_by`.
    async fn return_reservation(
        &self,
        reservation_id: ReservationId,
        returned_by: UserId,
    ) -> StoreResult<Option<TransitionRecord>>;

    /// Next reservations of `user_id` that have not ended yet, soonest first.
    async fn upcoming_for_user(&self, user_id: UserId, top: u32) -> StoreResult<Vec<Reservation>>;

    /// Past reservations of `user_id` within `range`, most recent first.
    async fn history_for_user(
        &self,
        user_id: UserId,
        range: HistoryRange,
    ) -> StoreResult<Vec<Reservation>>;
}

/// Notification storage, always scoped to an owner.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Notifications of `owner_id`, newest first, at most `limit`.
    async fn list_notifications(
        &self,
        owner_id: UserId,
        only_unread: bool,
        limit: u32,
    ) -> StoreResult<Vec<Notification>>;

    /// Store a notification and return its id.
    async fn create_notification(&self, notification: NewNotification)
    -> StoreResult<NotificationId>;

    /// Mark one notification read if `owner_id` owns it; otherwise change
    /// nothing. Returns the owner's unread count either way.
    async fn mark_read(&self, owner_id: UserId, id: NotificationId) -> StoreResult<u32>;

    /// Mark every unread notification of `owner_id` read. Returns the unread
    /// count afterwards.
    async fn mark_all_read(&self, owner_id: UserId) -> StoreResult<u32>;
}
