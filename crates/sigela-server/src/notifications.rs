//! Notification subsystem.
//!
//! Every operation is scoped to the owner taken from the session. Input is
//! validated here so nothing malformed reaches the collaborator.

use std::sync::Arc;

use sigela_core::{NotificationId, NotificationKind, UserId};
use sigela_store::{NewNotification, Notification, NotificationStore};

use crate::error::{ApiError, ApiResult};

/// Page size when the caller does not ask for one.
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest page a caller can ask for.
pub const MAX_LIMIT: u32 = 100;
/// Maximum title length, in characters.
pub const TITLE_MAX: usize = 150;
/// Maximum message length, in characters.
pub const MESSAGE_MAX: usize = 1000;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(requested: Option<u32>) -> u32 {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Notifications of `owner`, newest first.
    pub async fn list(
        &self,
        owner: UserId,
        only_unread: bool,
        limit: Option<u32>,
    ) -> ApiResult<Vec<Notification>> {
        let limit = clamp_limit(limit);
        Ok(self
            .store
            .list_notifications(owner, only_unread, limit)
            .await?)
    }

    /// Create a notification addressed to `owner`.
    pub async fn create(
        &self,
        owner: UserId,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> ApiResult<NotificationId> {
        let title = require_text("title", title, TITLE_MAX)?;
        let message = require_text("message", message, MESSAGE_MAX)?;

        let id = self
            .store
            .create_notification(NewNotification {
                owner_id: owner,
                title,
                message,
                kind,
            })
            .await?;

        tracing::info!(owner_id = %owner, notification_id = %id, %kind, "Notification created");
        Ok(id)
    }

    /// Mark one notification read. Someone else's id is a silent no-op.
    pub async fn mark_read(&self, owner: UserId, id: NotificationId) -> ApiResult<u32> {
        let unread = self.store.mark_read(owner, id).await?;
        tracing::debug!(owner_id = %owner, notification_id = %id, unread, "Marked notification read");
        Ok(unread)
    }

    /// Mark every notification of `owner` read.
    pub async fn mark_all_read(&self, owner: UserId) -> ApiResult<u32> {
        let unread = self.store.mark_all_read(owner).await?;
        tracing::debug!(owner_id = %owner, unread, "Marked all notifications read");
        Ok(unread)
    }
}

fn require_text(field: &str, value: &str, max: usize) -> ApiResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("Missing {}", field)));
    }
    if value.chars().count() > max {
        return Err(ApiError::BadRequest(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use sigela_core::Role;
    use sigela_store::MemoryStore;

    async fn setup() -> (Arc<MemoryStore>, NotificationService, UserId, UserId) {
        let store = Arc::new(MemoryStore::new());
        let ana = store.insert_user("ana", "$argon2id$x", Role::Student, true).await;
        let bob = store.insert_user("bob", "$argon2id$x", Role::Student, true).await;
        let service = NotificationService::new(store.clone());
        (store, service, ana, bob)
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(5)), 5);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIMIT);
    }

    #[tokio::test]
    async fn test_create_validates_input_before_the_store() {
        let (store, service, ana, _) = setup().await;

        let err = service
            .create(ana, "  ", "body", NotificationKind::Info)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let long = "x".repeat(TITLE_MAX + 1);
        assert!(
            service
                .create(ana, &long, "body", NotificationKind::Info)
                .await
                .is_err()
        );
        let long = "ñ".repeat(MESSAGE_MAX + 1);
        assert!(
            service
                .create(ana, "title", &long, NotificationKind::Info)
                .await
                .is_err()
        );

        assert_eq!(store.total_calls().await, 0);
    }

    #[tokio::test]
    async fn test_create_then_list_newest_first() {
        let (store, service, ana, _) = setup().await;
        let base = Utc::now() - Duration::hours(1);
        for (i, title) in ["first", "second"].into_iter().enumerate() {
            store
                .insert_notification_at(
                    NewNotification {
                        owner_id: ana,
                        title: title.to_string(),
                        message: "m".to_string(),
                        kind: NotificationKind::Info,
                    },
                    base + Duration::minutes(i as i64),
                    None,
                )
                .await;
        }
        let id = service
            .create(ana, "third", "m", NotificationKind::Warn)
            .await
            .unwrap();

        let listed = service.list(ana, false, None).await.unwrap();
        let titles: Vec<_> = listed.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["third", "second", "first"]);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].kind, NotificationKind::Warn);
    }

    #[tokio::test]
    async fn test_mark_all_read_is_idempotent() {
        let (_, service, ana, _) = setup().await;
        for title in ["a", "b", "c"] {
            service
                .create(ana, title, "m", NotificationKind::Info)
                .await
                .unwrap();
        }

        assert_eq!(service.mark_all_read(ana).await.unwrap(), 0);
        assert!(service.list(ana, true, None).await.unwrap().is_empty());
        assert_eq!(service.mark_all_read(ana).await.unwrap(), 0);
        assert_eq!(service.list(ana, false, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_mark_read_of_foreign_notification_is_a_noop() {
        let (store, service, ana, bob) = setup().await;
        let bobs = service
            .create(bob, "private", "m", NotificationKind::Info)
            .await
            .unwrap();
        service
            .create(ana, "mine", "m", NotificationKind::Info)
            .await
            .unwrap();

        let unread = service.mark_read(ana, bobs).await.unwrap();
        assert_eq!(unread, 1);
        assert!(store.notification(bobs).await.unwrap().read_at.is_none());

        // Unknown ids answer the same way.
        let unread = service.mark_read(ana, NotificationId(9999)).await.unwrap();
        assert_eq!(unread, 1);
    }
}
