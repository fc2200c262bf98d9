//! Notification routes, all scoped to the caller.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use sigela_core::{NotificationId, NotificationKind};
use sigela_store::Notification;

use crate::error::{ApiError, ApiResult};
use crate::extract::SessionUser;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `1` selects unread notifications only.
    pub unread: Option<String>,
    pub top: Option<String>,
}

impl ListQuery {
    fn only_unread(&self) -> bool {
        self.unread.as_deref().map(str::trim) == Some("1")
    }

    /// Requested page size. Out-of-range numbers are clamped later;
    /// anything that is not an integer is rejected.
    fn top(&self) -> ApiResult<Option<u32>> {
        match self.top.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => {
                let top: i64 = raw
                    .parse()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid top: {:?}", raw)))?;
                Ok(Some(u32::try_from(top.max(0)).unwrap_or(u32::MAX)))
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateNotificationRequest {
    pub title: String,
    pub message: String,
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateNotificationResponse {
    pub id: NotificationId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MarkReadRequest {
    pub id: Option<NotificationId>,
    pub all: bool,
}

#[derive(Debug, Serialize)]
pub struct UnreadResponse {
    pub unread: u32,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/me/notifications?unread=1&top=N
async fn list_notifications(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Notification>>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let top = query.top()?;
    let notifications = state
        .notifications()
        .list(session.id, query.only_unread(), top)
        .await?;
    Ok(Json(notifications))
}

/// POST /api/me/notifications
async fn create_notification(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
    body: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> ApiResult<Json<CreateNotificationResponse>> {
    let Json(request) = body?;
    let kind = match request.kind.as_deref().map(str::trim) {
        None | Some("") => NotificationKind::default(),
        Some(code) => code
            .parse::<NotificationKind>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
    };

    let id = state
        .notifications()
        .create(session.id, &request.title, &request.message, kind)
        .await?;
    Ok(Json(CreateNotificationResponse { id }))
}

/// POST /api/me/notifications/mark-read - `all` wins over `id`.
async fn mark_read(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
    body: Result<Json<MarkReadRequest>, JsonRejection>,
) -> ApiResult<Json<UnreadResponse>> {
    let Json(request) = body?;
    let notifications = state.notifications();

    let unread = match (request.all, request.id) {
        (true, _) => notifications.mark_all_read(session.id).await?,
        (false, Some(id)) => notifications.mark_read(session.id, id).await?,
        (false, None) => return Err(ApiError::BadRequest("Missing id or all".to_string())),
    };
    Ok(Json(UnreadResponse { unread }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/me/notifications",
            get(list_notifications).post(create_notification),
        )
        .route("/me/notifications/mark-read", post(mark_read))
}
