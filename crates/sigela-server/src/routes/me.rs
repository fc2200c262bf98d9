//! Reservations of the caller: upcoming and history.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sigela_store::{HistoryRange, Reservation};

use crate::error::{ApiError, ApiResult};
use crate::extract::SessionUser;
use crate::state::AppState;

/// Size of the upcoming list shown on the dashboard.
pub const UPCOMING_LIMIT: u32 = 5;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl HistoryQuery {
    fn range(&self) -> ApiResult<HistoryRange> {
        Ok(HistoryRange {
            from: parse_instant("from", self.from.as_deref())?,
            to: parse_instant("to", self.to.as_deref())?,
        })
    }
}

/// Parse an optional RFC 3339 timestamp; blank means absent.
fn parse_instant(name: &str, raw: Option<&str>) -> ApiResult<Option<DateTime<Utc>>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|at| Some(at.with_timezone(&Utc)))
            .map_err(|_| ApiError::BadRequest(format!("Invalid {}: expected an RFC 3339 timestamp", name))),
    }
}

/// GET /api/me/upcoming
async fn upcoming(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
) -> ApiResult<Json<Vec<Reservation>>> {
    let reservations = state
        .reservations()
        .upcoming_for_user(session.id, UPCOMING_LIMIT)
        .await?;
    Ok(Json(reservations))
}

/// GET /api/me/history?from=&to=
async fn history(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Reservation>>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let range = query.range()?;
    let reservations = state
        .reservations()
        .history_for_user(session.id, range)
        .await?;
    Ok(Json(reservations))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me/upcoming", get(upcoming))
        .route("/me/history", get(history))
}
