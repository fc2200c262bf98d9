//! Reservation handoff routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use serde::Serialize;
use sigela_core::ReservationId;
use sigela_store::TransitionRecord;

use crate::error::{ApiError, ApiResult};
use crate::extract::SessionUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub ok: bool,
    /// Audit record reported by the collaborator, if any.
    pub result: Option<TransitionRecord>,
}

fn parse_reservation_id(raw: &str) -> ApiResult<ReservationId> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid reservation id: {:?}", raw)))
}

/// POST /api/reservations/{id}/deliver
///
/// 400 for a malformed id, 401 without a session, 403 for roles outside the
/// handoff set, 404 when the collaborator does not know the reservation and
/// 500 for any other collaborator failure (an illegal source state included).
async fn deliver(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
    Path(id): Path<String>,
) -> ApiResult<Json<TransitionResponse>> {
    let id = parse_reservation_id(&id)?;
    let result = state.workflow().deliver(&session, id).await?;
    Ok(Json(TransitionResponse { ok: true, result }))
}

/// POST /api/reservations/{id}/return
///
/// Same status codes as [`deliver`].
async fn return_reservation(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
    Path(id): Path<String>,
) -> ApiResult<Json<TransitionResponse>> {
    let id = parse_reservation_id(&id)?;
    let result = state.workflow().return_reservation(&session, id).await?;
    Ok(Json(TransitionResponse { ok: true, result }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reservations/{id}/deliver", post(deliver))
        .route("/reservations/{id}/return", post(return_reservation))
}
