//! Route definitions for the HTTP API.
//!
//! Everything is mounted under `/api`.

pub mod auth;
pub mod health;
pub mod me;
pub mod notifications;
pub mod reservations;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Body of operations that only acknowledge success.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(me::routes())
        .merge(notifications::routes())
        .merge(reservations::routes());

    Router::new().nest("/api", api).with_state(state)
}
