//! Health check endpoint.

use axum::{Json, Router, routing::get};

use super::OkResponse;
use crate::state::AppState;

/// GET /health - Health check endpoint.
async fn health_check() -> Json<OkResponse> {
    Json(OkResponse::ok())
}

/// Build health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
