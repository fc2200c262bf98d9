//! sigela-server: HTTP API server for the SIGELA laboratory reservation service
//!
//! This crate provides:
//! - Credential verification against the identity store
//! - Signed session tokens carried in an HTTP-only cookie
//! - A role-based authorization gate
//! - The reservation handoff workflow (deliver, return)
//! - The notification subsystem
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Per-request panic isolation
//! - Request tracing and logging
//! - Request ID generation
//! - CORS handling
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sigela_server::{AppState, ServerConfig, app};
//! use sigela_store::MemoryStore;
//!
//! let config = ServerConfig::from_env()?;
//! let state = AppState::new(Arc::new(MemoryStore::new()), config);
//! let router = app(state)?;
//! ```

pub mod auth;
pub mod authz;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod notifications;
pub mod routes;
pub mod session;
pub mod state;
pub mod workflow;

use std::any::Any;

use axum::{
    Json, Router,
    http::{HeaderValue, Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{ErrorResponse, INTERNAL_FAILURE_MESSAGE};
use crate::middleware::request_id::{propagate_request_id, request_id_layer, request_id_of};

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use sigela_core;
pub use sigela_store;

/// Build the application: routes plus the middleware stack.
pub fn app(state: AppState) -> Result<Router, ConfigError> {
    let origins = state.config().cors_allowed_origins.clone();
    with_middleware(routes::build_router(state), &origins)
}

/// Wrap `router` in the middleware stack used by [`app`].
pub fn with_middleware(
    router: Router,
    cors_allowed_origins: &str,
) -> Result<Router, ConfigError> {
    let cors = build_cors_layer(cors_allowed_origins)?;

    Ok(router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum::middleware::from_fn(propagate_request_id))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<axum::body::Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id_of(request),
                )
            }),
        )
        .layer(request_id_layer())
        .layer(cors))
}

/// Turn a handler panic into a 500 JSON response.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: INTERNAL_FAILURE_MESSAGE.to_string(),
            code: "INTERNAL_ERROR",
        }),
    )
        .into_response()
}

/// Build CORS layer from configuration.
///
/// Credentials (the session cookie) are only allowed for explicit origins.
fn build_cors_layer(allowed_origins: &str) -> Result<CorsLayer, ConfigError> {
    if allowed_origins.trim() == "*" {
        return Ok(CorsLayer::new()
            .allow_origin(AnyOrigin)
            .allow_methods(AnyOrigin)
            .allow_headers(AnyOrigin));
    }

    let origins = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<HeaderValue>().map_err(|_| ConfigError::InvalidValue {
                name: "CORS_ALLOWED_ORIGINS".to_string(),
                reason: format!("invalid origin {:?}", s),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}
