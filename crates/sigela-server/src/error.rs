//! API error types with JSON responses.
//!
//! Every failure becomes `{"error": <message>, "code": <CODE>}`. Collaborator
//! and internal failures are logged in full and answered with a generic
//! message.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use sigela_store::StoreError;

/// Generic message returned for collaborator failures.
pub const STORE_FAILURE_MESSAGE: &str = "DB error";
/// Generic message returned for internal failures.
pub const INTERNAL_FAILURE_MESSAGE: &str = "Server error";

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed input (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No, invalid or expired session; bad credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Valid session or identity without the required standing (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity absent (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Persistence collaborator error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Store(StoreError::ReservationNotFound(_)) => "NOT_FOUND",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(e) => match e {
                StoreError::ReservationNotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message shown to the client.
    pub fn client_message(&self) -> String {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m) => m.clone(),
            Self::Internal(_) => INTERNAL_FAILURE_MESSAGE.to_string(),
            Self::Store(StoreError::ReservationNotFound(_)) => "Not found".to_string(),
            Self::Store(_) => STORE_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "request failed");
        } else {
            tracing::debug!(error = %self, code = self.code(), "request rejected");
        }

        let body = ErrorResponse {
            error: self.client_message(),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sigela_core::ReservationId;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Store(StoreError::ReservationNotFound(ReservationId(1))).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Store(StoreError::ConfigError("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_details_stay_server_side() {
        let err = ApiError::Store(StoreError::MigrationError(
            "password authentication failed for user sigela".into(),
        ));
        assert_eq!(err.client_message(), STORE_FAILURE_MESSAGE);
        assert!(err.to_string().contains("password authentication failed"));

        let err = ApiError::Internal("argon2 exploded".into());
        assert_eq!(err.client_message(), INTERNAL_FAILURE_MESSAGE);
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = ApiError::Unauthorized("Contraseña incorrecta".into());
        assert_eq!(err.client_message(), "Contraseña incorrecta");
        assert_eq!(err.code(), "UNAUTHORIZED");
    }
}
