//! Error types for the storage layer.

use sigela_core::{ReservationId, Transition};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Connection(#[from] sqlx::Error),

    /// A call did not complete within the configured timeout.
    #[error("{operation} timed out after {elapsed:?}")]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },

    /// Reservation not found.
    #[error("reservation not found: {0}")]
    ReservationNotFound(ReservationId),

    /// The reservation is not in the source state required by the transition.
    #[error("cannot {transition} reservation {reservation_id}: {detail}")]
    IllegalTransition {
        reservation_id: ReservationId,
        transition: Transition,
        detail: String,
    },

    /// The collaborator answered with a shape that breaks its contract.
    #[error("unexpected response from {operation}: {detail}")]
    UnexpectedShape {
        operation: &'static str,
        detail: String,
    },

    /// Migration error.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    pub(crate) fn unexpected(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            operation,
            detail: detail.into(),
        }
    }
}
