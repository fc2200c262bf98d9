//! Core data types for the reservation service.
//!
//! Identifiers are the integer keys assigned by the persistence layer; the
//! newtypes keep a reservation id from being passed where a user id is
//! expected. The reservation lifecycle and notification kinds are closed
//! enumerations with string codes matching the stored values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

// ============================================================================
// ID Types
// ============================================================================

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            /// Returns the inner integer key.
            #[must_use]
            pub const fn get(&self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

integer_id!(
    /// Identifier of a user identity.
    UserId
);

integer_id!(
    /// Identifier of a reservation.
    ReservationId
);

integer_id!(
    /// Identifier of a notification.
    NotificationId
);

// ============================================================================
// Reservation Lifecycle
// ============================================================================

/// Status of a reservation.
///
/// ```text
/// PENDING -> APPROVED -> DELIVERED -> RETURNED
///    \          \
///     `----------`--> REJECTED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Delivered,
    Returned,
    Rejected,
}

impl ReservationStatus {
    /// Stored code for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Delivered => "DELIVERED",
            Self::Returned => "RETURNED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Transitions only move forward; nothing leaves `RETURNED` or `REJECTED`.
    #[must_use]
    pub const fn can_transition_to(&self, next: ReservationStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::Rejected)
                | (Self::Approved, Self::Delivered)
                | (Self::Delivered, Self::Returned)
        )
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Returned | Self::Rejected)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [
            Self::Pending,
            Self::Approved,
            Self::Delivered,
            Self::Returned,
            Self::Rejected,
        ]
        .into_iter()
        .find(|status| status.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| UnknownCode::new("reservation status", s))
    }
}

/// A role-gated physical handoff applied to a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// The resource is handed to the requester.
    Deliver,
    /// The resource comes back from the requester.
    Return,
}

impl Transition {
    /// Status a reservation must be in for this transition to apply.
    #[must_use]
    pub const fn source(&self) -> ReservationStatus {
        match self {
            Self::Deliver => ReservationStatus::Approved,
            Self::Return => ReservationStatus::Delivered,
        }
    }

    /// Status a reservation reaches once the transition is applied.
    #[must_use]
    pub const fn target(&self) -> ReservationStatus {
        match self {
            Self::Deliver => ReservationStatus::Delivered,
            Self::Return => ReservationStatus::Returned,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deliver => "deliver",
            Self::Return => "return",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Severity of a notification, used by the dashboards for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warn,
    Error,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [Self::Info, Self::Success, Self::Warn, Self::Error]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCode::new("notification kind", s))
    }
}

/// Error for a string code that names no variant of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCode {
    /// What was being parsed.
    pub what: &'static str,
    /// The offending input.
    pub code: String,
}

impl UnknownCode {
    fn new(what: &'static str, code: &str) -> Self {
        Self {
            what,
            code: code.to_string(),
        }
    }
}

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.what, self.code)
    }
}

impl std::error::Error for UnknownCode {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display_fromstr() {
        let id: ReservationId = "42".parse().unwrap();
        assert_eq!(id, ReservationId(42));
        assert_eq!(id.to_string(), "42");
        assert!("forty-two".parse::<ReservationId>().is_err());
    }

    #[test]
    fn id_serializes_as_plain_integer() {
        assert_eq!(serde_json::to_string(&UserId(7)).unwrap(), "7");
        let parsed: NotificationId = serde_json::from_str("12").unwrap();
        assert_eq!(parsed.get(), 12);
    }

    #[test]
    fn lifecycle_moves_forward_only() {
        use ReservationStatus::*;

        assert!(Pending.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Delivered));
        assert!(Delivered.can_transition_to(Returned));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Rejected));

        assert!(!Delivered.can_transition_to(Approved));
        assert!(!Returned.can_transition_to(Delivered));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Delivered.can_transition_to(Delivered));
        assert!(!Rejected.can_transition_to(Approved));
    }

    #[test]
    fn terminal_statuses() {
        assert!(ReservationStatus::Returned.is_terminal());
        assert!(ReservationStatus::Rejected.is_terminal());
        assert!(!ReservationStatus::Delivered.is_terminal());
    }

    #[test]
    fn transitions_follow_lifecycle() {
        for t in [Transition::Deliver, Transition::Return] {
            assert!(t.source().can_transition_to(t.target()));
        }
        assert_eq!(Transition::Deliver.target(), ReservationStatus::Delivered);
        assert_eq!(Transition::Return.source(), ReservationStatus::Delivered);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(
            "delivered".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Delivered
        );
        let err = "lost".parse::<ReservationStatus>().unwrap_err();
        assert_eq!(err.what, "reservation status");
    }

    #[test]
    fn notification_kind_defaults_to_info() {
        assert_eq!(NotificationKind::default(), NotificationKind::Info);
        assert_eq!(
            "warn".parse::<NotificationKind>().unwrap(),
            NotificationKind::Warn
        );
        assert!("FATAL".parse::<NotificationKind>().is_err());
        assert_eq!(
            serde_json::to_string(&NotificationKind::Success).unwrap(),
            "\"SUCCESS\""
        );
    }
}
