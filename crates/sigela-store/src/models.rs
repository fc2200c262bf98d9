//! Values exchanged with the persistence collaborator.
//!
//! These are domain-typed: role, status and kind codes are already parsed
//! into the closed enumerations of sigela-core. The raw database rows live
//! next to the PostgreSQL implementation and are converted on the way out.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sigela_core::{
    NotificationId, NotificationKind, ReservationId, ReservationStatus, Role, Transition, UserId,
};
use std::fmt;

// ==================== Identities ====================

/// Result code of a credential lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupCode {
    /// The identity exists, is active and (if a role was given) holds it.
    Found,
    /// No identity with that username, or it does not hold the requested role.
    NotFoundOrRoleMismatch,
    /// The identity exists but is deactivated.
    Inactive,
}

impl LookupCode {
    /// Decode the integer result code returned by the stored function.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Found),
            1 => Some(Self::NotFoundOrRoleMismatch),
            2 => Some(Self::Inactive),
            _ => None,
        }
    }

    pub const fn code(&self) -> i32 {
        match self {
            Self::Found => 0,
            Self::NotFoundOrRoleMismatch => 1,
            Self::Inactive => 2,
        }
    }
}

/// Stored credentials for one identity. Never serialized.
#[derive(Clone)]
pub struct StoredCredentials {
    pub id: UserId,
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
}

impl StoredCredentials {
    /// The identity without its password hash.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            active: self.active,
        }
    }
}

impl fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

/// Outcome of looking up credentials by username and optional role.
#[derive(Debug, Clone)]
pub struct CredentialLookup {
    pub code: LookupCode,
    /// Present when `code` is [`LookupCode::Found`], unless the collaborator
    /// breaks its contract.
    pub credentials: Option<StoredCredentials>,
}

/// Public view of an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub active: bool,
}

// ==================== Reservations ====================

/// A booking of a laboratory resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub resource_id: i32,
    pub resource_name: String,
    pub requester_id: UserId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
}

/// Audit record of a delivery or return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    pub reservation_id: ReservationId,
    pub transition: Transition,
    pub previous_status: ReservationStatus,
    pub status: ReservationStatus,
    /// Identity that performed the handoff.
    pub actor_id: UserId,
    pub at: DateTime<Utc>,
}

/// Optional time window for reservation history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl HistoryRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}

// ==================== Notifications ====================

/// A message addressed to one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub owner_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }
}

/// Input for creating a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub owner_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn lookup_codes_roundtrip() {
        for code in [
            LookupCode::Found,
            LookupCode::NotFoundOrRoleMismatch,
            LookupCode::Inactive,
        ] {
            assert_eq!(LookupCode::from_code(code.code()), Some(code));
        }
        assert_eq!(LookupCode::from_code(7), None);
    }

    #[test]
    fn credentials_debug_hides_hash() {
        let creds = StoredCredentials {
            id: UserId(1),
            username: "ana".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Student,
            active: true,
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("ana"));
        assert!(!debug.contains("argon2id"));
    }

    #[test]
    fn identity_serializes_without_password() {
        let creds = StoredCredentials {
            id: UserId(3),
            username: "tech".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Technician,
            active: true,
        };
        let json = serde_json::to_value(creds.identity()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 3, "username": "tech", "role": "TECHNICIAN", "active": true})
        );
    }

    #[test]
    fn history_range_bounds_are_inclusive() {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
        let range = HistoryRange {
            from: Some(from),
            to: Some(to),
        };
        assert!(range.contains(from));
        assert!(range.contains(to));
        assert!(!range.contains(to + chrono::Duration::seconds(1)));
        assert!(HistoryRange::default().contains(from));
    }
}
