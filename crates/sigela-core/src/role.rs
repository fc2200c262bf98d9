//! Identity roles.
//!
//! Roles reach the service in three spellings: the codes the login screen
//! sends (`tecnico`), the codes stored alongside each identity (`TECNICO`),
//! and the canonical names used on the wire (`TECHNICIAN`). All of them are
//! resolved through [`ROLE_CODES`], case-insensitively, into one closed enum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Professor,
    Technician,
    LabManager,
    Admin,
    Department,
}

/// Roles allowed to perform the physical handoff transitions
/// (delivering and receiving back reserved resources).
pub const HANDOFF_ROLES: &[Role] = &[Role::Technician, Role::LabManager, Role::Admin];

/// Every accepted spelling of every role.
///
/// Lookups are case-insensitive, so each alias appears once.
const ROLE_CODES: &[(&str, Role)] = &[
    // canonical
    ("STUDENT", Role::Student),
    ("PROFESSOR", Role::Professor),
    ("TECHNICIAN", Role::Technician),
    ("LAB_MANAGER", Role::LabManager),
    ("ADMIN", Role::Admin),
    ("DEPARTMENT", Role::Department),
    // stored codes
    ("ESTUDIANTE", Role::Student),
    ("PROF", Role::Professor),
    ("PROFESOR", Role::Professor),
    ("TECNICO", Role::Technician),
    ("ENCARGADO", Role::LabManager),
    ("DEPARTAMENTO", Role::Department),
    // login screen
    ("ADMINISTRADOR", Role::Admin),
];

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Role; 6] = [
        Role::Student,
        Role::Professor,
        Role::Technician,
        Role::LabManager,
        Role::Admin,
        Role::Department,
    ];

    /// Canonical wire name (`LAB_MANAGER`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Professor => "PROFESSOR",
            Self::Technician => "TECHNICIAN",
            Self::LabManager => "LAB_MANAGER",
            Self::Admin => "ADMIN",
            Self::Department => "DEPARTMENT",
        }
    }

    /// Code under which the role is stored next to each identity.
    #[must_use]
    pub const fn store_code(&self) -> &'static str {
        match self {
            Self::Student => "ESTUDIANTE",
            Self::Professor => "PROF",
            Self::Technician => "TECNICO",
            Self::LabManager => "ENCARGADO",
            Self::Admin => "ADMIN",
            Self::Department => "DEPARTAMENTO",
        }
    }

    /// Resolve any accepted spelling, ignoring case and surrounding whitespace.
    pub fn from_code(code: &str) -> Result<Self, RoleParseError> {
        let code = code.trim();
        ROLE_CODES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(code))
            .map(|(_, role)| *role)
            .ok_or_else(|| RoleParseError(code.to_string()))
    }

    /// Whether this role appears in `allowed`.
    #[must_use]
    pub fn is_one_of(&self, allowed: &[Role]) -> bool {
        allowed.contains(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

/// Error returned for a role code outside the mapping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleParseError(pub String);

impl fmt::Display for RoleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role code: {:?}", self.0)
    }
}

impl std::error::Error for RoleParseError {}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_code(&s).map_err(serde::de::Error::custom)
    }
}
