//! sigela-core: domain types for the SIGELA laboratory reservation service
//!
//! This crate provides:
//! - Integer id newtypes for users, reservations and notifications
//! - The closed [`Role`] enumeration and its code mapping table
//! - The reservation lifecycle ([`ReservationStatus`], [`Transition`])
//! - Notification kinds
//!
//! It performs no I/O; the store and server crates build on it.

pub mod role;
pub mod types;

pub use role::{HANDOFF_ROLES, Role, RoleParseError};
pub use types::*;
