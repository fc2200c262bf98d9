//! Role-based authorization gate.

use sigela_core::Role;

use crate::error::ApiError;

/// Message for every denial; it never names the roles that would pass.
pub const MSG_FORBIDDEN: &str = "No autorizado";

/// Permit `role` if it is one of `allowed`, otherwise a 403.
///
/// Roles are a closed enum parsed case-insensitively at the boundary, so this
/// is a plain membership test.
pub fn authorize(role: Role, allowed: &[Role]) -> Result<(), ApiError> {
    if role.is_one_of(allowed) {
        Ok(())
    } else {
        tracing::debug!(%role, "Authorization denied");
        Err(ApiError::Forbidden(MSG_FORBIDDEN.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigela_core::HANDOFF_ROLES;

    #[test]
    fn test_handoff_roles_are_permitted() {
        for role in [Role::Technician, Role::LabManager, Role::Admin] {
            assert!(authorize(role, HANDOFF_ROLES).is_ok());
        }
    }

    #[test]
    fn test_other_roles_are_denied_generically() {
        for role in [Role::Student, Role::Professor, Role::Department] {
            let err = authorize(role, HANDOFF_ROLES).unwrap_err();
            assert_eq!(err.client_message(), MSG_FORBIDDEN);
            assert!(!err.client_message().contains("TECHNICIAN"));
        }
    }

    #[test]
    fn test_empty_allow_list_denies_everyone() {
        for role in Role::ALL {
            assert!(authorize(role, &[]).is_err());
        }
    }
}
