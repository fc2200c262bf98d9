//! Credential verification and password hashing.
//!
//! Stored passwords are Argon2 PHC strings. Verification runs on the blocking
//! pool so a slow hash never stalls other in-flight requests.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sigela_core::Role;
use sigela_store::{IdentityStore, Identity, LookupCode, StoreError};

use crate::error::{ApiError, ApiResult};

pub const MSG_MISSING_CREDENTIALS: &str = "Missing credentials";
pub const MSG_UNKNOWN_USER_OR_ROLE: &str = "Usuario o rol incorrecto";
pub const MSG_INACTIVE: &str = "Usuario inactivo";
pub const MSG_WRONG_PASSWORD: &str = "Contraseña incorrecta";

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(password_hash.to_string())
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// [`verify_password`] on the blocking thread pool.
async fn verify_password_off_thread(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Password verification task failed: {}", e)))?
}

/// Check a username/password pair, optionally bound to a role.
///
/// Outcomes:
/// - unknown user or role mismatch: 401
/// - inactive identity: 403, whatever the password
/// - wrong password: 401
/// - success code without a row: 500
pub async fn verify_credentials(
    store: &dyn IdentityStore,
    username: &str,
    password: &str,
    role: Option<Role>,
) -> ApiResult<Identity> {
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(MSG_MISSING_CREDENTIALS.to_string()));
    }

    let lookup = store.lookup_credentials(username, role).await?;

    let credentials = match lookup.code {
        LookupCode::NotFoundOrRoleMismatch => {
            return Err(ApiError::Unauthorized(MSG_UNKNOWN_USER_OR_ROLE.to_string()));
        }
        LookupCode::Inactive => return Err(ApiError::Forbidden(MSG_INACTIVE.to_string())),
        LookupCode::Found => lookup.credentials.ok_or_else(|| {
            StoreError::UnexpectedShape {
                operation: "auth_get_user_by_username_role",
                detail: "success code without a row".to_string(),
            }
        })?,
    };

    // An inactive row under a success code is still inactive.
    if !credentials.active {
        return Err(ApiError::Forbidden(MSG_INACTIVE.to_string()));
    }

    let identity = credentials.identity();
    if !verify_password_off_thread(password.to_string(), credentials.password_hash).await? {
        tracing::info!(username = %identity.username, "Rejected login: wrong password");
        return Err(ApiError::Unauthorized(MSG_WRONG_PASSWORD.to_string()));
    }

    Ok(identity)
}
