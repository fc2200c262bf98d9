//! Session tokens: issuing, validating and carrying them in a cookie.
//!
//! A session is an HS256 JWT holding `{id, username, role}` plus `iat`/`exp`.
//! It travels in an HTTP-only, `SameSite=Lax` cookie. Logout only clears the
//! cookie; there is no server-side revocation list, so a token copied out of
//! the cookie jar stays valid until it expires.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sigela_core::{Role, UserId};

use crate::config::{MAX_SESSION_TTL_HOURS, ServerConfig};
use crate::error::ApiError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sigela_token";

/// Identity claims embedded in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

/// Full JWT payload.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    #[serde(flatten)]
    session: SessionClaims,
    /// Issued at (unix timestamp).
    iat: u64,
    /// Expiration time (unix timestamp).
    exp: u64,
}

/// Why a request carries no usable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("No session")]
    NoSession,
    #[error("Invalid session")]
    InvalidSession,
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// Signs and verifies session tokens, and builds the session cookie.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    secure_cookie: bool,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: Duration, secure_cookie: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            secure_cookie,
        }
    }

    /// Keys for `config`. The lifetime is capped at [`MAX_SESSION_TTL_HOURS`]
    /// for configs built without `from_env`.
    pub fn from_config(config: &ServerConfig) -> Self {
        let hours = config.session_ttl_hours.min(MAX_SESSION_TTL_HOURS);
        let ttl = i64::try_from(hours)
            .ok()
            .and_then(Duration::try_hours)
            .unwrap_or_else(|| Duration::days(7));
        Self::new(&config.jwt_secret, ttl, config.cookie_secure)
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a signed token for `claims`, expiring one TTL from now.
    pub fn issue(&self, claims: &SessionClaims) -> Result<String, ApiError> {
        self.issue_at(claims, Utc::now())
    }

    /// Create a signed token as if issued at `now`.
    pub fn issue_at(&self, claims: &SessionClaims, now: DateTime<Utc>) -> Result<String, ApiError> {
        let iat = unix_seconds(now);
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| ApiError::Internal("Session expiry out of range".to_string()))?;
        let exp = unix_seconds(expires);
        let payload = TokenClaims {
            session: claims.clone(),
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify signature and expiry and return the embedded claims.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, SessionError> {
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.session)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                SessionError::InvalidSession
            })
    }

    /// Cookie carrying `token`.
    pub fn cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .path("/")
            .max_age(time::Duration::seconds(self.ttl.num_seconds()))
            .build()
    }

    /// Expired, empty cookie with the session cookie's attributes. Adding it
    /// to a jar clears the session on the client even when the request
    /// carried no cookie.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .path("/")
            .max_age(time::Duration::ZERO)
            .expires(time::OffsetDateTime::UNIX_EPOCH)
            .build()
    }
}

fn unix_seconds(at: DateTime<Utc>) -> u64 {
    u64::try_from(at.timestamp()).unwrap_or(0)
}
