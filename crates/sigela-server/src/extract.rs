//! Session extraction from the session cookie.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

use crate::error::ApiError;
use crate::session::{SESSION_COOKIE, SessionClaims, SessionError};
use crate::state::AppState;

/// The validated session of the caller.
///
/// Rejects with 401 "No session" when the cookie is absent or empty, and
/// with 401 "Invalid session" when the token fails signature or expiry
/// checks. Handlers taking this extractor never run unauthenticated.
#[derive(Debug, Clone)]
pub struct SessionUser(pub SessionClaims);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar)?;
        let claims = state.sessions().validate(token)?;
        Ok(SessionUser(claims))
    }
}

fn session_token(jar: &CookieJar) -> Result<&str, SessionError> {
    match jar.get(SESSION_COOKIE).map(|c| c.value()) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(SessionError::NoSession),
    }
}
