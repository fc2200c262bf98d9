//! Authentication routes: login, logout, me.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use sigela_core::Role;
use sigela_store::Identity;

use super::OkResponse;
use crate::auth::{MSG_MISSING_CREDENTIALS, verify_credentials};
use crate::error::{ApiError, ApiResult};
use crate::extract::SessionUser;
use crate::session::SessionClaims;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    /// UI, stored or canonical role code; blank means "any role".
    pub role: Option<String>,
}

impl LoginRequest {
    fn role(&self) -> ApiResult<Option<Role>> {
        match self.role.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(code) => Role::from_code(code)
                .map(Some)
                .map_err(|e| ApiError::BadRequest(e.to_string())),
        }
    }
}

/// `{user}` body of login and me.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: Identity,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<UserResponse>)> {
    let Json(request) = body?;
    let role = request.role()?;
    let (Some(username), Some(password)) = (request.username.as_deref(), request.password.as_deref())
    else {
        return Err(ApiError::BadRequest(MSG_MISSING_CREDENTIALS.to_string()));
    };

    let identity = verify_credentials(state.identities(), username.trim(), password, role).await?;

    let sessions = state.sessions();
    let token = sessions.issue(&SessionClaims {
        id: identity.id,
        username: identity.username.clone(),
        role: identity.role,
    })?;

    tracing::info!(user_id = %identity.id, username = %identity.username, role = %identity.role, "User logged in");

    Ok((jar.add(sessions.cookie(token)), Json(UserResponse { user: identity })))
}

/// POST /api/auth/logout - clears the cookie; no session required.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<OkResponse>) {
    (
        jar.add(state.sessions().removal_cookie()),
        Json(OkResponse::ok()),
    )
}

/// GET /api/auth/me - current identity, re-read from the store.
async fn me(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
) -> ApiResult<Json<UserResponse>> {
    let identity = state
        .identities()
        .find_identity(session.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))?;

    Ok(Json(UserResponse { user: identity }))
}

/// Build auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}
