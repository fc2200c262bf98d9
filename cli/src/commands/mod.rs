//! Command implementations and the helpers they share.

pub mod auth;
pub mod hash_password;
pub mod notifications;
pub mod reservations;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};

/// Name of the session cookie set by the server.
pub const SESSION_COOKIE: &str = "sigela_token";

/// Errors reported by the server or the transport.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{message} (HTTP {status}, {code})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("unexpected response (HTTP {status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("not logged in: run `sigela login` and export SIGELA_TOKEN")]
    NoSession,
}

/// Error body returned by the server.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: String,
}

/// Types that can print themselves for humans.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Build an HTTP client that sends the session cookie, if any.
pub fn build_client(token: Option<&str>) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        let value = HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, token))?;
        headers.insert(COOKIE, value);
    }
    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}

/// Send a request and decode the JSON body, turning error bodies into
/// [`CliError::Api`].
pub async fn make_request<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    decode(response).await
}

/// Decode a response already received.
pub async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(|_| {
            CliError::UnexpectedResponse {
                status: status.as_u16(),
                body: body.clone(),
            }
            .into()
        });
    }

    Err(match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => CliError::Api {
            status: status.as_u16(),
            code: err.code,
            message: err.error,
        },
        Err(_) => CliError::UnexpectedResponse {
            status: status.as_u16(),
            body,
        },
    }
    .into())
}

/// Print `value` as pretty JSON, or formatted for humans.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Format a timestamp in local time.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Shorten `text` to at most `max` characters.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
