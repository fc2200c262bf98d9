//! LOGIN, ME and LOGOUT commands.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use reqwest::header::SET_COOKIE;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, SESSION_COOKIE, decode, make_request, output};

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Username
    pub username: String,

    /// Password (prefer the environment variable over the command line)
    #[arg(long, env = "SIGELA_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Role to log in as (e.g. estudiante, tecnico, ADMIN)
    #[arg(long)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub active: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UserResponse {
    pub user: User,
}

fn print_user(user: &User) {
    println!("  {} {}", "User:".cyan(), user.username.bold());
    println!("  {} {}", "ID:".cyan(), user.id);
    println!("  {} {}", "Role:".cyan(), user.role);
    let status = if user.active {
        "active".green()
    } else {
        "inactive".red()
    };
    println!("  {} {}", "Status:".cyan(), status);
}

impl HumanReadable for UserResponse {
    fn print_human(&self) {
        print_user(&self.user);
    }
}

/// Login result: the identity plus the session token for later commands.
#[derive(Debug, Serialize)]
pub struct LoginOutput {
    pub user: User,
    pub token: String,
}

impl HumanReadable for LoginOutput {
    fn print_human(&self) {
        println!("{}", "Logged in".green().bold());
        println!();
        print_user(&self.user);
        println!();
        println!("  {}", "Use the session in later commands with:".dimmed());
        println!("  export SIGELA_TOKEN={}", self.token);
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl HumanReadable for OkResponse {
    fn print_human(&self) {
        println!("{}", "Logged out".green().bold());
        println!("  {}", "Run `unset SIGELA_TOKEN` to forget the token locally.".dimmed());
    }
}

/// Pull the session token out of a `Set-Cookie` header value.
fn session_token(set_cookie: &str) -> Option<&str> {
    let pair = set_cookie.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
}

/// Execute the login command.
pub async fn login(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: LoginArgs,
) -> Result<()> {
    let url = format!("{}/api/auth/login", base_url);
    let response = client
        .post(&url)
        .json(&LoginRequest {
            username: &args.username,
            password: &args.password,
            role: args.role.as_deref(),
        })
        .send()
        .await?;

    let token = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(session_token)
        .map(str::to_string);

    let body: UserResponse = decode(response).await?;
    let token = token.context("server did not set a session cookie")?;

    output(
        &LoginOutput {
            user: body.user,
            token,
        },
        human,
    )
}

/// Execute the me command.
pub async fn me(client: &reqwest::Client, base_url: &str, human: bool) -> Result<()> {
    let url = format!("{}/api/auth/me", base_url);
    let response: UserResponse = make_request(client.get(&url)).await?;
    output(&response, human)
}

/// Execute the logout command.
pub async fn logout(client: &reqwest::Client, base_url: &str, human: bool) -> Result<()> {
    let url = format!("{}/api/auth/logout", base_url);
    let response: OkResponse = make_request(client.post(&url)).await?;
    output(&response, human)
}
