//! Command-line client for the SIGELA reservation service.
//!
//! Commands:
//! - hash-password: Produce an Argon2 hash for seeding identities
//! - login / me / logout: Manage the session
//! - upcoming / history: Your reservations
//! - notifications: List, create and mark-read notifications
//! - deliver / return: Record reservation handoffs (staff roles)
//!
//! Configuration via environment:
//! - SIGELA_URL: Base URL of the server (default: http://localhost:3000)
//! - SIGELA_TOKEN: Session token printed by `sigela login`

mod commands;

use clap::{Parser, Subcommand};

use commands::{
    CliError,
    auth::LoginArgs,
    hash_password::HashPasswordArgs,
    notifications::NotificationsArgs,
    reservations::{HandoffArgs, HistoryArgs},
};

/// SIGELA CLI
///
/// JSON output by default; --human for formatted output.
#[derive(Parser)]
#[command(name = "sigela")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Server URL
    #[arg(
        long,
        env = "SIGELA_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    url: String,

    /// Session token
    #[arg(long, env = "SIGELA_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a password for seeding an identity
    HashPassword(HashPasswordArgs),

    /// Log in and print a session token
    Login(LoginArgs),

    /// Show the logged-in identity
    Me,

    /// Clear the session cookie
    Logout,

    /// Your next reservations
    Upcoming,

    /// Your past reservations
    History(HistoryArgs),

    /// Manage your notifications
    Notifications(NotificationsArgs),

    /// Hand a reservation to its requester
    Deliver(HandoffArgs),

    /// Receive a reservation back
    Return(HandoffArgs),
}

impl Commands {
    fn needs_session(&self) -> bool {
        !matches!(self, Self::HashPassword(_) | Self::Login(_) | Self::Logout)
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.command.needs_session() && cli.token.as_deref().is_none_or(str::is_empty) {
        return Err(CliError::NoSession.into());
    }

    let client = commands::build_client(cli.token.as_deref())?;
    let url = cli.url.trim_end_matches('/');
    let human = cli.human;

    match cli.command {
        Commands::HashPassword(args) => commands::hash_password::execute(args),
        Commands::Login(args) => commands::auth::login(&client, url, human, args).await,
        Commands::Me => commands::auth::me(&client, url, human).await,
        Commands::Logout => commands::auth::logout(&client, url, human).await,
        Commands::Upcoming => commands::reservations::upcoming(&client, url, human).await,
        Commands::History(args) => {
            commands::reservations::history(&client, url, human, args).await
        }
        Commands::Notifications(args) => {
            commands::notifications::execute(&client, url, human, args).await
        }
        Commands::Deliver(args) => {
            commands::reservations::deliver(&client, url, human, args).await
        }
        Commands::Return(args) => {
            commands::reservations::return_reservation(&client, url, human, args).await
        }
    }
}
