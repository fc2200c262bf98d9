//! NOTIFICATIONS command - list, create and mark-read.

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, format_timestamp, make_request, output, truncate};

/// Arguments for the notifications command.
#[derive(Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub action: NotificationsAction,
}

#[derive(Subcommand)]
pub enum NotificationsAction {
    /// List notifications, newest first
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,

        /// Maximum number of notifications (1-100)
        #[arg(long)]
        top: Option<u32>,
    },

    /// Create a notification addressed to yourself
    Create {
        /// Title (at most 150 characters)
        title: String,

        /// Message (at most 1000 characters)
        message: String,

        /// INFO, SUCCESS, WARN or ERROR
        #[arg(long)]
        kind: Option<String>,
    },

    /// Mark one notification, or all of them, as read
    MarkRead {
        /// Notification ID
        id: Option<i32>,

        /// Mark every notification read
        #[arg(long)]
        all: bool,
    },
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Notification {
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct NotificationList(pub Vec<Notification>);

impl HumanReadable for NotificationList {
    fn print_human(&self) {
        println!("{}", "Notifications".green().bold());
        println!("{}", "=".repeat(80));

        if self.0.is_empty() {
            println!("  {}", "(No notifications)".dimmed());
            return;
        }

        for n in &self.0 {
            let marker = if n.read_at.is_none() {
                "●".yellow()
            } else {
                " ".normal()
            };
            let kind = match n.kind.as_str() {
                "SUCCESS" => n.kind.green(),
                "WARN" => n.kind.yellow(),
                "ERROR" => n.kind.red(),
                _ => n.kind.cyan(),
            };
            println!("  {} #{} {} [{}]", marker, n.id, n.title.bold(), kind);
            println!("      {}", truncate(&n.message, 72));
            println!("      {}", format_timestamp(&n.created_at).dimmed());
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    title: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateResponse {
    pub id: i32,
}

impl HumanReadable for CreateResponse {
    fn print_human(&self) {
        println!("{} #{}", "Notification created".green().bold(), self.id);
    }
}

#[derive(Debug, Serialize)]
struct MarkReadRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i32>,
    all: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UnreadResponse {
    pub unread: u32,
}

impl HumanReadable for UnreadResponse {
    fn print_human(&self) {
        println!("  {} {}", "Unread:".cyan(), self.unread);
    }
}

/// Execute the notifications command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: NotificationsArgs,
) -> Result<()> {
    let url = format!("{}/api/me/notifications", base_url);

    match args.action {
        NotificationsAction::List { unread, top } => {
            let mut query = Vec::new();
            if unread {
                query.push(("unread", "1".to_string()));
            }
            if let Some(top) = top {
                query.push(("top", top.to_string()));
            }
            let list: NotificationList = make_request(client.get(&url).query(&query)).await?;
            output(&list, human)
        }
        NotificationsAction::Create {
            title,
            message,
            kind,
        } => {
            let body = CreateRequest {
                title: &title,
                message: &message,
                kind: kind.as_deref(),
            };
            let response: CreateResponse = make_request(client.post(&url).json(&body)).await?;
            output(&response, human)
        }
        NotificationsAction::MarkRead { id, all } => {
            if id.is_none() && !all {
                bail!("give a notification ID or --all");
            }
            let body = MarkReadRequest { id, all };
            let url = format!("{}/mark-read", url);
            let response: UnreadResponse = make_request(client.post(&url).json(&body)).await?;
            output(&response, human)
        }
    }
}
