//! UPCOMING, HISTORY, DELIVER and RETURN commands.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, format_timestamp, make_request, output};

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    /// Only reservations starting at or after this RFC 3339 instant
    #[arg(long)]
    pub from: Option<DateTime<Utc>>,

    /// Only reservations starting at or before this RFC 3339 instant
    #[arg(long)]
    pub to: Option<DateTime<Utc>>,
}

/// Arguments for the deliver and return commands.
#[derive(Args)]
pub struct HandoffArgs {
    /// Reservation ID
    pub reservation_id: i32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Reservation {
    pub id: i32,
    pub resource_id: i32,
    pub resource_name: String,
    pub requester_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
}

/// A list of reservations under a heading.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ReservationList {
    pub reservations: Vec<Reservation>,
    #[serde(skip)]
    pub heading: &'static str,
}

fn status_colored(status: &str) -> colored::ColoredString {
    match status {
        "APPROVED" => status.green(),
        "DELIVERED" => status.yellow(),
        "RETURNED" => status.dimmed(),
        "REJECTED" => status.red(),
        _ => status.normal(),
    }
}

impl HumanReadable for ReservationList {
    fn print_human(&self) {
        println!("{}", self.heading.green().bold());
        println!("{}", "=".repeat(80));

        if self.reservations.is_empty() {
            println!("  {}", "(No reservations)".dimmed());
            return;
        }

        for r in &self.reservations {
            println!(
                "  #{} {} [{}]",
                r.id,
                r.resource_name.bold(),
                status_colored(&r.status)
            );
            println!(
                "    {} {} - {}",
                "When:".cyan(),
                format_timestamp(&r.start_time),
                format_timestamp(&r.end_time)
            );
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TransitionRecord {
    pub reservation_id: i32,
    pub transition: String,
    pub previous_status: String,
    pub status: String,
    pub actor_id: i32,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TransitionResponse {
    pub ok: bool,
    pub result: Option<TransitionRecord>,
}

impl HumanReadable for TransitionResponse {
    fn print_human(&self) {
        match &self.result {
            Some(record) => {
                println!(
                    "{} reservation #{}: {} -> {}",
                    "Recorded".green().bold(),
                    record.reservation_id,
                    record.previous_status,
                    status_colored(&record.status)
                );
                println!("  {} {}", "By:".cyan(), record.actor_id);
                println!("  {} {}", "At:".cyan(), format_timestamp(&record.at));
            }
            None => println!("{}", "Done".green().bold()),
        }
    }
}

/// Execute the upcoming command.
pub async fn upcoming(client: &reqwest::Client, base_url: &str, human: bool) -> Result<()> {
    let url = format!("{}/api/me/upcoming", base_url);
    let reservations: Vec<Reservation> = make_request(client.get(&url)).await?;
    output(
        &ReservationList {
            reservations,
            heading: "Upcoming Reservations",
        },
        human,
    )
}

/// Execute the history command.
pub async fn history(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: HistoryArgs,
) -> Result<()> {
    let url = format!("{}/api/me/history", base_url);
    let mut query = Vec::new();
    if let Some(from) = args.from {
        query.push(("from", from.to_rfc3339()));
    }
    if let Some(to) = args.to {
        query.push(("to", to.to_rfc3339()));
    }

    let reservations: Vec<Reservation> = make_request(client.get(&url).query(&query)).await?;
    output(
        &ReservationList {
            reservations,
            heading: "Reservation History",
        },
        human,
    )
}

/// Execute the deliver command.
pub async fn deliver(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: HandoffArgs,
) -> Result<()> {
    let url = format!(
        "{}/api/reservations/{}/deliver",
        base_url, args.reservation_id
    );
    let response: TransitionResponse = make_request(client.post(&url)).await?;
    output(&response, human)
}

/// Execute the return command.
pub async fn return_reservation(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: HandoffArgs,
) -> Result<()> {
    let url = format!("{}/api/reservations/{}/return", base_url, args.reservation_id);
    let response: TransitionResponse = make_request(client.post(&url)).await?;
    output(&response, human)
}
