//! Output formatting utilities for the CLI
//!
//! Tables for the listing commands and colored status lines. Resource ids
//! and streamed session output go to stdout undecorated so they can be
//! piped; status lines use the `print_*` helpers.

use chrono::{DateTime, Duration, Utc};
use tabled::{settings::Style, Table, Tabled};

use jc_core::api::{ContainerSummary, ImageSummary, NetworkSummary};

/// Width ids are shortened to in listings
const ID_WIDTH: usize = 12;

/// Format the container listing
pub fn format_containers(containers: &[ContainerSummary], now: DateTime<Utc>) -> String {
    if containers.is_empty() {
        return "No containers".to_string();
    }

    #[derive(Tabled)]
    struct ContainerRow {
        #[tabled(rename = "CONTAINER ID")]
        id: String,
        #[tabled(rename = "IMAGE")]
        image: String,
        #[tabled(rename = "COMMAND")]
        command: String,
        #[tabled(rename = "CREATED")]
        created: String,
        #[tabled(rename = "STATUS")]
        status: &'static str,
        #[tabled(rename = "NAME")]
        name: String,
    }

    let rows: Vec<ContainerRow> = containers
        .iter()
        .map(|c| ContainerRow {
            id: truncate(&c.id, ID_WIDTH),
            image: truncate(&c.image_id, 15),
            command: truncate(&c.command, 23),
            created: created_ago(&c.created, now),
            status: if c.running { "running" } else { "stopped" },
            name: c.name.clone(),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format the image listing
pub fn format_images(images: &[ImageSummary], now: DateTime<Utc>) -> String {
    if images.is_empty() {
        return "No images".to_string();
    }

    #[derive(Tabled)]
    struct ImageRow {
        #[tabled(rename = "IMAGE ID")]
        id: String,
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "TAG")]
        tag: String,
        #[tabled(rename = "CREATED")]
        created: String,
    }

    let rows: Vec<ImageRow> = images
        .iter()
        .map(|i| ImageRow {
            id: truncate(&i.id, ID_WIDTH),
            name: i.name.clone(),
            tag: i.tag.clone(),
            created: created_ago(&i.created, now),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format the network listing
pub fn format_networks(networks: &[NetworkSummary]) -> String {
    if networks.is_empty() {
        return "No networks".to_string();
    }

    #[derive(Tabled)]
    struct NetworkRow {
        #[tabled(rename = "NETWORK ID")]
        id: String,
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "DRIVER")]
        driver: String,
    }

    let rows: Vec<NetworkRow> = networks
        .iter()
        .map(|n| NetworkRow {
            id: truncate(&n.id, ID_WIDTH),
            name: n.name.clone(),
            driver: n.driver.clone(),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// "<duration> ago" for an RFC 3339 timestamp, or "-" if it does not parse
fn created_ago(created: &str, now: DateTime<Utc>) -> String {
    match DateTime::parse_from_rfc3339(created) {
        Ok(created) => format!("{} ago", human_duration(now - created.with_timezone(&Utc))),
        Err(_) => "-".to_string(),
    }
}

/// Human-readable approximation of a duration, e.g. "About a minute"
pub fn human_duration(d: Duration) -> String {
    let seconds = d.num_seconds();
    if seconds < 1 {
        return "Less than a second".to_string();
    }
    if seconds == 1 {
        return "1 second".to_string();
    }
    if seconds < 60 {
        return format!("{} seconds", seconds);
    }

    let minutes = d.num_minutes();
    if minutes == 1 {
        return "About a minute".to_string();
    }
    if minutes < 60 {
        return format!("{} minutes", minutes);
    }

    // Rounded to the nearest hour
    let hours = (d.num_seconds() + 1800) / 3600;
    if hours == 1 {
        "About an hour".to_string()
    } else if hours < 48 {
        format!("{} hours", hours)
    } else if hours < 24 * 7 * 2 {
        format!("{} days", hours / 24)
    } else if hours < 24 * 30 * 2 {
        format!("{} weeks", hours / 24 / 7)
    } else if hours < 24 * 365 * 2 {
        format!("{} months", hours / 24 / 30)
    } else {
        format!("{} years", d.num_hours() / 24 / 365)
    }
}

/// Shorten a string to `max_len` characters, marking the cut with ".."
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len).collect();
        format!("{}..", kept)
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix
///
/// Outputs to stderr so it never mixes into streamed session output.
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow with a warning symbol prefix
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan with an info symbol prefix
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
