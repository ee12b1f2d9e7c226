//! Command implementations for the notes CLI.
//!
//! Each command module provides:
//! - Args struct for clap argument parsing
//! - execute() function that performs the command
//! - Human-readable and JSON output formatting

pub mod create;
pub mod delete;
pub mod health;
pub mod list;
pub mod mine;
pub mod show;
pub mod update;

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use notes_core::Note;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Path prefix of the versioned API.
pub const API_PREFIX: &str = "/api/v1";

/// Common error type for HTTP requests.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error ({status} {code}): {message}")]
    Server {
        status: u16,
        code: String,
        message: String,
    },
}

/// Build an HTTP client, optionally configured with a Bearer token.
pub fn build_client(token: Option<&str>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if let Some(token) = token {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| anyhow::anyhow!("Invalid token value: {}", e))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
        builder = builder.default_headers(headers);
    }

    Ok(builder.build()?)
}

/// Print output in JSON or human-readable format.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Trait for types that can be printed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Send a request and decode its JSON body.
pub async fn make_request<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, CliError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        Ok(response.json::<T>().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(server_error(status.as_u16(), &body))
    }
}

/// Send a request whose success response has no body.
pub async fn send_empty(request: reqwest::RequestBuilder) -> Result<(), CliError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(server_error(status.as_u16(), &body))
    }
}

/// Turn a failed response into an error, reading the server's error
/// envelope when there is one.
fn server_error(status: u16, body: &str) -> CliError {
    #[derive(Deserialize)]
    struct Envelope {
        error: EnvelopeError,
    }

    #[derive(Deserialize)]
    struct EnvelopeError {
        code: String,
        message: String,
        #[serde(default)]
        details: Option<serde_json::Value>,
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(Envelope { error }) => {
            let message = match error.details {
                Some(details) => format!("{} {}", error.message, details),
                None => error.message,
            };
            CliError::Server {
                status,
                code: error.code,
                message,
            }
        }
        Err(_) => CliError::Server {
            status,
            code: "UNKNOWN".to_string(),
            message: body.to_string(),
        },
    }
}

/// One page of notes as returned by the list endpoints.
#[derive(Debug, Deserialize, Serialize)]
pub struct NotePage {
    pub data: Vec<Note>,
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PageMeta {
    pub next_cursor: Option<String>,
    pub has_next: bool,
}

impl HumanReadable for NotePage {
    fn print_human(&self) {
        if self.data.is_empty() {
            println!("  {}", "(No notes)".dimmed());
            return;
        }

        for note in &self.data {
            let visibility = if note.is_public {
                "public".normal()
            } else {
                "private".yellow()
            };
            println!("  {} {}", note.title.bold(), format!("[{}]", visibility).dimmed());
            println!("    {} {}", "ID:".cyan(), note.id);
            println!(
                "    {} {} / semester {}",
                "Subject:".cyan(),
                note.subject,
                note.semester
            );
            println!(
                "    {} {}, {}, {}",
                "Course:".cyan(),
                truncate(&note.college, 40),
                note.stream,
                note.branch
            );
            println!("    {} {}", "Created:".cyan(), format_timestamp(&note.created_at));
            println!();
        }

        println!("  {} {}", "Shown:".cyan(), self.data.len());
        if let Some(cursor) = &self.meta.next_cursor {
            println!("  {} --cursor {}", "More:".cyan(), cursor);
        }
    }
}

impl HumanReadable for Note {
    fn print_human(&self) {
        println!("{}", self.title.green().bold());
        println!("{}", "=".repeat(60));
        println!();

        println!("  {} {}", "ID:".cyan(), self.id);
        println!("  {} {}", "Owner:".cyan(), self.owner);
        println!("  {} {}", "College:".cyan(), self.college);
        println!("  {} {}", "Stream:".cyan(), self.stream);
        println!("  {} {}", "Branch:".cyan(), self.branch);
        println!("  {} {}", "Semester:".cyan(), self.semester);
        println!("  {} {}", "Subject:".cyan(), self.subject);
        println!("  {} {}", "File:".cyan(), self.file_url);
        println!(
            "  {} {}",
            "Visibility:".cyan(),
            if self.is_public { "public" } else { "private" }
        );
        println!("  {} {}", "Created:".cyan(), format_timestamp(&self.created_at));
        println!("  {} {}", "Updated:".cyan(), format_timestamp(&self.updated_at));

        if let Some(description) = &self.description {
            println!();
            println!("{}", "Description:".yellow());
            println!("{}", "-".repeat(60));
            println!("{}", description);
        }
    }
}

/// Format a timestamp for human display.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Truncate a string for display, adding ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
