//! DELETE command - Delete an owned note.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use uuid::Uuid;

use super::{API_PREFIX, HumanReadable, output, send_empty};

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Note ID to delete
    pub id: Uuid,

    /// Skip confirmation prompt (for non-interactive use)
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Printed after a successful delete; the server itself answers 204.
#[derive(Debug, Serialize)]
pub struct DeletedNote {
    pub id: Uuid,
    pub deleted: bool,
}

impl HumanReadable for DeletedNote {
    fn print_human(&self) {
        println!("{}", "Note deleted successfully!".green().bold());
        println!();
        println!("  {} {}", "ID:".cyan(), self.id);
    }
}

/// Execute the delete command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: DeleteArgs,
) -> Result<()> {
    // Confirmation prompt for interactive use
    if human && !args.yes {
        eprint!(
            "{} Are you sure you want to delete note {}? [y/N] ",
            "Warning:".yellow().bold(),
            args.id
        );

        use std::io::Write;
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    let url = format!("{}{}/notes/{}", base_url, API_PREFIX, args.id);
    send_empty(client.delete(&url)).await?;

    output(
        &DeletedNote {
            id: args.id,
            deleted: true,
        },
        human,
    )
}
