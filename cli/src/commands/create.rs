//! CREATE command - Publish a new note.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use notes_core::{NewNote, Note, Validate};

use super::{API_PREFIX, make_request, output};

/// Arguments for the create command.
#[derive(Args)]
pub struct CreateArgs {
    /// Title of the note
    #[arg(long)]
    pub title: String,

    /// Longer description
    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(long)]
    pub college: String,

    #[arg(long)]
    pub stream: String,

    #[arg(long)]
    pub branch: String,

    /// Semester (1-10)
    #[arg(long)]
    pub semester: i32,

    #[arg(long)]
    pub subject: String,

    /// URL or storage path of the uploaded file
    #[arg(long)]
    pub file_url: String,

    /// Only visible to you
    #[arg(long)]
    pub private: bool,
}

impl From<CreateArgs> for NewNote {
    fn from(args: CreateArgs) -> Self {
        NewNote {
            title: args.title,
            description: args.description,
            college: args.college,
            stream: args.stream,
            branch: args.branch,
            semester: args.semester,
            subject: args.subject,
            file_url: args.file_url,
            is_public: !args.private,
        }
    }
}

/// Execute the create command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: CreateArgs,
) -> Result<()> {
    let body = NewNote::from(args);

    // Same checks the server applies; fail before the round trip.
    if let Err(errors) = body.validate() {
        for v in errors.violations() {
            eprintln!("  {} {}", format!("{}:", v.field).red(), v.message);
        }
        bail!("{}", errors);
    }

    let url = format!("{}{}/notes", base_url, API_PREFIX);
    let note: Note = make_request(client.post(&url).json(&body)).await?;

    if human {
        println!("{}", "Note created successfully!".green().bold());
        println!();
    }
    output(&note, human)
}
