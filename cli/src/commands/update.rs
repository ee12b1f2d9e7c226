//! UPDATE command - Change fields of an owned note.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use notes_core::{Note, NoteChanges, Validate};
use uuid::Uuid;

use super::{API_PREFIX, make_request, output};

/// Arguments for the update command. Only the given fields change.
#[derive(Args)]
pub struct UpdateArgs {
    /// Note ID
    pub id: Uuid,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,

    #[arg(long)]
    pub college: Option<String>,

    #[arg(long)]
    pub stream: Option<String>,

    #[arg(long)]
    pub branch: Option<String>,

    #[arg(long)]
    pub semester: Option<i32>,

    #[arg(long)]
    pub subject: Option<String>,

    #[arg(long)]
    pub file_url: Option<String>,

    /// Make the note visible to everyone
    #[arg(long, conflicts_with = "private")]
    pub public: bool,

    /// Make the note visible only to you
    #[arg(long)]
    pub private: bool,
}

impl UpdateArgs {
    fn changes(&self) -> NoteChanges {
        let description = if self.clear_description {
            Some(None)
        } else {
            self.description.clone().map(Some)
        };

        NoteChanges {
            title: self.title.clone(),
            description,
            college: self.college.clone(),
            stream: self.stream.clone(),
            branch: self.branch.clone(),
            semester: self.semester,
            subject: self.subject.clone(),
            file_url: self.file_url.clone(),
            is_public: match (self.public, self.private) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
        }
    }
}

/// Execute the update command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: UpdateArgs,
) -> Result<()> {
    let changes = args.changes();

    if let Err(errors) = changes.validate() {
        for v in errors.violations() {
            eprintln!("  {} {}", format!("{}:", v.field).red(), v.message);
        }
        bail!("{}", errors);
    }

    let url = format!("{}{}/notes/{}", base_url, API_PREFIX, args.id);
    let note: Note = make_request(client.put(&url).json(&changes)).await?;

    output(&note, human)
}
