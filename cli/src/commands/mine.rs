//! MINE command - List the caller's own notes.

use anyhow::Result;
use clap::Args;

use super::{API_PREFIX, NotePage, make_request, output};

/// Arguments for the mine command.
#[derive(Args)]
pub struct MineArgs {
    /// Cursor from a previous page's `next_cursor`
    #[arg(short, long)]
    pub cursor: Option<String>,

    /// Page size (1-50)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub limit: Option<u32>,
}

/// Execute the mine command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: MineArgs,
) -> Result<()> {
    let url = format!("{}{}/notes/me", base_url, API_PREFIX);

    let mut query: Vec<(&str, String)> = Vec::new();
    if let Some(cursor) = args.cursor {
        query.push(("cursor", cursor));
    }
    if let Some(limit) = args.limit {
        query.push(("limit", limit.to_string()));
    }

    let page: NotePage = make_request(client.get(&url).query(&query)).await?;

    output(&page, human)
}
