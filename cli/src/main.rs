//! Command-line client for the notes API.
//!
//! Commands:
//! - list: Browse public notes
//! - mine: List your own notes
//! - show: Fetch one note
//! - create: Publish a new note
//! - update: Change fields of a note you own
//! - delete: Delete a note you own
//! - health: Check that the server is up
//!
//! Configuration via environment:
//! - NOTES_URL: Base URL of the notes server (default: http://localhost:8000)
//! - NOTES_TOKEN: Bearer token issued by the identity provider

mod commands;

use clap::{Parser, Subcommand};

use commands::{
    create::CreateArgs, delete::DeleteArgs, list::ListArgs, mine::MineArgs, show::ShowArgs,
    update::UpdateArgs,
};

/// Notes API client
///
/// Prints JSON by default; pass --human for formatted output.
#[derive(Parser)]
#[command(name = "notes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Notes server URL
    #[arg(
        long,
        env = "NOTES_URL",
        default_value = "http://localhost:8000",
        global = true
    )]
    url: String,

    /// Bearer token for authenticated commands
    #[arg(long, env = "NOTES_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List public notes, newest first
    List(ListArgs),

    /// List your own notes, private ones included
    Mine(MineArgs),

    /// Show one note
    Show(ShowArgs),

    /// Create a new note
    Create(CreateArgs),

    /// Update fields of a note you own
    Update(UpdateArgs),

    /// Delete a note you own
    Delete(DeleteArgs),

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let client = match commands::build_client(cli.token.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let base_url = cli.url.trim_end_matches('/');

    let result = match cli.command {
        Commands::List(args) => commands::list::execute(&client, base_url, cli.human, args).await,
        Commands::Mine(args) => commands::mine::execute(&client, base_url, cli.human, args).await,
        Commands::Show(args) => commands::show::execute(&client, base_url, cli.human, args).await,
        Commands::Create(args) => {
            commands::create::execute(&client, base_url, cli.human, args).await
        }
        Commands::Update(args) => {
            commands::update::execute(&client, base_url, cli.human, args).await
        }
        Commands::Delete(args) => {
            commands::delete::execute(&client, base_url, cli.human, args).await
        }
        Commands::Health => commands::health::execute(&client, base_url, cli.human).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
