//! Mesa Control - CLI client for the mesa request desk
//!
//! Files solicitudes, applies lifecycle updates, and reads tickets, the
//! metrics report, and the audit trail from mesad.

use anyhow::Result;
use clap::Parser;
use mesactl::cli::{Cli, Commands};
use mesactl::client::DeskClient;
use mesactl::commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = DeskClient::new(cli.server);

    match cli.command {
        Commands::Create(args) => commands::create(&client, args).await,
        Commands::Update {
            tracking,
            status,
            response,
        } => commands::update(&client, tracking, status, response).await,
        Commands::Show { tracking, json } => commands::show(&client, tracking, json).await,
        Commands::List { json } => commands::list(&client, json).await,
        Commands::Report { json } => commands::report(&client, json).await,
        Commands::Audit { json } => commands::audit(&client, json).await,
        Commands::Health => commands::health(&client).await,
    }
}
