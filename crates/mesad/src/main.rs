//! Mesa Daemon - request desk backend
//!
//! Records solicitudes in the ticket store, applies lifecycle updates, and
//! serves tickets, the metrics report, and the audit trail over HTTP.

use anyhow::{Context, Result};
use mesa_core::{SqliteStore, TicketDesk};
use mesad::config::Config;
use mesad::server::{self, AppState};
use std::path::Path;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Mesa Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();

    let db_path = Path::new(&config.storage.db_path);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let store = SqliteStore::open(db_path)
        .with_context(|| format!("Failed to open ticket store at {}", db_path.display()))?;
    let desk = TicketDesk::new(store, config.sla.to_targets());
    info!("Ticket store ready at {}", db_path.display());

    server::run(AppState::new(desk), &config.server.bind_addr).await
}
