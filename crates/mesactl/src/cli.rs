//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::{Args, Parser, Subcommand};

/// Mesa desk CLI
#[derive(Parser)]
#[command(name = "mesactl")]
#[command(about = "Mesa - request desk client", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Daemon base URL (overrides $MESA_SERVER and the default)
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// File a new solicitud
    Create(CreateArgs),

    /// Update status and response of an existing ticket
    Update {
        /// Tracking number (radicado)
        tracking: String,

        /// New status: pending | in_progress | completed | reassigned
        #[arg(long)]
        status: String,

        /// Handler response text
        #[arg(long, default_value = "")]
        response: String,
    },

    /// Show one ticket
    Show {
        /// Tracking number (radicado)
        tracking: String,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// List all tickets
    List {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// System-wide metrics report
    Report {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Show the audit trail
    Audit {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Check daemon health
    Health,
}

/// Fields accepted when filing a solicitud
#[derive(Args)]
pub struct CreateArgs {
    /// Requester display name
    #[arg(long)]
    pub requester: Option<String>,

    /// Requester document or badge id
    #[arg(long)]
    pub requester_id: Option<String>,

    /// Originating site
    #[arg(long)]
    pub site: Option<String>,

    /// Team that should review the request
    #[arg(long)]
    pub team: Option<String>,

    /// Priority: low | medium | high | critical
    #[arg(long)]
    pub priority: Option<String>,

    /// Request category
    #[arg(long)]
    pub category: Option<String>,

    /// What is being requested
    #[arg(long)]
    pub detail: Option<String>,

    /// Operational impact
    #[arg(long)]
    pub impact: Option<String>,

    /// Initial assignee
    #[arg(long)]
    pub assignee: Option<String>,

    /// Explicit tracking number; generated when omitted
    #[arg(long)]
    pub tracking: Option<String>,
}
