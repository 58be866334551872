//! Command implementations for mesactl.

use crate::cli::CreateArgs;
use crate::client::DeskClient;
use crate::display;
use anyhow::Result;
use mesa_core::{NewTicket, Priority, TicketStatus};

/// File a new solicitud
pub async fn create(client: &DeskClient, args: CreateArgs) -> Result<()> {
    let new = NewTicket {
        tracking_number: args.tracking,
        requester_name: args.requester.unwrap_or_default(),
        requester_id: args.requester_id.unwrap_or_default(),
        site: args.site.unwrap_or_default(),
        review_team: args.team.unwrap_or_default(),
        priority: args.priority.as_deref().map(Priority::parse).unwrap_or_default(),
        category: args.category.unwrap_or_default(),
        detail: args.detail.unwrap_or_default(),
        impact: args.impact.unwrap_or_default(),
        // New solicitudes always start pending.
        status: TicketStatus::Pending,
        assignee: args.assignee.unwrap_or_default(),
        response: String::new(),
    };

    let tracking = client.create(&new).await?;
    println!("Filed solicitud {}", tracking);
    Ok(())
}

/// Update an existing ticket
pub async fn update(
    client: &DeskClient,
    tracking: String,
    status: String,
    response: String,
) -> Result<()> {
    // The daemon parses the status permissively, pass it through raw.
    let tracking = client.update(&tracking, &status, &response).await?;
    println!("Updated solicitud {}", tracking);
    Ok(())
}

/// Show one ticket
pub async fn show(client: &DeskClient, tracking: String, json: bool) -> Result<()> {
    let ticket = client.get(&tracking).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ticket)?);
    } else {
        display::print_ticket(&ticket);
    }
    Ok(())
}

/// List every ticket
pub async fn list(client: &DeskClient, json: bool) -> Result<()> {
    let tickets = client.get_all().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tickets)?);
    } else {
        display::print_ticket_list(&tickets);
    }
    Ok(())
}

/// System-wide metrics report
pub async fn report(client: &DeskClient, json: bool) -> Result<()> {
    let report = client.report().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display::print_report(&report);
    }
    Ok(())
}

/// Show the audit trail
pub async fn audit(client: &DeskClient, json: bool) -> Result<()> {
    let entries = client.audit().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        display::print_audit(&entries);
    }
    Ok(())
}

/// Check daemon health
pub async fn health(client: &DeskClient) -> Result<()> {
    let health = client.health().await?;
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}
