//! Display helpers for mesactl output.
//!
//! Status and priority keep the color coding the intake sheet always used:
//! completed green, in-progress blue, pending yellow, reassigned magenta.

use mesa_core::{AuditEntry, Priority, SystemReport, Ticket, TicketStatus};
use owo_colors::OwoColorize;

const KW: usize = 15; // key width

/// Print one ticket in full
pub fn print_ticket(ticket: &Ticket) {
    println!();
    print_kv("tracking", &ticket.tracking_number);
    print_kv("created", &ticket.created_at.format("%Y-%m-%d %H:%M UTC").to_string());
    print_kv(
        "requester",
        &format!("{} ({})", ticket.requester_name, ticket.requester_id),
    );
    print_kv("site", &ticket.site);
    print_kv("team", &ticket.review_team);
    print_kv("priority", &priority_cell(&ticket.priority, 0));
    print_kv("category", &ticket.category);
    print_kv("status", &status_cell(&ticket.status, 0));
    print_kv("assignee", &ticket.assignee);
    print_kv("detail", &ticket.detail);
    print_kv("impact", &ticket.impact);
    print_kv("response", &ticket.response);
    print_kv("updated", &ticket.updated_at.format("%Y-%m-%d %H:%M UTC").to_string());

    println!();
    print_kv("status changes", &ticket.metrics.status_changes.len().to_string());
    print_kv("rework", &ticket.metrics.rework_count.to_string());
    if let Some(resolved) = ticket.metrics.resolved_at {
        let hours = ticket.metrics.resolution_hours.unwrap_or(0.0);
        print_kv(
            "resolved",
            &format!("{} ({:.2}h)", resolved.format("%Y-%m-%d %H:%M UTC"), hours),
        );
    }
    if let Some(met) = ticket.metrics.sla_met {
        let verdict = if met {
            "met".green().to_string()
        } else {
            "missed".red().to_string()
        };
        print_kv("sla", &verdict);
    }
    if let Some(hours) = ticket.metrics.first_response_hours {
        print_kv("first response", &format!("{:.2}h", hours));
    }
    println!();
}

/// Print the ticket table
pub fn print_ticket_list(tickets: &[Ticket]) {
    if tickets.is_empty() {
        println!("No tickets filed.");
        return;
    }

    println!(
        "{:<22} {:<13} {:<10} {:<20} {}",
        "TRACKING", "STATUS", "PRIORITY", "REQUESTER", "DETAIL"
    );
    for ticket in tickets {
        println!(
            "{:<22} {} {} {:<20} {}",
            ticket.tracking_number,
            status_cell(&ticket.status, 13),
            priority_cell(&ticket.priority, 10),
            truncate(&ticket.requester_name, 20),
            truncate(&ticket.detail, 44),
        );
    }
    println!("\n{} ticket(s)", tickets.len());
}

/// Print the system-wide report
pub fn print_report(report: &SystemReport) {
    println!();
    print_kv("total", &report.total.to_string());
    print_kv(
        "completed",
        &format!("{} ({:.2}%)", report.completed, report.completion_rate),
    );
    print_kv(
        "avg resolution",
        &format!("{:.2}h", report.average_resolution_hours),
    );

    println!("\nby priority:");
    for (priority, count) in &report.by_priority {
        println!("  {} {}", priority_cell(priority, 10), count);
    }

    println!("\nby status:");
    for (status, count) in &report.by_status {
        println!("  {} {}", status_cell(status, 13), count);
    }
    println!();
}

/// Print the audit trail table
pub fn print_audit(entries: &[AuditEntry]) {
    if entries.is_empty() {
        println!("Audit trail is empty.");
        return;
    }

    println!(
        "{:<20} {:<8} {:<22} {}",
        "TIMESTAMP", "ACTION", "TRACKING", "DETAIL"
    );
    for entry in entries {
        println!(
            "{:<20} {:<8} {:<22} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.action.as_str(),
            entry.tracking_number,
            entry.detail,
        );
    }
    println!("\n{} entries", entries.len());
}

fn print_kv(key: &str, value: &str) {
    println!("{:width$} {}", key, value, width = KW);
}

/// Pad first, then color, so ANSI codes do not break column widths
fn status_cell(status: &TicketStatus, width: usize) -> String {
    let padded = pad(status.as_str(), width);
    match status {
        TicketStatus::Pending => padded.yellow().to_string(),
        TicketStatus::InProgress => padded.blue().to_string(),
        TicketStatus::Completed => padded.green().to_string(),
        TicketStatus::Reassigned => padded.magenta().to_string(),
        TicketStatus::Other(_) => padded,
    }
}

fn priority_cell(priority: &Priority, width: usize) -> String {
    let padded = pad(priority.as_str(), width);
    match priority {
        Priority::Low => padded.green().to_string(),
        Priority::Medium => padded.yellow().to_string(),
        Priority::High => padded.red().to_string(),
        Priority::Critical => padded.red().bold().to_string(),
        Priority::Other(_) => padded,
    }
}

fn pad(value: &str, width: usize) -> String {
    format!("{:<width$}", value, width = width)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}
