//! Ticket types for the mesa request desk.
//!
//! Every solicitud becomes a [`Ticket`] identified by its tracking number
//! (radicado). Status and priority travel permissively: unknown wire values
//! are preserved verbatim instead of rejected, and the aggregation layer
//! simply skips them.

use crate::metrics::TicketMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket priority as declared by the requester.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
    /// Unrecognized input, kept verbatim. Excluded from priority tallies.
    Other(String),
}

impl Priority {
    /// Canonical wire name. `Other` yields the original input.
    pub fn as_str(&self) -> &str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
            Priority::Other(raw) => raw,
        }
    }

    /// The four known priorities, in escalation order.
    pub fn known() -> [Priority; 4] {
        [
            Priority::Low,
            Priority::Medium,
            Priority::High,
            Priority::Critical,
        ]
    }

    /// Parse a wire value. Case, surrounding whitespace, and space/hyphen
    /// separators are all tolerated; anything else becomes `Other`.
    pub fn parse(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            "critical" => Priority::Critical,
            _ => Priority::Other(raw.to_string()),
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for Priority {
    fn from(raw: String) -> Self {
        Priority::parse(&raw)
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketStatus {
    Pending,
    InProgress,
    Completed,
    Reassigned,
    /// Unrecognized input, kept verbatim. Excluded from status tallies.
    Other(String),
}

impl TicketStatus {
    /// Canonical wire name. `Other` yields the original input.
    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Completed => "completed",
            TicketStatus::Reassigned => "reassigned",
            TicketStatus::Other(raw) => raw,
        }
    }

    /// The four known lifecycle states.
    pub fn known() -> [TicketStatus; 4] {
        [
            TicketStatus::Pending,
            TicketStatus::InProgress,
            TicketStatus::Completed,
            TicketStatus::Reassigned,
        ]
    }

    /// Parse a wire value, tolerating case and separator variations.
    pub fn parse(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "pending" => TicketStatus::Pending,
            "in_progress" | "inprogress" => TicketStatus::InProgress,
            "completed" => TicketStatus::Completed,
            "reassigned" => TicketStatus::Reassigned,
            _ => TicketStatus::Other(raw.to_string()),
        }
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        TicketStatus::Pending
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for TicketStatus {
    fn from(raw: String) -> Self {
        TicketStatus::parse(&raw)
    }
}

impl From<TicketStatus> for String {
    fn from(status: TicketStatus) -> Self {
        status.as_str().to_string()
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase().replace([' ', '-'], "_")
}

/// One entry in a ticket's status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: TicketStatus,
    pub at: DateTime<Utc>,
}

/// A tracked support request. One row in the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// External identifier (radicado). Immutable once filed.
    pub tracking_number: String,
    /// Server-side filing instant. Doubles as the metrics epoch.
    pub created_at: DateTime<Utc>,
    pub requester_name: String,
    pub requester_id: String,
    pub site: String,
    /// Team the request is routed to for review.
    pub review_team: String,
    pub priority: Priority,
    pub category: String,
    /// What is being requested.
    pub detail: String,
    /// Operational impact as described by the requester.
    pub impact: String,
    pub status: TicketStatus,
    pub assignee: String,
    /// Latest handler response. Empty until someone answers.
    pub response: String,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
    pub metrics: TicketMetrics,
}

/// Create payload. Absent fields default instead of failing: the desk
/// records whatever the intake form managed to send.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTicket {
    /// Client-supplied tracking number. Generated when empty or absent.
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub requester_name: String,
    #[serde(default)]
    pub requester_id: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub review_team: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub response: String,
}

/// The mutable slice of a ticket written back on update. Everything else is
/// immutable after filing.
#[derive(Debug, Clone)]
pub struct TicketPatch {
    pub status: TicketStatus,
    pub response: String,
    pub updated_at: DateTime<Utc>,
    pub metrics: TicketMetrics,
}
