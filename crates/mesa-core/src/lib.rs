//! Mesa core: shared ticket, metrics, and storage types for the mesa
//! request desk.
//!
//! The desk records solicitudes under a tracking number (radicado), walks
//! them through a small lifecycle, and derives quality metrics from the
//! status history.

pub mod audit;
pub mod desk;
pub mod error;
pub mod metrics;
pub mod store;
pub mod ticket;

pub use audit::{AuditAction, AuditEntry};
pub use desk::TicketDesk;
pub use error::DeskError;
pub use metrics::{aggregate, SlaTargets, SystemReport, TicketMetrics};
pub use store::{RecordStore, SqliteStore};
pub use ticket::{NewTicket, Priority, StatusChange, Ticket, TicketPatch, TicketStatus};
