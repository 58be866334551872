//! Ticket lifecycle manager.
//!
//! Orchestrates filing, updates, and queries: drives the metrics engine on
//! every status event and records an audit entry for each mutation. Storage
//! is injected through [`RecordStore`], the desk never touches a backend
//! directly.

use crate::audit::{AuditAction, AuditEntry};
use crate::error::DeskError;
use crate::metrics::{aggregate, SlaTargets, SystemReport, TicketMetrics};
use crate::store::RecordStore;
use crate::ticket::{NewTicket, Ticket, TicketPatch, TicketStatus};
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

pub struct TicketDesk<S: RecordStore> {
    store: S,
    sla: SlaTargets,
}

impl<S: RecordStore> TicketDesk<S> {
    pub fn new(store: S, sla: SlaTargets) -> Self {
        Self { store, sla }
    }

    /// File a new solicitud. Returns the tracking number, generated when
    /// the payload carries none.
    pub fn create(&self, new: NewTicket) -> Result<String, DeskError> {
        let now = Utc::now();

        let tracking_number = match new.tracking_number {
            Some(ref t) if !t.trim().is_empty() => t.clone(),
            _ => generate_tracking_number(now),
        };

        let ticket = Ticket {
            tracking_number: tracking_number.clone(),
            created_at: now,
            requester_name: new.requester_name,
            requester_id: new.requester_id,
            site: new.site,
            review_team: new.review_team,
            priority: new.priority,
            category: new.category,
            detail: new.detail,
            impact: new.impact,
            status: new.status,
            assignee: new.assignee,
            response: new.response,
            updated_at: now,
            metrics: TicketMetrics::initialize(now),
        };

        self.store.append_ticket(&ticket)?;
        self.store.append_audit(&AuditEntry {
            timestamp: now,
            action: AuditAction::Create,
            tracking_number: tracking_number.clone(),
            detail: ticket.requester_name.clone(),
        })?;

        info!("Filed ticket {} ({})", tracking_number, ticket.status);
        Ok(tracking_number)
    }

    /// Apply a status update to an existing ticket. The status history grows
    /// by one entry whether or not the value changed; a non-empty response
    /// marks first response on the metrics.
    pub fn update(
        &self,
        tracking: &str,
        new_status: TicketStatus,
        response: String,
    ) -> Result<String, DeskError> {
        let ticket = self
            .store
            .find_by_tracking(tracking)?
            .ok_or_else(|| DeskError::NotFound(tracking.to_string()))?;

        let now = Utc::now();
        let target = self.sla.target_for(&ticket.priority);

        let mut metrics = ticket.metrics.record_transition(&new_status, now, target);
        if !response.is_empty() {
            metrics = metrics.record_response(now);
        }

        let patch = TicketPatch {
            status: new_status.clone(),
            response,
            updated_at: now,
            metrics,
        };

        if !self.store.update_fields(tracking, &patch)? {
            return Err(DeskError::NotFound(tracking.to_string()));
        }

        self.store.append_audit(&AuditEntry {
            timestamp: now,
            action: AuditAction::Update,
            tracking_number: tracking.to_string(),
            detail: new_status.as_str().to_string(),
        })?;

        info!("Updated ticket {} -> {}", tracking, new_status);
        Ok(tracking.to_string())
    }

    /// Every ticket in storage order.
    pub fn get_all(&self) -> Result<Vec<Ticket>, DeskError> {
        self.store.read_all()
    }

    /// Look up one ticket; first match wins when tracking numbers collide.
    pub fn get_by_tracking(&self, tracking: &str) -> Result<Ticket, DeskError> {
        self.store
            .find_by_tracking(tracking)?
            .ok_or_else(|| DeskError::NotFound(tracking.to_string()))
    }

    /// Roll quality metrics up across the whole ticket population.
    pub fn report(&self) -> Result<SystemReport, DeskError> {
        Ok(aggregate(&self.store.read_all()?))
    }

    /// The append-only audit trail, oldest first.
    pub fn audit_trail(&self) -> Result<Vec<AuditEntry>, DeskError> {
        self.store.read_audit()
    }
}

/// `RAD-YYYYMMDD-XXXXXX`: date prefix plus six characters of a v4 UUID.
fn generate_tracking_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "RAD-{}-{}",
        now.format("%Y%m%d"),
        suffix[..6].to_uppercase()
    )
}
