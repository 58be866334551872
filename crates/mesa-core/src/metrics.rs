//! Per-ticket quality metrics and the system-wide report.
//!
//! Metrics evolve only through status events: the desk feeds every update
//! through [`TicketMetrics::record_transition`] and persists the result.
//! The report is a pure pass over the ticket population.

use crate::ticket::{Priority, StatusChange, Ticket, TicketStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quality metrics owned by a single ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketMetrics {
    /// Filing instant; the epoch all elapsed-hour figures measure from.
    pub created_at: DateTime<Utc>,
    /// Set exactly once, the first time the ticket reaches completed.
    pub resolved_at: Option<DateTime<Utc>>,
    /// One entry per update call, whether or not the value changed.
    pub status_changes: Vec<StatusChange>,
    /// Wall-clock hours from filing to first resolution. Write-once.
    pub resolution_hours: Option<f64>,
    /// Hours from filing to the first non-empty response. Write-once.
    pub first_response_hours: Option<f64>,
    /// Times the ticket was reassigned or pushed back to pending.
    pub rework_count: u32,
    /// Whether resolution landed inside the priority's target. None until
    /// resolved, or when the priority carries no target.
    pub sla_met: Option<bool>,
}

impl TicketMetrics {
    pub fn initialize(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            resolved_at: None,
            status_changes: Vec::new(),
            resolution_hours: None,
            first_response_hours: None,
            rework_count: 0,
            sla_met: None,
        }
    }

    /// Fold one status event into the metrics.
    ///
    /// Always appends to the history, even when the status did not change.
    /// The first completed event fixes `resolved_at`, `resolution_hours`,
    /// and `sla_met`; later completed events leave them untouched. Pending
    /// and reassigned count as rework every time.
    pub fn record_transition(
        mut self,
        new_status: &TicketStatus,
        now: DateTime<Utc>,
        sla_target_hours: Option<f64>,
    ) -> Self {
        self.status_changes.push(StatusChange {
            status: new_status.clone(),
            at: now,
        });

        match new_status {
            TicketStatus::Completed if self.resolved_at.is_none() => {
                let hours = elapsed_hours(self.created_at, now);
                self.resolved_at = Some(now);
                self.resolution_hours = Some(hours);
                self.sla_met = sla_target_hours.map(|target| hours <= target);
            }
            TicketStatus::Pending | TicketStatus::Reassigned => {
                self.rework_count += 1;
            }
            _ => {}
        }

        self
    }

    /// Mark the first substantive response. Later calls are no-ops.
    pub fn record_response(mut self, now: DateTime<Utc>) -> Self {
        if self.first_response_hours.is_none() {
            self.first_response_hours = Some(elapsed_hours(self.created_at, now));
        }
        self
    }
}

fn elapsed_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

/// Per-priority resolution targets, in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaTargets {
    pub critical_hours: f64,
    pub high_hours: f64,
    pub medium_hours: f64,
    pub low_hours: f64,
}

impl Default for SlaTargets {
    fn default() -> Self {
        Self {
            critical_hours: 4.0,
            high_hours: 8.0,
            medium_hours: 24.0,
            low_hours: 72.0,
        }
    }
}

impl SlaTargets {
    /// Target for a known priority; `Other` values have none.
    pub fn target_for(&self, priority: &Priority) -> Option<f64> {
        match priority {
            Priority::Low => Some(self.low_hours),
            Priority::Medium => Some(self.medium_hours),
            Priority::High => Some(self.high_hours),
            Priority::Critical => Some(self.critical_hours),
            Priority::Other(_) => None,
        }
    }
}

/// System-wide rollup across every ticket in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemReport {
    pub total: u64,
    /// Tickets currently in the completed state.
    pub completed: u64,
    /// completed / total as a percentage, two decimals. 0.0 for an empty
    /// store rather than a division by zero.
    pub completion_rate: f64,
    /// Mean resolution hours over completed tickets that have one recorded,
    /// two decimals. 0.0 when nothing has resolved yet.
    pub average_resolution_hours: f64,
    /// Counts per known priority. Unknown values are not tallied.
    pub by_priority: BTreeMap<Priority, u64>,
    /// Counts per known status. Unknown values are not tallied.
    pub by_status: BTreeMap<TicketStatus, u64>,
}

/// Roll the whole ticket population up into one report.
///
/// Every known priority and status appears in the maps, zero or not, so
/// consumers never have to probe for missing keys.
pub fn aggregate(tickets: &[Ticket]) -> SystemReport {
    let mut by_priority: BTreeMap<Priority, u64> =
        Priority::known().into_iter().map(|p| (p, 0)).collect();
    let mut by_status: BTreeMap<TicketStatus, u64> =
        TicketStatus::known().into_iter().map(|s| (s, 0)).collect();

    let mut resolution_hours = Vec::new();

    for ticket in tickets {
        if let Some(count) = by_status.get_mut(&ticket.status) {
            *count += 1;
        }
        if let Some(count) = by_priority.get_mut(&ticket.priority) {
            *count += 1;
        }
        if ticket.status == TicketStatus::Completed {
            if let Some(hours) = ticket.metrics.resolution_hours {
                resolution_hours.push(hours);
            }
        }
    }

    let total = tickets.len() as u64;
    let completed = by_status
        .get(&TicketStatus::Completed)
        .copied()
        .unwrap_or(0);

    let completion_rate = if total == 0 {
        0.0
    } else {
        round2(completed as f64 / total as f64 * 100.0)
    };

    let average_resolution_hours = if resolution_hours.is_empty() {
        0.0
    } else {
        round2(resolution_hours.iter().sum::<f64>() / resolution_hours.len() as f64)
    };

    SystemReport {
        total,
        completed,
        completion_rate,
        average_resolution_hours,
        by_priority,
        by_status,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 12, hour, minute, 0).unwrap()
    }

    fn ticket_with(status: TicketStatus, priority: Priority, resolution: Option<f64>) -> Ticket {
        let now = at(8, 0);
        let mut metrics = TicketMetrics::initialize(now);
        metrics.resolution_hours = resolution;

        Ticket {
            tracking_number: "RAD-20260312-000001".to_string(),
            created_at: now,
            requester_name: "Maria Lopez".to_string(),
            requester_id: "CC-1017".to_string(),
            site: "Bogota Norte".to_string(),
            review_team: "Infraestructura".to_string(),
            priority,
            category: "hardware".to_string(),
            detail: "Monitor sin señal".to_string(),
            impact: "Puesto de trabajo inoperativo".to_string(),
            status,
            assignee: String::new(),
            response: String::new(),
            updated_at: now,
            metrics,
        }
    }

    #[test]
    fn test_initialize_is_empty() {
        let m = TicketMetrics::initialize(at(8, 0));
        assert_eq!(m.created_at, at(8, 0));
        assert!(m.resolved_at.is_none());
        assert!(m.status_changes.is_empty());
        assert!(m.resolution_hours.is_none());
        assert_eq!(m.rework_count, 0);
        assert!(m.sla_met.is_none());
    }

    #[test]
    fn test_every_transition_is_recorded_even_without_change() {
        let m = TicketMetrics::initialize(at(8, 0))
            .record_transition(&TicketStatus::InProgress, at(9, 0), None)
            .record_transition(&TicketStatus::InProgress, at(10, 0), None);

        assert_eq!(m.status_changes.len(), 2);
        assert_eq!(m.status_changes[0].at, at(9, 0));
        assert_eq!(m.status_changes[1].at, at(10, 0));
        assert_eq!(m.rework_count, 0);
    }

    #[test]
    fn test_first_completion_sets_resolution_once() {
        let m = TicketMetrics::initialize(at(8, 0))
            .record_transition(&TicketStatus::Completed, at(10, 0), None)
            .record_transition(&TicketStatus::InProgress, at(11, 0), None)
            .record_transition(&TicketStatus::Completed, at(13, 0), None);

        assert_eq!(m.resolved_at, Some(at(10, 0)));
        assert_eq!(m.resolution_hours, Some(2.0));
        assert_eq!(m.status_changes.len(), 3);
    }

    #[test]
    fn test_rework_counts_pending_and_reassigned() {
        let m = TicketMetrics::initialize(at(8, 0))
            .record_transition(&TicketStatus::Reassigned, at(9, 0), None)
            .record_transition(&TicketStatus::Pending, at(10, 0), None)
            .record_transition(&TicketStatus::Completed, at(11, 0), None);

        assert_eq!(m.rework_count, 2);
    }

    #[test]
    fn test_sla_verdict_against_target() {
        let met = TicketMetrics::initialize(at(8, 0)).record_transition(
            &TicketStatus::Completed,
            at(11, 0),
            Some(4.0),
        );
        assert_eq!(met.sla_met, Some(true));

        let missed = TicketMetrics::initialize(at(8, 0)).record_transition(
            &TicketStatus::Completed,
            at(13, 0),
            Some(4.0),
        );
        assert_eq!(missed.sla_met, Some(false));

        let no_target = TicketMetrics::initialize(at(8, 0)).record_transition(
            &TicketStatus::Completed,
            at(13, 0),
            None,
        );
        assert!(no_target.sla_met.is_none());
    }

    #[test]
    fn test_first_response_is_write_once() {
        let m = TicketMetrics::initialize(at(8, 0))
            .record_response(at(9, 30))
            .record_response(at(12, 0));

        assert_eq!(m.first_response_hours, Some(1.5));
    }

    #[test]
    fn test_targets_by_priority() {
        let targets = SlaTargets::default();
        assert_eq!(targets.target_for(&Priority::Critical), Some(4.0));
        assert_eq!(targets.target_for(&Priority::Low), Some(72.0));
        assert!(targets
            .target_for(&Priority::Other("urgente".to_string()))
            .is_none());
    }

    #[test]
    fn test_aggregate_empty_store() {
        let report = aggregate(&[]);
        assert_eq!(report.total, 0);
        assert_eq!(report.completed, 0);
        assert_eq!(report.completion_rate, 0.0);
        assert_eq!(report.average_resolution_hours, 0.0);
        assert_eq!(report.by_priority.len(), 4);
        assert!(report.by_priority.values().all(|&n| n == 0));
        assert!(report.by_status.values().all(|&n| n == 0));
    }

    #[test]
    fn test_aggregate_rounds_to_two_decimals() {
        let tickets = vec![
            ticket_with(TicketStatus::Pending, Priority::Critical, None),
            ticket_with(TicketStatus::Completed, Priority::Critical, Some(2.0)),
            ticket_with(TicketStatus::Completed, Priority::High, Some(3.0)),
        ];

        let report = aggregate(&tickets);
        assert_eq!(report.total, 3);
        assert_eq!(report.completed, 2);
        assert_eq!(report.completion_rate, 66.67);
        assert_eq!(report.average_resolution_hours, 2.5);
        assert_eq!(report.by_priority[&Priority::Critical], 2);
        assert_eq!(report.by_priority[&Priority::High], 1);
        assert_eq!(report.by_priority[&Priority::Low], 0);
        assert_eq!(report.by_status[&TicketStatus::Pending], 1);
        assert_eq!(report.by_status[&TicketStatus::Completed], 2);
    }

    #[test]
    fn test_aggregate_drops_unknown_values_from_tallies() {
        let tickets = vec![ticket_with(
            TicketStatus::Other("waiting_parts".to_string()),
            Priority::Other("urgente".to_string()),
            None,
        )];

        let report = aggregate(&tickets);
        assert_eq!(report.total, 1);
        assert_eq!(report.by_status.len(), 4);
        assert!(report.by_status.values().all(|&n| n == 0));
        assert!(report.by_priority.values().all(|&n| n == 0));
    }

    #[test]
    fn test_completed_without_resolution_counts_but_skips_average() {
        let tickets = vec![
            ticket_with(TicketStatus::Completed, Priority::Medium, None),
            ticket_with(TicketStatus::Completed, Priority::Medium, Some(4.0)),
        ];

        let report = aggregate(&tickets);
        assert_eq!(report.completed, 2);
        assert_eq!(report.average_resolution_hours, 4.0);
    }
}
