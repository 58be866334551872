//! Record store: the tabular persistence port and its SQLite backend.
//!
//! The desk depends only on the [`RecordStore`] trait. The SQLite backend
//! keeps one structured row per ticket (metrics live in real columns, not a
//! serialized blob), an append-only `status_changes` table, and the audit
//! log. v0.3: the metric columns replaced the JSON blob carried in earlier
//! versions.

use crate::audit::{AuditAction, AuditEntry};
use crate::error::DeskError;
use crate::metrics::TicketMetrics;
use crate::ticket::{Priority, StatusChange, Ticket, TicketPatch, TicketStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Tabular persistence port for tickets and the audit log.
///
/// Append-based: duplicate tracking numbers are not rejected, and lookups
/// resolve to the first row in insertion order.
pub trait RecordStore: Send + Sync {
    /// Append one ticket row.
    fn append_ticket(&self, ticket: &Ticket) -> Result<(), DeskError>;

    /// Every ticket, in insertion order.
    fn read_all(&self) -> Result<Vec<Ticket>, DeskError>;

    /// First ticket with the given tracking number, if any.
    fn find_by_tracking(&self, tracking: &str) -> Result<Option<Ticket>, DeskError>;

    /// Write the mutable slice back to the first matching row. Returns
    /// false when no row matches.
    fn update_fields(&self, tracking: &str, patch: &TicketPatch) -> Result<bool, DeskError>;

    /// Append one audit entry.
    fn append_audit(&self, entry: &AuditEntry) -> Result<(), DeskError>;

    /// The full audit trail, oldest first.
    fn read_audit(&self) -> Result<Vec<AuditEntry>, DeskError>;
}

const SELECT_TICKET: &str = "SELECT id, tracking_number, created_at, requester_name, \
     requester_id, site, review_team, priority, category, detail, impact, status, \
     assignee, response, updated_at, resolved_at, resolution_hours, \
     first_response_hours, rework_count, sla_met FROM tickets";

/// SQLite-backed record store.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the store at `path`. Parent directories must exist.
    pub fn open(path: &Path) -> Result<Self, DeskError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store for tests and ephemeral runs.
    pub fn in_memory() -> Result<Self, DeskError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), DeskError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tracking_number TEXT NOT NULL,
                created_at TEXT NOT NULL,
                requester_name TEXT NOT NULL DEFAULT '',
                requester_id TEXT NOT NULL DEFAULT '',
                site TEXT NOT NULL DEFAULT '',
                review_team TEXT NOT NULL DEFAULT '',
                priority TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL DEFAULT '',
                detail TEXT NOT NULL DEFAULT '',
                impact TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT '',
                assignee TEXT NOT NULL DEFAULT '',
                response TEXT NOT NULL DEFAULT '',
                updated_at TEXT NOT NULL,
                resolved_at TEXT,
                resolution_hours REAL,
                first_response_hours REAL,
                rework_count INTEGER NOT NULL DEFAULT 0,
                sla_met INTEGER
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS status_changes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticket_id INTEGER NOT NULL,
                status TEXT NOT NULL,
                changed_at TEXT NOT NULL,
                FOREIGN KEY (ticket_id) REFERENCES tickets(id)
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                action TEXT NOT NULL,
                tracking_number TEXT NOT NULL,
                detail TEXT NOT NULL DEFAULT ''
            )
            "#,
            [],
        )?;

        // Not UNIQUE: duplicate tracking numbers are permitted, lookups take
        // the first row in insertion order.
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tickets_tracking ON tickets(tracking_number)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_changes_ticket ON status_changes(ticket_id)",
            [],
        )?;

        Ok(())
    }
}

impl RecordStore for SqliteStore {
    fn append_ticket(&self, ticket: &Ticket) -> Result<(), DeskError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO tickets (
                tracking_number, created_at, requester_name, requester_id,
                site, review_team, priority, category, detail, impact,
                status, assignee, response, updated_at,
                resolved_at, resolution_hours, first_response_hours,
                rework_count, sla_met
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                &ticket.tracking_number,
                ticket.created_at.to_rfc3339(),
                &ticket.requester_name,
                &ticket.requester_id,
                &ticket.site,
                &ticket.review_team,
                ticket.priority.as_str(),
                &ticket.category,
                &ticket.detail,
                &ticket.impact,
                ticket.status.as_str(),
                &ticket.assignee,
                &ticket.response,
                ticket.updated_at.to_rfc3339(),
                ticket.metrics.resolved_at.map(|t| t.to_rfc3339()),
                ticket.metrics.resolution_hours,
                ticket.metrics.first_response_hours,
                ticket.metrics.rework_count,
                ticket.metrics.sla_met,
            ],
        )?;

        let ticket_id = tx.last_insert_rowid();
        for change in &ticket.metrics.status_changes {
            tx.execute(
                "INSERT INTO status_changes (ticket_id, status, changed_at) VALUES (?, ?, ?)",
                params![ticket_id, change.status.as_str(), change.at.to_rfc3339()],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<Ticket>, DeskError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", SELECT_TICKET))?;
        let rows = stmt.query_map([], ticket_from_row)?;

        let mut ids = Vec::new();
        let mut tickets = Vec::new();
        for row in rows {
            let (id, ticket) = row?;
            ids.push(id);
            tickets.push(ticket);
        }

        let mut histories = load_all_changes(&conn)?;
        for (id, ticket) in ids.iter().zip(tickets.iter_mut()) {
            if let Some(history) = histories.remove(id) {
                ticket.metrics.status_changes = history;
            }
        }

        Ok(tickets)
    }

    fn find_by_tracking(&self, tracking: &str) -> Result<Option<Ticket>, DeskError> {
        let conn = self.conn.lock().unwrap();

        let found = conn
            .query_row(
                &format!(
                    "{} WHERE tracking_number = ? ORDER BY id ASC LIMIT 1",
                    SELECT_TICKET
                ),
                params![tracking],
                ticket_from_row,
            )
            .optional()?;

        let (id, mut ticket) = match found {
            Some(hit) => hit,
            None => return Ok(None),
        };

        ticket.metrics.status_changes = load_changes_for(&conn, id)?;
        Ok(Some(ticket))
    }

    fn update_fields(&self, tracking: &str, patch: &TicketPatch) -> Result<bool, DeskError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let target: Option<i64> = tx
            .query_row(
                "SELECT id FROM tickets WHERE tracking_number = ? ORDER BY id ASC LIMIT 1",
                params![tracking],
                |row| row.get(0),
            )
            .optional()?;

        let ticket_id = match target {
            Some(id) => id,
            None => return Ok(false),
        };

        tx.execute(
            r#"
            UPDATE tickets SET
                status = ?,
                response = ?,
                updated_at = ?,
                resolved_at = ?,
                resolution_hours = ?,
                first_response_hours = ?,
                rework_count = ?,
                sla_met = ?
            WHERE id = ?
            "#,
            params![
                patch.status.as_str(),
                &patch.response,
                patch.updated_at.to_rfc3339(),
                patch.metrics.resolved_at.map(|t| t.to_rfc3339()),
                patch.metrics.resolution_hours,
                patch.metrics.first_response_hours,
                patch.metrics.rework_count,
                patch.metrics.sla_met,
                ticket_id,
            ],
        )?;

        // History is append-only: persist only the entries beyond what the
        // row already has.
        let recorded: i64 = tx.query_row(
            "SELECT COUNT(*) FROM status_changes WHERE ticket_id = ?",
            params![ticket_id],
            |row| row.get(0),
        )?;
        for change in patch.metrics.status_changes.iter().skip(recorded as usize) {
            tx.execute(
                "INSERT INTO status_changes (ticket_id, status, changed_at) VALUES (?, ?, ?)",
                params![ticket_id, change.status.as_str(), change.at.to_rfc3339()],
            )?;
        }

        tx.commit()?;
        Ok(true)
    }

    fn append_audit(&self, entry: &AuditEntry) -> Result<(), DeskError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO audit_log (timestamp, action, tracking_number, detail) VALUES (?, ?, ?, ?)",
            params![
                entry.timestamp.to_rfc3339(),
                entry.action.as_str(),
                &entry.tracking_number,
                &entry.detail,
            ],
        )?;
        Ok(())
    }

    fn read_audit(&self) -> Result<Vec<AuditEntry>, DeskError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT timestamp, action, tracking_number, detail FROM audit_log ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AuditEntry {
                timestamp: parse_ts(&row.get::<_, String>(0)?),
                action: AuditAction::parse(&row.get::<_, String>(1)?),
                tracking_number: row.get(2)?,
                detail: row.get(3)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, Ticket)> {
    let id: i64 = row.get(0)?;
    let created_at = parse_ts(&row.get::<_, String>(2)?);

    let ticket = Ticket {
        tracking_number: row.get(1)?,
        created_at,
        requester_name: row.get(3)?,
        requester_id: row.get(4)?,
        site: row.get(5)?,
        review_team: row.get(6)?,
        priority: Priority::parse(&row.get::<_, String>(7)?),
        category: row.get(8)?,
        detail: row.get(9)?,
        impact: row.get(10)?,
        status: TicketStatus::parse(&row.get::<_, String>(11)?),
        assignee: row.get(12)?,
        response: row.get(13)?,
        updated_at: parse_ts(&row.get::<_, String>(14)?),
        metrics: TicketMetrics {
            created_at,
            resolved_at: row.get::<_, Option<String>>(15)?.map(|s| parse_ts(&s)),
            // Filled in by the caller from the status_changes table.
            status_changes: Vec::new(),
            resolution_hours: row.get(16)?,
            first_response_hours: row.get(17)?,
            rework_count: row.get(18)?,
            sla_met: row.get(19)?,
        },
    };

    Ok((id, ticket))
}

fn load_all_changes(conn: &Connection) -> Result<HashMap<i64, Vec<StatusChange>>, DeskError> {
    let mut stmt =
        conn.prepare("SELECT ticket_id, status, changed_at FROM status_changes ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut by_ticket: HashMap<i64, Vec<StatusChange>> = HashMap::new();
    for row in rows {
        let (ticket_id, status, at) = row?;
        by_ticket.entry(ticket_id).or_default().push(StatusChange {
            status: TicketStatus::parse(&status),
            at: parse_ts(&at),
        });
    }
    Ok(by_ticket)
}

fn load_changes_for(conn: &Connection, ticket_id: i64) -> Result<Vec<StatusChange>, DeskError> {
    let mut stmt = conn
        .prepare("SELECT status, changed_at FROM status_changes WHERE ticket_id = ? ORDER BY id ASC")?;
    let rows = stmt.query_map(params![ticket_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut changes = Vec::new();
    for row in rows {
        let (status, at) = row?;
        changes.push(StatusChange {
            status: TicketStatus::parse(&status),
            at: parse_ts(&at),
        });
    }
    Ok(changes)
}

fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 12, hour, 0, 0).unwrap()
    }

    fn sample_ticket(tracking: &str, site: &str) -> Ticket {
        let now = at(8);
        Ticket {
            tracking_number: tracking.to_string(),
            created_at: now,
            requester_name: "Maria Lopez".to_string(),
            requester_id: "CC-1017".to_string(),
            site: site.to_string(),
            review_team: "Infraestructura".to_string(),
            priority: Priority::High,
            category: "hardware".to_string(),
            detail: "Monitor sin señal".to_string(),
            impact: "Puesto inoperativo".to_string(),
            status: TicketStatus::Pending,
            assignee: String::new(),
            response: String::new(),
            updated_at: now,
            metrics: TicketMetrics::initialize(now),
        }
    }

    #[test]
    fn test_append_and_read_round_trip() {
        let store = SqliteStore::in_memory().unwrap();
        let mut ticket = sample_ticket("RAD-1", "Bogota");
        ticket.priority = Priority::Other("urgente".to_string());

        store.append_ticket(&ticket).unwrap();

        let all = store.read_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], ticket);
    }

    #[test]
    fn test_find_returns_first_match_on_duplicates() {
        let store = SqliteStore::in_memory().unwrap();
        store.append_ticket(&sample_ticket("RAD-1", "Bogota")).unwrap();
        store.append_ticket(&sample_ticket("RAD-1", "Medellin")).unwrap();

        let found = store.find_by_tracking("RAD-1").unwrap().unwrap();
        assert_eq!(found.site, "Bogota");
    }

    #[test]
    fn test_find_missing_is_none() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.find_by_tracking("RAD-404").unwrap().is_none());
    }

    #[test]
    fn test_update_touches_only_mutable_fields() {
        let store = SqliteStore::in_memory().unwrap();
        let ticket = sample_ticket("RAD-1", "Bogota");
        store.append_ticket(&ticket).unwrap();

        let metrics = ticket.metrics.clone().record_transition(
            &TicketStatus::InProgress,
            at(9),
            Some(8.0),
        );
        let patch = TicketPatch {
            status: TicketStatus::InProgress,
            response: "Tecnico asignado".to_string(),
            updated_at: at(9),
            metrics,
        };

        assert!(store.update_fields("RAD-1", &patch).unwrap());

        let found = store.find_by_tracking("RAD-1").unwrap().unwrap();
        assert_eq!(found.status, TicketStatus::InProgress);
        assert_eq!(found.response, "Tecnico asignado");
        assert_eq!(found.updated_at, at(9));
        assert_eq!(found.metrics.status_changes.len(), 1);
        // Immutable after filing.
        assert_eq!(found.requester_name, "Maria Lopez");
        assert_eq!(found.site, "Bogota");
        assert_eq!(found.created_at, at(8));
    }

    #[test]
    fn test_update_appends_history_without_duplicating() {
        let store = SqliteStore::in_memory().unwrap();
        let ticket = sample_ticket("RAD-1", "Bogota");
        store.append_ticket(&ticket).unwrap();

        let first = ticket
            .metrics
            .clone()
            .record_transition(&TicketStatus::InProgress, at(9), None);
        store
            .update_fields(
                "RAD-1",
                &TicketPatch {
                    status: TicketStatus::InProgress,
                    response: String::new(),
                    updated_at: at(9),
                    metrics: first.clone(),
                },
            )
            .unwrap();

        let second = first.record_transition(&TicketStatus::Completed, at(10), None);
        store
            .update_fields(
                "RAD-1",
                &TicketPatch {
                    status: TicketStatus::Completed,
                    response: String::new(),
                    updated_at: at(10),
                    metrics: second,
                },
            )
            .unwrap();

        let found = store.find_by_tracking("RAD-1").unwrap().unwrap();
        assert_eq!(found.metrics.status_changes.len(), 2);
        assert_eq!(found.metrics.status_changes[0].status, TicketStatus::InProgress);
        assert_eq!(found.metrics.status_changes[1].status, TicketStatus::Completed);
    }

    #[test]
    fn test_update_unknown_tracking_returns_false() {
        let store = SqliteStore::in_memory().unwrap();
        let patch = TicketPatch {
            status: TicketStatus::Completed,
            response: String::new(),
            updated_at: at(9),
            metrics: TicketMetrics::initialize(at(8)),
        };
        assert!(!store.update_fields("RAD-404", &patch).unwrap());
    }

    #[test]
    fn test_audit_round_trip_in_order() {
        let store = SqliteStore::in_memory().unwrap();
        let first = AuditEntry {
            timestamp: at(8),
            action: AuditAction::Create,
            tracking_number: "RAD-1".to_string(),
            detail: "Maria Lopez".to_string(),
        };
        let second = AuditEntry {
            timestamp: at(9),
            action: AuditAction::Update,
            tracking_number: "RAD-1".to_string(),
            detail: "in_progress".to_string(),
        };

        store.append_audit(&first).unwrap();
        store.append_audit(&second).unwrap();

        let trail = store.read_audit().unwrap();
        assert_eq!(trail, vec![first, second]);
    }

    #[test]
    fn test_open_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tickets.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.append_ticket(&sample_ticket("RAD-1", "Bogota")).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.read_all().unwrap().len(), 1);
    }
}
