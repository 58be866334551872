//! API routes for mesad
//!
//! v0.2: Added /v1/report for the system-wide metrics rollup
//! v0.3: Added /v1/audit so the trail is readable without shell access
//! v0.4: Create and update started rejecting malformed JSON with 400

use crate::server::AppState;
use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use mesa_core::{AuditEntry, DeskError, NewTicket, SystemReport, Ticket, TicketStatus};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

type AppStateArc = Arc<AppState>;

/// Failure responses always carry `{"success": false, "error": ...}`.
type ApiFailure = (StatusCode, Json<Value>);

fn failure(message: String) -> Json<Value> {
    Json(json!({ "success": false, "error": message }))
}

fn desk_error(err: DeskError) -> ApiFailure {
    let status = match &err {
        DeskError::NotFound(_) => StatusCode::NOT_FOUND,
        DeskError::Storage(_) => {
            error!("Storage failure: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, failure(err.to_string()))
}

fn bad_request(rejection: JsonRejection) -> ApiFailure {
    (StatusCode::BAD_REQUEST, failure(rejection.body_text()))
}

// ============================================================================
// Ticket Routes
// ============================================================================

/// Update payload: only status and response are mutable after filing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTicketRequest {
    pub status: TicketStatus,
    #[serde(default)]
    pub response: String,
}

/// Returned by create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketActionResponse {
    pub success: bool,
    pub tracking_number: String,
}

pub fn ticket_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/tickets", post(create_ticket).get(list_tickets))
        .route("/v1/tickets/:tracking", get(get_ticket).put(update_ticket))
}

async fn create_ticket(
    State(state): State<AppStateArc>,
    payload: Result<Json<NewTicket>, JsonRejection>,
) -> Result<Json<TicketActionResponse>, ApiFailure> {
    let Json(new) = payload.map_err(bad_request)?;
    info!("  Filing solicitud from '{}'", new.requester_name);

    let tracking_number = state.desk.create(new).map_err(desk_error)?;

    Ok(Json(TicketActionResponse {
        success: true,
        tracking_number,
    }))
}

async fn list_tickets(
    State(state): State<AppStateArc>,
) -> Result<Json<Vec<Ticket>>, ApiFailure> {
    let tickets = state.desk.get_all().map_err(desk_error)?;
    Ok(Json(tickets))
}

async fn get_ticket(
    State(state): State<AppStateArc>,
    Path(tracking): Path<String>,
) -> Result<Json<Ticket>, ApiFailure> {
    let ticket = state.desk.get_by_tracking(&tracking).map_err(desk_error)?;
    Ok(Json(ticket))
}

async fn update_ticket(
    State(state): State<AppStateArc>,
    Path(tracking): Path<String>,
    payload: Result<Json<UpdateTicketRequest>, JsonRejection>,
) -> Result<Json<TicketActionResponse>, ApiFailure> {
    let Json(update) = payload.map_err(bad_request)?;
    info!("  Updating {} -> {}", tracking, update.status);

    let tracking_number = state
        .desk
        .update(&tracking, update.status, update.response)
        .map_err(desk_error)?;

    Ok(Json(TicketActionResponse {
        success: true,
        tracking_number,
    }))
}

// ============================================================================
// Report Routes
// ============================================================================

pub fn report_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/report", get(system_report))
        .route("/v1/audit", get(audit_trail))
}

async fn system_report(
    State(state): State<AppStateArc>,
) -> Result<Json<SystemReport>, ApiFailure> {
    let report = state.desk.report().map_err(desk_error)?;
    Ok(Json(report))
}

async fn audit_trail(
    State(state): State<AppStateArc>,
) -> Result<Json<Vec<AuditEntry>>, ApiFailure> {
    let entries = state.desk.audit_trail().map_err(desk_error)?;
    Ok(Json(entries))
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub total_tickets: u64,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

async fn health_check(
    State(state): State<AppStateArc>,
) -> Result<Json<HealthResponse>, ApiFailure> {
    let total_tickets = state.desk.get_all().map_err(desk_error)?.len() as u64;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        total_tickets,
    }))
}
