//! HTTP server for mesad

use crate::routes;
use anyhow::Result;
use axum::Router;
use mesa_core::{SqliteStore, TicketDesk};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub desk: TicketDesk<SqliteStore>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(desk: TicketDesk<SqliteStore>) -> Self {
        Self {
            desk,
            start_time: Instant::now(),
        }
    }
}

/// Build the full router. Separate from [`run`] so tests can drive it
/// without a listener.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::ticket_routes())
        .merge(routes::report_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // The intake form is served from a browser.
        .layer(CorsLayer::permissive())
}

/// Run the HTTP server
pub async fn run(state: AppState, bind_addr: &str) -> Result<()> {
    let app = app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("  Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
