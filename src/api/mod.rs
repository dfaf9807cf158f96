//! Read-only JSON API over the tables of one run.
//!
//! - `/summary/capacity` and `/summary/generation`, optionally `?country=CC`
//! - `/hourly`, optionally `?year=Y`

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::report::RunReport;

/// Application state shared across handlers. Built once after the run.
pub struct AppState {
    pub report: RunReport,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/summary/capacity", get(handlers::get_capacity))
        .route("/summary/generation", get(handlers::get_generation))
        .route("/hourly", get(handlers::get_hourly))
        .with_state(state)
}

/// Binds to `addr` and serves the API until the process exits.
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    tracing::info!("API server listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
