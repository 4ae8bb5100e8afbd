//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                - Liveness check
//! GET   /health/ready          - Readiness check (database ping)
//!
//! # Orders (session required)
//! GET   /api/admin/orders      - Filtered, paginated listing with analytics
//! PUT   /api/admin/orders      - Single order status/tracking/notes update
//! PATCH /api/admin/orders      - Bulk action (updateStatus, addNotes, cancel, refund)
//! ```

pub mod orders;

use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::state::AppState;

/// Build the complete admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(orders::router())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
