//! API routes and handlers
//!
//! This module defines all API endpoints and their routing.

use axum::{routing::get, Router};

use crate::AppState;

mod audit_logs;
mod health;
mod metrics;
mod snapshot;

pub use health::*;

/// Create the full API router
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::health_check_detailed))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        // Resource endpoints
        .nest("/audit/logs", audit_logs::routes())
        .nest("/metrics", metrics::routes())
        .nest("/snapshot", snapshot::routes())
}
