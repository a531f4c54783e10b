//! Health check endpoints
//!
//! Provides health check endpoints for monitoring and load balancers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Basic health response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Detailed health response with component status
#[derive(Serialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub version: String,
    pub components: ComponentHealth,
}

/// Health status of individual components
#[derive(Serialize)]
pub struct ComponentHealth {
    pub gateway: ComponentStatus,
    pub snapshot: ComponentStatus,
}

/// Status of a single component
#[derive(Serialize)]
pub struct ComponentStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: None,
        }
    }

    fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            message: Some(message.into()),
        }
    }

    fn not_configured() -> Self {
        Self {
            status: "not_configured".to_string(),
            message: None,
        }
    }
}

/// Readiness response; the service degrades instead of failing hard
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub gateway_configured: bool,
    pub snapshot_available: bool,
}

/// Simple health check endpoint (for load balancers)
///
/// Returns 200 OK if the service is running.
/// Does not check component health.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Detailed health check endpoint
///
/// Probes the Retrieval Gateway and reports the snapshot store state.
/// Returns 200 if all components are healthy, 503 otherwise.
pub async fn health_check_detailed(
    State(state): State<AppState>,
) -> (StatusCode, Json<DetailedHealthResponse>) {
    // Probe the gateway (if configured)
    let gateway_status = if let Some(ref client) = state.gateway {
        match client.health().await {
            Ok(_) => ComponentStatus::healthy(),
            Err(e) => ComponentStatus::unhealthy(e.to_string()),
        }
    } else {
        ComponentStatus::not_configured()
    };

    // Report the snapshot store state
    let snapshot = state.snapshots.status().await;
    let snapshot_status = if snapshot.available {
        ComponentStatus::healthy()
    } else if state.gateway.is_none() {
        ComponentStatus::not_configured()
    } else {
        ComponentStatus::unhealthy(
            snapshot
                .last_error
                .unwrap_or_else(|| "no snapshot received yet".to_string()),
        )
    };

    // Determine overall status
    let component_ok =
        |status: &ComponentStatus| status.status == "healthy" || status.status == "not_configured";
    let overall_healthy = component_ok(&gateway_status) && component_ok(&snapshot_status);

    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = DetailedHealthResponse {
        status: if overall_healthy {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        components: ComponentHealth {
            gateway: gateway_status,
            snapshot: snapshot_status,
        },
    };

    (status_code, Json(response))
}

/// Liveness probe (for Kubernetes)
///
/// Returns 200 OK if the process is alive.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe (for Kubernetes)
///
/// The dashboard can serve empty pages before the first snapshot arrives,
/// so readiness reports the degraded state instead of returning 503.
pub async fn readiness(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let snapshot = state.snapshots.status().await;
    Json(ReadinessResponse {
        ready: true,
        gateway_configured: state.gateway.is_some(),
        snapshot_available: snapshot.available,
    })
}
