//! Metrics API endpoints
//!
//! Local metrics are aggregated over the latest snapshot; the gateway's own
//! snapshot can be fetched for comparison, and the consistency endpoint
//! reports field-level differences between the two.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::models::Metrics;
use crate::services::{aggregate, compare_metrics};
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(local_metrics))
        .route("/gateway", get(gateway_metrics))
        .route("/consistency", get(metrics_consistency))
}

/// Comparison of locally aggregated metrics with the gateway's own
#[derive(Debug, Serialize)]
pub struct ConsistencyResponse {
    pub consistent: bool,
    pub differences: Vec<String>,
    pub local: Metrics,
    pub gateway: Metrics,
}

async fn aggregate_snapshot(state: &AppState) -> Metrics {
    match state.snapshots.latest().await {
        Some(snapshot) => aggregate(&snapshot.logs, Utc::now()),
        None => Metrics::empty(),
    }
}

async fn local_metrics(State(state): State<AppState>) -> Json<Metrics> {
    Json(aggregate_snapshot(&state).await)
}

async fn gateway_metrics(State(state): State<AppState>) -> AppResult<Json<Metrics>> {
    let gateway = state.gateway.as_deref().ok_or_else(|| {
        AppError::ServiceUnavailable("Audit gateway is not configured".to_string())
    })?;

    Ok(Json(gateway.get_metrics().await?))
}

async fn metrics_consistency(
    State(state): State<AppState>,
) -> AppResult<Json<ConsistencyResponse>> {
    let client = state.gateway.as_deref().ok_or_else(|| {
        AppError::ServiceUnavailable("Audit gateway is not configured".to_string())
    })?;

    let gateway = client.get_metrics().await?;
    let local = aggregate_snapshot(&state).await;
    let differences = compare_metrics(&local, &gateway);

    Ok(Json(ConsistencyResponse {
        consistent: differences.is_empty(),
        differences,
        local,
        gateway,
    }))
}
