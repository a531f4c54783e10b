//! Snapshot store observability endpoint

use axum::{extract::State, routing::get, Json, Router};

use crate::services::SnapshotStatus;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/status", get(snapshot_status))
}

async fn snapshot_status(State(state): State<AppState>) -> Json<SnapshotStatus> {
    Json(state.snapshots.status().await)
}
