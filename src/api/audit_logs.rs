//! Audit log API endpoints
//!
//! List queries are served from the latest snapshot and filtered locally;
//! detail lookups go to the Retrieval Gateway on demand and come back with
//! an integrity verification report attached.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AuditLog, AuditLogDetail, RiskLevel, VerificationReport};
use crate::services::{filter_logs, verify_detail, GatewayClient, LogFilter, OutcomeFilter};
use crate::utils::{AppError, AppResult};
use crate::AppState;

const DEFAULT_PAGE_LIMIT: u32 = 50;
const MAX_PAGE_LIMIT: u32 = 100;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_logs))
        .route("/{id}", get(get_log_detail))
        .route("/{id}/verify", get(verify_log))
}

/// Filter and pagination parameters accepted by the list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ListLogsQuery {
    /// Case-insensitive substring over decision type and model name
    pub search: Option<String>,
    /// `all` or one of the enumerated outcomes
    pub outcome: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Lowest risk level to include (at-or-above threshold)
    pub min_risk: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Filtered page envelope; `total` counts all filter matches
#[derive(Debug, Serialize)]
pub struct LogPageResponse {
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub logs: Vec<AuditLog>,
}

/// Detail record with its verification report embedded
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    #[serde(flatten)]
    pub log: AuditLogDetail,
    pub verification: VerificationReport,
}

fn build_filter(query: &ListLogsQuery) -> AppResult<LogFilter> {
    let outcome = match query.outcome.as_deref() {
        None => OutcomeFilter::All,
        Some(raw) => OutcomeFilter::from_str(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown outcome filter '{}'", raw)))?,
    };

    let min_risk = match query.min_risk.as_deref() {
        None => None,
        Some(raw) => Some(
            RiskLevel::from_str(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown risk level '{}'", raw)))?,
        ),
    };

    Ok(LogFilter {
        search: query.search.clone().unwrap_or_default(),
        outcome,
        from: query.start_date,
        to: query.end_date,
        min_risk,
    })
}

fn require_gateway(state: &AppState) -> AppResult<&GatewayClient> {
    state
        .gateway
        .as_deref()
        .ok_or_else(|| AppError::ServiceUnavailable("Audit gateway is not configured".to_string()))
}

async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<ListLogsQuery>,
) -> AppResult<Json<LogPageResponse>> {
    let filter = build_filter(&query)?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let offset = query.offset.unwrap_or(0);

    // Before the first refresh the page is empty, not an error.
    let matches = match state.snapshots.latest().await {
        Some(snapshot) => filter_logs(&snapshot.logs, &filter),
        None => Vec::new(),
    };

    let total = matches.len() as u64;
    let logs = matches
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();

    Ok(Json(LogPageResponse {
        total,
        limit,
        offset,
        logs,
    }))
}

async fn get_log_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DetailResponse>> {
    let gateway = require_gateway(&state)?;

    let detail = gateway.get_detail(&id).await?;
    let verification = verify_detail(&detail);

    Ok(Json(DetailResponse {
        log: detail,
        verification,
    }))
}

async fn verify_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<VerificationReport>> {
    let gateway = require_gateway(&state)?;

    let detail = gateway.get_detail(&id).await?;
    Ok(Json(verify_detail(&detail)))
}
