//! Audit Retrieval Gateway client
//!
//! HTTP client for the gateway's read API (`/api/v1`). Authenticates with a
//! bearer API key and decodes wire payloads into the record model. List
//! responses are decoded per record: a malformed record is skipped and
//! counted, never allowed to abort the page.

use std::error::Error as StdError;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, error, info, warn};

use crate::config::GatewayConfig;
use crate::models::{AuditLog, AuditLogDetail, DecisionOutcome, Metrics, RiskLevel};
use crate::utils::{AppError, AppResult};

/// Retrieval Gateway API client
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Filter parameters the gateway accepts on list requests
#[derive(Debug, Clone, Default)]
pub struct LogQueryParams {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub user_id: Option<String>,
    pub decision_type: Option<String>,
    pub decision_outcome: Option<DecisionOutcome>,
    pub model_provider: Option<String>,
    pub risk_level: Option<RiskLevel>,
    pub flagged: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl LogQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn user_id(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn decision_type(mut self, decision_type: &str) -> Self {
        self.decision_type = Some(decision_type.to_string());
        self
    }

    pub fn decision_outcome(mut self, outcome: DecisionOutcome) -> Self {
        self.decision_outcome = Some(outcome);
        self
    }

    pub fn model_provider(mut self, provider: &str) -> Self {
        self.model_provider = Some(provider.to_string());
        self
    }

    pub fn risk_level(mut self, risk: RiskLevel) -> Self {
        self.risk_level = Some(risk);
        self
    }

    pub fn flagged(mut self, flagged: bool) -> Self {
        self.flagged = Some(flagged);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    fn to_query_string(&self) -> String {
        let mut params = vec![];
        if let Some(start) = self.start_date {
            params.push(format!(
                "start_date={}",
                urlencoding::encode(&start.to_rfc3339())
            ));
        }
        if let Some(end) = self.end_date {
            params.push(format!(
                "end_date={}",
                urlencoding::encode(&end.to_rfc3339())
            ));
        }
        if let Some(ref user_id) = self.user_id {
            params.push(format!("user_id={}", urlencoding::encode(user_id)));
        }
        if let Some(ref decision_type) = self.decision_type {
            params.push(format!(
                "decision_type={}",
                urlencoding::encode(decision_type)
            ));
        }
        if let Some(outcome) = self.decision_outcome {
            params.push(format!("decision_outcome={}", outcome.as_str()));
        }
        if let Some(ref provider) = self.model_provider {
            params.push(format!("model_provider={}", urlencoding::encode(provider)));
        }
        if let Some(risk) = self.risk_level {
            params.push(format!("risk_level={}", risk.as_str()));
        }
        if let Some(flagged) = self.flagged {
            params.push(format!("flagged={}", flagged));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={}", limit));
        }
        if let Some(offset) = self.offset {
            params.push(format!("offset={}", offset));
        }
        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

/// Wire envelope of a list response; records decode individually
#[derive(Debug, Deserialize)]
struct LogListEnvelope {
    total: u64,
    limit: u32,
    offset: u32,
    logs: Vec<serde_json::Value>,
}

/// One decoded page of audit logs
#[derive(Debug, Clone)]
pub struct LogPage {
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub logs: Vec<AuditLog>,
    /// Records on this page that failed to decode and were dropped
    pub skipped: u32,
}

/// Gateway health payload
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayHealth {
    pub status: String,
    pub version: Option<String>,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> AppResult<Self> {
        info!("Initializing audit gateway client for {}", config.url);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .use_rustls_tls()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    // ==================== Audit Log Endpoints ====================

    /// Fetch one page of audit logs, newest first.
    ///
    /// Malformed records are skipped with a warning and reported in
    /// `LogPage::skipped`; the page itself still succeeds.
    pub async fn list_logs(&self, params: &LogQueryParams) -> AppResult<LogPage> {
        let url = format!(
            "{}/api/v1/audit/logs{}",
            self.base_url,
            params.to_query_string()
        );
        let envelope: LogListEnvelope = self.get(&url).await?;

        let page_size = envelope.logs.len();
        let mut logs = Vec::with_capacity(page_size);
        let mut skipped = 0u32;
        for value in envelope.logs {
            match AuditLog::from_value(value) {
                Ok(log) => logs.push(log),
                Err(e) => {
                    skipped += 1;
                    warn!("Skipping malformed audit record in list response: {}", e);
                }
            }
        }
        if skipped > 0 {
            warn!(
                "Skipped {} of {} records in audit log page (offset {})",
                skipped, page_size, envelope.offset
            );
        }

        Ok(LogPage {
            total: envelope.total,
            limit: envelope.limit,
            offset: envelope.offset,
            logs,
            skipped,
        })
    }

    /// Fetch the full detail record for one audit log id
    pub async fn get_detail(&self, id: &str) -> AppResult<AuditLogDetail> {
        let url = format!(
            "{}/api/v1/audit/logs/{}",
            self.base_url,
            urlencoding::encode(id)
        );

        debug!("Gateway: GET {}", url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| self.log_request_failure(&url, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Audit log '{}' not found", id)));
        }

        let value: serde_json::Value = Self::handle_response(response).await?;
        Ok(AuditLogDetail::from_value(value)?)
    }

    // ==================== Metrics & Health ====================

    /// Fetch the gateway's own metrics snapshot
    pub async fn get_metrics(&self) -> AppResult<Metrics> {
        let url = format!("{}/api/v1/metrics", self.base_url);
        self.get(&url).await
    }

    /// Probe the gateway's health endpoint
    pub async fn health(&self) -> AppResult<GatewayHealth> {
        let url = format!("{}/health", self.base_url);
        self.get(&url).await
    }

    // ==================== Helper Methods ====================

    /// Internal GET request handler
    async fn get<T: DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        debug!("Gateway: GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| self.log_request_failure(url, e))?;

        Self::handle_response(response).await
    }

    fn log_request_failure(&self, url: &str, e: reqwest::Error) -> AppError {
        error!(
            "Gateway request to {} failed: {} (is_connect: {}, is_timeout: {})",
            url,
            e,
            e.is_connect(),
            e.is_timeout()
        );
        // Walk the error chain for the root cause
        if let Some(source) = e.source() {
            error!("Gateway request underlying cause: {}", source);
            let mut current: &dyn StdError = source;
            while let Some(next) = current.source() {
                error!("Gateway request caused by: {}", next);
                current = next;
            }
        }
        AppError::from(e)
    }

    /// Handle HTTP response and parse JSON
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await.map_err(|e| {
                AppError::Retrieval(format!("Failed to read gateway response body: {}", e))
            })?;
            serde_json::from_str::<T>(&body).map_err(|e| {
                // Truncate body for logging if too long
                let truncated = if body.len() > 500 {
                    format!("{}... (truncated)", &body[..500])
                } else {
                    body
                };
                warn!("Gateway returned unparseable JSON: {}", truncated);
                AppError::MalformedRecord(format!("Failed to parse gateway response: {}", e))
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AppError::Retrieval(format!(
                "Gateway request failed with status {}: {}",
                status, body
            )))
        }
    }
}
