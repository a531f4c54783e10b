//! AuditLayer WebUI Library
//!
//! This crate provides the core functionality for the AuditLayer WebUI
//! backend: audit log retrieval, content integrity verification, and
//! compliance metrics aggregation.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
use services::gateway::GatewayClient;
use services::snapshot::SnapshotStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Audit retrieval gateway client (optional)
    pub gateway: Option<Arc<GatewayClient>>,
    /// Local snapshot of audit logs, refreshed in the background
    pub snapshots: Arc<SnapshotStore>,
}
