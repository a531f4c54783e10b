//! Snapshot store and background gateway sync
//!
//! A periodic job polls the Retrieval Gateway, decodes the newest page of
//! audit logs into an immutable `Snapshot` and publishes it into a
//! single-slot store. Readers always operate on the last fully received
//! collection; a failed or cancelled refresh never replaces or corrupts the
//! previously accepted snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::models::AuditLog;
use crate::services::gateway::{GatewayClient, LogQueryParams};
use crate::utils::AppResult;

/// Immutable collection of audit logs received in one refresh
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Newest-first, as delivered by the gateway
    pub logs: Vec<AuditLog>,
    pub fetched_at: DateTime<Utc>,
    /// Total record count the gateway reported for the full collection
    pub total_available: u64,
    /// Malformed records dropped while decoding this snapshot
    pub skipped: u32,
}

/// Store observability snapshot for the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotStatus {
    pub available: bool,
    pub record_count: usize,
    pub total_available: u64,
    pub fetched_at: Option<DateTime<Utc>>,
    pub age_secs: Option<i64>,
    pub skipped: u32,
    pub refreshes: u64,
    pub failures: u64,
    pub last_error: Option<String>,
}

/// Single-slot holder of the latest accepted snapshot
pub struct SnapshotStore {
    current: RwLock<Option<Arc<Snapshot>>>,
    refreshes: AtomicU64,
    failures: AtomicU64,
    last_error: RwLock<Option<String>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            refreshes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            last_error: RwLock::new(None),
        }
    }

    /// Latest accepted snapshot, if any refresh has succeeded yet
    pub async fn latest(&self) -> Option<Arc<Snapshot>> {
        self.current.read().await.clone()
    }

    /// Replace the slot with a freshly received snapshot
    pub async fn publish(&self, snapshot: Snapshot) {
        let mut slot = self.current.write().await;
        *slot = Some(Arc::new(snapshot));
        drop(slot);

        self.refreshes.fetch_add(1, Ordering::Relaxed);
        let mut last_error = self.last_error.write().await;
        *last_error = None;
    }

    /// Record a failed refresh, keeping the current snapshot in place
    pub async fn record_failure(&self, error: String) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        let mut last_error = self.last_error.write().await;
        *last_error = Some(error);
    }

    pub async fn status(&self) -> SnapshotStatus {
        let current = self.current.read().await.clone();
        let last_error = self.last_error.read().await.clone();

        let (available, record_count, total_available, fetched_at, age_secs, skipped) =
            match current {
                Some(snapshot) => (
                    true,
                    snapshot.logs.len(),
                    snapshot.total_available,
                    Some(snapshot.fetched_at),
                    Some((Utc::now() - snapshot.fetched_at).num_seconds()),
                    snapshot.skipped,
                ),
                None => (false, 0, 0, None, None, 0),
            };

        SnapshotStatus {
            available,
            record_count,
            total_available,
            fetched_at,
            age_secs,
            skipped,
            refreshes: self.refreshes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            last_error,
        }
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Background job that keeps the snapshot store fresh
pub struct SnapshotSyncJob {
    store: Arc<SnapshotStore>,
    gateway: Arc<GatewayClient>,
    interval: Duration,
    page_limit: u32,
}

impl SnapshotSyncJob {
    pub fn new(
        store: Arc<SnapshotStore>,
        gateway: Arc<GatewayClient>,
        interval_secs: u64,
        page_limit: u32,
    ) -> Self {
        Self {
            store,
            gateway,
            interval: Duration::from_secs(interval_secs),
            page_limit,
        }
    }

    /// Start the background sync job
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "Starting snapshot sync job with interval {:?}",
                self.interval
            );

            let mut interval = tokio::time::interval(self.interval);

            loop {
                interval.tick().await;

                match self.refresh().await {
                    Ok(count) => {
                        debug!("Snapshot sync: refreshed {} audit logs", count);
                    }
                    Err(e) => {
                        warn!("Snapshot sync: refresh failed: {}", e);
                    }
                }
            }
        })
    }

    /// Fetch the newest page of audit logs and publish it.
    ///
    /// On failure the error is recorded in the store and the previous
    /// snapshot stays available.
    pub async fn refresh(&self) -> AppResult<usize> {
        let params = LogQueryParams::new().limit(self.page_limit);

        match self.gateway.list_logs(&params).await {
            Ok(page) => {
                let count = page.logs.len();
                self.store
                    .publish(Snapshot {
                        logs: page.logs,
                        fetched_at: Utc::now(),
                        total_available: page.total,
                        skipped: page.skipped,
                    })
                    .await;
                Ok(count)
            }
            Err(e) => {
                self.store.record_failure(e.to_string()).await;
                Err(e)
            }
        }
    }
}
