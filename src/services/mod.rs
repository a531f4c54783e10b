//! Business logic services

pub mod aggregate;
pub mod filter;
pub mod gateway;
pub mod snapshot;
pub mod verify;

pub use aggregate::{aggregate, compare_metrics};
pub use filter::{filter_logs, LogFilter, OutcomeFilter};
pub use gateway::{GatewayClient, GatewayHealth, LogPage, LogQueryParams};
pub use snapshot::{Snapshot, SnapshotStatus, SnapshotStore, SnapshotSyncJob};
pub use verify::{
    canonical_content_bytes, compute_content_hash, verify_detail, CANONICALIZATION_VERSION,
};
