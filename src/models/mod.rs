//! Data models

mod audit;
mod metrics;
mod verification;

pub use audit::*;
pub use metrics::*;
pub use verification::*;
