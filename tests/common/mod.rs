//! Common test utilities and helpers
//!
//! This module provides shared test infrastructure including:
//! - Test fixtures and factories
//! - A mock Retrieval Gateway
//! - API test client

pub mod factories;
pub mod fixtures;

pub use factories::*;
pub use fixtures::*;
pub use mocks::*;
pub use test_app::*;
