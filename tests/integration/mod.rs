//! Integration tests for AuditLayer WebUI
//!
//! These tests verify the behavior of the API endpoints and the gateway
//! client against a mock Retrieval Gateway.

mod api_tests;
