//! API integration tests
//!
//! Tests the API endpoints with real HTTP requests against the router,
//! using a snapshot store seeded directly instead of a live gateway.

use chrono::{Duration, SecondsFormat, Utc};

use crate::common::{LogFixtures, TestApp};

// ==================== Health ====================

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert!(json.get("version").is_some());
}

#[tokio::test]
async fn test_detailed_health_without_gateway() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health/detailed").await;

    // Nothing configured still counts as healthy, not degraded.
    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["components"]["gateway"]["status"], "not_configured");
    assert_eq!(json["components"]["snapshot"]["status"], "not_configured");
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health/live").await;

    response.assert_ok();
}

#[tokio::test]
async fn test_readiness_reports_degraded_state_with_200() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health/ready").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["ready"], true);
    assert_eq!(json["gateway_configured"], false);
    assert_eq!(json["snapshot_available"], false);
}

#[tokio::test]
async fn test_readiness_sees_published_snapshot() {
    let app = TestApp::with_snapshot(LogFixtures::three_outcomes()).await;
    let response = app.get("/api/v1/health/ready").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["snapshot_available"], true);
}

// ==================== Audit log list ====================

#[tokio::test]
async fn test_list_logs_empty_before_first_snapshot() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/audit/logs").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["total"], 0);
    assert!(json["logs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_logs_returns_snapshot_records() {
    let app = TestApp::with_snapshot(LogFixtures::three_outcomes()).await;
    let response = app.get("/api/v1/audit/logs").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["total"], 3);
    let logs = json["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 3);
    // Snapshot order (newest first) is preserved
    assert_eq!(logs[0]["id"], "log_approved");
    assert_eq!(logs[2]["id"], "log_flagged");
}

#[tokio::test]
async fn test_list_logs_filters_by_outcome() {
    let app = TestApp::with_snapshot(LogFixtures::three_outcomes()).await;
    let response = app.get("/api/v1/audit/logs?outcome=denied").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["total"], 1);
    assert_eq!(json["logs"][0]["id"], "log_denied");
    assert_eq!(json["logs"][0]["decision_outcome"], "denied");
}

#[tokio::test]
async fn test_list_logs_search_matches_model_name() {
    let app = TestApp::with_snapshot(LogFixtures::three_outcomes()).await;
    let response = app.get("/api/v1/audit/logs?search=claude").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["total"], 1);
    assert_eq!(json["logs"][0]["id"], "log_denied");
}

#[tokio::test]
async fn test_list_logs_search_matches_decision_type() {
    let app = TestApp::with_snapshot(LogFixtures::three_outcomes()).await;
    let response = app.get("/api/v1/audit/logs?search=TRANSACTION").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["total"], 1);
    assert_eq!(json["logs"][0]["id"], "log_flagged");
}

#[tokio::test]
async fn test_list_logs_min_risk_is_a_threshold() {
    let app = TestApp::with_snapshot(LogFixtures::three_outcomes()).await;
    let response = app.get("/api/v1/audit/logs?min_risk=medium").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    // medium and high qualify, low does not
    assert_eq!(json["total"], 2);
}

#[tokio::test]
async fn test_list_logs_date_window() {
    let app = TestApp::with_snapshot(LogFixtures::three_outcomes()).await;

    let cutoff = (Utc::now() - Duration::minutes(90)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let response = app
        .get(&format!("/api/v1/audit/logs?start_date={}", cutoff))
        .await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    // Only the one-hour-old record falls inside the window
    assert_eq!(json["total"], 1);
    assert_eq!(json["logs"][0]["id"], "log_approved");
}

#[tokio::test]
async fn test_list_logs_pagination() {
    let app = TestApp::with_snapshot(LogFixtures::three_outcomes()).await;

    let page1 = app.get("/api/v1/audit/logs?limit=2").await;
    page1.assert_ok();
    let json: serde_json::Value = page1.json();
    assert_eq!(json["total"], 3);
    assert_eq!(json["logs"].as_array().unwrap().len(), 2);

    let page2 = app.get("/api/v1/audit/logs?limit=2&offset=2").await;
    page2.assert_ok();
    let json: serde_json::Value = page2.json();
    assert_eq!(json["total"], 3);
    assert_eq!(json["logs"].as_array().unwrap().len(), 1);
    assert_eq!(json["logs"][0]["id"], "log_flagged");
}

#[tokio::test]
async fn test_list_logs_unknown_outcome_is_bad_request() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/audit/logs?outcome=escalated").await;

    response.assert_bad_request();
}

#[tokio::test]
async fn test_list_logs_unknown_risk_is_bad_request() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/audit/logs?min_risk=severe").await;

    response.assert_bad_request();
}

// ==================== Audit log detail ====================

#[tokio::test]
async fn test_log_detail_without_gateway_is_unavailable() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/audit/logs/log_001").await;

    response.assert_service_unavailable();
}

#[tokio::test]
async fn test_verify_without_gateway_is_unavailable() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/audit/logs/log_001/verify").await;

    response.assert_service_unavailable();
}

// ==================== Metrics ====================

#[tokio::test]
async fn test_metrics_of_empty_snapshot_are_zero() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/metrics").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["total"], 0);
    assert_eq!(json["approval_rate"], 0.0);
    assert_eq!(json["by_outcome"]["approved"], 0);
    assert_eq!(json["by_outcome"]["other"], 0);
}

#[tokio::test]
async fn test_metrics_aggregate_the_snapshot() {
    let app = TestApp::with_snapshot(LogFixtures::three_outcomes()).await;
    let response = app.get("/api/v1/metrics").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["total"], 3);
    // Records are one to three hours old, inside both trailing windows
    assert_eq!(json["total_week"], 3);
    assert_eq!(json["total_month"], 3);
    assert_eq!(json["approval_rate"], 33.33);
    assert_eq!(json["denial_rate"], 33.33);
    assert_eq!(json["flagged_rate"], 33.33);
    assert_eq!(json["avg_duration_ms"], 2415.0);
    assert_eq!(json["by_outcome"]["approved"], 1);
    assert_eq!(json["by_outcome"]["denied"], 1);
    assert_eq!(json["by_outcome"]["flagged"], 1);
    assert_eq!(json["by_outcome"]["other"], 0);
    assert_eq!(json["by_model"]["gpt-4-turbo"], 2);
    assert_eq!(json["by_model"]["claude-3-opus"], 1);
    assert_eq!(json["by_decision_type"]["loan_approval"], 2);
}

#[tokio::test]
async fn test_gateway_metrics_without_gateway_is_unavailable() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/metrics/gateway").await;

    response.assert_service_unavailable();
}

#[tokio::test]
async fn test_consistency_without_gateway_is_unavailable() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/metrics/consistency").await;

    response.assert_service_unavailable();
}

// ==================== Snapshot status ====================

#[tokio::test]
async fn test_snapshot_status_starts_empty() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/snapshot/status").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["available"], false);
    assert_eq!(json["record_count"], 0);
    assert_eq!(json["refreshes"], 0);
}

#[tokio::test]
async fn test_snapshot_status_after_publish() {
    let app = TestApp::with_snapshot(LogFixtures::three_outcomes()).await;
    let response = app.get("/api/v1/snapshot/status").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["available"], true);
    assert_eq!(json["record_count"], 3);
    assert_eq!(json["refreshes"], 1);
    assert!(json["fetched_at"].is_string());
}

// ==================== Misc ====================

#[tokio::test]
async fn test_not_found_returns_404() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/nonexistent").await;

    response.assert_not_found();
}
