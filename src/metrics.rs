/// Metrics and telemetry for the Giftpool recorder
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - Audit recording outcomes
/// - Badge check outcomes and scheduler backlog
/// - HTTP request counts

use crate::error::{RecorderError, RecorderResult};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, Encoder, HistogramVec,
    IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    /// Audit recorder calls by action type and outcome
    pub static ref AUDIT_RECORDS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "audit_records_total",
        "Audit recorder calls by action type and outcome",
        &["action_type", "outcome"]
    )
    .unwrap();

    /// Badge checks by trigger action and outcome
    pub static ref BADGE_CHECKS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "badge_checks_total",
        "Remote badge evaluations by trigger action and outcome",
        &["trigger_action", "outcome"]
    )
    .unwrap();

    /// Badge triggers waiting for their delay to elapse
    pub static ref BADGE_TRIGGERS_PENDING: IntGauge = register_int_gauge!(
        "badge_triggers_pending",
        "Number of scheduled badge triggers not yet fired"
    )
    .unwrap();

    /// Remote function latency in seconds
    pub static ref REMOTE_FUNCTION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "remote_function_duration_seconds",
        "Remote function call latencies in seconds",
        &["function"],
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    /// HTTP requests by method, path and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> RecorderResult<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| RecorderError::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| RecorderError::Internal(format!("Metrics are not UTF-8: {}", e)))
}

/// Record the outcome of one audit recorder call
pub fn record_audit_outcome(action_type: &str, outcome: &str) {
    AUDIT_RECORDS_TOTAL
        .with_label_values(&[action_type, outcome])
        .inc();
}

/// Record the outcome of one badge check
pub fn record_badge_check(trigger_action: &str, success: bool, duration: f64) {
    BADGE_CHECKS_TOTAL
        .with_label_values(&[trigger_action, if success { "success" } else { "failure" }])
        .inc();
    REMOTE_FUNCTION_DURATION_SECONDS
        .with_label_values(&["badge_check"])
        .observe(duration);
}

/// Update the pending trigger gauge
pub fn set_pending_triggers(count: usize) {
    BADGE_TRIGGERS_PENDING.set(count as i64);
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_audit_outcome() {
        record_audit_outcome("approve", "recorded");
        let metrics = render_metrics().unwrap();
        assert!(metrics.contains("audit_records_total"));
    }

    #[test]
    fn test_record_badge_check() {
        record_badge_check("contribution", false, 0.2);
        let metrics = render_metrics().unwrap();
        assert!(metrics.contains("badge_checks_total"));
        assert!(metrics.contains("remote_function_duration_seconds"));
    }

    #[test]
    fn test_pending_gauge() {
        set_pending_triggers(3);
        assert!(render_metrics().unwrap().contains("badge_triggers_pending"));
    }
}
