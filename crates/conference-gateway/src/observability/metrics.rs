//! Metrics definitions for the Conference Gateway.
//!
//! All metrics follow Prometheus naming conventions:
//! - `gateway_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: HTTP methods
//! - `endpoint`: the fixed route table plus `/recordings/{fileName}` and `/other`
//! - `status`: 3 values (success, error, timeout)
//! - `operation`: the six conferencing API operations
//! - `returncode`: SUCCESS, FAILED, error

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and return the handle served at `/metrics`.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("gateway_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Upstream calls are bounded by the outbound timeout (10 s default)
        .set_buckets_for_metric(
            Matcher::Prefix("gateway_upstream_request".to_string()),
            &[
                0.010, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set upstream request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion.
///
/// Metric: `gateway_http_requests_total`, `gateway_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("gateway_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("gateway_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout.
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=399 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Routes served by the gateway, used verbatim as label values.
const KNOWN_ENDPOINTS: &[&str] = &[
    "/health",
    "/metrics",
    "/api/test",
    "/api/create",
    "/api/join",
    "/api/getMeetingInfo",
    "/api/getMeetings",
    "/api/end",
    "/api/getRecordings",
    "/api/initSampleMeetings",
    "/api/jitsi/create-meeting",
    "/api/jitsi/join",
    "/api/jitsi/meeting-info",
    "/api/jitsi/meetings",
    "/api/jitsi/start-recording",
    "/api/jitsi/stop-recording",
    "/api/jitsi/recordings",
];

/// Map a request path to a bounded label value.
fn normalize_endpoint(path: &str) -> &'static str {
    if let Some(known) = KNOWN_ENDPOINTS.iter().copied().find(|known| *known == path) {
        return known;
    }

    if path
        .strip_prefix("/recordings/")
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
    {
        return "/recordings/{fileName}";
    }

    "/other"
}

// ============================================================================
// Upstream Metrics
// ============================================================================

/// Record a call to the conferencing server.
///
/// Metric: `gateway_upstream_requests_total`, `gateway_upstream_request_duration_seconds`
/// Labels: `operation`, `returncode`
///
/// `returncode` is the normalized body discriminator, or `error` when the
/// request failed in transport.
pub fn record_upstream_request(operation: &'static str, returncode: &'static str, duration: Duration) {
    histogram!("gateway_upstream_request_duration_seconds",
        "operation" => operation
    )
    .record(duration.as_secs_f64());

    counter!("gateway_upstream_requests_total",
        "operation" => operation,
        "returncode" => returncode
    )
    .increment(1);
}

/// Record the outcome of the startup warm-up.
///
/// Metric: `gateway_warmup_total`
/// Labels: `outcome` (created, timeout, error)
pub fn record_warmup(outcome: &'static str) {
    counter!("gateway_warmup_total", "outcome" => outcome).increment(1);
}
