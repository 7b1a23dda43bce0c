//! Liveness and configuration echo handlers.

use crate::models::{HealthResponse, TestResponse};
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "Conference Gateway";

/// Handler for GET /health
///
/// Always healthy while the process serves requests; the conferencing
/// server is not probed.
///
/// ## Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "Conference Gateway",
///   "timestamp": "2026-10-16T12:00:00.000Z",
///   "domain": "meet.jit.si"
/// }
/// ```
#[instrument(skip_all, name = "gateway.health.check")]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: now_rfc3339(),
        domain: state.config.jitsi_domain.clone(),
    })
}

/// Handler for GET /api/test
///
/// Echoes the configured servers so the dashboard can show where it is
/// connected. The API secret is never included.
#[instrument(skip_all, name = "gateway.health.test")]
pub async fn api_test(State(state): State<Arc<AppState>>) -> Json<TestResponse> {
    Json(TestResponse {
        message: "Conference Gateway is running!".to_string(),
        timestamp: now_rfc3339(),
        bbb_server: state.config.bbb_server_url.clone(),
        jitsi_domain: state.config.jitsi_domain.clone(),
    })
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
