//! HTTP routes for the Conference Gateway.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::errors::GatewayError;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::repositories::MeetingStore;
use crate::services::ConferenceApi;
use axum::{
    error_handling::HandleErrorLayer,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower::{timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Signed client for the conferencing server.
    pub api: Arc<dyn ConferenceApi>,

    /// Jitsi demo meetings and recordings.
    pub store: Arc<MeetingStore>,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health`, `/api/test` - Liveness and configuration echo
/// - `/metrics` - Prometheus metrics endpoint
/// - `/api/{create,join,getMeetingInfo,getMeetings,end,getRecordings}` - Signed proxy
/// - `/api/initSampleMeetings` - Sample meeting warm-up
/// - `/api/jitsi/*` - Jitsi demo backend
/// - `/recordings/:file_name` - Recording files
/// - CORS for the configured dashboard origins
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - A request deadline derived from the upstream timeout
///   (see [`Config::request_deadline`]), answered as `internalError` JSON
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);
    let deadline = state.config.request_deadline();

    let service_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/test", get(handlers::api_test));

    let bbb_routes = Router::new()
        .route("/api/create", post(handlers::create_meeting))
        .route("/api/join", get(handlers::join_meeting))
        .route("/api/getMeetingInfo", get(handlers::get_meeting_info))
        .route("/api/getMeetings", get(handlers::get_meetings))
        .route("/api/end", post(handlers::end_meeting))
        .route("/api/getRecordings", get(handlers::get_recordings))
        .route(
            "/api/initSampleMeetings",
            post(handlers::init_sample_meetings),
        );

    let jitsi_routes = Router::new()
        .route(
            "/api/jitsi/create-meeting",
            post(handlers::jitsi::create_meeting),
        )
        .route("/api/jitsi/join", post(handlers::jitsi::join))
        .route("/api/jitsi/meeting-info", get(handlers::jitsi::meeting_info))
        .route("/api/jitsi/meetings", get(handlers::jitsi::list_meetings))
        .route(
            "/api/jitsi/start-recording",
            post(handlers::jitsi::start_recording),
        )
        .route(
            "/api/jitsi/stop-recording",
            post(handlers::jitsi::stop_recording),
        )
        .route("/api/jitsi/recordings", get(handlers::jitsi::recordings))
        .route("/recordings/:file_name", get(handlers::serve_recording));

    let app_routes = service_routes
        .merge(bbb_routes)
        .merge(jitsi_routes)
        .with_state(state);

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Deadline, rendered as a JSON failure (innermost)
    // 2. TraceLayer - Log request details
    // 3. CorsLayer - Answer preflights before routing
    // 4. http_metrics_middleware - Record ALL responses (outermost)
    app_routes
        .merge(metrics_routes)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_request_timeout))
                .layer(TimeoutLayer::new(deadline)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(http_metrics_middleware))
}

/// Render a timed-out request like any other upstream failure.
async fn handle_request_timeout(err: BoxError) -> GatewayError {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!(target: "gateway.routes", "Request exceeded its deadline");
        GatewayError::Upstream("request deadline exceeded".to_string())
    } else {
        tracing::error!(target: "gateway.routes", error = %err, "Unhandled middleware error");
        GatewayError::Internal
    }
}

/// CORS for the dashboard origins, with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(target: "gateway.routes", origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
}
