//! Jitsi backend handlers.
//!
//! All responses carry `success`; failures render as `{success: false, error}`,
//! including rejected request bodies.

use crate::errors::{GatewayError, JitsiError};
use crate::extract::JsonOrQuery;
use crate::models::jitsi::{
    CreateJitsiMeetingRequest, CreateJitsiMeetingResponse, JitsiJoinRequest, JitsiJoinResponse,
    JitsiMeetingInfoResponse, JitsiMeetingsResponse, JitsiRecordingsResponse,
    RecordingActionResponse, RoomNameRequest,
};
use crate::routes::AppState;
use crate::services::JitsiService;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /api/jitsi/create-meeting
#[instrument(skip_all, name = "gateway.jitsi.create_meeting")]
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    request: Result<JsonOrQuery<CreateJitsiMeetingRequest>, GatewayError>,
) -> Result<Json<CreateJitsiMeetingResponse>, JitsiError> {
    let JsonOrQuery(request) = request?;
    let response =
        JitsiService::create_meeting(&state.store, &state.config.jitsi_domain, request).await?;
    Ok(Json(response))
}

/// Handler for POST /api/jitsi/join
#[instrument(skip_all, name = "gateway.jitsi.join")]
pub async fn join(
    State(state): State<Arc<AppState>>,
    request: Result<JsonOrQuery<JitsiJoinRequest>, GatewayError>,
) -> Result<Json<JitsiJoinResponse>, JitsiError> {
    let JsonOrQuery(request) = request?;
    Ok(Json(JitsiService::join(&state.config.jitsi_domain, request)?))
}

/// Handler for GET /api/jitsi/meeting-info
#[instrument(skip_all, name = "gateway.jitsi.meeting_info")]
pub async fn meeting_info(
    State(state): State<Arc<AppState>>,
    query: Result<JsonOrQuery<RoomNameRequest>, GatewayError>,
) -> Result<Json<JitsiMeetingInfoResponse>, JitsiError> {
    let JsonOrQuery(query) = query?;
    let response = JitsiService::meeting_info(&state.store, query.room_name).await?;
    Ok(Json(response))
}

/// Handler for GET /api/jitsi/meetings
#[instrument(skip_all, name = "gateway.jitsi.list_meetings")]
pub async fn list_meetings(State(state): State<Arc<AppState>>) -> Json<JitsiMeetingsResponse> {
    Json(JitsiService::list_meetings(&state.store).await)
}

/// Handler for POST /api/jitsi/start-recording
#[instrument(skip_all, name = "gateway.jitsi.start_recording")]
pub async fn start_recording(
    State(state): State<Arc<AppState>>,
    request: Result<JsonOrQuery<RoomNameRequest>, GatewayError>,
) -> Result<Json<RecordingActionResponse>, JitsiError> {
    let JsonOrQuery(request) = request?;
    let response = JitsiService::start_recording(&state.store, request.room_name).await?;
    Ok(Json(response))
}

/// Handler for POST /api/jitsi/stop-recording
#[instrument(skip_all, name = "gateway.jitsi.stop_recording")]
pub async fn stop_recording(
    State(state): State<Arc<AppState>>,
    request: Result<JsonOrQuery<RoomNameRequest>, GatewayError>,
) -> Result<Json<RecordingActionResponse>, JitsiError> {
    let JsonOrQuery(request) = request?;
    let response = JitsiService::stop_recording(&state.store, request.room_name).await?;
    Ok(Json(response))
}

/// Handler for GET /api/jitsi/recordings
#[instrument(skip_all, name = "gateway.jitsi.recordings")]
pub async fn recordings(
    State(state): State<Arc<AppState>>,
    query: Result<JsonOrQuery<RoomNameRequest>, GatewayError>,
) -> Result<Json<JitsiRecordingsResponse>, JitsiError> {
    let JsonOrQuery(query) = query?;
    Ok(Json(
        JitsiService::recordings(&state.store, &state.config.public_base_url, query.room_name)
            .await,
    ))
}
