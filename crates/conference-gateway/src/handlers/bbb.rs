//! Conferencing server proxy handlers.
//!
//! Implements the signed proxy endpoints:
//!
//! - `POST /api/create` - Create meeting (duplicate creation is success)
//! - `GET /api/join` - Signed join URL, as redirect or JSON
//! - `GET /api/getMeetingInfo` - Meeting info, creating the meeting if needed
//! - `GET /api/getMeetings` - All meetings
//! - `POST /api/end` - End meeting
//! - `GET /api/getRecordings` - Recordings, optionally for one meeting
//! - `POST /api/initSampleMeetings` - Create the sample meeting
//!
//! Business failures reported by the conferencing server are returned with
//! HTTP 200 and `returncode: FAILED`; only transport and internal failures
//! use 500.

use crate::errors::{GatewayError, INTERNAL_ERROR_KEY};
use crate::extract::JsonOrQuery;
use crate::models::{
    CreateMeetingRequest, EndMeetingRequest, JoinMeetingRequest, JoinUrlResponse,
    MeetingIdQuery, MeetingInfoResult, ReturnCode, SampleMeetingsResponse,
};
use crate::routes::AppState;
use crate::services::MeetingService;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /api/create
#[instrument(skip_all, name = "gateway.bbb.create")]
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    JsonOrQuery(request): JsonOrQuery<CreateMeetingRequest>,
) -> Result<Json<MeetingInfoResult>, GatewayError> {
    let result = MeetingService::create_meeting(state.api.as_ref(), request).await?;
    Ok(Json(result))
}

/// Handler for GET /api/join
///
/// `redirect=false` answers `{returncode, joinURL}`; anything else (the
/// default is `true`) answers `302 Found` to the signed URL.
#[instrument(skip_all, name = "gateway.bbb.join")]
pub async fn join_meeting(
    State(state): State<Arc<AppState>>,
    JsonOrQuery(request): JsonOrQuery<JoinMeetingRequest>,
) -> Result<Response, GatewayError> {
    let redirect = request.redirect.as_deref() != Some("false");

    let join_url = MeetingService::join(state.api.as_ref(), request)
        .await?
        .into_string();

    if redirect {
        return Ok((StatusCode::FOUND, [(header::LOCATION, join_url)]).into_response());
    }

    Ok(Json(JoinUrlResponse {
        returncode: ReturnCode::Success,
        join_url,
    })
    .into_response())
}

/// Handler for GET /api/getMeetingInfo
#[instrument(skip_all, name = "gateway.bbb.get_meeting_info")]
pub async fn get_meeting_info(
    State(state): State<Arc<AppState>>,
    JsonOrQuery(query): JsonOrQuery<MeetingIdQuery>,
) -> Result<Json<MeetingInfoResult>, GatewayError> {
    let meeting_id = query
        .meeting_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| GatewayError::BadRequest("meetingID is required".to_string()))?;

    let result = MeetingService::get_meeting_info(state.api.as_ref(), &meeting_id).await?;
    Ok(Json(result))
}

/// Handler for GET /api/getMeetings
#[instrument(skip_all, name = "gateway.bbb.get_meetings")]
pub async fn get_meetings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MeetingInfoResult>, GatewayError> {
    let result = MeetingService::get_meetings(state.api.as_ref()).await?;
    Ok(Json(result))
}

/// Handler for POST /api/end
#[instrument(skip_all, name = "gateway.bbb.end")]
pub async fn end_meeting(
    State(state): State<Arc<AppState>>,
    JsonOrQuery(request): JsonOrQuery<EndMeetingRequest>,
) -> Result<Json<MeetingInfoResult>, GatewayError> {
    let result = MeetingService::end_meeting(state.api.as_ref(), request).await?;
    Ok(Json(result))
}

/// Handler for GET /api/getRecordings
#[instrument(skip_all, name = "gateway.bbb.get_recordings")]
pub async fn get_recordings(
    State(state): State<Arc<AppState>>,
    JsonOrQuery(query): JsonOrQuery<MeetingIdQuery>,
) -> Result<Json<MeetingInfoResult>, GatewayError> {
    let result = MeetingService::get_recordings(state.api.as_ref(), query.meeting_id).await?;
    Ok(Json(result))
}

/// Handler for POST /api/initSampleMeetings
///
/// A slow conferencing server is not an error: the response is still
/// `SUCCESS` with `meetingCreated: {returncode: "TIMEOUT"}`.
#[instrument(skip_all, name = "gateway.bbb.init_sample_meetings")]
pub async fn init_sample_meetings(State(state): State<Arc<AppState>>) -> Response {
    let deadline = state.config.sample_meeting_timeout;

    match MeetingService::init_sample_meetings(state.api.as_ref(), deadline).await {
        Ok(response) => Json::<SampleMeetingsResponse>(response).into_response(),
        Err(e) => {
            tracing::error!(target: "gateway.bbb", error = %e, "Failed to initialize sample meetings");
            (
                e.status_code(),
                Json(MeetingInfoResult::failed(
                    INTERNAL_ERROR_KEY,
                    "Failed to initialize sample meetings",
                )),
            )
                .into_response()
        }
    }
}
