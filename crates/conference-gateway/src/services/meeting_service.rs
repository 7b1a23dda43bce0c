//! Meeting operations against the conferencing server.
//!
//! Implements the create-if-missing policy used by join and meeting-info
//! lookups:
//!
//! 1. Look the meeting up with `getMeetingInfo`
//! 2. On `SUCCESS`, proceed
//! 3. On `FAILED/notFound`, create it with defaults derived from the ID
//! 4. Whatever the create returned, repeat the original step exactly once
//!
//! Transport failures are never retried. A second `notFound` is returned to
//! the caller as-is.

use crate::errors::GatewayError;
use crate::models::{
    CreateMeetingRequest, EndMeetingRequest, JoinMeetingRequest, MeetingInfoResult, ReturnCode,
    SampleMeetingOutcome, SampleMeetingsResponse,
};
use crate::services::bbb_client::ConferenceApi;
use crate::services::normalizer::{DEFAULT_ATTENDEE_PW, DEFAULT_MODERATOR_PW};
use crate::services::signer::{Operation, QueryParams, SignedUrl};
use std::time::Duration;
use tracing::instrument;

/// Message key the server uses for an already existing meeting.
const DUPLICATE_WARNING_KEY: &str = "duplicateWarning";

/// Message reported after rewriting a duplicate create to success.
pub const DUPLICATE_MEETING_MESSAGE: &str = "Meeting already exists and is ready to join";

/// Duration (minutes) of meetings created on demand.
const AUTOCREATE_DURATION_MINUTES: u32 = 120;

/// Capacity of meetings created on demand.
const AUTOCREATE_MAX_PARTICIPANTS: u32 = 50;

/// A predefined meeting the dashboard links to.
#[derive(Debug, Clone, Copy)]
pub struct SampleMeeting {
    pub meeting_id: &'static str,
    pub name: &'static str,
    pub welcome: &'static str,
}

/// Meetings with hand-written names and welcome texts.
pub const SAMPLE_MEETINGS: &[SampleMeeting] = &[SampleMeeting {
    meeting_id: "2",
    name: "React Hooks Deep Dive",
    welcome: "Welcome to React Hooks Deep Dive! Advanced concepts in React hooks and state management.",
}];

/// Meeting created by `initSampleMeetings` and the startup warm-up.
pub const WARMUP_MEETING_ID: &str = "2";

/// Create parameters for a meeting that does not exist yet.
///
/// Catalogue entries keep their own name and welcome text; any other ID gets
/// both templated from the ID.
pub fn default_create_params(meeting_id: &str) -> QueryParams {
    let (name, welcome) = match SAMPLE_MEETINGS.iter().find(|m| m.meeting_id == meeting_id) {
        Some(sample) => (sample.name.to_string(), sample.welcome.to_string()),
        None => (
            format!("Meeting {}", meeting_id),
            format!("Welcome to Meeting {}!", meeting_id),
        ),
    };

    QueryParams::new()
        .with("meetingID", meeting_id)
        .with("name", name)
        .with("attendeePW", DEFAULT_ATTENDEE_PW)
        .with("moderatorPW", DEFAULT_MODERATOR_PW)
        .with("welcome", welcome)
        .with("record", true)
        .with("duration", AUTOCREATE_DURATION_MINUTES)
        .with("maxParticipants", AUTOCREATE_MAX_PARTICIPANTS)
}

fn required(value: Option<String>, field: &str) -> Result<String, GatewayError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| GatewayError::BadRequest(format!("{} is required", field)))
}

/// Rewrite a `duplicateWarning` create result to success.
fn accept_duplicate(mut result: MeetingInfoResult) -> MeetingInfoResult {
    if result.returncode == ReturnCode::Failed && result.message_key == DUPLICATE_WARNING_KEY {
        result.returncode = ReturnCode::Success;
        result.message = DUPLICATE_MEETING_MESSAGE.to_string();
    }
    result
}

/// Stateless service; all state lives on the conferencing server.
pub struct MeetingService;

impl MeetingService {
    /// Create a meeting from an inbound request, filling absent fields.
    ///
    /// # Errors
    ///
    /// - `GatewayError::BadRequest` - `meetingID` missing
    /// - `GatewayError::Upstream` - transport failure
    #[instrument(skip_all)]
    pub async fn create_meeting(
        api: &dyn ConferenceApi,
        request: CreateMeetingRequest,
    ) -> Result<MeetingInfoResult, GatewayError> {
        let meeting_id = required(request.meeting_id, "meetingID")?;

        let params = QueryParams::new()
            .with("meetingID", meeting_id.as_str())
            .with_opt("name", request.name)
            .with(
                "attendeePW",
                request
                    .attendee_pw
                    .unwrap_or_else(|| DEFAULT_ATTENDEE_PW.to_string()),
            )
            .with(
                "moderatorPW",
                request
                    .moderator_pw
                    .unwrap_or_else(|| DEFAULT_MODERATOR_PW.to_string()),
            )
            .with(
                "welcome",
                request
                    .welcome
                    .unwrap_or_else(|| "Welcome to the meeting!".to_string()),
            )
            .with("record", request.record.unwrap_or(false))
            .with("duration", request.duration.unwrap_or(0))
            .with("maxParticipants", request.max_participants.unwrap_or(20));

        Self::create(api, &params).await
    }

    /// Send a `create` call, treating an existing meeting as success.
    async fn create(
        api: &dyn ConferenceApi,
        params: &QueryParams,
    ) -> Result<MeetingInfoResult, GatewayError> {
        let result = accept_duplicate(api.execute(Operation::Create, params).await?);

        tracing::info!(
            target: "gateway.service.meetings",
            meeting_id = ?params.get("meetingID"),
            returncode = result.returncode.as_str(),
            message_key = %result.message_key,
            "Create request completed"
        );

        Ok(result)
    }

    async fn lookup(
        api: &dyn ConferenceApi,
        meeting_id: &str,
    ) -> Result<MeetingInfoResult, GatewayError> {
        api.execute(
            Operation::GetMeetingInfo,
            &QueryParams::new().with("meetingID", meeting_id),
        )
        .await
    }

    /// Look the meeting up, creating it when the server does not know it.
    ///
    /// Returns the lookup result and whether a create was issued.
    async fn lookup_or_create(
        api: &dyn ConferenceApi,
        meeting_id: &str,
    ) -> Result<(MeetingInfoResult, bool), GatewayError> {
        let info = Self::lookup(api, meeting_id).await?;
        if !info.is_not_found() {
            return Ok((info, false));
        }

        tracing::info!(
            target: "gateway.service.meetings",
            meeting_id = %meeting_id,
            "Meeting not found, creating with defaults"
        );

        // Losing a creation race is as good as winning it
        let created = Self::create(api, &default_create_params(meeting_id)).await?;
        if !created.is_success() {
            tracing::warn!(
                target: "gateway.service.meetings",
                meeting_id = %meeting_id,
                message_key = %created.message_key,
                "On-demand create did not succeed, continuing anyway"
            );
        }

        Ok((info, true))
    }

    /// Meeting info, creating the meeting first if needed.
    ///
    /// After a create the lookup is repeated once and its result returned
    /// verbatim, including a second `notFound`.
    #[instrument(skip_all, fields(meeting_id = %meeting_id))]
    pub async fn get_meeting_info(
        api: &dyn ConferenceApi,
        meeting_id: &str,
    ) -> Result<MeetingInfoResult, GatewayError> {
        let (info, created) = Self::lookup_or_create(api, meeting_id).await?;
        if !created {
            return Ok(info);
        }

        let info = Self::lookup(api, meeting_id).await?;
        if info.is_not_found() {
            tracing::warn!(
                target: "gateway.service.meetings",
                meeting_id = %meeting_id,
                "Meeting still not found after create"
            );
        }
        Ok(info)
    }

    /// Build the signed join URL, creating the meeting first if needed.
    ///
    /// # Errors
    ///
    /// - `GatewayError::BadRequest` - `meetingID` or `fullName` missing
    /// - `GatewayError::Upstream` - transport failure during lookup/create
    #[instrument(skip_all)]
    pub async fn join(
        api: &dyn ConferenceApi,
        request: JoinMeetingRequest,
    ) -> Result<SignedUrl, GatewayError> {
        let meeting_id = required(request.meeting_id, "meetingID")?;
        let full_name = required(request.full_name, "fullName")?;

        Self::lookup_or_create(api, &meeting_id).await?;

        let params = QueryParams::new()
            .with("meetingID", meeting_id.as_str())
            .with("fullName", full_name)
            .with_opt("password", request.password)
            .with(
                "redirect",
                request.redirect.unwrap_or_else(|| "true".to_string()),
            );

        tracing::info!(
            target: "gateway.service.meetings",
            meeting_id = %meeting_id,
            "Join URL generated"
        );

        Ok(api.signer().sign(Operation::Join, &params))
    }

    #[instrument(skip_all)]
    pub async fn get_meetings(api: &dyn ConferenceApi) -> Result<MeetingInfoResult, GatewayError> {
        api.execute(Operation::GetMeetings, &QueryParams::new())
            .await
    }

    /// End a meeting.
    ///
    /// # Errors
    ///
    /// - `GatewayError::BadRequest` - `meetingID` missing
    #[instrument(skip_all)]
    pub async fn end_meeting(
        api: &dyn ConferenceApi,
        request: EndMeetingRequest,
    ) -> Result<MeetingInfoResult, GatewayError> {
        let meeting_id = required(request.meeting_id, "meetingID")?;

        let params = QueryParams::new()
            .with("meetingID", meeting_id)
            .with_opt("password", request.password);

        api.execute(Operation::End, &params).await
    }

    /// Recordings, optionally restricted to one meeting.
    #[instrument(skip_all)]
    pub async fn get_recordings(
        api: &dyn ConferenceApi,
        meeting_id: Option<String>,
    ) -> Result<MeetingInfoResult, GatewayError> {
        let params =
            QueryParams::new().with_opt("meetingID", meeting_id.filter(|id| !id.is_empty()));

        api.execute(Operation::GetRecordings, &params).await
    }

    /// Create the sample meeting within `deadline`.
    ///
    /// A missed deadline is reported as success with a `TIMEOUT` outcome.
    ///
    /// # Errors
    ///
    /// - `GatewayError::Upstream` - the create call failed in transport
    #[instrument(skip_all)]
    pub async fn init_sample_meetings(
        api: &dyn ConferenceApi,
        deadline: Duration,
    ) -> Result<SampleMeetingsResponse, GatewayError> {
        let params = default_create_params(WARMUP_MEETING_ID);

        match tokio::time::timeout(deadline, Self::create(api, &params)).await {
            Ok(Ok(result)) => Ok(SampleMeetingsResponse {
                returncode: ReturnCode::Success,
                message: "Sample meetings initialized".to_string(),
                meeting_created: SampleMeetingOutcome::Created(result),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::warn!(
                    target: "gateway.service.meetings",
                    deadline_secs = deadline.as_secs(),
                    "Sample meeting creation timed out"
                );
                Ok(SampleMeetingsResponse {
                    returncode: ReturnCode::Success,
                    message: "Server ready (sample meeting creation timed out)".to_string(),
                    meeting_created: SampleMeetingOutcome::timed_out(),
                })
            }
        }
    }
}
