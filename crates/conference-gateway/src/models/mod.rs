//! Conference Gateway models.
//!
//! Contains the JSON shapes exchanged with the dashboard. Field names follow
//! the conferencing server's API (`meetingID`, `attendeePW`, ...) so the
//! dashboard can treat proxied and direct responses alike.

pub mod jitsi;

use serde::{Deserialize, Serialize};

/// Outcome discriminator of every conferencing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnCode {
    Success,
    Failed,
}

impl ReturnCode {
    /// Parses the server's `returncode` text. Anything but `SUCCESS` is a failure.
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == "SUCCESS" {
            ReturnCode::Success
        } else {
            ReturnCode::Failed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnCode::Success => "SUCCESS",
            ReturnCode::Failed => "FAILED",
        }
    }
}

/// Normalized result of a conferencing API call.
///
/// `meeting` is present only for `SUCCESS` results. `meetings` and
/// `recordings` are present only when the payload carried those lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingInfoResult {
    pub returncode: ReturnCode,
    pub message_key: String,
    pub message: String,

    #[serde(flatten)]
    pub meeting: Option<MeetingAttributes>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meetings: Option<Vec<MeetingSummary>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recordings: Option<Vec<RecordingInfo>>,
}

impl MeetingInfoResult {
    /// A `FAILED` result with no meeting attributes.
    pub fn failed(message_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            returncode: ReturnCode::Failed,
            message_key: message_key.into(),
            message: message.into(),
            meeting: None,
            meetings: None,
            recordings: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.returncode == ReturnCode::Success
    }

    /// True when the server reported the meeting does not exist.
    pub fn is_not_found(&self) -> bool {
        self.returncode == ReturnCode::Failed && self.message_key == "notFound"
    }
}

/// Meeting attributes attached to a `SUCCESS` result.
///
/// `create_time`, `start_time`, `has_user_joined`, `recording` and
/// `max_users` are synthesized at parse time. They approximate the
/// meeting's state and are not read from the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingAttributes {
    #[serde(rename = "meetingID")]
    pub meeting_id: String,
    pub meeting_name: String,
    pub running: bool,
    pub participant_count: u32,
    pub moderator_count: u32,
    #[serde(rename = "attendeePW")]
    pub attendee_pw: String,
    #[serde(rename = "moderatorPW")]
    pub moderator_pw: String,
    /// Parse time in epoch milliseconds.
    pub create_time: i64,
    pub duration: u32,
    pub has_user_joined: bool,
    pub recording: bool,
    pub has_been_forcibly_ended: bool,
    /// Five minutes before parse time when running, otherwise 0.
    pub start_time: i64,
    pub end_time: i64,
    pub listener_count: u32,
    pub voice_participant_count: u32,
    pub video_count: u32,
    pub max_users: u32,
}

/// One entry of a `getMeetings` listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSummary {
    #[serde(rename = "meetingID")]
    pub meeting_id: String,
    pub meeting_name: String,
    pub running: bool,
    pub participant_count: u32,
    pub moderator_count: u32,
    #[serde(rename = "attendeePW")]
    pub attendee_pw: String,
    #[serde(rename = "moderatorPW")]
    pub moderator_pw: String,
    /// Creation time reported by the server (epoch ms), 0 when absent.
    pub create_time: i64,
}

/// One entry of a `getRecordings` listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingInfo {
    #[serde(rename = "recordID")]
    pub record_id: String,
    #[serde(rename = "meetingID")]
    pub meeting_id: String,
    pub name: String,
    pub published: bool,
    pub state: String,
    pub start_time: i64,
    pub end_time: i64,
    pub participants: u32,
    pub playback: Vec<PlaybackFormat>,
}

/// A playback format of a recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub url: String,
    /// Length in minutes.
    pub length: u32,
}

// ============================================================================
// Inbound request models
// ============================================================================

/// Body or query of `POST /api/create`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest {
    #[serde(rename = "meetingID")]
    pub meeting_id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "attendeePW")]
    pub attendee_pw: Option<String>,
    #[serde(rename = "moderatorPW")]
    pub moderator_pw: Option<String>,
    pub welcome: Option<String>,
    pub record: Option<bool>,
    pub duration: Option<u32>,
    pub max_participants: Option<u32>,
}

/// Query of `GET /api/join`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinMeetingRequest {
    #[serde(rename = "meetingID")]
    pub meeting_id: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub redirect: Option<String>,
}

/// Query of `GET /api/getMeetingInfo` and `GET /api/getRecordings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeetingIdQuery {
    #[serde(rename = "meetingID")]
    pub meeting_id: Option<String>,
}

/// Body or query of `POST /api/end`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndMeetingRequest {
    #[serde(rename = "meetingID")]
    pub meeting_id: Option<String>,
    pub password: Option<String>,
}

// ============================================================================
// Outbound (to dashboard) response models
// ============================================================================

/// Response of `GET /api/join?redirect=false`.
#[derive(Debug, Clone, Serialize)]
pub struct JoinUrlResponse {
    pub returncode: ReturnCode,
    #[serde(rename = "joinURL")]
    pub join_url: String,
}

/// Response of `GET /api/test`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResponse {
    pub message: String,
    pub timestamp: String,
    pub bbb_server: String,
    pub jitsi_domain: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
    pub domain: String,
}

/// Outcome of the sample meeting create call.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SampleMeetingOutcome {
    Created(MeetingInfoResult),
    /// The create call did not finish before its deadline.
    TimedOut { returncode: &'static str },
}

impl SampleMeetingOutcome {
    pub fn timed_out() -> Self {
        SampleMeetingOutcome::TimedOut {
            returncode: "TIMEOUT",
        }
    }
}

/// Response of `POST /api/initSampleMeetings`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleMeetingsResponse {
    pub returncode: ReturnCode,
    pub message: String,
    pub meeting_created: SampleMeetingOutcome,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_return_code_parse() {
        assert_eq!(ReturnCode::parse("SUCCESS"), ReturnCode::Success);
        assert_eq!(ReturnCode::parse(" SUCCESS\n"), ReturnCode::Success);
        assert_eq!(ReturnCode::parse("FAILED"), ReturnCode::Failed);
        assert_eq!(ReturnCode::parse("success"), ReturnCode::Failed);
        assert_eq!(ReturnCode::parse(""), ReturnCode::Failed);
    }

    #[test]
    fn test_failed_result_serializes_without_meeting_fields() {
        let result = MeetingInfoResult::failed("notFound", "We could not find a meeting");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["returncode"], "FAILED");
        assert_eq!(json["messageKey"], "notFound");
        assert!(json.get("meetingID").is_none());
        assert!(json.get("meetings").is_none());
        assert!(json.get("recordings").is_none());
        assert!(result.is_not_found());
    }

    #[test]
    fn test_create_request_accepts_api_field_names() {
        let json = r#"{"meetingID":"7","name":"Algebra","attendeePW":"a","moderatorPW":"m","record":true,"maxParticipants":30}"#;
        let request: CreateMeetingRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.meeting_id.as_deref(), Some("7"));
        assert_eq!(request.attendee_pw.as_deref(), Some("a"));
        assert_eq!(request.moderator_pw.as_deref(), Some("m"));
        assert_eq!(request.record, Some(true));
        assert_eq!(request.max_participants, Some(30));
        assert_eq!(request.duration, None);
    }

    #[test]
    fn test_timed_out_outcome_serialization() {
        let json = serde_json::to_value(SampleMeetingOutcome::timed_out()).unwrap();
        assert_eq!(json, serde_json::json!({ "returncode": "TIMEOUT" }));
    }

    #[test]
    fn test_join_url_response_field_name() {
        let response = JoinUrlResponse {
            returncode: ReturnCode::Success,
            join_url: "https://bbb.example.com/api/join?x=1".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["joinURL"], "https://bbb.example.com/api/join?x=1");
        assert_eq!(json["returncode"], "SUCCESS");
    }
}
