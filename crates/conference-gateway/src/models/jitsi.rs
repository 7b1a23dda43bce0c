//! Models for the Jitsi-compatible backend.
//!
//! Jitsi rooms need no server-side provisioning, so meetings and recordings
//! live in the in-memory demo store. Responses carry a `success`
//! discriminator instead of `returncode`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default meeting duration in minutes.
pub const DEFAULT_JITSI_DURATION_MINUTES: u32 = 60;

/// Maximum room name length.
pub const MAX_ROOM_NAME_LENGTH: usize = 50;

/// A meeting held in the demo store.
#[derive(Debug, Clone, PartialEq)]
pub struct JitsiMeeting {
    pub id: String,
    pub room_name: String,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub duration: u32,
    pub participants: Vec<String>,
    pub is_active: bool,
    pub is_recording: bool,
    pub recording_enabled: bool,
}

/// A finished recording held in the demo store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecording {
    pub id: String,
    pub room_name: String,
    pub title: String,
    /// Epoch milliseconds.
    pub start_time: i64,
    /// Epoch milliseconds.
    pub end_time: i64,
    pub file_name: String,
    /// Bytes (mock value).
    pub size: u64,
    /// Path under which the file is served.
    pub url: String,
    pub status: String,
}

/// Mute options applied to a generated meeting URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinOptions {
    pub start_with_video_muted: bool,
    pub start_with_audio_muted: bool,
}

// ============================================================================
// Requests
// ============================================================================

/// Body of `POST /api/jitsi/create-meeting`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJitsiMeetingRequest {
    pub title: Option<String>,
    pub display_name: Option<String>,
    pub duration: Option<u32>,
    pub start_with_video_muted: Option<bool>,
    pub start_with_audio_muted: Option<bool>,
}

/// Body of `POST /api/jitsi/join`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JitsiJoinRequest {
    pub room_name: Option<String>,
    pub display_name: Option<String>,
    pub start_with_video_muted: Option<bool>,
    pub start_with_audio_muted: Option<bool>,
}

/// Query or body naming a room.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomNameRequest {
    pub room_name: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedJitsiMeeting {
    pub id: String,
    pub room_name: String,
    pub title: String,
    pub url: String,
    pub join_url: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateJitsiMeetingResponse {
    pub success: bool,
    pub meeting: CreatedJitsiMeeting,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JitsiJoinResponse {
    pub success: bool,
    pub join_url: String,
    pub room_name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JitsiMeetingInfoResponse {
    pub success: bool,
    pub room_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub participant_count: usize,
    pub is_recording: bool,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JitsiMeetingView {
    pub id: String,
    pub room_name: String,
    pub title: String,
    pub url: String,
    pub created_at: String,
    pub participant_count: usize,
    pub is_active: bool,
    pub is_recording: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct JitsiMeetingsResponse {
    pub success: bool,
    pub meetings: Vec<JitsiMeetingView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingActionResponse {
    pub success: bool,
    pub message: String,
    pub room_name: String,
}

/// A stored recording in the conferencing server's listing shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JitsiRecordingView {
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
    pub playback_url: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JitsiRecordingsResponse {
    pub success: bool,
    pub recordings: Vec<JitsiRecordingView>,
}

impl JitsiMeeting {
    pub fn view(&self) -> JitsiMeetingView {
        JitsiMeetingView {
            id: self.id.clone(),
            room_name: self.room_name.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
            created_at: self.created_at.to_rfc3339(),
            participant_count: self.participants.len(),
            is_active: self.is_active,
            is_recording: self.is_recording,
        }
    }
}
