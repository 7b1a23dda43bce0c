//! Jitsi-compatible backend.
//!
//! Jitsi rooms exist as soon as someone opens their URL, so this service only
//! derives room names and URLs and keeps demo bookkeeping in [`MeetingStore`].

use crate::errors::GatewayError;
use crate::models::jitsi::{
    CreateJitsiMeetingRequest, CreateJitsiMeetingResponse, CreatedJitsiMeeting, JitsiJoinRequest,
    JitsiJoinResponse, JitsiMeeting, JitsiMeetingInfoResponse, JitsiMeetingsResponse,
    JitsiRecordingView, JitsiRecordingsResponse, JoinOptions, RecordingActionResponse,
    StoredRecording, DEFAULT_JITSI_DURATION_MINUTES, MAX_ROOM_NAME_LENGTH,
};
use crate::repositories::MeetingStore;
use chrono::Utc;
use rand::Rng;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

/// Derive a URL-safe room name from a meeting title.
///
/// Lowercases, keeps only ASCII letters, digits and whitespace, turns every
/// whitespace run into a single `-` and truncates to 50 characters.
///
/// ```
/// use conference_gateway::services::jitsi::generate_room_name;
///
/// assert_eq!(generate_room_name("Intro to Rust!"), "intro-to-rust");
/// ```
pub fn generate_room_name(title: &str) -> String {
    let mut room = String::with_capacity(title.len());
    let mut in_whitespace = false;

    for c in title.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                room.push('-');
            }
            in_whitespace = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            room.push(c);
            in_whitespace = false;
        }
    }

    room.chars().take(MAX_ROOM_NAME_LENGTH).collect()
}

/// URL that opens `room_name` on `domain` with the given client options.
///
/// # Errors
///
/// Returns `GatewayError::Internal` if `domain` does not form a valid URL.
pub fn meeting_url(
    domain: &str,
    room_name: &str,
    display_name: Option<&str>,
    options: JoinOptions,
) -> Result<String, GatewayError> {
    let mut url = Url::parse(&format!("https://{}/", domain)).map_err(|e| {
        tracing::error!(target: "gateway.jitsi", domain = %domain, error = %e, "Invalid Jitsi domain");
        GatewayError::Internal
    })?;

    url.path_segments_mut()
        .map_err(|()| GatewayError::Internal)?
        .clear()
        .push(room_name);

    let mut query: Vec<(&str, &str)> = Vec::new();
    if let Some(name) = display_name.filter(|n| !n.is_empty()) {
        query.push(("userInfo.displayName", name));
    }
    if options.start_with_video_muted {
        query.push(("config.startWithVideoMuted", "true"));
    }
    if options.start_with_audio_muted {
        query.push(("config.startWithAudioMuted", "true"));
    }

    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    Ok(url.into())
}

fn required(value: Option<String>, message: &str) -> Result<String, GatewayError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| GatewayError::BadRequest(message.to_string()))
}

const ROOM_NAME_REQUIRED: &str = "Room name is required";

/// Jitsi backend operations over the demo store.
pub struct JitsiService;

impl JitsiService {
    /// Register a meeting and return its URL.
    #[instrument(skip_all)]
    pub async fn create_meeting(
        store: &MeetingStore,
        domain: &str,
        request: CreateJitsiMeetingRequest,
    ) -> Result<CreateJitsiMeetingResponse, GatewayError> {
        let title = required(request.title, "Meeting title is required")?;
        let room_name = generate_room_name(&title);
        let options = JoinOptions {
            start_with_video_muted: request.start_with_video_muted.unwrap_or(false),
            start_with_audio_muted: request.start_with_audio_muted.unwrap_or(false),
        };
        let url = meeting_url(domain, &room_name, request.display_name.as_deref(), options)?;

        let meeting = JitsiMeeting {
            id: Uuid::new_v4().to_string(),
            room_name,
            title,
            url,
            created_at: Utc::now(),
            duration: request.duration.unwrap_or(DEFAULT_JITSI_DURATION_MINUTES),
            participants: Vec::new(),
            is_active: false,
            is_recording: false,
            recording_enabled: true,
        };

        tracing::info!(
            target: "gateway.jitsi",
            meeting_id = %meeting.id,
            room_name = %meeting.room_name,
            "Jitsi meeting created"
        );

        let created = CreatedJitsiMeeting {
            id: meeting.id.clone(),
            room_name: meeting.room_name.clone(),
            title: meeting.title.clone(),
            url: meeting.url.clone(),
            join_url: meeting.url.clone(),
            created_at: meeting.created_at.to_rfc3339(),
        };
        store.insert_meeting(meeting).await;

        Ok(CreateJitsiMeetingResponse {
            success: true,
            meeting: created,
        })
    }

    /// Build a join URL for any room; the room need not be registered.
    pub fn join(domain: &str, request: JitsiJoinRequest) -> Result<JitsiJoinResponse, GatewayError> {
        const MESSAGE: &str = "Room name and display name are required";
        let room_name = required(request.room_name, MESSAGE)?;
        let display_name = required(request.display_name, MESSAGE)?;

        let options = JoinOptions {
            start_with_video_muted: request.start_with_video_muted.unwrap_or(false),
            start_with_audio_muted: request.start_with_audio_muted.unwrap_or(false),
        };
        let join_url = meeting_url(domain, &room_name, Some(&display_name), options)?;

        Ok(JitsiJoinResponse {
            success: true,
            join_url,
            room_name,
            display_name,
        })
    }

    /// Info for a room. Unknown rooms report zeroed state rather than an error.
    pub async fn meeting_info(
        store: &MeetingStore,
        room_name: Option<String>,
    ) -> Result<JitsiMeetingInfoResponse, GatewayError> {
        let room_name = required(room_name, ROOM_NAME_REQUIRED)?;

        let response = match store.find_by_room(&room_name).await {
            Some(meeting) => JitsiMeetingInfoResponse {
                success: true,
                room_name: meeting.room_name,
                title: Some(meeting.title),
                participant_count: meeting.participants.len(),
                is_recording: meeting.is_recording,
                is_active: meeting.is_active,
                created_at: Some(meeting.created_at.to_rfc3339()),
            },
            None => JitsiMeetingInfoResponse {
                success: true,
                room_name,
                title: None,
                participant_count: 0,
                is_recording: false,
                is_active: false,
                created_at: None,
            },
        };

        Ok(response)
    }

    pub async fn list_meetings(store: &MeetingStore) -> JitsiMeetingsResponse {
        JitsiMeetingsResponse {
            success: true,
            meetings: store
                .list_meetings()
                .await
                .iter()
                .map(JitsiMeeting::view)
                .collect(),
        }
    }

    #[instrument(skip_all)]
    pub async fn start_recording(
        store: &MeetingStore,
        room_name: Option<String>,
    ) -> Result<RecordingActionResponse, GatewayError> {
        let room_name = required(room_name, ROOM_NAME_REQUIRED)?;

        let known = store.start_recording(&room_name).await;
        tracing::info!(target: "gateway.jitsi", room_name = %room_name, known, "Recording started");

        Ok(RecordingActionResponse {
            success: true,
            message: "Recording started".to_string(),
            room_name,
        })
    }

    #[instrument(skip_all)]
    pub async fn stop_recording(
        store: &MeetingStore,
        room_name: Option<String>,
    ) -> Result<RecordingActionResponse, GatewayError> {
        let room_name = required(room_name, ROOM_NAME_REQUIRED)?;

        match store.stop_recording(&room_name, Utc::now()).await {
            Some(recording) => tracing::info!(
                target: "gateway.jitsi",
                room_name = %room_name,
                file_name = %recording.file_name,
                "Recording stopped"
            ),
            None => tracing::info!(
                target: "gateway.jitsi",
                room_name = %room_name,
                "Recording stopped for unknown room, nothing stored"
            ),
        }

        Ok(RecordingActionResponse {
            success: true,
            message: "Recording stopped".to_string(),
            room_name,
        })
    }

    /// Stored recordings in the conferencing server's listing shape.
    ///
    /// Participant counts are mock values between 1 and 5.
    pub async fn recordings(
        store: &MeetingStore,
        public_base_url: &str,
        room_name: Option<String>,
    ) -> JitsiRecordingsResponse {
        let room_filter = room_name.filter(|r| !r.is_empty());
        let stored = store.recordings(room_filter.as_deref()).await;

        let mut rng = rand::thread_rng();
        let recordings = stored
            .into_iter()
            .map(|recording| recording_view(recording, public_base_url, rng.gen_range(1..=5)))
            .collect();

        JitsiRecordingsResponse {
            success: true,
            recordings,
        }
    }
}

fn recording_view(
    recording: StoredRecording,
    public_base_url: &str,
    participants: u32,
) -> JitsiRecordingView {
    JitsiRecordingView {
        record_id: recording.id,
        meeting_id: recording.room_name,
        name: recording.title,
        published: true,
        state: recording.status,
        start_time: recording.start_time,
        end_time: recording.end_time,
        participants,
        playback_url: format!("{}{}", public_base_url, recording.url),
        size: recording.size,
    }
}
