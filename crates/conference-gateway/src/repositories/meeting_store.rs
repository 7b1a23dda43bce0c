//! In-memory store for Jitsi demo meetings and recordings.
//!
//! Lives for the lifetime of the process and is shared through `AppState`.
//! Meetings are kept in insertion order so room lookups resolve to the
//! oldest meeting with that room name.

use crate::models::jitsi::{JitsiMeeting, StoredRecording};
use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Upper bound (exclusive) of the mock recording size in bytes.
const MOCK_RECORDING_MAX_SIZE: u64 = 100_000_000;

#[derive(Debug, Default)]
struct StoreInner {
    meetings: Vec<JitsiMeeting>,
    recordings: Vec<StoredRecording>,
}

/// Meetings and recordings of the Jitsi backend.
#[derive(Debug, Default)]
pub struct MeetingStore {
    inner: RwLock<StoreInner>,
}

impl MeetingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_meeting(&self, meeting: JitsiMeeting) {
        self.inner.write().await.meetings.push(meeting);
    }

    /// First meeting created with `room_name`.
    pub async fn find_by_room(&self, room_name: &str) -> Option<JitsiMeeting> {
        self.inner
            .read()
            .await
            .meetings
            .iter()
            .find(|m| m.room_name == room_name)
            .cloned()
    }

    pub async fn list_meetings(&self) -> Vec<JitsiMeeting> {
        self.inner.read().await.meetings.clone()
    }

    /// Mark the room's meeting as recording. Returns false for unknown rooms.
    pub async fn start_recording(&self, room_name: &str) -> bool {
        let mut inner = self.inner.write().await;
        match inner.meetings.iter_mut().find(|m| m.room_name == room_name) {
            Some(meeting) => {
                meeting.is_recording = true;
                true
            }
            None => false,
        }
    }

    /// Stop recording the room's meeting and store a completed recording.
    ///
    /// Returns `None` for unknown rooms; nothing is stored then.
    pub async fn stop_recording(
        &self,
        room_name: &str,
        now: DateTime<Utc>,
    ) -> Option<StoredRecording> {
        let mut inner = self.inner.write().await;

        let meeting = inner
            .meetings
            .iter_mut()
            .find(|m| m.room_name == room_name)?;
        meeting.is_recording = false;

        let file_name = format!("{}_{}.mp4", room_name, now.timestamp_millis());
        let recording = StoredRecording {
            id: Uuid::new_v4().to_string(),
            room_name: room_name.to_string(),
            title: meeting.title.clone(),
            start_time: meeting.created_at.timestamp_millis(),
            end_time: now.timestamp_millis(),
            url: format!("/recordings/{}", file_name),
            file_name,
            size: rand::thread_rng().gen_range(0..MOCK_RECORDING_MAX_SIZE),
            status: "completed".to_string(),
        };

        inner.recordings.push(recording.clone());
        Some(recording)
    }

    /// Stored recordings, optionally only those of one room.
    pub async fn recordings(&self, room_name: Option<&str>) -> Vec<StoredRecording> {
        self.inner
            .read()
            .await
            .recordings
            .iter()
            .filter(|r| room_name.map_or(true, |room| r.room_name == room))
            .cloned()
            .collect()
    }
}
