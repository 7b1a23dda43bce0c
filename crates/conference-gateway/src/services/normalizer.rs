//! Response normalization for the conferencing server API.
//!
//! The server answers every call with an XML document rooted at
//! `<response>`. This module deserializes it into a typed schema where every
//! field is optional, then maps it to [`MeetingInfoResult`] with fixed
//! defaults for absent fields. Normalization never fails: an unparseable
//! body becomes a `FAILED`/`xmlParseError` result.

use crate::models::{
    MeetingAttributes, MeetingInfoResult, MeetingSummary, PlaybackFormat, RecordingInfo,
    ReturnCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

/// Message key of a result produced from an unparseable body.
pub const XML_PARSE_ERROR_KEY: &str = "xmlParseError";

/// Message of a result produced from an unparseable body.
pub const XML_PARSE_ERROR_MESSAGE: &str = "Failed to parse XML response";

/// Attendee password assumed when the server omits it or the caller supplies none.
pub const DEFAULT_ATTENDEE_PW: &str = "ap";

/// Moderator password assumed when the server omits it or the caller supplies none.
pub const DEFAULT_MODERATOR_PW: &str = "mp";

/// Capacity reported for every meeting (not returned by `getMeetingInfo`).
pub const SYNTHESIZED_MAX_USERS: u32 = 20;

/// How far before parse time a running meeting is assumed to have started.
const SYNTHESIZED_START_OFFSET_MS: i64 = 5 * 60 * 1000;

#[derive(Debug, Default, Deserialize)]
struct RawResponse {
    returncode: Option<String>,
    #[serde(rename = "messageKey")]
    message_key: Option<String>,
    message: Option<String>,
    #[serde(rename = "meetingID")]
    meeting_id: Option<String>,
    #[serde(rename = "meetingName")]
    meeting_name: Option<String>,
    running: Option<String>,
    #[serde(rename = "participantCount")]
    participant_count: Option<String>,
    #[serde(rename = "moderatorCount")]
    moderator_count: Option<String>,
    #[serde(rename = "attendeePW")]
    attendee_pw: Option<String>,
    #[serde(rename = "moderatorPW")]
    moderator_pw: Option<String>,
    meetings: Option<RawMeetingList>,
    recordings: Option<RawRecordingList>,
}

impl RawResponse {
    fn has_recognizable_content(&self) -> bool {
        self.returncode.is_some()
            || self.message_key.is_some()
            || self.message.is_some()
            || self.meeting_id.is_some()
            || self.meetings.is_some()
            || self.recordings.is_some()
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawMeetingList {
    #[serde(default)]
    meeting: Vec<RawMeeting>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMeeting {
    #[serde(rename = "meetingID")]
    meeting_id: Option<String>,
    #[serde(rename = "meetingName")]
    meeting_name: Option<String>,
    running: Option<String>,
    #[serde(rename = "participantCount")]
    participant_count: Option<String>,
    #[serde(rename = "moderatorCount")]
    moderator_count: Option<String>,
    #[serde(rename = "attendeePW")]
    attendee_pw: Option<String>,
    #[serde(rename = "moderatorPW")]
    moderator_pw: Option<String>,
    #[serde(rename = "createTime")]
    create_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRecordingList {
    #[serde(default)]
    recording: Vec<RawRecording>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRecording {
    #[serde(rename = "recordID")]
    record_id: Option<String>,
    #[serde(rename = "meetingID")]
    meeting_id: Option<String>,
    name: Option<String>,
    published: Option<String>,
    state: Option<String>,
    #[serde(rename = "startTime")]
    start_time: Option<String>,
    #[serde(rename = "endTime")]
    end_time: Option<String>,
    participants: Option<String>,
    playback: Option<RawPlayback>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPlayback {
    #[serde(default)]
    format: Vec<RawFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFormat {
    #[serde(rename = "type")]
    format_type: Option<String>,
    url: Option<String>,
    length: Option<String>,
}

/// Normalize a raw response body, stamping synthesized fields with the current time.
pub fn parse(raw: &str) -> MeetingInfoResult {
    parse_at(raw, Utc::now())
}

/// Normalize a raw response body as if parsed at `now`.
pub fn parse_at(raw: &str, now: DateTime<Utc>) -> MeetingInfoResult {
    match quick_xml::de::from_str::<RawResponse>(raw) {
        Ok(doc) if doc.has_recognizable_content() => normalize(doc, now),
        Ok(_) => {
            warn!(target: "gateway.normalizer", body_len = raw.len(), "Response has no recognizable elements");
            xml_parse_error()
        }
        Err(e) => {
            warn!(target: "gateway.normalizer", error = %e, body_len = raw.len(), "Failed to parse XML response");
            xml_parse_error()
        }
    }
}

/// The result reported for a body that could not be parsed.
pub fn xml_parse_error() -> MeetingInfoResult {
    MeetingInfoResult::failed(XML_PARSE_ERROR_KEY, XML_PARSE_ERROR_MESSAGE)
}

fn normalize(doc: RawResponse, now: DateTime<Utc>) -> MeetingInfoResult {
    let returncode = doc
        .returncode
        .as_deref()
        .map(ReturnCode::parse)
        .unwrap_or(ReturnCode::Failed);

    let meetings = doc.meetings.map(|list| {
        list.meeting
            .into_iter()
            .map(normalize_meeting_summary)
            .collect()
    });
    let recordings = doc.recordings.map(|list| {
        list.recording
            .into_iter()
            .map(normalize_recording)
            .collect()
    });

    let meeting = (returncode == ReturnCode::Success).then(|| {
        let running = flag(doc.running.as_deref());
        let participant_count = count(doc.participant_count.as_deref());
        let now_ms = now.timestamp_millis();

        MeetingAttributes {
            meeting_id: text(doc.meeting_id),
            meeting_name: text(doc.meeting_name),
            running,
            participant_count,
            moderator_count: count(doc.moderator_count.as_deref()),
            attendee_pw: text_or(doc.attendee_pw, DEFAULT_ATTENDEE_PW),
            moderator_pw: text_or(doc.moderator_pw, DEFAULT_MODERATOR_PW),
            create_time: now_ms,
            duration: 0,
            has_user_joined: running,
            recording: false,
            has_been_forcibly_ended: false,
            start_time: if running {
                now_ms - SYNTHESIZED_START_OFFSET_MS
            } else {
                0
            },
            end_time: 0,
            listener_count: 0,
            voice_participant_count: participant_count,
            video_count: participant_count,
            max_users: SYNTHESIZED_MAX_USERS,
        }
    });

    MeetingInfoResult {
        returncode,
        message_key: text(doc.message_key),
        message: text(doc.message),
        meeting,
        meetings,
        recordings,
    }
}

fn normalize_meeting_summary(raw: RawMeeting) -> MeetingSummary {
    MeetingSummary {
        meeting_id: text(raw.meeting_id),
        meeting_name: text(raw.meeting_name),
        running: flag(raw.running.as_deref()),
        participant_count: count(raw.participant_count.as_deref()),
        moderator_count: count(raw.moderator_count.as_deref()),
        attendee_pw: text_or(raw.attendee_pw, DEFAULT_ATTENDEE_PW),
        moderator_pw: text_or(raw.moderator_pw, DEFAULT_MODERATOR_PW),
        create_time: millis(raw.create_time.as_deref()),
    }
}

fn normalize_recording(raw: RawRecording) -> RecordingInfo {
    RecordingInfo {
        record_id: text(raw.record_id),
        meeting_id: text(raw.meeting_id),
        name: text(raw.name),
        published: flag(raw.published.as_deref()),
        state: text(raw.state),
        start_time: millis(raw.start_time.as_deref()),
        end_time: millis(raw.end_time.as_deref()),
        participants: count(raw.participants.as_deref()),
        playback: raw
            .playback
            .map(|playback| {
                playback
                    .format
                    .into_iter()
                    .map(|format| PlaybackFormat {
                        format_type: text(format.format_type),
                        url: text(format.url),
                        length: count(format.length.as_deref()),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn text_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim() == "true")
}

fn count(value: Option<&str>) -> u32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

fn millis(value: Option<&str>) -> i64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    const MEETING_INFO_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
  <returncode>SUCCESS</returncode>
  <meetingName>Algebra II</meetingName>
  <meetingID>42</meetingID>
  <createTime>1699999000000</createTime>
  <attendeePW>student</attendeePW>
  <moderatorPW>lecturer</moderatorPW>
  <running>true</running>
  <participantCount>7</participantCount>
  <moderatorCount>1</moderatorCount>
  <attendees>
    <attendee><userID>u1</userID><fullName>Ada</fullName></attendee>
    <attendee><userID>u2</userID><fullName>Alan</fullName></attendee>
  </attendees>
  <metadata/>
</response>"#;

    #[test]
    fn test_parses_meeting_info() {
        let result = parse_at(MEETING_INFO_XML, fixed_now());

        assert_eq!(result.returncode, ReturnCode::Success);
        let meeting = result.meeting.expect("SUCCESS carries meeting attributes");
        assert_eq!(meeting.meeting_id, "42");
        assert_eq!(meeting.meeting_name, "Algebra II");
        assert!(meeting.running);
        assert_eq!(meeting.participant_count, 7);
        assert_eq!(meeting.moderator_count, 1);
        assert_eq!(meeting.attendee_pw, "student");
        assert_eq!(meeting.moderator_pw, "lecturer");
    }

    #[test]
    fn test_synthesized_fields_use_parse_time() {
        let result = parse_at(MEETING_INFO_XML, fixed_now());
        let meeting = result.meeting.unwrap();

        // createTime is parse time, not the server's createTime
        assert_eq!(meeting.create_time, 1_700_000_000_000);
        assert_eq!(meeting.start_time, 1_700_000_000_000 - 300_000);
        assert!(meeting.has_user_joined);
        assert!(!meeting.recording);
        assert_eq!(meeting.max_users, 20);
        assert_eq!(meeting.voice_participant_count, 7);
        assert_eq!(meeting.video_count, 7);
    }

    #[test]
    fn test_missing_counts_and_passwords_default() {
        let xml = "<response><returncode>SUCCESS</returncode><running>true</running></response>";
        let meeting = parse_at(xml, fixed_now()).meeting.unwrap();

        assert_eq!(meeting.participant_count, 0);
        assert_eq!(meeting.moderator_count, 0);
        assert!(meeting.has_user_joined);
        assert_eq!(meeting.attendee_pw, "ap");
        assert_eq!(meeting.moderator_pw, "mp");
        assert_eq!(meeting.meeting_id, "");
    }

    #[test]
    fn test_not_running_meeting_has_zero_start_time() {
        let xml = "<response><returncode>SUCCESS</returncode><running>false</running></response>";
        let meeting = parse_at(xml, fixed_now()).meeting.unwrap();

        assert!(!meeting.running);
        assert!(!meeting.has_user_joined);
        assert_eq!(meeting.start_time, 0);
    }

    #[test]
    fn test_failed_response_has_no_meeting_attributes() {
        let xml = "<response><returncode>FAILED</returncode><messageKey>notFound</messageKey>\
                   <message>We could not find a meeting with that meeting ID</message></response>";
        let result = parse_at(xml, fixed_now());

        assert_eq!(result.returncode, ReturnCode::Failed);
        assert_eq!(result.message_key, "notFound");
        assert_eq!(
            result.message,
            "We could not find a meeting with that meeting ID"
        );
        assert!(result.meeting.is_none());
        assert!(result.is_not_found());
    }

    #[test]
    fn test_missing_returncode_defaults_to_failed() {
        let xml = "<response><messageKey>checksumError</messageKey></response>";
        let result = parse_at(xml, fixed_now());

        assert_eq!(result.returncode, ReturnCode::Failed);
        assert_eq!(result.message_key, "checksumError");
        assert_eq!(result.message, "");
    }

    #[test]
    fn test_plain_text_body_is_parse_error() {
        let result = parse_at("502 Bad Gateway", fixed_now());

        assert_eq!(result.returncode, ReturnCode::Failed);
        assert_eq!(result.message_key, "xmlParseError");
        assert_eq!(result.message, "Failed to parse XML response");
    }

    #[test]
    fn test_empty_body_is_parse_error() {
        let result = parse_at("", fixed_now());
        assert_eq!(result.message_key, "xmlParseError");
    }

    #[test]
    fn test_unrecognized_elements_are_parse_error() {
        let result = parse_at("<html><body>Maintenance</body></html>", fixed_now());
        assert_eq!(result.returncode, ReturnCode::Failed);
        assert_eq!(result.message_key, "xmlParseError");
    }

    #[test]
    fn test_mismatched_tags_are_parse_error() {
        let result = parse_at(
            "<response><returncode>SUCCESS</response>",
            fixed_now(),
        );
        assert_eq!(result.message_key, "xmlParseError");
    }

    #[test]
    fn test_escaped_text_is_unescaped() {
        let xml = "<response><returncode>SUCCESS</returncode>\
                   <meetingName>Q&amp;A session</meetingName></response>";
        let meeting = parse_at(xml, fixed_now()).meeting.unwrap();
        assert_eq!(meeting.meeting_name, "Q&A session");
    }

    #[test]
    fn test_parses_meeting_listing() {
        let xml = r#"<response>
  <returncode>SUCCESS</returncode>
  <meetings>
    <meeting>
      <meetingName>Algebra II</meetingName>
      <meetingID>42</meetingID>
      <createTime>1699999000000</createTime>
      <attendeePW>student</attendeePW>
      <moderatorPW>lecturer</moderatorPW>
      <running>true</running>
      <participantCount>3</participantCount>
      <moderatorCount>1</moderatorCount>
    </meeting>
    <meeting>
      <meetingName>Biology</meetingName>
      <meetingID>7</meetingID>
      <running>false</running>
    </meeting>
  </meetings>
</response>"#;
        let result = parse_at(xml, fixed_now());

        assert!(result.is_success());
        let meetings = result.meetings.expect("listing present");
        assert_eq!(meetings.len(), 2);
        assert_eq!(meetings[0].meeting_id, "42");
        assert_eq!(meetings[0].create_time, 1_699_999_000_000);
        assert_eq!(meetings[0].participant_count, 3);
        assert_eq!(meetings[1].meeting_name, "Biology");
        assert!(!meetings[1].running);
        assert_eq!(meetings[1].attendee_pw, "ap");
        assert_eq!(meetings[1].create_time, 0);
    }

    #[test]
    fn test_parses_recording_listing() {
        let xml = r#"<response>
  <returncode>SUCCESS</returncode>
  <recordings>
    <recording>
      <recordID>rec-1</recordID>
      <meetingID>42</meetingID>
      <name>Algebra II</name>
      <published>true</published>
      <state>published</state>
      <startTime>1699990000000</startTime>
      <endTime>1699993600000</endTime>
      <participants>5</participants>
      <metadata><isBreakout>false</isBreakout></metadata>
      <playback>
        <format>
          <type>presentation</type>
          <url>https://bbb.example.com/playback/presentation/2.3/rec-1</url>
          <length>60</length>
        </format>
      </playback>
    </recording>
  </recordings>
</response>"#;
        let result = parse_at(xml, fixed_now());

        let recordings = result.recordings.expect("listing present");
        assert_eq!(recordings.len(), 1);
        let recording = &recordings[0];
        assert_eq!(recording.record_id, "rec-1");
        assert_eq!(recording.meeting_id, "42");
        assert!(recording.published);
        assert_eq!(recording.state, "published");
        assert_eq!(recording.end_time - recording.start_time, 3_600_000);
        assert_eq!(recording.participants, 5);
        assert_eq!(recording.playback.len(), 1);
        assert_eq!(recording.playback[0].format_type, "presentation");
        assert_eq!(recording.playback[0].length, 60);
    }

    #[test]
    fn test_serialized_result_uses_api_field_names() {
        let result = parse_at(MEETING_INFO_XML, fixed_now());
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["returncode"], "SUCCESS");
        assert_eq!(json["meetingID"], "42");
        assert_eq!(json["attendeePW"], "student");
        assert_eq!(json["participantCount"], 7);
        assert_eq!(json["hasUserJoined"], true);
        assert_eq!(json["maxUsers"], 20);
        assert!(json.get("meeting").is_none());
    }
}
