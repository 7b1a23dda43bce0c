//! Jitsi backend integration tests.
//!
//! The Jitsi endpoints never call the conferencing server; the wiremock
//! upstream is only there to satisfy the harness.

#![allow(clippy::indexing_slicing)]

use gateway_test_utils::TestGatewayServer;
use serde_json::json;
use wiremock::MockServer;

/// Test the demo flow from meeting creation to the recordings listing.
#[tokio::test]
async fn test_meeting_and_recording_flow() -> Result<(), anyhow::Error> {
    let upstream = MockServer::start().await;
    let server = TestGatewayServer::spawn_with_vars(
        &upstream.uri(),
        &[("PUBLIC_BASE_URL", "https://gateway.test")],
    )
    .await?;
    let client = reqwest::Client::new();

    let created: serde_json::Value = client
        .post(format!("{}/api/jitsi/create-meeting", server.url()))
        .json(&json!({ "title": "Weekly Team Sync", "displayName": "Ada" }))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(created["success"], true);
    assert_eq!(created["meeting"]["roomName"], "weekly-team-sync");
    assert_eq!(
        created["meeting"]["url"],
        "https://meet.jit.si/weekly-team-sync?userInfo.displayName=Ada"
    );
    assert_eq!(created["meeting"]["joinUrl"], created["meeting"]["url"]);

    let info: serde_json::Value = client
        .get(format!(
            "{}/api/jitsi/meeting-info?roomName=weekly-team-sync",
            server.url()
        ))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(info["title"], "Weekly Team Sync");
    assert_eq!(info["isRecording"], false);
    assert_eq!(info["participantCount"], 0);

    let started: serde_json::Value = client
        .post(format!("{}/api/jitsi/start-recording", server.url()))
        .json(&json!({ "roomName": "weekly-team-sync" }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(started["message"], "Recording started");

    let info: serde_json::Value = client
        .get(format!(
            "{}/api/jitsi/meeting-info?roomName=weekly-team-sync",
            server.url()
        ))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(info["isRecording"], true);

    client
        .post(format!("{}/api/jitsi/stop-recording", server.url()))
        .json(&json!({ "roomName": "weekly-team-sync" }))
        .send()
        .await?
        .error_for_status()?;

    let listing: serde_json::Value = client
        .get(format!(
            "{}/api/jitsi/recordings?roomName=weekly-team-sync",
            server.url()
        ))
        .send()
        .await?
        .json()
        .await?;
    let recordings = listing["recordings"].as_array().cloned().unwrap_or_default();
    assert_eq!(recordings.len(), 1);
    assert_eq!(recordings[0]["meetingID"], "weekly-team-sync");
    assert_eq!(recordings[0]["name"], "Weekly Team Sync");
    assert_eq!(recordings[0]["state"], "completed");
    let playback = recordings[0]["playbackUrl"].as_str().unwrap_or_default();
    assert!(playback.starts_with("https://gateway.test/recordings/weekly-team-sync_"));
    assert!(playback.ends_with(".mp4"));

    // Other rooms have none
    let listing: serde_json::Value = client
        .get(format!("{}/api/jitsi/recordings?roomName=other", server.url()))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(listing["recordings"], json!([]));

    assert!(upstream.received_requests().await.unwrap_or_default().is_empty());

    Ok(())
}

/// Join builds a URL for any room, registered or not.
#[tokio::test]
async fn test_join_unregistered_room() -> Result<(), anyhow::Error> {
    let upstream = MockServer::start().await;
    let server = TestGatewayServer::spawn(&upstream.uri()).await?;

    let body: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/api/jitsi/join", server.url()))
        .json(&json!({
            "roomName": "standup",
            "displayName": "Grace Hopper",
            "startWithAudioMuted": true
        }))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["success"], true);
    assert_eq!(
        body["joinUrl"],
        "https://meet.jit.si/standup?userInfo.displayName=Grace+Hopper&config.startWithAudioMuted=true"
    );
    assert_eq!(body["displayName"], "Grace Hopper");

    Ok(())
}

/// Missing required fields are 400 with the Jitsi error shape.
#[tokio::test]
async fn test_validation_errors() -> Result<(), anyhow::Error> {
    let upstream = MockServer::start().await;
    let server = TestGatewayServer::spawn(&upstream.uri()).await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/jitsi/create-meeting", server.url()))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(response.status(), 400);
    assert_eq!(
        response.json::<serde_json::Value>().await?,
        json!({ "success": false, "error": "Meeting title is required" })
    );

    let response = client
        .post(format!("{}/api/jitsi/join", server.url()))
        .json(&json!({ "roomName": "standup" }))
        .send()
        .await?;
    assert_eq!(response.status(), 400);
    assert_eq!(
        response.json::<serde_json::Value>().await?["error"],
        "Room name and display name are required"
    );

    Ok(())
}

/// Meetings are listed in creation order.
#[tokio::test]
async fn test_list_meetings() -> Result<(), anyhow::Error> {
    let upstream = MockServer::start().await;
    let server = TestGatewayServer::spawn(&upstream.uri()).await?;
    let client = reqwest::Client::new();

    for title in ["First", "Second"] {
        client
            .post(format!("{}/api/jitsi/create-meeting", server.url()))
            .json(&json!({ "title": title }))
            .send()
            .await?
            .error_for_status()?;
    }

    let body: serde_json::Value = client
        .get(format!("{}/api/jitsi/meetings", server.url()))
        .send()
        .await?
        .json()
        .await?;

    let rooms: Vec<&str> = body["meetings"]
        .as_array()
        .map(|meetings| meetings.iter().filter_map(|m| m["roomName"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(rooms, vec!["first", "second"]);
    assert_eq!(server.store().list_meetings().await.len(), 2);

    Ok(())
}

/// Recording files are served from the configured directory.
#[tokio::test]
async fn test_serve_recording_file() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("standup_1700000000000.mp4"), b"not really video")?;
    let dir_path = dir.path().to_string_lossy().to_string();

    let upstream = MockServer::start().await;
    let server =
        TestGatewayServer::spawn_with_vars(&upstream.uri(), &[("RECORDINGS_DIR", dir_path.as_str())])
            .await?;

    let response =
        reqwest::get(format!("{}/recordings/standup_1700000000000.mp4", server.url())).await?;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("video/mp4")
    );
    assert_eq!(response.bytes().await?.as_ref(), b"not really video");

    let response = reqwest::get(format!("{}/recordings/missing.mp4", server.url())).await?;
    assert_eq!(response.status(), 404);
    assert_eq!(
        response.json::<serde_json::Value>().await?,
        json!({ "success": false, "error": "Recording not found" })
    );

    let response = reqwest::get(format!("{}/recordings/..%2Fsecret", server.url())).await?;
    assert_eq!(response.status(), 400);

    Ok(())
}

/// Recording files honor byte ranges and HEAD, with a content type from the extension.
#[tokio::test]
async fn test_serve_recording_range_and_head() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("lecture.webm"), b"0123456789")?;
    let dir_path = dir.path().to_string_lossy().to_string();

    let upstream = MockServer::start().await;
    let server =
        TestGatewayServer::spawn_with_vars(&upstream.uri(), &[("RECORDINGS_DIR", dir_path.as_str())])
            .await?;
    let client = reqwest::Client::new();
    let url = format!("{}/recordings/lecture.webm", server.url());

    let response = client.get(&url).header("range", "bytes=2-5").send().await?;
    assert_eq!(response.status(), 206);
    assert_eq!(
        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok()),
        Some("bytes 2-5/10")
    );
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("video/webm")
    );
    assert_eq!(response.bytes().await?.as_ref(), b"2345");

    let response = client.head(&url).send().await?;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok()),
        Some("10")
    );
    assert!(response.bytes().await?.is_empty());

    Ok(())
}
