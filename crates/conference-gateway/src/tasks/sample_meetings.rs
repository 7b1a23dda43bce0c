//! Startup warm-up of the sample meeting.
//!
//! Creates the sample meeting once so the first dashboard visitor does not
//! pay for it. Bounded by `STARTUP_WARMUP_TIMEOUT_SECONDS`; every outcome is
//! logged and none stops the server.

use crate::models::SampleMeetingOutcome;
use crate::observability::metrics;
use crate::services::{ConferenceApi, MeetingService};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// How the warm-up ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmupOutcome {
    /// The create call returned (with any returncode).
    Created,
    /// The deadline passed first.
    TimedOut,
    /// The create call failed in transport.
    Failed,
}

impl WarmupOutcome {
    fn as_str(self) -> &'static str {
        match self {
            WarmupOutcome::Created => "created",
            WarmupOutcome::TimedOut => "timeout",
            WarmupOutcome::Failed => "error",
        }
    }
}

/// Create the sample meeting within `deadline`.
///
/// Meant to be spawned; the server accepts requests meanwhile.
#[instrument(skip_all, name = "gateway.task.warmup")]
pub async fn warm_up(api: Arc<dyn ConferenceApi>, deadline: Duration) -> WarmupOutcome {
    info!(
        target: "gateway.warmup",
        deadline_secs = deadline.as_secs(),
        "Initializing sample meetings"
    );

    let outcome = match MeetingService::init_sample_meetings(api.as_ref(), deadline).await {
        Ok(response) => match response.meeting_created {
            SampleMeetingOutcome::Created(result) => {
                info!(
                    target: "gateway.warmup",
                    returncode = result.returncode.as_str(),
                    message_key = %result.message_key,
                    "Sample meeting initialized"
                );
                WarmupOutcome::Created
            }
            SampleMeetingOutcome::TimedOut { .. } => {
                warn!(target: "gateway.warmup", "Sample meeting creation timed out, continuing");
                WarmupOutcome::TimedOut
            }
        },
        Err(e) => {
            warn!(target: "gateway.warmup", error = %e, "Sample meeting creation failed, continuing");
            WarmupOutcome::Failed
        }
    };

    metrics::record_warmup(outcome.as_str());
    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::services::{MockConferenceApi, MockReply, RequestSigner};
    use common::secret::SecretString;

    fn api(replies: Vec<MockReply>) -> Arc<MockConferenceApi> {
        Arc::new(MockConferenceApi::with_replies(
            RequestSigner::new("https://bbb.test", SecretString::from("secret")),
            replies,
        ))
    }

    #[tokio::test]
    async fn test_warm_up_creates_sample_meeting() {
        let mock = api(vec![MockReply::body(
            "<response><returncode>SUCCESS</returncode><meetingID>2</meetingID></response>",
        )]);

        let outcome = warm_up(mock.clone(), Duration::from_secs(1)).await;

        assert_eq!(outcome, WarmupOutcome::Created);
        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls.first().unwrap().1.get("name").as_deref(),
            Some("React Hooks Deep Dive")
        );
    }

    #[tokio::test]
    async fn test_warm_up_transport_failure_is_not_fatal() {
        let mock = api(vec![MockReply::TransportError]);

        let outcome = warm_up(mock, Duration::from_secs(1)).await;

        assert_eq!(outcome, WarmupOutcome::Failed);
    }
}
