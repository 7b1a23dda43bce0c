//! HTTP client for the BigBlueButton-compatible conferencing server.
//!
//! Every call goes through [`RequestSigner`] and every response body through
//! the normalizer, so callers only ever see [`MeetingInfoResult`]s. The
//! server reports business failures in the body, so a non-2xx status is not
//! an error here. Only transport failures (timeout, connection reset, DNS)
//! surface as `GatewayError::Upstream`.
//!
//! # Security
//!
//! - Signed URLs contain the checksum and are never logged
//! - Timeouts prevent hanging connections

use crate::errors::GatewayError;
use crate::models::MeetingInfoResult;
use crate::observability::metrics;
use crate::services::normalizer;
use crate::services::signer::{Operation, QueryParams, RequestSigner};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument, warn};

/// Connect timeout for conferencing server requests in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Trait for conferencing API calls (enables mocking).
#[async_trait::async_trait]
pub trait ConferenceApi: Send + Sync {
    /// Signer bound to the configured server and secret.
    fn signer(&self) -> &RequestSigner;

    /// Sign, send and normalize one API call.
    async fn execute(
        &self,
        operation: Operation,
        params: &QueryParams,
    ) -> Result<MeetingInfoResult, GatewayError>;
}

/// Conferencing server client over HTTP.
#[derive(Clone)]
pub struct BbbClient {
    /// HTTP client with configured timeouts.
    client: Client,

    signer: RequestSigner,
}

impl BbbClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Internal` if the HTTP client cannot be built.
    pub fn new(signer: RequestSigner, request_timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                error!(target: "gateway.bbb", error = %e, "Failed to build HTTP client");
                GatewayError::Internal
            })?;

        Ok(Self { client, signer })
    }

    async fn send(&self, operation: Operation, params: &QueryParams) -> Result<String, GatewayError> {
        let url = self.signer.sign(operation, params);

        let request = if operation.is_post() {
            self.client.post(url.as_str())
        } else {
            self.client.get(url.as_str())
        };

        let response = request.send().await.map_err(|e| {
            warn!(target: "gateway.bbb", operation = %operation, error = %e, "Conferencing server request failed");
            GatewayError::Upstream(format!("{} request failed: {}", operation, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "gateway.bbb", operation = %operation, status = %status, "Conferencing server returned non-success status");
        }

        response.text().await.map_err(|e| {
            warn!(target: "gateway.bbb", operation = %operation, error = %e, "Failed to read conferencing server response");
            GatewayError::Upstream(format!("{} response unreadable: {}", operation, e))
        })
    }
}

#[async_trait::async_trait]
impl ConferenceApi for BbbClient {
    fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    #[instrument(skip(self, params), fields(operation = %operation, meeting_id = ?params.get("meetingID")))]
    async fn execute(
        &self,
        operation: Operation,
        params: &QueryParams,
    ) -> Result<MeetingInfoResult, GatewayError> {
        let start = Instant::now();
        let outcome = self.send(operation, params).await;

        match outcome {
            Ok(body) => {
                let result = normalizer::parse(&body);
                debug!(
                    target: "gateway.bbb",
                    returncode = result.returncode.as_str(),
                    message_key = %result.message_key,
                    body_len = body.len(),
                    "Conferencing server responded"
                );
                metrics::record_upstream_request(
                    operation.as_str(),
                    result.returncode.as_str(),
                    start.elapsed(),
                );
                Ok(result)
            }
            Err(e) => {
                metrics::record_upstream_request(operation.as_str(), "error", start.elapsed());
                Err(e)
            }
        }
    }
}

/// Mock conferencing API for testing.
///
/// Replies with scripted XML bodies in order and records every call.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// One scripted reply.
    #[derive(Debug, Clone)]
    pub enum MockReply {
        /// Raw response body, normalized like a real one.
        Body(String),
        /// Simulated transport failure.
        TransportError,
    }

    impl MockReply {
        pub fn body(xml: &str) -> Self {
            MockReply::Body(xml.to_string())
        }
    }

    /// Mock conferencing API.
    pub struct MockConferenceApi {
        signer: RequestSigner,
        replies: Mutex<VecDeque<MockReply>>,
        calls: Mutex<Vec<(Operation, QueryParams)>>,
    }

    impl MockConferenceApi {
        /// Create a mock that answers with `replies` in sequence.
        pub fn with_replies(signer: RequestSigner, replies: Vec<MockReply>) -> Self {
            Self {
                signer,
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Every call made so far, in order.
        pub fn calls(&self) -> Vec<(Operation, QueryParams)> {
            self.calls
                .lock()
                .map(|calls| calls.clone())
                .unwrap_or_default()
        }

        /// Operations called so far, in order.
        pub fn operations(&self) -> Vec<Operation> {
            self.calls().into_iter().map(|(op, _)| op).collect()
        }
    }

    #[async_trait::async_trait]
    impl ConferenceApi for MockConferenceApi {
        fn signer(&self) -> &RequestSigner {
            &self.signer
        }

        async fn execute(
            &self,
            operation: Operation,
            params: &QueryParams,
        ) -> Result<MeetingInfoResult, GatewayError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((operation, params.clone()));
            }

            let reply = self
                .replies
                .lock()
                .ok()
                .and_then(|mut replies| replies.pop_front());

            match reply {
                Some(MockReply::Body(body)) => Ok(normalizer::parse(&body)),
                Some(MockReply::TransportError) => {
                    Err(GatewayError::Upstream("mock transport error".to_string()))
                }
                None => Err(GatewayError::Upstream(format!(
                    "no scripted reply for {}",
                    operation
                ))),
            }
        }
    }
}

pub use mock::{MockConferenceApi, MockReply};
