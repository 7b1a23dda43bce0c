//! Conference Gateway error types.
//!
//! Every inbound endpoint answers with a JSON body carrying a discriminator
//! even on failure. Conferencing routes use `{returncode, messageKey, message}`;
//! Jitsi routes wrap the same error in [`JitsiError`] and answer
//! `{success: false, error}`. Transport details are logged, never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message key returned for transport and internal failures.
pub const INTERNAL_ERROR_KEY: &str = "internalError";

/// Client-facing message for transport and internal failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Conference Gateway error type.
///
/// Maps to HTTP status codes:
/// - BadRequest: 400 Bad Request
/// - NotFound: 404 Not Found
/// - Upstream, Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Outbound call to the conferencing server failed (timeout, reset, DNS).
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Internal server error")]
    Internal,
}

impl GatewayError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Upstream(_) | GatewayError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message key and client-facing message for this error.
    fn key_and_message(&self) -> (&'static str, String) {
        match self {
            GatewayError::BadRequest(reason) => ("validationError", reason.clone()),
            GatewayError::NotFound(resource) => ("notFound", resource.clone()),
            GatewayError::Upstream(detail) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "gateway.upstream", error = %detail, "Conferencing server request failed");
                (INTERNAL_ERROR_KEY, INTERNAL_ERROR_MESSAGE.to_string())
            }
            GatewayError::Internal => (INTERNAL_ERROR_KEY, INTERNAL_ERROR_MESSAGE.to_string()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureBody {
    returncode: &'static str,
    message_key: &'static str,
    message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message_key, message) = self.key_and_message();

        let body = FailureBody {
            returncode: "FAILED",
            message_key,
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Error wrapper for the Jitsi routes, rendered as `{success: false, error}`.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct JitsiError(#[from] pub GatewayError);

#[derive(Serialize)]
struct JitsiFailureBody {
    success: bool,
    error: String,
}

impl IntoResponse for JitsiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let (_, error) = self.0.key_and_message();

        (
            status,
            Json(JitsiFailureBody {
                success: false,
                error,
            }),
        )
            .into_response()
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Upstream(err.to_string())
    }
}
