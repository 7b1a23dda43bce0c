//! Recording file handler.
//!
//! Serves files from `RECORDINGS_DIR` through `tower_http::services::ServeFile`,
//! which streams the body and handles `Range`, `HEAD` and content types. Only
//! plain file names are accepted so requests cannot escape the directory.

use crate::errors::{GatewayError, JitsiError};
use crate::routes::AppState;
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::instrument;

const RECORDING_NOT_FOUND: &str = "Recording not found";

/// True for a single path component without traversal.
fn is_plain_file_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && !file_name.contains('/')
        && !file_name.contains('\\')
        && !file_name.contains("..")
        && !file_name.contains('\0')
}

/// Handler for GET /recordings/:file_name
///
/// # Response
///
/// - 200 OK / 206 Partial Content: file contents, streamed
/// - 400 Bad Request: name contains a path separator or `..`
/// - 404 Not Found: `{success: false, error: "Recording not found"}`
#[instrument(skip_all, name = "gateway.recordings.serve")]
pub async fn serve_recording(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
    request: Request,
) -> Result<Response, JitsiError> {
    if !is_plain_file_name(&file_name) {
        tracing::warn!(target: "gateway.recordings", file_name = %file_name, "Refusing recording path outside the recordings directory");
        return Err(GatewayError::BadRequest("Invalid recording name".to_string()).into());
    }

    let path = state.config.recordings_dir.join(&file_name);

    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(target: "gateway.recordings", file_name = %file_name, error = %e, "Failed to serve recording");
            return Err(GatewayError::Internal.into());
        }
    };

    match response.status() {
        StatusCode::NOT_FOUND => {
            tracing::debug!(target: "gateway.recordings", file_name = %file_name, "Recording not found");
            Err(GatewayError::NotFound(RECORDING_NOT_FOUND.to_string()).into())
        }
        status if status.is_server_error() => {
            tracing::error!(target: "gateway.recordings", file_name = %file_name, status = %status, "Failed to read recording");
            Err(GatewayError::Internal.into())
        }
        _ => Ok(response.into_response()),
    }
}
