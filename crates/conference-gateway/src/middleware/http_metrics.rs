//! HTTP metrics middleware.
//!
//! Runs outside the router so responses produced before a handler runs are
//! counted too: 404 for unknown paths, 405 for wrong methods, 400/415 from
//! extractor rejections and 408 from the timeout layer.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::observability::metrics::record_http_request;

/// Record method, normalized path, status and duration of every request.
pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    record_http_request(&method, &path, response.status().as_u16(), start.elapsed());

    response
}
