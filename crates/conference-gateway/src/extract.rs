//! Request extractors.

use crate::errors::GatewayError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Query, Request},
    http::header,
};
use serde::de::DeserializeOwned;

/// Parameters from a JSON body, or from the query string otherwise.
///
/// The body is used when the request declares `application/json` and is not
/// empty. Malformed input is rejected with `GatewayError::BadRequest` (400)
/// instead of axum's default 422.
#[derive(Debug, Clone)]
pub struct JsonOrQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonOrQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|content_type| content_type.starts_with("application/json"));
        let uri = req.uri().clone();

        if is_json {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| GatewayError::BadRequest(e.body_text()))?;

            if !body.is_empty() {
                let value = serde_json::from_slice(&body).map_err(|e| {
                    tracing::debug!(target: "gateway.extract", error = %e, "Invalid request body");
                    GatewayError::BadRequest("Invalid request body".to_string())
                })?;
                return Ok(Self(value));
            }
        }

        let Query(value) = Query::try_from_uri(&uri).map_err(|e| {
            tracing::debug!(target: "gateway.extract", error = %e, "Invalid query string");
            GatewayError::BadRequest(e.body_text())
        })?;

        Ok(Self(value))
    }
}
