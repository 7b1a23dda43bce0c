//! Request signing for the conferencing server API.
//!
//! Every call is authenticated by a checksum: the SHA-1 hex digest of
//! `operation name + canonical query string + shared secret`. The checksum
//! is computed over the exact query string placed in the URL, so
//! canonicalization and signing live together here and nowhere else.
//!
//! Signing is a pure function of `(operation, params, config)`: no caching,
//! no clock, no randomness.

use crate::config::Config;
use common::secret::{ExposeSecret, SecretString};
use sha1::{Digest, Sha1};
use std::fmt;
use url::form_urlencoded;

/// Conferencing API operations proxied by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Join,
    GetMeetingInfo,
    GetMeetings,
    End,
    GetRecordings,
}

impl Operation {
    /// API call name, used in the URL path and as the checksum prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Join => "join",
            Operation::GetMeetingInfo => "getMeetingInfo",
            Operation::GetMeetings => "getMeetings",
            Operation::End => "end",
            Operation::GetRecordings => "getRecordings",
        }
    }

    /// Whether the call is sent as POST (state-changing calls) or GET.
    pub fn is_post(&self) -> bool {
        matches!(self, Operation::Create | Operation::End)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primitive parameter value, rendered to text before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Bool(bool),
    Int(i64),
}

impl ParamValue {
    fn render(&self) -> String {
        match self {
            ParamValue::Text(text) => text.clone(),
            ParamValue::Bool(flag) => flag.to_string(),
            ParamValue::Int(number) => number.to_string(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

/// Ordered parameter set of one API call.
///
/// Insertion order is the encoding order. Absent values are kept as `None`
/// so callers can pass optional fields through unchanged; they are dropped
/// at canonicalization time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Option<ParamValue>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to a present value.
    pub fn with(self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.with_opt(key, Some(value))
    }

    /// Set `key` to an optional value. Re-setting a key keeps its position.
    pub fn with_opt<V: Into<ParamValue>>(mut self, key: &str, value: Option<V>) -> Self {
        let value = value.map(Into::into);
        match self.entries.iter_mut().find(|(existing, _)| existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
        self
    }

    /// Value of `key` rendered as text, if present.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .and_then(|(_, value)| value.as_ref())
            .map(ParamValue::render)
    }

    /// Form-encode the present entries, in insertion order, joined with `&`.
    ///
    /// Spaces become `+`; everything outside `[A-Za-z0-9*-._]` is
    /// percent-encoded.
    pub fn canonical(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.entries {
            if let Some(value) = value {
                serializer.append_pair(key, &value.render());
            }
        }
        serializer.finish()
    }
}

/// A fully signed API URL.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedUrl {
    url: String,
    checksum: String,
}

impl SignedUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn into_string(self) -> String {
        self.url
    }
}

impl fmt::Debug for SignedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedUrl")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SignedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Builds signed URLs for one conferencing server.
///
/// Holds the server base URL and shared secret; both are fixed at
/// construction.
#[derive(Clone)]
pub struct RequestSigner {
    server_base_url: String,
    api_secret: SecretString,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("server_base_url", &self.server_base_url)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

impl RequestSigner {
    pub fn new(server_base_url: impl Into<String>, api_secret: SecretString) -> Self {
        let server_base_url: String = server_base_url.into();
        Self {
            server_base_url: server_base_url.trim_end_matches('/').to_string(),
            api_secret,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bbb_server_url.clone(), config.bbb_api_secret.clone())
    }

    pub fn server_base_url(&self) -> &str {
        &self.server_base_url
    }

    /// Lowercase hex SHA-1 of `operation + canonical_query + secret`.
    pub fn checksum(&self, operation: Operation, canonical_query: &str) -> String {
        let mut hasher = Sha1::new();
        hasher.update(operation.as_str().as_bytes());
        hasher.update(canonical_query.as_bytes());
        hasher.update(self.api_secret.expose_secret().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Build `{base}/api/{operation}?{query}&checksum={checksum}`.
    pub fn sign(&self, operation: Operation, params: &QueryParams) -> SignedUrl {
        let query = params.canonical();
        let checksum = self.checksum(operation, &query);
        let url = format!(
            "{}/api/{}?{}&checksum={}",
            self.server_base_url,
            operation.as_str(),
            query,
            checksum
        );

        SignedUrl { url, checksum }
    }
}
