//! Tracing setup shared by Lectern binaries.
//!
//! Every service logs through `tracing`. The filter comes from `RUST_LOG`
//! when set, otherwise from the per-service default passed in by `main`.
//! `LOG_FORMAT=json` switches the formatter to one JSON object per line.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Filter directives used when `RUST_LOG` is unset.
    pub default_filter: String,
    /// Emit JSON-formatted logs.
    pub json_logs: bool,
}

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}

impl ObservabilityConfig {
    /// Build the configuration from a variable map (`LOG_FORMAT`).
    #[must_use]
    pub fn from_vars(vars: &HashMap<String, String>, default_filter: &str) -> Self {
        let json_logs = vars
            .get("LOG_FORMAT")
            .is_some_and(|format| format.eq_ignore_ascii_case("json"));

        Self {
            default_filter: default_filter.to_string(),
            json_logs,
        }
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns `ObservabilityError::SubscriberInit` if a global subscriber
/// has already been installed.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<(), ObservabilityError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter.as_str()));

    let json_layer = config
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!config.json_logs).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| ObservabilityError::SubscriberInit(e.to_string()))
}
