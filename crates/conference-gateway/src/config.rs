//! Conference Gateway configuration.
//!
//! Configuration is loaded from environment variables. The API secret is
//! held as a `SecretString` and redacted in Debug output.

use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3001";

/// Default conferencing server (public BigBlueButton test install).
pub const DEFAULT_BBB_SERVER_URL: &str = "https://test-install.blindsidenetworks.com/bigbluebutton";

/// Default Jitsi-compatible server domain.
pub const DEFAULT_JITSI_DOMAIN: &str = "meet.jit.si";

/// Default externally reachable base URL of this gateway.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3001";

/// Default directory for locally stored recordings.
pub const DEFAULT_RECORDINGS_DIR: &str = "recordings";

/// Default outbound request timeout in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 10;

/// Default deadline for the sample meeting create call in seconds.
pub const DEFAULT_SAMPLE_MEETING_TIMEOUT_SECONDS: u64 = 5;

/// Default deadline for the startup warm-up in seconds.
pub const DEFAULT_STARTUP_WARMUP_TIMEOUT_SECONDS: u64 = 8;

/// Default graceful-shutdown drain period in seconds.
pub const DEFAULT_DRAIN_SECONDS: u64 = 0;

/// Upper bound on sequential outbound calls one inbound request makes
/// (lookup, create, re-lookup).
pub const MAX_SEQUENTIAL_UPSTREAM_CALLS: u32 = 3;

/// Slack added on top of the upstream budget for the inbound request deadline.
pub const REQUEST_DEADLINE_MARGIN: Duration = Duration::from_secs(5);

/// Origins of the dashboard dev servers.
pub const DEFAULT_CORS_ALLOWED_ORIGINS: &str =
    "http://localhost:5173,http://localhost:5174,http://localhost:3000";

/// Conference Gateway configuration.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:3001").
    pub bind_address: String,

    /// Base URL of the BigBlueButton-compatible server, without trailing slash.
    pub bbb_server_url: String,

    /// Shared secret used to sign API calls.
    pub bbb_api_secret: SecretString,

    /// Domain of the Jitsi-compatible server.
    pub jitsi_domain: String,

    /// Base URL the dashboard uses to reach this gateway (playback links).
    pub public_base_url: String,

    /// Directory served under `/recordings`.
    pub recordings_dir: PathBuf,

    /// Timeout applied to every outbound request.
    pub upstream_timeout: Duration,

    /// Deadline for the `initSampleMeetings` create call.
    pub sample_meeting_timeout: Duration,

    /// Deadline for the best-effort startup warm-up.
    pub startup_warmup_timeout: Duration,

    /// Whether the startup warm-up runs at all.
    pub init_sample_meetings_on_startup: bool,

    /// How long to keep serving after a shutdown signal (0 disables).
    pub drain_period: Duration,

    /// Origins allowed by the CORS layer.
    pub cors_allowed_origins: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("bbb_server_url", &self.bbb_server_url)
            .field("bbb_api_secret", &"[REDACTED]")
            .field("jitsi_domain", &self.jitsi_domain)
            .field("public_base_url", &self.public_base_url)
            .field("recordings_dir", &self.recordings_dir)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("sample_meeting_timeout", &self.sample_meeting_timeout)
            .field("startup_warmup_timeout", &self.startup_warmup_timeout)
            .field("drain_period", &self.drain_period)
            .field(
                "init_sample_meetings_on_startup",
                &self.init_sample_meetings_on_startup,
            )
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid URL configuration: {0}")]
    InvalidUrl(String),

    #[error("Invalid timeout configuration: {0}")]
    InvalidTimeout(String),

    #[error("Invalid boolean configuration: {0}")]
    InvalidBool(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bbb_api_secret = vars
            .get("BBB_API_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("BBB_API_SECRET".to_string()))?;

        let bbb_server_url = parse_server_url(
            vars.get("BBB_SERVER_URL")
                .map(String::as_str)
                .unwrap_or(DEFAULT_BBB_SERVER_URL),
        )?;

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jitsi_domain = vars
            .get("JITSI_DOMAIN")
            .cloned()
            .unwrap_or_else(|| DEFAULT_JITSI_DOMAIN.to_string());

        let public_base_url = vars
            .get("PUBLIC_BASE_URL")
            .map(String::as_str)
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        let recordings_dir = PathBuf::from(
            vars.get("RECORDINGS_DIR")
                .map(String::as_str)
                .unwrap_or(DEFAULT_RECORDINGS_DIR),
        );

        let upstream_timeout = parse_timeout(
            vars,
            "UPSTREAM_TIMEOUT_SECONDS",
            DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
        )?;
        let sample_meeting_timeout = parse_timeout(
            vars,
            "SAMPLE_MEETING_TIMEOUT_SECONDS",
            DEFAULT_SAMPLE_MEETING_TIMEOUT_SECONDS,
        )?;
        let startup_warmup_timeout = parse_timeout(
            vars,
            "STARTUP_WARMUP_TIMEOUT_SECONDS",
            DEFAULT_STARTUP_WARMUP_TIMEOUT_SECONDS,
        )?;

        let drain_period = parse_drain_period(vars)?;

        let init_sample_meetings_on_startup = match vars.get("INIT_SAMPLE_MEETINGS_ON_STARTUP") {
            Some(value) => parse_bool("INIT_SAMPLE_MEETINGS_ON_STARTUP", value)?,
            None => true,
        };

        let cors_allowed_origins = vars
            .get("CORS_ALLOWED_ORIGINS")
            .map(String::as_str)
            .unwrap_or(DEFAULT_CORS_ALLOWED_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Config {
            bind_address,
            bbb_server_url,
            bbb_api_secret: SecretString::from(bbb_api_secret.clone()),
            jitsi_domain,
            public_base_url,
            recordings_dir,
            upstream_timeout,
            sample_meeting_timeout,
            startup_warmup_timeout,
            init_sample_meetings_on_startup,
            drain_period,
            cors_allowed_origins,
        })
    }

    /// Deadline for a whole inbound request.
    ///
    /// Covers the longest chain of sequential outbound calls, or the sample
    /// meeting deadline if that is longer, plus a margin. A request that still
    /// exceeds it is answered as an upstream failure.
    pub fn request_deadline(&self) -> Duration {
        self.upstream_timeout
            .saturating_mul(MAX_SEQUENTIAL_UPSTREAM_CALLS)
            .max(self.sample_meeting_timeout)
            .saturating_add(REQUEST_DEADLINE_MARGIN)
    }
}

fn parse_server_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "BBB_SERVER_URL must be an absolute URL, got '{}': {}",
            raw, e
        ))
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "BBB_SERVER_URL must use http or https, got '{}'",
            parsed.scheme()
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

fn parse_timeout(
    vars: &HashMap<String, String>,
    name: &str,
    default_secs: u64,
) -> Result<Duration, ConfigError> {
    let Some(value_str) = vars.get(name) else {
        return Ok(Duration::from_secs(default_secs));
    };

    let value: u64 = value_str.parse().map_err(|e| {
        ConfigError::InvalidTimeout(format!(
            "{} must be a valid positive integer, got '{}': {}",
            name, value_str, e
        ))
    })?;

    if value == 0 {
        return Err(ConfigError::InvalidTimeout(format!(
            "{} must be greater than 0",
            name
        )));
    }

    Ok(Duration::from_secs(value))
}

fn parse_drain_period(vars: &HashMap<String, String>) -> Result<Duration, ConfigError> {
    let Some(value_str) = vars.get("DRAIN_SECONDS") else {
        return Ok(Duration::from_secs(DEFAULT_DRAIN_SECONDS));
    };

    let value: u64 = value_str.parse().map_err(|e| {
        ConfigError::InvalidTimeout(format!(
            "DRAIN_SECONDS must be a non-negative integer, got '{}': {}",
            value_str, e
        ))
    })?;

    Ok(Duration::from_secs(value))
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidBool(format!(
            "{} must be true or false, got '{}'",
            name, other
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::secret::ExposeSecret;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([("BBB_API_SECRET".to_string(), "test-secret".to_string())])
    }

    #[test]
    fn test_from_vars_success_with_defaults() {
        let config = Config::from_vars(&base_vars()).expect("Config should load successfully");

        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.bbb_server_url, DEFAULT_BBB_SERVER_URL);
        assert_eq!(config.bbb_api_secret.expose_secret(), "test-secret");
        assert_eq!(config.jitsi_domain, "meet.jit.si");
        assert_eq!(config.public_base_url, "http://localhost:3001");
        assert_eq!(config.recordings_dir, PathBuf::from("recordings"));
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.sample_meeting_timeout, Duration::from_secs(5));
        assert_eq!(config.startup_warmup_timeout, Duration::from_secs(8));
        assert!(config.init_sample_meetings_on_startup);
        assert_eq!(config.drain_period, Duration::ZERO);
        assert_eq!(config.cors_allowed_origins.len(), 3);
        assert_eq!(config.request_deadline(), Duration::from_secs(35));
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let mut vars = base_vars();
        vars.insert("BIND_ADDRESS".to_string(), "127.0.0.1:9000".to_string());
        vars.insert(
            "BBB_SERVER_URL".to_string(),
            "https://bbb.example.com/bigbluebutton/".to_string(),
        );
        vars.insert("JITSI_DOMAIN".to_string(), "jitsi.example.com".to_string());
        vars.insert("RECORDINGS_DIR".to_string(), "/var/lib/lectern".to_string());
        vars.insert("UPSTREAM_TIMEOUT_SECONDS".to_string(), "3".to_string());
        vars.insert("SAMPLE_MEETING_TIMEOUT_SECONDS".to_string(), "2".to_string());
        vars.insert("STARTUP_WARMUP_TIMEOUT_SECONDS".to_string(), "4".to_string());
        vars.insert(
            "INIT_SAMPLE_MEETINGS_ON_STARTUP".to_string(),
            "false".to_string(),
        );
        vars.insert(
            "CORS_ALLOWED_ORIGINS".to_string(),
            "https://app.example.com, https://admin.example.com".to_string(),
        );

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        // Trailing slash trimmed so "/api/" can be appended verbatim
        assert_eq!(
            config.bbb_server_url,
            "https://bbb.example.com/bigbluebutton"
        );
        assert_eq!(config.jitsi_domain, "jitsi.example.com");
        assert_eq!(config.recordings_dir, PathBuf::from("/var/lib/lectern"));
        assert_eq!(config.upstream_timeout, Duration::from_secs(3));
        assert_eq!(config.sample_meeting_timeout, Duration::from_secs(2));
        assert_eq!(config.startup_warmup_timeout, Duration::from_secs(4));
        assert!(!config.init_sample_meetings_on_startup);
        assert_eq!(
            config.cors_allowed_origins,
            vec![
                "https://app.example.com".to_string(),
                "https://admin.example.com".to_string()
            ]
        );
    }

    #[test]
    fn test_from_vars_missing_api_secret() {
        let result = Config::from_vars(&HashMap::new());
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "BBB_API_SECRET"));
    }

    #[test]
    fn test_from_vars_empty_api_secret_is_missing() {
        let vars = HashMap::from([("BBB_API_SECRET".to_string(), String::new())]);
        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
    }

    #[test]
    fn test_server_url_rejects_relative() {
        let mut vars = base_vars();
        vars.insert("BBB_SERVER_URL".to_string(), "bigbluebutton".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidUrl(msg)) if msg.contains("must be an absolute URL"))
        );
    }

    #[test]
    fn test_server_url_rejects_non_http_scheme() {
        let mut vars = base_vars();
        vars.insert("BBB_SERVER_URL".to_string(), "ftp://bbb.example.com".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidUrl(msg)) if msg.contains("http or https"))
        );
    }

    #[test]
    fn test_timeout_rejects_zero() {
        let mut vars = base_vars();
        vars.insert("UPSTREAM_TIMEOUT_SECONDS".to_string(), "0".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidTimeout(msg)) if msg.contains("must be greater than 0"))
        );
    }

    #[test]
    fn test_timeout_rejects_non_numeric() {
        let mut vars = base_vars();
        vars.insert(
            "STARTUP_WARMUP_TIMEOUT_SECONDS".to_string(),
            "eight".to_string(),
        );

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidTimeout(msg)) if msg.contains("STARTUP_WARMUP_TIMEOUT_SECONDS"))
        );
    }

    #[test]
    fn test_drain_seconds_accepts_zero_and_positive() {
        let mut vars = base_vars();
        vars.insert("DRAIN_SECONDS".to_string(), "0".to_string());
        assert_eq!(Config::from_vars(&vars).unwrap().drain_period, Duration::ZERO);

        vars.insert("DRAIN_SECONDS".to_string(), "15".to_string());
        assert_eq!(
            Config::from_vars(&vars).unwrap().drain_period,
            Duration::from_secs(15)
        );
    }

    #[test]
    fn test_drain_seconds_rejects_non_numeric() {
        let mut vars = base_vars();
        vars.insert("DRAIN_SECONDS".to_string(), "soon".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidTimeout(msg)) if msg.contains("DRAIN_SECONDS"))
        );
    }

    #[test]
    fn test_request_deadline_tracks_upstream_timeout() {
        let mut vars = base_vars();
        vars.insert("UPSTREAM_TIMEOUT_SECONDS".to_string(), "15".to_string());
        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(config.request_deadline(), Duration::from_secs(50));

        vars.insert("UPSTREAM_TIMEOUT_SECONDS".to_string(), "1".to_string());
        vars.insert("SAMPLE_MEETING_TIMEOUT_SECONDS".to_string(), "20".to_string());
        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(config.request_deadline(), Duration::from_secs(25));
    }

    #[test]
    fn test_init_flag_rejects_garbage() {
        let mut vars = base_vars();
        vars.insert(
            "INIT_SAMPLE_MEETINGS_ON_STARTUP".to_string(),
            "maybe".to_string(),
        );

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidBool(_))));
    }

    #[test]
    fn test_debug_redacts_api_secret() {
        let config = Config::from_vars(&base_vars()).expect("Config should load successfully");

        let debug_output = format!("{:?}", config);

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("test-secret"));
    }
}
