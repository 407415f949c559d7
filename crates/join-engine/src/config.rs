//! Join engine configuration.
//!
//! Configuration is loaded from environment variables. The API token is
//! redacted in Debug output.

use crate::models::{Session, SessionStatus};
use common::secret::SecretString;
use common::types::UserRole;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default per-request timeout for the meeting API in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Default meeting status poll interval in seconds.
pub const DEFAULT_STATUS_POLL_SECONDS: u64 = 30;

/// Log output format for the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidValue(format!(
                "JOIN_LOG_FORMAT must be 'text' or 'json', got '{other}'"
            ))),
        }
    }
}

/// Join engine configuration.
#[derive(Clone)]
pub struct Config {
    /// Dashboard API base URL, without trailing slash.
    pub api_base_url: String,

    /// Bearer token sent with every API request.
    /// Protected by `SecretString` to prevent accidental logging.
    pub api_token: Option<SecretString>,

    /// Per-request timeout (default: 10s).
    pub request_timeout: Duration,

    /// Meeting status poll interval (default: 30s).
    pub status_poll_interval: Duration,

    pub log_format: LogFormat,
}

/// Custom Debug implementation that redacts the API token.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout", &self.request_timeout)
            .field("status_poll_interval", &self.status_poll_interval)
            .field("log_format", &self.log_format)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// See `from_vars`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingEnvVar` if `JOIN_API_BASE_URL` is unset or blank
    /// - `ConfigError::InvalidValue` for a non-positive interval or an
    ///   unknown log format
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let api_base_url = required(vars, "JOIN_API_BASE_URL")?
            .trim_end_matches('/')
            .to_string();

        let api_token = vars
            .get("JOIN_API_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .map(|t| SecretString::from(t.clone()));

        let request_timeout = Duration::from_secs(positive_seconds(
            vars,
            "JOIN_REQUEST_TIMEOUT_SECONDS",
            DEFAULT_REQUEST_TIMEOUT_SECONDS,
        )?);

        let status_poll_interval = Duration::from_secs(positive_seconds(
            vars,
            "JOIN_STATUS_POLL_SECONDS",
            DEFAULT_STATUS_POLL_SECONDS,
        )?);

        let log_format = vars
            .get("JOIN_LOG_FORMAT")
            .map(|s| s.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        Ok(Config {
            api_base_url,
            api_token,
            request_timeout,
            status_poll_interval,
            log_format,
        })
    }
}

/// The one session the binary watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub session_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub role: UserRole,
    pub meeting_link: Option<String>,
    /// Press the button once as soon as it becomes enabled.
    pub auto_activate: bool,
}

impl WatchTarget {
    /// Load the watch target from environment variables.
    ///
    /// # Errors
    ///
    /// See `from_vars`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load the watch target from a `HashMap` (for testing).
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingEnvVar` if a session field or the role is unset
    /// - `ConfigError::InvalidValue` for an unknown role or a non-boolean
    ///   `JOIN_AUTO_ACTIVATE`
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let session_id = required(vars, "JOIN_SESSION_ID")?.to_string();
        let date = required(vars, "JOIN_SESSION_DATE")?.to_string();
        let start_time = required(vars, "JOIN_SESSION_START")?.to_string();
        let end_time = required(vars, "JOIN_SESSION_END")?.to_string();

        let role = required(vars, "JOIN_ROLE")?
            .parse::<UserRole>()
            .map_err(|e| ConfigError::InvalidValue(format!("JOIN_ROLE: {e}")))?;

        let meeting_link = vars
            .get("JOIN_MEETING_LINK")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let auto_activate = match vars.get("JOIN_AUTO_ACTIVATE").map(|s| s.trim()) {
            None | Some("") => false,
            Some(value) => parse_bool(value).ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "JOIN_AUTO_ACTIVATE must be a boolean, got '{value}'"
                ))
            })?,
        };

        Ok(WatchTarget {
            session_id,
            date,
            start_time,
            end_time,
            role,
            meeting_link,
            auto_activate,
        })
    }

    /// Session record for the target, as the dashboard would hold it.
    pub fn to_session(&self) -> Session {
        Session {
            id: self.session_id.clone(),
            date: self.date.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            status: SessionStatus::Confirmed,
            meeting_link: self.meeting_link.clone(),
            meeting_id: None,
        }
    }
}

fn required<'a>(vars: &'a HashMap<String, String>, key: &str) -> Result<&'a str, ConfigError> {
    vars.get(key)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn positive_seconds(
    vars: &HashMap<String, String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = vars.get(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidValue(format!(
            "{key} must be a positive integer, got '{raw}'"
        ))),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
