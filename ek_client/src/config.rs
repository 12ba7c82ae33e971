//! Client configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use exploding_kittens::constants::DEFAULT_FLIP_DELAY_MS;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Complete client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the score service
    pub api_url: String,
    /// Delay between flipping a card and drawing it
    pub flip_delay: Duration,
    /// Per-request timeout for score service calls
    pub request_timeout: Duration,
    /// Whether to open the socket connection at startup
    pub socket_enabled: bool,
    /// Preset username, skips the prompt
    pub username: Option<String>,
}

/// Values given on the command line. They win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub username: Option<String>,
    pub flip_delay_ms: Option<u64>,
    pub no_socket: bool,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but can't be parsed
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let api_url = overrides
            .api_url
            .or_else(|| std::env::var("EK_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let flip_delay_ms = match overrides.flip_delay_ms {
            Some(ms) => ms,
            None => parse_env("EK_FLIP_DELAY_MS")?.unwrap_or(DEFAULT_FLIP_DELAY_MS),
        };

        let request_timeout_secs =
            parse_env("EK_REQUEST_TIMEOUT_SECS")?.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let socket_enabled =
            !overrides.no_socket && parse_env("EK_SOCKET_ENABLED")?.unwrap_or(true);

        let username = overrides
            .username
            .or_else(|| std::env::var("EK_USERNAME").ok())
            .filter(|name| !name.is_empty());

        Ok(ClientConfig {
            api_url,
            flip_delay: Duration::from_millis(flip_delay_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
            socket_enabled,
            username,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "EK_API_URL".to_string(),
                reason: format!("Must be an http(s) URL, got '{}'", self.api_url),
            });
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "EK_REQUEST_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            flip_delay: Duration::from_millis(DEFAULT_FLIP_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            socket_enabled: true,
            username: None,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an optional environment variable. Unset is `None`, unparsable
/// is an error.
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Can't parse '{value}'"),
        }),
        Err(_) => Ok(None),
    }
}
