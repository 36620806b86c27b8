use std::{env, time::Duration};

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// How long the confirmation stays on screen before the form clears.
pub const DEFAULT_RESET_DELAY_SECS: u64 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { name: &'static str, value: String },
}

/// Runtime settings, loaded from environment variables.
///
/// | Env Var                      | Default                      |
/// |------------------------------|------------------------------|
/// | `TRANSPORT_API_URL`          | `http://localhost:5000/api/` |
/// | `TRANSPORT_API_TOKEN`        | unset                        |
/// | `TRANSPORT_API_TIMEOUT_SECS` | `30`                         |
/// | `TRANSPORT_RESET_DELAY_SECS` | `3`                          |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub reset_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            reset_delay: Duration::from_secs(DEFAULT_RESET_DELAY_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("TRANSPORT_API_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.api_url);

        let api_token = lookup("TRANSPORT_API_TOKEN")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let request_timeout = seconds(&lookup, "TRANSPORT_API_TIMEOUT_SECS")?
            .unwrap_or(defaults.request_timeout);
        let reset_delay =
            seconds(&lookup, "TRANSPORT_RESET_DELAY_SECS")?.unwrap_or(defaults.reset_delay);

        Ok(Self {
            api_url,
            api_token,
            request_timeout,
            reset_delay,
        })
    }
}

fn seconds<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(|secs| Some(Duration::from_secs(secs)))
        .map_err(|_| ConfigError::InvalidSeconds { name, value: raw })
}
