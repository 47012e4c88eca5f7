//! Runtime configuration, read from the process environment.
//!
//! A `.env` file in the working directory is loaded first when present;
//! variables already set in the environment win.
//!
//! | Variable                   | Default                 |
//! |----------------------------|-------------------------|
//! | `CMS_API_URL`              | `http://localhost:5000` |
//! | `CMS_REQUEST_TIMEOUT_SECS` | `30`                    |
//! | `CMS_RUN_CHANNEL_CAPACITY` | `16`                    |
//! | `CMS_AUTH_TOKEN`           | unset                   |

use std::time::Duration;

use reqwest::Url;
use tracing::debug;

use crate::clients::Session;

pub const API_URL_VAR: &str = "CMS_API_URL";
pub const TIMEOUT_VAR: &str = "CMS_REQUEST_TIMEOUT_SECS";
pub const CHANNEL_CAPACITY_VAR: &str = "CMS_RUN_CHANNEL_CAPACITY";
pub const AUTH_TOKEN_VAR: &str = "CMS_AUTH_TOKEN";

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Server root, without the `/api` suffix.
    pub api_url: String,
    pub request_timeout: Duration,
    /// Capacity of each run's progress channel. Values below
    /// [`MAX_EVENTS_PER_RUN`](crate::framework::MAX_EVENTS_PER_RUN) are
    /// raised to it when the actor is built.
    pub run_channel_capacity: usize,
    pub auth_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            run_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            auth_token: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_VAR) {
            if Url::parse(&url).is_err() {
                return Err(invalid(API_URL_VAR, url));
            }
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup(TIMEOUT_VAR) {
            let parsed = parse_positive::<u64>(TIMEOUT_VAR, &secs)?;
            config.request_timeout = Duration::from_secs(parsed);
        }
        if let Some(capacity) = lookup(CHANNEL_CAPACITY_VAR) {
            config.run_channel_capacity = parse_positive::<usize>(CHANNEL_CAPACITY_VAR, &capacity)?;
        }
        config.auth_token = lookup(AUTH_TOKEN_VAR).filter(|t| !t.trim().is_empty());

        Ok(config)
    }

    pub fn session(&self) -> Option<Session> {
        Session::from_token(self.auth_token.clone())
    }
}

fn parse_positive<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(invalid(var, value.to_string())),
    }
}

fn invalid(var: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid { var, value }
}
