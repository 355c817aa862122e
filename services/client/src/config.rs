//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_API_BASE_URL: &str = "https://minatoz997-backend66.hf.space";
pub const DEFAULT_WS_URL: &str = "wss://minatoz997-backend66.hf.space";
pub const DEFAULT_APP_NAME: &str = "OpenHands AI";
pub const DEFAULT_REPLY_DELAY_MS: u64 = 2000;

/// Every backend call gives up after this long.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Deployment flavour. Decides whether HTTP traffic is logged and whether
/// backend error bodies are allowed to reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!(
                "'{other}' is not a valid environment (expected 'development' or 'production')"
            )),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    /// Reserved for a live reply stream; only displayed for now.
    pub ws_url: String,
    pub app_name: String,
    pub environment: Environment,
    pub log_level: Level,
    pub request_timeout: Duration,
    pub reply_delay: Duration,
    pub novel_store_dir: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Backend endpoints ---
        let api_base_url = lookup("NEXT_PUBLIC_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "NEXT_PUBLIC_API_BASE_URL".to_string(),
                format!("'{api_base_url}' must start with http:// or https://"),
            ));
        }
        let ws_url = lookup("NEXT_PUBLIC_WS_URL").unwrap_or_else(|| DEFAULT_WS_URL.to_string());
        let app_name =
            lookup("NEXT_PUBLIC_APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string());

        // --- Runtime behaviour ---
        let environment = match lookup("APP_ENV") {
            Some(raw) => raw
                .parse::<Environment>()
                .map_err(|e| ConfigError::InvalidValue("APP_ENV".to_string(), e))?,
            None => Environment::Production,
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let reply_delay = match lookup("REPLY_DELAY_MS") {
            Some(raw) => raw.parse::<u64>().map(Duration::from_millis).map_err(|e| {
                ConfigError::InvalidValue("REPLY_DELAY_MS".to_string(), e.to_string())
            })?,
            None => Duration::from_millis(DEFAULT_REPLY_DELAY_MS),
        };

        let novel_store_dir = lookup("NOVEL_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        Ok(Self {
            api_base_url,
            ws_url,
            app_name,
            environment,
            log_level,
            request_timeout: REQUEST_TIMEOUT,
            reply_delay,
            novel_store_dir,
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
