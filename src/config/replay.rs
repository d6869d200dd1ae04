//! Replay configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default concurrency gate size.
pub const DEFAULT_CONNECTIONS: usize = 50;
/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;
/// Default target site.
pub const DEFAULT_URL_BASE: &str = "https://new.scielo.br";

/// Environment variable overriding `connections`.
pub const ENV_CONNECTIONS: &str = "TIME_MACHINE_CONNECTIONS";
/// Environment variable overriding `timeout_secs`.
pub const ENV_TIMEOUT: &str = "TIME_MACHINE_TIMEOUT";
/// Environment variable overriding `ignore_delay`.
pub const ENV_IGNORE_DELAY: &str = "TIME_MACHINE_IGNORE_DELAY";
/// Environment variable overriding `url_base`.
pub const ENV_URL_BASE: &str = "TIME_MACHINE_URL_BASE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value failed validation.
    #[error("{0}")]
    Invalid(String),
    /// The configuration document could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
    /// An environment variable held an unparsable value.
    #[error("environment variable {key}={value:?} is invalid")]
    Env {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Values the scheduler needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Concurrency gate size.
    pub connections: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: f64,
    /// Replay without waiting for recorded delays.
    pub ignore_delay: bool,
    /// Scheme and host prepended to every path.
    pub url_base: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            connections: DEFAULT_CONNECTIONS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            ignore_delay: false,
            url_base: DEFAULT_URL_BASE.into(),
        }
    }
}

impl ReplayConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connections == 0 {
            return Err(ConfigError::Invalid("connections must be greater than 0".into()));
        }
        if self.connections > tokio::sync::Semaphore::MAX_PERMITS {
            return Err(ConfigError::Invalid(format!(
                "connections must be at most {}",
                tokio::sync::Semaphore::MAX_PERMITS
            )));
        }
        if !self.timeout_secs.is_finite() || self.timeout_secs <= 0.0 {
            return Err(ConfigError::Invalid("timeout must be a positive number of seconds".into()));
        }
        if Duration::try_from_secs_f64(self.timeout_secs).is_err() {
            return Err(ConfigError::Invalid(format!(
                "timeout of {} seconds is too large",
                self.timeout_secs
            )));
        }
        if self.url_base.trim().is_empty() {
            return Err(ConfigError::Invalid("url base must not be empty".into()));
        }
        Ok(())
    }

    /// Per-request timeout as a `Duration`.
    ///
    /// Values [`validate`](Self::validate) rejects saturate to `Duration::MAX`
    /// or `Duration::ZERO` instead of panicking.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs).unwrap_or(if self.timeout_secs > 0.0 {
            Duration::MAX
        } else {
            Duration::ZERO
        })
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `TIME_MACHINE_*` variables, reading `.env` if present.
    ///
    /// The result is not validated; callers apply their own overrides first.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(value) = lookup(ENV_CONNECTIONS) {
            cfg.connections = value.trim().parse().map_err(|_| ConfigError::Env {
                key: ENV_CONNECTIONS,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_TIMEOUT) {
            cfg.timeout_secs = value.trim().parse().map_err(|_| ConfigError::Env {
                key: ENV_TIMEOUT,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_IGNORE_DELAY) {
            cfg.ignore_delay = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(ConfigError::Env {
                        key: ENV_IGNORE_DELAY,
                        value,
                    })
                }
            };
        }
        if let Some(value) = lookup(ENV_URL_BASE) {
            cfg.url_base = value;
        }
        Ok(cfg)
    }
}
