//! Storage configuration.
//!
//! # Responsibility
//! - Collect remote credentials, local data location and logging settings.
//! - Load them from the process environment, with `.env` support.
//!
//! # Invariants
//! - Missing remote URL or key is not an error: it selects local-only mode.
//! - The remote key is only reachable through `ExposeSecret`.

use crate::logging::default_log_level;
use secrecy::SecretString;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_REMOTE_URL: &str = "AJEER_REMOTE_URL";
pub const ENV_REMOTE_KEY: &str = "AJEER_REMOTE_KEY";
pub const ENV_DATA_DIR: &str = "AJEER_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "AJEER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "AJEER_LOG_DIR";
pub const ENV_REMOTE_TIMEOUT_SECS: &str = "AJEER_REMOTE_TIMEOUT_SECS";

const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug)]
pub struct StorageConfig {
    pub remote_url: Option<String>,
    pub remote_key: Option<SecretString>,
    /// Directory holding the local store database. `None` keeps data in memory.
    pub data_dir: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            remote_key: None,
            data_dir: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            request_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }
}

impl StorageConfig {
    /// Reads configuration from the environment after loading `.env`, if any.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the normal case.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let request_timeout = match read(ENV_REMOTE_TIMEOUT_SECS) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_REMOTE_TIMEOUT_SECS,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_REMOTE_TIMEOUT,
        };

        Ok(Self {
            remote_url: read(ENV_REMOTE_URL),
            remote_key: read(ENV_REMOTE_KEY).map(SecretString::from),
            data_dir: read(ENV_DATA_DIR).map(PathBuf::from),
            log_level: read(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
            request_timeout,
        })
    }

    /// Remote URL and key, when both are configured.
    pub fn remote_credentials(&self) -> Option<(&str, &SecretString)> {
        Some((self.remote_url.as_deref()?, self.remote_key.as_ref()?))
    }
}
