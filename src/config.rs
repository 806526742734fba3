// marksync client configuration
// Loads the service endpoint, api key, and poll cadence from a JSON file
// at the platform-specific config path, with environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::platform;
use crate::types::errors::ConfigError;

pub const ENV_SERVICE_URL: &str = "MARKSYNC_SERVICE_URL";
pub const ENV_API_KEY: &str = "MARKSYNC_API_KEY";
pub const ENV_POLL_INTERVAL: &str = "MARKSYNC_POLL_INTERVAL_SECS";

const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:54321";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Client configuration for the hosted backend service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub service_url: String,
    pub api_key: String,
    pub poll_interval_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            api_key: String::new(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl ClientConfig {
    /// Returns the default config file path: `<config dir>/config.json`.
    pub fn default_path() -> PathBuf {
        platform::get_config_dir().join("config.json")
    }

    /// Loads configuration from the default path, then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::default_path())?.with_env_overrides()
    }

    /// Loads configuration from the given file. Environment overrides are
    /// not applied here; see [`ClientConfig::with_env_overrides`].
    ///
    /// A missing file yields defaults; a malformed file is an error.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file: {}", e)))?;
        serde_json::from_str(&content).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to parse config file: {}", e))
        })
    }

    /// Applies `MARKSYNC_*` environment overrides on top of the loaded
    /// values. Overrides always win over the file.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(url) = env::var(ENV_SERVICE_URL) {
            if !url.trim().is_empty() {
                self.service_url = url.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(key) = env::var(ENV_API_KEY) {
            if !key.trim().is_empty() {
                self.api_key = key.trim().to_string();
            }
        }
        if let Ok(secs) = env::var(ENV_POLL_INTERVAL) {
            self.poll_interval_secs = secs.trim().parse().map_err(|_| {
                ConfigError::InvalidOverride(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    ENV_POLL_INTERVAL, secs
                ))
            })?;
        }
        Ok(self)
    }

    /// The full-refresh cadence as a `Duration`, clamped to at least one
    /// second so the timer always has a valid period.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}
