/// Configuration for the course service connection
use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default address of the course listing service.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";

/// Environment variable that overrides the service base URL.
pub const BASE_URL_ENV: &str = "COURSEVIEWER_BASE_URL";

/// Top-level viewer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub service: ServiceConfig,
}

/// Connection settings for the remote term/course service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL the endpoint names are appended to
    pub base_url: String,
    pub connect_timeout_secs: u64,
    /// Total time allowed for a single request
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            user_agent: format!("courseviewer/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ServiceConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ViewerConfig {
    /// Loads a JSON configuration file
    ///
    /// Missing fields take their default values.
    ///
    /// # Arguments
    /// * `path` - Path to the JSON file
    ///
    /// # Returns
    /// * `Ok(ViewerConfig)` - Loaded configuration
    /// * `Err(CatalogError::Config)` - If the file can't be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| CatalogError::Config {
            message: format!("{}: {}", path.display(), e),
        })
    }

    /// Defaults with environment overrides applied
    pub fn from_env_or_default() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Applies `COURSEVIEWER_BASE_URL` if it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                self.service.base_url = base_url.trim().to_string();
            }
        }
    }
}
