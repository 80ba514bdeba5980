//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Recommendation service connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Terminal rendering settings
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, or defaults when the file does not exist.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_if_present(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "api.base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.display.bar_width == 0 {
            return Err(AppError::validation("display.bar_width must be > 0"));
        }
        Ok(())
    }
}

/// Recommendation service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root URL the `/api/...` paths are resolved against
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds, 0 disables it
    #[serde(default)]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Parse `base_url`, forcing a trailing slash so joins keep its path.
    pub fn base_url(&self) -> Result<Url> {
        let raw = self.base_url.trim();
        if raw.is_empty() {
            return Err(AppError::config("api.base_url is empty"));
        }
        if raw.ends_with('/') {
            Ok(Url::parse(raw)?)
        } else {
            Ok(Url::parse(&format!("{raw}/"))?)
        }
    }

    /// Client-side timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: 0,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

/// Terminal rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Character width of a 100% bar in the text chart
    #[serde(default = "defaults::bar_width")]
    pub bar_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            bar_width: defaults::bar_width(),
        }
    }
}

mod defaults {
    pub fn base_url() -> String {
        "http://localhost:5000/".into()
    }
    pub fn user_agent() -> String {
        concat!("crop-advisor/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn log_level() -> String {
        "info".into()
    }
    pub fn bar_width() -> usize {
        40
    }
}
