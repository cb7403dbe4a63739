//! Client configuration system.
//!
//! Configuration can be loaded from:
//! - TOML files (default: ~/.config/neuroscan/client.toml)
//! - Environment variables (NEUROSCAN_* prefixed)
//!
//! # Example
//!
//! ```rust,no_run
//! use neuroscan_client::config::ClientConfig;
//!
//! // Load from the default path or fall back to env vars
//! let config = ClientConfig::load().expect("Failed to load config");
//!
//! // Or explicitly from a file
//! let config = ClientConfig::from_file(std::path::Path::new("client.toml")).expect("Failed to load");
//!
//! // Or from environment variables
//! let config = ClientConfig::from_env();
//! ```

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use neuroscan_core::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Connection settings for the inference service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Service origin, e.g. `http://localhost:8000`. Also the prefix used
    /// to absolutize root-relative image URLs in results.
    pub base_url: String,
    /// Timeout for scan uploads (seconds).
    pub upload_timeout_secs: u64,
    /// Timeout for unary requests (seconds).
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::SERVICE_URL.to_string(),
            upload_timeout_secs: defaults::UPLOAD_TIMEOUT_SECS,
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Create from environment variables, falling back to defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var(defaults::ENV_BASE_URL) {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        if let Some(secs) = env_u64(defaults::ENV_UPLOAD_TIMEOUT_SECS) {
            config.upload_timeout_secs = secs;
        }
        if let Some(secs) = env_u64(defaults::ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout_secs = secs;
        }

        debug!(base_url = %config.base_url, "Config loaded from environment");
        config
    }

    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        info!(path = %path.display(), "Config loaded from file");
        Ok(config)
    }

    /// Load from `NEUROSCAN_CONFIG` or the default config path when one
    /// exists, otherwise fall back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        if let Ok(path) = env::var(defaults::ENV_CONFIG_PATH) {
            return Self::from_file(Path::new(&path));
        }

        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        let config = Self::from_env();
        config.validate()?;
        Ok(config)
    }

    /// Default config file location (~/.config/neuroscan/client.toml).
    pub fn default_path() -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        Some(
            PathBuf::from(home)
                .join(".config")
                .join("neuroscan")
                .join("client.toml"),
        )
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "base_url cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.upload_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeouts must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// The service origin with any trailing slash removed, suitable for
    /// path concatenation.
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.upload_timeout_secs, 30);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_origin_strips_trailing_slash() {
        let config = ClientConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.origin(), "http://localhost:8000");

        let config = ClientConfig::default();
        assert_eq!(config.origin(), "http://localhost:8000");
    }

    #[test]
    fn test_validate_rejects_empty_base_url() {
        let config = ClientConfig {
            base_url: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_http_base_url() {
        let config = ClientConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ClientConfig {
            upload_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            base_url = "https://scans.example.org"
            upload_timeout_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://scans.example.org");
        assert_eq!(config.upload_timeout_secs, 60);
        // Unset fields fall back to defaults
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_from_empty_toml_is_default() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.base_url, ClientConfig::default().base_url);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ClientConfig {
            base_url: "http://10.0.0.5:8000".to_string(),
            upload_timeout_secs: 45,
            request_timeout_secs: 15,
        };
        let text = toml::to_string(&config).unwrap();
        let back: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.base_url, config.base_url);
        assert_eq!(back.upload_timeout_secs, 45);
        assert_eq!(back.request_timeout_secs, 15);
    }
}
