//! Configuration management for IDScan.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/idscan/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Recognition backend settings
    pub backend: BackendConfig,
    /// Image upload settings
    pub upload: UploadConfig,
    /// Notification lifetimes
    pub notifications: NotificationConfig,
}

impl AppConfig {
    /// Load configuration from the default path, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if not found.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `IDSCAN_BACKEND_URL`: Override the backend base URL
    /// - `IDSCAN_TIMEOUT_SECS`: Override the request timeout
    /// - `IDSCAN_MAX_FILE_BYTES`: Override the upload size limit
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `IDSCAN_*` environment overrides in place.
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("IDSCAN_BACKEND_URL") {
            tracing::debug!("Override backend.base_url from env: {}", url);
            self.backend.base_url = url;
        }

        if let Ok(val) = std::env::var("IDSCAN_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.backend.timeout_secs = secs;
                tracing::debug!("Override backend.timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("IDSCAN_MAX_FILE_BYTES") {
            if let Ok(bytes) = val.parse() {
                self.upload.max_file_bytes = bytes;
                tracing::debug!("Override upload.max_file_bytes from env: {}", bytes);
            }
        }
    }

    /// Check values that would make the client unusable.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "backend.base_url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backend.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.upload.max_file_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upload.max_file_bytes".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Save configuration to the default path.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_path".to_string(),
            reason: "no parent directory".to_string(),
        })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/idscan/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "idscan", "idscan").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Recognition backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the recognition backend (no trailing slash needed)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://thai-id-ocr-backend.onrender.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Image upload settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Largest accepted image, in bytes
    pub max_file_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Lifetimes of the transient operator notifications, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Successful upload
    pub success_ms: u64,
    /// Failed upload
    pub error_ms: u64,
    /// Backend validation message attached to a failed upload
    pub validation_error_ms: u64,
    /// Confirmed deletion
    pub deletion_ms: u64,
}

impl NotificationConfig {
    /// Successful upload lifetime as a `Duration`.
    #[must_use]
    pub fn success(&self) -> Duration {
        Duration::from_millis(self.success_ms)
    }

    /// Failed upload lifetime as a `Duration`.
    #[must_use]
    pub fn error(&self) -> Duration {
        Duration::from_millis(self.error_ms)
    }

    /// Backend validation message lifetime as a `Duration`.
    #[must_use]
    pub fn validation_error(&self) -> Duration {
        Duration::from_millis(self.validation_error_ms)
    }

    /// Confirmed deletion lifetime as a `Duration`.
    #[must_use]
    pub fn deletion(&self) -> Duration {
        Duration::from_millis(self.deletion_ms)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            success_ms: 3000,
            error_ms: 3000,
            validation_error_ms: 3500,
            deletion_ms: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(
            config.backend.base_url,
            "https://thai-id-ocr-backend.onrender.com"
        );
        assert_eq!(config.upload.max_file_bytes, 2_097_152);
        assert_eq!(config.notifications.success_ms, 3000);
        assert_eq!(config.notifications.validation_error_ms, 3500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[backend]"));
        assert!(toml_str.contains("[upload]"));
        assert!(toml_str.contains("[notifications]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.backend.base_url = "http://localhost:5000".to_string();
        config.notifications.error_ms = 5000;

        config.save_to(&config_path).expect("save config");
        let loaded = AppConfig::load_from(&config_path).expect("load config");

        assert_eq!(loaded.backend.base_url, "http://localhost:5000");
        assert_eq!(loaded.notifications.error_ms, 5000);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let loaded =
            AppConfig::load_from(&tmp.path().join("absent.toml")).expect("load defaults");
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[upload]
max_file_bytes = 1024
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.upload.max_file_bytes, 1024);
        // These should be defaults
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.notifications.deletion_ms, 3000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");
        fs::write(&config_path, "[upload]\nmax_file_bytes = 0\n").expect("write config file");

        let err = AppConfig::load_from(&config_path).expect_err("zero limit must be rejected");
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let mut config = AppConfig::default();
        config.backend.base_url = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.backend.timeout_secs = 0;
        let err = config.validate().expect_err("zero timeout must be rejected");
        assert!(err.to_string().contains("backend.timeout_secs"));
    }

    #[test]
    fn test_notification_durations() {
        let config = NotificationConfig::default();
        assert_eq!(config.success(), Duration::from_secs(3));
        assert_eq!(config.validation_error(), Duration::from_millis(3500));
    }
}
