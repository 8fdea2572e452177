//! Configuration management for the BugScan client

use bugscan_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiSettings,

    /// Session persistence settings
    #[serde(default)]
    pub session: SessionSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            session: SessionSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Merge with environment variables (BUGSCAN_ prefix)
    pub fn merge_env(mut self) -> Self {
        if let Ok(val) = std::env::var("BUGSCAN_API_URL") {
            self.api.base_url = val;
        }
        if let Ok(val) = std::env::var("BUGSCAN_APP_ORIGIN") {
            self.api.app_origin = Some(val);
        }
        if let Ok(val) = std::env::var("BUGSCAN_REQUEST_TIMEOUT") {
            if let Ok(n) = val.parse() {
                self.api.request_timeout_seconds = n;
            }
        }
        if let Ok(val) = std::env::var("BUGSCAN_SCAN_TIMEOUT") {
            if let Ok(n) = val.parse() {
                self.api.scan_timeout_seconds = n;
            }
        }
        if let Ok(val) = std::env::var("BUGSCAN_SESSION_FILE") {
            self.session.store_path = val;
        }
        if let Ok(val) = std::env::var("BUGSCAN_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("BUGSCAN_LOG_FORMAT") {
            self.logging.format = val;
        }
        self
    }
}

/// Backend API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Backend base URL (the versioned prefix /api/v1 is appended per request)
    pub base_url: String,

    /// Origin of the application itself; scans against it are rejected
    /// client-side to prevent a trivial self-scan loop
    pub app_origin: Option<String>,

    /// Default request timeout in seconds. Long on purpose: the
    /// memory-safety and injection stages can run for minutes.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Timeout for scan-submission calls, longer than the default
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_seconds: u64,
}

fn default_request_timeout() -> u64 {
    300
}

fn default_scan_timeout() -> u64 {
    600
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:8000"),
            app_origin: None,
            request_timeout_seconds: 300,
            scan_timeout_seconds: 600,
        }
    }
}

/// Session persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Path of the durable session store (token + last-known profile)
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

fn default_store_path() -> String {
    String::from("~/.bugscan/session.json")
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("pretty")
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Builder for constructing Config
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.base_url = url.into();
        self
    }

    pub fn app_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.api.app_origin = Some(origin.into());
        self
    }

    pub fn request_timeout(mut self, seconds: u64) -> Self {
        self.config.api.request_timeout_seconds = seconds;
        self
    }

    pub fn scan_timeout(mut self, seconds: u64) -> Self {
        self.config.api.scan_timeout_seconds = seconds;
        self
    }

    pub fn session_file(mut self, path: impl Into<String>) -> Self {
        self.config.session.store_path = path.into();
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [api]
            base_url = "http://localhost:9000"
            app_origin = "http://localhost:5173"
            scan_timeout_seconds = 900

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.api.app_origin.as_deref(), Some("http://localhost:5173"));
        assert_eq!(config.api.request_timeout_seconds, 300);
        assert_eq!(config.api.scan_timeout_seconds, 900);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_scan_timeout_longer_than_default() {
        let config = Config::default();
        assert!(config.api.scan_timeout_seconds > config.api.request_timeout_seconds);
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder()
            .api_url("http://localhost:8000")
            .app_origin("http://localhost:3000")
            .log_level("warn")
            .build();

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.app_origin.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.logging.level, "warn");
    }
}
