//! Configuration management for txfeed
//!
//! This module handles loading, validation, and management of
//! txfeed configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the JSON dataset (employees + transactions)
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Artificial delay applied to every local fetch, in milliseconds
    #[serde(default)]
    pub simulated_latency_ms: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            simulated_latency_ms: 0,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data/dataset.json")
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Transactions per page of the unfiltered feed
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    5
}

/// HTTP client settings used by `browse`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the transaction API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8081".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

const MAX_PAGE_SIZE: usize = 500;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.pagination.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.page_size".to_string(),
                reason: "Page size must be at least 1".to_string(),
            });
        }

        if self.pagination.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::OutOfRange {
                field: "pagination.page_size".to_string(),
                value: self.pagination.page_size as u64,
                max: MAX_PAGE_SIZE as u64,
            });
        }

        if !(self.client.base_url.starts_with("http://") || self.client.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "client.base_url".to_string(),
                reason: "Base URL must start with http:// or https://".to_string(),
            });
        }

        if self.client.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.request_timeout_secs".to_string(),
                reason: "Request timeout must be greater than 0".to_string(),
            });
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.pagination.page_size, 5);
        assert_eq!(config.client.request_timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = Config::from_yaml("pagination:\n  page_size: 20\n").unwrap();
        assert_eq!(config.pagination.page_size, 20);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.data.simulated_latency_ms, 0);
    }

    #[test]
    fn test_default_template_is_valid() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.pagination.page_size, 5);
        assert_eq!(config.bind_addr(), "0.0.0.0:8081");
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let err = Config::from_yaml("pagination:\n  page_size: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "pagination.page_size"));
    }

    #[test]
    fn test_rejects_oversized_page() {
        let err = Config::from_yaml("pagination:\n  page_size: 501\n").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { value: 501, max: 500, .. }));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let err = Config::from_yaml("client:\n  base_url: localhost:8081\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "client.base_url"));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let err = Config::from_yaml("logging:\n  level: chatty\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "logging.level"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/definitely/not/here/config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 9000\ndata:\n  simulated_latency_ms: 250").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.data.simulated_latency_ms, 250);
    }
}
