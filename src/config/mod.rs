//! Configuration management for order-export
//!
//! Configuration comes from a TOML file and command-line arguments.
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Largest page size accepted from configuration.
pub const MAX_PAGE_SIZE: u32 = 10_000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Order store configuration
    #[serde(default)]
    pub source: SourceConfig,

    /// Export pipeline configuration
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Order store (MongoDB) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// MongoDB connection URI
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Database holding the orders collection
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection of order documents
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Connection and server selection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl SourceConfig {
    /// Get connection timeout as Duration
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Export pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Orders requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Safety limit on pages fetched in one export
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Directory for generated report files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Show a progress spinner while exporting to a file
    #[serde(default = "default_progress")]
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "shop".to_string()
}

fn default_collection() -> String {
    "orders".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    100_000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_progress() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            database: default_database(),
            collection: default_collection(),
            timeout: default_timeout(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            output_dir: default_output_dir(),
            progress: default_progress(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    ///
    /// An explicitly given path must exist. When no path is given the default
    /// location is tried and a missing file yields the default configuration.
    ///
    /// # Arguments
    /// * `path` - Optional path to the configuration file
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".order-export")
            .join("config.toml")
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.export.page_size == 0 || self.export.page_size > MAX_PAGE_SIZE {
            return Err(invalid("export.page_size", self.export.page_size));
        }
        if self.export.max_pages == 0 {
            return Err(invalid("export.max_pages", self.export.max_pages));
        }
        if self.source.database.trim().is_empty() {
            return Err(invalid("source.database", &self.source.database));
        }
        if self.source.collection.trim().is_empty() {
            return Err(invalid("source.collection", &self.source.collection));
        }
        if !self.source.uri.starts_with("mongodb://") && !self.source.uri.starts_with("mongodb+srv://")
        {
            return Err(invalid("source.uri", &self.source.uri));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString) -> crate::error::ExportError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.uri, "mongodb://localhost:27017");
        assert_eq!(config.export.page_size, 100);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [export]
            page_size = 250

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.export.page_size, 250);
        assert_eq!(config.export.max_pages, 100_000);
        assert_eq!(config.source.collection, "orders");
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_toml_is_format_error() {
        let err = Config::from_toml_str("[export\npage_size = ").unwrap_err();
        assert!(matches!(err, ExportError::Config(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.export.page_size = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ExportError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "export.page_size"
        ));
    }

    #[test]
    fn test_validate_rejects_foreign_uri() {
        let mut config = Config::default();
        config.source.uri = "postgres://localhost".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load_from_file(Some(Path::new("/nonexistent/order-export.toml")))
            .unwrap_err();
        assert!(matches!(err, ExportError::Config(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.source.database = "woo".to_string();
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = Config::load_from_file(Some(&path)).unwrap();
        assert_eq!(loaded.source.database, "woo");
    }

    #[test]
    fn test_connection_timeout() {
        let config = Config::default();
        assert_eq!(config.source.connection_timeout(), Duration::from_secs(30));
    }
}
