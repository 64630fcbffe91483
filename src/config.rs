//! Configuration for the observer host and shipped backends
//!
//! The registry never reads configuration. This module only feeds the
//! backend adapters and the host binary: which backend serves which kind,
//! and the service settings backends stamp on their entries.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding `service.project_id`
pub const PROJECT_ID_ENV: &str = "PROJECT_ID";
/// Environment variable overriding `service.name`
pub const SERVICE_NAME_ENV: &str = "SERVICE_NAME";

/// Top-level configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObserverConfig {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub providers: ProviderSelection,
    #[serde(default)]
    pub buffered: BufferedSection,
}

/// Settings backends attach to everything they emit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceSettings {
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_service_name")]
    pub name: String,
}

fn default_service_name() -> String {
    "default".to_string()
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            name: default_service_name(),
        }
    }
}

/// The crate's own diagnostics output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub spans: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            spans: false,
        }
    }
}

/// Backend name per capability; `None` leaves the kind unregistered
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderSelection {
    pub logger: Option<String>,
    pub error_reporter: Option<String>,
    pub metrics: Option<String>,
}

/// Buffered backend settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BufferedSection {
    /// Channel capacity; entries beyond it are dropped, never awaited
    #[serde(default = "default_buffer_capacity")]
    pub capacity: usize,
    /// JSON lines output file (stdout if absent)
    pub path: Option<PathBuf>,
}

fn default_buffer_capacity() -> usize {
    1024
}

impl Default for BufferedSection {
    fn default() -> Self {
        Self {
            capacity: default_buffer_capacity(),
            path: None,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),
}

impl ObserverConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse and validate configuration without touching the environment
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ObserverConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for hosts without a config file
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(project_id) = std::env::var(PROJECT_ID_ENV) {
            self.service.project_id = project_id;
        }
        if let Ok(name) = std::env::var(SERVICE_NAME_ENV) {
            if !name.is_empty() {
                self.service.name = name;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "service.name must not be empty".to_string(),
            ));
        }
        if self.buffered.capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "buffered.capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Serialize back to TOML, for `config --show`
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let toml_content = r#"
[service]
project_id = "acme-prod"
name = "checkout"

[logging]
level = "debug"
format = "pretty"
spans = true

[providers]
logger = "tracing"
error_reporter = "tracing"
metrics = "buffered"

[buffered]
capacity = 16
path = "/tmp/observer.jsonl"
"#;

        let config = ObserverConfig::from_toml(toml_content).unwrap();
        assert_eq!(config.service.project_id, "acme-prod");
        assert_eq!(config.service.name, "checkout");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.spans);
        assert_eq!(config.providers.logger.as_deref(), Some("tracing"));
        assert_eq!(config.providers.metrics.as_deref(), Some("buffered"));
        assert_eq!(config.buffered.capacity, 16);
        assert_eq!(
            config.buffered.path,
            Some(PathBuf::from("/tmp/observer.jsonl"))
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ObserverConfig::from_toml("").unwrap();
        assert_eq!(config.service.project_id, "");
        assert_eq!(config.service.name, "default");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.providers, ProviderSelection::default());
        assert_eq!(config.buffered.capacity, 1024);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = ObserverConfig::from_toml("[buffered]\ncapacity = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_blank_service_name_rejected() {
        let result = ObserverConfig::from_toml("[service]\nname = \"  \"\n");
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ObserverConfig::default();
        config.providers.logger = Some("tracing".to_string());

        let rendered = config.to_toml().unwrap();
        assert_eq!(ObserverConfig::from_toml(&rendered).unwrap(), config);
    }
}
