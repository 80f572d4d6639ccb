//! Configuration module
//!
//! Loaded from a TOML file (default `~/.config/device-registry/config.toml`).
//! Every section and field is optional; missing values fall back to defaults.
//!
//! ```toml
//! [server]
//! devices_port = 8080
//! metrics_port = 8081
//! layout = "split"
//!
//! [logging]
//! level = "info"
//! format = "text"
//!
//! [app]
//! version = "2.10.5"
//!
//! [[devices]]
//! id = 1
//! mac = "5F-22-CC-1F-43-82"
//! firmware = "2.1.6"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{default_seed, Device};

/// Environment variable pointing at the configuration file.
pub const CONFIG_ENV: &str = "DEVICE_REGISTRY_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("device-registry")
        .join("config.toml")
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub app: AppInfoConfig,
    /// Seed devices. Empty means the built-in seed.
    pub devices: Vec<Device>,
}

impl AppConfig {
    /// Read and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let server = &self.server;
        if server.layout == ListenerLayout::Split
            && server.devices_port != 0
            && server.devices_port == server.metrics_port
            && server.devices_host == server.metrics_host
        {
            return Err(ConfigError::Invalid(format!(
                "devices and metrics listeners both use {}:{}; use layout = \"single\" to share one listener",
                server.devices_host, server.devices_port
            )));
        }
        if self.app.version.trim().is_empty() {
            return Err(ConfigError::Invalid("app.version must not be empty".into()));
        }
        Ok(())
    }

    /// Devices the store starts with.
    pub fn seed_devices(&self) -> Vec<Device> {
        if self.devices.is_empty() {
            default_seed()
        } else {
            self.devices.clone()
        }
    }
}

/// How routes are spread over listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerLayout {
    /// `/devices` and `/metrics` on separate listeners.
    #[default]
    Split,
    /// Every route on the devices listener.
    Single,
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub devices_host: String,
    pub devices_port: u16,
    pub metrics_host: String,
    pub metrics_port: u16,
    pub layout: ListenerLayout,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    pub fn devices_address(&self) -> String {
        format!("{}:{}", self.devices_host, self.devices_port)
    }

    pub fn metrics_address(&self) -> String {
        format!("{}:{}", self.metrics_host, self.metrics_port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            devices_host: "0.0.0.0".to_string(),
            devices_port: 8080,
            metrics_host: "0.0.0.0".to_string(),
            metrics_port: 8081,
            layout: ListenerLayout::Split,
            shutdown_timeout: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Values exported through the info gauge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppInfoConfig {
    pub version: String,
}

impl Default for AppInfoConfig {
    fn default() -> Self {
        Self {
            version: "2.10.5".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_uses_defaults() {
        let file = write_config("");
        let config = AppConfig::load(file.path()).unwrap();

        assert_eq!(config.server.devices_port, 8080);
        assert_eq!(config.server.metrics_port, 8081);
        assert_eq!(config.server.layout, ListenerLayout::Split);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.app.version, "2.10.5");
        assert_eq!(config.seed_devices(), default_seed());
    }

    #[test]
    fn parses_sections_and_seed() {
        let file = write_config(
            r#"
            [server]
            devices_port = 9000
            layout = "single"

            [app]
            version = "3.0.0"

            [[devices]]
            id = 10
            mac = "AA-AA-AA-AA-AA-AA"
            firmware = "0.1"
            "#,
        );
        let config = AppConfig::load(file.path()).unwrap();

        assert_eq!(config.server.devices_address(), "0.0.0.0:9000");
        assert_eq!(config.server.layout, ListenerLayout::Single);
        assert_eq!(config.app.version, "3.0.0");
        assert_eq!(
            config.seed_devices(),
            vec![Device::new(10, "AA-AA-AA-AA-AA-AA", "0.1")]
        );
    }

    #[test]
    fn split_layout_rejects_shared_port() {
        let file = write_config(
            r#"
            [server]
            devices_port = 9000
            metrics_port = 9000
            "#,
        );
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn ephemeral_ports_are_allowed_in_split_layout() {
        let mut config = AppConfig::default();
        config.server.devices_port = 0;
        config.server.metrics_port = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let file = write_config("[server\ndevices_port = ");
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::load(Path::new("/nonexistent/device-registry.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
