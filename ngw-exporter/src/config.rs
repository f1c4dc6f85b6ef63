//! Configuration for the gateway exporter.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use ngw_common::LoggingConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] ngw_common::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// The gateway to scrape.
    #[serde(default)]
    pub device: DeviceConfig,

    /// HTTP endpoint settings.
    #[serde(default)]
    pub exporter: ServerConfig,

    /// Which collectors to register.
    #[serde(default)]
    pub collectors: CollectorsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gateway device settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Address of the gateway, `host` or `host:port`. Required.
    #[serde(default)]
    pub target: String,

    /// Timeout for each endpoint request in seconds (default: 10).
    #[serde(default = "default_scrape_timeout")]
    pub scrape_timeout_secs: u64,
}

fn default_scrape_timeout() -> u64 {
    10
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            scrape_timeout_secs: default_scrape_timeout(),
        }
    }
}

impl DeviceConfig {
    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_secs)
    }
}

/// Prometheus HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (default: "0.0.0.0:9099").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path for metrics endpoint (default: "/metrics").
    #[serde(default = "default_path")]
    pub path: String,

    /// What to serve when a collector fails (default: "fail").
    #[serde(default)]
    pub error_handling: ErrorHandling,
}

fn default_listen() -> String {
    "0.0.0.0:9099".to_string()
}

fn default_path() -> String {
    "/metrics".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
            error_handling: ErrorHandling::default(),
        }
    }
}

/// Behaviour of the metrics endpoint when a collector reports a failed scrape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorHandling {
    /// Answer 500 with the collector errors; the scrape shows up as failed.
    #[default]
    Fail,
    /// Serve whatever the healthy collectors produced.
    Continue,
}

/// Collector toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorsConfig {
    /// Gateway identity and uptime.
    #[serde(default = "default_true")]
    pub gateway: bool,

    /// Cellular radio counters and signal quality.
    #[serde(default = "default_true")]
    pub radio: bool,

    /// LAN and WLAN statistics.
    #[serde(default = "default_true")]
    pub network: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CollectorsConfig {
    fn default() -> Self {
        Self {
            gateway: true,
            radio: true,
            network: true,
        }
    }
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    ///
    /// The result is not validated so command-line overrides can be applied
    /// first; call [`ExporterConfig::validate`] afterwards.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(ngw_common::load_config(path)?)
    }

    /// Parse and validate configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = ngw_common::parse_config(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parsed listen address. Only fails on configurations that were never validated.
    ///
    /// A bare `:PORT` binds every IPv4 interface, as `0.0.0.0:PORT`.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let listen = self.exporter.listen.trim();
        let parsed = match listen.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{}", port).parse(),
            None => listen.parse(),
        };
        parsed.map_err(|_| {
            ConfigError::Validation(format!("Invalid listen address: {}", self.exporter.listen))
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.target.trim().is_empty() {
            return Err(ConfigError::Validation(
                "device target is required".to_string(),
            ));
        }

        if self.device.target.contains('/') {
            return Err(ConfigError::Validation(format!(
                "device target must be a host or host:port, got {}",
                self.device.target
            )));
        }

        if self.device.scrape_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "scrape_timeout_secs must be > 0".to_string(),
            ));
        }

        self.listen_addr()?;

        // Validate path starts with /
        if !self.exporter.path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Metrics path must start with /".to_string(),
            ));
        }

        let c = &self.collectors;
        if !(c.gateway || c.radio || c.network) {
            return Err(ConfigError::Validation(
                "at least one collector must be enabled".to_string(),
            ));
        }

        Ok(())
    }
}
