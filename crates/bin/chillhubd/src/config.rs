//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `chillhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use chillhub_domain::device::{Credentials, DeviceId, DeviceIdentity, DeviceKind};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device address and session settings.
    pub device: DeviceConfig,
    /// Poll loop settings.
    pub poll: PollConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// One appliance to coordinate.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Appliance identifier.
    pub id: String,
    /// Host name or address on the local network.
    pub host: String,
    /// TCP port of the appliance's local protocol.
    pub port: u16,
    /// Appliance family (`AC` or `CC`).
    pub kind: String,
    /// Session token, hex encoded. Set together with `key` to select the
    /// authenticated session mode.
    pub token: Option<String>,
    /// Session key, hex encoded.
    pub key: Option<String>,
}

/// Poll loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between background refreshes.
    pub interval_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `chillhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("chillhub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CHILLHUB_DEVICE_ID") {
            self.device.id = val;
        }
        if let Ok(val) = std::env::var("CHILLHUB_DEVICE_HOST") {
            self.device.host = val;
        }
        if let Ok(val) = std::env::var("CHILLHUB_DEVICE_PORT") {
            if let Ok(port) = val.parse() {
                self.device.port = port;
            }
        }
        if let Ok(val) = std::env::var("CHILLHUB_DEVICE_KIND") {
            self.device.kind = val;
        }
        if let Ok(val) = std::env::var("CHILLHUB_TOKEN") {
            self.device.token = Some(val);
        }
        if let Ok(val) = std::env::var("CHILLHUB_KEY") {
            self.device.key = Some(val);
        }
        if let Ok(val) = std::env::var("CHILLHUB_POLL_INTERVAL_SECS") {
            if let Ok(secs) = val.parse() {
                self.poll.interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("CHILLHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.device.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.poll.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll interval must be non-zero".to_string(),
            ));
        }
        if self.device.token.is_some() != self.device.key.is_some() {
            return Err(ConfigError::Validation(
                "token and key must be set together".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the device identity this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns an error when the device kind is unrecognised or the
    /// credentials are not valid hex.
    pub fn device_identity(&self) -> Result<DeviceIdentity, ConfigError> {
        let kind: DeviceKind = self
            .device
            .kind
            .parse()
            .map_err(ConfigError::Validation)?;
        let credentials = match (&self.device.token, &self.device.key) {
            (Some(token), Some(key)) => Some(
                Credentials::from_hex(token, key)
                    .map_err(|err| ConfigError::Validation(err.to_string()))?,
            ),
            _ => None,
        };
        Ok(DeviceIdentity {
            id: DeviceId::new(&self.device.id),
            host: self.device.host.clone(),
            port: self.device.port,
            kind,
            credentials,
        })
    }

    /// Interval between background refreshes.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll.interval_secs)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            id: "0".to_string(),
            host: "127.0.0.1".to_string(),
            port: 6444,
            kind: "AC".to_string(),
            token: None,
            key: None,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "chillhubd=info,chillhub=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
