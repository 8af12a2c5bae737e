//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and every key is optional; a missing file section falls back
//! to the defaults below, which match the SORACOM Onyx dongle out of the box.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Result, SignalInfoError};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub modem: ModemConfig,
    pub metadata: MetadataConfig,
    pub udp: UdpConfig,
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Per-command response timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Which signal-quality query follows the serving-cell query
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignalQuery {
    /// `AT+CSQ`
    #[default]
    Csq,
    /// `AT+QCSQ`
    Qcsq,
    /// Serving-cell query only
    None,
}

/// Modem query configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ModemConfig {
    #[serde(default)]
    pub signal_query: SignalQuery,
}

/// SORACOM metadata service configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_url")]
    pub url: String,

    #[serde(default = "default_metadata_timeout_ms")]
    pub timeout_ms: u64,
}

/// Unified endpoint configuration
#[derive(Debug, Deserialize, Clone)]
pub struct UdpConfig {
    /// `host:port` of the datagram endpoint
    #[serde(default = "default_udp_endpoint")]
    pub endpoint: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log to this file instead of stderr
    #[serde(default)]
    pub file: Option<String>,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB3".to_string() }
fn default_baud_rate() -> u32 { 115200 }
fn default_timeout_ms() -> u64 { 5000 }

fn default_metadata_url() -> String { "http://metadata.soracom.io/v1/subscriber/tags".to_string() }
fn default_metadata_timeout_ms() -> u64 { 10000 }

fn default_udp_endpoint() -> String { "unified.soracom.io:23080".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            url: default_metadata_url(),
            timeout_ms: default_metadata_timeout_ms(),
        }
    }
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self { endpoint: default_udp_endpoint() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file: None }
    }
}

/// Baud rates accepted for the AT port
const VALID_BAUD_RATES: &[u32] = &[9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600];

/// Log levels accepted in `[logging] level`
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use onyx_signal_info::config::Config;
    ///
    /// let config = Config::load("/etc/onyx-signal-info.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if !VALID_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(invalid(format!(
                "baud_rate must be one of: {}",
                VALID_BAUD_RATES.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
            )));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 60000 {
            return Err(invalid("serial timeout_ms must be between 1 and 60000"));
        }

        if !self.metadata.url.starts_with("http://") && !self.metadata.url.starts_with("https://") {
            return Err(invalid("metadata url must start with http:// or https://"));
        }

        if self.metadata.timeout_ms == 0 || self.metadata.timeout_ms > 60000 {
            return Err(invalid("metadata timeout_ms must be between 1 and 60000"));
        }

        // host:port, the host part may itself be an IPv6 literal in brackets
        match self.udp.endpoint.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {}
            _ => return Err(invalid("udp endpoint must be in host:port form")),
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid("logging level must be one of: error, warn, info, debug, trace"));
        }

        if matches!(self.logging.file.as_deref(), Some("")) {
            return Err(invalid("logging file cannot be empty when set"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> SignalInfoError {
    SignalInfoError::Config(toml::de::Error::custom(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.serial.port, "/dev/ttyUSB3");
        assert_eq!(config.modem.signal_query, SignalQuery::Csq);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.serial.timeout_ms, 5000);
        assert_eq!(config.udp.endpoint, "unified.soracom.io:23080");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
port = "/dev/ttyUSB2"
timeout_ms = 3000

[modem]
signal_query = "qcsq"

[udp]
endpoint = "127.0.0.1:23080"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB2");
        assert_eq!(config.serial.timeout_ms, 3000);
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.modem.signal_query, SignalQuery::Qcsq);
        assert_eq!(config.udp.endpoint, "127.0.0.1:23080");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/onyx-signal-info.toml");
        assert!(matches!(result, Err(SignalInfoError::Io(_))));
    }

    #[test]
    fn test_unknown_signal_query() {
        let result = Config::from_toml("[modem]\nsignal_query = \"cesq\"\n");
        assert!(matches!(result, Err(SignalInfoError::Config(_))));
    }

    #[test]
    fn test_signal_query_none() {
        let config = Config::from_toml("[modem]\nsignal_query = \"none\"\n").unwrap();
        assert_eq!(config.modem.signal_query, SignalQuery::None);
    }

    #[test]
    fn test_empty_serial_port() {
        let mut config = Config::default();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = Config::default();
        config.serial.baud_rate = 420000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_baud_rates() {
        for &baud in VALID_BAUD_RATES {
            let mut config = Config::default();
            config.serial.baud_rate = baud;
            assert!(config.validate().is_ok(), "Baud rate {} should be valid", baud);
        }
    }

    #[test]
    fn test_timeout_ms_zero() {
        let mut config = Config::default();
        config.serial.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_ms_too_high() {
        let mut config = Config::default();
        config.serial.timeout_ms = 60001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_metadata_url_scheme() {
        let mut config = Config::default();
        config.metadata.url = "metadata.soracom.io/v1/subscriber/tags".to_string();
        assert!(config.validate().is_err());

        config.metadata.url = "https://metadata.example.com/tags".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_metadata_timeout_zero() {
        let mut config = Config::default();
        config.metadata.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_udp_endpoint_without_port() {
        let mut config = Config::default();
        config.udp.endpoint = "unified.soracom.io".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_udp_endpoint_bad_port() {
        let mut config = Config::default();
        config.udp.endpoint = "unified.soracom.io:70000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_udp_endpoint_ipv6() {
        let mut config = Config::default();
        config.udp.endpoint = "[::1]:23080".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_file() {
        let mut config = Config::default();
        config.logging.file = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_serial_port(), "/dev/ttyUSB3");
        assert_eq!(default_baud_rate(), 115200);
        assert_eq!(default_timeout_ms(), 5000);
        assert_eq!(default_metadata_url(), "http://metadata.soracom.io/v1/subscriber/tags");
        assert_eq!(default_metadata_timeout_ms(), 10000);
        assert_eq!(default_udp_endpoint(), "unified.soracom.io:23080");
        assert_eq!(default_log_level(), "info");
    }
}
