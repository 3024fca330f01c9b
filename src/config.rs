//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Only the runtime around the link is configurable. Thresholds, symbols and
//! PWM constants are part of the protocol and fixed at build time.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{RcLinkError, Result};

/// Baud rates accepted for the link UART
pub const SUPPORTED_BAUD_RATES: &[u32] = &[2400, 4800, 9600, 19200, 38400, 57600, 115200];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub transmitter: TransmitterConfig,
    #[serde(default)]
    pub receiver: ReceiverConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `serial.port` value that probes the default device paths
pub const AUTO_DETECT_PORT: &str = "auto";

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    /// Device path, or `"auto"` to try the usual USB serial devices
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Per-packet timeout; 0 blocks until the channel is ready
    #[serde(default)]
    pub timeout_ms: u64,
}

/// Transmitter node configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TransmitterConfig {
    /// Minimum time between packets; 0 runs as fast as the link allows
    #[serde(default)]
    pub loop_interval_ms: u64,

    #[serde(default = "default_log_interval_packets")]
    pub log_interval_packets: u64,
}

/// Receiver node configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReceiverConfig {
    #[serde(default = "default_log_interval_packets")]
    pub log_interval_packets: u64,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Fallback level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for a daily rolling log file; stdout only when unset
    #[serde(default)]
    pub file_dir: Option<String>,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 9600 }

fn default_log_interval_packets() -> u64 { 1000 }

fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_format() -> String { "jsonl".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: 0,
        }
    }
}

impl Default for TransmitterConfig {
    fn default() -> Self {
        Self {
            loop_interval_ms: 0,
            log_interval_packets: default_log_interval_packets(),
        }
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            log_interval_packets: default_log_interval_packets(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            format: default_log_format(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_dir: None,
        }
    }
}

impl SerialConfig {
    /// Packet timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Whether the device should be found by probing instead of opened by path
    pub fn auto_detect(&self) -> bool {
        self.port.eq_ignore_ascii_case(AUTO_DETECT_PORT)
    }
}

impl TransmitterConfig {
    /// Loop pacing interval, `None` when free-running
    pub fn loop_interval(&self) -> Option<Duration> {
        (self.loop_interval_ms > 0).then(|| Duration::from_millis(self.loop_interval_ms))
    }
}

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
    /// use rc_link::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
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

        if !SUPPORTED_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(invalid(format!(
                "baud_rate must be one of: {:?}",
                SUPPORTED_BAUD_RATES
            )));
        }

        if self.serial.timeout_ms > 60000 {
            return Err(invalid("timeout_ms must be between 0 and 60000"));
        }

        if self.transmitter.loop_interval_ms > 10000 {
            return Err(invalid("loop_interval_ms must be between 0 and 10000"));
        }

        for (name, value) in [
            ("transmitter.log_interval_packets", self.transmitter.log_interval_packets),
            ("receiver.log_interval_packets", self.receiver.log_interval_packets),
        ] {
            if value == 0 {
                return Err(invalid(format!("{} must be greater than 0", name)));
            }
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.telemetry.format != "jsonl" {
            return Err(invalid("log format must be 'jsonl' (only supported format)"));
        }

        if self.logging.level.trim().is_empty() {
            return Err(invalid("logging level cannot be empty"));
        }

        if matches!(self.logging.file_dir.as_deref(), Some("")) {
            return Err(invalid("logging file_dir cannot be empty when set"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> RcLinkError {
    RcLinkError::Config(toml::de::Error::custom(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.serial.timeout(), None);
        assert_eq!(config.transmitter.loop_interval(), None);
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
port = "/dev/ttyS1"
baud_rate = 19200
timeout_ms = 500

[transmitter]
loop_interval_ms = 20

[receiver]

[telemetry]
enabled = true
log_dir = "/tmp/rc-link"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyS1");
        assert_eq!(config.serial.baud_rate, 19200);
        assert_eq!(config.serial.timeout(), Some(Duration::from_millis(500)));
        assert_eq!(config.transmitter.loop_interval(), Some(Duration::from_millis(20)));
        assert!(config.telemetry.enabled);
        assert_eq!(config.telemetry.max_files_to_keep, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 9600);
        assert!(!config.telemetry.enabled);
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load("/nonexistent/rc-link.toml");
        assert!(matches!(result, Err(RcLinkError::Io(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = Config::from_toml_str("[serial\nport = 3");
        assert!(matches!(result, Err(RcLinkError::Config(_))));
    }

    #[test]
    fn test_auto_detect_port() {
        let config = Config::from_toml_str("[serial]\nport = \"auto\"").unwrap();
        assert!(config.serial.auto_detect());
        assert!(config.validate().is_ok());

        assert!(!Config::default().serial.auto_detect());
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
        for &baud in SUPPORTED_BAUD_RATES {
            let mut config = Config::default();
            config.serial.baud_rate = baud;
            assert!(config.validate().is_ok(), "Baud rate {} should be valid", baud);
        }
    }

    #[test]
    fn test_timeout_too_high() {
        let mut config = Config::default();
        config.serial.timeout_ms = 60001;
        assert!(config.validate().is_err());
        config.serial.timeout_ms = 60000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_loop_interval_too_high() {
        let mut config = Config::default();
        config.transmitter.loop_interval_ms = 10001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_interval_packets_zero() {
        let mut config = Config::default();
        config.transmitter.log_interval_packets = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.receiver.log_interval_packets = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_enabled() {
        let mut config = Config::default();
        config.telemetry.enabled = true;
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_disabled() {
        let mut config = Config::default();
        config.telemetry.enabled = false;
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_records_per_file_zero() {
        let mut config = Config::default();
        config.telemetry.max_records_per_file = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_files_to_keep_zero() {
        let mut config = Config::default();
        config.telemetry.max_files_to_keep = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.telemetry.format = "csv".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_logging_level() {
        let mut config = Config::default();
        config.logging.level = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_logging_file_dir() {
        let mut config = Config::default();
        config.logging.file_dir = Some(String::new());
        assert!(config.validate().is_err());
        config.logging.file_dir = Some("./logs".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_thresholds_not_configurable() {
        // Unknown keys are ignored rather than silently changing the protocol
        let config = Config::from_toml_str("[receiver]\nthreshold_high = 700\n").unwrap();
        assert_eq!(config.receiver.log_interval_packets, 1000);
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_serial_port(), "/dev/ttyUSB0");
        assert_eq!(default_baud_rate(), 9600);
        assert_eq!(default_log_interval_packets(), 1000);
        assert_eq!(default_log_dir(), "./logs");
        assert_eq!(default_max_records_per_file(), 10000);
        assert_eq!(default_max_files_to_keep(), 10);
        assert_eq!(default_log_format(), "jsonl");
        assert_eq!(default_log_level(), "info");
    }
}
