//! # Error Types
//!
//! Custom error types for RC Link using `thiserror`.
//!
//! The protocol functions themselves never fail; these errors only come from
//! the boundaries around them (serial port, configuration, sensor input,
//! telemetry files).

use std::time::Duration;
use thiserror::Error;

/// Main error type for RC Link
#[derive(Debug, Error)]
pub enum RcLinkError {
    /// Packet framing errors at the decode boundary
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port errors (open, write, read)
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No serial device found (tried: {0})")]
    SerialPortNotFound(String),

    /// The serial channel did not become ready in time
    #[error("Serial channel timed out after {0:?}")]
    Timeout(Duration),

    /// The serial channel reached end of stream
    #[error("Serial channel closed")]
    ChannelClosed,

    /// Malformed joystick sample
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Telemetry log errors
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

/// Result type alias for RC Link
pub type Result<T> = std::result::Result<T, RcLinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_includes_duration() {
        let err = RcLinkError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Serial channel timed out after 250ms");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: RcLinkError = io.into();
        assert!(matches!(err, RcLinkError::Io(_)));
    }
}
