//! # Error Types
//!
//! Custom error types for the blackbox logger using `thiserror`.
//!
//! The logging engine itself never fails a tick: device back-pressure and
//! dropped frames are reported through status values. These errors cover
//! configuration loading and opening the physical log devices.

use thiserror::Error;

/// Main error type for the blackbox logger
#[derive(Debug, Error)]
pub enum BlackboxError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port errors
    #[error("Serial port error: {0}")]
    Serial(String),

    /// None of the candidate serial ports could be opened
    #[error("No serial port found (tried: {0})")]
    SerialPortNotFound(String),

    /// The log device refused to open or to start a new log
    #[error("Log device unavailable: {0}")]
    DeviceUnavailable(String),
}

/// Result type alias for the blackbox logger
pub type Result<T> = std::result::Result<T, BlackboxError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::Error as _;

    #[test]
    fn test_config_error_display() {
        let err = BlackboxError::Config(toml::de::Error::custom("rate_denom must be positive"));
        let msg = err.to_string();
        assert!(msg.starts_with("Configuration error:"), "unexpected message: {}", msg);
        assert!(msg.contains("rate_denom must be positive"));
    }

    #[test]
    fn test_io_error_converts() {
        fn open() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))?
        }

        match open() {
            Err(BlackboxError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("Expected Io error, got: {:?}", other),
        }
    }

    #[test]
    fn test_serial_port_not_found_lists_paths() {
        let err = BlackboxError::SerialPortNotFound("/dev/ttyS1, /dev/ttyS2".to_string());
        assert!(err.to_string().contains("/dev/ttyS1, /dev/ttyS2"));
    }
}
