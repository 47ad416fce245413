//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::blackbox::conditions::{IncludeFlags, MAX_MOTORS, MAX_SERVOS};
use crate::blackbox::BlackboxSettings;
use crate::device::serial::{DEFAULT_BAUD_RATE, DEFAULT_DEVICE_PATHS};
use crate::error::{BlackboxError, Result};
use crate::flight::FlightEnvironment;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub blackbox: BlackboxConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub craft: FlightEnvironment,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the log stream goes
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Kept in memory; only statistics are reported
    Memory,
    /// Numbered log files in `device.log_dir`
    File,
    /// External serial logger
    Serial,
}

/// Recorder configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BlackboxConfig {
    #[serde(default = "default_device_kind")]
    pub device: DeviceKind,

    #[serde(default = "default_rate_num")]
    pub rate_num: u16,

    #[serde(default = "default_rate_denom")]
    pub rate_denom: u16,

    /// Optional field groups, by name (`MOTORS`, `NAV_POS`, ...)
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Stop after this many seconds; 0 runs until Ctrl+C
    #[serde(default = "default_duration_s")]
    pub duration_s: u64,
}

/// Log device configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_serial_paths")]
    pub serial_paths: Vec<String>,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Per-log size limit for file logs
    #[serde(default)]
    pub max_file_bytes: Option<u64>,

    #[serde(default = "default_memory_buffer")]
    pub memory_buffer: usize,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Also write diagnostics to daily files in this directory
    #[serde(default)]
    pub dir: Option<String>,
}

// Default value functions
fn default_device_kind() -> DeviceKind { DeviceKind::File }
fn default_rate_num() -> u16 { 1 }
fn default_rate_denom() -> u16 { 1 }
fn default_duration_s() -> u64 { 10 }

fn default_include() -> Vec<String> {
    IncludeFlags::default()
        .iter_names()
        .map(|(name, _)| name.to_string())
        .collect()
}

fn default_serial_paths() -> Vec<String> {
    DEFAULT_DEVICE_PATHS.iter().map(|p| p.to_string()).collect()
}
fn default_baud_rate() -> u32 { DEFAULT_BAUD_RATE }
fn default_log_dir() -> String { "./blackbox".to_string() }
fn default_memory_buffer() -> usize { 4096 }

impl Default for BlackboxConfig {
    fn default() -> Self {
        Self {
            device: default_device_kind(),
            rate_num: default_rate_num(),
            rate_denom: default_rate_denom(),
            include: default_include(),
            duration_s: default_duration_s(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            serial_paths: default_serial_paths(),
            baud_rate: default_baud_rate(),
            log_dir: default_log_dir(),
            max_file_bytes: None,
            memory_buffer: default_memory_buffer(),
        }
    }
}

fn invalid(msg: impl std::fmt::Display) -> BlackboxError {
    BlackboxError::Config(toml::de::Error::custom(msg))
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
    /// use blackbox_logger::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Field groups selected by `blackbox.include`
    pub fn include_flags(&self) -> Result<IncludeFlags> {
        IncludeFlags::from_names(&self.blackbox.include)
            .map_err(|name| invalid(format!("unknown include flag '{}'", name)))
    }

    /// Session settings for the recorder
    pub fn settings(&self) -> Result<BlackboxSettings> {
        Ok(BlackboxSettings {
            rate_num: self.blackbox.rate_num,
            rate_denom: self.blackbox.rate_denom,
            include: self.include_flags()?,
        })
    }

    /// Validate configuration values
    ///
    /// A zero or improper `rate_num/rate_denom` is not an error; the recorder
    /// logs every iteration in that case.
    fn validate(&self) -> Result<()> {
        self.include_flags()?;

        let craft = &self.craft;
        if craft.looptime_us == 0 || craft.looptime_us > 100_000 {
            return Err(invalid("looptime_us must be between 1 and 100000"));
        }

        if craft.motor_count > MAX_MOTORS {
            return Err(invalid(format!("motor_count must be at most {}", MAX_MOTORS)));
        }

        if craft.servo_count > MAX_SERVOS {
            return Err(invalid(format!("servo_count must be at most {}", MAX_SERVOS)));
        }

        if craft.min_throttle >= craft.max_throttle {
            return Err(invalid("min_throttle must be less than max_throttle"));
        }

        match self.blackbox.device {
            DeviceKind::Serial => {
                if self.device.serial_paths.is_empty() {
                    return Err(invalid("serial_paths cannot be empty for a serial device"));
                }
                if ![9600, 19200, 38400, 57600, 115_200, 230_400, 250_000, 460_800, 921_600, 1_000_000, 2_000_000]
                    .contains(&self.device.baud_rate)
                {
                    return Err(invalid(format!("unsupported baud_rate {}", self.device.baud_rate)));
                }
            }
            DeviceKind::File => {
                if self.device.log_dir.is_empty() {
                    return Err(invalid("log_dir cannot be empty for a file device"));
                }
                if self.device.max_file_bytes == Some(0) {
                    return Err(invalid("max_file_bytes must be greater than 0"));
                }
            }
            DeviceKind::Memory => {
                if self.device.memory_buffer < 64 {
                    return Err(invalid("memory_buffer must be at least 64 bytes"));
                }
            }
        }

        Ok(())
    }
}
