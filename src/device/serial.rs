//! # Serial Log Device
//!
//! Streams the log out of a UART to an external logger (OpenLog style).
//!
//! This module handles:
//! - Opening the first available serial port from a candidate list
//! - Reporting transmit buffer space from the driver's output queue
//! - Pacing the header to what the baud rate can carry per loop iteration

use std::io::Write;
use std::time::Duration;

use tokio_serial::SerialPort;
use tracing::{debug, info, warn};

use crate::error::{BlackboxError, Result};

use super::{LogDevice, Reservation};

/// Default baud rate for serial loggers
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Transmit buffer size assumed for the port
pub const SERIAL_TX_BUFFER: usize = 256;

/// Default serial device paths to try (in order of preference)
pub const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters
    "/dev/ttyACM0", // USB CDC devices
];

const WRITE_TIMEOUT: Duration = Duration::from_millis(10);

/// Serial port log device.
pub struct SerialDevice {
    paths: Vec<String>,
    baud_rate: u32,
    looptime_us: u32,
    port: Option<Box<dyn SerialPort>>,
    device_path: Option<String>,
    failed: bool,
}

impl std::fmt::Debug for SerialDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialDevice")
            .field("device_path", &self.device_path)
            .field("baud_rate", &self.baud_rate)
            .finish_non_exhaustive()
    }
}

impl SerialDevice {
    /// # Arguments
    ///
    /// * `paths` - Device paths to try when opening (e.g., `["/dev/ttyUSB0"]`)
    /// * `baud_rate` - Line speed
    /// * `looptime_us` - Control loop period, used to pace the header
    pub fn new<S: AsRef<str>>(paths: &[S], baud_rate: u32, looptime_us: u32) -> Self {
        Self {
            paths: paths.iter().map(|p| p.as_ref().to_string()).collect(),
            baud_rate,
            looptime_us,
            port: None,
            device_path: None,
            failed: false,
        }
    }

    /// Device path of the opened port
    pub fn device_path(&self) -> Option<&str> {
        self.device_path.as_deref()
    }

    /// Try each path in turn and keep the first port that opens.
    fn open_with_paths(&mut self) -> Result<()> {
        for path in &self.paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, self.baud_rate) {
                Ok(port) => {
                    info!("Opened serial log device at {} ({} baud)", path, self.baud_rate);
                    self.port = Some(port);
                    self.device_path = Some(path.clone());
                    self.failed = false;
                    return Ok(());
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(BlackboxError::SerialPortNotFound(self.paths.join(", ")))
    }

    /// Open a specific serial port at 8N1
    fn open_port(path: &str, baud_rate: u32) -> Result<Box<dyn SerialPort>> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|e| BlackboxError::Serial(format!("Failed to open {}: {}", path, e)))
    }

    fn queued(&self) -> Option<usize> {
        let port = self.port.as_ref()?;
        match port.bytes_to_write() {
            Ok(n) => Some(n as usize),
            Err(e) => {
                debug!("Could not query serial output queue: {}", e);
                None
            }
        }
    }
}

/// Header bytes the line can carry in one loop iteration, at 10 bits per byte.
pub fn header_bytes_per_iteration(baud_rate: u32, looptime_us: u32) -> usize {
    let bytes = u64::from(looptime_us) * u64::from(baud_rate) / 10 / 1_000_000;
    bytes.clamp(1, 64) as usize
}

impl LogDevice for SerialDevice {
    fn open(&mut self) -> Result<()> {
        if self.port.is_some() {
            return Ok(());
        }
        self.open_with_paths()
    }

    fn begin_log(&mut self) -> Result<bool> {
        match self.port {
            Some(_) => Ok(true),
            None => Err(BlackboxError::DeviceUnavailable("serial port is not open".to_string())),
        }
    }

    fn reserve_buffer_space(&mut self, bytes: usize) -> Reservation {
        if bytes >= SERIAL_TX_BUFFER {
            Reservation::Impossible
        } else if bytes <= self.bytes_free() {
            Reservation::Granted
        } else {
            Reservation::Deferred
        }
    }

    fn bytes_free(&self) -> usize {
        if self.failed {
            return 0;
        }
        self.queued()
            .map(|queued| SERIAL_TX_BUFFER.saturating_sub(queued))
            .unwrap_or(0)
    }

    fn max_header_bytes_per_iteration(&self) -> usize {
        header_bytes_per_iteration(self.baud_rate, self.looptime_us)
    }

    fn write(&mut self, data: &[u8]) {
        let Some(port) = self.port.as_mut() else {
            return;
        };
        if let Err(e) = port.write_all(data) {
            warn!("Serial write failed: {}", e);
            self.failed = true;
        }
    }

    fn flush(&mut self) {}

    fn flush_force(&mut self) -> bool {
        self.failed || self.queued() == Some(0)
    }

    fn is_full(&self) -> bool {
        self.failed
    }

    fn end_log(&mut self, _had_data: bool) -> bool {
        true
    }

    fn close(&mut self) {
        if let Some(path) = self.device_path.take() {
            info!("Closed serial log device at {}", path);
        }
        self.port = None;
    }
}
