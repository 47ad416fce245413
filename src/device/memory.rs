//! In-memory log device.
//!
//! Models a transmit buffer drained by a slower medium. Used by the
//! simulator and throughout the tests.

use tracing::debug;

use crate::error::{BlackboxError, Result};

use super::{LogDevice, Reservation};

/// Log device backed by a `Vec<u8>`.
#[derive(Debug, Clone)]
pub struct MemoryDevice {
    /// Size of the transmit buffer
    buffer_size: usize,
    /// Bytes moved from the buffer to the medium per `flush`
    drain_per_flush: usize,
    /// Total bytes the medium can store
    capacity: Option<usize>,
    pending: Vec<u8>,
    contents: Vec<u8>,
    fail_open: bool,
    open: bool,
    logs_started: usize,
    logs_ended: usize,
}

impl MemoryDevice {
    /// Device whose buffer drains completely on every flush
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            drain_per_flush: buffer_size,
            capacity: None,
            pending: Vec::new(),
            contents: Vec::new(),
            fail_open: false,
            open: false,
            logs_started: 0,
            logs_ended: 0,
        }
    }

    /// Drain at most `bytes` per flush
    pub fn with_drain_rate(mut self, bytes: usize) -> Self {
        self.drain_per_flush = bytes;
        self
    }

    /// Report full once `bytes` have been written
    pub fn with_capacity_limit(mut self, bytes: usize) -> Self {
        self.capacity = Some(bytes);
        self
    }

    /// Refuse to open
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Bytes that have reached the medium
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Bytes still waiting in the transmit buffer
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn logs_ended(&self) -> usize {
        self.logs_ended
    }

    fn drain(&mut self, bytes: usize) {
        let n = bytes.min(self.pending.len());
        self.contents.extend(self.pending.drain(..n));
    }
}

impl LogDevice for MemoryDevice {
    fn open(&mut self) -> Result<()> {
        if self.fail_open {
            return Err(BlackboxError::DeviceUnavailable("memory device refused to open".to_string()));
        }
        self.open = true;
        Ok(())
    }

    fn begin_log(&mut self) -> Result<bool> {
        if !self.open {
            return Err(BlackboxError::DeviceUnavailable("memory device is closed".to_string()));
        }
        self.logs_started += 1;
        debug!("Memory device started log {}", self.logs_started);
        Ok(true)
    }

    fn reserve_buffer_space(&mut self, bytes: usize) -> Reservation {
        if bytes > self.buffer_size {
            Reservation::Impossible
        } else if bytes <= self.bytes_free() {
            Reservation::Granted
        } else {
            Reservation::Deferred
        }
    }

    fn bytes_free(&self) -> usize {
        self.buffer_size.saturating_sub(self.pending.len())
    }

    fn write(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
    }

    fn flush(&mut self) {
        self.drain(self.drain_per_flush);
    }

    fn flush_force(&mut self) -> bool {
        self.drain(self.pending.len());
        true
    }

    fn is_full(&self) -> bool {
        self.capacity
            .map(|limit| self.contents.len() + self.pending.len() >= limit)
            .unwrap_or(false)
    }

    fn end_log(&mut self, _had_data: bool) -> bool {
        self.logs_ended += 1;
        true
    }

    fn close(&mut self) {
        self.drain(self.pending.len());
        self.open = false;
    }
}
