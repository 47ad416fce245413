//! # Log Devices
//!
//! Byte sinks the blackbox writes into.
//!
//! This module handles:
//! - The [`LogDevice`] contract used by the logging session
//! - Non-blocking space reservation ([`Reservation`])
//! - Concrete devices: in-memory, file backed and serial port
//!
//! A device never blocks the control loop. Callers ask for space with
//! [`LogDevice::reserve_buffer_space`] and write only once it is granted;
//! anything that cannot be granted now is retried or dropped by the caller.

pub mod file;
pub mod memory;
pub mod serial;

pub use file::FileDevice;
pub use memory::MemoryDevice;
pub use serial::SerialDevice;

use crate::error::Result;

/// Default header bytes a device accepts per control-loop iteration
pub const DEFAULT_HEADER_BYTES_PER_ITERATION: usize = 64;

/// Answer to a request for transmit buffer space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// The bytes may be written now
    Granted,
    /// Not enough room yet; try again on a later tick
    Deferred,
    /// The request exceeds what this device can ever hold
    Impossible,
}

/// A destination for the encoded log stream.
#[cfg_attr(test, mockall::automock)]
pub trait LogDevice {
    /// Acquire the underlying hardware or storage.
    fn open(&mut self) -> Result<()>;

    /// Prepare a fresh log. `Ok(false)` means not ready yet, poll again.
    fn begin_log(&mut self) -> Result<bool>;

    /// Check whether `bytes` can be written without blocking.
    fn reserve_buffer_space(&mut self, bytes: usize) -> Reservation;

    /// Free transmit buffer space right now
    fn bytes_free(&self) -> usize;

    /// Header bytes this device can absorb per iteration
    fn max_header_bytes_per_iteration(&self) -> usize {
        DEFAULT_HEADER_BYTES_PER_ITERATION
    }

    fn write_byte(&mut self, byte: u8) {
        self.write(&[byte]);
    }

    fn write(&mut self, data: &[u8]);

    /// Push buffered data towards the medium without waiting.
    fn flush(&mut self);

    /// Push everything out; `true` once nothing is left pending.
    fn flush_force(&mut self) -> bool;

    /// The medium has no room left (or has failed) and logging must stop.
    fn is_full(&self) -> bool;

    /// Finish the current log; `true` once the device has completed it.
    fn end_log(&mut self, had_data: bool) -> bool;

    fn close(&mut self);
}
