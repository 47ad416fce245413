//! File-backed log device.
//!
//! Each log goes to the next free `LOGnnnnn.TXT` in the log directory,
//! mirroring the naming used on flight controller SD cards.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{BlackboxError, Result};

use super::{LogDevice, Reservation};

/// Largest single write accepted in one reservation
pub const FILE_WRITE_CHUNK: usize = 8192;

/// Highest log file number tried
const MAX_LOG_FILE_NUMBER: u32 = 99_999;

/// Header bytes per iteration for file logs
const FILE_HEADER_BYTES_PER_ITERATION: usize = 256;

/// Log device writing numbered log files into a directory.
#[derive(Debug)]
pub struct FileDevice {
    dir: PathBuf,
    /// Stop logging once this many bytes have been written to a log
    max_bytes: Option<u64>,
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
    written: u64,
    failed: bool,
    opened: bool,
}

impl FileDevice {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_bytes: None,
            writer: None,
            path: None,
            written: 0,
            failed: false,
            opened: false,
        }
    }

    /// Limit each log to `bytes`
    pub fn with_max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = Some(bytes);
        self
    }

    /// Path of the log being written, if any
    pub fn current_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn next_log_path(&self) -> Result<PathBuf> {
        (1..=MAX_LOG_FILE_NUMBER)
            .map(|n| self.dir.join(format!("LOG{:05}.TXT", n)))
            .find(|path| !path.exists())
            .ok_or_else(|| {
                BlackboxError::DeviceUnavailable(format!("no free log file name in {}", self.dir.display()))
            })
    }

    fn finish_writer(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                warn!("Failed to flush log file: {}", e);
            }
        }
    }
}

impl LogDevice for FileDevice {
    fn open(&mut self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        self.opened = true;
        self.failed = false;
        debug!("Log directory ready: {}", self.dir.display());
        Ok(())
    }

    fn begin_log(&mut self) -> Result<bool> {
        if !self.opened {
            return Err(BlackboxError::DeviceUnavailable("log directory is not open".to_string()));
        }
        if self.writer.is_some() {
            return Ok(true);
        }

        let path = self.next_log_path()?;
        let file = File::create(&path)?;
        info!("Logging to {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.path = Some(path);
        self.written = 0;
        Ok(true)
    }

    fn reserve_buffer_space(&mut self, bytes: usize) -> Reservation {
        if bytes > FILE_WRITE_CHUNK {
            Reservation::Impossible
        } else if self.writer.is_some() && !self.failed {
            Reservation::Granted
        } else {
            Reservation::Deferred
        }
    }

    fn bytes_free(&self) -> usize {
        if self.writer.is_none() || self.failed {
            return 0;
        }
        match self.max_bytes {
            Some(limit) => limit.saturating_sub(self.written).min(FILE_WRITE_CHUNK as u64) as usize,
            None => FILE_WRITE_CHUNK,
        }
    }

    fn max_header_bytes_per_iteration(&self) -> usize {
        FILE_HEADER_BYTES_PER_ITERATION
    }

    fn write(&mut self, data: &[u8]) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        match writer.write_all(data) {
            Ok(()) => self.written += data.len() as u64,
            Err(e) => {
                warn!("Log file write failed: {}", e);
                self.failed = true;
            }
        }
    }

    fn flush(&mut self) {}

    fn flush_force(&mut self) -> bool {
        let Some(writer) = self.writer.as_mut() else {
            return true;
        };
        if let Err(e) = writer.flush() {
            warn!("Log file flush failed: {}", e);
            self.failed = true;
        }
        !self.failed
    }

    fn is_full(&self) -> bool {
        self.failed || self.max_bytes.map(|limit| self.written >= limit).unwrap_or(false)
    }

    fn end_log(&mut self, had_data: bool) -> bool {
        self.finish_writer();
        if let Some(path) = self.path.take() {
            if had_data {
                info!("Closed log {} ({} bytes)", path.display(), self.written);
            } else if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to remove empty log {}: {}", path.display(), e);
            } else {
                debug!("Removed empty log {}", path.display());
            }
        }
        true
    }

    fn close(&mut self) {
        self.finish_writer();
        self.path = None;
        self.opened = false;
    }
}
