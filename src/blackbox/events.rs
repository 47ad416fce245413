//! # Event Frames
//!
//! Out-of-band `E` frames: a marker byte, the event id, then an
//! event-specific payload.
//!
//! | Id | Event | Payload |
//! |----|-------|---------|
//! | 0 | SyncBeep | beep time (UVB) |
//! | 13 | InflightAdjustment | function byte, then SVB value or f32 (function + 128) |
//! | 14 | LoggingResume | iteration (UVB), time (UVB) |
//! | 30 | FlightMode | flags (UVB), previous flags (UVB) |
//! | 40 | ImuFailure | error code (UVB) |
//! | 255 | LogEnd | ASCII text, NUL terminated |

use bytes::BufMut;

use super::encoding::{write_f32, write_signed_vb, write_string, write_unsigned_vb};
use super::fielddefs::FrameKind;

/// Added to the adjustment function id when the new value is a float
pub const ADJUSTMENT_FLOAT_FLAG: u8 = 128;

/// New value reported by an in-flight adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustmentValue {
    Int(i32),
    Float(f32),
}

/// Events the recorder can write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightLogEvent {
    /// Arming beep played; lets the log be aligned with video
    SyncBeep { time_us: u32 },
    InflightAdjustment { function: u8, value: AdjustmentValue },
    /// Logging resumed after a pause
    LoggingResume { iteration: u32, time_us: u32 },
    /// RC mode activation changed
    FlightMode { flags: u32, last_flags: u32 },
    ImuFailure { error_code: u32 },
    LogEnd { disarm_reason: u8 },
}

impl FlightLogEvent {
    /// Wire id of the event
    pub const fn id(&self) -> u8 {
        match self {
            FlightLogEvent::SyncBeep { .. } => 0,
            FlightLogEvent::InflightAdjustment { .. } => 13,
            FlightLogEvent::LoggingResume { .. } => 14,
            FlightLogEvent::FlightMode { .. } => 30,
            FlightLogEvent::ImuFailure { .. } => 40,
            FlightLogEvent::LogEnd { .. } => 255,
        }
    }
}

/// Encode a complete event frame.
pub fn encode_event<B: BufMut>(buf: &mut B, event: &FlightLogEvent) {
    buf.put_u8(FrameKind::Event.marker());
    buf.put_u8(event.id());

    match *event {
        FlightLogEvent::SyncBeep { time_us } => write_unsigned_vb(buf, time_us),
        FlightLogEvent::InflightAdjustment { function, value } => match value {
            AdjustmentValue::Int(v) => {
                buf.put_u8(function);
                write_signed_vb(buf, v);
            }
            AdjustmentValue::Float(v) => {
                buf.put_u8(function.wrapping_add(ADJUSTMENT_FLOAT_FLAG));
                write_f32(buf, v);
            }
        },
        FlightLogEvent::LoggingResume { iteration, time_us } => {
            write_unsigned_vb(buf, iteration);
            write_unsigned_vb(buf, time_us);
        }
        FlightLogEvent::FlightMode { flags, last_flags } => {
            write_unsigned_vb(buf, flags);
            write_unsigned_vb(buf, last_flags);
        }
        FlightLogEvent::ImuFailure { error_code } => write_unsigned_vb(buf, error_code),
        FlightLogEvent::LogEnd { disarm_reason } => {
            write_string(buf, &format!("End of log (disarm reason:{})", disarm_reason));
            buf.put_u8(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(event: FlightLogEvent) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_event(&mut buf, &event);
        buf
    }

    #[test]
    fn test_sync_beep() {
        assert_eq!(encode(FlightLogEvent::SyncBeep { time_us: 300 }), vec![b'E', 0, 0xAC, 0x02]);
    }

    #[test]
    fn test_logging_resume() {
        let bytes = encode(FlightLogEvent::LoggingResume { iteration: 64, time_us: 1 });
        assert_eq!(bytes, vec![b'E', 14, 64, 1]);
    }

    #[test]
    fn test_flight_mode() {
        let bytes = encode(FlightLogEvent::FlightMode { flags: 5, last_flags: 1 });
        assert_eq!(bytes, vec![b'E', 30, 5, 1]);
    }

    #[test]
    fn test_inflight_adjustment_int_and_float() {
        let int = encode(FlightLogEvent::InflightAdjustment {
            function: 3,
            value: AdjustmentValue::Int(-2),
        });
        assert_eq!(int, vec![b'E', 13, 3, 0x03]);

        let float = encode(FlightLogEvent::InflightAdjustment {
            function: 3,
            value: AdjustmentValue::Float(1.0),
        });
        assert_eq!(float, vec![b'E', 13, 131, 0x00, 0x00, 0x80, 0x3F]);
    }

    #[test]
    fn test_log_end() {
        let bytes = encode(FlightLogEvent::LogEnd { disarm_reason: 4 });
        assert_eq!(&bytes[..2], &[b'E', 255]);
        assert_eq!(&bytes[2..bytes.len() - 1], b"End of log (disarm reason:4)");
        assert_eq!(bytes.last(), Some(&0));
    }

    #[test]
    fn test_imu_failure() {
        assert_eq!(encode(FlightLogEvent::ImuFailure { error_code: 2 }), vec![b'E', 40, 2]);
    }
}
