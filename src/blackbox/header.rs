//! # Header Transmission
//!
//! The textual log header, sent a little at a time so a slow device is never
//! flooded and the control loop never stalls.
//!
//! This module handles:
//! - The per-tick header byte budget ([`HeaderBudget`])
//! - The resumable `H Field` definition writer ([`send_field_definitions`])
//! - Building the `H key:value` system information lines ([`sysinfo_lines`])
//!
//! ## Header layout
//!
//! ```text
//! H Product:Blackbox flight data recorder by Nicholas Sherlock
//! H Data version:2
//! H I interval:32
//! H Field I name:loopIteration,time,axisRate[0],...
//! H Field I signed:0,0,1,...
//! H Field I predictor:0,0,0,...
//! H Field I encoding:1,1,0,...
//! H Field P predictor:6,2,1,...
//! H Field P encoding:9,0,0,...
//! H Field S name:...
//! H Firmware type:Cleanflight
//! ...
//! ```

use tracing::trace;

use crate::device::{LogDevice, Reservation};
use crate::flight::FlightEnvironment;

use super::conditions::{Condition, ConditionCache};
use super::fielddefs::{FieldDef, FIELD_HEADER_ROW_NAMES};
use super::rate::LogRate;

/// Fixed preamble of every log
pub const HEADER_TEXT: &str =
    "H Product:Blackbox flight data recorder by Nicholas Sherlock\nH Data version:2\n";

/// Delay after entering header transmission before the first byte is sent
pub const HEADER_START_DELAY_MS: u64 = 100;

/// Largest chunk of header text written per tick
pub const TARGET_HEADER_BUDGET_PER_ITERATION: usize = 64;

/// Upper bound on budget saved up across ticks
pub const MAX_ACCUMULATED_HEADER_BUDGET: usize = 256;

/// Space reserved for one system information line
pub const SYSINFO_LINE_RESERVE: usize = 64;

/// Longest integer expected in a numeric header row
const LONGEST_INTEGER_STRLEN: usize = 2;

/// Header rows at or past this index describe the delta frame
const SIMPLE_FIELD_HEADER_ROWS: usize = 4;

/// Start datetime printed when the clock is not set
pub const UNKNOWN_DATETIME: &str = "0000-01-01T00:00:00.000+00:00";

/// Bytes the header may still write before the device catches up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderBudget {
    remaining: usize,
}

impl HeaderBudget {
    pub fn reset(&mut self) {
        self.remaining = 0;
    }

    /// Top up once per header tick, never beyond the device's free space.
    pub fn replenish(&mut self, free_space: usize, per_iteration: usize) {
        self.remaining = free_space
            .min(self.remaining.saturating_add(per_iteration))
            .min(MAX_ACCUMULATED_HEADER_BUDGET);
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Ask for `bytes` of budget and device space.
    ///
    /// A request the device can never satisfy is reported as
    /// [`Reservation::Impossible`] even when the budget is short.
    pub fn reserve<D: LogDevice + ?Sized>(&self, device: &mut D, bytes: usize) -> Reservation {
        match device.reserve_buffer_space(bytes) {
            Reservation::Granted if bytes <= self.remaining => Reservation::Granted,
            Reservation::Impossible => Reservation::Impossible,
            _ => Reservation::Deferred,
        }
    }

    pub fn spend(&mut self, bytes: usize) {
        self.remaining = self.remaining.saturating_sub(bytes);
    }
}

/// Outcome of one header transmission step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStep {
    /// More to send on a later tick
    Pending,
    /// This header section is complete
    Done,
    /// The device can never accept the next piece
    Aborted,
}

/// Resume point inside a field-definition section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldProgress {
    /// Header row being sent (name, signed, predictor, ...)
    pub header_index: usize,
    /// Next table entry; `None` until the row's `H Field` prefix is written
    pub field_index: Option<usize>,
    pub need_comma: bool,
}

/// Reserve and account for `bytes`; `None` means stop this tick.
fn claim<D: LogDevice + ?Sized>(
    device: &mut D,
    budget: &mut HeaderBudget,
    bytes: usize,
) -> Result<(), HeaderStep> {
    match budget.reserve(device, bytes) {
        Reservation::Granted => {
            budget.spend(bytes);
            Ok(())
        }
        Reservation::Deferred => Err(HeaderStep::Pending),
        Reservation::Impossible => Err(HeaderStep::Aborted),
    }
}

/// Send as much of a field-definition section as the budget allows.
///
/// Each call writes whole items only: a row prefix, one field entry, or the
/// row terminator. Progress is stored in `progress` so the next call resumes
/// exactly where this one stopped.
///
/// # Arguments
///
/// * `frame_char` - Frame marker for the first four rows
/// * `delta_char` - Frame marker for the inter-frame rows of two-coding tables
/// * `fields` - Field table, in wire order
/// * `cache` - Session condition cache
pub fn send_field_definitions<D, V, const N: usize>(
    device: &mut D,
    budget: &mut HeaderBudget,
    progress: &mut FieldProgress,
    frame_char: u8,
    delta_char: u8,
    fields: &[FieldDef<V, N>],
    cache: &ConditionCache,
) -> HeaderStep
where
    D: LogDevice + ?Sized,
{
    let rows = FieldDef::<V, N>::HEADER_ROWS;
    if progress.header_index >= rows {
        return HeaderStep::Done;
    }

    let row = progress.header_index;
    let start = match progress.field_index {
        Some(index) => index,
        None => {
            let row_name = FIELD_HEADER_ROW_NAMES[row];
            if let Err(step) = claim(device, budget, "H Field x :".len() + row_name.len()) {
                return step;
            }
            let marker = if row >= SIMPLE_FIELD_HEADER_ROWS { delta_char } else { frame_char };
            let prefix = format!("H Field {} {}:", marker as char, row_name);
            device.write(prefix.as_bytes());
            progress.need_comma = false;
            0
        }
    };

    for (index, def) in fields.iter().enumerate().skip(start) {
        progress.field_index = Some(index);
        if !cache.test(def.condition) {
            continue;
        }

        let estimate = if row == 0 {
            1 + def.name.len() + "[]".len() + LONGEST_INTEGER_STRLEN
        } else {
            1 + LONGEST_INTEGER_STRLEN
        };
        if let Err(step) = claim(device, budget, estimate) {
            return step;
        }

        let mut entry = String::with_capacity(estimate);
        if progress.need_comma {
            entry.push(',');
        }
        progress.need_comma = true;

        match row {
            0 => {
                entry.push_str(def.name);
                if let Some(i) = def.index {
                    entry.push_str(&format!("[{}]", i));
                }
            }
            _ => {
                entry.push_str(&row_value(def, row).to_string());
            }
        }
        device.write(entry.as_bytes());
    }
    progress.field_index = Some(fields.len());

    if let Err(step) = claim(device, budget, 1) {
        return step;
    }
    device.write_byte(b'\n');
    trace!("Sent header row {} for '{}' frames", FIELD_HEADER_ROW_NAMES[row], frame_char as char);

    progress.header_index += 1;
    progress.field_index = None;

    if progress.header_index < rows {
        HeaderStep::Pending
    } else {
        HeaderStep::Done
    }
}

/// Numeric value of header row `row` (1 and up) for one field.
fn row_value<V, const N: usize>(def: &FieldDef<V, N>, row: usize) -> u8 {
    if row == 1 {
        return def.sign as u8;
    }
    let coding = def.coding[(row - 2) / 2];
    if row % 2 == 0 {
        coding.predictor.id()
    } else {
        coding.encoding.id()
    }
}

fn line(lines: &mut Vec<String>, name: &str, value: impl std::fmt::Display) {
    lines.push(format!("H {}:{}\n", name, value));
}

fn pid3(gains: &crate::flight::PidGains) -> String {
    format!("{},{},{}", gains.p, gains.i, gains.d)
}

fn pid4(gains: &crate::flight::PidGains) -> String {
    format!("{},{},{},{}", gains.p, gains.i, gains.d, gains.ff)
}

/// Format the log start time, or the all-zero placeholder when unknown.
pub fn format_start_datetime(env: &FlightEnvironment) -> String {
    env.start_datetime
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string())
        .unwrap_or_else(|| UNKNOWN_DATETIME.to_string())
}

/// Every system information line for this session, newline terminated.
///
/// Battery lines appear only when `vbat` is logged, the current meter line
/// only when the current meter feature is on.
pub fn sysinfo_lines(
    env: &FlightEnvironment,
    rate: LogRate,
    vbat_reference: u16,
    cache: &ConditionCache,
) -> Vec<String> {
    let fw = &env.firmware;
    let battery = &env.battery;
    let rates = &env.rates;
    let pid = &env.pid;
    let tuning = &env.tuning;
    let hw = &env.hardware;

    let mut lines = Vec::with_capacity(64);
    line(&mut lines, "Firmware type", "Cleanflight");
    line(
        &mut lines,
        "Firmware revision",
        format!("INAV {} ({}) {}", fw.version, fw.revision, fw.target),
    );
    line(&mut lines, "Firmware date", format!("{} {}", fw.build_date, fw.build_time));
    line(&mut lines, "Log start datetime", format_start_datetime(env));
    line(&mut lines, "Craft name", &env.craft_name);
    line(&mut lines, "P interval", format!("{}/{}", rate.num(), rate.denom()));
    line(&mut lines, "minthrottle", env.min_throttle);
    line(&mut lines, "maxthrottle", env.max_throttle);
    line(&mut lines, "gyro_scale", format!("0x{:x}", 1.0f32.to_bits()));
    line(&mut lines, "motorOutput", format!("{},{}", env.min_throttle, env.max_throttle));
    line(&mut lines, "acc_1G", env.acc_1g);

    if cache.test(Condition::Vbat) {
        line(&mut lines, "vbat_scale", battery.voltage_scale / 10);
        line(
            &mut lines,
            "vbatcellvoltage",
            format!("{},{},{}", battery.cell_min / 10, battery.cell_warning / 10, battery.cell_max / 10),
        );
        line(&mut lines, "vbatref", vbat_reference);
    }

    if env.features.current_meter {
        line(
            &mut lines,
            "currentMeter",
            format!("{},{}", battery.current_offset, battery.current_scale),
        );
    }

    line(&mut lines, "looptime", env.looptime_us);
    line(&mut lines, "rc_rate", 100);
    line(&mut lines, "rc_expo", rates.rc_expo);
    line(&mut lines, "rc_yaw_expo", rates.rc_yaw_expo);
    line(&mut lines, "thr_mid", rates.thr_mid);
    line(&mut lines, "thr_expo", rates.thr_expo);
    line(&mut lines, "tpa_rate", rates.tpa_rate);
    line(&mut lines, "tpa_breakpoint", rates.tpa_breakpoint);
    line(
        &mut lines,
        "rates",
        format!("{},{},{}", rates.rates[0], rates.rates[1], rates.rates[2]),
    );
    line(&mut lines, "rollPID", pid4(&pid.roll));
    line(&mut lines, "pitchPID", pid4(&pid.pitch));
    line(&mut lines, "yawPID", pid4(&pid.yaw));
    line(&mut lines, "altPID", pid3(&pid.pos_z));
    line(&mut lines, "posPID", pid3(&pid.pos_xy));
    line(&mut lines, "posrPID", pid3(&pid.vel_xy));
    line(&mut lines, "levelPID", pid3(&pid.level));
    line(&mut lines, "magPID", pid.heading.p);
    line(&mut lines, "velPID", pid3(&pid.vel_z));
    line(&mut lines, "yaw_lpf_hz", tuning.yaw_lpf_hz);
    line(&mut lines, "dterm_lpf_hz", tuning.dterm_lpf_hz);
    line(&mut lines, "dterm_lpf_type", tuning.dterm_lpf_type);
    line(&mut lines, "deadband", tuning.deadband);
    line(&mut lines, "yaw_deadband", tuning.yaw_deadband);
    line(&mut lines, "gyro_lpf", 0);
    line(&mut lines, "gyro_lpf_hz", tuning.gyro_lpf_hz);
    line(&mut lines, "dynamicGyroNotchQ", tuning.dynamic_gyro_notch_q);
    line(&mut lines, "dynamicGyroNotchMinHz", tuning.dynamic_gyro_notch_min_hz);
    line(&mut lines, "acc_lpf_hz", tuning.acc_lpf_hz);
    line(&mut lines, "acc_hardware", hw.acc_hardware);
    line(&mut lines, "baro_hardware", hw.baro_hardware);
    line(&mut lines, "mag_hardware", hw.mag_hardware);
    line(&mut lines, "serialrx_provider", hw.serialrx_provider);
    line(&mut lines, "motor_pwm_protocol", hw.motor_pwm_protocol);
    line(&mut lines, "motor_pwm_rate", hw.motor_pwm_rate);
    line(&mut lines, "debug_mode", env.debug_mode);
    line(&mut lines, "features", env.features.mask().bits());
    line(
        &mut lines,
        "waypoints",
        format!("{},{}", env.waypoints.count, env.waypoints.valid as u8),
    );
    line(&mut lines, "acc_notch_hz", tuning.acc_notch_hz);
    line(&mut lines, "acc_notch_cutoff", tuning.acc_notch_cutoff);
    line(&mut lines, "axisAccelerationLimitYaw", tuning.axis_acceleration_limit_yaw);
    line(
        &mut lines,
        "axisAccelerationLimitRollPitch",
        tuning.axis_acceleration_limit_roll_pitch,
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackbox::conditions::IncludeFlags;
    use crate::blackbox::fields::{GPS_HOME_FIELDS, MAIN_FIELDS};
    use crate::device::{MemoryDevice, MockLogDevice};
    use chrono::{FixedOffset, TimeZone};

    fn cache(env: &FlightEnvironment) -> ConditionCache {
        ConditionCache::build(env, IncludeFlags::MOTORS, LogRate::default())
    }

    fn drain_all(device: &mut MemoryDevice) -> String {
        device.flush_force();
        String::from_utf8(device.contents().to_vec()).unwrap()
    }

    #[test]
    fn test_budget_replenish_caps() {
        let mut budget = HeaderBudget::default();
        budget.replenish(1000, 64);
        assert_eq!(budget.remaining(), 64);
        for _ in 0..10 {
            budget.replenish(1000, 64);
        }
        assert_eq!(budget.remaining(), MAX_ACCUMULATED_HEADER_BUDGET);
        budget.replenish(10, 64);
        assert_eq!(budget.remaining(), 10);
        budget.reset();
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_budget_reserve_needs_both() {
        let mut device = MockLogDevice::new();
        device.expect_reserve_buffer_space().returning(|n| {
            if n > 100 {
                Reservation::Impossible
            } else {
                Reservation::Granted
            }
        });

        let mut budget = HeaderBudget::default();
        budget.replenish(1000, 20);
        assert_eq!(budget.reserve(&mut device, 20), Reservation::Granted);
        assert_eq!(budget.reserve(&mut device, 21), Reservation::Deferred);
        assert_eq!(budget.reserve(&mut device, 101), Reservation::Impossible);
    }

    #[test]
    fn test_gps_home_definitions() {
        let env = FlightEnvironment::default();
        let cache = cache(&env);
        let mut device = MemoryDevice::new(4096);
        let mut budget = HeaderBudget::default();
        let mut progress = FieldProgress::default();

        let mut steps = 0;
        loop {
            budget.replenish(4096, 256);
            match send_field_definitions(&mut device, &mut budget, &mut progress, b'H', b'H', &GPS_HOME_FIELDS, &cache) {
                HeaderStep::Done => break,
                HeaderStep::Pending => steps += 1,
                HeaderStep::Aborted => panic!("aborted"),
            }
            assert!(steps < 100);
        }

        assert_eq!(
            drain_all(&mut device),
            "H Field H name:GPS_home[0],GPS_home[1]\n\
             H Field H signed:1,1\n\
             H Field H predictor:0,0\n\
             H Field H encoding:0,0\n"
        );
    }

    #[test]
    fn test_main_definitions_resume_across_small_budgets() {
        let env = FlightEnvironment { motor_count: 2, ..FlightEnvironment::default() };
        let cache = cache(&env);

        // Reference: one huge budget
        let mut reference = MemoryDevice::new(1 << 16);
        let mut budget = HeaderBudget::default();
        let mut progress = FieldProgress::default();
        loop {
            budget.replenish(1 << 16, 1 << 16);
            if send_field_definitions(&mut reference, &mut budget, &mut progress, b'I', b'P', &MAIN_FIELDS, &cache)
                == HeaderStep::Done
            {
                break;
            }
        }

        // Same output with a tiny per-tick budget
        let mut chunked = MemoryDevice::new(1 << 16);
        let mut budget = HeaderBudget::default();
        let mut progress = FieldProgress::default();
        let mut ticks = 0;
        loop {
            budget.replenish(1 << 16, 20);
            ticks += 1;
            if send_field_definitions(&mut chunked, &mut budget, &mut progress, b'I', b'P', &MAIN_FIELDS, &cache)
                == HeaderStep::Done
            {
                break;
            }
            assert!(ticks < 10_000);
        }
        assert!(ticks > 6);

        let text = drain_all(&mut chunked);
        assert_eq!(text, drain_all(&mut reference));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("H Field I name:loopIteration,time,axisRate[0],"));
        assert!(lines[0].ends_with("motor[0],motor[1],navState,navFlags"));
        assert!(!lines[0].contains("axisD"), "zero D gains must hide axisD");
        assert!(lines[4].starts_with("H Field P predictor:6,2,"));
        assert!(lines[5].starts_with("H Field P encoding:9,0,"));

        let columns: Vec<usize> = lines
            .iter()
            .map(|l| l.split(':').nth(1).map(|v| v.split(',').count()).unwrap_or(0))
            .collect();
        assert!(columns.iter().all(|&c| c == columns[0]), "{:?}", columns);
    }

    #[test]
    fn test_deferred_reservation_writes_nothing() {
        let env = FlightEnvironment::default();
        let cache = cache(&env);
        let mut device = MockLogDevice::new();
        device.expect_reserve_buffer_space().returning(|_| Reservation::Deferred);
        device.expect_write().never();
        device.expect_write_byte().never();

        let mut budget = HeaderBudget::default();
        budget.replenish(1000, 64);
        let mut progress = FieldProgress::default();
        for _ in 0..5 {
            let step = send_field_definitions(&mut device, &mut budget, &mut progress, b'S', b'S', &GPS_HOME_FIELDS, &cache);
            assert_eq!(step, HeaderStep::Pending);
        }
        assert_eq!(progress, FieldProgress::default());
    }

    #[test]
    fn test_impossible_reservation_aborts() {
        let env = FlightEnvironment::default();
        let cache = cache(&env);
        let mut device = MockLogDevice::new();
        device.expect_reserve_buffer_space().returning(|_| Reservation::Impossible);

        let mut budget = HeaderBudget::default();
        let mut progress = FieldProgress::default();
        let step = send_field_definitions(&mut device, &mut budget, &mut progress, b'H', b'H', &GPS_HOME_FIELDS, &cache);
        assert_eq!(step, HeaderStep::Aborted);
    }

    #[test]
    fn test_sysinfo_lines() {
        let mut env = FlightEnvironment::default();
        env.craft_name = "QUAD".to_string();
        env.pid.roll = crate::flight::PidGains { p: 40, i: 30, d: 23, ff: 60 };

        let rate = LogRate::new(1, 2, 1000);
        let lines = sysinfo_lines(&env, rate, 1680, &cache(&env));

        assert_eq!(lines[0], "H Firmware type:Cleanflight\n");
        assert!(lines.contains(&"H Craft name:QUAD\n".to_string()));
        assert!(lines.contains(&"H P interval:1/2\n".to_string()));
        assert!(lines.contains(&"H gyro_scale:0x3f800000\n".to_string()));
        assert!(lines.contains(&"H rollPID:40,30,23,60\n".to_string()));
        assert!(lines.contains(&format!("H Log start datetime:{}\n", UNKNOWN_DATETIME)));
        assert!(!lines.iter().any(|l| l.starts_with("H vbatref")));
        assert!(!lines.iter().any(|l| l.starts_with("H currentMeter")));
        assert!(lines.iter().all(|l| l.len() <= SYSINFO_LINE_RESERVE));
    }

    #[test]
    fn test_sysinfo_battery_lines() {
        let mut env = FlightEnvironment::default();
        env.features.vbat = true;
        env.features.current_meter = true;

        let lines = sysinfo_lines(&env, LogRate::default(), 1650, &cache(&env));
        assert!(lines.contains(&"H vbat_scale:110\n".to_string()));
        assert!(lines.contains(&"H vbatcellvoltage:33,35,42\n".to_string()));
        assert!(lines.contains(&"H vbatref:1650\n".to_string()));
        assert!(lines.contains(&"H currentMeter:0,400\n".to_string()));
        assert!(lines.contains(&"H features:2050\n".to_string()));
    }

    #[test]
    fn test_start_datetime_format() {
        let mut env = FlightEnvironment::default();
        let offset = FixedOffset::east_opt(0).unwrap();
        env.start_datetime = offset.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).single();
        assert_eq!(format_start_datetime(&env), "2019-01-01T00:00:00.000+00:00");
    }
}
