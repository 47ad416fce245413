//! # Flight Data Module
//!
//! Everything the recorder reads from the rest of the flight stack.
//!
//! This module handles:
//! - [`FlightEnvironment`]: configuration and sensor presence, captured when
//!   a session starts
//! - [`FlightDataSource`]: the producers sampled every control-loop tick
//! - [`SimulatedFlight`]: a deterministic producer for the demo binary and tests

pub mod simulated;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::blackbox::state::{GpsSolution, MainState, SlowState};

pub use simulated::SimulatedFlight;

/// Live producers sampled by the recorder.
///
/// Implementations write into the snapshot they are handed and must not
/// block; the recorder calls them from the control-loop tick.
#[cfg_attr(test, mockall::automock)]
pub trait FlightDataSource {
    /// Fill every main-frame member. `time_us` and `iteration` are set by
    /// the recorder afterwards.
    fn sample_main(&self, state: &mut MainState);

    fn sample_slow(&self, state: &mut SlowState);

    /// Current GPS fix
    fn gps_solution(&self) -> GpsSolution;

    /// Home position (lat, lon) in 1e-7 degrees
    fn gps_home(&self) -> [i32; 2];

    /// Raw battery voltage, used as the `vbat` reference at session start
    fn vbat(&self) -> u16;

    /// Time of the most recent arming beep in microseconds
    fn arming_beep_time_us(&self) -> u32;

    /// RC mode activation mask
    fn rc_mode_flags(&self) -> u32;

    /// Whether the logging mode switch is on
    fn logging_switch_active(&self) -> bool;

    fn disarm_reason(&self) -> u8;
}

/// Firmware identity printed in the log header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirmwareInfo {
    pub version: String,
    pub revision: String,
    pub target: String,
    pub build_date: String,
    pub build_time: String,
}

impl Default for FirmwareInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            revision: "0000000".to_string(),
            target: "SITL".to_string(),
            build_date: "Jan  1 2024".to_string(),
            build_time: "00:00:00".to_string(),
        }
    }
}

/// Enabled firmware features relevant to the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub vbat: bool,
    pub current_meter: bool,
    pub gps: bool,
}

bitflags::bitflags! {
    /// Firmware feature bits, as printed in the `features` header line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FeatureMask: u32 {
        const VBAT = 1 << 1;
        const GPS = 1 << 7;
        const CURRENT_METER = 1 << 11;
    }
}

impl Features {
    pub fn mask(&self) -> FeatureMask {
        let mut mask = FeatureMask::empty();
        mask.set(FeatureMask::VBAT, self.vbat);
        mask.set(FeatureMask::GPS, self.gps);
        mask.set(FeatureMask::CURRENT_METER, self.current_meter);
        mask
    }
}

/// Detected sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sensors {
    pub mag: bool,
    pub baro: bool,
    pub pitot: bool,
    pub rangefinder: bool,
}

/// Battery and current meter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub voltage_scale: u16,
    /// Cell voltages in 0.01 V
    pub cell_min: u16,
    pub cell_warning: u16,
    pub cell_max: u16,
    pub current_offset: i16,
    pub current_scale: i16,
    /// Current is measured by an ADC sensor (as opposed to virtual)
    pub current_sensor_adc: bool,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            voltage_scale: 1100,
            cell_min: 330,
            cell_warning: 350,
            cell_max: 420,
            current_offset: 0,
            current_scale: 400,
            current_sensor_adc: true,
        }
    }
}

/// Gains of one PID controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidGains {
    pub p: u16,
    pub i: u16,
    pub d: u16,
    pub ff: u16,
}

/// All PID controllers printed in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidBank {
    pub roll: PidGains,
    pub pitch: PidGains,
    pub yaw: PidGains,
    pub pos_z: PidGains,
    pub pos_xy: PidGains,
    pub vel_xy: PidGains,
    pub level: PidGains,
    pub heading: PidGains,
    pub vel_z: PidGains,
}

impl PidBank {
    /// Rate controller gains by axis: 0 roll, 1 pitch, 2 yaw
    pub fn axis(&self, axis: usize) -> Option<&PidGains> {
        match axis {
            0 => Some(&self.roll),
            1 => Some(&self.pitch),
            2 => Some(&self.yaw),
            _ => None,
        }
    }
}

/// Active rate profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateProfile {
    pub rc_expo: u8,
    pub rc_yaw_expo: u8,
    pub thr_mid: u8,
    pub thr_expo: u8,
    pub tpa_rate: u8,
    pub tpa_breakpoint: u16,
    /// Roll, pitch, yaw rates
    pub rates: [u8; 3],
}

impl Default for RateProfile {
    fn default() -> Self {
        Self {
            rc_expo: 70,
            rc_yaw_expo: 20,
            thr_mid: 50,
            thr_expo: 0,
            tpa_rate: 0,
            tpa_breakpoint: 1500,
            rates: [20, 20, 20],
        }
    }
}

/// Filter and input tuning printed in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub yaw_lpf_hz: u16,
    pub dterm_lpf_hz: u16,
    pub dterm_lpf_type: u8,
    pub deadband: u8,
    pub yaw_deadband: u8,
    pub gyro_lpf_hz: u16,
    pub dynamic_gyro_notch_q: u16,
    pub dynamic_gyro_notch_min_hz: u16,
    pub acc_lpf_hz: u16,
    pub acc_notch_hz: u16,
    pub acc_notch_cutoff: u16,
    pub axis_acceleration_limit_yaw: u32,
    pub axis_acceleration_limit_roll_pitch: u32,
}

/// Selected drivers and output protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hardware {
    pub acc_hardware: u8,
    pub baro_hardware: u8,
    pub mag_hardware: u8,
    pub serialrx_provider: u8,
    pub motor_pwm_protocol: u8,
    pub motor_pwm_rate: u16,
}

/// Loaded mission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Waypoints {
    pub count: u8,
    pub valid: bool,
}

/// Session-start snapshot of the craft's configuration and sensor presence.
///
/// Field conditions and header lines are derived from this once per
/// session; changing it mid-session has no effect on the running log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightEnvironment {
    pub craft_name: String,
    pub firmware: FirmwareInfo,
    pub looptime_us: u32,
    /// Throttle idle value
    pub min_throttle: u16,
    pub max_throttle: u16,
    pub acc_1g: u16,
    pub motor_count: u8,
    pub servo_count: u8,
    pub mixer_uses_servos: bool,
    pub fixed_wing: bool,
    pub features: Features,
    pub sensors: Sensors,
    pub rssi_enabled: bool,
    pub debug_mode: u8,
    /// A logging mode switch is assigned, so the log can be paused
    pub mode_activation_configured: bool,
    pub battery: BatteryConfig,
    pub pid: PidBank,
    pub rates: RateProfile,
    pub tuning: Tuning,
    pub hardware: Hardware,
    pub waypoints: Waypoints,
    /// Wall-clock time the log started, if the real-time clock is set
    #[serde(skip)]
    pub start_datetime: Option<DateTime<FixedOffset>>,
}

impl Default for FlightEnvironment {
    fn default() -> Self {
        Self {
            craft_name: String::new(),
            firmware: FirmwareInfo::default(),
            looptime_us: 1000,
            min_throttle: 1070,
            max_throttle: 1850,
            acc_1g: 4096,
            motor_count: 4,
            servo_count: 0,
            mixer_uses_servos: false,
            fixed_wing: false,
            features: Features::default(),
            sensors: Sensors::default(),
            rssi_enabled: false,
            debug_mode: 0,
            mode_activation_configured: false,
            battery: BatteryConfig::default(),
            pid: PidBank::default(),
            rates: RateProfile::default(),
            tuning: Tuning::default(),
            hardware: Hardware::default(),
            waypoints: Waypoints::default(),
            start_datetime: None,
        }
    }
}
