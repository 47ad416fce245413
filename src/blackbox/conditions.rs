//! # Field Conditions
//!
//! Decides which fields take part in a logging session.
//!
//! This module handles:
//! - The [`Condition`] vocabulary attached to every field definition
//! - User-selectable field groups ([`IncludeFlags`])
//! - The per-session [`ConditionCache`], a compile-time sized bitset
//!
//! Conditions are evaluated once when a session starts and are frozen until
//! the session ends, so the header and every data frame see the same set of
//! fields.

use crate::flight::FlightEnvironment;

use super::rate::LogRate;

/// Highest motor count addressable by `AtLeastMotors`
pub const MAX_MOTORS: u8 = 8;

/// Highest servo count addressable by `AtLeastServos`
pub const MAX_SERVOS: u8 = 26;

/// Number of PID axes with a `NonzeroPidD` condition
pub const PID_D_AXES: u8 = 3;

/// Predicate deciding whether a field is present in this session's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Always,
    Motors,
    /// At least `n` motors (1..=8) and motors included
    AtLeastMotors(u8),
    Servos,
    /// At least `n` servos (1..=26) and servos included
    AtLeastServos(u8),
    Mag,
    Baro,
    Pitot,
    Vbat,
    Amperage,
    Surface,
    FixedWingNav,
    McNav,
    Rssi,
    /// D gain of PID axis `n` (0..=2) is non-zero
    NonzeroPidD(u8),
    NotLoggingEveryFrame,
    Debug,
    NavAcc,
    NavPos,
    Acc,
    Attitude,
    RcData,
    RcCommand,
    GyroRaw,
    GyroPeaksRoll,
    GyroPeaksPitch,
    GyroPeaksYaw,
    Never,
}

const MOTORS_FIRST: u32 = 2;
const SERVOS_ID: u32 = MOTORS_FIRST + MAX_MOTORS as u32;
const SERVOS_FIRST: u32 = SERVOS_ID + 1;
const MAG_ID: u32 = SERVOS_FIRST + MAX_SERVOS as u32;
const PID_D_FIRST: u32 = MAG_ID + 9;
const NOT_EVERY_FRAME_ID: u32 = PID_D_FIRST + PID_D_AXES as u32;

impl Condition {
    /// Total number of distinct conditions
    pub const COUNT: u32 = NOT_EVERY_FRAME_ID + 13;

    /// Dense numeric id, `0..COUNT`.
    pub const fn id(self) -> u32 {
        match self {
            Condition::Always => 0,
            Condition::Motors => 1,
            Condition::AtLeastMotors(n) => MOTORS_FIRST + n as u32 - 1,
            Condition::Servos => SERVOS_ID,
            Condition::AtLeastServos(n) => SERVOS_FIRST + n as u32 - 1,
            Condition::Mag => MAG_ID,
            Condition::Baro => MAG_ID + 1,
            Condition::Pitot => MAG_ID + 2,
            Condition::Vbat => MAG_ID + 3,
            Condition::Amperage => MAG_ID + 4,
            Condition::Surface => MAG_ID + 5,
            Condition::FixedWingNav => MAG_ID + 6,
            Condition::McNav => MAG_ID + 7,
            Condition::Rssi => MAG_ID + 8,
            Condition::NonzeroPidD(axis) => PID_D_FIRST + axis as u32,
            Condition::NotLoggingEveryFrame => NOT_EVERY_FRAME_ID,
            Condition::Debug => NOT_EVERY_FRAME_ID + 1,
            Condition::NavAcc => NOT_EVERY_FRAME_ID + 2,
            Condition::NavPos => NOT_EVERY_FRAME_ID + 3,
            Condition::Acc => NOT_EVERY_FRAME_ID + 4,
            Condition::Attitude => NOT_EVERY_FRAME_ID + 5,
            Condition::RcData => NOT_EVERY_FRAME_ID + 6,
            Condition::RcCommand => NOT_EVERY_FRAME_ID + 7,
            Condition::GyroRaw => NOT_EVERY_FRAME_ID + 8,
            Condition::GyroPeaksRoll => NOT_EVERY_FRAME_ID + 9,
            Condition::GyroPeaksPitch => NOT_EVERY_FRAME_ID + 10,
            Condition::GyroPeaksYaw => NOT_EVERY_FRAME_ID + 11,
            Condition::Never => NOT_EVERY_FRAME_ID + 12,
        }
    }

    /// Inverse of [`Condition::id`]; unknown ids yield `None`.
    pub const fn from_id(id: u32) -> Option<Condition> {
        let condition = match id {
            0 => Condition::Always,
            1 => Condition::Motors,
            n if n >= MOTORS_FIRST && n < SERVOS_ID => {
                Condition::AtLeastMotors((n - MOTORS_FIRST + 1) as u8)
            }
            SERVOS_ID => Condition::Servos,
            n if n >= SERVOS_FIRST && n < MAG_ID => {
                Condition::AtLeastServos((n - SERVOS_FIRST + 1) as u8)
            }
            MAG_ID => Condition::Mag,
            n if n == MAG_ID + 1 => Condition::Baro,
            n if n == MAG_ID + 2 => Condition::Pitot,
            n if n == MAG_ID + 3 => Condition::Vbat,
            n if n == MAG_ID + 4 => Condition::Amperage,
            n if n == MAG_ID + 5 => Condition::Surface,
            n if n == MAG_ID + 6 => Condition::FixedWingNav,
            n if n == MAG_ID + 7 => Condition::McNav,
            n if n == MAG_ID + 8 => Condition::Rssi,
            n if n >= PID_D_FIRST && n < NOT_EVERY_FRAME_ID => {
                Condition::NonzeroPidD((n - PID_D_FIRST) as u8)
            }
            NOT_EVERY_FRAME_ID => Condition::NotLoggingEveryFrame,
            n if n == NOT_EVERY_FRAME_ID + 1 => Condition::Debug,
            n if n == NOT_EVERY_FRAME_ID + 2 => Condition::NavAcc,
            n if n == NOT_EVERY_FRAME_ID + 3 => Condition::NavPos,
            n if n == NOT_EVERY_FRAME_ID + 4 => Condition::Acc,
            n if n == NOT_EVERY_FRAME_ID + 5 => Condition::Attitude,
            n if n == NOT_EVERY_FRAME_ID + 6 => Condition::RcData,
            n if n == NOT_EVERY_FRAME_ID + 7 => Condition::RcCommand,
            n if n == NOT_EVERY_FRAME_ID + 8 => Condition::GyroRaw,
            n if n == NOT_EVERY_FRAME_ID + 9 => Condition::GyroPeaksRoll,
            n if n == NOT_EVERY_FRAME_ID + 10 => Condition::GyroPeaksPitch,
            n if n == NOT_EVERY_FRAME_ID + 11 => Condition::GyroPeaksYaw,
            n if n == NOT_EVERY_FRAME_ID + 12 => Condition::Never,
            _ => return None,
        };
        Some(condition)
    }

    /// Evaluate against the session's environment, field selection and rate.
    pub fn evaluate(self, env: &FlightEnvironment, include: IncludeFlags, rate: LogRate) -> bool {
        match self {
            Condition::Always => true,
            Condition::Motors => include.contains(IncludeFlags::MOTORS),
            Condition::AtLeastMotors(n) => {
                env.motor_count >= n && include.contains(IncludeFlags::MOTORS)
            }
            Condition::Servos => include.contains(IncludeFlags::SERVOS) && env.mixer_uses_servos,
            Condition::AtLeastServos(n) => {
                env.servo_count >= n
                    && env.mixer_uses_servos
                    && include.contains(IncludeFlags::SERVOS)
            }
            Condition::NonzeroPidD(axis) => env
                .pid
                .axis(axis as usize)
                .map(|gains| gains.d != 0)
                .unwrap_or(false),
            Condition::Mag => env.sensors.mag && include.contains(IncludeFlags::MAG),
            Condition::Baro => env.sensors.baro,
            Condition::Pitot => env.sensors.pitot,
            Condition::Vbat => env.features.vbat,
            Condition::Amperage => env.features.current_meter && env.battery.current_sensor_adc,
            Condition::Surface => env.sensors.rangefinder,
            Condition::FixedWingNav => env.fixed_wing && include.contains(IncludeFlags::NAV_PID),
            Condition::McNav => !env.fixed_wing && include.contains(IncludeFlags::NAV_PID),
            Condition::Rssi => env.rssi_enabled,
            Condition::NotLoggingEveryFrame => rate.num() < rate.denom(),
            Condition::Debug => env.debug_mode != 0,
            Condition::NavAcc => include.contains(IncludeFlags::NAV_ACC),
            Condition::NavPos => include.contains(IncludeFlags::NAV_POS),
            Condition::Acc => include.contains(IncludeFlags::ACC),
            Condition::Attitude => include.contains(IncludeFlags::ATTI),
            Condition::RcData => include.contains(IncludeFlags::RC_DATA),
            Condition::RcCommand => include.contains(IncludeFlags::RC_COMMAND),
            Condition::GyroRaw => include.contains(IncludeFlags::GYRO_RAW),
            Condition::GyroPeaksRoll => include.contains(IncludeFlags::PEAKS_R),
            Condition::GyroPeaksPitch => include.contains(IncludeFlags::PEAKS_P),
            Condition::GyroPeaksYaw => include.contains(IncludeFlags::PEAKS_Y),
            Condition::Never => false,
        }
    }
}

bitflags::bitflags! {
    /// Optional field groups a user can switch on or off.
    ///
    /// Flag names are the configuration names used by the firmware CLI.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IncludeFlags: u32 {
        const NAV_ACC = 1 << 0;
        const NAV_POS = 1 << 1;
        const NAV_PID = 1 << 2;
        const MAG = 1 << 3;
        const ACC = 1 << 4;
        const ATTI = 1 << 5;
        const RC_DATA = 1 << 6;
        const RC_COMMAND = 1 << 7;
        const MOTORS = 1 << 8;
        const GYRO_RAW = 1 << 9;
        const PEAKS_R = 1 << 10;
        const PEAKS_P = 1 << 11;
        const PEAKS_Y = 1 << 12;
        const SERVOS = 1 << 13;
    }
}

impl IncludeFlags {
    /// Look up a single flag by its configuration name (case-insensitive).
    pub fn from_config_name(name: &str) -> Option<IncludeFlags> {
        Self::from_name(&name.to_ascii_uppercase())
    }

    /// Build a set from configuration names.
    ///
    /// # Errors
    ///
    /// Returns the first name that is not a known flag.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> std::result::Result<Self, String> {
        names.iter().try_fold(IncludeFlags::empty(), |acc, name| {
            Self::from_config_name(name.as_ref())
                .map(|flag| acc | flag)
                .ok_or_else(|| name.as_ref().to_string())
        })
    }
}

impl Default for IncludeFlags {
    /// Everything except raw gyro, gyro peaks and navigation acceleration
    fn default() -> Self {
        Self::NAV_PID
            | Self::NAV_POS
            | Self::MAG
            | Self::ACC
            | Self::ATTI
            | Self::RC_DATA
            | Self::RC_COMMAND
            | Self::MOTORS
            | Self::SERVOS
    }
}

const CONDITION_WORDS: usize = (Condition::COUNT as usize).div_ceil(64);

const _: () = assert!(Condition::Never.id() + 1 == Condition::COUNT);
const _: () = assert!(CONDITION_WORDS * 64 >= Condition::COUNT as usize);

/// Frozen per-session answers for every [`Condition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionCache {
    bits: [u64; CONDITION_WORDS],
}

impl ConditionCache {
    /// Evaluate every condition once.
    pub fn build(env: &FlightEnvironment, include: IncludeFlags, rate: LogRate) -> Self {
        let mut cache = Self::empty();
        for id in 0..Condition::COUNT {
            if let Some(condition) = Condition::from_id(id) {
                if condition.evaluate(env, include, rate) {
                    cache.bits[(id / 64) as usize] |= 1u64 << (id % 64);
                }
            }
        }
        cache
    }

    /// A cache in which every condition is false
    pub const fn empty() -> Self {
        Self { bits: [0; CONDITION_WORDS] }
    }

    /// O(1) lookup of a cached condition
    pub fn test(&self, condition: Condition) -> bool {
        self.test_id(condition.id())
    }

    /// Lookup by numeric id; ids outside the known range are false.
    pub fn test_id(&self, id: u32) -> bool {
        if id >= Condition::COUNT {
            return false;
        }
        self.bits[(id / 64) as usize] & (1u64 << (id % 64)) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(num: u16, denom: u16) -> LogRate {
        LogRate::new(num, denom, 1000)
    }

    #[test]
    fn test_ids_are_dense_and_round_trip() {
        for id in 0..Condition::COUNT {
            let condition = Condition::from_id(id)
                .unwrap_or_else(|| panic!("id {} has no condition", id));
            assert_eq!(condition.id(), id, "{:?}", condition);
        }
        assert_eq!(Condition::from_id(Condition::COUNT), None);
        assert_eq!(Condition::COUNT, 62);
    }

    #[test]
    fn test_unknown_id_is_false() {
        let env = FlightEnvironment::default();
        let cache = ConditionCache::build(&env, IncludeFlags::default(), rate(1, 1));
        assert!(cache.test_id(0), "Always must be set");
        assert!(!cache.test_id(Condition::COUNT));
        assert!(!cache.test_id(u32::MAX));
        assert!(!cache.test(Condition::Never));
    }

    #[test]
    fn test_motor_conditions_follow_count() {
        let env = FlightEnvironment { motor_count: 4, ..FlightEnvironment::default() };
        let cache = ConditionCache::build(&env, IncludeFlags::default(), rate(1, 1));

        assert!(cache.test(Condition::AtLeastMotors(1)));
        assert!(cache.test(Condition::AtLeastMotors(4)));
        assert!(!cache.test(Condition::AtLeastMotors(5)));
    }

    #[test]
    fn test_motors_excluded_by_flags() {
        let env = FlightEnvironment { motor_count: 4, ..FlightEnvironment::default() };
        let cache = ConditionCache::build(&env, IncludeFlags::ACC, rate(1, 1));

        assert!(!cache.test(Condition::Motors));
        assert!(!cache.test(Condition::AtLeastMotors(1)));
        assert!(cache.test(Condition::Acc));
    }

    #[test]
    fn test_servo_conditions_need_servo_mixer() {
        let mut env = FlightEnvironment { servo_count: 2, ..FlightEnvironment::default() };
        env.mixer_uses_servos = false;
        let cache = ConditionCache::build(&env, IncludeFlags::default(), rate(1, 1));
        assert!(!cache.test(Condition::AtLeastServos(1)));

        env.mixer_uses_servos = true;
        let cache = ConditionCache::build(&env, IncludeFlags::default(), rate(1, 1));
        assert!(cache.test(Condition::Servos));
        assert!(cache.test(Condition::AtLeastServos(2)));
        assert!(!cache.test(Condition::AtLeastServos(3)));
    }

    #[test]
    fn test_nav_pid_split_by_airframe() {
        let mut env = FlightEnvironment::default();
        env.fixed_wing = true;
        let cache = ConditionCache::build(&env, IncludeFlags::default(), rate(1, 1));
        assert!(cache.test(Condition::FixedWingNav));
        assert!(!cache.test(Condition::McNav));

        env.fixed_wing = false;
        let cache = ConditionCache::build(&env, IncludeFlags::default(), rate(1, 1));
        assert!(!cache.test(Condition::FixedWingNav));
        assert!(cache.test(Condition::McNav));
    }

    #[test]
    fn test_nonzero_pid_d() {
        let mut env = FlightEnvironment::default();
        env.pid.roll.d = 20;
        env.pid.pitch.d = 0;
        env.pid.yaw.d = 5;
        let cache = ConditionCache::build(&env, IncludeFlags::default(), rate(1, 1));
        assert!(cache.test(Condition::NonzeroPidD(0)));
        assert!(!cache.test(Condition::NonzeroPidD(1)));
        assert!(cache.test(Condition::NonzeroPidD(2)));
    }

    #[test]
    fn test_not_logging_every_frame() {
        let env = FlightEnvironment::default();
        let every = ConditionCache::build(&env, IncludeFlags::default(), rate(1, 1));
        let half = ConditionCache::build(&env, IncludeFlags::default(), rate(1, 2));
        assert!(!every.test(Condition::NotLoggingEveryFrame));
        assert!(half.test(Condition::NotLoggingEveryFrame));
    }

    #[test]
    fn test_amperage_needs_adc_sensor() {
        let mut env = FlightEnvironment::default();
        env.features.current_meter = true;
        env.battery.current_sensor_adc = false;
        let cache = ConditionCache::build(&env, IncludeFlags::default(), rate(1, 1));
        assert!(!cache.test(Condition::Amperage));

        env.battery.current_sensor_adc = true;
        let cache = ConditionCache::build(&env, IncludeFlags::default(), rate(1, 1));
        assert!(cache.test(Condition::Amperage));
    }

    #[test]
    fn test_include_flag_names() {
        assert_eq!(IncludeFlags::from_config_name("ATTI"), Some(IncludeFlags::ATTI));
        assert_eq!(IncludeFlags::from_config_name("peaks_y"), Some(IncludeFlags::PEAKS_Y));
        assert_eq!(IncludeFlags::from_config_name("BOGUS"), None);

        let flags = IncludeFlags::from_names(&["MOTORS", "RC_DATA"]).unwrap();
        assert!(flags.contains(IncludeFlags::MOTORS));
        assert!(flags.contains(IncludeFlags::RC_DATA));
        assert!(!flags.contains(IncludeFlags::SERVOS));

        assert_eq!(IncludeFlags::from_names(&["MOTORS", "NOPE"]), Err("NOPE".to_string()));
    }

    #[test]
    fn test_default_include_flags() {
        let flags = IncludeFlags::default();
        assert!(flags.contains(IncludeFlags::NAV_PID));
        assert!(flags.contains(IncludeFlags::SERVOS));
        assert!(!flags.contains(IncludeFlags::NAV_ACC));
        assert!(!flags.contains(IncludeFlags::GYRO_RAW));
        assert!(!flags.contains(IncludeFlags::PEAKS_R));
    }

    #[test]
    fn test_include_flags_debug_lists_names() {
        let text = format!("{:?}", IncludeFlags::MOTORS | IncludeFlags::ATTI);
        assert!(text.contains("MOTORS"), "{}", text);
        assert!(text.contains("ATTI"), "{}", text);
    }
}
