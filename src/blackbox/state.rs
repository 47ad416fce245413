//! # State Snapshots
//!
//! Plain-data snapshots of everything a frame can log, and the typed keys
//! field tables use to address them.
//!
//! Producers fill a snapshot right before a frame is written; the frame
//! writers only ever read from it through [`MainState::value`],
//! [`SlowState::value`] and [`GpsFrameSample::value`].

/// Roll, pitch and yaw
pub const AXIS_COUNT: usize = 3;

/// Motor outputs addressable by the log
pub const MAX_SUPPORTED_MOTORS: usize = 8;

/// Servo outputs addressable by the log
pub const MAX_SUPPORTED_SERVOS: usize = 26;

/// Debug values per frame
pub const DEBUG_VALUE_COUNT: usize = 8;

/// Dynamic notch peaks tracked per axis
pub const GYRO_PEAK_COUNT: usize = 3;

/// Temperature sensor slots
pub const TEMPERATURE_SENSOR_COUNT: usize = 8;

/// One control-loop iteration worth of high-rate data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainState {
    pub iteration: u32,
    pub time_us: u32,

    pub axis_setpoint: [i32; AXIS_COUNT],
    pub axis_p: [i32; AXIS_COUNT],
    pub axis_i: [i32; AXIS_COUNT],
    pub axis_d: [i32; AXIS_COUNT],
    pub axis_f: [i32; AXIS_COUNT],

    /// Fixed-wing altitude controller P, I, D
    pub fw_alt_pid: [i32; 3],
    pub fw_alt_output: i32,
    /// Fixed-wing position controller P, I, D
    pub fw_pos_pid: [i32; 3],
    pub fw_pos_output: i32,

    pub mc_pos_axis_p: [i32; AXIS_COUNT],
    /// Multirotor velocity controller terms P, I, D, FF per axis
    pub mc_vel_axis_pid: [[i32; AXIS_COUNT]; 4],
    pub mc_vel_axis_output: [i32; AXIS_COUNT],
    /// Multirotor surface controller P, I, D
    pub mc_surface_pid: [i32; 3],
    pub mc_surface_output: i32,

    pub rc_data: [i16; 4],
    pub rc_command: [i16; 4],

    pub vbat: u16,
    pub amperage: i16,
    pub mag_adc: [i16; AXIS_COUNT],
    pub baro_alt: i32,
    pub air_speed: i32,
    pub surface_raw: i32,
    pub rssi: u16,

    pub gyro_adc: [i16; AXIS_COUNT],
    pub gyro_raw: [i16; AXIS_COUNT],
    pub gyro_peaks_roll: [i16; GYRO_PEAK_COUNT],
    pub gyro_peaks_pitch: [i16; GYRO_PEAK_COUNT],
    pub gyro_peaks_yaw: [i16; GYRO_PEAK_COUNT],
    pub acc_smooth: [i16; AXIS_COUNT],
    pub acc_vib: i16,
    pub attitude: [i16; AXIS_COUNT],
    pub debug: [i32; DEBUG_VALUE_COUNT],

    pub motor: [i16; MAX_SUPPORTED_MOTORS],
    pub servo: [i16; MAX_SUPPORTED_SERVOS],

    pub nav_state: i16,
    pub nav_flags: u16,
    pub nav_eph: u16,
    pub nav_epv: u16,
    pub nav_pos: [i32; AXIS_COUNT],
    pub nav_vel: [i16; AXIS_COUNT],
    pub nav_tgt_vel: [i16; AXIS_COUNT],
    pub nav_tgt_pos: [i32; AXIS_COUNT],
    pub nav_tgt_heading: i16,
    pub nav_surface: i32,
    pub nav_acc: [i16; AXIS_COUNT],
}

impl Default for MainState {
    fn default() -> Self {
        Self {
            iteration: 0,
            time_us: 0,
            axis_setpoint: [0; AXIS_COUNT],
            axis_p: [0; AXIS_COUNT],
            axis_i: [0; AXIS_COUNT],
            axis_d: [0; AXIS_COUNT],
            axis_f: [0; AXIS_COUNT],
            fw_alt_pid: [0; 3],
            fw_alt_output: 0,
            fw_pos_pid: [0; 3],
            fw_pos_output: 0,
            mc_pos_axis_p: [0; AXIS_COUNT],
            mc_vel_axis_pid: [[0; AXIS_COUNT]; 4],
            mc_vel_axis_output: [0; AXIS_COUNT],
            mc_surface_pid: [0; 3],
            mc_surface_output: 0,
            rc_data: [0; 4],
            rc_command: [0; 4],
            vbat: 0,
            amperage: 0,
            mag_adc: [0; AXIS_COUNT],
            baro_alt: 0,
            air_speed: 0,
            surface_raw: 0,
            rssi: 0,
            gyro_adc: [0; AXIS_COUNT],
            gyro_raw: [0; AXIS_COUNT],
            gyro_peaks_roll: [0; GYRO_PEAK_COUNT],
            gyro_peaks_pitch: [0; GYRO_PEAK_COUNT],
            gyro_peaks_yaw: [0; GYRO_PEAK_COUNT],
            acc_smooth: [0; AXIS_COUNT],
            acc_vib: 0,
            attitude: [0; AXIS_COUNT],
            debug: [0; DEBUG_VALUE_COUNT],
            motor: [0; MAX_SUPPORTED_MOTORS],
            servo: [0; MAX_SUPPORTED_SERVOS],
            nav_state: 0,
            nav_flags: 0,
            nav_eph: 0,
            nav_epv: 0,
            nav_pos: [0; AXIS_COUNT],
            nav_vel: [0; AXIS_COUNT],
            nav_tgt_vel: [0; AXIS_COUNT],
            nav_tgt_pos: [0; AXIS_COUNT],
            nav_tgt_heading: 0,
            nav_surface: 0,
            nav_acc: [0; AXIS_COUNT],
        }
    }
}

/// Key naming one member of [`MainState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainValue {
    Iteration,
    Time,
    AxisRate(usize),
    AxisP(usize),
    AxisI(usize),
    AxisD(usize),
    AxisF(usize),
    FwAltPid(usize),
    FwAltOutput,
    FwPosPid(usize),
    FwPosOutput,
    McPosAxisP(usize),
    /// `(term, axis)` with terms P, I, D, FF
    McVelAxisPid(usize, usize),
    McVelAxisOutput(usize),
    McSurfacePid(usize),
    McSurfaceOutput,
    RcData(usize),
    RcCommand(usize),
    Vbat,
    Amperage,
    MagAdc(usize),
    BaroAlt,
    AirSpeed,
    SurfaceRaw,
    Rssi,
    GyroAdc(usize),
    GyroRaw(usize),
    GyroPeakRoll(usize),
    GyroPeakPitch(usize),
    GyroPeakYaw(usize),
    AccSmooth(usize),
    AccVib,
    Attitude(usize),
    Debug(usize),
    Motor(usize),
    Servo(usize),
    NavState,
    NavFlags,
    NavEph,
    NavEpv,
    NavPos(usize),
    NavVel(usize),
    NavTgtVel(usize),
    NavTgtPos(usize),
    NavTgtHeading,
    NavSurface,
    NavAcc(usize),
}

impl MainState {
    /// Read a member widened to 64 bits so predictor arithmetic cannot overflow.
    pub fn value(&self, key: MainValue) -> i64 {
        match key {
            MainValue::Iteration => self.iteration as i64,
            MainValue::Time => self.time_us as i64,
            MainValue::AxisRate(i) => self.axis_setpoint[i] as i64,
            MainValue::AxisP(i) => self.axis_p[i] as i64,
            MainValue::AxisI(i) => self.axis_i[i] as i64,
            MainValue::AxisD(i) => self.axis_d[i] as i64,
            MainValue::AxisF(i) => self.axis_f[i] as i64,
            MainValue::FwAltPid(i) => self.fw_alt_pid[i] as i64,
            MainValue::FwAltOutput => self.fw_alt_output as i64,
            MainValue::FwPosPid(i) => self.fw_pos_pid[i] as i64,
            MainValue::FwPosOutput => self.fw_pos_output as i64,
            MainValue::McPosAxisP(i) => self.mc_pos_axis_p[i] as i64,
            MainValue::McVelAxisPid(term, axis) => self.mc_vel_axis_pid[term][axis] as i64,
            MainValue::McVelAxisOutput(i) => self.mc_vel_axis_output[i] as i64,
            MainValue::McSurfacePid(i) => self.mc_surface_pid[i] as i64,
            MainValue::McSurfaceOutput => self.mc_surface_output as i64,
            MainValue::RcData(i) => self.rc_data[i] as i64,
            MainValue::RcCommand(i) => self.rc_command[i] as i64,
            MainValue::Vbat => self.vbat as i64,
            MainValue::Amperage => self.amperage as i64,
            MainValue::MagAdc(i) => self.mag_adc[i] as i64,
            MainValue::BaroAlt => self.baro_alt as i64,
            MainValue::AirSpeed => self.air_speed as i64,
            MainValue::SurfaceRaw => self.surface_raw as i64,
            MainValue::Rssi => self.rssi as i64,
            MainValue::GyroAdc(i) => self.gyro_adc[i] as i64,
            MainValue::GyroRaw(i) => self.gyro_raw[i] as i64,
            MainValue::GyroPeakRoll(i) => self.gyro_peaks_roll[i] as i64,
            MainValue::GyroPeakPitch(i) => self.gyro_peaks_pitch[i] as i64,
            MainValue::GyroPeakYaw(i) => self.gyro_peaks_yaw[i] as i64,
            MainValue::AccSmooth(i) => self.acc_smooth[i] as i64,
            MainValue::AccVib => self.acc_vib as i64,
            MainValue::Attitude(i) => self.attitude[i] as i64,
            MainValue::Debug(i) => self.debug[i] as i64,
            MainValue::Motor(i) => self.motor[i] as i64,
            MainValue::Servo(i) => self.servo[i] as i64,
            MainValue::NavState => self.nav_state as i64,
            MainValue::NavFlags => self.nav_flags as i64,
            MainValue::NavEph => self.nav_eph as i64,
            MainValue::NavEpv => self.nav_epv as i64,
            MainValue::NavPos(i) => self.nav_pos[i] as i64,
            MainValue::NavVel(i) => self.nav_vel[i] as i64,
            MainValue::NavTgtVel(i) => self.nav_tgt_vel[i] as i64,
            MainValue::NavTgtPos(i) => self.nav_tgt_pos[i] as i64,
            MainValue::NavTgtHeading => self.nav_tgt_heading as i64,
            MainValue::NavSurface => self.nav_surface as i64,
            MainValue::NavAcc(i) => self.nav_acc[i] as i64,
        }
    }
}

/// Rarely changing flight-state data, logged only when it changes or
/// periodically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlowState {
    pub active_wp_number: u16,
    /// RC box-mode selections
    pub flight_mode_flags: u32,
    pub flight_mode_flags2: u32,
    /// Flight modes actually active
    pub active_flight_mode_flags: u32,
    pub state_flags: u32,
    pub failsafe_phase: u8,
    pub rx_signal_received: bool,
    pub rx_flight_channels_valid: bool,
    pub rx_update_rate: u16,
    pub hw_health_status: u32,
    pub power_supply_impedance: u16,
    pub sag_compensated_vbat: u16,
    pub wind: [i16; AXIS_COUNT],
    pub msp_override_flags: u32,
    pub imu_temperature: i16,
    pub baro_temperature: i16,
    pub temperatures: [i16; TEMPERATURE_SENSOR_COUNT],
    pub esc_rpm: u32,
    pub esc_temperature: i16,
}

/// Key naming one member of [`SlowState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlowValue {
    ActiveWpNumber,
    FlightModeFlags,
    FlightModeFlags2,
    ActiveFlightModeFlags,
    StateFlags,
    FailsafePhase,
    RxSignalReceived,
    RxFlightChannelsValid,
    RxUpdateRate,
    HwHealthStatus,
    PowerSupplyImpedance,
    SagCompensatedVbat,
    Wind(usize),
    MspOverrideFlags,
    ImuTemperature,
    BaroTemperature,
    Temperature(usize),
    EscRpm,
    EscTemperature,
}

impl SlowState {
    pub fn value(&self, key: SlowValue) -> i64 {
        match key {
            SlowValue::ActiveWpNumber => self.active_wp_number as i64,
            SlowValue::FlightModeFlags => self.flight_mode_flags as i64,
            SlowValue::FlightModeFlags2 => self.flight_mode_flags2 as i64,
            SlowValue::ActiveFlightModeFlags => self.active_flight_mode_flags as i64,
            SlowValue::StateFlags => self.state_flags as i64,
            SlowValue::FailsafePhase => self.failsafe_phase as i64,
            SlowValue::RxSignalReceived => self.rx_signal_received as i64,
            SlowValue::RxFlightChannelsValid => self.rx_flight_channels_valid as i64,
            SlowValue::RxUpdateRate => self.rx_update_rate as i64,
            SlowValue::HwHealthStatus => self.hw_health_status as i64,
            SlowValue::PowerSupplyImpedance => self.power_supply_impedance as i64,
            SlowValue::SagCompensatedVbat => self.sag_compensated_vbat as i64,
            SlowValue::Wind(i) => self.wind[i] as i64,
            SlowValue::MspOverrideFlags => self.msp_override_flags as i64,
            SlowValue::ImuTemperature => self.imu_temperature as i64,
            SlowValue::BaroTemperature => self.baro_temperature as i64,
            SlowValue::Temperature(i) => self.temperatures[i] as i64,
            SlowValue::EscRpm => self.esc_rpm as i64,
            SlowValue::EscTemperature => self.esc_temperature as i64,
        }
    }
}

/// Current GPS fix as reported by the receiver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpsSolution {
    pub fix_type: u8,
    pub num_sat: u8,
    /// Latitude, longitude in 1e-7 degrees
    pub coord: [i32; 2],
    /// Altitude in centimetres
    pub altitude_cm: i32,
    /// Ground speed in cm/s
    pub ground_speed: u16,
    /// Course over ground in decidegrees
    pub ground_course: u16,
    pub hdop: u16,
    pub eph: u16,
    pub epv: u16,
    /// North, east, down velocity in cm/s
    pub vel_ned: [i16; 3],
}

/// Last GPS values that reached the log; the baseline for GPS change
/// detection and the home-coordinate predictor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpsHistory {
    pub home: [i32; 2],
    pub num_sat: u8,
    pub coord: [i32; 2],
}

/// Everything a `G` or `H` frame reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpsFrameSample {
    pub time_us: u32,
    pub solution: GpsSolution,
    pub home: [i32; 2],
}

/// Key naming one member of a [`GpsFrameSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpsValue {
    Time,
    FixType,
    NumSat,
    Coord(usize),
    /// Altitude in whole metres
    Altitude,
    Speed,
    GroundCourse,
    Hdop,
    Eph,
    Epv,
    VelNed(usize),
    Home(usize),
}

impl GpsFrameSample {
    pub fn value(&self, key: GpsValue) -> i64 {
        let sol = &self.solution;
        match key {
            GpsValue::Time => self.time_us as i64,
            GpsValue::FixType => sol.fix_type as i64,
            GpsValue::NumSat => sol.num_sat as i64,
            GpsValue::Coord(i) => sol.coord[i] as i64,
            GpsValue::Altitude => (sol.altitude_cm / 100) as i64,
            GpsValue::Speed => sol.ground_speed as i64,
            GpsValue::GroundCourse => sol.ground_course as i64,
            GpsValue::Hdop => sol.hdop as i64,
            GpsValue::Eph => sol.eph as i64,
            GpsValue::Epv => sol.epv as i64,
            GpsValue::VelNed(i) => sol.vel_ned[i] as i64,
            GpsValue::Home(i) => self.home[i] as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_value_lookup() {
        let mut state = MainState::default();
        state.motor[3] = 1450;
        state.mc_vel_axis_pid[3][1] = -7;
        state.time_us = u32::MAX;

        assert_eq!(state.value(MainValue::Motor(3)), 1450);
        assert_eq!(state.value(MainValue::McVelAxisPid(3, 1)), -7);
        assert_eq!(state.value(MainValue::Time), u32::MAX as i64);
    }

    #[test]
    fn test_slow_state_equality_is_exact() {
        let a = SlowState::default();
        let mut b = SlowState::default();
        assert_eq!(a, b);
        b.temperatures[7] = 1;
        assert_ne!(a, b);
        assert_eq!(b.value(SlowValue::Temperature(7)), 1);
    }

    #[test]
    fn test_gps_altitude_in_metres() {
        let sample = GpsFrameSample {
            solution: GpsSolution { altitude_cm: 12_345, ..GpsSolution::default() },
            ..GpsFrameSample::default()
        };
        assert_eq!(sample.value(GpsValue::Altitude), 123);
    }
}
