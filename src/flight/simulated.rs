//! Deterministic synthetic flight used by the demo binary and tests.
//!
//! The craft hovers while slowly circling; every value is a pure function of
//! the simulation clock so repeated runs produce identical logs.

use std::f64::consts::TAU;

use crate::blackbox::state::{GpsSolution, MainState, SlowState, AXIS_COUNT};

use super::{FlightDataSource, FlightEnvironment};

/// One full circle of the simulated orbit
const ORBIT_PERIOD_US: f64 = 20_000_000.0;

/// Battery sag per second of flight, in 0.01 V
const VBAT_SAG_PER_S: u64 = 1;

/// Synthetic flight data source.
#[derive(Debug, Clone)]
pub struct SimulatedFlight {
    clock_us: u64,
    motor_count: usize,
    servo_count: usize,
    min_throttle: u16,
    start_vbat: u16,
    home: [i32; 2],
    logging_switch: bool,
    arming_beep_us: u32,
    mode_flags: u32,
}

impl SimulatedFlight {
    pub fn new(env: &FlightEnvironment) -> Self {
        Self {
            clock_us: 0,
            motor_count: env.motor_count as usize,
            servo_count: env.servo_count as usize,
            min_throttle: env.min_throttle,
            start_vbat: 1680,
            home: [473_977_420, 85_455_940],
            logging_switch: true,
            arming_beep_us: 0,
            mode_flags: 0,
        }
    }

    /// Advance the simulation clock.
    pub fn step(&mut self, now_us: u64) {
        self.clock_us = now_us;
    }

    pub fn set_logging_switch(&mut self, active: bool) {
        self.logging_switch = active;
    }

    /// Record an arming beep at the current clock.
    pub fn beep(&mut self) {
        self.arming_beep_us = self.clock_us as u32;
    }

    pub fn set_mode_flags(&mut self, flags: u32) {
        self.mode_flags = flags;
    }

    fn phase(&self) -> f64 {
        (self.clock_us as f64 % ORBIT_PERIOD_US) / ORBIT_PERIOD_US * TAU
    }

    fn wobble(&self, axis: usize, amplitude: f64) -> i32 {
        let t = self.clock_us as f64 / 1_000_000.0;
        let freq = 1.3 + axis as f64 * 0.7;
        (amplitude * (t * freq * TAU).sin()).round() as i32
    }
}

impl FlightDataSource for SimulatedFlight {
    fn sample_main(&self, state: &mut MainState) {
        let phase = self.phase();

        for axis in 0..AXIS_COUNT {
            let rate = self.wobble(axis, 40.0);
            state.axis_setpoint[axis] = rate;
            state.axis_p[axis] = rate / 2;
            state.axis_i[axis] = self.wobble(axis + 3, 6.0);
            state.axis_d[axis] = self.wobble(axis + 1, 12.0);
            state.axis_f[axis] = rate / 4;
            state.gyro_adc[axis] = (rate + self.wobble(axis + 5, 3.0)) as i16;
            state.gyro_raw[axis] = state.gyro_adc[axis];
            state.acc_smooth[axis] = if axis == 2 { 4096 } else { self.wobble(axis, 80.0) as i16 };
            state.attitude[axis] = self.wobble(axis + 2, 150.0) as i16;
            state.mag_adc[axis] = (300.0 * (phase + axis as f64).cos()) as i16;
        }

        state.rc_data = [1500, 1500, 1500, 1400];
        state.rc_command = [
            state.axis_setpoint[0] as i16,
            state.axis_setpoint[1] as i16,
            state.axis_setpoint[2] as i16,
            1400,
        ];

        let elapsed_s = self.clock_us / 1_000_000;
        state.vbat = self
            .start_vbat
            .saturating_sub((elapsed_s * VBAT_SAG_PER_S).min(u16::MAX as u64) as u16);
        state.amperage = 1200 + self.wobble(0, 50.0) as i16;
        state.baro_alt = 1500 + self.wobble(1, 20.0);
        state.rssi = 1000;

        let base = self.min_throttle as i32 + 330;
        for (i, motor) in state.motor.iter_mut().enumerate().take(self.motor_count) {
            *motor = (base + self.wobble(i, 25.0)) as i16;
        }
        for (i, servo) in state.servo.iter_mut().enumerate().take(self.servo_count) {
            *servo = (1500 + self.wobble(i, 200.0)) as i16;
        }

        let radius = 2000.0;
        state.nav_pos = [
            (radius * phase.cos()) as i32,
            (radius * phase.sin()) as i32,
            1500,
        ];
        state.nav_vel = [
            (-radius * TAU / 20.0 * phase.sin()) as i16,
            (radius * TAU / 20.0 * phase.cos()) as i16,
            0,
        ];
        state.nav_tgt_pos = state.nav_pos;
        state.nav_tgt_vel = state.nav_vel;
        state.nav_eph = 150;
        state.nav_epv = 250;
        state.nav_tgt_heading = ((phase.to_degrees() as i32 + 90) % 360) as i16;
        state.nav_state = 2;
    }

    fn sample_slow(&self, state: &mut SlowState) {
        state.flight_mode_flags = self.mode_flags;
        state.active_flight_mode_flags = self.mode_flags;
        state.state_flags = 1;
        state.rx_signal_received = true;
        state.rx_flight_channels_valid = true;
        state.rx_update_rate = 20_000;
        state.sag_compensated_vbat = self.start_vbat;
        // Steps once a minute so the slow frame changes occasionally
        state.imu_temperature = 350 + (self.clock_us / 60_000_000) as i16;
    }

    fn gps_solution(&self) -> GpsSolution {
        let phase = self.phase();
        // One GPS update every 200 ms
        let gps_step = (self.clock_us / 200_000) as f64;
        let offset = (gps_step * 0.1).sin() * 500.0;
        GpsSolution {
            fix_type: 2,
            num_sat: 14,
            coord: [
                self.home[0] + (offset * phase.cos()) as i32,
                self.home[1] + (offset * phase.sin()) as i32,
            ],
            altitude_cm: 51_200,
            ground_speed: 628,
            ground_course: ((phase.to_degrees() * 10.0) as u16) % 3600,
            hdop: 90,
            eph: 150,
            epv: 250,
            vel_ned: [0, 0, 0],
        }
    }

    fn gps_home(&self) -> [i32; 2] {
        self.home
    }

    fn vbat(&self) -> u16 {
        self.start_vbat
    }

    fn arming_beep_time_us(&self) -> u32 {
        self.arming_beep_us
    }

    fn rc_mode_flags(&self) -> u32 {
        self.mode_flags
    }

    fn logging_switch_active(&self) -> bool {
        self.logging_switch
    }

    fn disarm_reason(&self) -> u8 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_are_deterministic() {
        let env = FlightEnvironment::default();
        let mut a = SimulatedFlight::new(&env);
        let mut b = SimulatedFlight::new(&env);
        a.step(1_234_567);
        b.step(1_234_567);

        let mut sa = MainState::default();
        let mut sb = MainState::default();
        a.sample_main(&mut sa);
        b.sample_main(&mut sb);
        assert_eq!(sa, sb);
    }

    #[test]
    fn test_only_configured_motors_are_driven() {
        let env = FlightEnvironment { motor_count: 4, ..FlightEnvironment::default() };
        let sim = SimulatedFlight::new(&env);
        let mut state = MainState::default();
        sim.sample_main(&mut state);

        assert!(state.motor[..4].iter().all(|&m| m > env.min_throttle as i16));
        assert!(state.motor[4..].iter().all(|&m| m == 0));
    }

    #[test]
    fn test_switch_and_beep() {
        let mut sim = SimulatedFlight::new(&FlightEnvironment::default());
        assert!(sim.logging_switch_active());
        sim.set_logging_switch(false);
        assert!(!sim.logging_switch_active());

        sim.step(5_000);
        sim.beep();
        assert_eq!(sim.arming_beep_time_us(), 5_000);
    }
}
