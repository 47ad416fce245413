//! # Logging Session
//!
//! The [`Blackbox`] context drives one log from device open to close.
//!
//! ## State Machine
//!
//! ```text
//! Disabled   Stopped -> PrepareLogFile -> SendHeader -> SendMainFieldHeader
//!                ^                                           |
//!                |        [SendGpsHHeader -> SendGpsGHeader] <-+
//!                |                      |
//!                |     SendSlowHeader <-+
//!                |           |
//!                |     SendSysinfo -> Running <-> Paused
//!                |                         |        |
//!                +------- ShuttingDown <---+--------+
//! ```
//!
//! Call [`Blackbox::update`] once per control-loop iteration. No call ever
//! blocks: header text goes out under a byte budget, and a data frame that
//! does not fit in the device buffer is dropped whole.

use bytes::BytesMut;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::device::{LogDevice, Reservation};
use crate::flight::{FlightDataSource, FlightEnvironment};

use super::conditions::{ConditionCache, IncludeFlags};
use super::events::{encode_event, FlightLogEvent};
use super::fielddefs::{FieldDef, FrameKind};
use super::fields::{GPS_FIELDS, GPS_HOME_FIELDS, MAIN_FIELDS, SLOW_FIELDS};
use super::frames::{
    encode_gps_frame, encode_gps_home_frame, encode_inter_frame, encode_intra_frame,
    encode_slow_frame,
};
use super::header::{
    send_field_definitions, sysinfo_lines, FieldProgress, HeaderBudget, HeaderStep,
    HEADER_START_DELAY_MS, HEADER_TEXT, SYSINFO_LINE_RESERVE, TARGET_HEADER_BUDGET_PER_ITERATION,
};
use super::history::HistoryRing;
use super::predictor::PredictorConstants;
use super::rate::{IterationTimers, LogRate};
use super::state::{GpsFrameSample, GpsHistory, MainState, SlowState};

/// Time allowed for the device to drain after the log ends
pub const SHUTDOWN_TIMEOUT_MS: u64 = 200;

/// GPS home is re-announced every this many intra-frame cycles
pub const GPS_HOME_REANNOUNCE_CYCLES: u32 = 128;

const FRAME_SCRATCH_CAPACITY: usize = 512;

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlackboxState {
    /// The log device could not be used
    Disabled,
    Stopped,
    PrepareLogFile,
    SendHeader,
    SendMainFieldHeader,
    SendGpsHHeader,
    SendGpsGHeader,
    SendSlowHeader,
    SendSysinfo,
    Running,
    Paused,
    ShuttingDown,
}

impl BlackboxState {
    /// States that transmit the header under the byte budget
    pub fn is_header(self) -> bool {
        matches!(
            self,
            BlackboxState::PrepareLogFile
                | BlackboxState::SendHeader
                | BlackboxState::SendMainFieldHeader
                | BlackboxState::SendGpsHHeader
                | BlackboxState::SendGpsGHeader
                | BlackboxState::SendSlowHeader
                | BlackboxState::SendSysinfo
        )
    }

    /// A log is in progress and the device is open
    pub fn is_active(self) -> bool {
        !matches!(self, BlackboxState::Disabled | BlackboxState::Stopped)
    }
}

/// Transmission progress of the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XmitState {
    Idle,
    Text { start_ms: u64, pos: usize },
    Fields(FieldProgress),
    Sysinfo { line: usize },
    Shutdown { start_ms: u64 },
}

/// User-facing logging settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlackboxSettings {
    /// Log `rate_num` out of every `rate_denom` iterations
    pub rate_num: u16,
    pub rate_denom: u16,
    /// Optional field groups
    pub include: IncludeFlags,
}

impl Default for BlackboxSettings {
    fn default() -> Self {
        Self {
            rate_num: 1,
            rate_denom: 1,
            include: IncludeFlags::default(),
        }
    }
}

/// Frame and byte counters for the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub intra_frames: u64,
    pub inter_frames: u64,
    pub slow_frames: u64,
    pub gps_home_frames: u64,
    pub gps_frames: u64,
    pub events: u64,
    /// Frames dropped because the device had no room
    pub dropped_frames: u64,
    /// Data frame and event bytes (the header is not counted)
    pub bytes_written: u64,
}

/// The blackbox recorder.
///
/// Owns the log device and all session state. Configuration is frozen while
/// a log is active; see [`Blackbox::may_edit_config`].
///
/// # Examples
///
/// ```
/// use blackbox_logger::blackbox::{Blackbox, BlackboxSettings, BlackboxState};
/// use blackbox_logger::device::MemoryDevice;
/// use blackbox_logger::flight::{FlightEnvironment, SimulatedFlight};
///
/// let env = FlightEnvironment::default();
/// let mut flight = SimulatedFlight::new(&env);
/// let mut blackbox = Blackbox::new(MemoryDevice::new(4096), BlackboxSettings::default(), env);
///
/// blackbox.start(&flight);
/// for tick in 0..2000u64 {
///     flight.step(tick * 1000);
///     blackbox.update(tick * 1000, &flight);
/// }
/// assert_eq!(blackbox.state(), BlackboxState::Running);
/// ```
#[derive(Debug)]
pub struct Blackbox<D: LogDevice> {
    device: D,
    settings: BlackboxSettings,
    env: FlightEnvironment,
    state: BlackboxState,
    xmit: XmitState,
    rate: LogRate,
    timers: IterationTimers,
    cache: ConditionCache,
    history: HistoryRing<MainState>,
    /// An intra frame has reached the log, so inter frames have a baseline
    primed: bool,
    slow_history: SlowState,
    gps_history: GpsHistory,
    vbat_reference: u16,
    mode_activation_present: bool,
    last_arming_beep: u32,
    last_rc_mode_flags: u32,
    logged_any_frames: bool,
    budget: HeaderBudget,
    scratch: BytesMut,
    sysinfo: Vec<String>,
    last_update_ms: u64,
    stats: SessionStats,
}

impl<D: LogDevice> Blackbox<D> {
    pub fn new(device: D, settings: BlackboxSettings, env: FlightEnvironment) -> Self {
        Self {
            device,
            settings,
            env,
            state: BlackboxState::Stopped,
            xmit: XmitState::Idle,
            rate: LogRate::default(),
            timers: IterationTimers::default(),
            cache: ConditionCache::empty(),
            history: HistoryRing::new(),
            primed: false,
            slow_history: SlowState::default(),
            gps_history: GpsHistory::default(),
            vbat_reference: 0,
            mode_activation_present: false,
            last_arming_beep: 0,
            last_rc_mode_flags: 0,
            logged_any_frames: false,
            budget: HeaderBudget::default(),
            scratch: BytesMut::with_capacity(FRAME_SCRATCH_CAPACITY),
            sysinfo: Vec::new(),
            last_update_ms: 0,
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> BlackboxState {
        self.state
    }

    /// Settings and environment may only change while no log is active.
    pub fn may_edit_config(&self) -> bool {
        !self.state.is_active()
    }

    /// Replace settings and environment; refused while a log is active.
    pub fn configure(&mut self, settings: BlackboxSettings, env: FlightEnvironment) -> bool {
        if !self.may_edit_config() {
            return false;
        }
        self.settings = settings;
        self.env = env;
        true
    }

    pub fn settings(&self) -> &BlackboxSettings {
        &self.settings
    }

    /// Rate in effect for the current (or last) session
    pub fn rate(&self) -> LogRate {
        self.rate
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Begin a new log. Ignored unless the recorder is stopped.
    pub fn start(&mut self, source: &dyn FlightDataSource) {
        if self.state != BlackboxState::Stopped {
            debug!("Ignoring start request in state {:?}", self.state);
            return;
        }

        self.rate = LogRate::new(self.settings.rate_num, self.settings.rate_denom, self.env.looptime_us);

        if let Err(e) = self.device.open() {
            warn!("Blackbox device failed to open: {}", e);
            self.set_state(BlackboxState::Disabled);
            return;
        }

        self.gps_history = GpsHistory::default();
        self.slow_history = SlowState::default();
        self.history.reset();
        self.primed = false;
        self.vbat_reference = source.vbat();
        self.cache = ConditionCache::build(&self.env, self.settings.include, self.rate);
        self.mode_activation_present = self.env.mode_activation_configured;
        self.timers.reset();
        self.last_arming_beep = source.arming_beep_time_us();
        self.last_rc_mode_flags = source.rc_mode_flags();
        self.stats = SessionStats::default();

        info!(
            "Blackbox starting: P interval {}/{}, I interval {}",
            self.rate.num(),
            self.rate.denom(),
            self.rate.intra_interval()
        );
        self.set_state(BlackboxState::PrepareLogFile);
    }

    /// End the current log.
    ///
    /// A running log gets a `LogEnd` event first. The device is closed once
    /// shutdown completes in a later [`Blackbox::update`].
    pub fn finish(&mut self, source: &dyn FlightDataSource) {
        match self.state {
            BlackboxState::Disabled | BlackboxState::Stopped | BlackboxState::ShuttingDown => {}
            BlackboxState::Running | BlackboxState::Paused => {
                self.log_event(FlightLogEvent::LogEnd { disarm_reason: source.disarm_reason() });
                self.set_state(BlackboxState::ShuttingDown);
            }
            _ => self.set_state(BlackboxState::ShuttingDown),
        }
    }

    /// Write an event frame. Returns `false` if it was not logged.
    ///
    /// Events are only accepted while running or paused.
    pub fn log_event(&mut self, event: FlightLogEvent) -> bool {
        if !matches!(self.state, BlackboxState::Running | BlackboxState::Paused) {
            return false;
        }

        self.scratch.clear();
        encode_event(&mut self.scratch, &event);
        self.commit_frame(FrameKind::Event)
    }

    /// Run one control-loop iteration.
    ///
    /// # Arguments
    ///
    /// * `now_us` - Monotonic time in microseconds
    /// * `source` - Live flight data for this iteration
    pub fn update(&mut self, now_us: u64, source: &dyn FlightDataSource) {
        let now_ms = now_us / 1000;
        self.last_update_ms = now_ms;

        if self.state.is_header() {
            self.budget.replenish(self.device.bytes_free(), self.device.max_header_bytes_per_iteration());
        }

        match self.state {
            BlackboxState::Disabled | BlackboxState::Stopped => return,
            BlackboxState::PrepareLogFile => match self.device.begin_log() {
                Ok(true) => self.set_state(BlackboxState::SendHeader),
                Ok(false) => {}
                Err(e) => {
                    warn!("Blackbox device could not begin a log: {}", e);
                    self.device.close();
                    self.set_state(BlackboxState::Disabled);
                    return;
                }
            },
            BlackboxState::SendHeader
            | BlackboxState::SendMainFieldHeader
            | BlackboxState::SendGpsHHeader
            | BlackboxState::SendGpsGHeader
            | BlackboxState::SendSlowHeader
            | BlackboxState::SendSysinfo => {
                self.transmit_header(now_ms);
                // Devices without a background transmitter drain only here
                // while the header is going out
                if self.state.is_header() {
                    self.device.flush();
                }
            }
            BlackboxState::Paused => {
                if source.logging_switch_active() && self.timers.intra_due() {
                    self.log_event(FlightLogEvent::LoggingResume {
                        iteration: self.timers.iteration,
                        time_us: now_us as u32,
                    });
                    self.set_state(BlackboxState::Running);
                    self.log_iteration(now_us, source);
                }
                self.timers.advance(self.rate.intra_interval());
            }
            BlackboxState::Running => {
                if self.mode_activation_present && !source.logging_switch_active() {
                    self.set_state(BlackboxState::Paused);
                } else {
                    self.log_iteration(now_us, source);
                }
                self.timers.advance(self.rate.intra_interval());
            }
            BlackboxState::ShuttingDown => {
                let start_ms = match self.xmit {
                    XmitState::Shutdown { start_ms } => start_ms,
                    _ => now_ms,
                };
                if self.device.end_log(self.logged_any_frames)
                    && (now_ms > start_ms + SHUTDOWN_TIMEOUT_MS || self.device.flush_force())
                {
                    self.device.close();
                    self.set_state(BlackboxState::Stopped);
                    info!("Blackbox stopped: {:?}", self.stats);
                }
            }
        }

        if self.state.is_active() {
            if self.device.is_full() {
                warn!("Blackbox device full, stopping log");
                self.device.close();
                self.set_state(BlackboxState::Stopped);
            }
        }
    }

    fn set_state(&mut self, next: BlackboxState) {
        match next {
            BlackboxState::PrepareLogFile => self.logged_any_frames = false,
            BlackboxState::SendHeader => {
                self.budget.reset();
                self.xmit = XmitState::Text { start_ms: self.last_update_ms, pos: 0 };
            }
            BlackboxState::SendMainFieldHeader
            | BlackboxState::SendGpsHHeader
            | BlackboxState::SendGpsGHeader
            | BlackboxState::SendSlowHeader => self.xmit = XmitState::Fields(FieldProgress::default()),
            BlackboxState::SendSysinfo => {
                self.sysinfo = sysinfo_lines(&self.env, self.rate, self.vbat_reference, &self.cache);
                self.xmit = XmitState::Sysinfo { line: 0 };
            }
            BlackboxState::Running => {
                self.timers.force_slow_frame();
                self.xmit = XmitState::Idle;
            }
            BlackboxState::ShuttingDown => {
                self.xmit = XmitState::Shutdown { start_ms: self.last_update_ms };
            }
            BlackboxState::Disabled | BlackboxState::Stopped | BlackboxState::Paused => {
                self.xmit = XmitState::Idle;
            }
        }

        debug!("Blackbox state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Give up on a header the device can never accept.
    fn abort(&mut self) {
        warn!("Blackbox device cannot hold the header in state {:?}, aborting log", self.state);
        self.device.close();
        self.set_state(BlackboxState::Stopped);
    }

    fn transmit_header(&mut self, now_ms: u64) {
        let (step, next) = match self.state {
            BlackboxState::SendHeader => (self.send_header_text(now_ms), BlackboxState::SendMainFieldHeader),
            BlackboxState::SendMainFieldHeader => {
                let next = if self.env.features.gps {
                    BlackboxState::SendGpsHHeader
                } else {
                    BlackboxState::SendSlowHeader
                };
                (self.send_fields(b'I', b'P', &MAIN_FIELDS), next)
            }
            BlackboxState::SendGpsHHeader => {
                (self.send_fields(b'H', b'H', &GPS_HOME_FIELDS), BlackboxState::SendGpsGHeader)
            }
            BlackboxState::SendGpsGHeader => {
                (self.send_fields(b'G', b'G', &GPS_FIELDS), BlackboxState::SendSlowHeader)
            }
            BlackboxState::SendSlowHeader => {
                (self.send_fields(b'S', b'S', &SLOW_FIELDS), BlackboxState::SendSysinfo)
            }
            BlackboxState::SendSysinfo => {
                let step = match self.send_sysinfo_line() {
                    HeaderStep::Done if !self.device.flush_force() => HeaderStep::Pending,
                    step => step,
                };
                (step, BlackboxState::Running)
            }
            _ => return,
        };

        match step {
            HeaderStep::Pending => {}
            HeaderStep::Done => {
                if next == BlackboxState::Running {
                    info!("Blackbox header complete, logging");
                }
                self.set_state(next);
            }
            HeaderStep::Aborted => self.abort(),
        }
    }

    fn send_fields<V, const N: usize>(
        &mut self,
        frame_char: u8,
        delta_char: u8,
        fields: &[FieldDef<V, N>],
    ) -> HeaderStep {
        let XmitState::Fields(progress) = &mut self.xmit else {
            return HeaderStep::Pending;
        };
        send_field_definitions(&mut self.device, &mut self.budget, progress, frame_char, delta_char, fields, &self.cache)
    }

    /// Product text, then the intra interval line.
    fn send_header_text(&mut self, now_ms: u64) -> HeaderStep {
        let XmitState::Text { start_ms, pos } = &mut self.xmit else {
            return HeaderStep::Pending;
        };
        if now_ms <= *start_ms + HEADER_START_DELAY_MS {
            return HeaderStep::Pending;
        }

        let text = HEADER_TEXT.as_bytes();
        if *pos < text.len() {
            match self.budget.reserve(&mut self.device, TARGET_HEADER_BUDGET_PER_ITERATION) {
                Reservation::Granted => {}
                Reservation::Deferred => return HeaderStep::Pending,
                Reservation::Impossible => return HeaderStep::Aborted,
            }
            let end = text.len().min(*pos + TARGET_HEADER_BUDGET_PER_ITERATION);
            self.device.write(&text[*pos..end]);
            self.budget.spend(end - *pos);
            *pos = end;
            if *pos < text.len() {
                return HeaderStep::Pending;
            }
        }

        let interval = format!("H I interval:{}\n", self.rate.intra_interval());
        match self.budget.reserve(&mut self.device, interval.len()) {
            Reservation::Granted => {
                self.device.write(interval.as_bytes());
                self.budget.spend(interval.len());
                HeaderStep::Done
            }
            Reservation::Deferred => HeaderStep::Pending,
            Reservation::Impossible => HeaderStep::Aborted,
        }
    }

    /// One system information line per call.
    fn send_sysinfo_line(&mut self) -> HeaderStep {
        let XmitState::Sysinfo { line } = &mut self.xmit else {
            return HeaderStep::Pending;
        };
        let text = self.sysinfo.get(*line);
        let reserve = text.map(|t| t.len()).unwrap_or(0).max(SYSINFO_LINE_RESERVE);

        match self.budget.reserve(&mut self.device, reserve) {
            Reservation::Granted => {}
            Reservation::Deferred => return HeaderStep::Pending,
            Reservation::Impossible => return HeaderStep::Aborted,
        }

        let Some(text) = text else {
            return HeaderStep::Done;
        };
        self.device.write(text.as_bytes());
        self.budget.spend(text.len());
        *line += 1;
        HeaderStep::Pending
    }

    /// Write the scratch buffer as one frame if the device has room.
    fn commit_frame(&mut self, kind: FrameKind) -> bool {
        let len = self.scratch.len();
        if self.device.reserve_buffer_space(len) != Reservation::Granted {
            self.stats.dropped_frames += 1;
            debug!("Dropped {:?} frame ({} bytes), device busy", kind, len);
            return false;
        }

        self.device.write(&self.scratch);
        self.stats.bytes_written += len as u64;
        let counter = match kind {
            FrameKind::Intra => &mut self.stats.intra_frames,
            FrameKind::Inter => &mut self.stats.inter_frames,
            FrameKind::Slow => &mut self.stats.slow_frames,
            FrameKind::GpsHome => &mut self.stats.gps_home_frames,
            FrameKind::Gps => &mut self.stats.gps_frames,
            FrameKind::Event => &mut self.stats.events,
        };
        *counter += 1;
        trace!("Wrote {:?} frame ({} bytes)", kind, len);
        true
    }

    fn predictor_constants(&self) -> PredictorConstants {
        PredictorConstants {
            min_throttle: self.env.min_throttle,
            vbat_reference: self.vbat_reference,
            home: self.gps_history.home,
            last_main_frame_time: self.history.generation(1).time_us,
        }
    }

    fn log_iteration(&mut self, now_us: u64, source: &dyn FlightDataSource) {
        if self.timers.intra_due() {
            self.write_slow_frame_if_needed(self.rate.only_logs_intra_frames(), source);
            self.load_main_state(now_us, source);
            self.write_intra_frame();
        } else {
            self.check_arming_beep(source);
            self.check_flight_mode(source);

            if self.rate.should_log_inter(self.timers.p_frame_index) {
                self.write_slow_frame_if_needed(true, source);
                self.load_main_state(now_us, source);
                self.write_inter_frame();
            }

            if self.env.features.gps {
                self.log_gps(now_us, source);
            }
        }

        self.device.flush();
    }

    fn load_main_state(&mut self, now_us: u64, source: &dyn FlightDataSource) {
        let state = self.history.current_mut();
        source.sample_main(state);
        state.iteration = self.timers.iteration;
        state.time_us = now_us as u32;
    }

    fn write_intra_frame(&mut self) {
        let constants = self.predictor_constants();
        self.scratch.clear();
        encode_intra_frame(&mut self.scratch, &self.cache, &self.history, &constants);

        if self.commit_frame(FrameKind::Intra) {
            self.history.rotate_after_intra();
            self.primed = true;
            self.logged_any_frames = true;
        }
    }

    fn write_inter_frame(&mut self) {
        // No intra frame to predict from yet
        if !self.primed {
            return;
        }

        let constants = self.predictor_constants();
        self.scratch.clear();
        encode_inter_frame(&mut self.scratch, &self.cache, &self.history, &constants);

        if self.commit_frame(FrameKind::Inter) {
            self.history.rotate_after_inter();
            self.logged_any_frames = true;
        }
    }

    /// Periodic slow frame, or one whenever the slow state changed.
    fn write_slow_frame_if_needed(&mut self, allow_periodic: bool, source: &dyn FlightDataSource) {
        let mut sample = self.slow_history.clone();
        source.sample_slow(&mut sample);

        let periodic = allow_periodic && self.timers.slow_frame_due();
        if !periodic && sample == self.slow_history {
            return;
        }

        self.scratch.clear();
        encode_slow_frame(&mut self.scratch, &self.cache, &sample);
        if self.commit_frame(FrameKind::Slow) {
            self.slow_history = sample;
            self.timers.slow_frame_timer = 0;
        }
    }

    fn check_arming_beep(&mut self, source: &dyn FlightDataSource) {
        let beep = source.arming_beep_time_us();
        if beep != self.last_arming_beep {
            self.last_arming_beep = beep;
            self.log_event(FlightLogEvent::SyncBeep { time_us: beep });
        }
    }

    fn check_flight_mode(&mut self, source: &dyn FlightDataSource) {
        let flags = source.rc_mode_flags();
        if flags != self.last_rc_mode_flags {
            let last_flags = self.last_rc_mode_flags;
            self.last_rc_mode_flags = flags;
            self.log_event(FlightLogEvent::FlightMode { flags, last_flags });
        }
    }

    fn log_gps(&mut self, now_us: u64, source: &dyn FlightDataSource) {
        let sample = GpsFrameSample {
            time_us: now_us as u32,
            solution: source.gps_solution(),
            home: source.gps_home(),
        };

        let reannounce = self.timers.p_frame_index == self.rate.intra_interval() / 2
            && self.timers.i_frame_index % GPS_HOME_REANNOUNCE_CYCLES == 0;

        if sample.home != self.gps_history.home || reannounce {
            self.write_gps_home_frame(&sample);
            self.write_gps_frame(&sample);
        } else if sample.solution.num_sat != self.gps_history.num_sat
            || sample.solution.coord != self.gps_history.coord
        {
            self.write_gps_frame(&sample);
        }
    }

    fn write_gps_home_frame(&mut self, sample: &GpsFrameSample) {
        self.scratch.clear();
        encode_gps_home_frame(&mut self.scratch, &self.cache, sample);
        if self.commit_frame(FrameKind::GpsHome) {
            self.gps_history.home = sample.home;
        }
    }

    fn write_gps_frame(&mut self, sample: &GpsFrameSample) {
        let constants = self.predictor_constants();
        self.scratch.clear();
        encode_gps_frame(&mut self.scratch, &self.cache, sample, &constants);
        if self.commit_frame(FrameKind::Gps) {
            self.gps_history.num_sat = sample.solution.num_sat;
            self.gps_history.coord = sample.solution.coord;
        }
    }
}
