//! # Iteration & Rate Control
//!
//! Decides, for every control-loop tick, which main frame (if any) is due.
//!
//! This module handles:
//! - Normalising the user's sampling fraction `num/denom`
//! - Deriving the intra-frame interval
//! - The inter-frame skip pattern
//! - The per-tick iteration counters

/// Iterations between periodic slow frames
pub const SLOW_FRAME_INTERVAL: u32 = 4096;

/// Intra-frame interval used for any denominator up to this value
pub const MIN_INTRA_INTERVAL: u32 = 32;

/// Normalised sampling fraction: log `num` out of every `denom` iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRate {
    num: u16,
    denom: u16,
    /// Capped but unreduced denominator; sets the intra-frame cadence
    interval_denom: u16,
}

impl LogRate {
    /// Build a rate from user settings.
    ///
    /// The denominator is first capped to `4096 * 1000 / looptime_us`. A zero
    /// numerator or denominator, or `num >= denom`, means "log everything"
    /// (`1/1`); any other fraction is reduced to lowest terms so the
    /// logged/skipped pattern repeats as often as possible. The intra-frame
    /// interval is taken from the capped denominator before reduction.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackbox_logger::blackbox::rate::LogRate;
    ///
    /// let rate = LogRate::new(2, 4, 1000);
    /// assert_eq!((rate.num(), rate.denom()), (1, 2));
    /// ```
    pub fn new(num: u16, denom: u16, looptime_us: u32) -> Self {
        let max_denom = (4096 * 1000 / looptime_us.max(1)).min(u16::MAX as u32) as u16;
        let denom = denom.min(max_denom);

        if num == 0 || denom == 0 || num >= denom {
            return Self { num: 1, denom: 1, interval_denom: denom };
        }

        let div = gcd(num, denom);
        Self {
            num: num / div,
            denom: denom / div,
            interval_denom: denom,
        }
    }

    pub fn num(&self) -> u16 {
        self.num
    }

    pub fn denom(&self) -> u16 {
        self.denom
    }

    /// Iterations between intra frames.
    ///
    /// 32 for configured denominators up to 32, otherwise the next power of
    /// two at or above the configured denominator.
    pub fn intra_interval(&self) -> u32 {
        let denom = u32::from(self.interval_denom);
        if denom <= MIN_INTRA_INTERVAL {
            MIN_INTRA_INTERVAL
        } else {
            denom.next_power_of_two()
        }
    }

    /// True when the skip pattern leaves nothing but intra frames
    pub fn only_logs_intra_frames(&self) -> bool {
        self.num == 1 && u32::from(self.denom) == self.intra_interval()
    }

    /// Whether the inter frame at cycle position `p_frame_index` is recorded.
    ///
    /// The `num - 1` offset spreads recorded frames evenly around the
    /// intra frame.
    pub fn should_log_inter(&self, p_frame_index: u32) -> bool {
        let num = u32::from(self.num);
        (p_frame_index + num - 1) % u32::from(self.denom) < num
    }
}

impl Default for LogRate {
    fn default() -> Self {
        Self { num: 1, denom: 1, interval_denom: 1 }
    }
}

fn gcd(mut a: u16, mut b: u16) -> u16 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Per-session iteration counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationTimers {
    /// Control-loop iterations since the session started
    pub iteration: u32,
    /// Position inside the current intra-frame cycle
    pub p_frame_index: u32,
    /// Number of completed intra-frame cycles
    pub i_frame_index: u32,
    /// Iterations since the last slow frame
    pub slow_frame_timer: u32,
}

impl IterationTimers {
    /// Zero the iteration and cycle counters; the slow timer is untouched.
    pub fn reset(&mut self) {
        self.iteration = 0;
        self.p_frame_index = 0;
        self.i_frame_index = 0;
    }

    /// An intra frame is due at the start of every cycle
    pub fn intra_due(&self) -> bool {
        self.p_frame_index == 0
    }

    /// Make the next slow-frame check write unconditionally
    pub fn force_slow_frame(&mut self) {
        self.slow_frame_timer = SLOW_FRAME_INTERVAL;
    }

    pub fn slow_frame_due(&self) -> bool {
        self.slow_frame_timer >= SLOW_FRAME_INTERVAL
    }

    /// Called once per tick after logging.
    pub fn advance(&mut self, intra_interval: u32) {
        self.slow_frame_timer = self.slow_frame_timer.wrapping_add(1);
        self.iteration = self.iteration.wrapping_add(1);
        self.p_frame_index += 1;

        if self.p_frame_index >= intra_interval {
            self.p_frame_index = 0;
            self.i_frame_index = self.i_frame_index.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_fractions_become_one_to_one() {
        for (num, denom) in [(0, 4), (3, 0), (4, 4), (5, 4)] {
            let rate = LogRate::new(num, denom, 1000);
            assert_eq!((rate.num(), rate.denom()), (1, 1), "{}/{}", num, denom);
            assert_eq!(rate.intra_interval(), 32);
        }
    }

    #[test]
    fn test_fraction_is_reduced() {
        let rate = LogRate::new(2, 4, 1000);
        assert_eq!((rate.num(), rate.denom()), (1, 2));

        let rate = LogRate::new(6, 9, 1000);
        assert_eq!((rate.num(), rate.denom()), (2, 3));
    }

    #[test]
    fn test_denominator_capped_by_looptime() {
        // 4096 * 1000 / 125000 = 32
        let rate = LogRate::new(1, 100, 125_000);
        assert_eq!(rate.denom(), 32);
    }

    #[test]
    fn test_intra_interval() {
        assert_eq!(LogRate::new(1, 1, 1000).intra_interval(), 32);
        assert_eq!(LogRate::new(1, 32, 1000).intra_interval(), 32);
        assert_eq!(LogRate::new(1, 33, 1000).intra_interval(), 64);
        assert_eq!(LogRate::new(1, 64, 1000).intra_interval(), 64);
        assert_eq!(LogRate::new(1, 100, 1000).intra_interval(), 128);
    }

    #[test]
    fn test_intra_interval_uses_unreduced_denominator() {
        let rate = LogRate::new(2, 64, 1000);
        assert_eq!((rate.num(), rate.denom()), (1, 32));
        assert_eq!(rate.intra_interval(), 64);
        assert!(!rate.only_logs_intra_frames());

        // One inter frame every 32 iterations between intra frames
        let logged: Vec<u32> = (1..64).filter(|&i| rate.should_log_inter(i)).collect();
        assert_eq!(logged, vec![32]);
    }

    #[test]
    fn test_intra_interval_after_looptime_cap() {
        // 4096 * 1000 / 50000 = 81, next power of two 128
        let rate = LogRate::new(1, 200, 50_000);
        assert_eq!(rate.denom(), 81);
        assert_eq!(rate.intra_interval(), 128);
    }

    #[test]
    fn test_only_intra_frames() {
        assert!(LogRate::new(1, 32, 1000).only_logs_intra_frames());
        assert!(LogRate::new(1, 64, 1000).only_logs_intra_frames());
        assert!(!LogRate::new(1, 2, 1000).only_logs_intra_frames());
        assert!(!LogRate::new(1, 33, 1000).only_logs_intra_frames());
    }

    #[test]
    fn test_every_frame_logged_at_full_rate() {
        let rate = LogRate::default();
        assert!((1..32).all(|i| rate.should_log_inter(i)));
    }

    #[test]
    fn test_quarter_rate_pattern() {
        let rate = LogRate::new(1, 4, 1000);
        let logged: Vec<u32> = (1..32).filter(|&i| rate.should_log_inter(i)).collect();
        assert_eq!(logged, vec![4, 8, 12, 16, 20, 24, 28]);
    }

    #[test]
    fn test_two_thirds_pattern_is_spread() {
        let rate = LogRate::new(2, 3, 1000);
        let logged: Vec<bool> = (0..6).map(|i| rate.should_log_inter(i)).collect();
        // (i + 1) % 3 < 2
        assert_eq!(logged, vec![true, false, true, true, false, true]);
    }

    #[test]
    fn test_quarter_rate_over_hundred_ticks() {
        let rate = LogRate::new(1, 4, 1000);
        let mut timers = IterationTimers::default();
        let mut inter = 0;
        let mut intra = 0;

        for _ in 0..100 {
            if timers.intra_due() {
                intra += 1;
            } else if rate.should_log_inter(timers.p_frame_index) {
                assert_eq!(timers.p_frame_index % 4, 0);
                inter += 1;
            }
            timers.advance(rate.intra_interval());
        }

        // Intra at 0, 32, 64, 96; seven inter frames per full cycle
        assert_eq!(intra, 4);
        assert_eq!(inter, 7 * 3);
    }

    #[test]
    fn test_advance_wraps_cycle() {
        let mut timers = IterationTimers::default();
        for _ in 0..32 {
            timers.advance(32);
        }
        assert_eq!(timers.iteration, 32);
        assert_eq!(timers.p_frame_index, 0);
        assert_eq!(timers.i_frame_index, 1);
        assert_eq!(timers.slow_frame_timer, 32);
        assert!(timers.intra_due());
    }

    #[test]
    fn test_slow_frame_timer() {
        let mut timers = IterationTimers::default();
        assert!(!timers.slow_frame_due());
        timers.force_slow_frame();
        assert!(timers.slow_frame_due());
        timers.reset();
        assert!(timers.slow_frame_due(), "reset keeps the slow timer");
    }
}
