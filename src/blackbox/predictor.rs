//! # Predictor Engine
//!
//! Turns a raw field value into the residual that is actually encoded.
//!
//! All arithmetic runs in 64 bits and the residual is truncated to 32 bits
//! at the end, which matches the wrapping 32-bit arithmetic decoders use.

use super::fielddefs::Predictor;

/// Neutral servo position used by [`Predictor::Servo1500`]
pub const SERVO_CENTER: i64 = 1500;

/// Session constants some predictors use as their baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PredictorConstants {
    /// Throttle idle value
    pub min_throttle: u16,
    /// Battery voltage sampled when the session started
    pub vbat_reference: u16,
    /// Last GPS home written to the log
    pub home: [i32; 2],
    /// Time of the most recently written main frame
    pub last_main_frame_time: u32,
}

/// Per-field inputs to a prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PredictionInput {
    /// Same field one generation back, if the frame has history
    pub prev1: Option<i64>,
    /// Same field two generations back
    pub prev2: Option<i64>,
    /// `motor[0]` of the frame being written
    pub motor0: i64,
    /// Array index of the field, selects the home axis
    pub axis: usize,
}

impl PredictionInput {
    /// Input for frames written without history (intra, slow, GPS)
    pub fn without_history(axis: usize, motor0: i64) -> Self {
        Self { prev1: None, prev2: None, motor0, axis }
    }
}

/// Baseline the decoder will reconstruct before adding the residual.
///
/// Missing history counts as zero, so `Previous` in a slow frame writes the
/// value unchanged. `Average2` truncates toward zero.
///
/// # Examples
///
/// ```
/// use blackbox_logger::blackbox::fielddefs::Predictor;
/// use blackbox_logger::blackbox::predictor::{baseline, PredictionInput, PredictorConstants};
///
/// let input = PredictionInput { prev1: Some(8), prev2: Some(6), ..PredictionInput::default() };
/// assert_eq!(baseline(Predictor::Average2, &input, &PredictorConstants::default()), 7);
/// ```
pub fn baseline(predictor: Predictor, input: &PredictionInput, constants: &PredictorConstants) -> i64 {
    let prev1 = input.prev1.unwrap_or(0);
    let prev2 = input.prev2.or(input.prev1).unwrap_or(0);

    match predictor {
        Predictor::Zero => 0,
        Predictor::Previous => prev1,
        Predictor::StraightLine => 2 * prev1 - prev2,
        Predictor::Average2 => (prev1 + prev2) / 2,
        Predictor::MinThrottle => constants.min_throttle as i64,
        Predictor::Motor0 => input.motor0,
        Predictor::Inc => prev1 + 1,
        Predictor::HomeCoord => constants.home.get(input.axis).copied().unwrap_or(0) as i64,
        Predictor::Servo1500 => SERVO_CENTER,
        Predictor::VbatRef => constants.vbat_reference as i64,
        Predictor::LastMainFrameTime => constants.last_main_frame_time as i64,
    }
}

/// `value - baseline`, wrapped to 32 bits.
pub fn residual(
    value: i64,
    predictor: Predictor,
    input: &PredictionInput,
    constants: &PredictorConstants,
) -> i32 {
    value.wrapping_sub(baseline(predictor, input, constants)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(prev1: i64, prev2: i64) -> PredictionInput {
        PredictionInput { prev1: Some(prev1), prev2: Some(prev2), ..PredictionInput::default() }
    }

    #[test]
    fn test_average2_and_straight_line() {
        let constants = PredictorConstants::default();
        let input = history(8, 6);

        assert_eq!(residual(10, Predictor::Average2, &input, &constants), 3);
        assert_eq!(residual(10, Predictor::StraightLine, &input, &constants), 0);
        assert_eq!(residual(10, Predictor::Previous, &input, &constants), 2);
    }

    #[test]
    fn test_average2_truncates_toward_zero() {
        let constants = PredictorConstants::default();
        assert_eq!(baseline(Predictor::Average2, &history(-3, -4), &constants), -3);
        assert_eq!(baseline(Predictor::Average2, &history(3, 4), &constants), 3);
    }

    #[test]
    fn test_average2_does_not_overflow() {
        let constants = PredictorConstants::default();
        let input = history(i32::MAX as i64, i32::MAX as i64);
        assert_eq!(baseline(Predictor::Average2, &input, &constants), i32::MAX as i64);
    }

    #[test]
    fn test_time_wraps_like_u32() {
        let constants = PredictorConstants::default();
        let input = history(u32::MAX as i64 - 999, u32::MAX as i64 - 1999);
        // 1000us step straddling the u32 wrap
        let value = 0u32.wrapping_add(1) as i64;
        assert_eq!(residual(value, Predictor::StraightLine, &input, &constants), 1);
    }

    #[test]
    fn test_constant_predictors() {
        let constants = PredictorConstants {
            min_throttle: 1070,
            vbat_reference: 1680,
            home: [473_977_420, 85_455_940],
            last_main_frame_time: 5_000,
        };
        let none = PredictionInput::without_history(1, 1200);

        assert_eq!(residual(1100, Predictor::MinThrottle, &none, &constants), 30);
        assert_eq!(residual(1190, Predictor::Motor0, &none, &constants), -10);
        assert_eq!(residual(1500, Predictor::Servo1500, &none, &constants), 0);
        assert_eq!(residual(1660, Predictor::VbatRef, &none, &constants), -20);
        assert_eq!(residual(85_455_950, Predictor::HomeCoord, &none, &constants), 10);
        assert_eq!(residual(6_000, Predictor::LastMainFrameTime, &none, &constants), 1000);
    }

    #[test]
    fn test_previous_without_history_is_zero() {
        let constants = PredictorConstants::default();
        let none = PredictionInput::without_history(0, 0);
        assert_eq!(residual(42, Predictor::Previous, &none, &constants), 42);
    }
}
