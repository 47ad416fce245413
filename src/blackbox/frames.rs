//! # Frame Writers
//!
//! Table-driven encoders for `I`, `P`, `S`, `H` and `G` frames.
//!
//! Every writer walks a static field table through the session's
//! [`ConditionCache`], the same walk the header transmitter performs, so the
//! header and the data can never disagree about which fields exist.
//! Frames are encoded into a caller-owned buffer; the caller decides whether
//! the device has room for the whole frame.

use bytes::BufMut;

use super::conditions::ConditionCache;
use super::encoding::{
    write_neg_14bit, write_signed_vb, write_tag2_3s32, write_tag8_4s16, write_tag8_8svb,
    write_unsigned_vb,
};
use super::fielddefs::{Encoding, FieldDef, FrameKind, Predictor};
use super::fields::{GPS_FIELDS, GPS_HOME_FIELDS, MAIN_FIELDS, SLOW_FIELDS};
use super::history::HistoryRing;
use super::predictor::{residual, PredictionInput, PredictorConstants};
use super::state::{GpsFrameSample, MainState, MainValue, SlowState};

/// Coding row used for intra frames
const INTRA_ROW: usize = 0;
/// Coding row used for inter frames
const INTER_ROW: usize = 1;

/// Encode the included fields of `fields` using coding row `row`.
///
/// `residual_of` maps a field and its predictor to the residual to write.
/// Runs of consecutive included fields sharing a grouped encoding are packed
/// together; short TAG2_3S32 / TAG8_4S16 groups are padded with zeros.
fn write_fields<B, V, const N: usize, F>(
    buf: &mut B,
    fields: &[FieldDef<V, N>],
    row: usize,
    cache: &ConditionCache,
    mut residual_of: F,
) where
    B: BufMut,
    F: FnMut(&FieldDef<V, N>, Predictor) -> i32,
{
    let mut included = fields.iter().filter(|def| cache.test(def.condition)).peekable();

    while let Some(def) = included.next() {
        let coding = def.coding[row];
        let first = residual_of(def, coding.predictor);

        match coding.encoding {
            Encoding::Null => {}
            Encoding::SignedVb => write_signed_vb(buf, first),
            Encoding::UnsignedVb => write_unsigned_vb(buf, first as u32),
            Encoding::Neg14Bit => write_neg_14bit(buf, first),
            grouped => {
                let mut values = [0i32; 8];
                values[0] = first;
                let mut count = 1;
                while count < grouped.group_size() {
                    match included.next_if(|next| next.coding[row].encoding == grouped) {
                        Some(next) => {
                            values[count] = residual_of(next, next.coding[row].predictor);
                            count += 1;
                        }
                        None => break,
                    }
                }

                match grouped {
                    Encoding::Tag2_3S32 => write_tag2_3s32(buf, &[values[0], values[1], values[2]]),
                    Encoding::Tag8_4S16 => {
                        write_tag8_4s16(buf, &[values[0], values[1], values[2], values[3]])
                    }
                    _ => write_tag8_8svb(buf, &values[..count]),
                }
            }
        }
    }
}

fn motor0(state: &MainState) -> i64 {
    state.value(MainValue::Motor(0))
}

/// Encode an `I` frame from generation 0 of `history`.
pub fn encode_intra_frame<B: BufMut>(
    buf: &mut B,
    cache: &ConditionCache,
    history: &HistoryRing<MainState>,
    constants: &PredictorConstants,
) {
    let current = history.current();
    let input = PredictionInput::without_history(0, motor0(current));

    buf.put_u8(FrameKind::Intra.marker());
    write_fields(buf, &MAIN_FIELDS, INTRA_ROW, cache, |def, predictor| {
        residual(current.value(def.value), predictor, &input, constants)
    });
}

/// Encode a `P` frame predicting generation 0 from generations 1 and 2.
pub fn encode_inter_frame<B: BufMut>(
    buf: &mut B,
    cache: &ConditionCache,
    history: &HistoryRing<MainState>,
    constants: &PredictorConstants,
) {
    let current = history.generation(0);
    let prev1 = history.generation(1);
    let prev2 = history.generation(2);

    buf.put_u8(FrameKind::Inter.marker());
    write_fields(buf, &MAIN_FIELDS, INTER_ROW, cache, |def, predictor| {
        let input = PredictionInput {
            prev1: Some(prev1.value(def.value)),
            prev2: Some(prev2.value(def.value)),
            motor0: motor0(current),
            axis: 0,
        };
        residual(current.value(def.value), predictor, &input, constants)
    });
}

/// Encode an `S` frame. Slow frames carry no history.
pub fn encode_slow_frame<B: BufMut>(buf: &mut B, cache: &ConditionCache, state: &SlowState) {
    let constants = PredictorConstants::default();
    let input = PredictionInput::without_history(0, 0);

    buf.put_u8(FrameKind::Slow.marker());
    write_fields(buf, &SLOW_FIELDS, 0, cache, |def, predictor| {
        residual(state.value(def.value), predictor, &input, &constants)
    });
}

/// Encode an `H` frame carrying the home position.
pub fn encode_gps_home_frame<B: BufMut>(buf: &mut B, cache: &ConditionCache, sample: &GpsFrameSample) {
    let constants = PredictorConstants::default();
    let input = PredictionInput::without_history(0, 0);

    buf.put_u8(FrameKind::GpsHome.marker());
    write_fields(buf, &GPS_HOME_FIELDS, 0, cache, |def, predictor| {
        residual(sample.value(def.value), predictor, &input, &constants)
    });
}

/// Encode a `G` frame. Coordinates are relative to `constants.home`, the
/// time field (when present) to `constants.last_main_frame_time`.
pub fn encode_gps_frame<B: BufMut>(
    buf: &mut B,
    cache: &ConditionCache,
    sample: &GpsFrameSample,
    constants: &PredictorConstants,
) {
    buf.put_u8(FrameKind::Gps.marker());
    write_fields(buf, &GPS_FIELDS, 0, cache, |def, predictor| {
        let input = PredictionInput::without_history(def.index.unwrap_or(0) as usize, 0);
        residual(sample.value(def.value), predictor, &input, constants)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackbox::conditions::{Condition, IncludeFlags};
    use crate::blackbox::fielddefs::{FieldCoding, FieldSign};
    use crate::blackbox::rate::LogRate;
    use crate::blackbox::state::GpsSolution;
    use crate::flight::FlightEnvironment;

    fn cache_for(env: &FlightEnvironment, include: IncludeFlags, rate: LogRate) -> ConditionCache {
        ConditionCache::build(env, include, rate)
    }

    /// Smallest environment: four motors and nothing optional
    fn minimal() -> (FlightEnvironment, ConditionCache) {
        let env = FlightEnvironment { motor_count: 4, ..FlightEnvironment::default() };
        let cache = cache_for(&env, IncludeFlags::MOTORS, LogRate::default());
        (env, cache)
    }

    fn def(encoding: Encoding, condition: Condition, value: i32) -> FieldDef<i32, 1> {
        FieldDef {
            name: "x",
            index: None,
            sign: FieldSign::Signed,
            coding: [FieldCoding::new(Predictor::Zero, encoding)],
            condition,
            value,
        }
    }

    fn encode_table(fields: &[FieldDef<i32, 1>], cache: &ConditionCache) -> Vec<u8> {
        let mut buf = Vec::new();
        write_fields(&mut buf, fields, 0, cache, |d, _| d.value);
        buf
    }

    #[test]
    fn test_grouping_skips_excluded_fields() {
        let (_, cache) = minimal();
        let table = [
            def(Encoding::Tag8_8Svb, Condition::Always, 5),
            def(Encoding::Tag8_8Svb, Condition::Never, 99),
            def(Encoding::Tag8_8Svb, Condition::Always, -1),
        ];
        // Two included values: presence mask 0b11, then 5 and -1
        assert_eq!(encode_table(&table, &cache), vec![0x03, 0x0A, 0x01]);
    }

    #[test]
    fn test_single_tag8_8svb_is_bare_value() {
        let (_, cache) = minimal();
        let table = [
            def(Encoding::Tag8_8Svb, Condition::Always, 5),
            def(Encoding::SignedVb, Condition::Always, 1),
        ];
        assert_eq!(encode_table(&table, &cache), vec![0x0A, 0x02]);
    }

    #[test]
    fn test_long_tag8_8svb_runs_split_into_groups_of_eight() {
        let (_, cache) = minimal();
        let table: Vec<_> = (0..9).map(|_| def(Encoding::Tag8_8Svb, Condition::Always, 1)).collect();
        let bytes = encode_table(&table, &cache);
        // Group of eight (mask + 8 values) then a bare single value
        assert_eq!(bytes.len(), 1 + 8 + 1);
        assert_eq!(bytes[0], 0xFF);
    }

    #[test]
    fn test_null_writes_nothing() {
        let (_, cache) = minimal();
        let table = [def(Encoding::Null, Condition::Always, 123)];
        assert!(encode_table(&table, &cache).is_empty());
    }

    #[test]
    fn test_intra_frame_minimal_layout() {
        let (env, cache) = minimal();
        let mut history: HistoryRing<MainState> = HistoryRing::new();
        {
            let state = history.current_mut();
            state.iteration = 0;
            state.time_us = 1000;
            state.motor = [1100, 1110, 1090, 1100, 0, 0, 0, 0];
        }
        let constants = PredictorConstants { min_throttle: env.min_throttle, ..PredictorConstants::default() };

        let mut buf = Vec::new();
        encode_intra_frame(&mut buf, &cache, &history, &constants);

        let mut expected = vec![b'I', 0x00, 0xE8, 0x07];
        // 15 always-present PID values (axisRate, P, I, F) and 3 gyro, all zero
        expected.extend(std::iter::repeat(0).take(12 + 3));
        // motor[0] relative to min throttle, then motor[1..3] relative to motor[0]
        expected.extend([30, 20, 0x13, 0]);
        // navState, navFlags
        expected.extend([0, 0]);
        assert_eq!(buf, expected);
    }

    #[test]
    fn test_inter_frame_uses_history() {
        let (_, cache) = minimal();
        let mut history: HistoryRing<MainState> = HistoryRing::new();

        history.current_mut().time_us = 1000;
        history.current_mut().axis_i = [4, 4, 4];
        history.rotate_after_intra();

        {
            let state = history.current_mut();
            state.iteration = 1;
            state.time_us = 2000;
            state.axis_i = [5, 3, 4];
        }

        let mut buf = Vec::new();
        encode_inter_frame(&mut buf, &cache, &history, &PredictorConstants::default());

        assert_eq!(buf[0], b'P');
        // loopIteration is predicted by increment and writes nothing, then
        // time: 2000 - (2*1000 - 1000) = 1000
        assert_eq!(&buf[1..3], &[0xD0, 0x0F]);
        // axisRate[3] and axisP[3]: unchanged
        assert_eq!(&buf[3..9], &[0; 6]);
        // axisI as TAG2_3S32 [1, -1, 0]: 2-bit class
        assert_eq!(buf[9], 0b00_01_11_00);
    }

    #[test]
    fn test_excluded_fields_contribute_no_bytes() {
        let env = FlightEnvironment { motor_count: 4, ..FlightEnvironment::default() };
        let with_debug = FlightEnvironment { debug_mode: 1, ..env.clone() };

        let cache = cache_for(&env, IncludeFlags::MOTORS, LogRate::default());
        let cache_debug = cache_for(&with_debug, IncludeFlags::MOTORS, LogRate::default());

        let mut history: HistoryRing<MainState> = HistoryRing::new();
        history.current_mut().debug = [7; 8];

        let mut plain = Vec::new();
        let mut debug = Vec::new();
        encode_intra_frame(&mut plain, &cache, &history, &PredictorConstants::default());
        encode_intra_frame(&mut debug, &cache_debug, &history, &PredictorConstants::default());

        assert_eq!(debug.len(), plain.len() + 8);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let (_, cache) = minimal();
        let mut history: HistoryRing<MainState> = HistoryRing::new();
        history.current_mut().gyro_adc = [-5, 17, 300];

        let mut a = Vec::new();
        let mut b = Vec::new();
        encode_intra_frame(&mut a, &cache, &history, &PredictorConstants::default());
        encode_intra_frame(&mut b, &cache, &history, &PredictorConstants::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_slow_frame_layout() {
        let (_, cache) = minimal();
        let state = SlowState {
            flight_mode_flags: 3,
            rx_signal_received: true,
            rx_flight_channels_valid: true,
            ..SlowState::default()
        };

        let mut buf = Vec::new();
        encode_slow_frame(&mut buf, &cache, &state);

        // S, five UVB flag words, then failsafe/rx triple as TAG2_3S32 [0, 1, 1]
        assert_eq!(&buf[..7], &[b'S', 0, 3, 0, 0, 0, 0b00_00_01_01]);
        // rxUpdateRate .. escTemperature are all zero, one byte each
        assert_eq!(buf.len(), 7 + 20);
    }

    #[test]
    fn test_gps_frames() {
        let env = FlightEnvironment::default();
        let every_frame = cache_for(&env, IncludeFlags::default(), LogRate::default());
        let decimated = cache_for(&env, IncludeFlags::default(), LogRate::new(1, 2, 1000));

        let sample = GpsFrameSample {
            time_us: 5_000,
            solution: GpsSolution {
                fix_type: 2,
                num_sat: 9,
                coord: [1_000_010, 2_000_000],
                altitude_cm: 1_000,
                ..GpsSolution::default()
            },
            home: [1_000_000, 2_000_000],
        };
        let constants = PredictorConstants {
            home: sample.home,
            last_main_frame_time: 4_000,
            ..PredictorConstants::default()
        };

        let mut home = Vec::new();
        encode_gps_home_frame(&mut home, &every_frame, &sample);
        assert_eq!(home[0], b'H');

        let mut g = Vec::new();
        encode_gps_frame(&mut g, &every_frame, &sample, &constants);
        // G, fix, sats, lat +10, lon 0, alt 10 m, 5 UVB zeros, 3 SVB zeros
        assert_eq!(g, vec![b'G', 2, 9, 20, 0, 20, 0, 0, 0, 0, 0, 0, 0, 0]);

        let mut g_timed = Vec::new();
        encode_gps_frame(&mut g_timed, &decimated, &sample, &constants);
        // 1000us since the last main frame, as UVB
        assert_eq!(&g_timed[..3], &[b'G', 0xE8, 0x07]);
        assert_eq!(g_timed.len(), g.len() + 2);
    }
}
