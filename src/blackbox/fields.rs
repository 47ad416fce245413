//! # Field Tables
//!
//! Static definitions of every field the recorder can log, in wire order.
//!
//! Both the header transmitter and the frame writers walk these tables, so a
//! field's name, signedness, predictor and encoding are declared exactly
//! once. Grouped encodings (TAG2_3S32, TAG8_4S16, TAG8_8SVB) are applied to
//! consecutive runs of included fields that share the encoding.

use super::conditions::Condition;
use super::fielddefs::{Encoding, FieldCoding, FieldDef, FieldSign, Predictor};
use super::state::{GpsValue, MainValue, SlowValue};

/// Main-frame field: intra coding first, inter coding second.
pub type MainFieldDef = FieldDef<MainValue, 2>;

/// GPS frame field, used by both `G` and `H` frames.
pub type GpsFieldDef = FieldDef<GpsValue, 1>;

/// Slow-frame field.
pub type SlowFieldDef = FieldDef<SlowValue, 1>;

const fn coding(predictor: Predictor, encoding: Encoding) -> FieldCoding {
    FieldCoding::new(predictor, encoding)
}

const I_ZERO_SVB: FieldCoding = coding(Predictor::Zero, Encoding::SignedVb);
const I_ZERO_UVB: FieldCoding = coding(Predictor::Zero, Encoding::UnsignedVb);
const I_MINTHROTTLE_UVB: FieldCoding = coding(Predictor::MinThrottle, Encoding::UnsignedVb);
const I_MOTOR0_SVB: FieldCoding = coding(Predictor::Motor0, Encoding::SignedVb);
const I_SERVO1500_SVB: FieldCoding = coding(Predictor::Servo1500, Encoding::SignedVb);
const I_VBATREF_NEG14: FieldCoding = coding(Predictor::VbatRef, Encoding::Neg14Bit);

const P_INC_NULL: FieldCoding = coding(Predictor::Inc, Encoding::Null);
const P_STRAIGHT_LINE_SVB: FieldCoding = coding(Predictor::StraightLine, Encoding::SignedVb);
const P_PREV_SVB: FieldCoding = coding(Predictor::Previous, Encoding::SignedVb);
const P_PREV_TAG2_3S32: FieldCoding = coding(Predictor::Previous, Encoding::Tag2_3S32);
const P_PREV_TAG8_4S16: FieldCoding = coding(Predictor::Previous, Encoding::Tag8_4S16);
const P_PREV_TAG8_8SVB: FieldCoding = coding(Predictor::Previous, Encoding::Tag8_8Svb);
const P_AVG2_SVB: FieldCoding = coding(Predictor::Average2, Encoding::SignedVb);

const ZERO_SVB: FieldCoding = coding(Predictor::Zero, Encoding::SignedVb);
const ZERO_UVB: FieldCoding = coding(Predictor::Zero, Encoding::UnsignedVb);
const ZERO_TAG2_3S32: FieldCoding = coding(Predictor::Zero, Encoding::Tag2_3S32);
const PREV_UVB: FieldCoding = coding(Predictor::Previous, Encoding::UnsignedVb);
const PREV_SVB: FieldCoding = coding(Predictor::Previous, Encoding::SignedVb);
const HOME_COORD_SVB: FieldCoding = coding(Predictor::HomeCoord, Encoding::SignedVb);
const LAST_MAIN_TIME_UVB: FieldCoding = coding(Predictor::LastMainFrameTime, Encoding::UnsignedVb);

const fn main_field(
    name: &'static str,
    index: Option<u8>,
    sign: FieldSign,
    intra: FieldCoding,
    inter: FieldCoding,
    condition: Condition,
    value: MainValue,
) -> MainFieldDef {
    FieldDef { name, index, sign, coding: [intra, inter], condition, value }
}

const fn single_field<V>(
    name: &'static str,
    index: Option<u8>,
    sign: FieldSign,
    coding: FieldCoding,
    condition: Condition,
    value: V,
) -> FieldDef<V, 1> {
    FieldDef { name, index, sign, coding: [coding], condition, value }
}

/// `I`/`P` frame fields
pub static MAIN_FIELDS: [MainFieldDef; 149] = [
    main_field("loopIteration", None, FieldSign::Unsigned, I_ZERO_UVB, P_INC_NULL, Condition::Always, MainValue::Iteration),
    main_field("time", None, FieldSign::Unsigned, I_ZERO_UVB, P_STRAIGHT_LINE_SVB, Condition::Always, MainValue::Time),
    main_field("axisRate", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::Always, MainValue::AxisRate(0)),
    main_field("axisRate", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::Always, MainValue::AxisRate(1)),
    main_field("axisRate", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::Always, MainValue::AxisRate(2)),
    main_field("axisP", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::Always, MainValue::AxisP(0)),
    main_field("axisP", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::Always, MainValue::AxisP(1)),
    main_field("axisP", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::Always, MainValue::AxisP(2)),
    main_field("axisI", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG2_3S32, Condition::Always, MainValue::AxisI(0)),
    main_field("axisI", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG2_3S32, Condition::Always, MainValue::AxisI(1)),
    main_field("axisI", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG2_3S32, Condition::Always, MainValue::AxisI(2)),
    main_field("axisD", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::NonzeroPidD(0), MainValue::AxisD(0)),
    main_field("axisD", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::NonzeroPidD(1), MainValue::AxisD(1)),
    main_field("axisD", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::NonzeroPidD(2), MainValue::AxisD(2)),
    main_field("axisF", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::Always, MainValue::AxisF(0)),
    main_field("axisF", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::Always, MainValue::AxisF(1)),
    main_field("axisF", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::Always, MainValue::AxisF(2)),
    main_field("fwAltP", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::FixedWingNav, MainValue::FwAltPid(0)),
    main_field("fwAltI", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::FixedWingNav, MainValue::FwAltPid(1)),
    main_field("fwAltD", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::FixedWingNav, MainValue::FwAltPid(2)),
    main_field("fwAltOut", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::FixedWingNav, MainValue::FwAltOutput),
    main_field("fwPosP", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::FixedWingNav, MainValue::FwPosPid(0)),
    main_field("fwPosI", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::FixedWingNav, MainValue::FwPosPid(1)),
    main_field("fwPosD", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::FixedWingNav, MainValue::FwPosPid(2)),
    main_field("fwPosOut", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::FixedWingNav, MainValue::FwPosOutput),
    main_field("mcPosAxisP", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McPosAxisP(0)),
    main_field("mcPosAxisP", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McPosAxisP(1)),
    main_field("mcPosAxisP", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McPosAxisP(2)),
    main_field("mcVelAxisP", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisPid(0, 0)),
    main_field("mcVelAxisP", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisPid(0, 1)),
    main_field("mcVelAxisP", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisPid(0, 2)),
    main_field("mcVelAxisI", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisPid(1, 0)),
    main_field("mcVelAxisI", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisPid(1, 1)),
    main_field("mcVelAxisI", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisPid(1, 2)),
    main_field("mcVelAxisD", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisPid(2, 0)),
    main_field("mcVelAxisD", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisPid(2, 1)),
    main_field("mcVelAxisD", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisPid(2, 2)),
    main_field("mcVelAxisFF", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisPid(3, 0)),
    main_field("mcVelAxisFF", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisPid(3, 1)),
    main_field("mcVelAxisFF", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisPid(3, 2)),
    main_field("mcVelAxisOut", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisOutput(0)),
    main_field("mcVelAxisOut", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisOutput(1)),
    main_field("mcVelAxisOut", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McVelAxisOutput(2)),
    main_field("mcSurfaceP", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McSurfacePid(0)),
    main_field("mcSurfaceI", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McSurfacePid(1)),
    main_field("mcSurfaceD", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McSurfacePid(2)),
    main_field("mcSurfaceOut", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::McNav, MainValue::McSurfaceOutput),
    main_field("rcData", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_4S16, Condition::RcData, MainValue::RcData(0)),
    main_field("rcData", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_4S16, Condition::RcData, MainValue::RcData(1)),
    main_field("rcData", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_4S16, Condition::RcData, MainValue::RcData(2)),
    main_field("rcData", Some(3), FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_4S16, Condition::RcData, MainValue::RcData(3)),
    main_field("rcCommand", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_4S16, Condition::RcCommand, MainValue::RcCommand(0)),
    main_field("rcCommand", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_4S16, Condition::RcCommand, MainValue::RcCommand(1)),
    main_field("rcCommand", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_4S16, Condition::RcCommand, MainValue::RcCommand(2)),
    main_field("rcCommand", Some(3), FieldSign::Unsigned, I_MINTHROTTLE_UVB, P_PREV_TAG8_4S16, Condition::RcCommand, MainValue::RcCommand(3)),
    main_field("vbat", None, FieldSign::Unsigned, I_VBATREF_NEG14, P_PREV_TAG8_8SVB, Condition::Vbat, MainValue::Vbat),
    main_field("amperage", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_8SVB, Condition::Amperage, MainValue::Amperage),
    main_field("magADC", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_8SVB, Condition::Mag, MainValue::MagAdc(0)),
    main_field("magADC", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_8SVB, Condition::Mag, MainValue::MagAdc(1)),
    main_field("magADC", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_8SVB, Condition::Mag, MainValue::MagAdc(2)),
    main_field("BaroAlt", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_8SVB, Condition::Baro, MainValue::BaroAlt),
    main_field("AirSpeed", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_8SVB, Condition::Pitot, MainValue::AirSpeed),
    main_field("surfaceRaw", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_TAG8_8SVB, Condition::Surface, MainValue::SurfaceRaw),
    main_field("rssi", None, FieldSign::Unsigned, I_ZERO_UVB, P_PREV_TAG8_8SVB, Condition::Rssi, MainValue::Rssi),
    main_field("gyroADC", Some(0), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Always, MainValue::GyroAdc(0)),
    main_field("gyroADC", Some(1), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Always, MainValue::GyroAdc(1)),
    main_field("gyroADC", Some(2), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Always, MainValue::GyroAdc(2)),
    main_field("gyroRaw", Some(0), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::GyroRaw, MainValue::GyroRaw(0)),
    main_field("gyroRaw", Some(1), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::GyroRaw, MainValue::GyroRaw(1)),
    main_field("gyroRaw", Some(2), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::GyroRaw, MainValue::GyroRaw(2)),
    main_field("gyroPeakRoll", Some(0), FieldSign::Unsigned, I_ZERO_UVB, P_AVG2_SVB, Condition::GyroPeaksRoll, MainValue::GyroPeakRoll(0)),
    main_field("gyroPeakRoll", Some(1), FieldSign::Unsigned, I_ZERO_UVB, P_AVG2_SVB, Condition::GyroPeaksRoll, MainValue::GyroPeakRoll(1)),
    main_field("gyroPeakRoll", Some(2), FieldSign::Unsigned, I_ZERO_UVB, P_AVG2_SVB, Condition::GyroPeaksRoll, MainValue::GyroPeakRoll(2)),
    main_field("gyroPeakPitch", Some(0), FieldSign::Unsigned, I_ZERO_UVB, P_AVG2_SVB, Condition::GyroPeaksPitch, MainValue::GyroPeakPitch(0)),
    main_field("gyroPeakPitch", Some(1), FieldSign::Unsigned, I_ZERO_UVB, P_AVG2_SVB, Condition::GyroPeaksPitch, MainValue::GyroPeakPitch(1)),
    main_field("gyroPeakPitch", Some(2), FieldSign::Unsigned, I_ZERO_UVB, P_AVG2_SVB, Condition::GyroPeaksPitch, MainValue::GyroPeakPitch(2)),
    main_field("gyroPeakYaw", Some(0), FieldSign::Unsigned, I_ZERO_UVB, P_AVG2_SVB, Condition::GyroPeaksYaw, MainValue::GyroPeakYaw(0)),
    main_field("gyroPeakYaw", Some(1), FieldSign::Unsigned, I_ZERO_UVB, P_AVG2_SVB, Condition::GyroPeaksYaw, MainValue::GyroPeakYaw(1)),
    main_field("gyroPeakYaw", Some(2), FieldSign::Unsigned, I_ZERO_UVB, P_AVG2_SVB, Condition::GyroPeaksYaw, MainValue::GyroPeakYaw(2)),
    main_field("accSmooth", Some(0), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Acc, MainValue::AccSmooth(0)),
    main_field("accSmooth", Some(1), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Acc, MainValue::AccSmooth(1)),
    main_field("accSmooth", Some(2), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Acc, MainValue::AccSmooth(2)),
    main_field("accVib", None, FieldSign::Unsigned, I_ZERO_UVB, P_AVG2_SVB, Condition::Acc, MainValue::AccVib),
    main_field("attitude", Some(0), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Attitude, MainValue::Attitude(0)),
    main_field("attitude", Some(1), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Attitude, MainValue::Attitude(1)),
    main_field("attitude", Some(2), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Attitude, MainValue::Attitude(2)),
    main_field("debug", Some(0), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Debug, MainValue::Debug(0)),
    main_field("debug", Some(1), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Debug, MainValue::Debug(1)),
    main_field("debug", Some(2), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Debug, MainValue::Debug(2)),
    main_field("debug", Some(3), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Debug, MainValue::Debug(3)),
    main_field("debug", Some(4), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Debug, MainValue::Debug(4)),
    main_field("debug", Some(5), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Debug, MainValue::Debug(5)),
    main_field("debug", Some(6), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Debug, MainValue::Debug(6)),
    main_field("debug", Some(7), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::Debug, MainValue::Debug(7)),
    main_field("motor", Some(0), FieldSign::Unsigned, I_MINTHROTTLE_UVB, P_AVG2_SVB, Condition::AtLeastMotors(1), MainValue::Motor(0)),
    main_field("motor", Some(1), FieldSign::Unsigned, I_MOTOR0_SVB, P_AVG2_SVB, Condition::AtLeastMotors(2), MainValue::Motor(1)),
    main_field("motor", Some(2), FieldSign::Unsigned, I_MOTOR0_SVB, P_AVG2_SVB, Condition::AtLeastMotors(3), MainValue::Motor(2)),
    main_field("motor", Some(3), FieldSign::Unsigned, I_MOTOR0_SVB, P_AVG2_SVB, Condition::AtLeastMotors(4), MainValue::Motor(3)),
    main_field("motor", Some(4), FieldSign::Unsigned, I_MOTOR0_SVB, P_AVG2_SVB, Condition::AtLeastMotors(5), MainValue::Motor(4)),
    main_field("motor", Some(5), FieldSign::Unsigned, I_MOTOR0_SVB, P_AVG2_SVB, Condition::AtLeastMotors(6), MainValue::Motor(5)),
    main_field("motor", Some(6), FieldSign::Unsigned, I_MOTOR0_SVB, P_AVG2_SVB, Condition::AtLeastMotors(7), MainValue::Motor(6)),
    main_field("motor", Some(7), FieldSign::Unsigned, I_MOTOR0_SVB, P_AVG2_SVB, Condition::AtLeastMotors(8), MainValue::Motor(7)),
    main_field("servo", Some(0), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(1), MainValue::Servo(0)),
    main_field("servo", Some(1), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(2), MainValue::Servo(1)),
    main_field("servo", Some(2), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(3), MainValue::Servo(2)),
    main_field("servo", Some(3), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(4), MainValue::Servo(3)),
    main_field("servo", Some(4), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(5), MainValue::Servo(4)),
    main_field("servo", Some(5), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(6), MainValue::Servo(5)),
    main_field("servo", Some(6), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(7), MainValue::Servo(6)),
    main_field("servo", Some(7), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(8), MainValue::Servo(7)),
    main_field("servo", Some(8), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(9), MainValue::Servo(8)),
    main_field("servo", Some(9), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(10), MainValue::Servo(9)),
    main_field("servo", Some(10), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(11), MainValue::Servo(10)),
    main_field("servo", Some(11), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(12), MainValue::Servo(11)),
    main_field("servo", Some(12), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(13), MainValue::Servo(12)),
    main_field("servo", Some(13), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(14), MainValue::Servo(13)),
    main_field("servo", Some(14), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(15), MainValue::Servo(14)),
    main_field("servo", Some(15), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(16), MainValue::Servo(15)),
    main_field("servo", Some(16), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(17), MainValue::Servo(16)),
    main_field("servo", Some(17), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(18), MainValue::Servo(17)),
    main_field("servo", Some(18), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(19), MainValue::Servo(18)),
    main_field("servo", Some(19), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(20), MainValue::Servo(19)),
    main_field("servo", Some(20), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(21), MainValue::Servo(20)),
    main_field("servo", Some(21), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(22), MainValue::Servo(21)),
    main_field("servo", Some(22), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(23), MainValue::Servo(22)),
    main_field("servo", Some(23), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(24), MainValue::Servo(23)),
    main_field("servo", Some(24), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(25), MainValue::Servo(24)),
    main_field("servo", Some(25), FieldSign::Unsigned, I_SERVO1500_SVB, P_AVG2_SVB, Condition::AtLeastServos(26), MainValue::Servo(25)),
    main_field("navState", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::Always, MainValue::NavState),
    main_field("navFlags", None, FieldSign::Unsigned, I_ZERO_SVB, P_PREV_SVB, Condition::Always, MainValue::NavFlags),
    main_field("navEPH", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::NavPos, MainValue::NavEph),
    main_field("navEPV", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::NavPos, MainValue::NavEpv),
    main_field("navPos", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::NavPos, MainValue::NavPos(0)),
    main_field("navPos", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::NavPos, MainValue::NavPos(1)),
    main_field("navPos", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::NavPos, MainValue::NavPos(2)),
    main_field("navVel", Some(0), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::NavPos, MainValue::NavVel(0)),
    main_field("navVel", Some(1), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::NavPos, MainValue::NavVel(1)),
    main_field("navVel", Some(2), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::NavPos, MainValue::NavVel(2)),
    main_field("navTgtVel", Some(0), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::NavPos, MainValue::NavTgtVel(0)),
    main_field("navTgtVel", Some(1), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::NavPos, MainValue::NavTgtVel(1)),
    main_field("navTgtVel", Some(2), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::NavPos, MainValue::NavTgtVel(2)),
    main_field("navTgtPos", Some(0), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::NavPos, MainValue::NavTgtPos(0)),
    main_field("navTgtPos", Some(1), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::NavPos, MainValue::NavTgtPos(1)),
    main_field("navTgtPos", Some(2), FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::NavPos, MainValue::NavTgtPos(2)),
    main_field("navTgtHdg", None, FieldSign::Unsigned, I_ZERO_SVB, P_PREV_SVB, Condition::NavPos, MainValue::NavTgtHeading),
    main_field("navSurf", None, FieldSign::Signed, I_ZERO_SVB, P_PREV_SVB, Condition::NavPos, MainValue::NavSurface),
    main_field("navAcc", Some(0), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::NavAcc, MainValue::NavAcc(0)),
    main_field("navAcc", Some(1), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::NavAcc, MainValue::NavAcc(1)),
    main_field("navAcc", Some(2), FieldSign::Signed, I_ZERO_SVB, P_AVG2_SVB, Condition::NavAcc, MainValue::NavAcc(2)),
];

/// `G` frame fields
pub static GPS_FIELDS: [GpsFieldDef; 14] = [
    single_field("time", None, FieldSign::Unsigned, LAST_MAIN_TIME_UVB, Condition::NotLoggingEveryFrame, GpsValue::Time),
    single_field("GPS_fixType", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, GpsValue::FixType),
    single_field("GPS_numSat", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, GpsValue::NumSat),
    single_field("GPS_coord", Some(0), FieldSign::Signed, HOME_COORD_SVB, Condition::Always, GpsValue::Coord(0)),
    single_field("GPS_coord", Some(1), FieldSign::Signed, HOME_COORD_SVB, Condition::Always, GpsValue::Coord(1)),
    single_field("GPS_altitude", None, FieldSign::Signed, ZERO_SVB, Condition::Always, GpsValue::Altitude),
    single_field("GPS_speed", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, GpsValue::Speed),
    single_field("GPS_ground_course", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, GpsValue::GroundCourse),
    single_field("GPS_hdop", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, GpsValue::Hdop),
    single_field("GPS_eph", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, GpsValue::Eph),
    single_field("GPS_epv", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, GpsValue::Epv),
    single_field("GPS_velned", Some(0), FieldSign::Signed, ZERO_SVB, Condition::Always, GpsValue::VelNed(0)),
    single_field("GPS_velned", Some(1), FieldSign::Signed, ZERO_SVB, Condition::Always, GpsValue::VelNed(1)),
    single_field("GPS_velned", Some(2), FieldSign::Signed, ZERO_SVB, Condition::Always, GpsValue::VelNed(2)),
];

/// `H` frame fields
pub static GPS_HOME_FIELDS: [GpsFieldDef; 2] = [
    single_field("GPS_home", Some(0), FieldSign::Signed, ZERO_SVB, Condition::Always, GpsValue::Home(0)),
    single_field("GPS_home", Some(1), FieldSign::Signed, ZERO_SVB, Condition::Always, GpsValue::Home(1)),
];

/// `S` frame fields; slow frames are never conditional.
pub static SLOW_FIELDS: [SlowFieldDef; 28] = [
    single_field("activeWpNumber", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, SlowValue::ActiveWpNumber),
    single_field("flightModeFlags", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, SlowValue::FlightModeFlags),
    single_field("flightModeFlags2", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, SlowValue::FlightModeFlags2),
    single_field("activeFlightModeFlags", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, SlowValue::ActiveFlightModeFlags),
    single_field("stateFlags", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, SlowValue::StateFlags),
    single_field("failsafePhase", None, FieldSign::Unsigned, ZERO_TAG2_3S32, Condition::Always, SlowValue::FailsafePhase),
    single_field("rxSignalReceived", None, FieldSign::Unsigned, ZERO_TAG2_3S32, Condition::Always, SlowValue::RxSignalReceived),
    single_field("rxFlightChannelsValid", None, FieldSign::Unsigned, ZERO_TAG2_3S32, Condition::Always, SlowValue::RxFlightChannelsValid),
    single_field("rxUpdateRate", None, FieldSign::Unsigned, PREV_UVB, Condition::Always, SlowValue::RxUpdateRate),
    single_field("hwHealthStatus", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, SlowValue::HwHealthStatus),
    single_field("powerSupplyImpedance", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, SlowValue::PowerSupplyImpedance),
    single_field("sagCompensatedVBat", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, SlowValue::SagCompensatedVbat),
    single_field("wind", Some(0), FieldSign::Signed, ZERO_SVB, Condition::Always, SlowValue::Wind(0)),
    single_field("wind", Some(1), FieldSign::Signed, ZERO_SVB, Condition::Always, SlowValue::Wind(1)),
    single_field("wind", Some(2), FieldSign::Signed, ZERO_SVB, Condition::Always, SlowValue::Wind(2)),
    single_field("mspOverrideFlags", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, SlowValue::MspOverrideFlags),
    single_field("IMUTemperature", None, FieldSign::Signed, ZERO_SVB, Condition::Always, SlowValue::ImuTemperature),
    single_field("baroTemperature", None, FieldSign::Signed, ZERO_SVB, Condition::Always, SlowValue::BaroTemperature),
    single_field("sens0Temp", None, FieldSign::Signed, ZERO_SVB, Condition::Always, SlowValue::Temperature(0)),
    single_field("sens1Temp", None, FieldSign::Signed, ZERO_SVB, Condition::Always, SlowValue::Temperature(1)),
    single_field("sens2Temp", None, FieldSign::Signed, ZERO_SVB, Condition::Always, SlowValue::Temperature(2)),
    single_field("sens3Temp", None, FieldSign::Signed, ZERO_SVB, Condition::Always, SlowValue::Temperature(3)),
    single_field("sens4Temp", None, FieldSign::Signed, ZERO_SVB, Condition::Always, SlowValue::Temperature(4)),
    single_field("sens5Temp", None, FieldSign::Signed, ZERO_SVB, Condition::Always, SlowValue::Temperature(5)),
    single_field("sens6Temp", None, FieldSign::Signed, ZERO_SVB, Condition::Always, SlowValue::Temperature(6)),
    single_field("sens7Temp", None, FieldSign::Signed, ZERO_SVB, Condition::Always, SlowValue::Temperature(7)),
    single_field("escRPM", None, FieldSign::Unsigned, ZERO_UVB, Condition::Always, SlowValue::EscRpm),
    single_field("escTemperature", None, FieldSign::Signed, PREV_SVB, Condition::Always, SlowValue::EscTemperature),
];
