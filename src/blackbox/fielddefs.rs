//! # Field Definitions
//!
//! Wire-level vocabulary shared by the field tables, the frame writers and
//! the header transmitter.
//!
//! ## Predictors
//!
//! | Id | Predictor | Baseline |
//! |----|-----------|----------|
//! | 0 | Zero | 0 |
//! | 1 | Previous | value in the previous frame |
//! | 2 | StraightLine | `2 * prev1 - prev2` |
//! | 3 | Average2 | `(prev1 + prev2) / 2`, truncated |
//! | 4 | MinThrottle | configured idle throttle |
//! | 5 | Motor0 | `motor[0]` of the same frame |
//! | 6 | Inc | `prev1 + 1` (value is not written) |
//! | 7 | HomeCoord | last logged GPS home, same axis |
//! | 8 | Servo1500 | 1500 |
//! | 9 | VbatRef | battery voltage at log start |
//! | 10 | LastMainFrameTime | time of the last written main frame |
//!
//! ## Encodings
//!
//! | Id | Encoding |
//! |----|----------|
//! | 0 | SignedVb |
//! | 1 | UnsignedVb |
//! | 3 | Neg14Bit |
//! | 6 | Tag8_8Svb |
//! | 7 | Tag2_3S32 |
//! | 8 | Tag8_4S16 |
//! | 9 | Null |

use super::conditions::Condition;

/// How the decoder reconstructs a field from previously decoded values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Predictor {
    Zero = 0,
    Previous = 1,
    StraightLine = 2,
    Average2 = 3,
    MinThrottle = 4,
    Motor0 = 5,
    Inc = 6,
    HomeCoord = 7,
    Servo1500 = 8,
    VbatRef = 9,
    LastMainFrameTime = 10,
}

impl Predictor {
    /// Numeric id written in `H Field x predictor:` header lines
    pub const fn id(self) -> u8 {
        self as u8
    }
}

/// How a residual is laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Encoding {
    SignedVb = 0,
    UnsignedVb = 1,
    Neg14Bit = 3,
    Tag8_8Svb = 6,
    Tag2_3S32 = 7,
    Tag8_4S16 = 8,
    Null = 9,
}

impl Encoding {
    /// Numeric id written in `H Field x encoding:` header lines
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Number of consecutive fields packed together by this encoding.
    ///
    /// For TAG8_8SVB this is the upper bound; shorter runs form smaller groups.
    pub const fn group_size(self) -> usize {
        match self {
            Encoding::Tag2_3S32 => 3,
            Encoding::Tag8_4S16 => 4,
            Encoding::Tag8_8Svb => 8,
            _ => 1,
        }
    }
}

/// Signedness column of the field header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FieldSign {
    Unsigned = 0,
    Signed = 1,
}

/// Predictor/encoding pair for one frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCoding {
    pub predictor: Predictor,
    pub encoding: Encoding,
}

impl FieldCoding {
    pub const fn new(predictor: Predictor, encoding: Encoding) -> Self {
        Self { predictor, encoding }
    }
}

/// One row of a field table.
///
/// `N` is the number of frame types the field is coded for: 2 for main
/// fields (intra then inter), 1 for GPS and slow fields. `V` is the typed key
/// naming the snapshot member the field reads.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef<V, const N: usize> {
    pub name: &'static str,
    pub index: Option<u8>,
    pub sign: FieldSign,
    pub coding: [FieldCoding; N],
    pub condition: Condition,
    pub value: V,
}

impl<V, const N: usize> FieldDef<V, N> {
    /// Number of `H Field` header lines describing a table of this shape
    pub const HEADER_ROWS: usize = 2 + 2 * N;

    /// Length of the field name as printed in the header, including any
    /// `[i]` suffix.
    pub fn printed_name_len(&self) -> usize {
        match self.index {
            Some(i) if i >= 10 => self.name.len() + 4,
            Some(_) => self.name.len() + 3,
            None => self.name.len(),
        }
    }
}

/// Frame type markers; every frame starts with one of these bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Intra,
    Inter,
    Slow,
    GpsHome,
    Gps,
    Event,
}

impl FrameKind {
    /// ASCII marker byte that starts the frame
    pub const fn marker(self) -> u8 {
        match self {
            FrameKind::Intra => b'I',
            FrameKind::Inter => b'P',
            FrameKind::Slow => b'S',
            FrameKind::GpsHome => b'H',
            FrameKind::Gps => b'G',
            FrameKind::Event => b'E',
        }
    }
}

/// Names of the header rows, in transmission order.
///
/// Rows past the first four describe the inter-frame coding and are printed
/// under the `P` frame character.
pub const FIELD_HEADER_ROW_NAMES: [&str; 6] =
    ["name", "signed", "predictor", "encoding", "predictor", "encoding"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_ids() {
        assert_eq!(Predictor::Zero.id(), 0);
        assert_eq!(Predictor::Average2.id(), 3);
        assert_eq!(Predictor::LastMainFrameTime.id(), 10);
        assert_eq!(Encoding::Neg14Bit.id(), 3);
        assert_eq!(Encoding::Tag8_8Svb.id(), 6);
        assert_eq!(Encoding::Null.id(), 9);
    }

    #[test]
    fn test_group_sizes() {
        assert_eq!(Encoding::Tag2_3S32.group_size(), 3);
        assert_eq!(Encoding::Tag8_4S16.group_size(), 4);
        assert_eq!(Encoding::Tag8_8Svb.group_size(), 8);
        assert_eq!(Encoding::SignedVb.group_size(), 1);
    }

    #[test]
    fn test_frame_markers() {
        let markers: Vec<u8> = [
            FrameKind::Intra,
            FrameKind::Inter,
            FrameKind::Slow,
            FrameKind::GpsHome,
            FrameKind::Gps,
            FrameKind::Event,
        ]
        .iter()
        .map(|k| k.marker())
        .collect();
        assert_eq!(markers, b"IPSHGE".to_vec());
    }

    #[test]
    fn test_printed_name_len() {
        let def = FieldDef {
            name: "servo",
            index: Some(12),
            sign: FieldSign::Unsigned,
            coding: [FieldCoding::new(Predictor::Servo1500, Encoding::SignedVb)],
            condition: Condition::Always,
            value: (),
        };
        assert_eq!(def.printed_name_len(), "servo[12]".len());
        assert_eq!(FieldDef::<(), 2>::HEADER_ROWS, 6);
        assert_eq!(FieldDef::<(), 1>::HEADER_ROWS, 4);
    }
}
