//! # Encoding Primitives
//!
//! Variable-length and tag-packed integer encoders for the blackbox wire format.
//!
//! This module handles:
//! - Unsigned/signed variable-byte integers (7 bits per byte, LSB group first)
//! - Zig-zag mapping of signed values
//! - The 14-bit negated battery encoding used by intra frames
//! - Tag-packed groups: TAG2_3S32, TAG8_4S16 and TAG8_8SVB
//! - Fixed-width little-endian helpers for event payloads
//!
//! Every encoder writes straight into a [`BufMut`] sink and never allocates.
//!
//! ## Tag formats
//!
//! | Encoding | Group | Header | Value widths |
//! |----------|-------|--------|--------------|
//! | TAG2_3S32 | 3 | top 2 bits of first byte | 2 / 4 / 6 bits, or 8-32 bit fallback |
//! | TAG8_4S16 | 4 | 1 byte, 2 bits per value | 0 / 4 / 8 / 16 bits |
//! | TAG8_8SVB | 1-8 | 1 byte presence mask | signed VB per non-zero value |

use bytes::BufMut;

/// Maximum number of values in one TAG8_8SVB group.
pub const TAG8_8SVB_MAX_GROUP: usize = 8;

/// Write an unsigned variable-byte integer.
///
/// Seven bits per byte, lowest group first, with the high bit set on every
/// byte except the last. A `u32` takes at most 5 bytes.
///
/// # Arguments
///
/// * `buf` - Output sink
/// * `value` - Value to encode
///
/// # Examples
///
/// ```
/// use blackbox_logger::blackbox::encoding::write_unsigned_vb;
///
/// let mut out = Vec::new();
/// write_unsigned_vb(&mut out, 300);
/// assert_eq!(out, vec![0xAC, 0x02]);
/// ```
pub fn write_unsigned_vb<B: BufMut>(buf: &mut B, mut value: u32) {
    while value > 127 {
        buf.put_u8((value as u8) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Map a signed value onto an unsigned one so small magnitudes stay small.
///
/// `0 → 0, -1 → 1, 1 → 2, -2 → 3, ...`
pub fn zigzag_encode(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Write a signed variable-byte integer (zig-zag, then unsigned VB).
pub fn write_signed_vb<B: BufMut>(buf: &mut B, value: i32) {
    write_unsigned_vb(buf, zigzag_encode(value));
}

/// Write the negation of `value` truncated to 14 bits as an unsigned VB.
///
/// Battery voltage in intra frames is logged as the drop below the session
/// reference voltage, which is almost always positive and small.
pub fn write_neg_14bit<B: BufMut>(buf: &mut B, value: i32) {
    write_unsigned_vb(buf, (value.wrapping_neg() as u32) & 0x3FFF);
}

/// Write three signed values using the TAG2_3S32 layout.
///
/// The top two bits of the first byte select the packing used for all three
/// values:
///
/// | Selector | Range | Bytes |
/// |----------|-------|-------|
/// | 0 | `-2..2` | 1 (2 bits each) |
/// | 1 | `-8..8` | 2 (4 bits each) |
/// | 2 | `-32..32` | 3 (6 bits, then two whole bytes) |
/// | 3 | anything | 1 + per value 1-4 little-endian bytes |
///
/// In the fallback, the low six bits of the first byte carry a 2-bit width
/// code per value with the first value in the lowest bits.
///
/// # Examples
///
/// ```
/// use blackbox_logger::blackbox::encoding::write_tag2_3s32;
///
/// let mut out = Vec::new();
/// write_tag2_3s32(&mut out, &[0, 0, 0]);
/// assert_eq!(out, vec![0x00]);
/// ```
pub fn write_tag2_3s32<B: BufMut>(buf: &mut B, values: &[i32; 3]) {
    const BITS_2: u8 = 0;
    const BITS_4: u8 = 1;
    const BITS_6: u8 = 2;
    const BITS_32: u8 = 3;

    let fits = |range: std::ops::Range<i32>| values.iter().all(|v| range.contains(v));

    let selector = if !fits(-32..32) {
        BITS_32
    } else if !fits(-8..8) {
        BITS_6
    } else if !fits(-2..2) {
        BITS_4
    } else {
        BITS_2
    };

    match selector {
        BITS_2 => {
            buf.put_u8(
                (selector << 6)
                    | (((values[0] & 0x03) as u8) << 4)
                    | (((values[1] & 0x03) as u8) << 2)
                    | (values[2] & 0x03) as u8,
            );
        }
        BITS_4 => {
            buf.put_u8((selector << 6) | (values[0] & 0x0F) as u8);
            buf.put_u8(((values[1] << 4) as u8) | (values[2] & 0x0F) as u8);
        }
        BITS_6 => {
            buf.put_u8((selector << 6) | (values[0] & 0x3F) as u8);
            buf.put_u8(values[1] as u8);
            buf.put_u8(values[2] as u8);
        }
        _ => {
            // Width code per value, first value in the low bits
            let mut widths: u8 = 0;
            for &value in values.iter().rev() {
                widths <<= 2;
                widths |= if (-128..128).contains(&value) {
                    0
                } else if (-32768..32768).contains(&value) {
                    1
                } else if (-8_388_608..8_388_608).contains(&value) {
                    2
                } else {
                    3
                };
            }

            buf.put_u8((selector << 6) | widths);

            for &value in values.iter() {
                let byte_count = (widths & 0x03) as usize + 1;
                buf.put_slice(&value.to_le_bytes()[..byte_count]);
                widths >>= 2;
            }
        }
    }
}

/// Write four signed 16-bit values using the TAG8_4S16 layout.
///
/// A header byte carries a 2-bit width code per value (first value in the
/// low bits): 0 = zero (nothing written), 1 = 4-bit nibble, 2 = 8 bits,
/// 3 = 16 bits. Values are then packed on nibble boundaries, high nibble
/// first, and a dangling half byte is flushed at the end.
pub fn write_tag8_4s16<B: BufMut>(buf: &mut B, values: &[i32; 4]) {
    const FIELD_ZERO: u8 = 0;
    const FIELD_4BIT: u8 = 1;
    const FIELD_8BIT: u8 = 2;

    let mut selector: u8 = 0;
    for &value in values.iter().rev() {
        selector <<= 2;
        selector |= if value == 0 {
            FIELD_ZERO
        } else if (-8..8).contains(&value) {
            FIELD_4BIT
        } else if (-128..128).contains(&value) {
            FIELD_8BIT
        } else {
            3
        };
    }
    buf.put_u8(selector);

    let mut half_byte_pending = false;
    let mut buffer: u8 = 0;

    for &value in values.iter() {
        match selector & 0x03 {
            FIELD_ZERO => {}
            FIELD_4BIT => {
                if half_byte_pending {
                    buf.put_u8(buffer | (value & 0x0F) as u8);
                    half_byte_pending = false;
                } else {
                    buffer = (value << 4) as u8;
                    half_byte_pending = true;
                }
            }
            FIELD_8BIT => {
                if half_byte_pending {
                    buf.put_u8(buffer | ((value >> 4) & 0x0F) as u8);
                    buffer = (value << 4) as u8;
                } else {
                    buf.put_u8(value as u8);
                }
            }
            _ => {
                if half_byte_pending {
                    buf.put_u8(buffer | ((value >> 12) & 0x0F) as u8);
                    buf.put_u8((value >> 4) as u8);
                    buffer = (value << 4) as u8;
                } else {
                    buf.put_u8((value >> 8) as u8);
                    buf.put_u8(value as u8);
                }
            }
        }
        selector >>= 2;
    }

    if half_byte_pending {
        buf.put_u8(buffer);
    }
}

/// Write up to eight signed values using the TAG8_8SVB layout.
///
/// A single value is written as a bare signed VB. Otherwise a presence byte
/// (bit `i` set when value `i` is non-zero) is followed by the signed VB of
/// each non-zero value. An empty slice writes nothing.
pub fn write_tag8_8svb<B: BufMut>(buf: &mut B, values: &[i32]) {
    debug_assert!(values.len() <= TAG8_8SVB_MAX_GROUP);

    match values {
        [] => {}
        [single] => write_signed_vb(buf, *single),
        _ => {
            let header = values
                .iter()
                .enumerate()
                .filter(|(_, v)| **v != 0)
                .fold(0u8, |mask, (i, _)| mask | (1u8 << i));
            buf.put_u8(header);

            for &value in values.iter().filter(|&&v| v != 0) {
                write_signed_vb(buf, value);
            }
        }
    }
}

/// Write a 32-bit value as four little-endian bytes.
pub fn write_u32_le<B: BufMut>(buf: &mut B, value: u32) {
    buf.put_u32_le(value);
}

/// Write an IEEE-754 single precision value as four little-endian bytes.
pub fn write_f32<B: BufMut>(buf: &mut B, value: f32) {
    write_u32_le(buf, value.to_bits());
}

/// Write raw ASCII text without a terminator.
pub fn write_string<B: BufMut>(buf: &mut B, text: &str) {
    buf.put_slice(text.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(f: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
        let mut out = Vec::new();
        f(&mut out);
        out
    }

    #[test]
    fn test_unsigned_vb_boundaries() {
        assert_eq!(encoded(|b| write_unsigned_vb(b, 0)), vec![0x00]);
        assert_eq!(encoded(|b| write_unsigned_vb(b, 127)), vec![0x7F]);
        assert_eq!(encoded(|b| write_unsigned_vb(b, 128)), vec![0x80, 0x01]);
        assert_eq!(encoded(|b| write_unsigned_vb(b, 300)), vec![0xAC, 0x02]);
    }

    #[test]
    fn test_unsigned_vb_max_is_five_bytes() {
        assert_eq!(
            encoded(|b| write_unsigned_vb(b, u32::MAX)),
            vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]
        );
    }

    #[test]
    fn test_zigzag_mapping() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(-2), 3);
        assert_eq!(zigzag_encode(i32::MAX), u32::MAX - 1);
        assert_eq!(zigzag_encode(i32::MIN), u32::MAX);
    }

    #[test]
    fn test_signed_vb() {
        assert_eq!(encoded(|b| write_signed_vb(b, 0)), vec![0x00]);
        assert_eq!(encoded(|b| write_signed_vb(b, -1)), vec![0x01]);
        assert_eq!(encoded(|b| write_signed_vb(b, -64)), vec![0x7F]);
        assert_eq!(encoded(|b| write_signed_vb(b, 64)), vec![0x80, 0x01]);
        assert_eq!(encoded(|b| write_signed_vb(b, i32::MIN)).len(), 5);
    }

    #[test]
    fn test_neg_14bit() {
        // vbat 20 units below the reference
        assert_eq!(encoded(|b| write_neg_14bit(b, -20)), vec![20]);
        // vbat above the reference wraps into the top of the 14-bit range
        assert_eq!(encoded(|b| write_neg_14bit(b, 5)), vec![0xFB, 0x7F]);
    }

    #[test]
    fn test_tag2_3s32_all_zero_is_single_byte() {
        assert_eq!(encoded(|b| write_tag2_3s32(b, &[0, 0, 0])), vec![0x00]);
    }

    #[test]
    fn test_tag2_3s32_two_bit_class() {
        assert_eq!(encoded(|b| write_tag2_3s32(b, &[1, -1, -2])), vec![0x1E]);
    }

    #[test]
    fn test_tag2_3s32_four_bit_class() {
        assert_eq!(encoded(|b| write_tag2_3s32(b, &[3, 0, -1])), vec![0x43, 0x0F]);
    }

    #[test]
    fn test_tag2_3s32_value_over_four_bits_leaves_four_bit_class() {
        let out = encoded(|b| write_tag2_3s32(b, &[10, -9, 0]));
        assert_eq!(out, vec![0x8A, 0xF7, 0x00]);
        assert_eq!(out[0] >> 6, 2, "selector should be the 6-bit class");
    }

    #[test]
    fn test_tag2_3s32_value_over_six_bits_uses_fallback() {
        let out = encoded(|b| write_tag2_3s32(b, &[100, 0, -200]));
        assert_eq!(out, vec![0xD0, 0x64, 0x00, 0x38, 0xFF]);

        let out = encoded(|b| write_tag2_3s32(b, &[40, 0, 0]));
        assert_eq!(out, vec![0xC0, 0x28, 0x00, 0x00]);
    }

    #[test]
    fn test_tag2_3s32_fallback_full_width() {
        let out = encoded(|b| write_tag2_3s32(b, &[0, 0, i32::MIN]));
        assert_eq!(out, vec![0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80]);
    }

    #[test]
    fn test_tag8_4s16_all_zero() {
        assert_eq!(encoded(|b| write_tag8_4s16(b, &[0, 0, 0, 0])), vec![0x00]);
    }

    #[test]
    fn test_tag8_4s16_nibbles() {
        assert_eq!(encoded(|b| write_tag8_4s16(b, &[1, 0, 0, 0])), vec![0x01, 0x10]);
        assert_eq!(encoded(|b| write_tag8_4s16(b, &[1, 2, 0, 0])), vec![0x05, 0x12]);
    }

    #[test]
    fn test_tag8_4s16_unaligned_byte() {
        assert_eq!(
            encoded(|b| write_tag8_4s16(b, &[1, 100, 0, 0])),
            vec![0x09, 0x16, 0x40]
        );
    }

    #[test]
    fn test_tag8_4s16_mixed_widths() {
        assert_eq!(
            encoded(|b| write_tag8_4s16(b, &[100, -3, 0, 1000])),
            vec![0xC6, 0x64, 0xD0, 0x3E, 0x80]
        );
    }

    #[test]
    fn test_tag8_4s16_aligned_sixteen_bit_is_big_endian() {
        assert_eq!(
            encoded(|b| write_tag8_4s16(b, &[-1000, 0, 0, 0])),
            vec![0x03, 0xFC, 0x18]
        );
    }

    #[test]
    fn test_tag8_8svb_single_value_has_no_header() {
        assert_eq!(encoded(|b| write_tag8_8svb(b, &[5])), vec![0x0A]);
    }

    #[test]
    fn test_tag8_8svb_presence_mask() {
        assert_eq!(
            encoded(|b| write_tag8_8svb(b, &[0, 3, 0, -1])),
            vec![0x0A, 0x06, 0x01]
        );
        assert_eq!(encoded(|b| write_tag8_8svb(b, &[0, 0])), vec![0x00]);
        assert!(encoded(|b| write_tag8_8svb(b, &[])).is_empty());
    }

    #[test]
    fn test_fixed_width_helpers() {
        assert_eq!(encoded(|b| write_u32_le(b, 0x1234_5678)), vec![0x78, 0x56, 0x34, 0x12]);
        assert_eq!(encoded(|b| write_f32(b, 1.0)), vec![0x00, 0x00, 0x80, 0x3F]);
        assert_eq!(encoded(|b| write_string(b, "H ")), b"H ".to_vec());
    }
}
