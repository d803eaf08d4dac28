//! Fixed-point conversions used by the ISP registers.

use crate::isp::error::ValidationError;

/// Rounds half away from zero; `core` has no `f32::round`.
#[inline]
pub(crate) fn round_half_away(v: f32) -> i64 {
    if v >= 0.0 {
        (v + 0.5) as i64
    } else {
        (v - 0.5) as i64
    }
}

/// Unsigned Q2.8 ratio in `[0, 4)`, used for AWB R/G and B/G thresholds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ratio(u16);

impl Ratio {
    pub const FRAC_BITS: u32 = 8;
    pub const WIDTH: u32 = 10;
    pub const ONE: Ratio = Ratio(1 << Self::FRAC_BITS);
    pub const MAX: Ratio = Ratio((1 << Self::WIDTH) - 1);

    /// Converts a real ratio, rounding to the nearest step.
    ///
    /// Values that round up to 4.0 saturate at [`Ratio::MAX`].
    pub fn from_f32(value: f32) -> Result<Self, ValidationError> {
        if !(0.0..4.0).contains(&value) {
            return Err(ValidationError::InvalidRatio);
        }
        let raw = round_half_away(value * (1 << Self::FRAC_BITS) as f32);
        Ok(Self(raw.min(Self::MAX.0 as i64) as u16))
    }

    /// Wraps raw register bits; `None` if wider than 10 bits.
    pub const fn from_bits(bits: u16) -> Option<Self> {
        if bits > Self::MAX.0 {
            None
        } else {
            Some(Self(bits))
        }
    }

    #[inline]
    pub const fn to_bits(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / (1 << Self::FRAC_BITS) as f32
    }
}

/// Width of a signed Q2.10 coefficient: sign, 2 integer bits, 10 fraction bits.
pub const Q2_10_WIDTH: u32 = 13;
const Q2_10_FRAC: u32 = 10;
const Q2_10_SIGN: u16 = 1 << (Q2_10_WIDTH - 1);
const Q2_10_MAGNITUDE: i64 = (Q2_10_SIGN as i64) - 1;

/// Encodes a coefficient as 13-bit sign-magnitude Q2.10: sign in bit 12, magnitude below.
///
/// Magnitudes above 4095/1024 clamp when `saturate` is set and otherwise keep only their
/// low 12 bits. Returns `None` for NaN and infinities.
pub fn q2_10_from_f32(value: f32, saturate: bool) -> Option<u16> {
    if !value.is_finite() {
        return None;
    }
    let raw = round_half_away(value * (1 << Q2_10_FRAC) as f32);
    let negative = raw < 0;
    let magnitude = if negative { -raw } else { raw };
    let magnitude = if saturate {
        magnitude.min(Q2_10_MAGNITUDE)
    } else {
        magnitude & Q2_10_MAGNITUDE
    };
    let sign = if negative && magnitude != 0 { Q2_10_SIGN } else { 0 };
    Some(sign | magnitude as u16)
}

/// Decodes 13-bit sign-magnitude Q2.10.
pub fn q2_10_to_f32(bits: u16) -> f32 {
    let magnitude = (bits & Q2_10_MAGNITUDE as u16) as f32 / (1 << Q2_10_FRAC) as f32;
    if bits & Q2_10_SIGN != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Encodes an autofocus environment ratio as Q0.4 in `(0, 1)`.
///
/// Zero is rejected: with the absolute thresholds cleared it would disable detection.
pub fn q0_4_from_f32(value: f32) -> Result<u8, ValidationError> {
    if !(value > 0.0 && value < 1.0) {
        return Err(ValidationError::InvalidRatio);
    }
    let raw = round_half_away(value * 16.0).clamp(0, 15) as u8;
    if raw == 0 {
        return Err(ValidationError::InvalidRatio);
    }
    Ok(raw)
}
