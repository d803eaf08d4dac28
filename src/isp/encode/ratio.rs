use crate::isp::{error::ValidationError, fixed::Ratio};

const MAX_SHIFT: u32 = 16;
const RATIO_MASK: u32 = (1 << Ratio::WIDTH) - 1;

/// Inclusive ratio interval, e.g. an R/G white-patch bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioRange {
    pub min: f32,
    pub max: f32,
}

impl RatioRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// Packs a ratio interval: min in bits 0..9, max in bits 16..25, both Q2.8.
pub fn encode_ratio_range(min: f32, max: f32) -> Result<u32, ValidationError> {
    let lo = Ratio::from_f32(min)?;
    let hi = Ratio::from_f32(max)?;
    if min > max {
        return Err(ValidationError::InvalidRange);
    }
    Ok(lo.to_bits() as u32 | ((hi.to_bits() as u32) << MAX_SHIFT))
}

/// Unpacks `(min, max)` from a word produced by [`encode_ratio_range`].
pub fn decode_ratio_range(word: u32) -> (f32, f32) {
    let lo = (word & RATIO_MASK) as f32 / 256.0;
    let hi = ((word >> MAX_SHIFT) & RATIO_MASK) as f32 / 256.0;
    (lo, hi)
}
