use crate::isp::{
    error::ValidationError,
    helpers::{exact_log2, pack_bytes_reversed, unpack_bytes_reversed},
};

/// Points per gamma curve.
pub const GAMMA_POINTS: usize = 16;
/// Input range covered by a curve; the last point sits on it.
pub const GAMMA_X_END: u16 = 256;
const MAX_INTERVAL_LOG2: u32 = 7;
const X_BITS: u32 = 3;
const X_PER_WORD: usize = 8;

/// Gamma channel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GammaChannel {
    R,
    G,
    B,
}

impl GammaChannel {
    pub const ALL: [GammaChannel; 3] = [GammaChannel::R, GammaChannel::G, GammaChannel::B];
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GammaPoint {
    pub x: u16,
    pub y: u8,
}

impl GammaPoint {
    pub const fn new(x: u16, y: u8) -> Self {
        Self { x, y }
    }
}

/// Piecewise-linear curve of 16 segment end points.
///
/// Every segment length `x[i] - x[i-1]` (with `x[-1] = 0`) must be a power of two no larger
/// than 128, and the last point must sit on x = 256.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GammaCurve {
    pub points: [GammaPoint; GAMMA_POINTS],
}

impl GammaCurve {
    pub const fn new(points: [GammaPoint; GAMMA_POINTS]) -> Self {
        Self { points }
    }

    /// Identity curve with 16 equal segments.
    pub fn linear() -> Self {
        Self::from_fn(|x| x.min(255) as u8)
    }

    /// Curve sampled from `f` at 16 equal segments.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(u16) -> u8,
    {
        let points = core::array::from_fn(|i| {
            let x = ((i + 1) * 16) as u16;
            GammaPoint::new(x, f(x))
        });
        Self { points }
    }
}

/// Register words for one channel: `GAMMA_xX0..1` and `GAMMA_xY0..3`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GammaWords {
    pub x: [u32; 2],
    pub y: [u32; 4],
}

/// Encodes a gamma curve into its x (segment length exponent) and y words.
///
/// # Errors
/// `InvalidCurve { index }` names the first point whose segment breaks the power-of-two
/// rule, or point 15 if the curve does not end at 256.
pub fn encode_gamma_curve(curve: &GammaCurve) -> Result<GammaWords, ValidationError> {
    let last = GAMMA_POINTS - 1;
    if curve.points[last].x != GAMMA_X_END {
        return Err(ValidationError::InvalidCurve { index: last });
    }

    let mut words = GammaWords::default();
    let mut prev: i32 = 0;
    for (i, point) in curve.points.iter().enumerate() {
        let end = if i == last {
            GAMMA_X_END as i32
        } else {
            point.x as i32
        };
        let delta = end - prev;
        let log2 = u32::try_from(delta)
            .ok()
            .and_then(exact_log2)
            .filter(|l| *l <= MAX_INTERVAL_LOG2)
            .ok_or(ValidationError::InvalidCurve { index: i })?;

        words.x[i / X_PER_WORD] |= log2 << (X_BITS * (7 - (i % X_PER_WORD)) as u32);
        prev = end;
    }

    let y: [u8; GAMMA_POINTS] = core::array::from_fn(|i| curve.points[i].y);
    pack_bytes_reversed(&y, &mut words.y);
    Ok(words)
}

/// Rebuilds the curve encoded in `words`.
pub fn decode_gamma_curve(words: &GammaWords) -> GammaCurve {
    let mut y = [0u8; GAMMA_POINTS];
    unpack_bytes_reversed(&words.y, &mut y);

    let mut x: u16 = 0;
    let points = core::array::from_fn(|i| {
        let shift = X_BITS * (7 - (i % X_PER_WORD)) as u32;
        let log2 = (words.x[i / X_PER_WORD] >> shift) & 0b111;
        x += 1 << log2;
        GammaPoint::new(x, y[i])
    });
    GammaCurve { points }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic curves built from segment exponents that sum to 256.
    fn curves() -> impl Iterator<Item = GammaCurve> {
        const LAYOUTS: [[u8; GAMMA_POINTS]; 4] = [
            [4; GAMMA_POINTS],
            [7, 6, 4, 3, 3, 2, 2, 2, 2, 2, 2, 1, 1, 1, 0, 0],
            [0, 0, 1, 2, 3, 4, 5, 6, 4, 4, 4, 4, 4, 4, 4, 4],
            [3, 3, 3, 3, 3, 3, 3, 3, 5, 5, 5, 5, 4, 4, 4, 4],
        ];
        LAYOUTS.into_iter().enumerate().map(|(seed, layout)| {
            let mut x = 0u16;
            let points = core::array::from_fn(|i| {
                x += 1 << layout[i];
                let y = ((i * 37 + seed * 11) % 256) as u8;
                GammaPoint::new(x, y)
            });
            GammaCurve { points }
        })
    }

    #[test]
    fn round_trip_preserves_curves() {
        for curve in curves() {
            assert_eq!(curve.points[GAMMA_POINTS - 1].x, 256);
            let words = encode_gamma_curve(&curve).unwrap();
            assert_eq!(decode_gamma_curve(&words), curve);
        }
    }

    #[test]
    fn linear_curve_encoding() {
        let words = encode_gamma_curve(&GammaCurve::linear()).unwrap();
        // log2(16) = 4 in every 3-bit slot
        assert_eq!(words.x, [0o44444444, 0o44444444]);
        assert_eq!(words.y[0], 0x1020_3040);
        assert_eq!(words.y[3], 0xD0E0_F0FF);
    }

    #[test]
    fn rejection_scenarios() {
        // Interval that is not a power of two
        {
            let mut curve = GammaCurve::linear();
            curve.points[3].x = 63;
            assert_eq!(
                encode_gamma_curve(&curve),
                Err(ValidationError::InvalidCurve { index: 3 })
            );
        }

        // Interval of 256 exceeds the 3-bit exponent
        {
            let mut curve = GammaCurve::linear();
            curve.points[0].x = 256;
            assert_eq!(
                encode_gamma_curve(&curve),
                Err(ValidationError::InvalidCurve { index: 0 })
            );
        }

        // Curve that stops short of 256
        {
            let mut curve = GammaCurve::linear();
            curve.points[15].x = 240;
            assert_eq!(
                encode_gamma_curve(&curve),
                Err(ValidationError::InvalidCurve { index: 15 })
            );
        }

        // Non-increasing x
        {
            let mut curve = GammaCurve::linear();
            curve.points[5].x = curve.points[4].x;
            assert_eq!(
                encode_gamma_curve(&curve),
                Err(ValidationError::InvalidCurve { index: 5 })
            );
        }

        // Deltas reach 256 one point early
        {
            let mut curve = GammaCurve::linear();
            curve.points[13].x = 240;
            curve.points[14].x = 256;
            assert_eq!(
                encode_gamma_curve(&curve),
                Err(ValidationError::InvalidCurve { index: 15 })
            );
        }
    }
}
