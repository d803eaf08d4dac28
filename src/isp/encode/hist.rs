use crate::isp::{
    error::ValidationError,
    helpers::{pack_bytes_reversed, unpack_bytes_reversed},
};

/// Sub-window weights, one per block of the 5×5 grid.
pub const HIST_WEIGHTS: usize = 25;
/// Bin boundaries between the 16 histogram bins.
pub const HIST_SEGMENTS: usize = 15;
/// Auto-exposure block means, one per block of the 5×5 grid.
pub const AE_BLOCKS: usize = 25;

const WEIGHT_TOTAL: u32 = 256;

/// Packs sub-window weights into seven `HIST_WEIGHT` words.
///
/// The weights must sum to 256.
pub fn encode_histogram_weights(
    weights: &[u8; HIST_WEIGHTS],
) -> Result<[u32; 7], ValidationError> {
    let sum: u32 = weights.iter().map(|&w| w as u32).sum();
    if sum != WEIGHT_TOTAL {
        return Err(ValidationError::InvalidWeights);
    }
    let mut words = [0u32; 7];
    pack_bytes_reversed(weights, &mut words);
    Ok(words)
}

pub fn decode_histogram_weights(words: &[u32; 7]) -> [u8; HIST_WEIGHTS] {
    let mut weights = [0u8; HIST_WEIGHTS];
    unpack_bytes_reversed(words, &mut weights);
    weights
}

/// Packs bin boundaries into four `HIST_SEG` words.
///
/// Boundaries must be strictly increasing.
pub fn encode_histogram_segments(
    segments: &[u8; HIST_SEGMENTS],
) -> Result<[u32; 4], ValidationError> {
    if segments.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(ValidationError::InvalidSegments);
    }
    let mut words = [0u32; 4];
    pack_bytes_reversed(segments, &mut words);
    Ok(words)
}

pub fn decode_histogram_segments(words: &[u32; 4]) -> [u8; HIST_SEGMENTS] {
    let mut segments = [0u8; HIST_SEGMENTS];
    unpack_bytes_reversed(words, &mut segments);
    segments
}

/// Unpacks the 25 block means from the seven `AE_BLOCK_MEAN` words.
pub fn decode_block_means(words: &[u32; 7]) -> [u8; AE_BLOCKS] {
    let mut means = [0u8; AE_BLOCKS];
    unpack_bytes_reversed(words, &mut means);
    means
}

/// RGB to luminance weights used by the histogram in weighted-Y mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LumaCoefficients {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for LumaCoefficients {
    fn default() -> Self {
        Self {
            r: 85,
            g: 85,
            b: 86,
        }
    }
}

/// Packs the coefficients into `HIST_COEFF`: b in bits 0..7, g in 8..15, r in 16..23.
///
/// The coefficients must sum to 256.
pub fn encode_luma_coefficients(coeff: &LumaCoefficients) -> Result<u32, ValidationError> {
    let sum = coeff.r as u32 + coeff.g as u32 + coeff.b as u32;
    if sum != WEIGHT_TOTAL {
        return Err(ValidationError::InvalidLumaCoefficients);
    }
    Ok(coeff.b as u32 | ((coeff.g as u32) << 8) | ((coeff.r as u32) << 16))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_weights() -> [u8; HIST_WEIGHTS] {
        // 24 blocks of 10 plus one of 16
        let mut w = [10u8; HIST_WEIGHTS];
        w[12] = 16;
        w
    }

    #[test]
    fn weights_scenarios() {
        let weights = uniform_weights();
        let words = encode_histogram_weights(&weights).unwrap();
        assert_eq!(words[0], 0x0A0A_0A0A);
        // Block 12 is the first byte of word 3
        assert_eq!(words[3], 0x100A_0A0A);
        assert_eq!(words[6], 0x0A00_0000);
        assert_eq!(decode_histogram_weights(&words), weights);

        let mut short = weights;
        short[0] = 9;
        assert_eq!(
            encode_histogram_weights(&short),
            Err(ValidationError::InvalidWeights)
        );
    }

    #[test]
    fn segments_scenarios() {
        let segments: [u8; HIST_SEGMENTS] = core::array::from_fn(|i| ((i + 1) * 16) as u8);
        let words = encode_histogram_segments(&segments).unwrap();
        assert_eq!(words[0], 0x1020_3040);
        assert_eq!(decode_histogram_segments(&words), segments);

        let mut flat = segments;
        flat[7] = flat[6];
        assert_eq!(
            encode_histogram_segments(&flat),
            Err(ValidationError::InvalidSegments)
        );
    }

    #[test]
    fn block_means_use_reversed_bytes() {
        let words = [0x0102_0304, 0, 0, 0, 0, 0, 0x1900_0000];
        let means = decode_block_means(&words);
        assert_eq!(&means[..4], &[1, 2, 3, 4]);
        assert_eq!(means[24], 0x19);
    }

    #[test]
    fn luma_coefficients_scenarios() {
        assert_eq!(
            encode_luma_coefficients(&LumaCoefficients::default()),
            Ok(86 | (85 << 8) | (85 << 16))
        );
        assert_eq!(
            encode_luma_coefficients(&LumaCoefficients { r: 77, g: 150, b: 30 }),
            Err(ValidationError::InvalidLumaCoefficients)
        );
    }
}
