use crate::isp::{
    error::ValidationError,
    fixed::{q2_10_from_f32, q2_10_to_f32},
    regs::map::CCM_COEF_WIDTH,
};

/// Number of `CCM_COEF` words.
pub const CCM_WORDS: usize = 5;
const COEF_SHIFT: u32 = CCM_COEF_WIDTH as u32;
const COEF_MASK: u32 = (1 << COEF_SHIFT) - 1;

/// 3×3 color correction matrix, row-major (`rr rg rb / gr gg gb / br bg bb`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CcmMatrix {
    pub coefficients: [[f32; 3]; 3],
    /// Clamp out-of-range coefficients instead of truncating their bit pattern.
    pub saturate: bool,
}

impl CcmMatrix {
    pub const IDENTITY: CcmMatrix = CcmMatrix {
        coefficients: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        saturate: true,
    };

    pub const fn new(coefficients: [[f32; 3]; 3], saturate: bool) -> Self {
        Self {
            coefficients,
            saturate,
        }
    }
}

impl Default for CcmMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Encodes the matrix as sign-magnitude Q2.10, two coefficients per word.
///
/// Coefficient `k` lands in word `k / 2`, low half first.
pub fn encode_ccm(matrix: &CcmMatrix) -> Result<[u32; CCM_WORDS], ValidationError> {
    let mut words = [0u32; CCM_WORDS];
    for (k, &c) in matrix.coefficients.iter().flatten().enumerate() {
        let bits = q2_10_from_f32(c, matrix.saturate)
            .ok_or(ValidationError::InvalidCoefficient { index: k })?;
        words[k / 2] |= (bits as u32) << ((k % 2) as u32 * COEF_SHIFT);
    }
    Ok(words)
}

/// Rebuilds the coefficients held in the `CCM_COEF` words.
pub fn decode_ccm(words: &[u32; CCM_WORDS]) -> [[f32; 3]; 3] {
    core::array::from_fn(|row| {
        core::array::from_fn(|col| {
            let k = row * 3 + col;
            let bits = (words[k / 2] >> ((k % 2) as u32 * COEF_SHIFT)) & COEF_MASK;
            q2_10_to_f32(bits as u16)
        })
    })
}
