use crate::isp::error::ValidationError;

const CELL_MAX: u8 = 15;

/// 3×3 Gaussian weights of the Bayer denoise filter, each in `0..=15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenoiseTemplate {
    pub cells: [[u8; 3]; 3],
}

impl DenoiseTemplate {
    pub const fn new(cells: [[u8; 3]; 3]) -> Self {
        Self { cells }
    }
}

impl Default for DenoiseTemplate {
    /// Hardware reset template: every cell at 15.
    fn default() -> Self {
        Self {
            cells: [[CELL_MAX; 3]; 3],
        }
    }
}

/// Encodes the template into `BF_GAU0` and `BF_GAU1`.
///
/// Cells `00` through `21` fill `BF_GAU0` as nibbles from the top down; cell `22` sits in
/// the low nibble of `BF_GAU1`.
pub fn encode_denoise_template(template: &DenoiseTemplate) -> Result<[u32; 2], ValidationError> {
    let mut words = [0u32; 2];
    for (row, cells) in template.cells.iter().enumerate() {
        for (col, &cell) in cells.iter().enumerate() {
            if cell > CELL_MAX {
                return Err(ValidationError::InvalidTemplate { row, col });
            }
            let k = row * 3 + col;
            if k < 8 {
                words[0] |= (cell as u32) << (28 - 4 * k as u32);
            } else {
                words[1] = cell as u32;
            }
        }
    }
    Ok(words)
}

/// Rebuilds the template held in `BF_GAU0` and `BF_GAU1`.
pub fn decode_denoise_template(words: &[u32; 2]) -> DenoiseTemplate {
    let cells = core::array::from_fn(|row| {
        core::array::from_fn(|col| {
            let k = row * 3 + col;
            let nibble = if k < 8 {
                words[0] >> (28 - 4 * k as u32)
            } else {
                words[1]
            };
            (nibble & 0xF) as u8
        })
    });
    DenoiseTemplate { cells }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nibble_order_matches_register() {
        let template = DenoiseTemplate::new([[1, 2, 3], [4, 5, 6], [7, 8, 9]]);
        let words = encode_denoise_template(&template).unwrap();
        assert_eq!(words, [0x1234_5678, 0x9]);
        assert_eq!(decode_denoise_template(&words), template);
    }

    #[test]
    fn reset_template_fills_every_nibble() {
        let words = encode_denoise_template(&DenoiseTemplate::default()).unwrap();
        assert_eq!(words, [0xFFFF_FFFF, 0xF]);
    }

    #[test]
    fn oversized_cell_is_reported_by_position() {
        let mut template = DenoiseTemplate::default();
        template.cells[1][2] = 16;
        assert_eq!(
            encode_denoise_template(&template),
            Err(ValidationError::InvalidTemplate { row: 1, col: 2 })
        );
    }
}
