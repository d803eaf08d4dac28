//! Packing helpers shared by the encoders and the statistics readers.
//!
//! Several ISP register arrays store four 8-bit entries per word with the first entry in
//! the most significant byte. These helpers keep that ordering in one place.

/// Byte position of entry `i` inside its word: entry 0 is the most significant byte.
#[inline]
pub const fn reversed_byte_shift(i: usize) -> u32 {
    8 * (3 - (i % 4)) as u32
}

/// Packs 8-bit entries four per word in hardware order.
///
/// `out` must hold at least `values.len().div_ceil(4)` words; entries beyond `values`
/// are left zero.
///
/// # Example
/// ```
/// use embedded_isp::isp::helpers::pack_bytes_reversed;
///
/// let mut out = [0u32; 2];
/// pack_bytes_reversed(&[0x11, 0x22, 0x33, 0x44, 0x55], &mut out);
/// assert_eq!(out, [0x1122_3344, 0x5500_0000]);
/// ```
pub fn pack_bytes_reversed(values: &[u8], out: &mut [u32]) {
    debug_assert!(out.len() * 4 >= values.len(), "output too small");
    out.fill(0);
    for (i, &v) in values.iter().enumerate() {
        if let Some(word) = out.get_mut(i / 4) {
            *word |= (v as u32) << reversed_byte_shift(i);
        }
    }
}

/// Inverse of [`pack_bytes_reversed`]; fills every entry of `out`.
pub fn unpack_bytes_reversed(words: &[u32], out: &mut [u8]) {
    for (i, v) in out.iter_mut().enumerate() {
        *v = words
            .get(i / 4)
            .map(|w| (w >> reversed_byte_shift(i)) as u8)
            .unwrap_or(0);
    }
}

/// Returns `log2(value)` if `value` is a non-zero power of two.
#[inline]
pub const fn exact_log2(value: u32) -> Option<u32> {
    if value != 0 && value.is_power_of_two() {
        Some(value.trailing_zeros())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_order_matches_hardware() {
        // hist_seg_0_1 lives in bits [31:24] of the first word
        let mut out = [0u32; 4];
        let values: [u8; 15] = [
            16, 32, 48, 64, 80, 96, 112, 128, 144, 160, 176, 192, 208, 224, 240,
        ];
        pack_bytes_reversed(&values, &mut out);
        assert_eq!(out[0] >> 24, 16);
        assert_eq!(out[0] & 0xFF, 64);
        assert_eq!(out[3], (208 << 24) | (224 << 16) | (240 << 8));
    }

    #[test]
    fn unpack_inverts_pack() {
        let values: [u8; 25] = core::array::from_fn(|i| (i * 7) as u8);
        let mut words = [0u32; 7];
        pack_bytes_reversed(&values, &mut words);

        let mut back = [0u8; 25];
        unpack_bytes_reversed(&words, &mut back);
        assert_eq!(back, values);
    }

    #[test]
    fn exact_log2_edge_cases() {
        assert_eq!(exact_log2(0), None);
        assert_eq!(exact_log2(1), Some(0));
        assert_eq!(exact_log2(128), Some(7));
        assert_eq!(exact_log2(96), None);
    }
}
