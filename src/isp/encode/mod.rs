//! Pure translation from configuration values to register words.
//!
//! Nothing in this module touches a [`RegisterBlock`](crate::isp::regs::RegisterBlock): every
//! encoder validates its whole input and returns the words, so a rejected value can never
//! leave a half-written configuration behind.

pub mod ccm;
pub mod denoise;
pub mod gamma;
pub mod hist;
pub mod ratio;
pub mod window;

pub use ccm::{CCM_WORDS, CcmMatrix, decode_ccm, encode_ccm};
pub use denoise::{DenoiseTemplate, decode_denoise_template, encode_denoise_template};
pub use gamma::{
    GAMMA_POINTS, GammaChannel, GammaCurve, GammaPoint, GammaWords, decode_gamma_curve,
    encode_gamma_curve,
};
pub use hist::{
    AE_BLOCKS, HIST_SEGMENTS, HIST_WEIGHTS, LumaCoefficients, decode_block_means,
    decode_histogram_segments, decode_histogram_weights, encode_histogram_segments,
    encode_histogram_weights, encode_luma_coefficients,
};
pub use ratio::{RatioRange, decode_ratio_range, encode_ratio_range};
pub use window::{
    Point, WINDOW_COORD_LIMIT, WindowGeometry, WindowWords, decode_window, encode_window,
};
