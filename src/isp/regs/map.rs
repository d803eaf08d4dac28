//! ISP register offsets and field layouts.
//!
//! Offsets, widths and reset values follow the published ISP register map; they are a
//! hardware contract and must stay bit-exact.

use crate::isp::regs::{Field, Reg};

/// Size of the ISP register block in bytes.
pub const ISP_BLOCK_SIZE: usize = 0x244;
/// Number of 32-bit words in the ISP register block.
pub const ISP_WORDS: usize = ISP_BLOCK_SIZE / 4;

// Global control

pub const CLK_EN: Reg = Reg::at(0x04);
pub const CLK_EN_ALL: Field = Field::new("clk_en", CLK_EN, 0, 1);
pub const CLK_AE_FORCE_ON: Field = Field::new("clk_ae_force_on", CLK_EN, 13, 1);
pub const CLK_AF_FORCE_ON: Field = Field::new("clk_af_force_on", CLK_EN, 14, 1);
pub const CLK_AWB_FORCE_ON: Field = Field::new("clk_awb_force_on", CLK_EN, 15, 1);
pub const CLK_HIST_FORCE_ON: Field = Field::new("clk_hist_force_on", CLK_EN, 16, 1);

pub const CNTL: Reg = Reg::at(0x08);
pub const CNTL_MIPI_DATA_EN: Field = Field::new("mipi_data_en", CNTL, 0, 1);
pub const CNTL_ISP_EN: Field = Field::new("isp_en", CNTL, 1, 1);
pub const CNTL_BF_EN: Field = Field::new("bf_en", CNTL, 4, 1);
pub const CNTL_CCM_EN: Field = Field::new("ccm_en", CNTL, 8, 1);
pub const CNTL_GAMMA_EN: Field = Field::new("gamma_en", CNTL, 9, 1);
pub const CNTL_AE_EN: Field = Field::new("ae_en", CNTL, 14, 1);
pub const CNTL_AF_EN: Field = Field::new("af_en", CNTL, 15, 1);
pub const CNTL_AWB_EN: Field = Field::new("awb_en", CNTL, 16, 1);
pub const CNTL_HIST_EN: Field = Field::new("hist_en", CNTL, 17, 1);
pub const CNTL_DATA_TYPE: Field = Field::new("isp_data_type", CNTL, 25, 2);
pub const CNTL_IN_SRC: Field = Field::new("isp_in_src", CNTL, 27, 2);
pub const CNTL_OUT_TYPE: Field = Field::new("isp_out_type", CNTL, 29, 3);

pub const FRAME_CFG: Reg = Reg::at(0x10);
pub const FRAME_VADR_NUM: Field = Field::new("vadr_num", FRAME_CFG, 0, 12);
pub const FRAME_HADR_NUM: Field = Field::new("hadr_num", FRAME_CFG, 12, 12);
pub const FRAME_BAYER_MODE: Field = Field::new("bayer_mode", FRAME_CFG, 27, 2);
pub const FRAME_HSYNC_START_EXIST: Field = Field::new("hsync_start_exist", FRAME_CFG, 29, 1);
pub const FRAME_HSYNC_END_EXIST: Field = Field::new("hsync_end_exist", FRAME_CFG, 30, 1);

pub const YUV_FORMAT: Reg = Reg::at(0x234);
pub const YUV_MODE: Field = Field::new("yuv_mode", YUV_FORMAT, 0, 1);
pub const YUV_RANGE: Field = Field::new("yuv_range", YUV_FORMAT, 1, 1);

// Color correction

/// `CCM_COEF0, 1, 3, 4, 5`: two 13-bit coefficients per word, the last word holds one.
pub const CCM_COEF: [Reg; 5] = [
    Reg::at(0x14),
    Reg::at(0x18),
    Reg::at(0x1c),
    Reg::at(0x20),
    Reg::at(0x24),
];
/// Width of one sign-magnitude coefficient field.
pub const CCM_COEF_WIDTH: u8 = 13;

// Bayer denoise filter

pub const BF_MATRIX_CTRL: Reg = Reg::at(0x28);
pub const BF_PADDING_DATA: Field = Field::new("bf_padding_data", BF_MATRIX_CTRL, 16, 8);
pub const BF_PADDING_MODE: Field = Field::new("bf_padding_mode", BF_MATRIX_CTRL, 24, 1);
pub const BF_SIGMA: Reg = Reg::at(0x2c);
pub const BF_SIGMA_FIELD: Field = Field::new("sigma", BF_SIGMA, 0, 6);
pub const BF_GAU0: Reg = Reg::at(0x30);
pub const BF_GAU1: Reg = Reg::at(0x34);

// Interrupts

pub const INT_RAW: Reg = Reg::at(0x64);
pub const INT_ST: Reg = Reg::at(0x68);
pub const INT_ENA: Reg = Reg::at(0x6c);
pub const INT_CLR: Reg = Reg::at(0x70);

// Gamma

pub const GAMMA_CTRL: Reg = Reg::at(0x74);
pub const GAMMA_UPDATE: Field = Field::new("gamma_update", GAMMA_CTRL, 0, 1);

/// Declares the y (4 words) and x (2 words) register runs of each gamma channel.
macro_rules! gamma_channel_regs {
    ($($ch:ident => y: $y:literal, x: $x:literal);* $(;)?) => {
        paste::paste! {
            $(
                #[doc = "First of four `GAMMA_" $ch "Y` words."]
                pub const [<GAMMA_ $ch Y>]: Reg = Reg::at($y);
                #[doc = "First of two `GAMMA_" $ch "X` words."]
                pub const [<GAMMA_ $ch X>]: Reg = Reg::at($x);
            )*
        }
    };
}

gamma_channel_regs! {
    R => y: 0x78, x: 0xa8;
    G => y: 0x88, x: 0xb0;
    B => y: 0x98, x: 0xb8;
}

// Auto exposure

pub const AE_CTRL: Reg = Reg::at(0xc0);
pub const AE_UPDATE: Field = Field::new("ae_update", AE_CTRL, 0, 1);
pub const AE_SELECT: Field = Field::new("ae_select", AE_CTRL, 1, 1);
pub const AE_MONITOR: Reg = Reg::at(0xc4);
pub const AE_MONITOR_TL: Field = Field::new("ae_monitor_tl", AE_MONITOR, 0, 8);
pub const AE_MONITOR_TH: Field = Field::new("ae_monitor_th", AE_MONITOR, 8, 8);
pub const AE_MONITOR_PERIOD: Field = Field::new("ae_monitor_period", AE_MONITOR, 16, 6);
pub const AE_BX: Reg = Reg::at(0xc8);
pub const AE_X_BSIZE: Field = Field::new("ae_x_bsize", AE_BX, 0, 11);
pub const AE_X_START: Field = Field::new("ae_x_start", AE_BX, 11, 11);
pub const AE_BY: Reg = Reg::at(0xcc);
pub const AE_Y_BSIZE: Field = Field::new("ae_y_bsize", AE_BY, 0, 11);
pub const AE_Y_START: Field = Field::new("ae_y_start", AE_BY, 11, 11);
pub const AE_WINPIXNUM: Reg = Reg::at(0xd0);
pub const AE_SUBWIN_PIXNUM: Field = Field::new("ae_subwin_pixnum", AE_WINPIXNUM, 0, 17);
pub const AE_WIN_RECIPROCAL: Reg = Reg::at(0xd4);
pub const AE_SUBWIN_RECIP: Field = Field::new("ae_subwin_recip", AE_WIN_RECIPROCAL, 0, 20);
/// First of seven `AE_BLOCK_MEAN` words.
pub const AE_BLOCK_MEAN: Reg = Reg::at(0xd8);
pub const AE_BLOCK_MEAN_WORDS: usize = 7;

// Autofocus

pub const AF_CTRL0: Reg = Reg::at(0x11c);
pub const AF_AUTO_UPDATE: Field = Field::new("af_auto_update", AF_CTRL0, 0, 1);
pub const AF_MANUAL_UPDATE: Field = Field::new("af_manual_update", AF_CTRL0, 4, 1);
pub const AF_ENV_THRESHOLD: Field = Field::new("af_env_threshold", AF_CTRL0, 8, 4);
pub const AF_ENV_PERIOD: Field = Field::new("af_env_period", AF_CTRL0, 16, 8);
pub const AF_CTRL1: Reg = Reg::at(0x120);
pub const AF_THPIXNUM: Field = Field::new("af_thpixnum", AF_CTRL1, 0, 22);
pub const AF_GEN_TH_CTRL: Reg = Reg::at(0x124);
pub const AF_GEN_THRESHOLD_MIN: Field = Field::new("af_gen_threshold_min", AF_GEN_TH_CTRL, 0, 16);
pub const AF_GEN_THRESHOLD_MAX: Field = Field::new("af_gen_threshold_max", AF_GEN_TH_CTRL, 16, 16);
pub const AF_ENV_USER_TH_SUM: Reg = Reg::at(0x128);
pub const AF_ENV_USER_THRESHOLD_SUM: Field =
    Field::new("af_env_user_threshold_sum", AF_ENV_USER_TH_SUM, 0, 32);
pub const AF_ENV_USER_TH_LUM: Reg = Reg::at(0x12c);
pub const AF_ENV_USER_THRESHOLD_LUM: Field =
    Field::new("af_env_user_threshold_lum", AF_ENV_USER_TH_LUM, 0, 30);
pub const AF_THRESHOLD: Reg = Reg::at(0x130);
pub const AF_THRESHOLD_FIELD: Field = Field::new("af_threshold", AF_THRESHOLD, 0, 16);
pub const AF_SUM_FIELD_WIDTH: u8 = 30;
pub const AF_LUM_FIELD_WIDTH: u8 = 28;

/// Registers belonging to one autofocus window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AfWindowRegs {
    pub hscale: Reg,
    pub vscale: Reg,
    pub sum: Field,
    pub lum: Field,
}

macro_rules! af_window_regs {
    ($($w:ident => $h:literal, $v:literal, $sum:literal, $lum:literal);* $(;)?) => {
        paste::paste! {
            $(
                pub const [<AF_HSCALE_ $w>]: Reg = Reg::at($h);
                pub const [<AF_VSCALE_ $w>]: Reg = Reg::at($v);
                pub const [<AF_SUM_ $w>]: Reg = Reg::at($sum);
                pub const [<AF_LUM_ $w>]: Reg = Reg::at($lum);
                pub const [<AF_WINDOW_ $w>]: AfWindowRegs = AfWindowRegs {
                    hscale: [<AF_HSCALE_ $w>],
                    vscale: [<AF_VSCALE_ $w>],
                    sum: Field::new(
                        stringify!([<af_sum $w:lower>]),
                        [<AF_SUM_ $w>],
                        0,
                        AF_SUM_FIELD_WIDTH,
                    ),
                    lum: Field::new(
                        stringify!([<af_lum $w:lower>]),
                        [<AF_LUM_ $w>],
                        0,
                        AF_LUM_FIELD_WIDTH,
                    ),
                };
            )*
        }
    };
}

af_window_regs! {
    A => 0x134, 0x138, 0x14c, 0x158;
    B => 0x13c, 0x140, 0x150, 0x15c;
    C => 0x144, 0x148, 0x154, 0x160;
}

/// Autofocus windows in hardware order.
pub const AF_WINDOWS: [AfWindowRegs; 3] = [AF_WINDOW_A, AF_WINDOW_B, AF_WINDOW_C];

// Auto white balance

pub const AWB_MODE: Reg = Reg::at(0x164);
pub const AWB_MODE_FIELD: Field = Field::new("awb_mode", AWB_MODE, 0, 2);
pub const AWB_SAMPLE: Field = Field::new("awb_sample", AWB_MODE, 4, 1);
pub const AWB_HSCALE: Reg = Reg::at(0x168);
pub const AWB_VSCALE: Reg = Reg::at(0x16c);
pub const AWB_TH_LUM: Reg = Reg::at(0x170);
pub const AWB_MIN_LUM: Field = Field::new("awb_min_lum", AWB_TH_LUM, 0, 10);
pub const AWB_MAX_LUM: Field = Field::new("awb_max_lum", AWB_TH_LUM, 16, 10);
pub const AWB_TH_RG: Reg = Reg::at(0x174);
pub const AWB_TH_BG: Reg = Reg::at(0x178);
pub const AWB0_WHITE_CNT: Reg = Reg::at(0x17c);
pub const AWB0_WHITE_CNT_FIELD: Field = Field::new("awb0_white_cnt", AWB0_WHITE_CNT, 0, 24);
pub const AWB0_ACC_R: Reg = Reg::at(0x180);
pub const AWB0_ACC_G: Reg = Reg::at(0x184);
pub const AWB0_ACC_B: Reg = Reg::at(0x188);

// Histogram

pub const HIST_MODE: Reg = Reg::at(0x1a4);
pub const HIST_MODE_FIELD: Field = Field::new("hist_mode", HIST_MODE, 0, 3);
pub const HIST_COEFF: Reg = Reg::at(0x1a8);
pub const HIST_COEFF_B: Field = Field::new("hist_coeff_b", HIST_COEFF, 0, 8);
pub const HIST_COEFF_G: Field = Field::new("hist_coeff_g", HIST_COEFF, 8, 8);
pub const HIST_COEFF_R: Field = Field::new("hist_coeff_r", HIST_COEFF, 16, 8);
pub const HIST_OFFS: Reg = Reg::at(0x1ac);
pub const HIST_Y_OFFS: Field = Field::new("hist_y_offs", HIST_OFFS, 0, 12);
pub const HIST_X_OFFS: Field = Field::new("hist_x_offs", HIST_OFFS, 16, 12);
pub const HIST_SIZE: Reg = Reg::at(0x1b0);
pub const HIST_Y_SIZE: Field = Field::new("hist_y_size", HIST_SIZE, 0, 9);
pub const HIST_X_SIZE: Field = Field::new("hist_x_size", HIST_SIZE, 16, 9);
/// First of four `HIST_SEG` words.
pub const HIST_SEG: Reg = Reg::at(0x1b4);
/// First of seven `HIST_WEIGHT` words.
pub const HIST_WEIGHT: Reg = Reg::at(0x1c4);
/// First of sixteen `HIST_BIN` words.
pub const HIST_BIN: Reg = Reg::at(0x1e0);
pub const HIST_BIN_WIDTH: u8 = 17;
pub const HIST_BINS: usize = 16;

/// Power-on values of the registers the driver relies on.
pub const RESET_VALUES: &[(Reg, u32)] = &[
    // isp_out_type = RGB888
    (CNTL, 2 << 29),
    // last segment correction enabled on all channels
    (GAMMA_CTRL, 0b1110),
    (AF_THRESHOLD, 256),
    (AF_GEN_TH_CTRL, (1088 << 16) | 128),
    (AF_HSCALE_A, (1 << 16) | 128),
    (AF_VSCALE_A, (1 << 16) | 128),
    (AF_HSCALE_B, (1 << 16) | 128),
    (AF_VSCALE_B, (1 << 16) | 128),
    (AF_HSCALE_C, (1 << 16) | 128),
    (AF_VSCALE_C, (1 << 16) | 128),
    (AWB_MODE, 3),
    (HIST_MODE, 4),
    (HIST_COEFF, (85 << 16) | (85 << 8) | 85),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn af_windows_are_distinct_register_groups() {
        for (i, a) in AF_WINDOWS.iter().enumerate() {
            for b in AF_WINDOWS.iter().skip(i + 1) {
                assert_ne!(a.hscale, b.hscale);
                assert_ne!(a.vscale, b.vscale);
            }
        }
        assert_eq!(AF_WINDOW_B.sum.name(), "af_sumb");
        assert_eq!(AF_WINDOW_C.lum.reg(), AF_LUM_C);
    }

    #[test]
    fn register_runs_stay_inside_block() {
        assert!(HIST_BIN.nth(HIST_BINS - 1).index() < ISP_WORDS);
        assert_eq!(GAMMA_BY.nth(3).offset(), 0xa4);
        assert_eq!(GAMMA_BX.nth(1).offset(), 0xbc);
        assert_eq!(AE_BLOCK_MEAN.nth(AE_BLOCK_MEAN_WORDS - 1).offset(), 0xf0);
    }
}
