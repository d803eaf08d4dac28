//! Processor configuration validated at enable time.

use crate::isp::error::ValidationError;

/// Largest frame dimension the frame counters accept.
pub const MAX_FRAME_DIM: u32 = 4096;

/// Where pixel data enters the processor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    /// MIPI CSI host.
    #[default]
    Csi,
    /// Parallel camera interface.
    Cam,
    /// Memory via DMA.
    Dma,
}

impl InputSource {
    pub(crate) const fn bits(self) -> u32 {
        match self {
            InputSource::Csi => 0,
            InputSource::Cam => 1,
            InputSource::Dma => 2,
        }
    }
}

/// Pixel formats known to the processor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFormat {
    #[default]
    Raw8,
    Raw10,
    Raw12,
    Rgb565,
    Rgb888,
    Yuv420,
    Yuv422,
}

impl ColorFormat {
    /// `CNTL.isp_data_type` encoding; only RAW formats can be processed.
    pub(crate) fn input_bits(self) -> Result<u32, ValidationError> {
        match self {
            ColorFormat::Raw8 => Ok(0),
            ColorFormat::Raw10 => Ok(1),
            ColorFormat::Raw12 => Ok(2),
            _ => Err(ValidationError::UnsupportedFormat),
        }
    }

    /// `CNTL.isp_out_type` encoding.
    pub(crate) fn output_bits(self) -> Result<u32, ValidationError> {
        match self {
            ColorFormat::Raw8 => Ok(0),
            ColorFormat::Yuv422 => Ok(1),
            ColorFormat::Rgb888 => Ok(2),
            ColorFormat::Yuv420 => Ok(3),
            ColorFormat::Rgb565 => Ok(4),
            ColorFormat::Raw10 | ColorFormat::Raw12 => Err(ValidationError::UnsupportedFormat),
        }
    }
}

/// Color order of the top-left 2×2 Bayer cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BayerOrder {
    Bggr,
    Gbrg,
    Grbg,
    #[default]
    Rggb,
}

impl BayerOrder {
    pub(crate) const fn bits(self) -> u32 {
        match self {
            BayerOrder::Bggr => 0,
            BayerOrder::Gbrg => 1,
            BayerOrder::Grbg => 2,
            BayerOrder::Rggb => 3,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YuvStandard {
    #[default]
    Bt601,
    Bt709,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YuvRange {
    #[default]
    Full,
    Limited,
}

/// Frame resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        let ok = |d: u32| (1..=MAX_FRAME_DIM).contains(&d);
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(ValidationError::InvalidFrameSize)
        }
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(800, 640)
    }
}

/// Whole-pipeline settings applied by [`Processor::enable`](crate::isp::Processor::enable).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub input_source: InputSource,
    pub input_format: ColorFormat,
    pub output_format: ColorFormat,
    pub frame: FrameSize,
    pub bayer_order: BayerOrder,
    pub yuv_standard: YuvStandard,
    pub yuv_range: YuvRange,
}

impl ProcessorConfig {
    /// Checks every field; returns the `(data_type, out_type)` encodings.
    pub(crate) fn validate(&self) -> Result<(u32, u32), ValidationError> {
        let data_type = self.input_format.input_bits()?;
        let out_type = self.output_format.output_bits()?;
        self.frame.validate()?;
        Ok((data_type, out_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ProcessorConfig::default().validate(), Ok((0, 0)));
    }

    #[test]
    fn format_scenarios() {
        let mut cfg = ProcessorConfig {
            input_format: ColorFormat::Raw10,
            output_format: ColorFormat::Yuv420,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Ok((1, 3)));

        // Only RAW input can be processed
        cfg.input_format = ColorFormat::Rgb888;
        assert_eq!(cfg.validate(), Err(ValidationError::UnsupportedFormat));

        // RAW10 and RAW12 have no output encoding
        cfg.input_format = ColorFormat::Raw8;
        cfg.output_format = ColorFormat::Raw12;
        assert_eq!(cfg.validate(), Err(ValidationError::UnsupportedFormat));
    }

    #[test]
    fn frame_size_limits() {
        assert!(FrameSize::new(4096, 1).validate().is_ok());
        assert_eq!(
            FrameSize::new(0, 480).validate(),
            Err(ValidationError::InvalidFrameSize)
        );
        assert_eq!(
            FrameSize::new(640, 4097).validate(),
            Err(ValidationError::InvalidFrameSize)
        );
    }
}
