//! Histogram statistics controller.

use crate::isp::{
    encode::{
        HIST_SEGMENTS, HIST_WEIGHTS, LumaCoefficients, Point, WindowGeometry,
        encode_histogram_segments, encode_histogram_weights, encode_luma_coefficients,
    },
    error::{IspError, ValidationError},
    intr::{EventHandler, IrqInstaller, SubmoduleId},
    processor::Processor,
    regs::{Field, Reg, RegisterBlock, map},
    submodule::Submodule,
};

/// Coordinate bound of the histogram window.
pub const HIST_COORD_MAX: u32 = 4096;
const HIST_GRID: u32 = 5;

/// Source channel the histogram counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum HistMode {
    RawB = 0,
    RawGb = 1,
    RawGr = 2,
    RawR = 3,
    /// Weighted gray from RGB, see [`LumaCoefficients`].
    #[default]
    Rgb = 4,
    YuvY = 5,
    YuvU = 6,
    YuvV = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistConfig {
    pub mode: HistMode,
    /// Split into a 5×5 grid of sub-windows.
    pub window: WindowGeometry,
    pub coefficients: LumaCoefficients,
    /// Boundaries between the 16 bins, strictly increasing.
    pub segments: [u8; HIST_SEGMENTS],
    /// Per sub-window weights, row-major, summing to 256.
    pub weights: [u8; HIST_WEIGHTS],
}

impl Default for HistConfig {
    fn default() -> Self {
        let mut weights = [10u8; HIST_WEIGHTS];
        weights[HIST_WEIGHTS / 2] = 16;
        Self {
            mode: HistMode::default(),
            window: WindowGeometry::new(Point::new(0, 0), Point::new(800, 640)),
            coefficients: LumaCoefficients::default(),
            segments: core::array::from_fn(|i| ((i + 1) * 16) as u8),
            weights,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HistStatistics {
    pub bins: [u32; map::HIST_BINS],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HistWindowWords {
    x_offs: u32,
    y_offs: u32,
    x_size: u32,
    y_size: u32,
}

fn encode_hist_window(window: &WindowGeometry) -> Result<HistWindowWords, ValidationError> {
    window.validate(HIST_COORD_MAX)?;
    let x_size = window.width() / HIST_GRID;
    let y_size = window.height() / HIST_GRID;
    if x_size == 0 || y_size == 0 {
        return Err(ValidationError::InvalidWindow);
    }
    Ok(HistWindowWords {
        x_offs: window.top_left.x,
        y_offs: window.top_left.y,
        x_size: map::HIST_X_SIZE.check(x_size)?,
        y_size: map::HIST_Y_SIZE.check(y_size)?,
    })
}

fn write_window<R: RegisterBlock>(regs: &mut R, w: &HistWindowWords) {
    regs.modify(map::HIST_OFFS, |v| {
        let v = map::HIST_X_OFFS.insert(v, w.x_offs);
        map::HIST_Y_OFFS.insert(v, w.y_offs)
    });
    regs.modify(map::HIST_SIZE, |v| {
        let v = map::HIST_X_SIZE.insert(v, w.x_size);
        map::HIST_Y_SIZE.insert(v, w.y_size)
    });
}

fn write_run<R: RegisterBlock>(regs: &mut R, first: Reg, words: &[u32]) {
    for (i, w) in words.iter().enumerate() {
        regs.write(first.nth(i), *w);
    }
}

const BIN_FIELD: Field = Field::new("hist_bin", map::HIST_BIN, 0, map::HIST_BIN_WIDTH);

/// Exclusive handle on the histogram engine.
pub struct HistController<'a, R: RegisterBlock, I: IrqInstaller> {
    sub: Submodule<'a, R, I>,
}

impl<R: RegisterBlock, I: IrqInstaller> core::fmt::Debug for HistController<'_, R, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HistController")
            .field("enabled", &self.sub.is_enabled())
            .finish_non_exhaustive()
    }
}

impl<'a, R: RegisterBlock, I: IrqInstaller> HistController<'a, R, I> {
    pub fn new(isp: &'a Processor<R, I>, config: HistConfig) -> Result<Self, IspError> {
        let sub = Submodule::claim(isp, SubmoduleId::Hist)?;
        let window = encode_hist_window(&config.window)?;
        let coeff = encode_luma_coefficients(&config.coefficients)?;
        let segments = encode_histogram_segments(&config.segments)?;
        let weights = encode_histogram_weights(&config.weights)?;
        isp.with_registers_mut(|regs| {
            regs.write_field(map::HIST_MODE_FIELD, config.mode as u32);
            write_window(regs, &window);
            regs.write(map::HIST_COEFF, coeff);
            write_run(regs, map::HIST_SEG, &segments);
            write_run(regs, map::HIST_WEIGHT, &weights);
        });
        Ok(Self { sub })
    }

    pub fn set_mode(&mut self, mode: HistMode) {
        self.sub
            .isp()
            .with_registers_mut(|regs| regs.write_field(map::HIST_MODE_FIELD, mode as u32));
    }

    pub fn set_window(&mut self, window: WindowGeometry) -> Result<(), IspError> {
        let words = encode_hist_window(&window)?;
        self.sub
            .isp()
            .with_registers_mut(|regs| write_window(regs, &words));
        Ok(())
    }

    pub fn set_coefficients(&mut self, coefficients: &LumaCoefficients) -> Result<(), IspError> {
        let word = encode_luma_coefficients(coefficients)?;
        self.sub
            .isp()
            .with_registers_mut(|regs| regs.write(map::HIST_COEFF, word));
        Ok(())
    }

    pub fn set_segments(&mut self, segments: &[u8; HIST_SEGMENTS]) -> Result<(), IspError> {
        let words = encode_histogram_segments(segments)?;
        self.sub
            .isp()
            .with_registers_mut(|regs| write_run(regs, map::HIST_SEG, &words));
        Ok(())
    }

    pub fn set_weights(&mut self, weights: &[u8; HIST_WEIGHTS]) -> Result<(), IspError> {
        let words = encode_histogram_weights(weights)?;
        self.sub
            .isp()
            .with_registers_mut(|regs| write_run(regs, map::HIST_WEIGHT, &words));
        Ok(())
    }

    pub fn statistics(&self) -> HistStatistics {
        self.sub.isp().with_registers(|regs| HistStatistics {
            bins: core::array::from_fn(|i| BIN_FIELD.extract(regs.read(map::HIST_BIN.nth(i)))),
        })
    }

    /// Sets the callback for `HIST_FDONE`; only while disabled.
    pub fn register_event_handler(
        &mut self,
        handler: &'static dyn EventHandler,
    ) -> Result<(), IspError> {
        self.sub.set_handler(handler)
    }

    pub fn enable(&mut self) -> Result<(), IspError> {
        self.sub.enable()
    }

    pub fn disable(&mut self) -> Result<(), IspError> {
        self.sub.disable()
    }

    pub fn is_enabled(&self) -> bool {
        self.sub.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isp::{
        encode::{decode_histogram_segments, decode_histogram_weights},
        error::ProtocolError,
        test_support::{enabled_processor, sim_processor},
    };

    #[test]
    fn new_programs_every_table() {
        let isp = sim_processor();
        let config = HistConfig {
            mode: HistMode::YuvY,
            ..Default::default()
        };
        let _hist = HistController::new(&isp, config).unwrap();
        isp.with_registers(|r| {
            assert_eq!(r.read_field(map::HIST_MODE_FIELD), 5);
            assert_eq!(r.read_field(map::HIST_X_SIZE), 160);
            assert_eq!(r.read_field(map::HIST_Y_SIZE), 128);
            assert_eq!(r.read(map::HIST_COEFF), (85 << 16) | (85 << 8) | 86);

            let seg: [u32; 4] = core::array::from_fn(|i| r.read(map::HIST_SEG.nth(i)));
            assert_eq!(decode_histogram_segments(&seg), config.segments);
            let w: [u32; 7] = core::array::from_fn(|i| r.read(map::HIST_WEIGHT.nth(i)));
            assert_eq!(decode_histogram_weights(&w), config.weights);
        });
    }

    #[test]
    fn rejection_scenarios() {
        let isp = sim_processor();
        let mut hist = HistController::new(&isp, HistConfig::default()).unwrap();
        isp.with_registers_mut(|r| r.file_mut().clear_written());

        let mut segments = HistConfig::default().segments;
        segments[7] = segments[6];
        assert_eq!(
            hist.set_segments(&segments),
            Err(IspError::Validation(ValidationError::InvalidSegments))
        );

        let mut weights = HistConfig::default().weights;
        weights[0] += 1;
        assert_eq!(
            hist.set_weights(&weights),
            Err(IspError::Validation(ValidationError::InvalidWeights))
        );

        assert_eq!(
            hist.set_coefficients(&LumaCoefficients { r: 100, g: 100, b: 100 }),
            Err(IspError::Validation(ValidationError::InvalidLumaCoefficients))
        );

        // 2600 / 5 exceeds the 9-bit block size
        assert_eq!(
            hist.set_window(WindowGeometry::new(Point::new(0, 0), Point::new(2600, 100))),
            Err(IspError::Validation(ValidationError::FieldOverflow {
                field: "hist_x_size"
            }))
        );
        assert!(!isp.with_registers(|r| r.file().any_written()));

        // The live controller still holds the claim
        assert_eq!(
            HistController::new(&isp, HistConfig::default()).unwrap_err(),
            IspError::Protocol(ProtocolError::SubmoduleInUse(SubmoduleId::Hist))
        );
    }

    #[test]
    fn statistics_mask_bin_width() {
        let isp = enabled_processor();
        let mut hist = HistController::new(&isp, HistConfig::default()).unwrap();
        hist.set_mode(HistMode::RawGr);
        hist.enable().unwrap();
        isp.with_registers_mut(|r| {
            r.latch(map::HIST_BIN, 0xFFFF_FFFF);
            r.latch(map::HIST_BIN.nth(15), 42);
        });
        let stats = hist.statistics();
        assert_eq!(stats.bins[0], (1 << 17) - 1);
        assert_eq!(stats.bins[15], 42);
        assert_eq!(stats.bins[3], 0);
        isp.with_registers(|r| {
            assert_eq!(r.read_field(map::HIST_MODE_FIELD), 2);
            assert_eq!(r.read_field(map::CNTL_HIST_EN), 1);
            assert_eq!(r.read_field(map::CLK_HIST_FORCE_ON), 1);
        });
    }
}
