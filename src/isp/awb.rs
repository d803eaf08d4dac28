//! Auto-white-balance statistics controller.
//!
//! Pixels inside the window whose luminance and R/G, B/G ratios fall inside the white patch
//! are counted and their channels accumulated.

use crate::isp::{
    encode::{Point, RatioRange, WindowGeometry, WindowWords, encode_ratio_range, encode_window},
    error::{IspError, ValidationError},
    intr::{EventHandler, IrqInstaller, SubmoduleId},
    processor::Processor,
    regs::{RegisterBlock, map},
    submodule::Submodule,
};

/// Coordinate bound of the white-balance window.
pub const AWB_COORD_MAX: u32 = 4096;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AwbSamplePoint {
    #[default]
    BeforeCcm = 0,
    AfterCcm = 1,
}

/// Bounds a pixel must meet to count as white.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AwbWhitePatch {
    /// Inclusive luminance bounds, 10 bits each.
    pub luminance: (u16, u16),
    pub red_green: RatioRange,
    pub blue_green: RatioRange,
}

impl Default for AwbWhitePatch {
    fn default() -> Self {
        Self {
            luminance: (0, 1023),
            red_green: RatioRange::new(0.5, 2.0),
            blue_green: RatioRange::new(0.5, 2.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AwbConfig {
    pub window: WindowGeometry,
    pub sample_point: AwbSamplePoint,
    pub white_patch: AwbWhitePatch,
}

impl Default for AwbConfig {
    fn default() -> Self {
        Self {
            window: WindowGeometry::new(Point::new(0, 0), Point::new(799, 639)),
            sample_point: AwbSamplePoint::default(),
            white_patch: AwbWhitePatch::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AwbStatistics {
    /// Pixels that met the white patch.
    pub white_count: u32,
    pub sum_r: u32,
    pub sum_g: u32,
    pub sum_b: u32,
}

/// `(AWB_TH_LUM, AWB_TH_RG, AWB_TH_BG)` for a white patch.
fn encode_white_patch(patch: &AwbWhitePatch) -> Result<(u32, u32, u32), ValidationError> {
    let (min, max) = patch.luminance;
    let min = map::AWB_MIN_LUM.check(min as u32)?;
    let max = map::AWB_MAX_LUM.check(max as u32)?;
    if min > max {
        return Err(ValidationError::InvalidRange);
    }
    let lum = map::AWB_MAX_LUM.insert(map::AWB_MIN_LUM.insert(0, min), max);
    let rg = encode_ratio_range(patch.red_green.min, patch.red_green.max)?;
    let bg = encode_ratio_range(patch.blue_green.min, patch.blue_green.max)?;
    Ok((lum, rg, bg))
}

fn write_window<R: RegisterBlock>(regs: &mut R, words: &WindowWords) {
    regs.write(map::AWB_HSCALE, words.h);
    regs.write(map::AWB_VSCALE, words.v);
}

fn write_white_patch<R: RegisterBlock>(regs: &mut R, (lum, rg, bg): (u32, u32, u32)) {
    regs.write(map::AWB_TH_LUM, lum);
    regs.write(map::AWB_TH_RG, rg);
    regs.write(map::AWB_TH_BG, bg);
}

/// Exclusive handle on the white-balance engine.
pub struct AwbController<'a, R: RegisterBlock, I: IrqInstaller> {
    sub: Submodule<'a, R, I>,
}

impl<R: RegisterBlock, I: IrqInstaller> core::fmt::Debug for AwbController<'_, R, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AwbController")
            .field("enabled", &self.sub.is_enabled())
            .finish_non_exhaustive()
    }
}

impl<'a, R: RegisterBlock, I: IrqInstaller> AwbController<'a, R, I> {
    pub fn new(isp: &'a Processor<R, I>, config: AwbConfig) -> Result<Self, IspError> {
        let sub = Submodule::claim(isp, SubmoduleId::Awb)?;
        let window = encode_window(&config.window, AWB_COORD_MAX)?;
        let patch = encode_white_patch(&config.white_patch)?;
        isp.with_registers_mut(|regs| {
            write_window(regs, &window);
            write_white_patch(regs, patch);
            regs.write_field(map::AWB_SAMPLE, config.sample_point as u32);
        });
        Ok(Self { sub })
    }

    pub fn set_window(&mut self, window: WindowGeometry) -> Result<(), IspError> {
        let words = encode_window(&window, AWB_COORD_MAX)?;
        self.sub
            .isp()
            .with_registers_mut(|regs| write_window(regs, &words));
        Ok(())
    }

    pub fn set_sample_point(&mut self, point: AwbSamplePoint) {
        self.sub
            .isp()
            .with_registers_mut(|regs| regs.write_field(map::AWB_SAMPLE, point as u32));
    }

    pub fn set_white_patch(&mut self, patch: &AwbWhitePatch) -> Result<(), IspError> {
        let words = encode_white_patch(patch)?;
        self.sub
            .isp()
            .with_registers_mut(|regs| write_white_patch(regs, words));
        Ok(())
    }

    pub fn statistics(&self) -> AwbStatistics {
        self.sub.isp().with_registers(|regs| AwbStatistics {
            white_count: regs.read_field(map::AWB0_WHITE_CNT_FIELD),
            sum_r: regs.read(map::AWB0_ACC_R),
            sum_g: regs.read(map::AWB0_ACC_G),
            sum_b: regs.read(map::AWB0_ACC_B),
        })
    }

    /// Sets the callback for `AWB_FDONE`; only while disabled.
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
        encode::decode_ratio_range,
        error::ProtocolError,
        event::{AWB_EVENTS, Event, EventMask},
        test_support::{CountingHandler, enabled_processor, sim_processor},
    };

    #[test]
    fn new_programs_window_and_white_patch() {
        let isp = sim_processor();
        let config = AwbConfig {
            sample_point: AwbSamplePoint::AfterCcm,
            ..Default::default()
        };
        let _awb = AwbController::new(&isp, config).unwrap();
        isp.with_registers(|r| {
            assert_eq!(r.read(map::AWB_HSCALE), 799);
            assert_eq!(r.read(map::AWB_VSCALE), 639);
            assert_eq!(r.read_field(map::AWB_MIN_LUM), 0);
            assert_eq!(r.read_field(map::AWB_MAX_LUM), 1023);
            assert_eq!(decode_ratio_range(r.read(map::AWB_TH_RG)), (0.5, 2.0));
            assert_eq!(r.read_field(map::AWB_SAMPLE), 1);
        });
    }

    #[test]
    fn white_patch_rejection_leaves_registers() {
        let isp = sim_processor();
        let mut awb = AwbController::new(&isp, AwbConfig::default()).unwrap();
        isp.with_registers_mut(|r| r.file_mut().clear_written());

        let bad = [
            (
                AwbWhitePatch {
                    luminance: (600, 500),
                    ..Default::default()
                },
                ValidationError::InvalidRange,
            ),
            (
                AwbWhitePatch {
                    luminance: (0, 1024),
                    ..Default::default()
                },
                ValidationError::FieldOverflow {
                    field: "awb_max_lum",
                },
            ),
            (
                AwbWhitePatch {
                    red_green: RatioRange::new(1.5, 1.0),
                    ..Default::default()
                },
                ValidationError::InvalidRange,
            ),
            (
                AwbWhitePatch {
                    blue_green: RatioRange::new(0.5, 4.0),
                    ..Default::default()
                },
                ValidationError::InvalidRatio,
            ),
        ];
        for (patch, err) in bad {
            assert_eq!(
                awb.set_white_patch(&patch),
                Err(IspError::Validation(err))
            );
        }
        assert!(!isp.with_registers(|r| r.file().any_written()));
    }

    #[test]
    fn statistics_and_events() {
        static HANDLER: CountingHandler = CountingHandler::new(false);

        let isp = enabled_processor();
        let mut awb = AwbController::new(&isp, AwbConfig::default()).unwrap();
        awb.register_event_handler(&HANDLER).unwrap();
        awb.enable().unwrap();
        assert_eq!(isp.enabled_events(), AWB_EVENTS);
        assert_eq!(
            awb.enable(),
            Err(IspError::Protocol(ProtocolError::DuplicateRegistration(
                SubmoduleId::Awb
            )))
        );

        isp.with_registers_mut(|r| {
            r.latch(map::AWB0_WHITE_CNT, 5000);
            r.latch(map::AWB0_ACC_R, 600_000);
            r.latch(map::AWB0_ACC_G, 700_000);
            r.latch(map::AWB0_ACC_B, 500_000);
        });
        isp.interrupts().raise(EventMask::from(Event::AwbFdone));
        isp.dispatch();
        assert_eq!(HANDLER.calls(), 1);
        assert_eq!(
            awb.statistics(),
            AwbStatistics {
                white_count: 5000,
                sum_r: 600_000,
                sum_g: 700_000,
                sum_b: 500_000,
            }
        );
    }
}
