//! Auto-exposure statistics controller.
//!
//! The window is split into a 5×5 grid; the engine reports the mean luminance of each block
//! and can raise `AE_MONITOR` when the scene brightness leaves a band.

use crate::isp::{
    encode::{AE_BLOCKS, Point, WindowGeometry, decode_block_means},
    error::{CommitBit, IspError, ValidationError},
    intr::{EventHandler, IrqInstaller, SubmoduleId},
    processor::Processor,
    regs::{RegisterBlock, map},
    submodule::Submodule,
};

/// Coordinate bound of the auto-exposure window.
pub const AE_COORD_MAX: u32 = 2048;
/// Blocks per axis.
pub const AE_GRID: u32 = 5;

const RECIP_ONE: u32 = 1 << 20;

/// Where in the pipeline luminance is sampled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AeSamplePoint {
    /// After demosaicing, before gamma.
    #[default]
    Median = 0,
    /// After gamma.
    Gamma = 1,
}

/// Brightness monitor that raises `AE_MONITOR` outside `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AeEnvDetector {
    /// Frames between checks, up to 63; 0 disables the monitor.
    pub period: u8,
    pub low: u8,
    pub high: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AeConfig {
    pub window: WindowGeometry,
    pub sample_point: AeSamplePoint,
    pub env_detector: Option<AeEnvDetector>,
}

impl Default for AeConfig {
    fn default() -> Self {
        Self {
            window: WindowGeometry::new(Point::new(0, 0), Point::new(800, 640)),
            sample_point: AeSamplePoint::default(),
            env_detector: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AeStatistics {
    /// Mean luminance per block, row-major.
    pub means: [u8; AE_BLOCKS],
}

/// Register values derived from a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AeWindowWords {
    x_start: u32,
    x_bsize: u32,
    y_start: u32,
    y_bsize: u32,
    pixnum: u32,
    recip: u32,
}

fn encode_ae_window(window: &WindowGeometry) -> Result<AeWindowWords, ValidationError> {
    window.validate(AE_COORD_MAX)?;
    let x_bsize = window.width() / AE_GRID;
    let y_bsize = window.height() / AE_GRID;
    if x_bsize == 0 || y_bsize == 0 {
        return Err(ValidationError::InvalidWindow);
    }
    let pixnum = map::AE_SUBWIN_PIXNUM.check(x_bsize * y_bsize)?;
    Ok(AeWindowWords {
        x_start: window.top_left.x,
        x_bsize,
        y_start: window.top_left.y,
        y_bsize,
        pixnum,
        recip: RECIP_ONE / pixnum,
    })
}

fn check_detector(detector: &AeEnvDetector) -> Result<(), ValidationError> {
    map::AE_MONITOR_PERIOD.check(detector.period as u32)?;
    if detector.low >= detector.high {
        return Err(ValidationError::InvalidRange);
    }
    Ok(())
}

fn write_window<R: RegisterBlock>(regs: &mut R, w: &AeWindowWords) {
    regs.modify(map::AE_BX, |v| {
        let v = map::AE_X_START.insert(v, w.x_start);
        map::AE_X_BSIZE.insert(v, w.x_bsize)
    });
    regs.modify(map::AE_BY, |v| {
        let v = map::AE_Y_START.insert(v, w.y_start);
        map::AE_Y_BSIZE.insert(v, w.y_bsize)
    });
    regs.write_field(map::AE_SUBWIN_PIXNUM, w.pixnum);
    regs.write_field(map::AE_SUBWIN_RECIP, w.recip);
}

fn write_detector<R: RegisterBlock>(regs: &mut R, d: &AeEnvDetector) {
    regs.modify(map::AE_MONITOR, |v| {
        let v = map::AE_MONITOR_TL.insert(v, d.low as u32);
        let v = map::AE_MONITOR_TH.insert(v, d.high as u32);
        map::AE_MONITOR_PERIOD.insert(v, d.period as u32)
    });
}

/// Exclusive handle on the auto-exposure engine.
pub struct AeController<'a, R: RegisterBlock, I: IrqInstaller> {
    sub: Submodule<'a, R, I>,
}

impl<R: RegisterBlock, I: IrqInstaller> core::fmt::Debug for AeController<'_, R, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AeController")
            .field("enabled", &self.sub.is_enabled())
            .finish_non_exhaustive()
    }
}

impl<'a, R: RegisterBlock, I: IrqInstaller> AeController<'a, R, I> {
    pub fn new(isp: &'a Processor<R, I>, config: AeConfig) -> Result<Self, IspError> {
        let sub = Submodule::claim(isp, SubmoduleId::Ae)?;
        let window = encode_ae_window(&config.window)?;
        if let Some(d) = &config.env_detector {
            check_detector(d)?;
        }
        isp.with_registers_mut(|regs| {
            write_window(regs, &window);
            regs.write_field(map::AE_SELECT, config.sample_point as u32);
            if let Some(d) = &config.env_detector {
                write_detector(regs, d);
            }
        });
        Ok(Self { sub })
    }

    /// Moves the window; each side must span at least five pixels.
    pub fn set_window(&mut self, window: WindowGeometry) -> Result<(), IspError> {
        let words = encode_ae_window(&window)?;
        self.sub
            .isp()
            .with_registers_mut(|regs| write_window(regs, &words));
        Ok(())
    }

    pub fn set_sample_point(&mut self, point: AeSamplePoint) {
        self.sub
            .isp()
            .with_registers_mut(|regs| regs.write_field(map::AE_SELECT, point as u32));
    }

    pub fn set_env_detector(&mut self, detector: AeEnvDetector) -> Result<(), IspError> {
        check_detector(&detector)?;
        self.sub
            .isp()
            .with_registers_mut(|regs| write_detector(regs, &detector));
        Ok(())
    }

    /// Requests one statistics update and waits for the hardware to take it.
    pub fn trigger_oneshot(&mut self) -> Result<(), IspError> {
        self.sub.isp().commit(CommitBit::AeUpdate)
    }

    pub fn statistics(&self) -> AeStatistics {
        let words: [u32; map::AE_BLOCK_MEAN_WORDS] = self.sub.isp().with_registers(|regs| {
            core::array::from_fn(|i| regs.read(map::AE_BLOCK_MEAN.nth(i)))
        });
        AeStatistics {
            means: decode_block_means(&words),
        }
    }

    /// Sets the callback for `AE_MONITOR` and `AE_FRAME_DONE`; only while disabled.
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
        af::{AfConfig, AfController},
        event::{AE_EVENTS, AF_EVENTS},
        regs::InterruptRegs,
        test_support::{enabled_processor, sim_processor},
    };

    #[test]
    fn window_derives_block_size_and_reciprocal() {
        let isp = sim_processor();
        let _ae = AeController::new(&isp, AeConfig::default()).unwrap();
        isp.with_registers(|r| {
            assert_eq!(r.read_field(map::AE_X_START), 0);
            assert_eq!(r.read_field(map::AE_X_BSIZE), 160);
            assert_eq!(r.read_field(map::AE_Y_BSIZE), 128);
            assert_eq!(r.read_field(map::AE_SUBWIN_PIXNUM), 160 * 128);
            assert_eq!(r.read_field(map::AE_SUBWIN_RECIP), (1 << 20) / (160 * 128));
        });
    }

    #[test]
    fn window_rejection_scenarios() {
        let isp = sim_processor();
        let mut ae = AeController::new(&isp, AeConfig::default()).unwrap();
        isp.with_registers_mut(|r| r.file_mut().clear_written());

        let bad = [
            // Beyond the engine bound
            WindowGeometry::new(Point::new(0, 0), Point::new(2048, 100)),
            // Narrower than one pixel per block
            WindowGeometry::new(Point::new(10, 10), Point::new(14, 100)),
        ];
        for window in bad {
            assert_eq!(
                ae.set_window(window),
                Err(IspError::Validation(ValidationError::InvalidWindow))
            );
        }

        // 409 × 409 blocks overflow the pixel counter
        assert_eq!(
            ae.set_window(WindowGeometry::new(Point::new(0, 0), Point::new(2045, 2045))),
            Err(IspError::Validation(ValidationError::FieldOverflow {
                field: "ae_subwin_pixnum"
            }))
        );
        assert!(!isp.with_registers(|r| r.file().any_written()));

        ae.set_window(WindowGeometry::new(Point::new(100, 50), Point::new(110, 60)))
            .unwrap();
        isp.with_registers(|r| {
            assert_eq!(r.read_field(map::AE_X_START), 100);
            assert_eq!(r.read_field(map::AE_Y_START), 50);
            assert_eq!(r.read_field(map::AE_SUBWIN_PIXNUM), 4);
        });
    }

    #[test]
    fn env_detector_scenarios() {
        let isp = sim_processor();
        let mut ae = AeController::new(&isp, AeConfig::default()).unwrap();

        ae.set_env_detector(AeEnvDetector {
            period: 10,
            low: 40,
            high: 200,
        })
        .unwrap();
        isp.with_registers(|r| {
            assert_eq!(r.read_field(map::AE_MONITOR_TL), 40);
            assert_eq!(r.read_field(map::AE_MONITOR_TH), 200);
            assert_eq!(r.read_field(map::AE_MONITOR_PERIOD), 10);
        });

        assert_eq!(
            ae.set_env_detector(AeEnvDetector {
                period: 10,
                low: 200,
                high: 200
            }),
            Err(IspError::Validation(ValidationError::InvalidRange))
        );
        assert_eq!(
            ae.set_env_detector(AeEnvDetector {
                period: 64,
                low: 0,
                high: 1
            }),
            Err(IspError::Validation(ValidationError::FieldOverflow {
                field: "ae_monitor_period"
            }))
        );
        isp.with_registers(|r| assert_eq!(r.read_field(map::AE_MONITOR_TL), 40));
    }

    #[test]
    fn statistics_unpack_block_means() {
        let isp = sim_processor();
        let mut ae = AeController::new(&isp, AeConfig::default()).unwrap();
        ae.set_sample_point(AeSamplePoint::Gamma);
        isp.with_registers_mut(|r| {
            assert_eq!(r.read_field(map::AE_SELECT), 1);
            r.latch(map::AE_BLOCK_MEAN, 0x0102_0304);
            r.latch(map::AE_BLOCK_MEAN.nth(6), 0x1900_0000);
        });
        let stats = ae.statistics();
        assert_eq!(&stats.means[..4], &[1, 2, 3, 4]);
        assert_eq!(stats.means[24], 0x19);

        ae.trigger_oneshot().unwrap();
        assert_eq!(isp.with_registers(|r| r.commits(CommitBit::AeUpdate)), 1);
    }

    #[test]
    fn af_and_ae_share_the_interrupt() {
        let isp = enabled_processor();
        let mut af = AfController::new(&isp, AfConfig::default()).unwrap();
        let mut ae = AeController::new(&isp, AeConfig::default()).unwrap();

        af.enable().unwrap();
        ae.enable().unwrap();
        assert_eq!(isp.ref_count(), 2);
        assert_eq!(isp.with_installer(|i| i.installs), 1);
        assert_eq!(isp.enabled_events(), AF_EVENTS | AE_EVENTS);

        drop(af);
        assert_eq!(isp.enabled_events(), AE_EVENTS);
        ae.disable().unwrap();
        assert_eq!(isp.with_installer(|i| i.uninstalls), 1);
        assert_eq!(isp.interrupts().enabled(), 0);
        isp.with_registers(|r| assert_eq!(r.read_field(map::CNTL_AE_EN), 0));
    }
}
