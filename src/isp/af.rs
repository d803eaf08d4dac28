//! Autofocus statistics controller.
//!
//! The engine reports edge sum and luminance for three windows and can raise an
//! environment-change event when the scene moves. Two register pairs use zero as a mode
//! sentinel, so the modes are tagged enums here:
//!
//! - `AF_THRESHOLD == 0` selects automatic edge thresholding ([`EdgeThreshold::Auto`]).
//! - zero absolute detector thresholds select ratio detection ([`EnvDetectorMode::Ratio`]).

use crate::isp::{
    encode::{Point, WindowGeometry, WindowWords, decode_window, encode_window},
    error::{CommitBit, IspError, ValidationError},
    fixed::q0_4_from_f32,
    intr::{EventHandler, IrqInstaller, SubmoduleId},
    processor::Processor,
    regs::{RegisterBlock, map},
    submodule::Submodule,
};

/// Number of autofocus windows.
pub const AF_WINDOW_COUNT: usize = 3;
/// Coordinate bound of the autofocus windows.
pub const AF_COORD_MAX: u32 = 4096;

/// How the environment detector decides the scene changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvDetectorMode {
    /// Trigger when both sum and luminance move by more than these absolute amounts.
    Absolute { sum: u32, lum: u32 },
    /// Trigger when both move by more than this fraction, in `(0, 1)` with 1/16 steps.
    Ratio(f32),
}

/// Automatic edge threshold search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoEdgeThreshold {
    /// Target count of pixels above the threshold.
    pub pixel_num: u32,
    pub min: u16,
    pub max: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeThreshold {
    Auto(AutoEdgeThreshold),
    /// Fixed threshold; zero is reserved for `Auto`.
    Manual(u16),
}

impl Default for EdgeThreshold {
    fn default() -> Self {
        EdgeThreshold::Manual(256)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AfConfig {
    pub windows: [WindowGeometry; AF_WINDOW_COUNT],
    pub edge_threshold: EdgeThreshold,
    /// Frames between environment checks; 0 disables detection.
    pub env_period: u8,
    pub env_detector: Option<EnvDetectorMode>,
}

impl Default for AfConfig {
    fn default() -> Self {
        let window = WindowGeometry::new(Point::new(1, 1), Point::new(128, 128));
        Self {
            windows: [window; AF_WINDOW_COUNT],
            edge_threshold: EdgeThreshold::default(),
            env_period: 0,
            env_detector: None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AfWindowStats {
    pub sum: u32,
    pub lum: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AfStatistics {
    pub windows: [AfWindowStats; AF_WINDOW_COUNT],
}

/// Validated register values for an environment detector mode: `(sum, lum, ratio)`.
fn encode_detector(mode: EnvDetectorMode) -> Result<(u32, u32, u32), ValidationError> {
    match mode {
        EnvDetectorMode::Ratio(r) => Ok((0, 0, q0_4_from_f32(r)? as u32)),
        EnvDetectorMode::Absolute { sum, lum } => {
            if sum == 0 || lum == 0 {
                return Err(ValidationError::ReservedSentinel);
            }
            map::AF_ENV_USER_THRESHOLD_LUM.check(lum)?;
            Ok((sum, lum, 0))
        }
    }
}

/// Validated register values for an edge threshold mode: `(threshold, pixnum, min, max)`.
fn encode_edge(mode: EdgeThreshold) -> Result<(u32, u32, u32, u32), ValidationError> {
    match mode {
        EdgeThreshold::Manual(0) => Err(ValidationError::ReservedSentinel),
        EdgeThreshold::Manual(v) => Ok((v as u32, 0, 0, 0)),
        EdgeThreshold::Auto(auto) => {
            if auto.pixel_num == 0 {
                return Err(ValidationError::ReservedSentinel);
            }
            map::AF_THPIXNUM.check(auto.pixel_num)?;
            if auto.min > auto.max {
                return Err(ValidationError::InvalidRange);
            }
            Ok((0, auto.pixel_num, auto.min as u32, auto.max as u32))
        }
    }
}

fn write_edge<R: RegisterBlock>(regs: &mut R, (threshold, pixnum, min, max): (u32, u32, u32, u32)) {
    regs.write_field(map::AF_THRESHOLD_FIELD, threshold);
    regs.write_field(map::AF_THPIXNUM, pixnum);
    if threshold == 0 {
        regs.modify(map::AF_GEN_TH_CTRL, |w| {
            let w = map::AF_GEN_THRESHOLD_MIN.insert(w, min);
            map::AF_GEN_THRESHOLD_MAX.insert(w, max)
        });
    }
}

fn write_detector<R: RegisterBlock>(regs: &mut R, (sum, lum, ratio): (u32, u32, u32)) {
    regs.write(map::AF_ENV_USER_TH_SUM, sum);
    regs.write(map::AF_ENV_USER_TH_LUM, lum);
    regs.write_field(map::AF_ENV_THRESHOLD, ratio);
}

/// Exclusive handle on the autofocus engine.
pub struct AfController<'a, R: RegisterBlock, I: IrqInstaller> {
    sub: Submodule<'a, R, I>,
}

impl<R: RegisterBlock, I: IrqInstaller> core::fmt::Debug for AfController<'_, R, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AfController")
            .field("enabled", &self.sub.is_enabled())
            .finish_non_exhaustive()
    }
}

impl<'a, R: RegisterBlock, I: IrqInstaller> AfController<'a, R, I> {
    /// Claims the engine and applies `config`.
    ///
    /// Every part of `config` is validated before the first register write.
    pub fn new(isp: &'a Processor<R, I>, config: AfConfig) -> Result<Self, IspError> {
        let sub = Submodule::claim(isp, SubmoduleId::Af)?;

        let mut windows = [WindowWords::default(); AF_WINDOW_COUNT];
        for (words, geometry) in windows.iter_mut().zip(config.windows.iter()) {
            *words = encode_window(geometry, AF_COORD_MAX)?;
        }
        let edge = encode_edge(config.edge_threshold)?;
        let detector = config.env_detector.map(encode_detector).transpose()?;

        isp.with_registers_mut(|regs| {
            for (words, w) in windows.iter().zip(map::AF_WINDOWS.iter()) {
                regs.write(w.hscale, words.h);
                regs.write(w.vscale, words.v);
            }
            write_edge(regs, edge);
            if let Some(d) = detector {
                write_detector(regs, d);
            }
            regs.write_field(map::AF_ENV_PERIOD, config.env_period as u32);
        });
        Ok(Self { sub })
    }

    /// Moves window `id` (0, 1 or 2).
    pub fn set_window(
        &mut self,
        id: usize,
        top_left: Point,
        bottom_right: Point,
    ) -> Result<(), IspError> {
        let w = map::AF_WINDOWS
            .get(id)
            .ok_or(ValidationError::InvalidWindowId(id))?;
        let words = encode_window(&WindowGeometry::new(top_left, bottom_right), AF_COORD_MAX)?;
        self.sub.isp().with_registers_mut(|regs| {
            regs.write(w.hscale, words.h);
            regs.write(w.vscale, words.v);
        });
        Ok(())
    }

    /// Window `id` as currently programmed.
    pub fn window(&self, id: usize) -> Result<WindowGeometry, IspError> {
        let w = map::AF_WINDOWS
            .get(id)
            .ok_or(ValidationError::InvalidWindowId(id))?;
        Ok(self.sub.isp().with_registers(|regs| {
            decode_window(&WindowWords {
                h: regs.read(w.hscale),
                v: regs.read(w.vscale),
            })
        }))
    }

    /// Switches the environment detector; both thresholds and the ratio change together.
    pub fn set_detector_mode(&mut self, mode: EnvDetectorMode) -> Result<(), IspError> {
        let values = encode_detector(mode)?;
        self.sub
            .isp()
            .with_registers_mut(|regs| write_detector(regs, values));
        Ok(())
    }

    pub fn set_edge_threshold_mode(&mut self, mode: EdgeThreshold) -> Result<(), IspError> {
        let values = encode_edge(mode)?;
        self.sub
            .isp()
            .with_registers_mut(|regs| write_edge(regs, values));
        Ok(())
    }

    /// Edge threshold mode read back from the registers.
    pub fn edge_threshold_mode(&self) -> EdgeThreshold {
        self.sub.isp().with_registers(|regs| {
            match regs.read_field(map::AF_THRESHOLD_FIELD) {
                0 => EdgeThreshold::Auto(AutoEdgeThreshold {
                    pixel_num: regs.read_field(map::AF_THPIXNUM),
                    min: regs.read_field(map::AF_GEN_THRESHOLD_MIN) as u16,
                    max: regs.read_field(map::AF_GEN_THRESHOLD_MAX) as u16,
                }),
                v => EdgeThreshold::Manual(v as u16),
            }
        })
    }

    /// Frames between environment checks; 0 disables detection.
    pub fn set_env_detector_period(&mut self, frames: u8) {
        self.sub
            .isp()
            .with_registers_mut(|regs| regs.write_field(map::AF_ENV_PERIOD, frames as u32));
    }

    /// Refresh statistics every frame instead of on demand.
    pub fn set_continuous(&mut self, continuous: bool) {
        self.sub
            .isp()
            .with_registers_mut(|regs| regs.write_field(map::AF_AUTO_UPDATE, continuous as u32));
    }

    /// Requests one statistics update and waits for the hardware to take it.
    pub fn trigger_oneshot(&mut self) -> Result<(), IspError> {
        self.sub.isp().commit(CommitBit::AfManualUpdate)
    }

    pub fn statistics(&self) -> AfStatistics {
        self.sub.isp().with_registers(|regs| {
            let mut stats = AfStatistics::default();
            for (s, w) in stats.windows.iter_mut().zip(map::AF_WINDOWS.iter()) {
                s.sum = regs.read_field(w.sum);
                s.lum = regs.read_field(w.lum);
            }
            stats
        })
    }

    /// Sets the callback for `AF_FDONE` and `AF_ENV`; only while disabled.
    pub fn register_event_handler(
        &mut self,
        handler: &'static dyn EventHandler,
    ) -> Result<(), IspError> {
        self.sub.set_handler(handler)
    }

    /// Joins the shared interrupt and starts the engine.
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
