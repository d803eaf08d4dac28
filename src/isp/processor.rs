//! The processor context: register block, lifecycle, interrupt multiplexer and submodule
//! claims behind one critical section, with the dispatcher's state kept outside it.

use core::cell::RefCell;

use bitmaps::Bitmap;
use critical_section::Mutex;
use log::debug;

use crate::isp::{
    config::ProcessorConfig,
    dispatch::HandlerTable,
    encode::{
        CcmMatrix, DenoiseTemplate, GammaChannel, GammaCurve, encode_ccm, encode_denoise_template,
        encode_gamma_curve,
    },
    error::{CommitBit, IspError, ProtocolError, ValidationError},
    event::EventMask,
    intr::{
        EventHandler, InterruptMultiplexer, IrqInstaller, MAX_SUBMODULES, NoInstaller,
        Registration, SubmoduleId,
    },
    poll::{self, PollBudget},
    regs::{Field, InterruptRegs, Reg, RegisterBlock, map},
};

/// Lifecycle of the whole processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Init,
    Enabled,
}

/// How the denoise filter fills pixels beyond the frame edge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BfPadding {
    /// Mirror pixels from the image.
    #[default]
    FromImage,
    /// Fill with a constant value.
    Constant(u8),
}

/// Bayer denoise filter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BfConfig {
    pub template: DenoiseTemplate,
    /// Denoising level, 2 to 20.
    pub sigma: u8,
    pub padding: BfPadding,
}

impl Default for BfConfig {
    fn default() -> Self {
        Self {
            template: DenoiseTemplate::default(),
            sigma: 2,
            padding: BfPadding::default(),
        }
    }
}

const BF_SIGMA_MIN: u8 = 2;
const BF_SIGMA_MAX: u8 = 20;

struct Inner<R, I: IrqInstaller> {
    regs: R,
    state: ProcessorState,
    mux: InterruptMultiplexer<I>,
    claims: Bitmap<MAX_SUBMODULES>,
}

/// Owner of one ISP instance.
///
/// Every access to shared registers (`CLK_EN`, `CNTL`, `INT_ENA`) and every change to the
/// registration table happens inside `critical_section::with`, so a processor can be shared
/// by reference between tasks and the interrupt handler. [`Processor::dispatch`] never
/// enters that critical section: it reads the interrupt registers and the handler table,
/// both of which live outside the lock.
pub struct Processor<R: RegisterBlock, I: IrqInstaller = NoInstaller> {
    inner: Mutex<RefCell<Inner<R, I>>>,
    interrupts: R::Interrupts,
    handlers: HandlerTable,
    poll_budget: PollBudget,
}

impl<R: RegisterBlock, I: IrqInstaller> core::fmt::Debug for Processor<R, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Processor")
            .field("poll_budget", &self.poll_budget)
            .finish_non_exhaustive()
    }
}

impl<R: RegisterBlock, I: IrqInstaller> Processor<R, I> {
    pub(crate) fn new(
        regs: R,
        interrupts: R::Interrupts,
        installer: I,
        poll_budget: PollBudget,
    ) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                regs,
                state: ProcessorState::Init,
                mux: InterruptMultiplexer::new(installer),
                claims: Bitmap::new(),
            })),
            interrupts,
            handlers: HandlerTable::new(),
            poll_budget,
        }
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut Inner<R, I>) -> T) -> T {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    pub fn state(&self) -> ProcessorState {
        self.with_inner(|inner| inner.state)
    }

    pub fn poll_budget(&self) -> PollBudget {
        self.poll_budget
    }

    /// Validates `config`, programs the pipeline and starts the processor.
    pub fn enable(&self, config: &ProcessorConfig) -> Result<(), IspError> {
        let (data_type, out_type) = config.validate()?;
        self.with_inner(|inner| {
            if inner.state == ProcessorState::Enabled {
                return Err(ProtocolError::AlreadyEnabled.into());
            }
            let regs = &mut inner.regs;

            regs.write_field(map::CLK_EN_ALL, 1);
            regs.modify(map::CNTL, |w| {
                let w = map::CNTL_MIPI_DATA_EN
                    .insert(w, (config.input_source.bits() == 0) as u32);
                let w = map::CNTL_DATA_TYPE.insert(w, data_type);
                let w = map::CNTL_IN_SRC.insert(w, config.input_source.bits());
                let w = map::CNTL_OUT_TYPE.insert(w, out_type);
                map::CNTL_ISP_EN.insert(w, 1)
            });
            regs.modify(map::FRAME_CFG, |w| {
                let w = map::FRAME_HADR_NUM.insert(w, config.frame.width - 1);
                let w = map::FRAME_VADR_NUM.insert(w, config.frame.height - 1);
                let w = map::FRAME_BAYER_MODE.insert(w, config.bayer_order.bits());
                let w = map::FRAME_HSYNC_START_EXIST.insert(w, 1);
                map::FRAME_HSYNC_END_EXIST.insert(w, 1)
            });
            regs.modify(map::YUV_FORMAT, |w| {
                let w = map::YUV_MODE.insert(w, config.yuv_standard as u32);
                map::YUV_RANGE.insert(w, config.yuv_range as u32)
            });

            inner.state = ProcessorState::Enabled;
            debug!(
                "isp enabled: {:?} -> {:?}, {}x{}",
                config.input_format, config.output_format, config.frame.width, config.frame.height
            );
            Ok(())
        })
    }

    /// Stops the processor. Every submodule must be disabled first.
    pub fn disable(&self) -> Result<(), IspError> {
        self.with_inner(|inner| {
            if inner.state != ProcessorState::Enabled {
                return Err(ProtocolError::NotEnabled.into());
            }
            if inner.mux.ref_count() != 0 {
                return Err(ProtocolError::SubmodulesActive.into());
            }
            inner.regs.write_field(map::CNTL_ISP_EN, 0);
            inner.regs.write_field(map::CLK_EN_ALL, 0);
            inner.state = ProcessorState::Init;
            debug!("isp disabled");
            Ok(())
        })
    }

    /// Adds `id` to the interrupt table and enables `mask` in hardware.
    ///
    /// Events from `mask` that were latched before the call are acknowledged, not delivered.
    /// The first registration installs the shared dispatcher.
    pub fn register(
        &self,
        id: SubmoduleId,
        mask: EventMask,
        handler: Option<&'static dyn EventHandler>,
    ) -> Result<(), IspError> {
        self.with_inner(|inner| {
            if inner.state != ProcessorState::Enabled {
                return Err(ProtocolError::NotEnabled.into());
            }
            let registration = Registration { mask, handler };
            inner
                .mux
                .register(&self.interrupts, &self.handlers, id, registration)?;
            Ok(())
        })
    }

    /// Removes `id` from the interrupt table; the last removal uninstalls the dispatcher.
    ///
    /// If a dispatch pass is running on another core or thread, this waits for it to finish,
    /// so `id`'s handler is never called after the call returns.
    pub fn deregister(&self, id: SubmoduleId) -> Result<(), IspError> {
        self.with_inner(|inner| {
            inner.mux.deregister(&self.interrupts, &self.handlers, id)?;
            Ok(())
        })
    }

    /// Number of registered submodules.
    pub fn ref_count(&self) -> usize {
        self.with_inner(|inner| inner.mux.ref_count())
    }

    pub fn enabled_events(&self) -> EventMask {
        self.with_inner(|inner| inner.mux.enabled_events())
    }

    pub fn is_registered(&self, id: SubmoduleId) -> bool {
        self.with_inner(|inner| inner.mux.is_registered(id))
    }

    /// Runs `f` against the installer, e.g. to inspect a test double.
    pub fn with_installer<T>(&self, f: impl FnOnce(&I) -> T) -> T {
        self.with_inner(|inner| f(inner.mux.installer()))
    }

    /// Shared dispatcher, called from the ISP interrupt handler.
    ///
    /// Reads `INT_ST` once, clears exactly those bits, then calls each registered handler
    /// with the events from its mask. Never enters the critical section, so it may run while
    /// a task on another core is in the middle of a configuration call. Returns true if any
    /// handler asked for a yield.
    pub fn dispatch(&self) -> bool {
        let pending = EventMask::from_bits_truncate(self.interrupts.take_pending());
        self.handlers.route(pending)
    }

    /// The interrupt registers, e.g. to raise events on a simulated block.
    pub fn interrupts(&self) -> &R::Interrupts {
        &self.interrupts
    }

    /// Programs one gamma channel and waits for the hardware to latch it.
    pub fn apply_gamma(&self, channel: GammaChannel, curve: &GammaCurve) -> Result<(), IspError> {
        let words = encode_gamma_curve(curve)?;
        let (x, y) = gamma_regs(channel);
        self.with_inner(|inner| {
            for (i, w) in words.x.iter().enumerate() {
                inner.regs.write(x.nth(i), *w);
            }
            for (i, w) in words.y.iter().enumerate() {
                inner.regs.write(y.nth(i), *w);
            }
        });
        self.commit(CommitBit::Gamma)
    }

    pub fn set_gamma_enabled(&self, enabled: bool) {
        self.set_pipeline_bit(map::CNTL_GAMMA_EN, enabled);
    }

    pub fn configure_ccm(&self, matrix: &CcmMatrix) -> Result<(), IspError> {
        let words = encode_ccm(matrix)?;
        self.with_inner(|inner| {
            for (reg, w) in map::CCM_COEF.iter().zip(words) {
                inner.regs.write(*reg, w);
            }
        });
        Ok(())
    }

    pub fn set_ccm_enabled(&self, enabled: bool) {
        self.set_pipeline_bit(map::CNTL_CCM_EN, enabled);
    }

    pub fn configure_bf(&self, config: &BfConfig) -> Result<(), IspError> {
        let gau = encode_denoise_template(&config.template)?;
        if !(BF_SIGMA_MIN..=BF_SIGMA_MAX).contains(&config.sigma) {
            return Err(ValidationError::FieldOverflow {
                field: map::BF_SIGMA_FIELD.name(),
            }
            .into());
        }
        let (mode, data) = match config.padding {
            BfPadding::FromImage => (0, 0),
            BfPadding::Constant(v) => (1, v as u32),
        };
        self.with_inner(|inner| {
            let regs = &mut inner.regs;
            regs.write(map::BF_GAU0, gau[0]);
            regs.write(map::BF_GAU1, gau[1]);
            regs.write_field(map::BF_SIGMA_FIELD, config.sigma as u32);
            regs.modify(map::BF_MATRIX_CTRL, |w| {
                let w = map::BF_PADDING_MODE.insert(w, mode);
                map::BF_PADDING_DATA.insert(w, data)
            });
        });
        Ok(())
    }

    pub fn set_bf_enabled(&self, enabled: bool) {
        self.set_pipeline_bit(map::CNTL_BF_EN, enabled);
    }

    fn set_pipeline_bit(&self, field: Field, enabled: bool) {
        self.with_inner(|inner| inner.regs.write_field(field, enabled as u32));
    }

    /// Read access to the register block under the critical section.
    pub fn with_registers<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        self.with_inner(|inner| f(&inner.regs))
    }

    /// Unchecked write access for bring-up and tests; bypasses validation and bookkeeping.
    pub fn with_registers_mut<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        self.with_inner(|inner| f(&mut inner.regs))
    }

    pub(crate) fn claim(&self, id: SubmoduleId) -> Result<(), ProtocolError> {
        self.with_inner(|inner| {
            if inner.claims.get(id.index()) {
                return Err(ProtocolError::SubmoduleInUse(id));
            }
            inner.claims.set(id.index(), true);
            Ok(())
        })
    }

    pub(crate) fn release(&self, id: SubmoduleId) {
        self.with_inner(|inner| {
            inner.claims.set(id.index(), false);
        });
    }

    /// Registers `id` and turns on its engine and clock in one critical section.
    pub(crate) fn activate(
        &self,
        id: SubmoduleId,
        handler: Option<&'static dyn EventHandler>,
    ) -> Result<(), IspError> {
        self.with_inner(|inner| {
            if inner.state != ProcessorState::Enabled {
                return Err(ProtocolError::NotEnabled.into());
            }
            let registration = Registration {
                mask: id.events(),
                handler,
            };
            inner
                .mux
                .register(&self.interrupts, &self.handlers, id, registration)?;
            inner.regs.write_field(id.enable_field(), 1);
            inner.regs.write_field(id.clock_field(), 1);
            Ok(())
        })
    }

    /// Turns off `id`'s engine and clock and deregisters it in one critical section.
    pub(crate) fn deactivate(&self, id: SubmoduleId) -> Result<(), IspError> {
        self.with_inner(|inner| {
            inner.mux.deregister(&self.interrupts, &self.handlers, id)?;
            inner.regs.write_field(id.enable_field(), 0);
            inner.regs.write_field(id.clock_field(), 0);
            Ok(())
        })
    }

    /// Sets a self-clearing commit bit and polls it clear, one critical section per read.
    pub(crate) fn commit(&self, bit: CommitBit) -> Result<(), IspError> {
        let field = bit.field();
        self.with_inner(|inner| inner.regs.write_field(field, 1));
        poll::wait_clear(self.poll_budget, bit, || {
            self.with_inner(|inner| inner.regs.read_field(field) != 0)
        })
    }
}

fn gamma_regs(channel: GammaChannel) -> (Reg, Reg) {
    match channel {
        GammaChannel::R => (map::GAMMA_RX, map::GAMMA_RY),
        GammaChannel::G => (map::GAMMA_GX, map::GAMMA_GY),
        GammaChannel::B => (map::GAMMA_BX, map::GAMMA_BY),
    }
}
