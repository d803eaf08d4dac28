//! Sharing the single ISP interrupt line between the statistics engines.
//!
//! The multiplexer keeps one registration per engine. Its length is the reference count of
//! the shared dispatcher: the first registration installs it, the last deregistration
//! removes it, and `INT_ENA` is rewritten as the union of all registered masks on every
//! change. The multiplexer itself is not synchronized; [`Processor`](crate::isp::Processor)
//! owns it inside its critical section and mirrors every change into the lock-free handler
//! table the dispatcher reads.

use heapless::LinearMap;
use log::debug;

use crate::isp::{
    dispatch::HandlerTable,
    error::ProtocolError,
    event::{AE_EVENTS, AF_EVENTS, AWB_EVENTS, EventMask, HIST_EVENTS},
    regs::{Field, InterruptRegs, map},
};

/// Upper bound on simultaneous registrations, one per engine.
pub const MAX_SUBMODULES: usize = 4;

/// Statistics engines that can claim a share of the interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmoduleId {
    Af,
    Ae,
    Awb,
    Hist,
}

impl SubmoduleId {
    pub const ALL: [SubmoduleId; MAX_SUBMODULES] = [
        SubmoduleId::Af,
        SubmoduleId::Ae,
        SubmoduleId::Awb,
        SubmoduleId::Hist,
    ];

    /// Events this engine raises.
    pub const fn events(self) -> EventMask {
        match self {
            SubmoduleId::Af => AF_EVENTS,
            SubmoduleId::Ae => AE_EVENTS,
            SubmoduleId::Awb => AWB_EVENTS,
            SubmoduleId::Hist => HIST_EVENTS,
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// `CNTL` bit that enables the engine.
    pub(crate) const fn enable_field(self) -> Field {
        match self {
            SubmoduleId::Af => map::CNTL_AF_EN,
            SubmoduleId::Ae => map::CNTL_AE_EN,
            SubmoduleId::Awb => map::CNTL_AWB_EN,
            SubmoduleId::Hist => map::CNTL_HIST_EN,
        }
    }

    /// `CLK_EN` bit that keeps the engine clocked.
    pub(crate) const fn clock_field(self) -> Field {
        match self {
            SubmoduleId::Af => map::CLK_AF_FORCE_ON,
            SubmoduleId::Ae => map::CLK_AE_FORCE_ON,
            SubmoduleId::Awb => map::CLK_AWB_FORCE_ON,
            SubmoduleId::Hist => map::CLK_HIST_FORCE_ON,
        }
    }
}

/// Callback invoked from the shared dispatcher.
///
/// Runs in interrupt context on real hardware: keep it short, do not block and do not
/// allocate. Do not call back into the processor either, because deregistration waits for
/// running handlers to return. The return value asks the scheduler to yield on interrupt
/// exit.
pub trait EventHandler: Sync {
    fn on_events(&self, events: EventMask) -> bool;
}

/// Installs and removes the shared dispatcher on the interrupt controller.
///
/// Called with the processor's critical section held.
pub trait IrqInstaller {
    fn install(&mut self);
    fn uninstall(&mut self);
}

/// Installer for targets where the dispatcher is wired statically.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInstaller;

impl IrqInstaller for NoInstaller {
    fn install(&mut self) {}
    fn uninstall(&mut self) {}
}

/// One engine's share of the interrupt.
#[derive(Clone, Copy)]
pub struct Registration {
    pub mask: EventMask,
    pub handler: Option<&'static dyn EventHandler>,
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("mask", &self.mask)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

pub struct InterruptMultiplexer<I: IrqInstaller> {
    table: LinearMap<SubmoduleId, Registration, MAX_SUBMODULES>,
    installer: I,
}

impl<I: IrqInstaller> core::fmt::Debug for InterruptMultiplexer<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InterruptMultiplexer")
            .field("ref_count", &self.ref_count())
            .field("enabled_events", &self.enabled_events())
            .finish_non_exhaustive()
    }
}

impl<I: IrqInstaller> InterruptMultiplexer<I> {
    pub(crate) fn new(installer: I) -> Self {
        Self {
            table: LinearMap::new(),
            installer,
        }
    }

    /// Number of registered engines.
    #[inline]
    pub fn ref_count(&self) -> usize {
        self.table.len()
    }

    /// Union of all registered masks; always equal to `INT_ENA`.
    pub fn enabled_events(&self) -> EventMask {
        self.table
            .values()
            .fold(EventMask::EMPTY, |acc, r| acc.union(r.mask))
    }

    pub fn is_registered(&self, id: SubmoduleId) -> bool {
        self.table.contains_key(&id)
    }

    pub fn installer(&self) -> &I {
        &self.installer
    }

    /// Adds `id`, publishes its handler and enables its events.
    ///
    /// Events latched for bits nobody had enabled are acknowledged first, so the new
    /// registration only sees events raised after it joined.
    pub(crate) fn register<N: InterruptRegs>(
        &mut self,
        interrupts: &N,
        handlers: &HandlerTable,
        id: SubmoduleId,
        registration: Registration,
    ) -> Result<(), ProtocolError> {
        if self.table.contains_key(&id) {
            return Err(ProtocolError::DuplicateRegistration(id));
        }
        let previous = self.enabled_events();
        self.table
            .insert(id, registration)
            .map_err(|_| ProtocolError::DuplicateRegistration(id))?;
        handlers.publish(id, registration);

        let added = registration.mask.bits() & !previous.bits();
        if added != 0 {
            interrupts.clear(added);
        }
        interrupts.set_enabled(self.enabled_events().bits());

        if self.table.len() == 1 {
            self.installer.install();
            debug!("isp dispatcher installed");
        }
        debug!("{id:?} registered, ref_count={}", self.table.len());
        Ok(())
    }

    /// Removes `id` and disables its events. On return no dispatch pass can still call its
    /// handler.
    pub(crate) fn deregister<N: InterruptRegs>(
        &mut self,
        interrupts: &N,
        handlers: &HandlerTable,
        id: SubmoduleId,
    ) -> Result<(), ProtocolError> {
        if self.table.remove(&id).is_none() {
            return Err(ProtocolError::NotRegistered(id));
        }
        interrupts.set_enabled(self.enabled_events().bits());
        handlers.retire(id);

        if self.table.is_empty() {
            self.installer.uninstall();
            debug!("isp dispatcher uninstalled");
        }
        debug!("{id:?} deregistered, ref_count={}", self.table.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isp::{event::Event, regs::InterruptFile, test_support::TrackingInstaller};

    fn reg(mask: EventMask) -> Registration {
        Registration {
            mask,
            handler: None,
        }
    }

    #[test]
    fn af_then_ae_scenario() {
        let irq = InterruptFile::new();
        let handlers = HandlerTable::new();
        let mut mux = InterruptMultiplexer::new(TrackingInstaller::default());

        // 0 -> 1 installs
        mux.register(&irq, &handlers, SubmoduleId::Af, reg(AF_EVENTS)).unwrap();
        assert_eq!(mux.ref_count(), 1);
        assert_eq!(mux.installer().installs, 1);
        assert_eq!(irq.enabled(), AF_EVENTS.bits());

        // 1 -> 2 does not reinstall
        mux.register(&irq, &handlers, SubmoduleId::Ae, reg(AE_EVENTS)).unwrap();
        assert_eq!(mux.ref_count(), 2);
        assert_eq!(mux.installer().installs, 1);
        assert_eq!(irq.enabled(), (AF_EVENTS | AE_EVENTS).bits());

        // 2 -> 1 keeps only AE bits
        mux.deregister(&irq, &handlers, SubmoduleId::Af).unwrap();
        assert_eq!(mux.ref_count(), 1);
        assert_eq!(mux.installer().uninstalls, 0);
        assert_eq!(irq.enabled(), AE_EVENTS.bits());

        // 1 -> 0 uninstalls
        mux.deregister(&irq, &handlers, SubmoduleId::Ae).unwrap();
        assert_eq!(mux.ref_count(), 0);
        assert_eq!(mux.installer().uninstalls, 1);
        assert_eq!(irq.enabled(), 0);
    }

    #[test]
    fn protocol_errors_leave_registers_alone() {
        let irq = InterruptFile::new();
        let handlers = HandlerTable::new();
        let mut mux = InterruptMultiplexer::new(NoInstaller);

        mux.register(&irq, &handlers, SubmoduleId::Awb, reg(AWB_EVENTS)).unwrap();
        irq.raise(AWB_EVENTS);

        assert_eq!(
            mux.register(&irq, &handlers, SubmoduleId::Awb, reg(AWB_EVENTS)),
            Err(ProtocolError::DuplicateRegistration(SubmoduleId::Awb))
        );
        assert_eq!(
            mux.deregister(&irq, &handlers, SubmoduleId::Hist),
            Err(ProtocolError::NotRegistered(SubmoduleId::Hist))
        );
        assert_eq!(irq.enabled(), AWB_EVENTS.bits());
        assert_eq!(irq.raw_events(), AWB_EVENTS);
        assert_eq!(mux.ref_count(), 1);
    }

    #[test]
    fn registration_drops_events_latched_while_unregistered() {
        let irq = InterruptFile::new();
        let handlers = HandlerTable::new();
        let mut mux = InterruptMultiplexer::new(NoInstaller);

        irq.raise(AF_EVENTS | AE_EVENTS);
        mux.register(&irq, &handlers, SubmoduleId::Af, reg(AF_EVENTS)).unwrap();
        assert_eq!(irq.status(), 0);
        assert_eq!(irq.raw_events(), AE_EVENTS);

        mux.register(&irq, &handlers, SubmoduleId::Ae, reg(AE_EVENTS)).unwrap();
        assert!(irq.raw_events().is_empty());

        // Events raised after joining are kept, even across another engine leaving
        irq.raise(EventMask::from(Event::AfEnv));
        mux.deregister(&irq, &handlers, SubmoduleId::Ae).unwrap();
        assert_eq!(irq.status(), EventMask::from(Event::AfEnv).bits());
    }
}
