//! The interrupt registers, reachable without the configuration lock.
//!
//! Reading `INT_ST` and writing `INT_CLR` are single bus operations that never overlap the
//! `INT_ENA` rewrite done under the processor's critical section, so the dispatcher reaches
//! them through `&self` while configuration code may be holding the register block.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::isp::event::EventMask;

/// Access to `INT_ST`, `INT_CLR` and `INT_ENA`.
///
/// A memory-mapped implementation is a volatile pointer to [`map::INT_RAW`](super::map::INT_RAW)
/// and its neighbours.
pub trait InterruptRegs: Sync {
    /// Reads `INT_ST`: raised events that are also enabled.
    fn status(&self) -> u32;

    /// Writes `INT_CLR`; every set bit is acknowledged.
    fn clear(&self, bits: u32);

    /// Reads `INT_ENA`.
    fn enabled(&self) -> u32;

    /// Writes `INT_ENA`. Only called with the processor's critical section held.
    fn set_enabled(&self, bits: u32);

    /// Reads the status and acknowledges exactly the bits read.
    fn take_pending(&self) -> u32 {
        let status = self.status();
        self.clear(status);
        status
    }
}

/// In-memory interrupt registers: `INT_ST` is `INT_RAW & INT_ENA` and `INT_CLR` clears raw
/// bits.
#[derive(Debug, Default)]
pub struct InterruptFile {
    raw: AtomicU32,
    enabled: AtomicU32,
}

impl InterruptFile {
    pub const fn new() -> Self {
        Self {
            raw: AtomicU32::new(0),
            enabled: AtomicU32::new(0),
        }
    }

    /// Latches events into `INT_RAW` as the hardware would at frame end.
    pub fn raise(&self, events: EventMask) {
        self.raw.fetch_or(events.bits(), Ordering::SeqCst);
    }

    /// Raw, unmasked interrupt bits.
    pub fn raw_events(&self) -> EventMask {
        EventMask::from_bits_truncate(self.raw.load(Ordering::SeqCst))
    }
}

impl InterruptRegs for InterruptFile {
    fn status(&self) -> u32 {
        self.raw.load(Ordering::SeqCst) & self.enabled.load(Ordering::SeqCst)
    }

    fn clear(&self, bits: u32) {
        self.raw.fetch_and(!bits, Ordering::SeqCst);
    }

    fn enabled(&self) -> u32 {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, bits: u32) {
        self.enabled.store(bits, Ordering::SeqCst);
    }

    fn take_pending(&self) -> u32 {
        let enabled = self.enabled.load(Ordering::SeqCst);
        self.raw.fetch_and(!enabled, Ordering::SeqCst) & enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isp::event::{AE_EVENTS, AF_EVENTS, Event};

    #[test]
    fn status_is_raw_masked_by_enable() {
        let irq = InterruptFile::new();
        irq.set_enabled(AF_EVENTS.bits());
        irq.raise(AF_EVENTS | AE_EVENTS);

        assert_eq!(irq.status(), AF_EVENTS.bits());
        assert_eq!(irq.raw_events(), AF_EVENTS | AE_EVENTS);

        irq.clear(EventMask::from(Event::AfEnv).bits());
        assert_eq!(irq.status(), EventMask::from(Event::AfFdone).bits());
    }

    #[test]
    fn take_pending_leaves_disabled_bits_latched() {
        let irq = InterruptFile::new();
        irq.set_enabled(AF_EVENTS.bits());
        irq.raise(EventMask::from(Event::AfFdone) | AE_EVENTS);

        assert_eq!(irq.take_pending(), EventMask::from(Event::AfFdone).bits());
        assert_eq!(irq.take_pending(), 0);
        assert_eq!(irq.raw_events(), AE_EVENTS);
    }
}
