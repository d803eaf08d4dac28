#![allow(unsafe_code)]

//! Handler table read by the shared dispatcher without the critical section.
//!
//! Each engine owns one slot: a published event mask and a handler cell. Configuration code
//! publishes and retires slots with the processor's critical section held. A handler cell is
//! written only while its slot is unpublished and no dispatch pass is running, so a pass that
//! observes a non-zero mask also observes the handler stored before it.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::isp::{
    event::EventMask,
    intr::{EventHandler, MAX_SUBMODULES, Registration, SubmoduleId},
};

struct Slot {
    mask: AtomicU32,
    handler: UnsafeCell<Option<&'static dyn EventHandler>>,
}

impl Slot {
    fn new() -> Self {
        Self {
            mask: AtomicU32::new(0),
            handler: UnsafeCell::new(None),
        }
    }
}

pub(crate) struct HandlerTable {
    slots: [Slot; MAX_SUBMODULES],
    /// Dispatch passes currently reading the slots.
    passes: AtomicU32,
}

// SAFETY: handler cells are only written by `publish`, on an unpublished slot that no pass
// can be reading (see `retire`); passes only read a cell after loading its non-zero mask.
unsafe impl Sync for HandlerTable {}

impl core::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerTable")
            .field("passes", &self.passes.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Counts one dispatch pass for as long as it lives.
struct Pass<'a>(&'a AtomicU32);

impl<'a> Pass<'a> {
    fn enter(passes: &'a AtomicU32) -> Self {
        passes.fetch_add(1, Ordering::SeqCst);
        Pass(passes)
    }
}

impl Drop for Pass<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl HandlerTable {
    pub(crate) fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| Slot::new()),
            passes: AtomicU32::new(0),
        }
    }

    /// Makes `registration` visible to dispatch passes.
    ///
    /// Called with the critical section held, for a slot that is not published.
    pub(crate) fn publish(&self, id: SubmoduleId, registration: Registration) {
        let slot = &self.slots[id.index()];
        debug_assert_eq!(slot.mask.load(Ordering::SeqCst), 0, "slot already published");
        // SAFETY: the slot is unpublished and its last retire waited out every pass that
        // could have seen the previous mask.
        unsafe { *slot.handler.get() = registration.handler };
        slot.mask.store(registration.mask.bits(), Ordering::SeqCst);
    }

    /// Hides `id` from dispatch passes and waits until no running pass can still call it.
    ///
    /// Called with the critical section held. A handler that deregisters from inside a
    /// dispatch pass would wait on itself.
    pub(crate) fn retire(&self, id: SubmoduleId) {
        self.slots[id.index()].mask.store(0, Ordering::SeqCst);
        while self.passes.load(Ordering::SeqCst) != 0 {
            core::hint::spin_loop();
        }
    }

    /// Calls every published handler whose mask intersects `pending`, passing only its
    /// matching events.
    ///
    /// Returns true if any handler requested a yield.
    pub(crate) fn route(&self, pending: EventMask) -> bool {
        if pending.is_empty() {
            return false;
        }
        let _pass = Pass::enter(&self.passes);
        let mut yield_requested = false;
        for slot in &self.slots {
            let mask = EventMask::from_bits_truncate(slot.mask.load(Ordering::SeqCst));
            let matched = pending.intersection(mask);
            if matched.is_empty() {
                continue;
            }
            // SAFETY: the mask load above saw this slot published, and `publish` stored the
            // handler before the mask. `retire` keeps the cell unchanged while `_pass` lives.
            let handler = unsafe { *slot.handler.get() };
            if let Some(handler) = handler {
                yield_requested |= handler.on_events(matched);
            }
        }
        yield_requested
    }
}
