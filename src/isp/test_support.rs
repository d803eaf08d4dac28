//! Test support utilities - only compiled in test builds.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::isp::{
    builder::ProcessorBuilder,
    config::ProcessorConfig,
    event::EventMask,
    intr::{EventHandler, IrqInstaller},
    processor::Processor,
    sim::SimulatedIsp,
};

pub type TestProcessor = Processor<SimulatedIsp, TrackingInstaller>;

/// Installer that counts install/uninstall calls.
#[derive(Debug, Default)]
pub struct TrackingInstaller {
    pub installs: u32,
    pub uninstalls: u32,
}

impl IrqInstaller for TrackingInstaller {
    fn install(&mut self) {
        assert_eq!(self.installs, self.uninstalls, "dispatcher installed twice");
        self.installs += 1;
    }

    fn uninstall(&mut self) {
        assert_eq!(self.installs, self.uninstalls + 1, "dispatcher not installed");
        self.uninstalls += 1;
    }
}

/// Handler that records how often it ran and the last events it saw.
///
/// Declare as a `static` in the test that uses it so counts don't leak between tests.
pub struct CountingHandler {
    calls: AtomicUsize,
    last: AtomicU32,
    yield_requested: bool,
}

impl CountingHandler {
    pub const fn new(yield_requested: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last: AtomicU32::new(0),
            yield_requested,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> EventMask {
        EventMask::from_bits_truncate(self.last.load(Ordering::SeqCst))
    }
}

impl EventHandler for CountingHandler {
    fn on_events(&self, events: EventMask) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last.store(events.bits(), Ordering::SeqCst);
        self.yield_requested
    }
}

/// Processor over a fresh simulated ISP, still in `Init`.
pub fn sim_processor() -> TestProcessor {
    ProcessorBuilder::new()
        .registers(SimulatedIsp::new())
        .installer(TrackingInstaller::default())
        .build()
}

/// Processor enabled with the default configuration and write tracking cleared.
pub fn enabled_processor() -> TestProcessor {
    let isp = sim_processor();
    isp.enable(&ProcessorConfig::default())
        .expect("default config enables");
    isp.with_registers_mut(|r| r.file_mut().clear_written());
    isp
}
