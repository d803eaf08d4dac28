//! Shared interrupt example: several engines on one interrupt line
//!
//! This example demonstrates:
//! - A processor in a `static` shared between the main loop and a simulated ISR
//! - Installing the dispatcher on the first registration and removing it with the last
//! - Routing each engine's events to its own handler
//! - Yield requests returned from the dispatcher

use embedded_isp::prelude::*;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

/// Stands in for the interrupt controller.
#[derive(Default)]
struct PrintingInstaller;

impl IrqInstaller for PrintingInstaller {
    fn install(&mut self) {
        println!("  [irq] dispatcher installed");
    }

    fn uninstall(&mut self) {
        println!("  [irq] dispatcher removed");
    }
}

type Isp = Processor<SimulatedIsp, PrintingInstaller>;

static ISP: OnceLock<Isp> = OnceLock::new();
static RUNNING: AtomicBool = AtomicBool::new(true);

struct FrameCounter {
    name: &'static str,
    frames: AtomicU32,
    wake_task: bool,
}

impl EventHandler for FrameCounter {
    fn on_events(&self, events: EventMask) -> bool {
        let n = self.frames.fetch_add(1, Ordering::Relaxed) + 1;
        println!("  [isr] {} events {:?} (frame {n})", self.name, events);
        self.wake_task
    }
}

static AF_HANDLER: FrameCounter = FrameCounter {
    name: "af",
    frames: AtomicU32::new(0),
    wake_task: true,
};

static AE_HANDLER: FrameCounter = FrameCounter {
    name: "ae",
    frames: AtomicU32::new(0),
    wake_task: false,
};

fn isp() -> &'static Isp {
    ISP.get_or_init(|| {
        ProcessorBuilder::new()
            .registers(SimulatedIsp::new())
            .installer(PrintingInstaller)
            .build()
    })
}

fn main() {
    println!("=== Shared Interrupt Example ===\n");

    let isp = isp();
    isp.enable(&ProcessorConfig::default()).unwrap();

    let mut af = AfController::new(isp, AfConfig::default()).unwrap();
    af.register_event_handler(&AF_HANDLER).unwrap();
    let mut ae = AeController::new(isp, AeConfig::default()).unwrap();
    ae.register_event_handler(&AE_HANDLER).unwrap();

    println!("Enabling AF and AE");
    af.enable().unwrap();
    ae.enable().unwrap();
    println!("Registered engines: {}", isp.ref_count());
    println!("Enabled events: {:?}\n", isp.enabled_events());

    // The ISR polls the line and dispatches
    let isr = thread::spawn(|| {
        while RUNNING.load(Ordering::Acquire) {
            if self::isp().dispatch() {
                println!("  [isr] yield requested");
            }
            thread::sleep(Duration::from_millis(5));
        }
    });

    // The "hardware" finishes a few frames
    for frame in 0..4 {
        let mut events = EventMask::from(Event::AfFdone) | EventMask::from(Event::AeFrameDone);
        if frame == 2 {
            events |= EventMask::from(Event::AfEnv);
        }
        isp.interrupts().raise(events);
        thread::sleep(Duration::from_millis(20));
    }

    RUNNING.store(false, Ordering::Release);
    isr.join().unwrap();

    println!("\nDisabling");
    drop(af);
    ae.disable().unwrap();
    println!("Registered engines: {}", isp.ref_count());
    println!(
        "AF frames: {}, AE frames: {}",
        AF_HANDLER.frames.load(Ordering::Relaxed),
        AE_HANDLER.frames.load(Ordering::Relaxed)
    );
}
