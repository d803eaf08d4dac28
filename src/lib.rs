//! A `no_std`, no-alloc control core for image signal processors.
//!
//! This crate turns algorithm-level configuration (gamma curves, color correction
//! matrices, denoising templates, statistics windows, ratio thresholds) into the exact
//! register words the ISP expects, and shares the ISP's single interrupt line between the
//! statistics engines (autofocus, auto-exposure, auto-white-balance, histogram).
//!
//! # Features
//!
//! - **Zero heap allocation** - registration and handler tables are fixed-capacity
//! - **Validate, then write** - every setter rejects bad input before touching a register
//! - **One critical section** - all shared-word read-modify-writes are serialized
//! - **Reference-counted interrupt sharing** - the dispatcher is installed on the first
//!   registration and removed with the last
//! - **Bounded commit polls** - self-clearing update bits can never hang the caller
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────────────────────┐
//! │ AfController         │      │ Processor                            │
//! │ AeController         │─────▶│  critical_section::Mutex<RefCell<_>> │
//! │ AwbController        │ &ref │   ├─ RegisterBlock (R)               │
//! │ HistController       │      │   ├─ FSM: Init / Enabled             │
//! └──────────────────────┘      │   └─ InterruptMultiplexer (I)        │
//!          │                    │  outside the lock:                   │
//!          ▼                    │   ├─ InterruptRegs (INT_ST/CLR/ENA)  │
//! ┌──────────────────────┐      │   └─ handler table (atomics)         │
//! │ encode::* (pure)     │      └──────────────────────────────────────┘
//! │  gamma, ccm, ratio,  │                       ▲
//! │  denoise, histogram, │              ┌────────┴────────┐
//! │  window              │              │ ISR: dispatch() │
//! └──────────────────────┘              └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use embedded_isp::prelude::*;
//!
//! let processor = ProcessorBuilder::new()
//!     .registers(SimulatedIsp::new())
//!     .no_installer()
//!     .build();
//!
//! processor.enable(&ProcessorConfig::default()).unwrap();
//!
//! let mut af = AfController::new(&processor, AfConfig::default()).unwrap();
//! af.set_window(0, Point::new(100, 100), Point::new(400, 300)).unwrap();
//! af.set_edge_threshold_mode(EdgeThreshold::Manual(512)).unwrap();
//! af.enable().unwrap();
//!
//! // Interrupt handler
//! let yield_requested = processor.dispatch();
//! let _ = yield_requested;
//! ```

#![deny(unsafe_code)]
#![no_std]

#[cfg(test)]
extern crate std;

pub mod isp;

pub mod prelude {
    pub use crate::isp::prelude::*;
}
