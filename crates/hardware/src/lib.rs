//! Retargetable CPU simulator ISA layer.
//!
//! This crate implements the architecture-facing state of a multi-ISA simulator:
//! 1. **ISA:** Build-time selection of Alpha, MIPS, SPARC or ARM behind one `Isa` contract.
//! 2. **Core:** Integer, float and misc register files, PC state, thread context and TLB.
//! 3. **Process:** Syscall-emulated process startup, syscall tables and return encoding.
//! 4. **Debug:** Remote debug stub with breakpoints, single-step and checked memory access.
//! 5. **Simulation:** Driver loop, checkpoint persistence and configuration.

/// Common types (addresses, errors, the combined register file).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// Thread state (register banks, PC state, thread context, TLB).
pub mod core;
/// Remote debug stub, breakpoint table and per-architecture hooks.
pub mod debug;
/// Architecture contract, selection and the four implementations.
pub mod isa;
/// Emulated process, loaded images and OS personalities.
pub mod process;
/// Simulation driver and checkpointing.
pub mod sim;
/// Functional memory.
pub mod soc;
/// Syscall descriptors, handlers and the return adapter.
pub mod syscall;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Architectural state of one simulated thread.
pub use crate::core::ThreadContext;
/// The architecture selected at build time and its identity.
pub use crate::isa::{ACTIVE_ARCH, TheIsa};
/// Top-level driver; construct with `Simulator::new`.
pub use crate::sim::Simulator;
