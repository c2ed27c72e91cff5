//! Remote debugging.
//!
//! This module lets an external debugger inspect and control the simulated
//! program. It includes the following:
//! 1. **Arch Hooks:** [`DebugArch`], the per-architecture register layout, memory
//!    access rule and single-step primitives.
//! 2. **Breakpoints:** A reference-counted table of inserted trap words.
//! 3. **Stub:** [`RemoteDebugStub`], the session state machine.

/// Per-architecture debug hooks.
pub mod arch;

/// Software breakpoint table.
pub mod breakpoints;

/// Session state machine.
pub mod stub;

pub use arch::DebugArch;
pub use breakpoints::BreakpointTable;
pub use stub::{DebugState, RemoteDebugStub, StopReason};
