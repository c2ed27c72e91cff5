//! Simulation driver and checkpoint persistence.
//!
//! Ties a thread context, its emulated process and its debug stub to an
//! external instruction executor, and saves or restores all of their state.

/// Checkpoint text format, writer and parser.
pub mod checkpoint;

/// Driver loop servicing syscall and breakpoint traps.
pub mod simulator;

pub use simulator::{DefaultSimulator, ExecOutcome, Executor, Simulator, TickOutcome};
