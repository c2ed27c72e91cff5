//! Core processor state.
//!
//! This module contains the architectural state the ISA layer manages for each
//! hardware thread: the register banks, the MMU's translation cache and the
//! thread context tying them to a program counter and memory.

/// Architecture-generic register banks.
pub mod arch;

/// Thread context (registers, PC state, memory, TLB).
pub mod context;

/// Functional units (MMU and TLB).
pub mod units;

pub use self::context::{PcState, ThreadContext, ThreadStatus};
