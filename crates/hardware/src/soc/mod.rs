//! System-on-Chip (SoC) Components.
//!
//! This module organizes the storage side of the simulated system. The ISA layer
//! only needs functional memory; buses, caches and devices live outside it.

/// Functional simulated memory.
pub mod memory;

pub use memory::FunctionalMemory;
