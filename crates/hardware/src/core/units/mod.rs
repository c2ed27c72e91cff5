//! Execution units and functional components.
//!
//! Only the memory management unit survives in the ISA layer; instruction
//! execution is supplied by an external executor.

/// Memory Management Unit with the TLB and translation entries.
pub mod mmu;
