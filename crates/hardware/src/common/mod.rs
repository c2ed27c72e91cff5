//! Common utilities and types used throughout the simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Address Types:** Strong types for virtual and physical addresses and regions.
//! 2. **Error Handling:** Checkpoint, memory, debug, syscall and driver errors.
//! 3. **Register Management:** A unified interface over the integer, float and misc banks.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Error types.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use addr::{PhysAddr, VirtAddr, VirtRegion};
pub use error::{CheckpointError, DebugError, MemoryError, ProcessError, SimError, SyscallError};
pub use reg::RegisterFile;
