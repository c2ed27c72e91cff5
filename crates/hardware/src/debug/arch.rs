//! Per-architecture remote debug hooks.

use crate::common::error::DebugError;
use crate::core::context::ThreadContext;
use crate::isa::Isa;

/// What a remote debugger needs from an architecture.
///
/// The trait has no default methods. An architecture lacking a primitive
/// returns [`DebugError::Unimplemented`] from it.
pub trait DebugArch: Isa {
    /// Number of registers in the debugger's register block.
    const NUM_WIRE_REGS: usize;

    /// Returns `true` if the debugger may read or write `[addr, addr + len)`.
    fn memory_accessible(tc: &ThreadContext<Self>, addr: u64, len: usize) -> bool;

    /// Fills `wire` (of length [`Self::NUM_WIRE_REGS`]) in debugger order.
    fn read_wire_registers(tc: &ThreadContext<Self>, wire: &mut [u64]);

    /// Loads registers from `wire` (of length [`Self::NUM_WIRE_REGS`]).
    fn write_wire_registers(tc: &mut ThreadContext<Self>, wire: &[u64]);

    /// Arms a single-instruction step from the current PC.
    ///
    /// # Returns
    ///
    /// The address the step is expected to stop at.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::Unimplemented`] where stepping is unsupported.
    fn set_single_step(tc: &ThreadContext<Self>) -> Result<u64, DebugError>;

    /// Disarms a step armed by [`Self::set_single_step`].
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::Unimplemented`] where stepping is unsupported.
    fn clear_single_step(tc: &ThreadContext<Self>) -> Result<(), DebugError>;
}
