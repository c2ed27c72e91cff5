//! ARM remote debug hooks.
//!
//! Register block: `r0`-`r14`, `pc`, `cpsr`. Hardware single-step is not
//! modelled, so step requests fail; breakpoints and continue still work.

use crate::common::error::DebugError;
use crate::core::context::ThreadContext;
use crate::debug::arch::DebugArch;
use crate::isa::ArchId;
use crate::isa::arm::{Arm, misc, reg};

const WIRE_PC: usize = 15;
const WIRE_CPSR: usize = 16;

impl DebugArch for Arm {
    const NUM_WIRE_REGS: usize = 17;

    fn memory_accessible(tc: &ThreadContext<Self>, addr: u64, len: usize) -> bool {
        addr.checked_add(len as u64)
            .is_some_and(|end| end <= 1 << 32)
            && tc.mem.is_mapped(addr, len)
    }

    fn read_wire_registers(tc: &ThreadContext<Self>, wire: &mut [u64]) {
        for (i, slot) in wire[..reg::NUM_ARCH].iter_mut().enumerate() {
            *slot = tc.read_int_reg(i);
        }
        wire[WIRE_PC] = tc.pc();
        wire[WIRE_CPSR] = tc.regs.read_misc(misc::CPSR);
    }

    fn write_wire_registers(tc: &mut ThreadContext<Self>, wire: &[u64]) {
        for (i, &val) in wire[..reg::NUM_ARCH].iter().enumerate() {
            tc.set_int_reg(i, val);
        }
        if wire[WIRE_PC] != tc.pc() {
            tc.set_pc(wire[WIRE_PC]);
        }
        tc.regs.write_misc(misc::CPSR, wire[WIRE_CPSR]);
    }

    fn set_single_step(_tc: &ThreadContext<Self>) -> Result<u64, DebugError> {
        Err(DebugError::Unimplemented {
            arch: ArchId::Arm,
            op: "set_single_step",
        })
    }

    fn clear_single_step(_tc: &ThreadContext<Self>) -> Result<(), DebugError> {
        Err(DebugError::Unimplemented {
            arch: ArchId::Arm,
            op: "clear_single_step",
        })
    }
}
