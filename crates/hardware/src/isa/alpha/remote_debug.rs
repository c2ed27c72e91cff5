//! Alpha remote debug hooks.
//!
//! Register block: `r0`-`r31`, `f0`-`f31`, `pc`, the virtual frame pointer
//! (always zero here) and the thread-unique value.

use crate::common::error::DebugError;
use crate::core::context::ThreadContext;
use crate::debug::arch::DebugArch;
use crate::isa::alpha::{Alpha, misc, reg};

const WIRE_F0: usize = 32;
const WIRE_PC: usize = 64;
const WIRE_VFP: usize = 65;
const WIRE_UNIQ: usize = 66;

/// Addresses are 43-bit, sign-extended to 64.
const fn canonical(va: u64) -> bool {
    let top = (va as i64) >> 42;
    top == 0 || top == -1
}

impl DebugArch for Alpha {
    const NUM_WIRE_REGS: usize = 67;

    fn memory_accessible(tc: &ThreadContext<Self>, addr: u64, len: usize) -> bool {
        let last = addr.wrapping_add(len.saturating_sub(1) as u64);
        canonical(addr) && canonical(last) && tc.mem.is_mapped(addr, len)
    }

    fn read_wire_registers(tc: &ThreadContext<Self>, wire: &mut [u64]) {
        for (i, slot) in wire[..reg::NUM_ARCH].iter_mut().enumerate() {
            *slot = tc.read_int_reg(i);
        }
        for (i, slot) in wire[WIRE_F0..WIRE_PC].iter_mut().enumerate() {
            *slot = tc.regs.read_f(i);
        }
        wire[WIRE_PC] = tc.pc();
        wire[WIRE_VFP] = 0;
        wire[WIRE_UNIQ] = tc.regs.read_misc(misc::UNIQ);
    }

    fn write_wire_registers(tc: &mut ThreadContext<Self>, wire: &[u64]) {
        for (i, &val) in wire[..reg::NUM_ARCH].iter().enumerate() {
            tc.set_int_reg(i, val);
        }
        for (i, &val) in wire[WIRE_F0..WIRE_PC].iter().enumerate() {
            tc.regs.write_f(i, val);
        }
        if wire[WIRE_PC] != tc.pc() {
            tc.set_pc(wire[WIRE_PC]);
        }
        tc.regs.write_misc(misc::UNIQ, wire[WIRE_UNIQ]);
    }

    fn set_single_step(tc: &ThreadContext<Self>) -> Result<u64, DebugError> {
        Ok(tc.pc.npc)
    }

    fn clear_single_step(_tc: &ThreadContext<Self>) -> Result<(), DebugError> {
        Ok(())
    }
}
