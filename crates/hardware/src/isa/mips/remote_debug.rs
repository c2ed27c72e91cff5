//! MIPS remote debug hooks.
//!
//! Register block layout:
//!
//! | index | register        |
//! |-------|-----------------|
//! | 0-31  | `r0`-`r31`      |
//! | 32    | `sr` (Status)   |
//! | 33    | `lo`            |
//! | 34    | `hi`            |
//! | 35    | `badvaddr`      |
//! | 36    | `cause`         |
//! | 37    | `pc`            |
//! | 38-69 | `f0`-`f31`      |
//! | 70    | `fsr` (FCSR)    |
//! | 71    | `fir`           |

use crate::common::error::DebugError;
use crate::core::context::ThreadContext;
use crate::debug::arch::DebugArch;
use crate::isa::mips::{Mips, misc, reg};

const WIRE_SR: usize = 32;
const WIRE_LO: usize = 33;
const WIRE_HI: usize = 34;
const WIRE_BADVADDR: usize = 35;
const WIRE_CAUSE: usize = 36;
const WIRE_PC: usize = 37;
const WIRE_F0: usize = 38;
const WIRE_FSR: usize = 70;
const WIRE_FIR: usize = 71;

/// Top of the user segment (`kuseg`).
const KUSEG_END: u64 = 0x8000_0000;

impl DebugArch for Mips {
    const NUM_WIRE_REGS: usize = 72;

    fn memory_accessible(tc: &ThreadContext<Self>, addr: u64, len: usize) -> bool {
        addr.checked_add(len as u64)
            .is_some_and(|end| end <= KUSEG_END)
            && tc.mem.is_mapped(addr, len)
    }

    fn read_wire_registers(tc: &ThreadContext<Self>, wire: &mut [u64]) {
        for (i, slot) in wire[..reg::NUM_ARCH].iter_mut().enumerate() {
            *slot = tc.read_int_reg(i);
        }
        wire[WIRE_SR] = tc.regs.read_misc(misc::STATUS);
        wire[WIRE_LO] = tc.read_int_reg(reg::LO);
        wire[WIRE_HI] = tc.read_int_reg(reg::HI);
        wire[WIRE_BADVADDR] = tc.regs.read_misc(misc::BADVADDR);
        wire[WIRE_CAUSE] = tc.regs.read_misc(misc::CAUSE);
        wire[WIRE_PC] = tc.pc();
        for (i, slot) in wire[WIRE_F0..WIRE_FSR].iter_mut().enumerate() {
            *slot = tc.regs.read_f(i) & 0xffff_ffff;
        }
        wire[WIRE_FSR] = tc.regs.read_misc(misc::FCSR);
        wire[WIRE_FIR] = tc.regs.read_misc(misc::FIR);
    }

    fn write_wire_registers(tc: &mut ThreadContext<Self>, wire: &[u64]) {
        for (i, &val) in wire[..reg::NUM_ARCH].iter().enumerate() {
            tc.set_int_reg(i, val);
        }
        tc.regs.write_misc(misc::STATUS, wire[WIRE_SR]);
        tc.set_int_reg(reg::LO, wire[WIRE_LO]);
        tc.set_int_reg(reg::HI, wire[WIRE_HI]);
        tc.regs.write_misc(misc::BADVADDR, wire[WIRE_BADVADDR]);
        tc.regs.write_misc(misc::CAUSE, wire[WIRE_CAUSE]);
        if wire[WIRE_PC] != tc.pc() {
            tc.set_pc(wire[WIRE_PC]);
        }
        // Cells are 32 bits on the wire; the upper half of a held double stays.
        for (i, &val) in wire[WIRE_F0..WIRE_FSR].iter().enumerate() {
            let high = tc.regs.read_f(i) & !0xffff_ffff;
            tc.regs.write_f(i, high | (val & 0xffff_ffff));
        }
        tc.regs.write_misc(misc::FCSR, wire[WIRE_FSR]);
        // fir is read-only
    }

    /// The instruction after the current one is `npc`, delay slot or not.
    fn set_single_step(tc: &ThreadContext<Self>) -> Result<u64, DebugError> {
        Ok(tc.pc.npc)
    }

    fn clear_single_step(_tc: &ThreadContext<Self>) -> Result<(), DebugError> {
        Ok(())
    }
}
