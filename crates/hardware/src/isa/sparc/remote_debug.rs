//! SPARC remote debug hooks.
//!
//! Register block: `%g0`-`%i7`, `%f0`-`%f62` as 32 doubles, then `pc`, `npc`,
//! the combined `state` word (`ccr`, `asi`, `pstate`, `cwp`), `fsr`, `fprs`
//! and `y`.

use crate::common::error::DebugError;
use crate::core::context::ThreadContext;
use crate::debug::arch::DebugArch;
use crate::isa::Isa;
use crate::isa::sparc::{Sparc, misc, reg};

const WIRE_F0: usize = 32;
const WIRE_PC: usize = 64;
const WIRE_NPC: usize = 65;
const WIRE_STATE: usize = 66;
const WIRE_FSR: usize = 67;
const WIRE_FPRS: usize = 68;
const WIRE_Y: usize = 69;

/// First address of the V9 virtual address hole.
const VA_HOLE_START: u64 = 0x0000_0800_0000_0000;
/// First address above the hole.
const VA_HOLE_END: u64 = 0xffff_f800_0000_0000;

const fn in_hole(va: u64) -> bool {
    va >= VA_HOLE_START && va < VA_HOLE_END
}

/// Packs `ccr`, `asi`, `pstate` and `cwp` the way `TSTATE` does.
fn state_word(tc: &ThreadContext<Sparc>) -> u64 {
    ((tc.read_int_reg(reg::CCR) & 0xff) << 32)
        | ((tc.regs.read_misc(misc::ASI) & 0xff) << 24)
        | ((tc.regs.read_misc(misc::PSTATE) & 0xfff) << 8)
        | (tc.regs.read_misc(misc::CWP) & 0x1f)
}

impl DebugArch for Sparc {
    const NUM_WIRE_REGS: usize = 70;

    fn memory_accessible(tc: &ThreadContext<Self>, addr: u64, len: usize) -> bool {
        let last = addr.wrapping_add(len.saturating_sub(1) as u64);
        last >= addr && !in_hole(addr) && !in_hole(last) && tc.mem.is_mapped(addr, len)
    }

    fn read_wire_registers(tc: &ThreadContext<Self>, wire: &mut [u64]) {
        for (i, slot) in wire[..reg::NUM_ARCH].iter_mut().enumerate() {
            *slot = tc.read_int_reg(i);
        }
        for (i, slot) in wire[WIRE_F0..WIRE_PC].iter_mut().enumerate() {
            *slot = tc.regs.read_f(i);
        }
        wire[WIRE_PC] = tc.pc.pc;
        wire[WIRE_NPC] = tc.pc.npc;
        wire[WIRE_STATE] = state_word(tc);
        wire[WIRE_FSR] = tc.regs.read_misc(misc::FSR);
        wire[WIRE_FPRS] = tc.regs.read_misc(misc::FPRS);
        wire[WIRE_Y] = tc.read_int_reg(reg::Y);
    }

    fn write_wire_registers(tc: &mut ThreadContext<Self>, wire: &[u64]) {
        for (i, &val) in wire[..reg::NUM_ARCH].iter().enumerate() {
            tc.set_int_reg(i, val);
        }
        for (i, &val) in wire[WIRE_F0..WIRE_PC].iter().enumerate() {
            tc.regs.write_f(i, val);
        }
        if (wire[WIRE_PC], wire[WIRE_NPC]) != (tc.pc.pc, tc.pc.npc) {
            tc.pc.pc = wire[WIRE_PC];
            tc.pc.npc = wire[WIRE_NPC];
            tc.pc.nnpc = wire[WIRE_NPC].wrapping_add(Self::INSN_BYTES);
        }
        let state = wire[WIRE_STATE];
        tc.set_int_reg(reg::CCR, (state >> 32) & 0xff);
        tc.regs.write_misc(misc::ASI, (state >> 24) & 0xff);
        tc.regs.write_misc(misc::PSTATE, (state >> 8) & 0xfff);
        tc.regs.write_misc(misc::CWP, state & 0x1f);
        tc.regs.write_misc(misc::FSR, wire[WIRE_FSR]);
        tc.regs.write_misc(misc::FPRS, wire[WIRE_FPRS]);
        tc.set_int_reg(reg::Y, wire[WIRE_Y]);
    }

    fn set_single_step(tc: &ThreadContext<Self>) -> Result<u64, DebugError> {
        Ok(tc.pc.npc)
    }

    fn clear_single_step(_tc: &ThreadContext<Self>) -> Result<(), DebugError> {
        Ok(())
    }
}
