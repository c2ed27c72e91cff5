//! # Thread Context Tests
//!
//! Zero-register handling, syscall argument access, PC state and
//! all-or-nothing persistence.

use multisim_core::common::CheckpointError;
use multisim_core::core::{ThreadContext, ThreadStatus};
use multisim_core::core::units::mmu::TranslationEntry;
use multisim_core::isa::Isa;
use multisim_core::isa::alpha::{self, Alpha};
use multisim_core::isa::arm::{self, Arm};
use multisim_core::isa::mips::{self, Mips};
use multisim_core::isa::mips::tlb::MipsTlbEntry;
use multisim_core::isa::sparc::{self, Sparc};
use multisim_core::sim::checkpoint::{CheckpointOut, Serializable};
use pretty_assertions::assert_eq;

use crate::common::harness::context;

const SECTION: &str = "system.cpu.xc";

#[test]
fn test_zero_register_reads_zero_after_write() {
    let mut tc = context::<Mips>();
    tc.set_int_reg(mips::reg::ZERO, 0x1234);
    assert_eq!(tc.read_int_reg(mips::reg::ZERO), 0);

    let mut tc = context::<Alpha>();
    tc.set_int_reg(alpha::reg::ZERO, 0x1234);
    assert_eq!(tc.read_int_reg(alpha::reg::ZERO), 0);

    let mut tc = context::<Sparc>();
    tc.set_int_reg(sparc::reg::G0, 0x1234);
    assert_eq!(tc.read_int_reg(sparc::reg::G0), 0);
}

#[test]
fn test_arm_r0_is_an_ordinary_register() {
    let mut tc = context::<Arm>();
    tc.set_int_reg(arm::reg::R0, 0x1234);
    assert_eq!(tc.read_int_reg(arm::reg::R0), 0x1234);
}

#[test]
fn test_syscall_arguments_follow_abi_registers() {
    let mut tc = context::<Mips>();
    for (n, &reg) in Mips::SYSCALL_ARG_REGS.iter().enumerate() {
        tc.set_int_reg(reg, 10 + n as u64);
    }
    tc.set_int_reg(mips::reg::V0, 4020);
    assert_eq!(tc.syscall_num(), 4020);
    assert_eq!(tc.syscall_arg(0), 10);
    assert_eq!(tc.syscall_arg(3), 13);
    assert_eq!(tc.syscall_arg(4), 0);
}

#[test]
fn test_set_pc_makes_sequential_successors() {
    let mut tc = context::<Sparc>();
    tc.set_pc(0x1000);
    assert_eq!((tc.pc.pc, tc.pc.npc, tc.pc.nnpc), (0x1000, 0x1004, 0x1008));
    tc.advance_pc();
    assert_eq!((tc.pc.pc, tc.pc.npc, tc.pc.nnpc), (0x1004, 0x1008, 0x100c));
}

#[test]
fn test_clear_keeps_memory() {
    let mut tc = context::<Mips>();
    tc.mem.map(0x1000, 4).unwrap();
    tc.mem.write(0x1000, &[1, 2, 3, 4]).unwrap();
    tc.set_int_reg(mips::reg::SP, 0x7fff_0000);
    tc.set_pc(0x40_0000);
    let _ = tc.tlb.insert_at(0, MipsTlbEntry::new(0x2000, 1, 5, 6));

    tc.clear();

    assert_eq!(tc.read_int_reg(mips::reg::SP), 0);
    assert_eq!(tc.pc(), 0);
    assert_eq!(tc.tlb.valid_entries().count(), 0);
    let mut buf = [0; 4];
    tc.mem.read(0x1000, &mut buf).unwrap();
    assert_eq!(buf, [1, 2, 3, 4]);
}

#[test]
fn test_context_round_trips_through_checkpoint() {
    let mut tc = context::<Mips>();
    tc.set_int_reg(mips::reg::A0, 0xabcd);
    tc.set_int_reg(mips::reg::HI, 7);
    tc.regs.write_f(5, 0x3ff0_0000);
    tc.regs.write_misc(mips::misc::STATUS, 0x2000_0010);
    tc.pc.pc = 0x40_0010;
    tc.pc.npc = 0x40_0100;
    tc.pc.nnpc = 0x40_0104;
    tc.status = ThreadStatus::Suspended;
    let _ = tc.tlb.insert_at(3, MipsTlbEntry::new(0x1_0000, 2, 0x80, 0x81));

    let mut out = CheckpointOut::new();
    tc.serialize(&mut out, SECTION);
    let cp = out.to_checkpoint();

    let mut restored = context::<Mips>();
    restored.unserialize(&cp, SECTION).unwrap();
    assert_eq!(restored.regs, tc.regs);
    assert_eq!(restored.pc, tc.pc);
    assert_eq!(restored.status, ThreadStatus::Suspended);
    assert_eq!(restored.tlb, tc.tlb);
}

#[test]
fn test_missing_field_names_section_and_leaves_target_untouched() {
    let mut tc = context::<Arm>();
    tc.set_int_reg(arm::reg::R1, 99);
    tc.set_pc(0x8000);
    let mut out = CheckpointOut::new();
    tc.serialize(&mut out, SECTION);
    let mut cp = out.to_checkpoint();
    let _ = cp.remove(SECTION, "nnpc").unwrap();

    let mut target = context::<Arm>();
    target.set_int_reg(arm::reg::R1, 5);
    target.set_pc(0x100);
    let before = target.clone();

    let err = target.unserialize(&cp, SECTION).unwrap_err();
    assert!(
        matches!(&err, CheckpointError::MissingField { section, name } if section == SECTION && name == "nnpc"),
        "unexpected error: {err}"
    );
    assert_eq!(err.section(), Some(SECTION));
    assert_eq!(target.regs, before.regs);
    assert_eq!(target.pc, before.pc);
}

#[test]
fn test_bad_tlb_entry_rolls_back_registers() {
    let mut tc = context::<Mips>();
    tc.set_int_reg(mips::reg::A1, 1);
    let entry = MipsTlbEntry::new(0x4000, 0, 1, 2);
    let _ = tc.tlb.insert_at(0, entry);
    let mut out = CheckpointOut::new();
    tc.serialize(&mut out, SECTION);
    let mut cp = out.to_checkpoint();
    cp.set(
        &format!("{SECTION}.tlb.entry0"),
        MipsTlbEntry::PACKED_NAME,
        &(entry.pack() | 0xc000_0000).to_string(),
    );

    let mut target = context::<Mips>();
    let err = target.unserialize(&cp, SECTION).unwrap_err();
    assert!(matches!(err, CheckpointError::InconsistentEntry { .. }));
    assert_eq!(target.read_int_reg(mips::reg::A1), 0);
    assert_eq!(target.tlb.valid_entries().count(), 0);
}

#[test]
fn test_unknown_status_code_is_malformed() {
    let tc = context::<Alpha>();
    let mut out = CheckpointOut::new();
    tc.serialize(&mut out, SECTION);
    let mut cp = out.to_checkpoint();
    cp.set(SECTION, "status", "9");

    let mut target = context::<Alpha>();
    let err = target.unserialize(&cp, SECTION).unwrap_err();
    assert!(matches!(err, CheckpointError::Malformed { ref name, .. } if name == "status"));
}
