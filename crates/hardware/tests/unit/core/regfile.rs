//! # Register File Tests
//!
//! Integer width truncation, float views, misc registers, clearing and the
//! redirection table.

use multisim_core::common::RegisterFile;
use multisim_core::core::arch::gpr::IntRegFile;
use multisim_core::isa::Isa;
use multisim_core::isa::alpha::Alpha;
use multisim_core::isa::arm::Arm;
use multisim_core::isa::mips::{self, Mips};
use multisim_core::isa::sparc::{self, Sparc};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

#[test]
fn test_new_register_file_is_zeroed() {
    let regs = RegisterFile::<Sparc>::new();
    for i in 0..Sparc::NUM_INT_REGS {
        assert_eq!(regs.read(i), 0);
    }
    for i in 0..Sparc::NUM_FLOAT_REGS {
        assert_eq!(regs.read_f(i), 0);
    }
    for i in 0..Sparc::NUM_MISC_REGS {
        assert_eq!(regs.read_misc(i), 0);
    }
}

#[rstest]
#[case::alpha(Alpha::width_mask(), u64::MAX)]
#[case::sparc(Sparc::width_mask(), u64::MAX)]
#[case::mips(Mips::width_mask(), 0xffff_ffff)]
#[case::arm(Arm::width_mask(), 0xffff_ffff)]
fn test_width_mask_matches_machine_bytes(#[case] mask: u64, #[case] expected: u64) {
    assert_eq!(mask, expected);
}

#[test]
fn test_thirty_two_bit_write_truncates() {
    let mut regs = RegisterFile::<Mips>::new();
    regs.write(mips::reg::V0, 0xdead_beef_cafe_f00d);
    assert_eq!(regs.read(mips::reg::V0), 0xcafe_f00d);
}

#[test]
fn test_sign_extend_uses_machine_width() {
    assert_eq!(Mips::sign_extend(0xffff_fffe), -2);
    assert_eq!(Arm::sign_extend(0x7fff_ffff), 0x7fff_ffff);
    assert_eq!(Alpha::sign_extend(0xffff_fffe), 0xffff_fffe);
    assert_eq!(Sparc::sign_extend(u64::MAX), -1);
}

#[test]
fn test_registers_are_independent() {
    let mut regs = RegisterFile::<Alpha>::new();
    for i in 0..Alpha::NUM_INT_REGS {
        regs.write(i, (i as u64) << 40 | i as u64);
    }
    for i in 0..Alpha::NUM_INT_REGS {
        assert_eq!(regs.read(i), (i as u64) << 40 | i as u64);
    }
}

#[test]
fn test_double_and_bits_are_one_view() {
    let mut regs = RegisterFile::<Alpha>::new();
    regs.write_fd(3, 1.5);
    assert_eq!(regs.read_f(3), 1.5f64.to_bits());

    regs.write_f(4, 2.25f64.to_bits());
    assert_eq!(regs.read_fd(4), 2.25);
}

#[test]
fn test_single_precision_clears_upper_half() {
    let mut regs = RegisterFile::<Mips>::new();
    regs.write_f(2, u64::MAX);
    regs.float.write_single(2, -0.5);
    assert_eq!(regs.read_f(2), u64::from((-0.5f32).to_bits()));
    assert_eq!(regs.float.read_single(2), -0.5);
}

#[test]
fn test_misc_registers_hold_full_width() {
    let mut regs = RegisterFile::<Sparc>::new();
    regs.write_misc(sparc::misc::TICK, u64::MAX);
    assert_eq!(regs.read_misc(sparc::misc::TICK), u64::MAX);
}

#[test]
fn test_clear_zeroes_every_bank() {
    let mut regs = RegisterFile::<Arm>::new();
    regs.write(1, 7);
    regs.write_f(1, 7);
    regs.write_misc(0, 7);
    regs.clear();
    assert_eq!(regs, RegisterFile::<Arm>::new());
}

#[test]
fn test_process_emulation_map_is_identity() {
    for i in 0..Alpha::NUM_INT_REGS {
        assert_eq!(IntRegFile::<Alpha>::flatten(i), i);
    }
    for i in 0..Arm::NUM_INT_REGS {
        assert_eq!(IntRegFile::<Arm>::flatten(i), i);
    }
}

#[test]
fn test_redirection_tables_stay_in_bounds() {
    fn check<I: Isa>() {
        assert_eq!(I::INT_REG_MAP.len(), I::NUM_INT_REGS);
        assert!(I::INT_REG_MAP.iter().all(|&slot| slot < I::NUM_PHYS_INT_REGS));
    }
    check::<Alpha>();
    check::<Mips>();
    check::<Sparc>();
    check::<Arm>();
}

#[test]
fn test_flat_slots_follow_logical_writes() {
    let mut bank = IntRegFile::<Sparc>::new();
    bank.write(sparc::reg::CCR, 0x11);
    assert_eq!(bank.read_flat(IntRegFile::<Sparc>::flatten(sparc::reg::CCR)), 0x11);
    assert_eq!(bank.as_slice().len(), Sparc::NUM_PHYS_INT_REGS);
}

proptest! {
    #[test]
    fn test_sixty_four_bit_write_read_law(idx in 0..Alpha::NUM_INT_REGS, val in any::<u64>()) {
        let mut regs = RegisterFile::<Alpha>::new();
        regs.write(idx, val);
        prop_assert_eq!(regs.read(idx), val);
    }

    #[test]
    fn test_thirty_two_bit_write_read_law(idx in 0..Arm::NUM_INT_REGS, val in any::<u64>()) {
        let mut regs = RegisterFile::<Arm>::new();
        regs.write(idx, val);
        prop_assert_eq!(regs.read(idx), val & 0xffff_ffff);
    }

    #[test]
    fn test_float_bits_write_read_law(idx in 0..Sparc::NUM_FLOAT_REGS, val in any::<u64>()) {
        let mut regs = RegisterFile::<Sparc>::new();
        regs.write_f(idx, val);
        prop_assert_eq!(regs.read_f(idx), val);
    }

    #[test]
    fn test_other_registers_untouched(a in 0..Mips::NUM_INT_REGS, b in 0..Mips::NUM_INT_REGS, val in 1..u32::MAX) {
        prop_assume!(a != b);
        let mut regs = RegisterFile::<Mips>::new();
        regs.write(a, u64::from(val));
        prop_assert_eq!(regs.read(b), 0);
    }
}
