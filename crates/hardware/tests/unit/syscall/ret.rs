//! # Syscall Return Encoding Tests
//!
//! Each architecture's register convention for success and failure, and the
//! inverse decoding a program would perform.

use multisim_core::common::RegisterFile;
use multisim_core::isa::Isa;
use multisim_core::isa::alpha::{self, Alpha};
use multisim_core::isa::arm::{self, Arm};
use multisim_core::isa::mips::{self, Mips};
use multisim_core::isa::sparc::{self, Sparc};
use multisim_core::syscall::{SyscallReturn, read_syscall_return, set_syscall_return};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

fn encoded<I: Isa>(ret: SyscallReturn) -> RegisterFile<I> {
    let mut regs = RegisterFile::new();
    set_syscall_return::<I>(ret, &mut regs);
    regs
}

#[test]
fn test_mips_success_clears_status_register() {
    let mut regs = RegisterFile::<Mips>::new();
    regs.write(mips::reg::A3, 1);
    set_syscall_return::<Mips>(SyscallReturn::ok(5), &mut regs);
    assert_eq!(regs.read(mips::reg::A3), 0);
    assert_eq!(regs.read(mips::reg::V0), 5);
}

#[test]
fn test_mips_error_sets_status_and_negated_code() {
    let regs = encoded::<Mips>(SyscallReturn::err(2));
    assert_ne!(regs.read(mips::reg::A3), 0);
    assert_eq!(Mips::sign_extend(regs.read(mips::reg::V0)), -2);
    assert_eq!(read_syscall_return::<Mips>(&regs), SyscallReturn::err(2));
}

#[test]
fn test_alpha_error_uses_dual_registers() {
    let regs = encoded::<Alpha>(SyscallReturn::err(22));
    assert_eq!(regs.read(alpha::reg::A3), u64::MAX);
    assert_eq!(regs.read(alpha::reg::V0) as i64, -22);
}

#[test]
fn test_arm_error_is_negative_r0() {
    let regs = encoded::<Arm>(SyscallReturn::err(38));
    assert_eq!(regs.read(arm::reg::R0), 0xffff_ffda);
    assert_eq!(read_syscall_return::<Arm>(&regs), SyscallReturn::err(38));
}

#[test]
fn test_arm_success_touches_only_r0() {
    let mut regs = RegisterFile::<Arm>::new();
    regs.write(arm::reg::R1, 0x77);
    set_syscall_return::<Arm>(SyscallReturn::ok(3), &mut regs);
    assert_eq!(regs.read(arm::reg::R0), 3);
    assert_eq!(regs.read(arm::reg::R1), 0x77);
}

#[test]
fn test_sparc_error_sets_carry_flags() {
    let regs = encoded::<Sparc>(SyscallReturn::err(9));
    assert_eq!(regs.read(sparc::reg::CCR) & 0x11, 0x11);
    assert_eq!(regs.read(sparc::reg::O0) as i64, -9);
    assert_eq!(read_syscall_return::<Sparc>(&regs), SyscallReturn::err(9));
}

#[test]
fn test_sparc_success_clears_carry_and_keeps_other_flags() {
    let mut regs = RegisterFile::<Sparc>::new();
    regs.write(sparc::reg::CCR, 0x11 | 0x44);
    set_syscall_return::<Sparc>(SyscallReturn::ok(0), &mut regs);
    assert_eq!(regs.read(sparc::reg::CCR), 0x44);
    assert_eq!(regs.read(sparc::reg::O0), 0);
}

#[test]
fn test_thirty_two_bit_values_are_truncated() {
    let regs = encoded::<Mips>(SyscallReturn::ok(0x1_0000_0004));
    assert_eq!(regs.read(mips::reg::V0), 4);
}

#[rstest]
#[case::success(SyscallReturn::ok(100))]
#[case::zero(SyscallReturn::ok(0))]
#[case::enosys(SyscallReturn::err(89))]
#[case::efault(SyscallReturn::err(14))]
fn test_every_convention_decodes_what_it_encodes(#[case] ret: SyscallReturn) {
    assert_eq!(read_syscall_return::<Alpha>(&encoded::<Alpha>(ret)), ret);
    assert_eq!(read_syscall_return::<Mips>(&encoded::<Mips>(ret)), ret);
    assert_eq!(read_syscall_return::<Sparc>(&encoded::<Sparc>(ret)), ret);
    assert_eq!(read_syscall_return::<Arm>(&encoded::<Arm>(ret)), ret);
}

#[test]
fn test_negative_errno_is_normalised() {
    let ret = SyscallReturn::err(-14);
    assert_eq!(ret.errno(), Some(14));
    assert_eq!(ret.encoded(), -14);
    assert!(!ret.is_success());
    assert_eq!(SyscallReturn::ok(7).errno(), None);
}

proptest! {
    #[test]
    fn test_sixty_four_bit_successes_round_trip(value in 0i64..i64::MAX) {
        let ret = SyscallReturn::ok(value);
        prop_assert_eq!(read_syscall_return::<Alpha>(&encoded::<Alpha>(ret)), ret);
        prop_assert_eq!(read_syscall_return::<Sparc>(&encoded::<Sparc>(ret)), ret);
    }

    #[test]
    fn test_errors_round_trip_everywhere(errno in 1i64..4096) {
        let ret = SyscallReturn::err(errno);
        prop_assert_eq!(read_syscall_return::<Mips>(&encoded::<Mips>(ret)), ret);
        prop_assert_eq!(read_syscall_return::<Arm>(&encoded::<Arm>(ret)), ret);
        prop_assert_eq!(read_syscall_return::<Alpha>(&encoded::<Alpha>(ret)), ret);
        prop_assert_eq!(read_syscall_return::<Sparc>(&encoded::<Sparc>(ret)), ret);
    }
}
