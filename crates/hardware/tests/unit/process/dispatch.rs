//! # Syscall Dispatch Tests
//!
//! Descriptor lookup and the `ENOSYS` path for numbers a table does not
//! emulate.

use std::collections::BTreeSet;

use multisim_core::common::SyscallError;
use multisim_core::isa::alpha::Alpha;
use multisim_core::isa::Isa;
use multisim_core::isa::arm::Arm;
use multisim_core::isa::mips::{self, Mips};
use multisim_core::isa::sparc::{self, Sparc};
use multisim_core::process::ProcessArch;
use multisim_core::process::os::{Linux, OsPersonality, Solaris};
use multisim_core::syscall::{SyscallEntry, SyscallReturn, SyscallTable, read_syscall_return};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::{config_with_args, invoke, started};

#[test]
fn test_lookup_distinguishes_unknown_from_unimplemented() {
    let (p, _) = started::<Mips, Linux>(&[0], &config_with_args(&["prog"]));

    assert_eq!(p.get_desc(4020).map(|d| d.name()), Ok("getpid"));
    assert_eq!(
        p.get_desc(4005).map(|d| d.name()),
        Err(SyscallError::Unimplemented {
            num: 4005,
            name: "open",
        })
    );
    assert_eq!(
        p.get_desc(20).map(|d| d.name()),
        Err(SyscallError::UnknownCall { num: 20 })
    );
}

#[test]
fn test_ignored_descriptor_is_found() {
    let (p, _) = started::<Sparc, Linux>(&[0], &config_with_args(&["prog"]));
    let desc = p.get_desc(54).unwrap();
    assert_eq!(desc.name(), "ioctl");
    assert_eq!(desc.argc(), 3);
    assert!(matches!(desc.entry(), SyscallEntry::Ignored));
    assert!(desc.is_implemented());
}

#[test]
fn test_unknown_and_unimplemented_both_return_enosys() {
    let (mut p, mut tc) = started::<Mips, Linux>(&[0], &config_with_args(&["prog"]));

    let unknown = invoke(&mut p, &mut tc, 9999, &[]);
    assert_eq!(unknown, SyscallReturn::err(89));
    assert_ne!(tc.read_int_reg(mips::reg::A3), 0);
    assert_eq!(Mips::sign_extend(tc.read_int_reg(mips::reg::V0)), -89);

    let unimplemented = invoke(&mut p, &mut tc, 4002, &[]);
    assert_eq!(unimplemented, SyscallReturn::err(89));
    assert!(p.exit_status().is_none());
}

#[rstest]
#[case::alpha(run_unknown::<Alpha, Linux>(), 78)]
#[case::mips(run_unknown::<Mips, Linux>(), 89)]
#[case::sparc_linux(run_unknown::<Sparc, Linux>(), 90)]
#[case::sparc_solaris(run_unknown::<Sparc, Solaris>(), 89)]
#[case::arm(run_unknown::<Arm, Linux>(), 38)]
fn test_enosys_is_numbered_per_target(#[case] ret: SyscallReturn, #[case] enosys: i64) {
    assert_eq!(ret, SyscallReturn::err(enosys));
}

fn run_unknown<I, O>() -> SyscallReturn
where
    I: ProcessArch + SyscallTable<O>,
    O: OsPersonality,
{
    let (mut p, mut tc) = started::<I, O>(&[0], &config_with_args(&["prog"]));
    let ret = invoke(&mut p, &mut tc, 0x7fff, &[]);
    assert_eq!(read_syscall_return::<I>(&tc.regs), ret);
    ret
}

#[test]
fn test_sparc_enosys_sets_carry() {
    let (mut p, mut tc) = started::<Sparc, Linux>(&[0], &config_with_args(&["prog"]));
    let _ = invoke(&mut p, &mut tc, 2, &[]);
    assert_eq!(tc.read_int_reg(sparc::reg::CCR) & 0x11, 0x11);
    assert_eq!(tc.read_int_reg(sparc::reg::O0) as i64, -90);
}

#[test]
fn test_tables_have_unique_numbers() {
    fn check<I: SyscallTable<O>, O: OsPersonality>() {
        let mut seen = BTreeSet::new();
        for (num, desc) in I::SYSCALLS {
            assert!(seen.insert(*num), "{} lists {num} twice ({})", O::NAME, desc.name());
        }
        assert!(I::SYSCALLS.iter().any(|(_, d)| d.name() == "exit"));
    }
    check::<Alpha, Linux>();
    check::<Mips, Linux>();
    check::<Sparc, Linux>();
    check::<Sparc, Solaris>();
    check::<Arm, Linux>();
}
