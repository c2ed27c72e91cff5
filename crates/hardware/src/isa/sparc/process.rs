//! SPARC process conventions and syscall tables.
//!
//! The 64-bit ABI biases `%sp` by 2047 and requires a 16-doubleword window
//! save area above it, so the initial stack pointer sits below `argc` by
//! both amounts.

use crate::core::context::ThreadContext;
use crate::isa::sparc::{NWINDOWS, Sparc, misc, reg};
use crate::process::image::LoadedImage;
use crate::process::os::{Linux, Solaris};
use crate::process::{ProcessArch, ProcessState, StackLayout};
use crate::syscall::desc::{SyscallContext, SyscallDesc, SyscallTable};
use crate::syscall::emul;
use crate::syscall::ret::SyscallReturn;

/// `PSTATE.PEF`: floating point enabled.
const PSTATE_PEF: u64 = 0x10;
/// `FPRS.FEF`.
const FPRS_FEF: u64 = 0x4;
/// `ASI_PRIMARY_NO_FAULT`.
const ASI_PNF: u64 = 0x82;

impl ProcessArch for Sparc {
    const UNAME_MACHINE: &'static str = "sparc64";
    const STACK_BASE: u64 = 0x0000_0800_0000_0000;
    const MMAP_START: u64 = 0xffff_f800_0000_0000;
    const STACK_BIAS: u64 = 2047;
    const STACK_RESERVE: u64 = 16 * 8;

    fn init_registers(
        tc: &mut ThreadContext<Self>,
        _image: &LoadedImage,
        _state: &ProcessState,
        stack: &StackLayout,
    ) {
        tc.set_int_reg(reg::O0, stack.argc);
        tc.set_int_reg(reg::O1, stack.argv);
        tc.set_int_reg(reg::G1, 0);
        tc.set_int_reg(reg::CCR, 0);
        tc.set_int_reg(reg::CANSAVE, NWINDOWS - 2);
        tc.set_int_reg(reg::CANRESTORE, 0);
        tc.set_int_reg(reg::OTHERWIN, 0);
        tc.set_int_reg(reg::CLEANWIN, NWINDOWS);
        tc.set_int_reg(reg::WSTATE, 0);
        tc.regs.write_misc(misc::CWP, 0);
        tc.regs.write_misc(misc::TL, 0);
        tc.regs.write_misc(misc::GL, 0);
        tc.regs.write_misc(misc::FPRS, FPRS_FEF);
        tc.regs.write_misc(misc::PSTATE, PSTATE_PEF);
        tc.regs.write_misc(misc::ASI, ASI_PNF);
    }
}

/// Solaris `getpid()`: pid in `%o0`, parent pid in `%o1`.
fn solaris_getpid(ctx: &mut SyscallContext<'_, Sparc>) -> SyscallReturn {
    ctx.tc.set_int_reg(reg::O1, ctx.process.ppid);
    SyscallReturn::ok(ctx.process.tgid as i64)
}

/// Solaris `getuid()`: uid in `%o0`, effective uid in `%o1`.
fn solaris_getuid(ctx: &mut SyscallContext<'_, Sparc>) -> SyscallReturn {
    ctx.tc.set_int_reg(reg::O1, ctx.process.euid);
    SyscallReturn::ok(ctx.process.uid as i64)
}

/// Solaris `getgid()`: gid in `%o0`, effective gid in `%o1`.
fn solaris_getgid(ctx: &mut SyscallContext<'_, Sparc>) -> SyscallReturn {
    ctx.tc.set_int_reg(reg::O1, ctx.process.egid);
    SyscallReturn::ok(ctx.process.gid as i64)
}

fn getpagesize(_ctx: &mut SyscallContext<'_, Sparc>) -> SyscallReturn {
    SyscallReturn::ok(8192)
}

impl SyscallTable<Linux> for Sparc {
    const ENOSYS: i64 = 90;
    const SYSCALLS: &'static [(u64, SyscallDesc<Self>)] = &[
        (1, SyscallDesc::new("exit", 1, emul::exit)),
        (2, SyscallDesc::unimplemented("fork", 0)),
        (3, SyscallDesc::new("read", 3, emul::read)),
        (4, SyscallDesc::new("write", 3, emul::write)),
        (5, SyscallDesc::unimplemented("open", 3)),
        (6, SyscallDesc::new("close", 1, emul::close)),
        (10, SyscallDesc::unimplemented("unlink", 1)),
        (12, SyscallDesc::unimplemented("chdir", 1)),
        (17, SyscallDesc::new("brk", 1, emul::brk)),
        (19, SyscallDesc::unimplemented("lseek", 3)),
        (20, SyscallDesc::new("getpid", 0, emul::getpid)),
        (23, SyscallDesc::ignored("setuid", 1)),
        (24, SyscallDesc::new("getuid", 0, emul::getuid)),
        (37, SyscallDesc::unimplemented("kill", 2)),
        (47, SyscallDesc::new("getgid", 0, emul::getgid)),
        (49, SyscallDesc::new("geteuid", 0, emul::geteuid)),
        (50, SyscallDesc::new("getegid", 0, emul::getegid)),
        (54, SyscallDesc::ignored("ioctl", 3)),
        (60, SyscallDesc::new("umask", 1, emul::umask)),
        (64, SyscallDesc::new("getpagesize", 0, getpagesize)),
        (71, SyscallDesc::new("mmap", 6, emul::mmap)),
        (73, SyscallDesc::ignored("munmap", 2)),
        (74, SyscallDesc::ignored("mprotect", 3)),
        (92, SyscallDesc::unimplemented("fcntl", 3)),
        (102, SyscallDesc::ignored("rt_sigaction", 4)),
        (103, SyscallDesc::ignored("rt_sigprocmask", 4)),
        (119, SyscallDesc::new("getcwd", 2, emul::getcwd)),
        (121, SyscallDesc::unimplemented("writev", 3)),
        (143, SyscallDesc::new("gettid", 0, emul::gettid)),
        (144, SyscallDesc::unimplemented("getrlimit", 2)),
        (145, SyscallDesc::ignored("setrlimit", 2)),
        (166, SyscallDesc::new("set_tid_address", 1, emul::set_tid_address)),
        (188, SyscallDesc::new("exit_group", 1, emul::exit_group)),
        (189, SyscallDesc::new("uname", 1, emul::uname)),
        (197, SyscallDesc::new("getppid", 0, emul::getppid)),
    ];
}

impl SyscallTable<Solaris> for Sparc {
    const ENOSYS: i64 = 89;
    const SYSCALLS: &'static [(u64, SyscallDesc<Self>)] = &[
        (1, SyscallDesc::new("exit", 1, emul::exit)),
        (2, SyscallDesc::unimplemented("fork", 0)),
        (3, SyscallDesc::new("read", 3, emul::read)),
        (4, SyscallDesc::new("write", 3, emul::write)),
        (5, SyscallDesc::unimplemented("open", 3)),
        (6, SyscallDesc::new("close", 1, emul::close)),
        (17, SyscallDesc::new("brk", 1, emul::brk)),
        (19, SyscallDesc::unimplemented("lseek", 3)),
        (20, SyscallDesc::new("getpid", 0, solaris_getpid)),
        (24, SyscallDesc::new("getuid", 0, solaris_getuid)),
        (47, SyscallDesc::new("getgid", 0, solaris_getgid)),
        (54, SyscallDesc::ignored("ioctl", 3)),
        (57, SyscallDesc::new("utssys", 1, emul::uname)),
        (60, SyscallDesc::new("umask", 1, emul::umask)),
        (62, SyscallDesc::unimplemented("fcntl", 3)),
        (115, SyscallDesc::new("mmap", 6, emul::mmap)),
        (116, SyscallDesc::ignored("mprotect", 3)),
        (117, SyscallDesc::ignored("munmap", 2)),
        (128, SyscallDesc::ignored("setrlimit", 2)),
        (129, SyscallDesc::unimplemented("getrlimit", 2)),
    ];
}
