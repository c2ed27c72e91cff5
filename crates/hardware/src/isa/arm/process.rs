//! ARM process conventions and Linux EABI syscall table.

use crate::core::context::ThreadContext;
use crate::isa::arm::{Arm, misc, reg};
use crate::process::image::LoadedImage;
use crate::process::os::Linux;
use crate::process::{ProcessArch, ProcessState, StackLayout};
use crate::syscall::desc::{SyscallContext, SyscallDesc, SyscallTable};
use crate::syscall::emul;
use crate::syscall::ret::SyscallReturn;

/// `CPSR`: user mode, ARM state, interrupts enabled.
const CPSR_USER: u64 = 0x10;
/// `FPEXC.EN`.
const FPEXC_EN: u64 = 0x4000_0000;

impl ProcessArch for Arm {
    const UNAME_MACHINE: &'static str = "armv7l";
    const STACK_BASE: u64 = 0xbf00_0000;
    const MMAP_START: u64 = 0x4000_0000;

    fn init_registers(
        tc: &mut ThreadContext<Self>,
        _image: &LoadedImage,
        _state: &ProcessState,
        _stack: &StackLayout,
    ) {
        // r0 is the atexit hook the dynamic loader would register.
        tc.set_int_reg(reg::R0, 0);
        tc.regs.write_misc(misc::CPSR, CPSR_USER);
        tc.regs.write_misc(misc::FPEXC, FPEXC_EN);
    }
}

/// ARM-private `set_tls(addr)`.
fn set_tls(ctx: &mut SyscallContext<'_, Arm>) -> SyscallReturn {
    let addr = ctx.arg(0);
    ctx.tc.regs.write_misc(misc::TPIDRURO, addr);
    SyscallReturn::ok(0)
}

impl SyscallTable<Linux> for Arm {
    const ENOSYS: i64 = 38;
    const SYSCALLS: &'static [(u64, SyscallDesc<Self>)] = &[
        (1, SyscallDesc::new("exit", 1, emul::exit)),
        (2, SyscallDesc::unimplemented("fork", 0)),
        (3, SyscallDesc::new("read", 3, emul::read)),
        (4, SyscallDesc::new("write", 3, emul::write)),
        (5, SyscallDesc::unimplemented("open", 3)),
        (6, SyscallDesc::new("close", 1, emul::close)),
        (10, SyscallDesc::unimplemented("unlink", 1)),
        (12, SyscallDesc::unimplemented("chdir", 1)),
        (19, SyscallDesc::unimplemented("lseek", 3)),
        (20, SyscallDesc::new("getpid", 0, emul::getpid)),
        (24, SyscallDesc::new("getuid", 0, emul::getuid)),
        (37, SyscallDesc::unimplemented("kill", 2)),
        (45, SyscallDesc::new("brk", 1, emul::brk)),
        (47, SyscallDesc::new("getgid", 0, emul::getgid)),
        (49, SyscallDesc::new("geteuid", 0, emul::geteuid)),
        (50, SyscallDesc::new("getegid", 0, emul::getegid)),
        (54, SyscallDesc::ignored("ioctl", 3)),
        (60, SyscallDesc::new("umask", 1, emul::umask)),
        (64, SyscallDesc::new("getppid", 0, emul::getppid)),
        (75, SyscallDesc::ignored("setrlimit", 2)),
        (91, SyscallDesc::ignored("munmap", 2)),
        (122, SyscallDesc::new("uname", 1, emul::uname)),
        (125, SyscallDesc::ignored("mprotect", 3)),
        (146, SyscallDesc::unimplemented("writev", 3)),
        (174, SyscallDesc::ignored("rt_sigaction", 4)),
        (175, SyscallDesc::ignored("rt_sigprocmask", 4)),
        (183, SyscallDesc::new("getcwd", 2, emul::getcwd)),
        (191, SyscallDesc::unimplemented("ugetrlimit", 2)),
        (192, SyscallDesc::new("mmap2", 6, emul::mmap)),
        (199, SyscallDesc::new("getuid32", 0, emul::getuid)),
        (200, SyscallDesc::new("getgid32", 0, emul::getgid)),
        (201, SyscallDesc::new("geteuid32", 0, emul::geteuid)),
        (202, SyscallDesc::new("getegid32", 0, emul::getegid)),
        (224, SyscallDesc::new("gettid", 0, emul::gettid)),
        (248, SyscallDesc::new("exit_group", 1, emul::exit_group)),
        (256, SyscallDesc::new("set_tid_address", 1, emul::set_tid_address)),
        (0x000f_0005, SyscallDesc::new("set_tls", 1, set_tls)),
    ];
}
