//! MIPS process conventions and Linux o32 syscall table.

use crate::core::context::ThreadContext;
use crate::isa::mips::{Mips, misc, reg};
use crate::process::image::LoadedImage;
use crate::process::os::Linux;
use crate::process::{ProcessArch, ProcessState, StackLayout};
use crate::syscall::desc::{SyscallContext, SyscallDesc, SyscallTable};
use crate::syscall::emul;
use crate::syscall::ret::SyscallReturn;

/// `Status`: coprocessor 1 usable, user mode.
const STATUS_USER_FPU: u64 = 0x2000_0010;

impl ProcessArch for Mips {
    const UNAME_MACHINE: &'static str = "mips";
    const STACK_BASE: u64 = 0x8000_0000;
    const MMAP_START: u64 = 0x10000;

    fn init_registers(
        tc: &mut ThreadContext<Self>,
        image: &LoadedImage,
        _state: &ProcessState,
        stack: &StackLayout,
    ) {
        tc.set_int_reg(reg::A0, stack.argc);
        tc.set_int_reg(reg::A1, stack.argv);
        tc.set_int_reg(reg::A2, stack.envp);
        if let Some(gp) = image.global_pointer {
            tc.set_int_reg(reg::GP, gp);
        }
        tc.regs.write_misc(misc::STATUS, STATUS_USER_FPU);
    }
}

/// `set_thread_area(addr)`: sets the value `rdhwr $29` returns.
fn set_thread_area(ctx: &mut SyscallContext<'_, Mips>) -> SyscallReturn {
    let addr = ctx.arg(0);
    ctx.tc.regs.write_misc(misc::USER_LOCAL, addr);
    SyscallReturn::ok(0)
}

/// o32 numbers start at 4000.
impl SyscallTable<Linux> for Mips {
    const ENOSYS: i64 = 89;
    const SYSCALLS: &'static [(u64, SyscallDesc<Self>)] = &[
        (4001, SyscallDesc::new("exit", 1, emul::exit)),
        (4002, SyscallDesc::unimplemented("fork", 0)),
        (4003, SyscallDesc::new("read", 3, emul::read)),
        (4004, SyscallDesc::new("write", 3, emul::write)),
        (4005, SyscallDesc::unimplemented("open", 3)),
        (4006, SyscallDesc::new("close", 1, emul::close)),
        (4010, SyscallDesc::unimplemented("unlink", 1)),
        (4013, SyscallDesc::unimplemented("time", 1)),
        (4019, SyscallDesc::unimplemented("lseek", 3)),
        (4020, SyscallDesc::new("getpid", 0, emul::getpid)),
        (4024, SyscallDesc::new("getuid", 0, emul::getuid)),
        (4037, SyscallDesc::unimplemented("kill", 2)),
        (4045, SyscallDesc::new("brk", 1, emul::brk)),
        (4047, SyscallDesc::new("getgid", 0, emul::getgid)),
        (4049, SyscallDesc::new("geteuid", 0, emul::geteuid)),
        (4050, SyscallDesc::new("getegid", 0, emul::getegid)),
        (4054, SyscallDesc::ignored("ioctl", 3)),
        (4060, SyscallDesc::new("umask", 1, emul::umask)),
        (4064, SyscallDesc::new("getppid", 0, emul::getppid)),
        (4075, SyscallDesc::ignored("setrlimit", 2)),
        (4076, SyscallDesc::unimplemented("getrlimit", 2)),
        (4090, SyscallDesc::new("mmap", 6, emul::mmap)),
        (4091, SyscallDesc::ignored("munmap", 2)),
        (4122, SyscallDesc::new("uname", 1, emul::uname)),
        (4125, SyscallDesc::ignored("mprotect", 3)),
        (4146, SyscallDesc::unimplemented("writev", 3)),
        (4194, SyscallDesc::ignored("rt_sigaction", 4)),
        (4195, SyscallDesc::ignored("rt_sigprocmask", 4)),
        (4203, SyscallDesc::new("getcwd", 2, emul::getcwd)),
        (4222, SyscallDesc::new("gettid", 0, emul::gettid)),
        (4246, SyscallDesc::new("exit_group", 1, emul::exit_group)),
        (4252, SyscallDesc::new("set_tid_address", 1, emul::set_tid_address)),
        (4283, SyscallDesc::new("set_thread_area", 1, set_thread_area)),
    ];
}
