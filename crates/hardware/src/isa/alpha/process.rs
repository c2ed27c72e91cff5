//! Alpha process conventions and Linux syscall table.

use crate::core::context::ThreadContext;
use crate::isa::Isa;
use crate::isa::alpha::{Alpha, misc, reg};
use crate::process::image::LoadedImage;
use crate::process::os::Linux;
use crate::process::{ProcessArch, ProcessState, StackLayout};
use crate::syscall::desc::{SyscallContext, SyscallDesc, SyscallTable};
use crate::syscall::emul;
use crate::syscall::ret::SyscallReturn;

/// Gap left between the stack top and the lowest text address.
const STACK_GAP: u64 = 409_600 + 4096;

/// Ibox mode: user.
const ICM_USER: u64 = 0x18;

impl ProcessArch for Alpha {
    const UNAME_MACHINE: &'static str = "alpha";
    const STACK_BASE: u64 = 0x1_1ff9_a000;
    const MMAP_START: u64 = 0x10000;

    /// Alpha places the stack just below the text segment.
    fn default_stack_base(image: &LoadedImage) -> u64 {
        image
            .text_base()
            .and_then(|text| text.checked_sub(STACK_GAP))
            .map_or(Self::STACK_BASE, |top| top & !(Self::PAGE_BYTES - 1))
    }

    fn init_registers(
        tc: &mut ThreadContext<Self>,
        image: &LoadedImage,
        state: &ProcessState,
        stack: &StackLayout,
    ) {
        tc.set_int_reg(reg::A0, stack.argc);
        tc.set_int_reg(reg::A1, stack.argv);
        tc.set_int_reg(reg::GP, image.global_pointer.unwrap_or(0));
        tc.set_int_reg(reg::PV, image.entry);
        tc.regs.write_misc(misc::IPR_ICM, ICM_USER);
        tc.regs.write_misc(misc::IPR_MCSR, 0);
        tc.regs.write_misc(misc::IPR_DTB_ASN, state.pid << 57);
    }
}

/// `getxpid()`: pid in `v0`, parent pid in `a4`.
fn getxpid(ctx: &mut SyscallContext<'_, Alpha>) -> SyscallReturn {
    ctx.tc.set_int_reg(reg::A4, ctx.process.ppid);
    SyscallReturn::ok(ctx.process.tgid as i64)
}

/// `getxuid()`: uid in `v0`, effective uid in `a4`.
fn getxuid(ctx: &mut SyscallContext<'_, Alpha>) -> SyscallReturn {
    ctx.tc.set_int_reg(reg::A4, ctx.process.euid);
    SyscallReturn::ok(ctx.process.uid as i64)
}

/// `getxgid()`: gid in `v0`, effective gid in `a4`.
fn getxgid(ctx: &mut SyscallContext<'_, Alpha>) -> SyscallReturn {
    ctx.tc.set_int_reg(reg::A4, ctx.process.egid);
    SyscallReturn::ok(ctx.process.gid as i64)
}

fn getpagesize(_ctx: &mut SyscallContext<'_, Alpha>) -> SyscallReturn {
    SyscallReturn::ok(Alpha::PAGE_BYTES as i64)
}

impl SyscallTable<Linux> for Alpha {
    const ENOSYS: i64 = 78;
    const SYSCALLS: &'static [(u64, SyscallDesc<Self>)] = &[
        (0, SyscallDesc::unimplemented("osf_syscall", 0)),
        (1, SyscallDesc::new("exit", 1, emul::exit)),
        (2, SyscallDesc::unimplemented("fork", 0)),
        (3, SyscallDesc::new("read", 3, emul::read)),
        (4, SyscallDesc::new("write", 3, emul::write)),
        (6, SyscallDesc::new("close", 1, emul::close)),
        (10, SyscallDesc::unimplemented("unlink", 1)),
        (12, SyscallDesc::unimplemented("chdir", 1)),
        (17, SyscallDesc::new("brk", 1, emul::brk)),
        (19, SyscallDesc::unimplemented("lseek", 3)),
        (20, SyscallDesc::new("getxpid", 0, getxpid)),
        (23, SyscallDesc::ignored("setuid", 1)),
        (24, SyscallDesc::new("getxuid", 0, getxuid)),
        (37, SyscallDesc::unimplemented("kill", 2)),
        (45, SyscallDesc::unimplemented("open", 3)),
        (47, SyscallDesc::new("getxgid", 0, getxgid)),
        (48, SyscallDesc::ignored("osf_sigprocmask", 2)),
        (54, SyscallDesc::ignored("ioctl", 3)),
        (60, SyscallDesc::new("umask", 1, emul::umask)),
        (64, SyscallDesc::new("getpagesize", 0, getpagesize)),
        (71, SyscallDesc::new("mmap", 6, emul::mmap)),
        (73, SyscallDesc::ignored("munmap", 2)),
        (74, SyscallDesc::ignored("mprotect", 3)),
        (87, SyscallDesc::new("gethostname", 2, emul::gethostname)),
        (92, SyscallDesc::unimplemented("fcntl", 3)),
        (144, SyscallDesc::unimplemented("getrlimit", 2)),
        (145, SyscallDesc::ignored("setrlimit", 2)),
        (156, SyscallDesc::ignored("osf_sigaction", 3)),
        (256, SyscallDesc::unimplemented("osf_getsysinfo", 5)),
        (257, SyscallDesc::ignored("osf_setsysinfo", 5)),
        (339, SyscallDesc::new("uname", 1, emul::uname)),
        (367, SyscallDesc::new("getcwd", 2, emul::getcwd)),
        (378, SyscallDesc::new("gettid", 0, emul::gettid)),
        (405, SyscallDesc::new("exit_group", 1, emul::exit_group)),
        (411, SyscallDesc::new("set_tid_address", 1, emul::set_tid_address)),
    ];
}
