//! Architecture-generic syscall handlers.
//!
//! Each handler reads its arguments through [`SyscallContext::arg`], touches
//! simulated memory through the thread context, and reports a
//! [`SyscallReturn`]; the caller encodes that into registers.

use std::io::Write;

use tracing::{debug, info, warn};

use crate::core::context::ThreadStatus;
use crate::isa::Isa;
use crate::syscall::desc::SyscallContext;
use crate::syscall::errno::{EBADF, EFAULT, EINVAL, EIO, ENOMEM, ERANGE};
use crate::syscall::ret::SyscallReturn;

const STDIN: u64 = 0;
const STDOUT: u64 = 1;
const STDERR: u64 = 2;

fn finish<I: Isa>(ctx: &mut SyscallContext<'_, I>, what: &str) -> SyscallReturn {
    let code = (ctx.arg(0) & 0xff) as i64;
    info!(code, "target called {what}()");
    ctx.process.exit_status = Some(code);
    ctx.tc.status = ThreadStatus::Halted;
    SyscallReturn::ok(0)
}

/// `exit(status)`: records the low byte of `status` and halts the thread.
pub fn exit<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    finish(ctx, "exit")
}

/// `exit_group(status)`: single-threaded, so identical to `exit`.
pub fn exit_group<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    finish(ctx, "exit_group")
}

/// `read(fd, buf, count)`: standard input is always at end of file.
pub fn read<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    match ctx.arg(0) {
        STDIN => SyscallReturn::ok(0),
        _ => SyscallReturn::err(EBADF),
    }
}

/// `write(fd, buf, count)`: standard output and error go to the host's.
///
/// The guest buffer is checked as a whole, then copied out a page at a time.
pub fn write<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    let (fd, buf) = (ctx.arg(0), ctx.arg(1));
    if fd != STDOUT && fd != STDERR {
        return SyscallReturn::err(EBADF);
    }
    let Ok(count) = usize::try_from(ctx.arg(2)) else {
        return SyscallReturn::err(EFAULT);
    };
    if !ctx.tc.mem.is_mapped(buf, count) {
        return SyscallReturn::err(EFAULT);
    }
    let mut sink: Box<dyn Write> = if fd == STDOUT {
        Box::new(std::io::stdout().lock())
    } else {
        Box::new(std::io::stderr().lock())
    };
    let mut chunk = vec![0u8; count.min(I::PAGE_BYTES as usize)];
    let mut done = 0;
    while done < count {
        let n = chunk.len().min(count - done);
        let addr = buf + done as u64;
        if ctx.tc.mem.read(addr, &mut chunk[..n]).is_err() {
            return SyscallReturn::err(EFAULT);
        }
        if let Err(e) = sink.write_all(&chunk[..n]) {
            warn!(fd, error = %e, "host write failed");
            return SyscallReturn::err(EIO);
        }
        done += n;
    }
    SyscallReturn::ok(count as i64)
}

/// `close(fd)`: only the standard descriptors exist.
pub fn close<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    if ctx.arg(0) <= STDERR {
        SyscallReturn::ok(0)
    } else {
        SyscallReturn::err(EBADF)
    }
}

/// `brk(addr)`: queries the break with 0, otherwise moves it, mapping new pages.
///
/// The break never moves below its initial value; such requests return the
/// current break unchanged.
pub fn brk<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    let new_brk = ctx.arg(0);
    let state = &mut *ctx.process;
    if new_brk == 0 || new_brk < state.brk_start {
        return SyscallReturn::ok(state.brk_point as i64);
    }
    if new_brk > state.brk_point
        && ctx.tc.mem.map(state.brk_point, new_brk - state.brk_point).is_err()
    {
        return SyscallReturn::ok(state.brk_point as i64);
    }
    debug!(from = state.brk_point, to = new_brk, "brk");
    state.brk_point = new_brk;
    SyscallReturn::ok(new_brk as i64)
}

/// `mmap(addr, length, ...)`: anonymous mappings placed at the mmap cursor.
///
/// The hint address, protection and file arguments are ignored.
pub fn mmap<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    let length = ctx.arg(1);
    if length == 0 {
        return SyscallReturn::err(EINVAL);
    }
    let start = ctx.process.mmap_end;
    let Some((len, end)) = length
        .checked_next_multiple_of(I::PAGE_BYTES)
        .and_then(|len| Some((len, start.checked_add(len)?)))
    else {
        return SyscallReturn::err(ENOMEM);
    };
    if ctx.tc.mem.map(start, len).is_err() {
        return SyscallReturn::err(ENOMEM);
    }
    ctx.process.mmap_end = end;
    debug!(start, len, "mmap");
    SyscallReturn::ok(start as i64)
}

/// `getpid()`: the thread-group id, as Linux reports it.
pub fn getpid<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    SyscallReturn::ok(ctx.process.tgid as i64)
}

/// `gettid()`.
pub fn gettid<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    SyscallReturn::ok(ctx.process.pid as i64)
}

/// `getppid()`.
pub fn getppid<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    SyscallReturn::ok(ctx.process.ppid as i64)
}

/// `getuid()`.
pub fn getuid<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    SyscallReturn::ok(ctx.process.uid as i64)
}

/// `geteuid()`.
pub fn geteuid<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    SyscallReturn::ok(ctx.process.euid as i64)
}

/// `getgid()`.
pub fn getgid<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    SyscallReturn::ok(ctx.process.gid as i64)
}

/// `getegid()`.
pub fn getegid<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    SyscallReturn::ok(ctx.process.egid as i64)
}

/// `set_tid_address(ptr)`: returns the caller's thread id.
pub fn set_tid_address<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    SyscallReturn::ok(ctx.process.pid as i64)
}

/// `umask(mask)`: always reports the conventional default.
pub fn umask<I: Isa>(_ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    SyscallReturn::ok(0o022)
}

/// `uname(buf)`: fills the six fixed-size `utsname` fields.
///
/// The node name is the configured hostname.
pub fn uname<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    let buf = ctx.arg(0);
    let uts = &ctx.process.uts;
    let width = uts.field_bytes;
    let fields = [
        uts.sysname,
        ctx.process.hostname.as_str(),
        uts.release,
        uts.version,
        uts.machine,
        "",
    ];
    let mut block = vec![0u8; width * fields.len()];
    for (i, field) in fields.iter().enumerate() {
        let n = field.len().min(width - 1);
        block[i * width..i * width + n].copy_from_slice(&field.as_bytes()[..n]);
    }
    match ctx.tc.mem.write(buf, &block) {
        Ok(()) => SyscallReturn::ok(0),
        Err(_) => SyscallReturn::err(EFAULT),
    }
}

/// `gethostname(buf, len)`.
pub fn gethostname<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    let (buf, len) = (ctx.arg(0), ctx.arg(1) as usize);
    let name = ctx.process.hostname.as_bytes();
    if name.len() + 1 > len {
        return SyscallReturn::err(EINVAL);
    }
    match ctx.tc.mem.write_cstring(buf, name) {
        Ok(()) => SyscallReturn::ok(0),
        Err(_) => SyscallReturn::err(EFAULT),
    }
}

/// `getcwd(buf, size)`: returns the length written, terminator included.
pub fn getcwd<I: Isa>(ctx: &mut SyscallContext<'_, I>) -> SyscallReturn {
    let (buf, size) = (ctx.arg(0), ctx.arg(1) as usize);
    let cwd = ctx.process.cwd.as_bytes();
    if cwd.len() + 1 > size {
        return SyscallReturn::err(ERANGE);
    }
    match ctx.tc.mem.write_cstring(buf, cwd) {
        Ok(()) => SyscallReturn::ok(cwd.len() as i64 + 1),
        Err(_) => SyscallReturn::err(EFAULT),
    }
}
