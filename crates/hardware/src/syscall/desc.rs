//! Syscall descriptors and the per-architecture table contract.

use std::fmt;

use tracing::warn;

use crate::core::context::ThreadContext;
use crate::isa::Isa;
use crate::process::ProcessState;
use crate::process::os::OsPersonality;
use crate::syscall::ret::SyscallReturn;

/// Everything a syscall handler may touch.
#[derive(Debug)]
pub struct SyscallContext<'a, I: Isa> {
    /// Call number being serviced.
    pub num: u64,
    /// Calling thread.
    pub tc: &'a mut ThreadContext<I>,
    /// Process-wide state.
    pub process: &'a mut ProcessState,
}

impl<I: Isa> SyscallContext<'_, I> {
    /// Returns argument `n`, truncated to the machine width.
    pub fn arg(&self, n: usize) -> u64 {
        self.tc.syscall_arg(n)
    }
}

/// Emulation routine for one syscall.
pub type SyscallHandler<I> = fn(&mut SyscallContext<'_, I>) -> SyscallReturn;

/// How a known call number is serviced.
#[derive(Clone, Copy)]
pub enum SyscallEntry<I: Isa> {
    /// Run the handler.
    Emulated(SyscallHandler<I>),
    /// Report success without doing anything.
    Ignored,
    /// Known to the table but not emulated yet.
    Unimplemented,
}

impl<I: Isa> fmt::Debug for SyscallEntry<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Emulated(_) => "Emulated",
            Self::Ignored => "Ignored",
            Self::Unimplemented => "Unimplemented",
        })
    }
}

/// Descriptor of one call number.
#[derive(Clone, Copy, Debug)]
pub struct SyscallDesc<I: Isa> {
    name: &'static str,
    argc: u8,
    entry: SyscallEntry<I>,
}

impl<I: Isa> SyscallDesc<I> {
    /// Descriptor for an emulated call.
    pub const fn new(name: &'static str, argc: u8, handler: SyscallHandler<I>) -> Self {
        Self {
            name,
            argc,
            entry: SyscallEntry::Emulated(handler),
        }
    }

    /// Descriptor for a call that succeeds without effect.
    pub const fn ignored(name: &'static str, argc: u8) -> Self {
        Self {
            name,
            argc,
            entry: SyscallEntry::Ignored,
        }
    }

    /// Descriptor for a call that is known but not emulated.
    pub const fn unimplemented(name: &'static str, argc: u8) -> Self {
        Self {
            name,
            argc,
            entry: SyscallEntry::Unimplemented,
        }
    }

    /// Call name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Number of arguments the call takes.
    pub const fn argc(&self) -> u8 {
        self.argc
    }

    /// How the call is serviced.
    pub const fn entry(&self) -> SyscallEntry<I> {
        self.entry
    }

    /// Returns `true` unless the descriptor is a placeholder.
    pub const fn is_implemented(&self) -> bool {
        !matches!(self.entry, SyscallEntry::Unimplemented)
    }

    /// Services the call.
    ///
    /// Placeholders report the architecture's `ENOSYS`.
    pub fn invoke(&self, ctx: &mut SyscallContext<'_, I>, enosys: i64) -> SyscallReturn {
        match self.entry {
            SyscallEntry::Emulated(handler) => handler(ctx),
            SyscallEntry::Ignored => {
                warn!(name = self.name, num = ctx.num, "ignoring syscall");
                SyscallReturn::ok(0)
            }
            SyscallEntry::Unimplemented => SyscallReturn::err(enosys),
        }
    }
}

/// Syscall numbering of architecture `Self` under personality `O`.
pub trait SyscallTable<O: OsPersonality>: Isa {
    /// Sparse `(number, descriptor)` table.
    const SYSCALLS: &'static [(u64, SyscallDesc<Self>)];
    /// `ENOSYS` as numbered by this architecture and personality.
    const ENOSYS: i64;
}
