//! Syscall emulation.
//!
//! This module turns a trapping syscall into host-side work and back into
//! register state. It provides:
//! 1. **Outcomes:** [`SyscallReturn`] and the architecture-driven register encoding.
//! 2. **Descriptors:** Named, argument-counted table entries with a handler.
//! 3. **Handlers:** Architecture-generic emulations shared by every table.

/// Descriptors, handler context and the table contract.
pub mod desc;

/// Architecture-generic syscall handlers.
pub mod emul;

/// Syscall outcomes and the register encoding adapter.
pub mod ret;

pub use desc::{SyscallContext, SyscallDesc, SyscallEntry, SyscallHandler, SyscallTable};
pub use ret::{SyscallReturn, read_syscall_return, set_syscall_return};

/// Error numbers shared by every supported personality.
pub mod errno {
    /// Bad file descriptor.
    pub const EBADF: i64 = 9;
    /// Out of memory.
    pub const ENOMEM: i64 = 12;
    /// Bad address.
    pub const EFAULT: i64 = 14;
    /// Invalid argument.
    pub const EINVAL: i64 = 22;
    /// Result too large.
    pub const ERANGE: i64 = 34;
    /// Host I/O failure.
    pub const EIO: i64 = 5;
}
