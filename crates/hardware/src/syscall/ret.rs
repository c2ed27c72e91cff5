//! Syscall outcomes and their register encoding.
//!
//! An emulated syscall produces a [`SyscallReturn`]; [`set_syscall_return`]
//! writes it into the register file using the convention the architecture
//! declares in [`Isa::SYSCALL_ABI`]. The convention is a compile-time constant
//! per architecture, so the match below folds away after monomorphization.

use crate::common::reg::RegisterFile;
use crate::isa::{Isa, SyscallAbi};

/// Outcome of one emulated syscall.
///
/// Error codes are stored as positive magnitudes; the register encoding
/// negates them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyscallReturn {
    value: i64,
    success: bool,
}

impl SyscallReturn {
    /// Successful call returning `value`.
    pub const fn ok(value: i64) -> Self {
        Self {
            value,
            success: true,
        }
    }

    /// Failed call with error code `errno` (sign ignored).
    pub const fn err(errno: i64) -> Self {
        Self {
            value: errno.wrapping_abs(),
            success: false,
        }
    }

    /// Interprets a raw host-style result: negative means failure with the
    /// negated value as error code.
    pub const fn from_signed(raw: i64) -> Self {
        if raw < 0 { Self::err(raw) } else { Self::ok(raw) }
    }

    /// Returns `true` for a successful call.
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the result on success or the positive error code on failure.
    pub const fn value(&self) -> i64 {
        self.value
    }

    /// Returns the error code, if the call failed.
    pub const fn errno(&self) -> Option<i64> {
        if self.success { None } else { Some(self.value) }
    }

    /// Value as placed in the value register: the result, or the negated error code.
    pub const fn encoded(&self) -> i64 {
        if self.success {
            self.value
        } else {
            self.value.wrapping_neg()
        }
    }
}

/// Writes `ret` into `regs` following the convention of architecture `I`.
///
/// Values are truncated to the machine width by the integer bank.
///
/// # Arguments
///
/// * `ret` - Outcome to encode.
/// * `regs` - Register file of the thread that made the call.
pub fn set_syscall_return<I: Isa>(ret: SyscallReturn, regs: &mut RegisterFile<I>) {
    let value = ret.encoded() as u64;
    match I::SYSCALL_ABI {
        SyscallAbi::DualRegister { status, value: reg } => {
            regs.write(status, if ret.is_success() { 0 } else { u64::MAX });
            regs.write(reg, value);
        }
        SyscallAbi::SingleRegister { value: reg } => regs.write(reg, value),
        SyscallAbi::CarryFlag {
            ccr,
            carry_mask,
            value: reg,
        } => {
            let flags = regs.read(ccr);
            let flags = if ret.is_success() {
                flags & !carry_mask
            } else {
                flags | carry_mask
            };
            regs.write(ccr, flags);
            regs.write(reg, value);
        }
    }
}

/// Decodes the outcome a program would observe from `regs`.
///
/// The inverse of [`set_syscall_return`], used when reporting results and by tests.
pub fn read_syscall_return<I: Isa>(regs: &RegisterFile<I>) -> SyscallReturn {
    match I::SYSCALL_ABI {
        SyscallAbi::DualRegister { status, value } => {
            let v = I::sign_extend(regs.read(value));
            if regs.read(status) == 0 {
                SyscallReturn::ok(v)
            } else {
                SyscallReturn::err(v)
            }
        }
        SyscallAbi::SingleRegister { value } => {
            SyscallReturn::from_signed(I::sign_extend(regs.read(value)))
        }
        SyscallAbi::CarryFlag {
            ccr,
            carry_mask,
            value,
        } => {
            let v = I::sign_extend(regs.read(value));
            if regs.read(ccr) & carry_mask == 0 {
                SyscallReturn::ok(v)
            } else {
                SyscallReturn::err(v)
            }
        }
    }
}
