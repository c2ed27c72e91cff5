//! MIPS32 architecture.
//!
//! 32-bit little-endian with 4 KiB pages and branch delay slots. `LO` and
//! `HI` live in the integer file after the 32 architected registers, so the
//! multiply unit and the register file share one bank.

/// Process conventions and the Linux o32 syscall table.
pub mod process;

/// Remote debug hooks.
pub mod remote_debug;

/// Translation entry.
pub mod tlb;

use crate::isa::{ArchId, ByteOrder, Isa, RegIndex, SyscallAbi, identity_map};

use self::tlb::MipsTlbEntry;

/// Integer register names.
pub mod reg {
    use crate::isa::RegIndex;

    /// Hardwired zero.
    pub const ZERO: RegIndex = 0;
    /// Result and syscall number.
    pub const V0: RegIndex = 2;
    /// Second result.
    pub const V1: RegIndex = 3;
    /// First argument.
    pub const A0: RegIndex = 4;
    /// Second argument.
    pub const A1: RegIndex = 5;
    /// Third argument.
    pub const A2: RegIndex = 6;
    /// Fourth argument, and the syscall error flag on return.
    pub const A3: RegIndex = 7;
    /// Global pointer.
    pub const GP: RegIndex = 28;
    /// Stack pointer.
    pub const SP: RegIndex = 29;
    /// Frame pointer.
    pub const FP: RegIndex = 30;
    /// Return address.
    pub const RA: RegIndex = 31;
    /// Multiply/divide low word.
    pub const LO: RegIndex = 32;
    /// Multiply/divide high word.
    pub const HI: RegIndex = 33;

    /// Architected general-purpose registers.
    pub const NUM_ARCH: usize = 32;
    /// Integer file size including `LO` and `HI`.
    pub const NUM: usize = 34;
}

/// Misc register slots (CP0 and FPU control).
pub mod misc {
    use crate::isa::RegIndex;

    /// Processor status.
    pub const STATUS: RegIndex = 0;
    /// Cause of the last exception.
    pub const CAUSE: RegIndex = 1;
    /// Exception program counter.
    pub const EPC: RegIndex = 2;
    /// Faulting address.
    pub const BADVADDR: RegIndex = 3;
    /// VPN2 and ASID of the current translation.
    pub const ENTRYHI: RegIndex = 4;
    /// FPU implementation register.
    pub const FIR: RegIndex = 5;
    /// FPU control and status.
    pub const FCSR: RegIndex = 6;
    /// Thread pointer read by `rdhwr $29`.
    pub const USER_LOCAL: RegIndex = 7;

    /// Number of misc registers.
    pub const NUM: usize = 8;
}

/// Logical-to-physical map; MIPS has no banked integer registers.
pub const INT_REG_MAP: [RegIndex; reg::NUM] = identity_map();

/// MIPS marker type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Mips;

impl Isa for Mips {
    const ID: ArchId = ArchId::Mips;
    const BYTE_ORDER: ByteOrder = ByteOrder::Little;
    const MACHINE_BYTES: u64 = 4;
    const PAGE_BYTES: u64 = 4096;
    const NUM_INT_REGS: usize = reg::NUM;
    const NUM_PHYS_INT_REGS: usize = reg::NUM;
    const INT_REG_MAP: &'static [RegIndex] = &INT_REG_MAP;
    const NUM_FLOAT_REGS: usize = 32;
    const NUM_MISC_REGS: usize = misc::NUM;
    const ZERO_REG: Option<RegIndex> = Some(reg::ZERO);
    const STACK_POINTER_REG: RegIndex = reg::SP;
    const SYSCALL_NUM_REG: RegIndex = reg::V0;
    const SYSCALL_ARG_REGS: &'static [RegIndex] = &[reg::A0, reg::A1, reg::A2, reg::A3];
    const SYSCALL_ABI: SyscallAbi = SyscallAbi::DualRegister {
        status: reg::A3,
        value: reg::V0,
    };
    // break 0
    const BREAKPOINT_INSN: u32 = 0x0000_000d;

    type TlbEntry = MipsTlbEntry;
}
