//! SPARC V9 architecture.
//!
//! A 64-bit big-endian architecture with 8 KiB base pages. Distinctive points:
//! 1. **Micro-architectural Registers:** `Y`, the condition codes and the
//!    register-window counters sit in the integer file after `%g0`-`%i7`.
//! 2. **Syscalls:** Number in `%g1`; failure is signalled through the carry
//!    bits of `%ccr` with the error code in `%o0`.
//! 3. **Stack Bias:** The 64-bit ABI offsets `%sp` by 2047 bytes.

/// Process conventions and the Linux and Solaris syscall tables.
pub mod process;

/// Remote debug hooks.
pub mod remote_debug;

/// Translation entry.
pub mod tlb;

use crate::isa::{ArchId, ByteOrder, Isa, RegIndex, SyscallAbi, identity_map};

use self::tlb::SparcTlbEntry;

/// Integer register names.
pub mod reg {
    use crate::isa::RegIndex;

    /// Hardwired zero.
    pub const G0: RegIndex = 0;
    /// Syscall number.
    pub const G1: RegIndex = 1;
    /// First out register: syscall result.
    pub const O0: RegIndex = 8;
    /// Second out register.
    pub const O1: RegIndex = 9;
    /// Stack pointer.
    pub const O6: RegIndex = 14;
    /// Return address.
    pub const O7: RegIndex = 15;
    /// Frame pointer.
    pub const I6: RegIndex = 30;

    /// Architected window-visible registers.
    pub const NUM_ARCH: usize = 32;

    /// Scratch for multi-step microcode.
    pub const UREG0: RegIndex = 32;
    /// Multiply/divide high word.
    pub const Y: RegIndex = 33;
    /// Condition codes (`xcc` in the high nibble, `icc` in the low).
    pub const CCR: RegIndex = 34;
    /// Windows available for `save`.
    pub const CANSAVE: RegIndex = 35;
    /// Windows available for `restore`.
    pub const CANRESTORE: RegIndex = 36;
    /// Windows known to be clean.
    pub const CLEANWIN: RegIndex = 37;
    /// Windows belonging to another address space.
    pub const OTHERWIN: RegIndex = 38;
    /// Window spill/fill trap selection.
    pub const WSTATE: RegIndex = 39;
    /// Graphics status.
    pub const GSR: RegIndex = 40;

    /// Integer file size.
    pub const NUM: usize = 41;
}

/// Misc register slots (privileged and ancillary state).
pub mod misc {
    use crate::isa::RegIndex;

    /// Default address space identifier.
    pub const ASI: RegIndex = 0;
    /// Cycle counter.
    pub const TICK: RegIndex = 1;
    /// Floating-point register state.
    pub const FPRS: RegIndex = 2;
    /// Performance control.
    pub const PCR: RegIndex = 3;
    /// Performance counters.
    pub const PIC: RegIndex = 4;
    /// Processor state.
    pub const PSTATE: RegIndex = 5;
    /// Trap level.
    pub const TL: RegIndex = 6;
    /// Processor interrupt level.
    pub const PIL: RegIndex = 7;
    /// Current window pointer.
    pub const CWP: RegIndex = 8;
    /// Global register level.
    pub const GL: RegIndex = 9;
    /// Floating-point state.
    pub const FSR: RegIndex = 10;
    /// Trap base address.
    pub const TBA: RegIndex = 11;

    /// Number of misc registers.
    pub const NUM: usize = 12;
}

/// Register windows implemented.
pub const NWINDOWS: u64 = 8;

/// Logical-to-physical map. Window rotation is resolved by the decode layer.
pub const INT_REG_MAP: [RegIndex; reg::NUM] = identity_map();

/// SPARC marker type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Sparc;

impl Isa for Sparc {
    const ID: ArchId = ArchId::Sparc;
    const BYTE_ORDER: ByteOrder = ByteOrder::Big;
    const MACHINE_BYTES: u64 = 8;
    const PAGE_BYTES: u64 = 8192;
    const NUM_INT_REGS: usize = reg::NUM;
    const NUM_PHYS_INT_REGS: usize = reg::NUM;
    const INT_REG_MAP: &'static [RegIndex] = &INT_REG_MAP;
    const NUM_FLOAT_REGS: usize = 32;
    const NUM_MISC_REGS: usize = misc::NUM;
    const ZERO_REG: Option<RegIndex> = Some(reg::G0);
    const STACK_POINTER_REG: RegIndex = reg::O6;
    const SYSCALL_NUM_REG: RegIndex = reg::G1;
    const SYSCALL_ARG_REGS: &'static [RegIndex] = &[8, 9, 10, 11, 12, 13];
    const SYSCALL_ABI: SyscallAbi = SyscallAbi::CarryFlag {
        ccr: reg::CCR,
        carry_mask: 0x11,
        value: reg::O0,
    };
    // ta 1
    const BREAKPOINT_INSN: u32 = 0x91d0_2001;

    type TlbEntry = SparcTlbEntry;
}
