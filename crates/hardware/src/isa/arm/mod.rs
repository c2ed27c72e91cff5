//! ARMv7 architecture.
//!
//! 32-bit little-endian with 4 KiB small pages. There is no hardwired zero
//! register, and the program counter is held in [`PcState`](crate::core::PcState)
//! rather than the integer file.
//!
//! In full-system builds `sp` and `lr` redirect to the supervisor-mode banked
//! copies held in physical slots 15 and 16.

/// Process conventions and the Linux EABI syscall table.
pub mod process;

/// Remote debug hooks.
pub mod remote_debug;

/// Translation entry.
pub mod tlb;

use crate::isa::{ArchId, ByteOrder, FULL_SYSTEM, Isa, RegIndex, SyscallAbi, identity_map};

use self::tlb::ArmTlbEntry;

/// Integer register names.
pub mod reg {
    use crate::isa::RegIndex;

    /// First argument and result.
    pub const R0: RegIndex = 0;
    /// Second argument.
    pub const R1: RegIndex = 1;
    /// Third argument.
    pub const R2: RegIndex = 2;
    /// Syscall number under the EABI.
    pub const R7: RegIndex = 7;
    /// Static base.
    pub const R9: RegIndex = 9;
    /// Stack pointer.
    pub const SP: RegIndex = 13;
    /// Link register.
    pub const LR: RegIndex = 14;

    /// Logical integer registers (`r0`-`r14`).
    pub const NUM_ARCH: usize = 15;
    /// Banked supervisor stack pointer.
    pub const SP_SVC: RegIndex = 15;
    /// Banked supervisor link register.
    pub const LR_SVC: RegIndex = 16;
    /// Physical integer slots.
    pub const NUM_PHYS: usize = 17;
}

/// Misc register slots.
pub mod misc {
    use crate::isa::RegIndex;

    /// Current program status.
    pub const CPSR: RegIndex = 0;
    /// Saved program status, supervisor mode.
    pub const SPSR_SVC: RegIndex = 1;
    /// VFP status and control.
    pub const FPSCR: RegIndex = 2;
    /// VFP exception control.
    pub const FPEXC: RegIndex = 3;
    /// Translation table base 0.
    pub const TTBR0: RegIndex = 4;
    /// Context ID (ASID in the low byte).
    pub const CONTEXTIDR: RegIndex = 5;
    /// User read-only thread ID, the TLS pointer.
    pub const TPIDRURO: RegIndex = 6;

    /// Number of misc registers.
    pub const NUM: usize = 7;
}

/// Process-emulation map.
pub const SE_INT_REG_MAP: [RegIndex; reg::NUM_ARCH] = identity_map();

/// Full-system map: `sp` and `lr` read the supervisor bank.
pub const FS_INT_REG_MAP: [RegIndex; reg::NUM_ARCH] = {
    let mut map = identity_map::<{ reg::NUM_ARCH }>();
    map[reg::SP] = reg::SP_SVC;
    map[reg::LR] = reg::LR_SVC;
    map
};

/// ARM marker type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Arm;

impl Isa for Arm {
    const ID: ArchId = ArchId::Arm;
    const BYTE_ORDER: ByteOrder = ByteOrder::Little;
    const MACHINE_BYTES: u64 = 4;
    const PAGE_BYTES: u64 = 4096;
    const NUM_INT_REGS: usize = reg::NUM_ARCH;
    const NUM_PHYS_INT_REGS: usize = reg::NUM_PHYS;
    const INT_REG_MAP: &'static [RegIndex] = if FULL_SYSTEM {
        &FS_INT_REG_MAP
    } else {
        &SE_INT_REG_MAP
    };
    const NUM_FLOAT_REGS: usize = 32;
    const NUM_MISC_REGS: usize = misc::NUM;
    const ZERO_REG: Option<RegIndex> = None;
    const STACK_POINTER_REG: RegIndex = reg::SP;
    const SYSCALL_NUM_REG: RegIndex = reg::R7;
    const SYSCALL_ARG_REGS: &'static [RegIndex] = &[0, 1, 2, 3, 4, 5];
    const SYSCALL_ABI: SyscallAbi = SyscallAbi::SingleRegister { value: reg::R0 };
    // udf #0xf001, the Linux ARM breakpoint
    const BREAKPOINT_INSN: u32 = 0xe7f0_01f0;

    type TlbEntry = ArmTlbEntry;
}
