//! Alpha architecture.
//!
//! A 64-bit little-endian architecture with 8 KiB pages. Distinctive points:
//! 1. **PAL Shadow Registers:** In full-system mode, PALcode sees eight shadow copies
//!    in place of `r8`-`r14` and `r25`, held in physical slots 32-39.
//! 2. **Syscalls:** Number in `v0`; the outcome comes back as a status in `a3`
//!    and a value in `v0`.
//! 3. **Translation:** Entries pack into the hardware PTE layout.

/// Process conventions and the Linux syscall table.
pub mod process;

/// Remote debug hooks.
pub mod remote_debug;

/// Translation entry.
pub mod tlb;

use crate::isa::{ArchId, ByteOrder, FULL_SYSTEM, Isa, RegIndex, SyscallAbi, identity_map};

use self::tlb::AlphaTlbEntry;

/// Integer register names.
pub mod reg {
    use crate::isa::RegIndex;

    /// Function result.
    pub const V0: RegIndex = 0;
    /// First argument.
    pub const A0: RegIndex = 16;
    /// Second argument.
    pub const A1: RegIndex = 17;
    /// Syscall error status.
    pub const A3: RegIndex = 19;
    /// Secondary syscall result.
    pub const A4: RegIndex = 20;
    /// Return address.
    pub const RA: RegIndex = 26;
    /// Procedure value.
    pub const PV: RegIndex = 27;
    /// Global pointer.
    pub const GP: RegIndex = 29;
    /// Stack pointer.
    pub const SP: RegIndex = 30;
    /// Hardwired zero.
    pub const ZERO: RegIndex = 31;

    /// Architected integer registers.
    pub const NUM_ARCH: usize = 32;
    /// PAL shadow registers.
    pub const NUM_SHADOW: usize = 8;
}

/// Misc register slots.
pub mod misc {
    use crate::isa::RegIndex;

    /// Floating-point control register.
    pub const FPCR: RegIndex = 0;
    /// Thread-unique value (`rduniq`/`wruniq`).
    pub const UNIQ: RegIndex = 1;
    /// Load-locked flag.
    pub const LOCKFLAG: RegIndex = 2;
    /// Load-locked address.
    pub const LOCKADDR: RegIndex = 3;
    /// Pending interrupt flag.
    pub const INTR_FLAG: RegIndex = 4;
    /// Ibox current mode.
    pub const IPR_ICM: RegIndex = 5;
    /// Mbox control.
    pub const IPR_MCSR: RegIndex = 6;
    /// Data TLB address space number.
    pub const IPR_DTB_ASN: RegIndex = 7;

    /// Number of misc registers.
    pub const NUM: usize = 8;
}

/// Process-emulation map: every logical register is its own slot.
pub const SE_INT_REG_MAP: [RegIndex; reg::NUM_ARCH] = identity_map();

/// Full-system map: `r8`-`r14` and `r25` read the PAL shadow slots.
pub const FS_INT_REG_MAP: [RegIndex; reg::NUM_ARCH] = {
    let mut map = identity_map::<{ reg::NUM_ARCH }>();
    let mut i = 0;
    while i < 7 {
        map[8 + i] = reg::NUM_ARCH + i;
        i += 1;
    }
    map[25] = reg::NUM_ARCH + 7;
    map
};

/// Alpha marker type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Alpha;

impl Isa for Alpha {
    const ID: ArchId = ArchId::Alpha;
    const BYTE_ORDER: ByteOrder = ByteOrder::Little;
    const MACHINE_BYTES: u64 = 8;
    const PAGE_BYTES: u64 = 8192;
    const NUM_INT_REGS: usize = reg::NUM_ARCH;
    const NUM_PHYS_INT_REGS: usize = reg::NUM_ARCH + reg::NUM_SHADOW;
    const INT_REG_MAP: &'static [RegIndex] = if FULL_SYSTEM {
        &FS_INT_REG_MAP
    } else {
        &SE_INT_REG_MAP
    };
    const NUM_FLOAT_REGS: usize = 32;
    const NUM_MISC_REGS: usize = misc::NUM;
    const ZERO_REG: Option<RegIndex> = Some(reg::ZERO);
    const STACK_POINTER_REG: RegIndex = reg::SP;
    const SYSCALL_NUM_REG: RegIndex = reg::V0;
    const SYSCALL_ARG_REGS: &'static [RegIndex] = &[16, 17, 18, 19, 20, 21];
    const SYSCALL_ABI: SyscallAbi = SyscallAbi::DualRegister {
        status: reg::A3,
        value: reg::V0,
    };
    // call_pal bpt
    const BREAKPOINT_INSN: u32 = 0x0000_0080;

    type TlbEntry = AlphaTlbEntry;
}
