//! Instruction set architecture contract and build-time selection.
//!
//! This module defines the capability contract every simulated architecture
//! implements and binds exactly one of them as the active target. It provides:
//! 1. **Identity:** [`ArchId`], the closed set of supported architectures.
//! 2. **Contract:** [`Isa`], the associated constants and types each architecture
//!    fixes (register counts, redirection table, syscall ABI, trap encoding).
//! 3. **Selection:** [`TheIsa`] and [`ACTIVE_ARCH`], chosen by the `TARGET_ISA`
//!    build variable. Every architecture is compiled; only the selected one is
//!    wired into the default simulator types.
//!
//! Components are written once against [`Isa`] and monomorphized per
//! architecture, so no hot path ever branches on [`ArchId`] at run time.

/// Alpha (21264-class, little-endian, 64-bit).
pub mod alpha;

/// ARM (ARMv7 short-descriptor, little-endian, 32-bit).
pub mod arm;

/// MIPS32 (little-endian, branch delay slots).
pub mod mips;

/// SPARC V9 (big-endian, 64-bit, UltraSPARC sun4u TTEs).
pub mod sparc;

use std::fmt;

use crate::core::units::mmu::tlb::TranslationEntry;

/// Index into one register bank (integer, float or misc).
///
/// The range is fixed per architecture; staying inside it is the decode
/// layer's responsibility.
pub type RegIndex = usize;

/// Builds the identity logical-to-physical register map.
pub(crate) const fn identity_map<const N: usize>() -> [RegIndex; N] {
    let mut map = [0; N];
    let mut i = 0;
    while i < N {
        map[i] = i;
        i += 1;
    }
    map
}

/// `true` when the crate is built for full-system simulation.
///
/// Selects the register redirection tables; process-emulation builds use the
/// identity maps.
pub const FULL_SYSTEM: bool = cfg!(feature = "full-system");

/// Identity of a supported architecture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchId {
    /// DEC Alpha.
    Alpha,
    /// MIPS32.
    Mips,
    /// SPARC V9.
    Sparc,
    /// ARMv7.
    Arm,
}

impl ArchId {
    /// Returns the lower-case name used by `TARGET_ISA`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Mips => "mips",
            Self::Sparc => "sparc",
            Self::Arm => "arm",
        }
    }
}

impl fmt::Display for ArchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order of the simulated machine's memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    /// Least-significant byte at the lowest address.
    Little,
    /// Most-significant byte at the lowest address.
    Big,
}

impl ByteOrder {
    /// Encodes the low `width` bytes of `value` in this byte order.
    ///
    /// # Arguments
    ///
    /// * `value` - Value to encode.
    /// * `width` - Number of bytes to produce (1 to 8).
    pub fn encode(self, value: u64, width: usize) -> Vec<u8> {
        match self {
            Self::Little => value.to_le_bytes()[..width].to_vec(),
            Self::Big => value.to_be_bytes()[8 - width..].to_vec(),
        }
    }

    /// Decodes up to eight bytes in this byte order.
    pub fn decode(self, bytes: &[u8]) -> u64 {
        let fold = |acc: u64, b: &u8| (acc << 8) | u64::from(*b);
        match self {
            Self::Little => bytes.iter().rev().fold(0, fold),
            Self::Big => bytes.iter().fold(0, fold),
        }
    }
}

/// How a syscall outcome is encoded into registers.
///
/// Fixed per architecture through [`Isa::SYSCALL_ABI`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyscallAbi {
    /// A status register (zero on success, all ones on failure) paired with a
    /// value register holding the result or the negated error code.
    DualRegister {
        /// Register receiving the success/failure status.
        status: RegIndex,
        /// Register receiving the value.
        value: RegIndex,
    },
    /// One register whose sign alone conveys success.
    SingleRegister {
        /// Register receiving the value or the negated error code.
        value: RegIndex,
    },
    /// Condition-code carry bits signal failure; the value register holds the
    /// result or the negated error code.
    CarryFlag {
        /// Integer-file slot holding the condition codes.
        ccr: RegIndex,
        /// Carry bits set on failure and cleared on success.
        carry_mask: u64,
        /// Register receiving the value.
        value: RegIndex,
    },
}

/// The per-architecture capability contract.
///
/// Everything above the register files is generic over this trait; adding an
/// architecture means implementing it (plus the process, syscall-table and
/// debug contracts) without touching any generic component.
pub trait Isa: Copy + Default + Eq + fmt::Debug + Send + Sync + 'static {
    /// Identity of this architecture.
    const ID: ArchId;
    /// Memory byte order.
    const BYTE_ORDER: ByteOrder;
    /// Width of an integer register in bytes (4 or 8).
    const MACHINE_BYTES: u64;
    /// Base page size in bytes.
    const PAGE_BYTES: u64;
    /// Number of logical integer registers the decode layer may name.
    const NUM_INT_REGS: usize;
    /// Number of physical integer slots (logical plus shadow/banked copies).
    const NUM_PHYS_INT_REGS: usize;
    /// Logical-to-physical integer register map for this build mode.
    const INT_REG_MAP: &'static [RegIndex];
    /// Number of floating-point registers.
    const NUM_FLOAT_REGS: usize;
    /// Number of misc (control/status) registers.
    const NUM_MISC_REGS: usize;
    /// Hardwired-zero integer register, if the architecture has one.
    const ZERO_REG: Option<RegIndex>;
    /// Stack pointer register.
    const STACK_POINTER_REG: RegIndex;
    /// Register carrying the syscall number.
    const SYSCALL_NUM_REG: RegIndex;
    /// Registers carrying syscall arguments, in order.
    const SYSCALL_ARG_REGS: &'static [RegIndex];
    /// Syscall return convention.
    const SYSCALL_ABI: SyscallAbi;
    /// Instruction word that traps into the debugger.
    const BREAKPOINT_INSN: u32;
    /// Size of one instruction word in bytes.
    const INSN_BYTES: u64 = 4;

    /// Address-translation entry of this architecture.
    type TlbEntry: TranslationEntry;

    /// Mask selecting the machine-width bits of a register value.
    #[inline(always)]
    fn width_mask() -> u64 {
        if Self::MACHINE_BYTES >= 8 {
            u64::MAX
        } else {
            (1u64 << (Self::MACHINE_BYTES * 8)) - 1
        }
    }

    /// Sign-extends a machine-width register value to 64 bits.
    #[inline(always)]
    fn sign_extend(value: u64) -> i64 {
        let shift = 64 - Self::MACHINE_BYTES * 8;
        ((value << shift) as i64) >> shift
    }
}

#[cfg(not(any(
    sim_isa = "alpha",
    sim_isa = "mips",
    sim_isa = "sparc",
    sim_isa = "arm"
)))]
compile_error!(
    "no target architecture selected; build with TARGET_ISA set to one of alpha, mips, sparc, arm"
);

/// The architecture this simulator binary is built for.
#[cfg(sim_isa = "alpha")]
pub type TheIsa = alpha::Alpha;

/// The architecture this simulator binary is built for.
#[cfg(sim_isa = "mips")]
pub type TheIsa = mips::Mips;

/// The architecture this simulator binary is built for.
#[cfg(sim_isa = "sparc")]
pub type TheIsa = sparc::Sparc;

/// The architecture this simulator binary is built for.
#[cfg(sim_isa = "arm")]
pub type TheIsa = arm::Arm;

/// Identity of the active architecture.
pub const ACTIVE_ARCH: ArchId = <TheIsa as Isa>::ID;
