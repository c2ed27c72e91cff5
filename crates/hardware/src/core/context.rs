//! Thread context.
//!
//! Architectural state of one simulated hardware thread, as seen by the process
//! layer, the debug stub and the external executor. It provides:
//! 1. **Registers:** The register file, with the hardwired-zero rule applied on access.
//! 2. **Program Counter:** `pc`, `npc` and `nnpc`, covering delay-slot architectures.
//! 3. **Memory:** The thread's functional memory and TLB.
//! 4. **Persistence:** Registers, PC state and TLB in one transactional restore.

use crate::common::error::CheckpointError;
use crate::common::reg::RegisterFile;
use crate::core::units::mmu::tlb::Tlb;
use crate::isa::{Isa, RegIndex};
use crate::sim::checkpoint::{Checkpoint, CheckpointOut, Serializable};
use crate::soc::memory::FunctionalMemory;

/// Program counter state.
///
/// `npc` is the next instruction; `nnpc` the one after it, which differs from
/// `npc + 4` only inside a branch delay slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PcState {
    /// Current instruction address.
    pub pc: u64,
    /// Next instruction address.
    pub npc: u64,
    /// Instruction address after `npc`.
    pub nnpc: u64,
}

impl PcState {
    /// Sequential state starting at `pc`.
    pub const fn new(pc: u64, insn_bytes: u64) -> Self {
        Self {
            pc,
            npc: pc.wrapping_add(insn_bytes),
            nnpc: pc.wrapping_add(2 * insn_bytes),
        }
    }

    /// Moves to the next instruction.
    pub const fn advance(&mut self, insn_bytes: u64) {
        self.pc = self.npc;
        self.npc = self.nnpc;
        self.nnpc = self.nnpc.wrapping_add(insn_bytes);
    }
}

/// Run state of a thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThreadStatus {
    /// Fetching and executing.
    #[default]
    Active,
    /// Paused; may be resumed.
    Suspended,
    /// Finished; will not run again.
    Halted,
}

impl ThreadStatus {
    const fn code(self) -> u8 {
        match self {
            Self::Active => 0,
            Self::Suspended => 1,
            Self::Halted => 2,
        }
    }

    const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Active),
            1 => Some(Self::Suspended),
            2 => Some(Self::Halted),
            _ => None,
        }
    }
}

/// Architectural state of one thread of architecture `I`.
#[derive(Clone, Debug)]
pub struct ThreadContext<I: Isa> {
    /// Register file.
    pub regs: RegisterFile<I>,
    /// Program counter state.
    pub pc: PcState,
    /// Functional memory.
    pub mem: FunctionalMemory,
    /// Translation cache.
    pub tlb: Tlb<I::TlbEntry>,
    /// Run state.
    pub status: ThreadStatus,
}

impl<I: Isa> ThreadContext<I> {
    /// Creates a context with zeroed registers, empty memory and `tlb_entries` invalid TLB slots.
    pub fn new(tlb_entries: usize) -> Self {
        Self {
            regs: RegisterFile::new(),
            pc: PcState::default(),
            mem: FunctionalMemory::new(I::PAGE_BYTES),
            tlb: Tlb::new(tlb_entries),
            status: ThreadStatus::Active,
        }
    }

    /// Reads a logical integer register; the zero register always reads 0.
    #[inline(always)]
    pub fn read_int_reg(&self, idx: RegIndex) -> u64 {
        if I::ZERO_REG == Some(idx) {
            0
        } else {
            self.regs.read(idx)
        }
    }

    /// Writes a logical integer register; writes to the zero register are dropped.
    #[inline(always)]
    pub fn set_int_reg(&mut self, idx: RegIndex, val: u64) {
        if I::ZERO_REG != Some(idx) {
            self.regs.write(idx, val);
        }
    }

    /// Returns syscall argument `n` (zero past the last argument register).
    pub fn syscall_arg(&self, n: usize) -> u64 {
        I::SYSCALL_ARG_REGS
            .get(n)
            .map_or(0, |&reg| self.read_int_reg(reg))
    }

    /// Returns the syscall number register.
    pub fn syscall_num(&self) -> u64 {
        self.read_int_reg(I::SYSCALL_NUM_REG)
    }

    /// Returns the current instruction address.
    pub const fn pc(&self) -> u64 {
        self.pc.pc
    }

    /// Redirects execution to `pc` with sequential `npc`/`nnpc`.
    pub const fn set_pc(&mut self, pc: u64) {
        self.pc = PcState::new(pc, I::INSN_BYTES);
    }

    /// Moves past the current instruction.
    pub const fn advance_pc(&mut self) {
        self.pc.advance(I::INSN_BYTES);
    }

    /// Zeroes registers and PC and invalidates the TLB. Memory is kept.
    pub fn clear(&mut self) {
        self.regs.clear();
        self.pc = PcState::default();
        self.tlb.flush();
    }
}

impl<I: Isa> Serializable for ThreadContext<I> {
    fn serialize(&self, out: &mut CheckpointOut, section: &str) {
        self.regs.serialize(out, section);
        let mut s = out.section(section);
        s.param("pc", &self.pc.pc);
        s.param("npc", &self.pc.npc);
        s.param("nnpc", &self.pc.nnpc);
        s.param("status", &self.status.code());
        self.tlb.serialize(out, &format!("{section}.tlb"));
    }

    fn unserialize(&mut self, cp: &Checkpoint, section: &str) -> Result<(), CheckpointError> {
        let mut regs = self.regs.clone();
        regs.unserialize(cp, section)?;

        let s = cp.section(section)?;
        let pc = PcState {
            pc: s.param("pc")?,
            npc: s.param("npc")?,
            nnpc: s.param("nnpc")?,
        };
        let code: u8 = s.param("status")?;
        let status = ThreadStatus::from_code(code).ok_or_else(|| CheckpointError::Malformed {
            section: section.to_owned(),
            name: "status".to_owned(),
            value: code.to_string(),
        })?;

        let mut tlb = self.tlb.clone();
        tlb.unserialize(cp, &format!("{section}.tlb"))?;

        self.regs = regs;
        self.pc = pc;
        self.status = status;
        self.tlb = tlb;
        Ok(())
    }
}
