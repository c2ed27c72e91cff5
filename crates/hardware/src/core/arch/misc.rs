//! Miscellaneous (control and status) register bank.
//!
//! Each architecture names its own control registers (Alpha IPRs, MIPS CP0,
//! SPARC privileged state, ARM CPSR/SPSR); this bank only stores them. Accesses
//! here have no side effects.

use std::marker::PhantomData;

use crate::common::error::CheckpointError;
use crate::isa::{Isa, RegIndex};
use crate::sim::checkpoint::{Checkpoint, CheckpointOut, Serializable};

/// Misc register bank for architecture `I`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MiscRegFile<I: Isa> {
    regs: Box<[u64]>,
    _isa: PhantomData<I>,
}

impl<I: Isa> MiscRegFile<I> {
    /// Checkpoint entry holding the registers.
    pub const CHECKPOINT_KEY: &'static str = "misc_regs";

    /// Creates a bank with every register zeroed.
    pub fn new() -> Self {
        Self {
            regs: vec![0; I::NUM_MISC_REGS].into_boxed_slice(),
            _isa: PhantomData,
        }
    }

    /// Reads a misc register.
    #[inline(always)]
    pub fn read(&self, idx: RegIndex) -> u64 {
        self.regs[idx]
    }

    /// Writes a misc register.
    #[inline(always)]
    pub fn write(&mut self, idx: RegIndex, val: u64) {
        self.regs[idx] = val;
    }

    /// Zeroes every register.
    pub fn clear(&mut self) {
        self.regs.fill(0);
    }
}

impl<I: Isa> Default for MiscRegFile<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Isa> Serializable for MiscRegFile<I> {
    fn serialize(&self, out: &mut CheckpointOut, section: &str) {
        out.section(section).param_array(Self::CHECKPOINT_KEY, &self.regs);
    }

    fn unserialize(&mut self, cp: &Checkpoint, section: &str) -> Result<(), CheckpointError> {
        let regs: Vec<u64> = cp
            .section(section)?
            .param_array(Self::CHECKPOINT_KEY, I::NUM_MISC_REGS)?;
        self.regs = regs.into_boxed_slice();
        Ok(())
    }
}
