//! Unified Register File.
//!
//! This module provides the `RegisterFile` struct, the per-architecture register state
//! behind one interface. It provides:
//! 1. **Banks:** Integer, floating-point and misc banks sized by the architecture.
//! 2. **Abstraction:** A single set of methods for reading and writing register values.
//! 3. **Persistence:** All three banks saved in one checkpoint section; a restore either
//!    replaces every bank or none.

use crate::common::error::CheckpointError;
use crate::core::arch::fpr::FloatRegFile;
use crate::core::arch::gpr::IntRegFile;
use crate::core::arch::misc::MiscRegFile;
use crate::isa::{Isa, RegIndex};
use crate::sim::checkpoint::{Checkpoint, CheckpointOut, Serializable};

/// Register state of one hardware thread of architecture `I`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile<I: Isa> {
    /// Integer bank, including shadow and banked copies.
    pub int: IntRegFile<I>,
    /// Floating-point bank.
    pub float: FloatRegFile<I>,
    /// Control and status bank.
    pub misc: MiscRegFile<I>,
}

impl<I: Isa> RegisterFile<I> {
    /// Creates a register file with every register zeroed.
    pub fn new() -> Self {
        Self {
            int: IntRegFile::new(),
            float: FloatRegFile::new(),
            misc: MiscRegFile::new(),
        }
    }

    /// Reads a logical integer register.
    #[inline(always)]
    pub fn read(&self, idx: RegIndex) -> u64 {
        self.int.read(idx)
    }

    /// Writes a logical integer register, truncating to the machine width.
    #[inline(always)]
    pub fn write(&mut self, idx: RegIndex, val: u64) {
        self.int.write(idx, val);
    }

    /// Reads a floating-point register as raw bits.
    #[inline(always)]
    pub fn read_f(&self, idx: RegIndex) -> u64 {
        self.float.read_bits(idx)
    }

    /// Writes a floating-point register from raw bits.
    #[inline(always)]
    pub fn write_f(&mut self, idx: RegIndex, val: u64) {
        self.float.write_bits(idx, val);
    }

    /// Reads a floating-point register as a double.
    pub fn read_fd(&self, idx: RegIndex) -> f64 {
        self.float.read_double(idx)
    }

    /// Writes a double into a floating-point register.
    pub fn write_fd(&mut self, idx: RegIndex, val: f64) {
        self.float.write_double(idx, val);
    }

    /// Reads a misc register.
    #[inline(always)]
    pub fn read_misc(&self, idx: RegIndex) -> u64 {
        self.misc.read(idx)
    }

    /// Writes a misc register.
    #[inline(always)]
    pub fn write_misc(&mut self, idx: RegIndex, val: u64) {
        self.misc.write(idx, val);
    }

    /// Zeroes every bank.
    pub fn clear(&mut self) {
        self.int.clear();
        self.float.clear();
        self.misc.clear();
    }

    /// Logs the integer bank at debug level.
    pub fn dump(&self) {
        self.int.dump();
    }
}

impl<I: Isa> Serializable for RegisterFile<I> {
    fn serialize(&self, out: &mut CheckpointOut, section: &str) {
        self.int.serialize(out, section);
        self.float.serialize(out, section);
        self.misc.serialize(out, section);
    }

    fn unserialize(&mut self, cp: &Checkpoint, section: &str) -> Result<(), CheckpointError> {
        let mut next = self.clone();
        next.int.unserialize(cp, section)?;
        next.float.unserialize(cp, section)?;
        next.misc.unserialize(cp, section)?;
        *self = next;
        Ok(())
    }
}
