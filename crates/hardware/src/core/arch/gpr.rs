//! Integer Register Bank.
//!
//! This module implements the integer register bank shared by every architecture.
//! It performs the following:
//! 1. **Storage:** One 64-bit cell per physical slot, `I::NUM_PHYS_INT_REGS` in total.
//! 2. **Redirection:** Logical indices pass through `I::INT_REG_MAP`, so Alpha PAL shadow
//!    registers and ARM banked supervisor registers land in their own slots.
//! 3. **Width:** Writes are truncated to the machine width; reads return what was stored.
//! 4. **Persistence:** All physical slots are saved as the `int_regs` sequence; a restored
//!    value wider than the machine is rejected.
//!
//! Hardwired-zero registers are not special here. The thread context, which
//! sits between the decode layer and this bank, discards writes to them.

use std::marker::PhantomData;

use tracing::debug;

use crate::common::error::CheckpointError;
use crate::isa::{Isa, RegIndex};
use crate::sim::checkpoint::{Checkpoint, CheckpointOut, Serializable};

/// Integer register bank for architecture `I`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntRegFile<I: Isa> {
    regs: Box<[u64]>,
    _isa: PhantomData<I>,
}

impl<I: Isa> IntRegFile<I> {
    /// Checkpoint entry holding the physical slots.
    pub const CHECKPOINT_KEY: &'static str = "int_regs";

    /// Creates a bank with every physical slot zeroed.
    pub fn new() -> Self {
        Self {
            regs: vec![0; I::NUM_PHYS_INT_REGS].into_boxed_slice(),
            _isa: PhantomData,
        }
    }

    /// Maps a logical register index to its physical slot.
    ///
    /// # Arguments
    ///
    /// * `idx` - Logical register index (below `I::NUM_INT_REGS`).
    #[inline(always)]
    pub fn flatten(idx: RegIndex) -> RegIndex {
        I::INT_REG_MAP[idx]
    }

    /// Reads a logical integer register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Logical register index.
    ///
    /// # Returns
    ///
    /// The stored value, already within the machine width.
    #[inline(always)]
    pub fn read(&self, idx: RegIndex) -> u64 {
        self.regs[Self::flatten(idx)]
    }

    /// Writes a logical integer register, truncating to the machine width.
    ///
    /// # Arguments
    ///
    /// * `idx` - Logical register index.
    /// * `val` - Value to store.
    #[inline(always)]
    pub fn write(&mut self, idx: RegIndex, val: u64) {
        self.regs[Self::flatten(idx)] = val & I::width_mask();
    }

    /// Reads a physical slot directly, bypassing redirection.
    pub fn read_flat(&self, slot: RegIndex) -> u64 {
        self.regs[slot]
    }

    /// Writes a physical slot directly, bypassing redirection.
    pub fn write_flat(&mut self, slot: RegIndex, val: u64) {
        self.regs[slot] = val & I::width_mask();
    }

    /// Zeroes every slot.
    pub fn clear(&mut self) {
        self.regs.fill(0);
    }

    /// Returns the physical slots in order.
    pub fn as_slice(&self) -> &[u64] {
        &self.regs
    }

    /// Logs every physical slot at debug level, two per line.
    pub fn dump(&self) {
        for pair in self.regs.chunks(2).enumerate() {
            match pair {
                (i, [a, b]) => debug!("r{:<2}={a:#018x} r{:<2}={b:#018x}", i * 2, i * 2 + 1),
                (i, [a]) => debug!("r{:<2}={a:#018x}", i * 2),
                _ => {}
            }
        }
    }
}

impl<I: Isa> Default for IntRegFile<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Isa> Serializable for IntRegFile<I> {
    fn serialize(&self, out: &mut CheckpointOut, section: &str) {
        out.section(section).param_array(Self::CHECKPOINT_KEY, &self.regs);
    }

    fn unserialize(&mut self, cp: &Checkpoint, section: &str) -> Result<(), CheckpointError> {
        let regs: Vec<u64> = cp
            .section(section)?
            .param_array(Self::CHECKPOINT_KEY, I::NUM_PHYS_INT_REGS)?;
        let mask = I::width_mask();
        if let Some((slot, &v)) = regs.iter().enumerate().find(|&(_, &v)| v & !mask != 0) {
            return Err(CheckpointError::Malformed {
                section: section.to_owned(),
                name: Self::CHECKPOINT_KEY.to_owned(),
                value: format!("slot {slot} = {v:#x} exceeds the {}-byte machine width", I::MACHINE_BYTES),
            });
        }
        self.regs = regs.into_boxed_slice();
        Ok(())
    }
}
