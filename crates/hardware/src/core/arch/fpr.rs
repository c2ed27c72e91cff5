//! Floating-Point Register Bank.
//!
//! This module implements the floating-point register bank for every architecture.
//! It performs the following:
//! 1. **Storage:** `I::NUM_FLOAT_REGS` cells holding raw 64-bit patterns.
//! 2. **Views:** Raw bits, double precision, and single precision (low 32 bits) over
//!    the same cell. The views reinterpret bits; they never convert values, so a
//!    NaN payload written as bits reads back unchanged.
//! 3. **Persistence:** The raw cells are saved as the `float_regs` sequence.

use std::marker::PhantomData;

use crate::common::error::CheckpointError;
use crate::isa::{Isa, RegIndex};
use crate::sim::checkpoint::{Checkpoint, CheckpointOut, Serializable};

/// Floating-point register bank for architecture `I`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FloatRegFile<I: Isa> {
    bits: Box<[u64]>,
    _isa: PhantomData<I>,
}

impl<I: Isa> FloatRegFile<I> {
    /// Checkpoint entry holding the raw cells.
    pub const CHECKPOINT_KEY: &'static str = "float_regs";

    /// Creates a bank with every cell zeroed.
    pub fn new() -> Self {
        Self {
            bits: vec![0; I::NUM_FLOAT_REGS].into_boxed_slice(),
            _isa: PhantomData,
        }
    }

    /// Reads a register as raw bits.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (below `I::NUM_FLOAT_REGS`).
    #[inline(always)]
    pub fn read_bits(&self, idx: RegIndex) -> u64 {
        self.bits[idx]
    }

    /// Writes a register from raw bits.
    #[inline(always)]
    pub fn write_bits(&mut self, idx: RegIndex, val: u64) {
        self.bits[idx] = val;
    }

    /// Reads a register as a double-precision value.
    #[inline(always)]
    pub fn read_double(&self, idx: RegIndex) -> f64 {
        f64::from_bits(self.bits[idx])
    }

    /// Writes a double-precision value.
    #[inline(always)]
    pub fn write_double(&mut self, idx: RegIndex, val: f64) {
        self.bits[idx] = val.to_bits();
    }

    /// Reads the low 32 bits of a register as a single-precision value.
    pub fn read_single(&self, idx: RegIndex) -> f32 {
        f32::from_bits(self.bits[idx] as u32)
    }

    /// Writes a single-precision value into the low 32 bits, zeroing the rest.
    pub fn write_single(&mut self, idx: RegIndex, val: f32) {
        self.bits[idx] = u64::from(val.to_bits());
    }

    /// Zeroes every cell.
    pub fn clear(&mut self) {
        self.bits.fill(0);
    }
}

impl<I: Isa> Default for FloatRegFile<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Isa> Serializable for FloatRegFile<I> {
    fn serialize(&self, out: &mut CheckpointOut, section: &str) {
        out.section(section).param_array(Self::CHECKPOINT_KEY, &self.bits);
    }

    fn unserialize(&mut self, cp: &Checkpoint, section: &str) -> Result<(), CheckpointError> {
        let bits: Vec<u64> = cp
            .section(section)?
            .param_array(Self::CHECKPOINT_KEY, I::NUM_FLOAT_REGS)?;
        self.bits = bits.into_boxed_slice();
        Ok(())
    }
}
