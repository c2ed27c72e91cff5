//! Software breakpoint table.
//!
//! A breakpoint replaces the instruction word at its address with the
//! architecture's trap word and remembers the original. Insertions are
//! reference counted; the original word goes back only when the last
//! reference is removed, the debugger detaches, or the process exits.

use std::collections::BTreeMap;

use tracing::{trace, warn};

use crate::common::error::{DebugError, MemoryError};
use crate::isa::Isa;
use crate::soc::memory::FunctionalMemory;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Breakpoint {
    original: u32,
    refs: u32,
    /// Original word temporarily back in memory while stepping over it.
    lifted: bool,
}

/// Inserted software breakpoints keyed by address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BreakpointTable {
    slots: BTreeMap<u64, Breakpoint>,
}

impl BreakpointTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct breakpoint addresses.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no breakpoint is inserted.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` if a breakpoint is inserted at `addr`.
    pub fn contains(&self, addr: u64) -> bool {
        self.slots.contains_key(&addr)
    }

    /// Original instruction word at `addr`, if a breakpoint is inserted there.
    pub fn original(&self, addr: u64) -> Option<u32> {
        self.slots.get(&addr).map(|bp| bp.original)
    }

    /// Reference count at `addr`.
    pub fn refs(&self, addr: u64) -> u32 {
        self.slots.get(&addr).map_or(0, |bp| bp.refs)
    }

    /// Inserts (or adds a reference to) a breakpoint at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Unmapped`] if the instruction word is unmapped.
    pub fn insert<I: Isa>(
        &mut self,
        mem: &mut FunctionalMemory,
        addr: u64,
    ) -> Result<(), MemoryError> {
        if let Some(bp) = self.slots.get_mut(&addr) {
            bp.refs += 1;
            return Ok(());
        }
        let original = mem.read_u32(addr, I::BYTE_ORDER)?;
        mem.write_u32(addr, I::BREAKPOINT_INSN, I::BYTE_ORDER)?;
        let _ = self.slots.insert(
            addr,
            Breakpoint {
                original,
                refs: 1,
                lifted: false,
            },
        );
        trace!(addr, original, "breakpoint inserted");
        Ok(())
    }

    /// Drops one reference at `addr`, restoring the original word with the last one.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::NoBreakpoint`] if nothing is inserted at `addr`, or
    /// [`DebugError::AccessDenied`] if the word can no longer be written.
    pub fn remove<I: Isa>(&mut self, mem: &mut FunctionalMemory, addr: u64) -> Result<(), DebugError> {
        let bp = self
            .slots
            .get_mut(&addr)
            .ok_or(DebugError::NoBreakpoint { addr })?;
        if bp.refs > 1 {
            bp.refs -= 1;
            return Ok(());
        }
        let bp = *bp;
        if !bp.lifted {
            mem.write_u32(addr, bp.original, I::BYTE_ORDER)
                .map_err(|_| DebugError::AccessDenied { addr, len: 4 })?;
        }
        let _ = self.slots.remove(&addr);
        trace!(addr, "breakpoint removed");
        Ok(())
    }

    /// Puts the original word back at `addr` without forgetting the breakpoint.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Unmapped`] if the word is unmapped.
    pub fn lift<I: Isa>(&mut self, mem: &mut FunctionalMemory, addr: u64) -> Result<(), MemoryError> {
        if let Some(bp) = self.slots.get_mut(&addr) {
            if !bp.lifted {
                mem.write_u32(addr, bp.original, I::BYTE_ORDER)?;
                bp.lifted = true;
            }
        }
        Ok(())
    }

    /// Re-arms a breakpoint previously lifted at `addr`, if it is still inserted.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Unmapped`] if the word is unmapped.
    pub fn reinsert<I: Isa>(
        &mut self,
        mem: &mut FunctionalMemory,
        addr: u64,
    ) -> Result<(), MemoryError> {
        if let Some(bp) = self.slots.get_mut(&addr) {
            if bp.lifted {
                mem.write_u32(addr, I::BREAKPOINT_INSN, I::BYTE_ORDER)?;
                bp.lifted = false;
            }
        }
        Ok(())
    }

    /// Restores every original word and empties the table.
    ///
    /// Words that can no longer be written are logged and skipped.
    pub fn restore_all<I: Isa>(&mut self, mem: &mut FunctionalMemory) {
        for (addr, bp) in std::mem::take(&mut self.slots) {
            if bp.lifted {
                continue;
            }
            if let Err(e) = mem.write_u32(addr, bp.original, I::BYTE_ORDER) {
                warn!(addr, error = %e, "could not restore instruction under breakpoint");
            }
        }
    }
}
