//! Functional Simulated Memory.
//!
//! This module implements the byte-addressable memory the process and debug layers
//! operate on. It provides:
//! 1. **Sparse Storage:** Mapped ranges are recorded as page spans; page storage is
//!    allocated zero-filled on first write, so large `brk`/`mmap` regions cost nothing
//!    until touched.
//! 2. **Checked Access:** Reads and writes fail as a whole if any byte is unmapped, so a
//!    rejected access never leaves memory partially modified.
//! 3. **Typed Access:** Word and machine-word helpers honoring the target byte order.
//!
//! Timing is not modeled; this is the functional view used for loading programs,
//! building the initial stack, servicing syscalls and serving debugger requests.

use std::collections::BTreeMap;

use crate::common::error::MemoryError;
use crate::isa::ByteOrder;

/// Sparse, page-granular simulated memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionalMemory {
    page_bytes: u64,
    /// Mapped spans keyed by first page, valued by last page (inclusive).
    /// Adjacent spans are always merged.
    spans: BTreeMap<u64, u64>,
    /// Pages written at least once.
    pages: BTreeMap<u64, Box<[u8]>>,
}

impl FunctionalMemory {
    /// Creates an empty memory with the given page size.
    ///
    /// # Arguments
    ///
    /// * `page_bytes` - Page size in bytes; must be a power of two.
    pub fn new(page_bytes: u64) -> Self {
        debug_assert!(page_bytes.is_power_of_two());
        Self {
            page_bytes,
            spans: BTreeMap::new(),
            pages: BTreeMap::new(),
        }
    }

    /// Returns the page size.
    pub const fn page_bytes(&self) -> u64 {
        self.page_bytes
    }

    /// Returns the number of mapped bytes, saturating at `u64::MAX`.
    pub fn mapped_bytes(&self) -> u64 {
        self.spans
            .iter()
            .map(|(&first, &last)| ((last - first) / self.page_bytes + 1).saturating_mul(self.page_bytes))
            .fold(0, u64::saturating_add)
    }

    /// Returns the number of bytes backed by host storage.
    pub fn resident_bytes(&self) -> u64 {
        self.pages.len() as u64 * self.page_bytes
    }

    #[inline(always)]
    const fn page_of(&self, addr: u64) -> u64 {
        addr & !(self.page_bytes - 1)
    }

    /// Maps every page overlapping `[addr, addr + len)`.
    ///
    /// Pages that are already mapped keep their contents.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Unmapped`] if the range wraps the address space.
    pub fn map(&mut self, addr: u64, len: u64) -> Result<(), MemoryError> {
        if len == 0 {
            return Ok(());
        }
        let last = addr.checked_add(len - 1).ok_or(MemoryError::Unmapped {
            addr,
            len: usize::try_from(len).unwrap_or(usize::MAX),
        })?;
        let mut first = self.page_of(addr);
        let mut last = self.page_of(last);

        let before = self.spans.range(..=first).next_back().map(|(&s, &e)| (s, e));
        if let Some((s, e)) = before.filter(|&(_, e)| e.saturating_add(self.page_bytes) >= first) {
            first = s;
            last = last.max(e);
        }
        let reach = last.saturating_add(self.page_bytes);
        let absorbed: Vec<(u64, u64)> = self
            .spans
            .range(first..=reach)
            .map(|(&s, &e)| (s, e))
            .collect();
        for (s, e) in absorbed {
            let _ = self.spans.remove(&s);
            last = last.max(e);
        }
        let _ = self.spans.insert(first, last);
        Ok(())
    }

    /// Returns `true` when every byte of `[addr, addr + len)` is mapped.
    pub fn is_mapped(&self, addr: u64, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        let Some(last) = addr.checked_add(len as u64 - 1) else {
            return false;
        };
        let (first, last) = (self.page_of(addr), self.page_of(last));
        self.spans
            .range(..=first)
            .next_back()
            .is_some_and(|(_, &end)| end >= last)
    }

    /// Copies `buf.len()` bytes starting at `addr` into `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Unmapped`] if any byte is unmapped; `buf` is then untouched.
    pub fn read(&self, addr: u64, buf: &mut [u8]) -> Result<(), MemoryError> {
        self.check(addr, buf.len())?;
        let mut done = 0;
        while done < buf.len() {
            let cur = addr + done as u64;
            let base = self.page_of(cur);
            let off = (cur - base) as usize;
            let n = (self.page_bytes as usize - off).min(buf.len() - done);
            match self.pages.get(&base) {
                Some(page) => buf[done..done + n].copy_from_slice(&page[off..off + n]),
                None => buf[done..done + n].fill(0),
            }
            done += n;
        }
        Ok(())
    }

    /// Copies `data` into memory starting at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Unmapped`] if any byte is unmapped; memory is then untouched.
    pub fn write(&mut self, addr: u64, data: &[u8]) -> Result<(), MemoryError> {
        self.check(addr, data.len())?;
        let page_bytes = self.page_bytes as usize;
        let mut done = 0;
        while done < data.len() {
            let cur = addr + done as u64;
            let base = self.page_of(cur);
            let off = (cur - base) as usize;
            let page = self
                .pages
                .entry(base)
                .or_insert_with(|| vec![0; page_bytes].into_boxed_slice());
            let n = (page_bytes - off).min(data.len() - done);
            page[off..off + n].copy_from_slice(&data[done..done + n]);
            done += n;
        }
        Ok(())
    }

    /// Maps `[addr, addr + data.len())` and copies `data` there.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Unmapped`] if the range wraps the address space.
    pub fn load(&mut self, addr: u64, data: &[u8]) -> Result<(), MemoryError> {
        self.map(addr, data.len() as u64)?;
        self.write(addr, data)
    }

    /// Reads an unsigned integer of `width` bytes in `order`.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Unmapped`] if any byte is unmapped.
    pub fn read_uint(&self, addr: u64, width: usize, order: ByteOrder) -> Result<u64, MemoryError> {
        let mut buf = [0u8; 8];
        self.read(addr, &mut buf[..width])?;
        Ok(order.decode(&buf[..width]))
    }

    /// Writes the low `width` bytes of `val` in `order`.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Unmapped`] if any byte is unmapped.
    pub fn write_uint(
        &mut self,
        addr: u64,
        val: u64,
        width: usize,
        order: ByteOrder,
    ) -> Result<(), MemoryError> {
        self.write(addr, &order.encode(val, width))
    }

    /// Reads a 32-bit word, typically an instruction.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Unmapped`] if any byte is unmapped.
    pub fn read_u32(&self, addr: u64, order: ByteOrder) -> Result<u32, MemoryError> {
        self.read_uint(addr, 4, order).map(|v| v as u32)
    }

    /// Writes a 32-bit word.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Unmapped`] if any byte is unmapped.
    pub fn write_u32(&mut self, addr: u64, val: u32, order: ByteOrder) -> Result<(), MemoryError> {
        self.write_uint(addr, u64::from(val), 4, order)
    }

    /// Reads a NUL-terminated string of at most `max` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Unmapped`] if the string runs into unmapped memory.
    pub fn read_cstring(&self, addr: u64, max: usize) -> Result<Vec<u8>, MemoryError> {
        let mut out = Vec::new();
        let mut byte = [0u8; 1];
        for i in 0..max as u64 {
            let cur = addr
                .checked_add(i)
                .ok_or(MemoryError::Unmapped { addr, len: max })?;
            self.read(cur, &mut byte)?;
            if byte[0] == 0 {
                break;
            }
            out.push(byte[0]);
        }
        Ok(out)
    }

    /// Writes `bytes` followed by a NUL terminator.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Unmapped`] if any byte is unmapped.
    pub fn write_cstring(&mut self, addr: u64, bytes: &[u8]) -> Result<(), MemoryError> {
        let mut buf = Vec::with_capacity(bytes.len() + 1);
        buf.extend_from_slice(bytes);
        buf.push(0);
        self.write(addr, &buf)
    }

    fn check(&self, addr: u64, len: usize) -> Result<(), MemoryError> {
        if self.is_mapped(addr, len) {
            Ok(())
        } else {
            Err(MemoryError::Unmapped { addr, len })
        }
    }
}
