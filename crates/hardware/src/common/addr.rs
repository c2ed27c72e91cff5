//! Physical and Virtual Address types.
//!
//! This module defines strong types for physical and virtual addresses to prevent
//! accidental mixing of address spaces. It provides the following:
//! 1. **Type Safety:** Distinguishes between virtual and physical address spaces at compile time.
//! 2. **Page Arithmetic:** Page number / offset helpers parameterized by the target page size,
//!    since Alpha and SPARC use 8 KiB base pages while MIPS and ARM use 4 KiB.
//! 3. **Regions:** A base + size pair describing the span a translation entry covers.

use std::fmt;

/// A virtual address in the simulated program's address space.
///
/// Virtual addresses are produced by the simulated program and must be translated
/// through a translation entry before touching physical storage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u64);

/// A physical address in the simulated machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    ///
    /// # Arguments
    ///
    /// * `addr` - The raw 64-bit address value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Returns the byte offset of this address within a page of `page_bytes`.
    ///
    /// # Arguments
    ///
    /// * `page_bytes` - Page size in bytes; must be a power of two.
    #[inline(always)]
    pub const fn page_offset(self, page_bytes: u64) -> u64 {
        self.0 & (page_bytes - 1)
    }

    /// Returns the address rounded down to the start of its page.
    #[inline(always)]
    pub const fn page_base(self, page_bytes: u64) -> u64 {
        self.0 & !(page_bytes - 1)
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{:#x}", self.0)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{:#x}", self.0)
    }
}

/// A contiguous span of virtual addresses covered by one translation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VirtRegion {
    /// First address of the region (aligned to `size`).
    pub base: VirtAddr,
    /// Length of the region in bytes (a power of two for every supported ISA).
    pub size: u64,
}

impl VirtRegion {
    /// Creates a region from a base address and a size in bytes.
    pub const fn new(base: u64, size: u64) -> Self {
        Self {
            base: VirtAddr(base),
            size,
        }
    }

    /// Returns `true` when `addr` falls inside the region.
    pub const fn contains(&self, addr: VirtAddr) -> bool {
        addr.0 >= self.base.0 && addr.0 - self.base.0 < self.size
    }
}
