//! UltraSPARC (sun4u) translation entry.
//!
//! The packed form is the TTE data word:
//!
//! | bits  | field                          |
//! |-------|--------------------------------|
//! | 63    | valid                          |
//! | 61-62 | page size, low bits            |
//! | 60    | no-fault only                  |
//! | 59    | invert endianness              |
//! | 48    | page size, high bit            |
//! | 13-40 | physical address               |
//! | 6     | locked                         |
//! | 5     | cacheable in physical cache    |
//! | 4     | cacheable in virtual cache     |
//! | 3     | side effects                   |
//! | 2     | privileged                     |
//! | 1     | writable                       |
//!
//! The virtual range, context and partition live only in the TLB.

use crate::common::addr::{PhysAddr, VirtAddr, VirtRegion};
use crate::common::error::CheckpointError;
use crate::core::units::mmu::tlb::{Permissions, TranslationEntry};
use crate::sim::checkpoint::{SectionIn, SectionOut};

const TTE_V: u64 = 1 << 63;
const TTE_NFO: u64 = 1 << 60;
const TTE_IE: u64 = 1 << 59;
const TTE_SZH: u64 = 1 << 48;
const TTE_PA_MASK: u64 = 0x0000_01ff_ffff_e000;
const TTE_L: u64 = 1 << 6;
const TTE_CP: u64 = 1 << 5;
const TTE_CV: u64 = 1 << 4;
const TTE_E: u64 = 1 << 3;
const TTE_P: u64 = 1 << 2;
const TTE_W: u64 = 1 << 1;

/// Page size for each size code; zero marks a code the hardware rejects.
const PAGE_SIZES: [u64; 6] = [8 << 10, 64 << 10, 0, 4 << 20, 0, 256 << 20];

/// Page size for a size code, if the code is legal.
pub fn page_size(code: u64) -> Option<u64> {
    PAGE_SIZES
        .get(code as usize)
        .copied()
        .filter(|&size| size != 0)
}

fn size_code(size: u64) -> Option<u64> {
    PAGE_SIZES
        .iter()
        .position(|&s| s != 0 && s == size)
        .map(|code| code as u64)
}

/// Attribute bits of a mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TteFlags {
    /// Only non-faulting loads may use this page.
    pub nfo: bool,
    /// Accesses use the opposite byte order.
    pub ie: bool,
    /// Entry is locked in the TLB.
    pub locked: bool,
    /// Cacheable in physically indexed caches.
    pub cp: bool,
    /// Cacheable in virtually indexed caches.
    pub cv: bool,
    /// Accesses have side effects.
    pub e: bool,
    /// Privileged access only.
    pub p: bool,
    /// Writable.
    pub w: bool,
}

/// One SPARC TLB entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SparcTlbEntry {
    /// First virtual (or real) address covered.
    pub va: u64,
    /// Page size in bytes.
    pub size: u64,
    /// Context the entry belongs to.
    pub context_id: u16,
    /// Partition the entry belongs to.
    pub partition_id: u8,
    /// Translates real rather than virtual addresses.
    pub real: bool,
    /// Physical page base.
    pub paddr: u64,
    /// Attribute bits.
    pub flags: TteFlags,
    /// Referenced since the last reset of the used bits.
    pub used: bool,
    /// Entry is in use.
    pub valid: bool,
}

impl SparcTlbEntry {
    /// Builds a valid, cacheable, writable 8 KiB mapping.
    pub const fn new(va: u64, paddr: u64, context_id: u16) -> Self {
        Self {
            va,
            size: 8 << 10,
            context_id,
            partition_id: 0,
            real: false,
            paddr,
            flags: TteFlags {
                nfo: false,
                ie: false,
                locked: false,
                cp: true,
                cv: true,
                e: false,
                p: false,
                w: true,
            },
            used: false,
            valid: true,
        }
    }
}

impl TranslationEntry for SparcTlbEntry {
    const PACKED_NAME: &'static str = "tte";

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn region(&self) -> VirtRegion {
        VirtRegion::new(self.va, self.size)
    }

    fn asid(&self) -> u64 {
        u64::from(self.context_id)
    }

    fn is_global(&self) -> bool {
        false
    }

    /// Real-address entries never satisfy a virtual lookup.
    fn matches(&self, vaddr: VirtAddr, asid: u64) -> bool {
        self.valid
            && !self.real
            && u64::from(self.context_id) == asid
            && self.region().contains(vaddr)
    }

    fn permissions(&self) -> Permissions {
        Permissions {
            read: true,
            write: self.flags.w,
            execute: !self.flags.nfo,
            user: !self.flags.p,
        }
    }

    fn frame_addr(&self, vaddr: VirtAddr) -> Option<PhysAddr> {
        Some(PhysAddr::new(
            self.paddr | (vaddr.val().wrapping_sub(self.va) & (self.size - 1)),
        ))
    }

    fn pack(&self) -> u64 {
        let code = size_code(self.size).unwrap_or(0);
        let f = &self.flags;
        TTE_V
            | ((code & 3) << 61)
            | if code & 4 != 0 { TTE_SZH } else { 0 }
            | if f.nfo { TTE_NFO } else { 0 }
            | if f.ie { TTE_IE } else { 0 }
            | (self.paddr & TTE_PA_MASK)
            | if f.locked { TTE_L } else { 0 }
            | if f.cp { TTE_CP } else { 0 }
            | if f.cv { TTE_CV } else { 0 }
            | if f.e { TTE_E } else { 0 }
            | if f.p { TTE_P } else { 0 }
            | if f.w { TTE_W } else { 0 }
    }

    fn with_packed(&self, packed: u64) -> Result<Self, String> {
        if packed & TTE_V == 0 {
            return Err(format!("tte {packed:#x} has the valid bit clear"));
        }
        let code = ((packed >> 61) & 3) | if packed & TTE_SZH != 0 { 4 } else { 0 };
        let size = page_size(code)
            .ok_or_else(|| format!("tte {packed:#x} has illegal page size code {code}"))?;
        Ok(Self {
            size,
            paddr: packed & TTE_PA_MASK,
            flags: TteFlags {
                nfo: packed & TTE_NFO != 0,
                ie: packed & TTE_IE != 0,
                locked: packed & TTE_L != 0,
                cp: packed & TTE_CP != 0,
                cv: packed & TTE_CV != 0,
                e: packed & TTE_E != 0,
                p: packed & TTE_P != 0,
                w: packed & TTE_W != 0,
            },
            valid: true,
            ..*self
        })
    }

    fn persist_fields(&self, out: &mut SectionOut<'_>) {
        out.param("range.va", &self.va);
        out.param("range.size", &self.size);
        out.param("range.contextId", &self.context_id);
        out.param("range.partitionId", &self.partition_id);
        out.param("range.real", &self.real);
        out.param("paddr", &self.paddr);
        out.param("nfo", &self.flags.nfo);
        out.param("ie", &self.flags.ie);
        out.param("locked", &self.flags.locked);
        out.param("cp", &self.flags.cp);
        out.param("cv", &self.flags.cv);
        out.param("e", &self.flags.e);
        out.param("p", &self.flags.p);
        out.param("w", &self.flags.w);
        out.param("used", &self.used);
        out.param("valid", &self.valid);
    }

    fn restore_fields(section: &SectionIn<'_>) -> Result<Self, CheckpointError> {
        Ok(Self {
            va: section.param("range.va")?,
            size: section.param("range.size")?,
            context_id: section.param("range.contextId")?,
            partition_id: section.param("range.partitionId")?,
            real: section.param("range.real")?,
            paddr: section.param("paddr")?,
            flags: TteFlags {
                nfo: section.param("nfo")?,
                ie: section.param("ie")?,
                locked: section.param("locked")?,
                cp: section.param("cp")?,
                cv: section.param("cv")?,
                e: section.param("e")?,
                p: section.param("p")?,
                w: section.param("w")?,
            },
            used: section.param("used")?,
            valid: section.param("valid")?,
        })
    }
}
