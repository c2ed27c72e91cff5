//! MIPS32 translation entry.
//!
//! One entry maps an even/odd pair of pages. The packed form is the two
//! `EntryLo` registers side by side, `EntryLo0` in the low word:
//!
//! | bits  | field              |
//! |-------|--------------------|
//! | 0     | global             |
//! | 1     | valid              |
//! | 2     | dirty (writable)   |
//! | 3-5   | cache attribute    |
//! | 6-29  | page frame number  |
//! | 30-31 | reserved, zero     |

use crate::common::addr::{PhysAddr, VirtAddr, VirtRegion};
use crate::common::error::CheckpointError;
use crate::core::units::mmu::tlb::{Permissions, TranslationEntry};
use crate::sim::checkpoint::{SectionIn, SectionOut};

const PAGE_SHIFT: u32 = 12;
const VPN2_SHIFT: u32 = 13;

const LO_G: u64 = 1 << 0;
const LO_V: u64 = 1 << 1;
const LO_D: u64 = 1 << 2;
const LO_PFN_MASK: u64 = 0x00ff_ffff;
const LO_RESERVED: u64 = 0xc000_0000;

/// One half of a MIPS TLB entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryLo {
    /// Page frame number.
    pub pfn: u32,
    /// Cache coherency attribute.
    pub c: u8,
    /// Dirty: writes allowed.
    pub d: bool,
    /// Valid.
    pub v: bool,
}

impl EntryLo {
    /// A valid, writable, cacheable half mapping frame `pfn`.
    pub const fn mapped(pfn: u32) -> Self {
        Self {
            pfn,
            c: 3,
            d: true,
            v: true,
        }
    }

    fn encode(self, global: bool) -> u64 {
        ((u64::from(self.pfn) & LO_PFN_MASK) << 6)
            | (u64::from(self.c & 7) << 3)
            | if self.d { LO_D } else { 0 }
            | if self.v { LO_V } else { 0 }
            | if global { LO_G } else { 0 }
    }

    fn decode(lo: u64) -> Self {
        Self {
            pfn: ((lo >> 6) & LO_PFN_MASK) as u32,
            c: ((lo >> 3) & 7) as u8,
            d: lo & LO_D != 0,
            v: lo & LO_V != 0,
        }
    }
}

/// One MIPS TLB entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MipsTlbEntry {
    /// `PageMask`; zero selects 4 KiB pages.
    pub mask: u32,
    /// Virtual page-pair number (`va >> 13`).
    pub vpn2: u64,
    /// Address space identifier.
    pub asid: u8,
    /// Ignore the ASID when matching.
    pub global: bool,
    /// Even page.
    pub lo0: EntryLo,
    /// Odd page.
    pub lo1: EntryLo,
}

impl MipsTlbEntry {
    /// Maps the 4 KiB page pair starting at `va` (rounded down) to `pfn0`/`pfn1`.
    pub const fn new(va: u64, asid: u8, pfn0: u32, pfn1: u32) -> Self {
        Self {
            mask: 0,
            vpn2: va >> VPN2_SHIFT,
            asid,
            global: false,
            lo0: EntryLo::mapped(pfn0),
            lo1: EntryLo::mapped(pfn1),
        }
    }

    /// Size of each page in the pair.
    pub const fn page_bytes(&self) -> u64 {
        ((((self.mask >> VPN2_SHIFT) as u64) & 0xffff) + 1) << PAGE_SHIFT
    }
}

impl TranslationEntry for MipsTlbEntry {
    const PACKED_NAME: &'static str = "entry_lo";

    /// Valid when either half is.
    fn is_valid(&self) -> bool {
        self.lo0.v || self.lo1.v
    }

    fn region(&self) -> VirtRegion {
        let size = 2 * self.page_bytes();
        VirtRegion::new((self.vpn2 << VPN2_SHIFT) & !(size - 1), size)
    }

    fn asid(&self) -> u64 {
        u64::from(self.asid)
    }

    fn is_global(&self) -> bool {
        self.global
    }

    fn permissions(&self) -> Permissions {
        Permissions {
            read: true,
            write: self.lo0.d || self.lo1.d,
            execute: true,
            user: true,
        }
    }

    fn frame_addr(&self, vaddr: VirtAddr) -> Option<PhysAddr> {
        let page = self.page_bytes();
        let half = if vaddr.val() & page == 0 {
            self.lo0
        } else {
            self.lo1
        };
        half.v.then(|| {
            PhysAddr::new((u64::from(half.pfn) << PAGE_SHIFT) | vaddr.page_offset(page))
        })
    }

    fn pack(&self) -> u64 {
        (self.lo1.encode(self.global) << 32) | self.lo0.encode(self.global)
    }

    fn with_packed(&self, packed: u64) -> Result<Self, String> {
        let (lo0, lo1) = (packed & 0xffff_ffff, packed >> 32);
        if (lo0 | lo1) & LO_RESERVED != 0 {
            return Err(format!("entry_lo {packed:#x} sets reserved bits"));
        }
        if (lo0 & LO_G) != (lo1 & LO_G) {
            return Err(format!("entry_lo {packed:#x} has mismatched global bits"));
        }
        if (lo0 | lo1) & LO_V == 0 {
            return Err(format!("entry_lo {packed:#x} has neither half valid"));
        }
        Ok(Self {
            global: lo0 & LO_G != 0,
            lo0: EntryLo::decode(lo0),
            lo1: EntryLo::decode(lo1),
            ..*self
        })
    }

    fn persist_fields(&self, out: &mut SectionOut<'_>) {
        out.param("mask", &self.mask);
        out.param("vpn2", &self.vpn2);
        out.param("asid", &self.asid);
        out.param("g", &self.global);
        for (i, half) in [self.lo0, self.lo1].iter().enumerate() {
            out.param(&format!("pfn{i}"), &half.pfn);
            out.param(&format!("c{i}"), &half.c);
            out.param(&format!("d{i}"), &half.d);
            out.param(&format!("v{i}"), &half.v);
        }
    }

    fn restore_fields(section: &SectionIn<'_>) -> Result<Self, CheckpointError> {
        let half = |i: usize| -> Result<EntryLo, CheckpointError> {
            Ok(EntryLo {
                pfn: section.param(&format!("pfn{i}"))?,
                c: section.param(&format!("c{i}"))?,
                d: section.param(&format!("d{i}"))?,
                v: section.param(&format!("v{i}"))?,
            })
        };
        Ok(Self {
            mask: section.param("mask")?,
            vpn2: section.param("vpn2")?,
            asid: section.param("asid")?,
            global: section.param("g")?,
            lo0: half(0)?,
            lo1: half(1)?,
        })
    }
}
