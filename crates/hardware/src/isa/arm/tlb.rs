//! ARMv7 short-descriptor translation entry.
//!
//! The packed form is the second-level small page descriptor:
//!
//! | bits  | field                     |
//! |-------|---------------------------|
//! | 0     | execute never             |
//! | 1     | small page (always set)   |
//! | 2     | bufferable                |
//! | 3     | cacheable                 |
//! | 4-5   | `AP[1:0]`                 |
//! | 6-8   | `TEX`                     |
//! | 9     | `AP[2]`                   |
//! | 10    | shareable                 |
//! | 11    | not global                |
//! | 12-31 | page frame number         |

use crate::common::addr::{PhysAddr, VirtAddr, VirtRegion};
use crate::common::error::CheckpointError;
use crate::core::units::mmu::tlb::{Permissions, TranslationEntry};
use crate::sim::checkpoint::{SectionIn, SectionOut};

const PAGE_SHIFT: u32 = 12;
const PAGE_BYTES: u64 = 1 << PAGE_SHIFT;

const D_XN: u64 = 1 << 0;
const D_SMALL: u64 = 1 << 1;
const D_B: u64 = 1 << 2;
const D_C: u64 = 1 << 3;
const D_AP2: u64 = 1 << 9;
const D_S: u64 = 1 << 10;
const D_NG: u64 = 1 << 11;

/// `AP[2:0]` encoding for full access.
pub const AP_FULL: u8 = 0b011;

/// One ARM TLB entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArmTlbEntry {
    /// Virtual page number.
    pub vpn: u32,
    /// Physical page number.
    pub pfn: u32,
    /// Address space identifier.
    pub asid: u8,
    /// Matches every ASID (`nG` clear).
    pub global: bool,
    /// Access permissions, `AP[2:0]`.
    pub ap: u8,
    /// Type extension.
    pub tex: u8,
    /// Cacheable.
    pub c: bool,
    /// Bufferable.
    pub b: bool,
    /// Shareable.
    pub s: bool,
    /// Execute never.
    pub xn: bool,
    /// Entry is in use.
    pub valid: bool,
}

impl ArmTlbEntry {
    /// Builds a valid, fully accessible, non-global mapping.
    pub const fn new(vpn: u32, pfn: u32, asid: u8) -> Self {
        Self {
            vpn,
            pfn,
            asid,
            global: false,
            ap: AP_FULL,
            tex: 0,
            c: true,
            b: true,
            s: false,
            xn: false,
            valid: true,
        }
    }
}

impl TranslationEntry for ArmTlbEntry {
    const PACKED_NAME: &'static str = "descriptor";

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn region(&self) -> VirtRegion {
        VirtRegion::new(u64::from(self.vpn) << PAGE_SHIFT, PAGE_BYTES)
    }

    fn asid(&self) -> u64 {
        u64::from(self.asid)
    }

    fn is_global(&self) -> bool {
        self.global
    }

    fn permissions(&self) -> Permissions {
        let ap = self.ap & 7;
        Permissions {
            read: ap & 3 != 0,
            write: ap & 4 == 0 && ap & 3 != 0,
            execute: !self.xn && ap & 3 != 0,
            user: ap & 2 != 0,
        }
    }

    fn frame_addr(&self, vaddr: VirtAddr) -> Option<PhysAddr> {
        Some(PhysAddr::new(
            (u64::from(self.pfn) << PAGE_SHIFT) | vaddr.page_offset(PAGE_BYTES),
        ))
    }

    fn pack(&self) -> u64 {
        ((u64::from(self.pfn) & 0xf_ffff) << PAGE_SHIFT)
            | if self.global { 0 } else { D_NG }
            | if self.s { D_S } else { 0 }
            | if self.ap & 4 != 0 { D_AP2 } else { 0 }
            | (u64::from(self.tex & 7) << 6)
            | (u64::from(self.ap & 3) << 4)
            | if self.c { D_C } else { 0 }
            | if self.b { D_B } else { 0 }
            | D_SMALL
            | if self.xn { D_XN } else { 0 }
    }

    fn with_packed(&self, packed: u64) -> Result<Self, String> {
        if packed >> 32 != 0 {
            return Err(format!("descriptor {packed:#x} exceeds 32 bits"));
        }
        if packed & D_SMALL == 0 {
            return Err(format!("descriptor {packed:#x} is not a small page"));
        }
        Ok(Self {
            pfn: (packed >> PAGE_SHIFT) as u32,
            global: packed & D_NG == 0,
            s: packed & D_S != 0,
            ap: ((packed >> 4) & 3) as u8 | if packed & D_AP2 != 0 { 4 } else { 0 },
            tex: ((packed >> 6) & 7) as u8,
            c: packed & D_C != 0,
            b: packed & D_B != 0,
            xn: packed & D_XN != 0,
            valid: true,
            ..*self
        })
    }

    fn persist_fields(&self, out: &mut SectionOut<'_>) {
        out.param("vpn", &self.vpn);
        out.param("pfn", &self.pfn);
        out.param("asid", &self.asid);
        out.param("global", &self.global);
        out.param("ap", &self.ap);
        out.param("tex", &self.tex);
        out.param("c", &self.c);
        out.param("b", &self.b);
        out.param("s", &self.s);
        out.param("xn", &self.xn);
        out.param("valid", &self.valid);
    }

    fn restore_fields(section: &SectionIn<'_>) -> Result<Self, CheckpointError> {
        Ok(Self {
            vpn: section.param("vpn")?,
            pfn: section.param("pfn")?,
            asid: section.param("asid")?,
            global: section.param("global")?,
            ap: section.param("ap")?,
            tex: section.param("tex")?,
            c: section.param("c")?,
            b: section.param("b")?,
            s: section.param("s")?,
            xn: section.param("xn")?,
            valid: section.param("valid")?,
        })
    }
}
