//! Alpha translation entry.
//!
//! The packed form is the hardware page table entry:
//!
//! | bits  | field                                      |
//! |-------|--------------------------------------------|
//! | 0     | valid                                      |
//! | 1     | fault on read                              |
//! | 2     | fault on write                             |
//! | 4     | address space match (global)               |
//! | 8-11  | read enables (kernel, exec, super, user)   |
//! | 12-15 | write enables (kernel, exec, super, user)  |
//! | 32-63 | page frame number                          |
//!
//! The tag and ASN live only in the TLB and are persisted as fields.

use crate::common::addr::{PhysAddr, VirtAddr, VirtRegion};
use crate::common::error::CheckpointError;
use crate::core::units::mmu::tlb::{Permissions, TranslationEntry};
use crate::sim::checkpoint::{SectionIn, SectionOut};

const PAGE_SHIFT: u32 = 13;
const PAGE_BYTES: u64 = 1 << PAGE_SHIFT;

const PTE_V: u64 = 1 << 0;
const PTE_FOR: u64 = 1 << 1;
const PTE_FOW: u64 = 1 << 2;
const PTE_ASM: u64 = 1 << 4;
const PTE_RESERVED: u64 = 0xffff_00e8;

/// User-mode bit within the read and write enables.
const MODE_USER: u8 = 1 << 3;

/// One Alpha TLB entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlphaTlbEntry {
    /// Virtual page number.
    pub tag: u64,
    /// Physical page number.
    pub ppn: u64,
    /// Read enables, one bit per processor mode.
    pub xre: u8,
    /// Write enables, one bit per processor mode.
    pub xwe: u8,
    /// Address space number.
    pub asn: u8,
    /// Matches every address space.
    pub asma: bool,
    /// Fault on read.
    pub fonr: bool,
    /// Fault on write.
    pub fonw: bool,
    /// Entry is in use.
    pub valid: bool,
}

impl AlphaTlbEntry {
    /// Builds a valid entry mapping virtual page `tag` to physical page `ppn`.
    pub const fn new(tag: u64, ppn: u64, asn: u8, xre: u8, xwe: u8) -> Self {
        Self {
            tag,
            ppn,
            xre,
            xwe,
            asn,
            asma: false,
            fonr: false,
            fonw: false,
            valid: true,
        }
    }
}

impl TranslationEntry for AlphaTlbEntry {
    const PACKED_NAME: &'static str = "pte";

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn region(&self) -> VirtRegion {
        VirtRegion::new(self.tag << PAGE_SHIFT, PAGE_BYTES)
    }

    fn asid(&self) -> u64 {
        u64::from(self.asn)
    }

    fn is_global(&self) -> bool {
        self.asma
    }

    fn permissions(&self) -> Permissions {
        Permissions {
            read: self.xre != 0 && !self.fonr,
            write: self.xwe != 0 && !self.fonw,
            execute: self.xre != 0,
            user: self.xre & MODE_USER != 0,
        }
    }

    fn frame_addr(&self, vaddr: VirtAddr) -> Option<PhysAddr> {
        Some(PhysAddr::new(
            (self.ppn << PAGE_SHIFT) | vaddr.page_offset(PAGE_BYTES),
        ))
    }

    fn pack(&self) -> u64 {
        (self.ppn << 32)
            | (u64::from(self.xwe & 0xf) << 12)
            | (u64::from(self.xre & 0xf) << 8)
            | if self.asma { PTE_ASM } else { 0 }
            | if self.fonw { PTE_FOW } else { 0 }
            | if self.fonr { PTE_FOR } else { 0 }
            | PTE_V
    }

    fn with_packed(&self, packed: u64) -> Result<Self, String> {
        if packed & PTE_V == 0 {
            return Err(format!("pte {packed:#x} has the valid bit clear"));
        }
        if packed & PTE_RESERVED != 0 {
            return Err(format!(
                "pte {packed:#x} sets reserved bits {:#x}",
                packed & PTE_RESERVED
            ));
        }
        Ok(Self {
            ppn: packed >> 32,
            xwe: ((packed >> 12) & 0xf) as u8,
            xre: ((packed >> 8) & 0xf) as u8,
            asma: packed & PTE_ASM != 0,
            fonw: packed & PTE_FOW != 0,
            fonr: packed & PTE_FOR != 0,
            valid: true,
            ..*self
        })
    }

    fn persist_fields(&self, out: &mut SectionOut<'_>) {
        out.param("tag", &self.tag);
        out.param("ppn", &self.ppn);
        out.param("xre", &self.xre);
        out.param("xwe", &self.xwe);
        out.param("asn", &self.asn);
        out.param("asma", &self.asma);
        out.param("fonr", &self.fonr);
        out.param("fonw", &self.fonw);
        out.param("valid", &self.valid);
    }

    fn restore_fields(section: &SectionIn<'_>) -> Result<Self, CheckpointError> {
        Ok(Self {
            tag: section.param("tag")?,
            ppn: section.param("ppn")?,
            xre: section.param("xre")?,
            xwe: section.param("xwe")?,
            asn: section.param("asn")?,
            asma: section.param("asma")?,
            fonr: section.param("fonr")?,
            fonw: section.param("fonw")?,
            valid: section.param("valid")?,
        })
    }
}
