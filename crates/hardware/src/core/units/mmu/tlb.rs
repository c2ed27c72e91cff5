//! Translation Lookaside Buffer (TLB).
//!
//! A fully associative cache of architecture-defined translation entries. This module
//! provides:
//! 1. **Contract:** [`TranslationEntry`], the capabilities every architecture's entry
//!    exposes (validity, covered region, ASID, permissions, translation, packed form).
//! 2. **Persistence:** Each entry is saved as its discrete fields plus the packed
//!    hardware word. On restore the packed word, when non-zero, must agree with the
//!    fields on every bit it encodes or the restore fails.
//! 3. **Container:** [`Tlb`], a fixed-size array of entries with lookup, insert and flush.

use std::fmt;

use tracing::trace;

use crate::common::addr::{PhysAddr, VirtAddr, VirtRegion};
use crate::common::error::CheckpointError;
use crate::sim::checkpoint::{Checkpoint, CheckpointOut, SectionIn, SectionOut, Serializable};

/// Access rights granted by a translation entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Permissions {
    /// Loads are permitted.
    pub read: bool,
    /// Stores are permitted.
    pub write: bool,
    /// Instruction fetch is permitted.
    pub execute: bool,
    /// User-mode access is permitted.
    pub user: bool,
}

/// A cached virtual-to-physical translation.
///
/// The default value of every implementor is an invalid entry.
pub trait TranslationEntry: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Name of the packed hardware word in checkpoints.
    const PACKED_NAME: &'static str;

    /// Returns `true` if the entry may satisfy lookups.
    fn is_valid(&self) -> bool;

    /// Returns the virtual span this entry covers.
    fn region(&self) -> VirtRegion;

    /// Returns the address-space identifier (context, ASN) the entry is tagged with.
    fn asid(&self) -> u64;

    /// Returns `true` if the entry matches every address space.
    fn is_global(&self) -> bool;

    /// Returns the rights this entry grants.
    fn permissions(&self) -> Permissions;

    /// Returns the physical address backing `vaddr`, assumed inside [`Self::region`].
    ///
    /// `None` when the covered sub-page is itself invalid (a MIPS half-pair).
    fn frame_addr(&self, vaddr: VirtAddr) -> Option<PhysAddr>;

    /// Encodes the hardware word for this entry. Only meaningful for valid entries.
    fn pack(&self) -> u64;

    /// Returns `self` with its hardware-word fields replaced by those in `packed`.
    ///
    /// Fields the word does not encode (tags, ASIDs, region bases) are kept.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if `packed` is not a well-formed word.
    fn with_packed(&self, packed: u64) -> Result<Self, String>;

    /// Writes every discrete field.
    fn persist_fields(&self, out: &mut SectionOut<'_>);

    /// Rebuilds an entry from its discrete fields.
    ///
    /// # Errors
    ///
    /// Returns a checkpoint error if a field is missing or malformed.
    fn restore_fields(section: &SectionIn<'_>) -> Result<Self, CheckpointError>;

    /// Returns `true` if this entry translates `vaddr` in address space `asid`.
    #[inline(always)]
    fn matches(&self, vaddr: VirtAddr, asid: u64) -> bool {
        self.is_valid() && (self.is_global() || self.asid() == asid) && self.region().contains(vaddr)
    }

    /// Translates `vaddr` in address space `asid`, or `None` on a miss.
    #[inline(always)]
    fn translate(&self, vaddr: VirtAddr, asid: u64) -> Option<PhysAddr> {
        if self.matches(vaddr, asid) {
            self.frame_addr(vaddr)
        } else {
            None
        }
    }

    /// The packed word as checkpointed: zero for an invalid entry.
    fn packed_or_zero(&self) -> u64 {
        if self.is_valid() { self.pack() } else { 0 }
    }

    /// Writes the entry under `section`: its fields plus the packed word.
    fn persist(&self, out: &mut CheckpointOut, section: &str) {
        let mut s = out.section(section);
        self.persist_fields(&mut s);
        s.param(Self::PACKED_NAME, &self.packed_or_zero());
    }

    /// Restores an entry from `section`.
    ///
    /// A zero packed word means the fields stand alone. A non-zero word must
    /// decode, and the decoded entry must pack to the same word as the fields.
    /// Only the bits the word encodes take part: a field wider than its slot
    /// (an unaligned SPARC `paddr`, say) is kept as written.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::InconsistentEntry`] when the packed word is
    /// malformed or disagrees with the fields, or a field error from
    /// [`Self::restore_fields`].
    fn restore(cp: &Checkpoint, section: &str) -> Result<Self, CheckpointError> {
        let s = cp.section(section)?;
        let fields = Self::restore_fields(&s)?;
        let packed: u64 = s.param(Self::PACKED_NAME)?;
        if packed == 0 {
            return Ok(fields);
        }

        let inconsistent = |reason: String| CheckpointError::InconsistentEntry {
            section: section.to_owned(),
            reason,
        };
        if !fields.is_valid() {
            return Err(inconsistent(format!(
                "{} = {packed:#x} but the fields describe an invalid entry",
                Self::PACKED_NAME
            )));
        }
        let decoded = fields.with_packed(packed).map_err(inconsistent)?;
        if decoded.pack() != fields.pack() {
            return Err(inconsistent(format!(
                "{} = {packed:#x} disagrees with the discrete fields",
                Self::PACKED_NAME
            )));
        }
        Ok(fields)
    }
}

/// Translation Lookaside Buffer structure.
#[derive(Clone, Debug, PartialEq)]
pub struct Tlb<E: TranslationEntry> {
    /// Vector of TLB entries.
    entries: Vec<E>,
}

impl<E: TranslationEntry> Tlb<E> {
    /// Creates a new TLB of `size` invalid entries.
    ///
    /// # Arguments
    ///
    /// * `size` - Number of entries.
    pub fn new(size: usize) -> Self {
        Self {
            entries: vec![E::default(); size],
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the TLB holds no slots.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a virtual address in the TLB.
    ///
    /// # Arguments
    ///
    /// * `vaddr` - Address to translate.
    /// * `asid` - Current address-space identifier.
    ///
    /// # Returns
    ///
    /// `Some((index, paddr))` for the first matching valid entry, otherwise `None`.
    pub fn lookup(&self, vaddr: VirtAddr, asid: u64) -> Option<(usize, PhysAddr)> {
        let hit = self
            .entries
            .iter()
            .enumerate()
            .find_map(|(idx, e)| e.translate(vaddr, asid).map(|pa| (idx, pa)));
        trace!(%vaddr, asid, hit = hit.is_some(), "tlb lookup");
        hit
    }

    /// Returns the entry in slot `index`.
    pub fn entry(&self, index: usize) -> Option<&E> {
        self.entries.get(index)
    }

    /// Replaces the entry in slot `index`, returning the previous one.
    ///
    /// Out-of-range slots are ignored and return `None`.
    pub fn insert_at(&mut self, index: usize, entry: E) -> Option<E> {
        self.entries
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, entry))
    }

    /// Invalidates every entry.
    pub fn flush(&mut self) {
        self.entries.fill(E::default());
    }

    /// Invalidates every non-global entry tagged with `asid`.
    pub fn flush_asid(&mut self, asid: u64) {
        for e in &mut self.entries {
            if e.is_valid() && !e.is_global() && e.asid() == asid {
                *e = E::default();
            }
        }
    }

    /// Iterates over the valid entries.
    pub fn valid_entries(&self) -> impl Iterator<Item = &E> {
        self.entries.iter().filter(|e| e.is_valid())
    }
}

impl<E: TranslationEntry> Serializable for Tlb<E> {
    fn serialize(&self, out: &mut CheckpointOut, section: &str) {
        out.section(section).param("size", &self.entries.len());
        for (i, e) in self.entries.iter().enumerate() {
            e.persist(out, &format!("{section}.entry{i}"));
        }
    }

    fn unserialize(&mut self, cp: &Checkpoint, section: &str) -> Result<(), CheckpointError> {
        let size: usize = cp.section(section)?.param("size")?;
        let entries = (0..size)
            .map(|i| E::restore(cp, &format!("{section}.entry{i}")))
            .collect::<Result<Vec<_>, _>>()?;
        self.entries = entries;
        Ok(())
    }
}
