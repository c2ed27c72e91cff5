//! # Translation Entry Tests
//!
//! Lookup, address-space matching, flushing, and checkpoint persistence of
//! each architecture's entry, including cross-validation of the packed form
//! against the discrete fields.

use multisim_core::common::{CheckpointError, PhysAddr, VirtAddr};
use multisim_core::core::units::mmu::{Tlb, TranslationEntry};
use multisim_core::isa::alpha::tlb::AlphaTlbEntry;
use multisim_core::isa::arm::tlb::ArmTlbEntry;
use multisim_core::isa::mips::tlb::{EntryLo, MipsTlbEntry};
use multisim_core::isa::sparc::tlb::{SparcTlbEntry, TteFlags};
use multisim_core::sim::checkpoint::{Checkpoint, CheckpointOut, Serializable};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

const SECTION: &str = "system.cpu.xc.tlb.entry0";

fn persisted<E: TranslationEntry>(entry: &E) -> Checkpoint {
    let mut out = CheckpointOut::new();
    entry.persist(&mut out, SECTION);
    out.to_checkpoint()
}

fn round_trip<E: TranslationEntry>(entry: &E) -> E {
    E::restore(&persisted(entry), SECTION).unwrap()
}

fn restored<E: TranslationEntry>(entry: &E) -> Result<E, TestCaseError> {
    E::restore(&persisted(entry), SECTION).map_err(|e| TestCaseError::fail(e.to_string()))
}

fn packed_word<E: TranslationEntry>(cp: &Checkpoint) -> u64 {
    cp.section(SECTION).unwrap().param(E::PACKED_NAME).unwrap()
}

fn with_packed_word<E: TranslationEntry>(entry: &E, packed: u64) -> Result<E, CheckpointError> {
    let mut cp = persisted(entry);
    cp.set(SECTION, E::PACKED_NAME, &packed.to_string());
    E::restore(&cp, SECTION)
}

fn assert_inconsistent<E: TranslationEntry>(result: Result<E, CheckpointError>) {
    match result {
        Err(CheckpointError::InconsistentEntry { section, .. }) => assert_eq!(section, SECTION),
        other => panic!("expected an inconsistent entry, got {other:?}"),
    }
}

#[test]
fn test_alpha_entry_round_trips() {
    let entry = AlphaTlbEntry {
        asma: true,
        fonw: true,
        ..AlphaTlbEntry::new(0x9_0000, 0x1234, 7, 0xf, 0x8)
    };
    assert_eq!(round_trip(&entry), entry);
}

#[test]
fn test_mips_entry_round_trips() {
    let entry = MipsTlbEntry::new(0x7f00_2000, 42, 0x1_0000, 0x1_0001);
    assert_eq!(round_trip(&entry), entry);
}

#[test]
fn test_sparc_entry_round_trips() {
    let entry = SparcTlbEntry {
        size: 4 << 20,
        partition_id: 3,
        used: true,
        ..SparcTlbEntry::new(0x4000_0000, 0x1_0000_0000, 12)
    };
    assert_eq!(round_trip(&entry), entry);
}

#[test]
fn test_arm_entry_round_trips() {
    let entry = ArmTlbEntry {
        xn: true,
        tex: 5,
        ..ArmTlbEntry::new(0xb_ff00, 0x8_0123, 9)
    };
    assert_eq!(round_trip(&entry), entry);
}

#[test]
fn test_fields_wider_than_packed_slots_round_trip() {
    let sparc = SparcTlbEntry::new(0x2000, 0x8123, 1);
    assert_eq!(round_trip(&sparc), sparc);

    let sparc_odd_size = SparcTlbEntry {
        size: 16 << 10,
        ..SparcTlbEntry::new(0x2000, 0x8000, 1)
    };
    assert_eq!(round_trip(&sparc_odd_size), sparc_odd_size);

    let arm = ArmTlbEntry::new(1, 0x10_0000, 1);
    assert_eq!(round_trip(&arm), arm);

    let mips = MipsTlbEntry {
        lo0: EntryLo {
            c: 0xff,
            ..EntryLo::mapped(0x0100_0000)
        },
        ..MipsTlbEntry::new(0x2000, 0, 1, 2)
    };
    assert_eq!(round_trip(&mips), mips);

    let alpha = AlphaTlbEntry::new(0x10, 1 << 40, 0, 0xff, 0x1f);
    assert_eq!(round_trip(&alpha), alpha);
}

fn entry_lo() -> impl Strategy<Value = EntryLo> {
    (any::<u32>(), any::<u8>(), any::<bool>(), any::<bool>())
        .prop_map(|(pfn, c, d, v)| EntryLo { pfn, c, d, v })
}

fn tte_flags() -> impl Strategy<Value = TteFlags> {
    any::<[bool; 8]>().prop_map(|[nfo, ie, locked, cp, cv, e, p, w]| TteFlags {
        nfo,
        ie,
        locked,
        cp,
        cv,
        e,
        p,
        w,
    })
}

proptest! {
    #[test]
    fn test_any_alpha_entry_restores_its_own_checkpoint(
        (tag, ppn, xre, xwe, asn) in (any::<u64>(), any::<u64>(), any::<u8>(), any::<u8>(), any::<u8>()),
        (asma, fonr, fonw, valid) in any::<(bool, bool, bool, bool)>(),
    ) {
        let entry = AlphaTlbEntry { tag, ppn, xre, xwe, asn, asma, fonr, fonw, valid };
        prop_assert_eq!(restored(&entry)?, entry);
    }

    #[test]
    fn test_any_mips_entry_restores_its_own_checkpoint(
        (mask, vpn2, asid, global) in (any::<u32>(), any::<u64>(), any::<u8>(), any::<bool>()),
        lo0 in entry_lo(),
        lo1 in entry_lo(),
    ) {
        let entry = MipsTlbEntry { mask, vpn2, asid, global, lo0, lo1 };
        prop_assert_eq!(restored(&entry)?, entry);
    }

    #[test]
    fn test_any_sparc_entry_restores_its_own_checkpoint(
        (va, size, context_id, partition_id) in (any::<u64>(), any::<u64>(), any::<u16>(), any::<u8>()),
        (real, paddr, used, valid) in (any::<bool>(), any::<u64>(), any::<bool>(), any::<bool>()),
        flags in tte_flags(),
    ) {
        let entry = SparcTlbEntry { va, size, context_id, partition_id, real, paddr, flags, used, valid };
        prop_assert_eq!(restored(&entry)?, entry);
    }

    #[test]
    fn test_any_arm_entry_restores_its_own_checkpoint(
        (vpn, pfn, asid, ap, tex) in (any::<u32>(), any::<u32>(), any::<u8>(), any::<u8>(), any::<u8>()),
        [global, c, b, s, xn, valid] in any::<[bool; 6]>(),
    ) {
        let entry = ArmTlbEntry { vpn, pfn, asid, global, ap, tex, c, b, s, xn, valid };
        prop_assert_eq!(restored(&entry)?, entry);
    }
}

#[test]
fn test_invalid_entries_persist_zero_and_round_trip() {
    fn check<E: TranslationEntry>() {
        let entry = E::default();
        assert!(!entry.is_valid());
        assert_eq!(packed_word::<E>(&persisted(&entry)), 0);
        assert_eq!(round_trip(&entry), entry);
    }
    check::<AlphaTlbEntry>();
    check::<MipsTlbEntry>();
    check::<SparcTlbEntry>();
    check::<ArmTlbEntry>();
}

#[test]
fn test_zero_packed_word_leaves_fields_authoritative() {
    let entry = ArmTlbEntry::new(0x100, 0x200, 1);
    assert_eq!(with_packed_word(&entry, 0).unwrap(), entry);
}

#[test]
fn test_packed_word_disagreeing_with_fields_is_rejected() {
    let entry = ArmTlbEntry::new(0x100, 0x200, 1);
    let other = ArmTlbEntry::new(0x100, 0x201, 1);
    assert_inconsistent(with_packed_word(&entry, other.pack()));

    let entry = AlphaTlbEntry::new(0x10, 0x20, 0, 0xf, 0xf);
    let other = AlphaTlbEntry { fonr: true, ..entry };
    assert_inconsistent(with_packed_word(&entry, other.pack()));
}

#[test]
fn test_packed_word_on_invalid_fields_is_rejected() {
    let valid = MipsTlbEntry::new(0x2000, 0, 1, 2);
    let invalid = MipsTlbEntry {
        lo0: Default::default(),
        lo1: Default::default(),
        ..valid
    };
    assert!(!invalid.is_valid());
    assert_inconsistent(with_packed_word(&invalid, valid.pack()));
}

#[rstest]
#[case::reserved_bits(0xc000_0000)]
#[case::neither_half_valid(0x0000_0004_0000_0004)]
#[case::mismatched_global(0x0000_0003_0000_0002)]
fn test_corrupt_mips_entry_lo_is_rejected(#[case] packed: u64) {
    let entry = MipsTlbEntry::new(0x2000, 0, 1, 2);
    assert_inconsistent(with_packed_word(&entry, packed));
}

#[rstest]
#[case::size_code_two(1 << 63 | 2 << 61)]
#[case::size_code_four(1 << 63 | 1 << 48)]
#[case::valid_bit_clear(0x0000_0000_4000_0032)]
fn test_corrupt_sparc_tte_is_rejected(#[case] packed: u64) {
    let entry = SparcTlbEntry::new(0x10_0000, 0x4000_0000, 3);
    assert_inconsistent(with_packed_word(&entry, packed));
}

#[rstest]
#[case::wider_than_32_bits(1 << 32 | 0x2)]
#[case::not_a_small_page(0x8000_0800)]
fn test_corrupt_arm_descriptor_is_rejected(#[case] packed: u64) {
    let entry = ArmTlbEntry::new(0x10, 0x8_0000, 2);
    assert_inconsistent(with_packed_word(&entry, packed));
}

#[test]
fn test_alpha_reserved_pte_bits_are_rejected() {
    let entry = AlphaTlbEntry::new(0x10, 0x20, 0, 0xf, 0xf);
    assert_inconsistent(with_packed_word(&entry, entry.pack() | 0x8));
}

#[test]
fn test_missing_entry_field_is_reported() {
    let entry = SparcTlbEntry::new(0x10_0000, 0x4000_0000, 3);
    let mut cp = persisted(&entry);
    let _ = cp.remove(SECTION, "range.contextId").unwrap();
    match SparcTlbEntry::restore(&cp, SECTION) {
        Err(CheckpointError::MissingField { section, name }) => {
            assert_eq!(section, SECTION);
            assert_eq!(name, "range.contextId");
        }
        other => panic!("expected a missing field, got {other:?}"),
    }
}

#[test]
fn test_lookup_translates_with_page_offset() {
    let mut tlb = Tlb::new(4);
    let _ = tlb.insert_at(2, ArmTlbEntry::new(0x10, 0x8_0000, 5));
    assert_eq!(
        tlb.lookup(VirtAddr::new(0x1_0abc), 5),
        Some((2, PhysAddr::new(0x8000_0abc)))
    );
    assert_eq!(tlb.lookup(VirtAddr::new(0x1_1000), 5), None);
}

#[test]
fn test_lookup_respects_address_space() {
    let mut tlb = Tlb::new(2);
    let _ = tlb.insert_at(0, AlphaTlbEntry::new(0x4, 0x40, 1, 0xf, 0xf));
    assert!(tlb.lookup(VirtAddr::new(0x8000), 1).is_some());
    assert!(tlb.lookup(VirtAddr::new(0x8000), 2).is_none());

    let _ = tlb.insert_at(1, AlphaTlbEntry {
        asma: true,
        ..AlphaTlbEntry::new(0x5, 0x50, 1, 0xf, 0xf)
    });
    assert!(tlb.lookup(VirtAddr::new(0xa000), 2).is_some());
}

#[test]
fn test_mips_pair_selects_odd_page() {
    let entry = MipsTlbEntry::new(0x4000, 0, 0x100, 0x200);
    assert_eq!(
        entry.translate(VirtAddr::new(0x4010), 0),
        Some(PhysAddr::new(0x10_0010))
    );
    assert_eq!(
        entry.translate(VirtAddr::new(0x5010), 0),
        Some(PhysAddr::new(0x20_0010))
    );
}

#[test]
fn test_flush_asid_spares_global_entries() {
    let mut tlb = Tlb::new(3);
    let _ = tlb.insert_at(0, ArmTlbEntry::new(1, 1, 4));
    let _ = tlb.insert_at(1, ArmTlbEntry {
        global: true,
        ..ArmTlbEntry::new(2, 2, 4)
    });
    let _ = tlb.insert_at(2, ArmTlbEntry::new(3, 3, 5));

    tlb.flush_asid(4);
    assert_eq!(tlb.valid_entries().count(), 2);
    assert!(tlb.entry(0).is_some_and(|e| !e.is_valid()));

    tlb.flush();
    assert_eq!(tlb.valid_entries().count(), 0);
    assert_eq!(tlb.len(), 3);
}

#[test]
fn test_insert_out_of_range_is_ignored() {
    let mut tlb = Tlb::<ArmTlbEntry>::new(1);
    assert_eq!(tlb.insert_at(5, ArmTlbEntry::new(1, 1, 0)), None);
    assert_eq!(tlb.valid_entries().count(), 0);
}

#[test]
fn test_tlb_round_trips_with_mixed_slots() {
    let mut tlb = Tlb::new(4);
    let _ = tlb.insert_at(1, SparcTlbEntry::new(0x2000, 0x8000, 1));
    let _ = tlb.insert_at(3, SparcTlbEntry::new(0x6000, 0xa000, 2));

    let mut out = CheckpointOut::new();
    tlb.serialize(&mut out, "tlb");
    let cp = out.to_checkpoint();

    let mut restored = Tlb::new(1);
    restored.unserialize(&cp, "tlb").unwrap();
    assert_eq!(restored, tlb);
}

#[test]
fn test_tlb_restore_is_all_or_nothing() {
    let mut tlb = Tlb::new(2);
    let _ = tlb.insert_at(0, SparcTlbEntry::new(0x2000, 0x8000, 1));
    let _ = tlb.insert_at(1, SparcTlbEntry::new(0x4000, 0xa000, 1));
    let mut out = CheckpointOut::new();
    tlb.serialize(&mut out, "tlb");
    let mut cp = out.to_checkpoint();
    cp.set("tlb.entry1", SparcTlbEntry::PACKED_NAME, "1");

    let mut target = Tlb::<SparcTlbEntry>::new(2);
    assert!(target.unserialize(&cp, "tlb").is_err());
    assert_eq!(target, Tlb::new(2));
}
