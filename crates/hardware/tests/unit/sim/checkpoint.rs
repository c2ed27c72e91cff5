//! # Checkpoint Format Tests
//!
//! Text parsing, typed entry access and file round trips.

use multisim_core::common::{CheckpointError, RegisterFile};
use multisim_core::core::arch::gpr::IntRegFile;
use multisim_core::isa::mips::Mips;
use multisim_core::isa::sparc::Sparc;
use multisim_core::sim::checkpoint::{Checkpoint, CheckpointOut, Serializable};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn test_comments_and_blank_lines_are_skipped() {
    let cp = Checkpoint::parse(
        "# saved state\n\n[system]\n; driver counters\nretired = 42\n\n[system.process]\npid=100\n",
    )
    .unwrap();
    assert_eq!(cp.section("system").unwrap().param::<u64>("retired").unwrap(), 42);
    assert_eq!(cp.section("system.process").unwrap().param::<u64>("pid").unwrap(), 100);
    assert_eq!(cp.section_names().collect::<Vec<_>>(), ["system", "system.process"]);
}

#[test]
fn test_repeated_section_merges_entries() {
    let cp = Checkpoint::parse("[a]\nx=1\n[b]\ny=2\n[a]\nz=3\n").unwrap();
    let a = cp.section("a").unwrap();
    assert!(a.has("x"));
    assert!(a.has("z"));
}

#[test]
fn test_syntax_errors_report_line() {
    let err = Checkpoint::parse("[ok]\nx=1\nnot an entry\n").unwrap_err();
    assert!(matches!(err, CheckpointError::Syntax { line: 3, .. }));
    assert_eq!(err.section(), None);

    let err = Checkpoint::parse("[unterminated\n").unwrap_err();
    assert!(matches!(err, CheckpointError::Syntax { line: 1, .. }));

    let err = Checkpoint::parse("[s]\n=5\n").unwrap_err();
    assert!(matches!(err, CheckpointError::Syntax { line: 2, .. }));
}

#[test]
fn test_missing_section_is_named() {
    let cp = Checkpoint::parse("[present]\n").unwrap();
    let err = cp.section("absent").unwrap_err();
    assert!(matches!(&err, CheckpointError::MissingSection { section } if section == "absent"));
    assert!(cp.has_section("present"));
    assert!(!cp.has_section("absent"));
}

#[test]
fn test_malformed_scalar_is_reported() {
    let cp = Checkpoint::parse("[s]\npc=0xzz\nflag=maybe\nsmall=300\n").unwrap();
    let s = cp.section("s").unwrap();
    assert!(matches!(s.param::<u64>("pc"), Err(CheckpointError::Malformed { .. })));
    assert!(matches!(s.param::<bool>("flag"), Err(CheckpointError::Malformed { .. })));
    assert!(matches!(s.param::<u8>("small"), Err(CheckpointError::Malformed { .. })));
}

#[test]
fn test_optional_entry_absent_is_none() {
    let cp = Checkpoint::parse("[s]\ncode=-3\n").unwrap();
    let s = cp.section("s").unwrap();
    assert_eq!(s.param_opt::<i64>("code").unwrap(), Some(-3));
    assert_eq!(s.param_opt::<i64>("other").unwrap(), None);
}

#[test]
fn test_array_length_is_checked() {
    let cp = Checkpoint::parse("[s]\nregs=1 2 3\n").unwrap();
    let s = cp.section("s").unwrap();
    assert_eq!(s.param_vec::<u32>("regs").unwrap(), [1, 2, 3]);
    match s.param_array::<u32>("regs", 4) {
        Err(CheckpointError::LengthMismatch {
            expected, found, ..
        }) => assert_eq!((expected, found), (4, 3)),
        other => panic!("expected a length mismatch, got {other:?}"),
    }
}

#[test]
fn test_register_bank_rejects_short_sequence() {
    let mut regs = RegisterFile::<Sparc>::new();
    regs.write(9, 5);
    let mut out = CheckpointOut::new();
    regs.serialize(&mut out, "cpu");
    let mut cp = out.to_checkpoint();
    cp.set("cpu", IntRegFile::<Sparc>::CHECKPOINT_KEY, "1 2 3");

    let mut target = RegisterFile::<Sparc>::new();
    let err = target.unserialize(&cp, "cpu").unwrap_err();
    assert!(matches!(err, CheckpointError::LengthMismatch { .. }));
    assert_eq!(target, RegisterFile::new());
}

#[test]
fn test_register_wider_than_machine_is_rejected() {
    let mut regs = RegisterFile::<Mips>::new();
    regs.write(4, 0xffff_ffff);
    let mut out = CheckpointOut::new();
    regs.serialize(&mut out, "cpu");
    let mut cp = out.to_checkpoint();

    let mut slots: Vec<u64> = cp
        .section("cpu")
        .unwrap()
        .param_vec(IntRegFile::<Mips>::CHECKPOINT_KEY)
        .unwrap();
    slots[4] = 1 << 32;
    let text = slots.iter().map(u64::to_string).collect::<Vec<_>>().join(" ");
    cp.set("cpu", IntRegFile::<Mips>::CHECKPOINT_KEY, &text);

    let mut target = RegisterFile::<Mips>::new();
    target.write(4, 7);
    let before = target.clone();
    let err = target.unserialize(&cp, "cpu").unwrap_err();
    assert!(matches!(
        &err,
        CheckpointError::Malformed { name, .. } if name == IntRegFile::<Mips>::CHECKPOINT_KEY
    ));
    assert_eq!(target, before);
}

#[test]
fn test_rendered_text_uses_section_headers() {
    let mut out = CheckpointOut::new();
    out.section("system").param("retired", &7u64);
    out.section("system.process").param("pid", &100u64);
    assert_eq!(out.to_string(), "[system]\nretired=7\n\n[system.process]\npid=100\n\n");
}

#[test]
fn test_writing_a_section_twice_appends() {
    let mut out = CheckpointOut::new();
    assert!(out.is_empty());
    out.section("s").param("a", &1u8);
    out.section("s").param("b", &true);
    out.section("s").param("a", &2u8);
    let cp = out.to_checkpoint();
    let s = cp.section("s").unwrap();
    assert_eq!(s.param::<u8>("a").unwrap(), 2);
    assert!(s.param::<bool>("b").unwrap());
}

#[test]
fn test_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("m5.cpt");

    let mut regs = RegisterFile::<Sparc>::new();
    regs.write(3, 0xfeed);
    regs.write_f(7, 1.0f64.to_bits());
    let mut out = CheckpointOut::new();
    regs.serialize(&mut out, "system.cpu.xc");
    out.save(&path).unwrap();

    let cp = Checkpoint::load(&path).unwrap();
    assert_eq!(cp, out.to_checkpoint());

    let mut restored = RegisterFile::<Sparc>::new();
    restored.unserialize(&cp, "system.cpu.xc").unwrap();
    assert_eq!(restored, regs);
}

#[test]
fn test_loading_a_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.cpt");
    let err = Checkpoint::load(&path).unwrap_err();
    assert!(matches!(&err, CheckpointError::Io { path: p, .. } if p == &path));
    assert!(err.to_string().contains("absent.cpt"));
}
