//! # Configuration Tests
//!
//! Defaults and JSON parsing of the simulator configuration.

use multisim_core::config::Config;
use pretty_assertions::assert_eq;

#[test]
fn test_default_config_identity() {
    let config = Config::default();
    assert_eq!(config.process.hostname, "m5.eecs.umich.edu");
    assert_eq!(config.process.pid, 100);
    assert_eq!(config.process.ppid, 99);
    assert_eq!(config.process.uid, 100);
    assert_eq!(config.process.euid, 100);
    assert_eq!(config.process.gid, 100);
    assert_eq!(config.process.egid, 100);
    assert_eq!(config.process.cwd, "/");
}

#[test]
fn test_default_config_layout() {
    let config = Config::default();
    assert_eq!(config.process.stack_size, 8 * 1024 * 1024);
    assert_eq!(config.process.max_stack_size, 64 * 1024 * 1024);
    assert_eq!(config.process.stack_base, None);
    assert_eq!(config.process.mmap_start, None);
    assert_eq!(config.memory.tlb_entries, 48);
    assert!(!config.debug.enabled);
    assert!(!config.debug.wait_for_attach);
    assert!(!config.general.trace_syscalls);
    assert_eq!(config.general.max_instructions, None);
}

#[test]
fn test_empty_json_yields_defaults() {
    let parsed = Config::from_json("{}").unwrap();
    let default = Config::default();
    assert_eq!(parsed.process.hostname, default.process.hostname);
    assert_eq!(parsed.process.pid, default.process.pid);
    assert_eq!(parsed.process.stack_size, default.process.stack_size);
    assert_eq!(parsed.memory.tlb_entries, default.memory.tlb_entries);
    assert_eq!(parsed.debug.enabled, default.debug.enabled);
}

#[test]
fn test_partial_section_keeps_field_defaults() {
    let config = Config::from_json(
        r#"{
            "process": { "uid": 0, "argv": ["prog"], "stack_base": 2147418112 },
            "general": { "max_instructions": 1000 }
        }"#,
    )
    .unwrap();
    assert_eq!(config.process.uid, 0);
    assert_eq!(config.process.euid, 100);
    assert_eq!(config.process.argv, ["prog"]);
    assert_eq!(config.process.stack_base, Some(0x7fff_0000));
    assert_eq!(config.process.hostname, "m5.eecs.umich.edu");
    assert_eq!(config.general.max_instructions, Some(1000));
    assert!(!config.general.trace_syscalls);
}

#[test]
fn test_debug_section_parses() {
    let config =
        Config::from_json(r#"{ "debug": { "enabled": true, "wait_for_attach": true } }"#).unwrap();
    assert!(config.debug.enabled);
    assert!(config.debug.wait_for_attach);
}

#[test]
fn test_mistyped_field_is_rejected() {
    assert!(Config::from_json(r#"{ "process": { "pid": "one hundred" } }"#).is_err());
    assert!(Config::from_json(r#"{ "memory": { "tlb_entries": -1 } }"#).is_err());
}

#[test]
fn test_malformed_json_is_rejected() {
    assert!(Config::from_json("{ \"process\": ").is_err());
}
