//! Guest operating-system personalities.
//!
//! A personality fixes what the emulated process reports about the kernel it
//! pretends to run on. Syscall numbering is per (architecture, personality) and
//! lives with each architecture's tables.

use std::fmt;

/// Kernel identity reported to the simulated program.
pub trait OsPersonality: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// Short name used in logs.
    const NAME: &'static str;
    /// `uname` sysname field.
    const SYSNAME: &'static str;
    /// `uname` release field.
    const RELEASE: &'static str;
    /// `uname` version field.
    const VERSION: &'static str;
    /// Size of each `uname` field including the terminator.
    const UTSNAME_FIELD_BYTES: usize;
}

/// Linux.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Linux;

impl OsPersonality for Linux {
    const NAME: &'static str = "linux";
    const SYSNAME: &'static str = "Linux";
    const RELEASE: &'static str = "2.6.16.19";
    const VERSION: &'static str = "#1 SMP";
    const UTSNAME_FIELD_BYTES: usize = 65;
}

/// Solaris (SPARC only).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Solaris;

impl OsPersonality for Solaris {
    const NAME: &'static str = "solaris";
    const SYSNAME: &'static str = "SunOS";
    const RELEASE: &'static str = "5.11";
    const VERSION: &'static str = "Generic";
    const UTSNAME_FIELD_BYTES: usize = 257;
}
