//! Memory Management Unit (MMU).
//!
//! Address translation state shared by all architectures. Page-table walking is
//! architecture- and OS-specific and lives outside this layer; what remains here
//! is the cached translation entry contract and the TLB that holds entries.

/// Translation Lookaside Buffer (TLB) and the translation entry contract.
pub mod tlb;

pub use self::tlb::{Permissions, Tlb, TranslationEntry};
