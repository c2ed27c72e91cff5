//! Architecture-generic register banks.
//!
//! Each bank is sized and shaped by an [`Isa`](crate::isa::Isa) implementation.
//! It includes the following modules:
//! 1. **FPRs:** Floating-point bank with raw-bit, double and single views.
//! 2. **GPRs:** Integer bank with logical-to-physical redirection.
//! 3. **Misc:** Control and status registers.

/// Floating-point register bank.
pub mod fpr;

/// Integer register bank.
pub mod gpr;

/// Miscellaneous (control and status) register bank.
pub mod misc;
