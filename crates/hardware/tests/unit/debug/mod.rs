//! Remote debug tests.


/// A full MIPS debug session driven through the simulator.
pub mod mips_session;
