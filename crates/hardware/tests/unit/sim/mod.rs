//! Simulation tests.

/// Checkpoint text format and file round trips.
pub mod checkpoint;
