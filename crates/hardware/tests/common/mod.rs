//! Shared helpers for the test suite.


/// Mock executors.
pub mod mocks;
