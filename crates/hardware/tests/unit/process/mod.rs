//! Emulated process tests.

/// Table lookup and `ENOSYS` handling.
pub mod dispatch;
