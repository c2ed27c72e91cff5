//! Syscall tests.


/// Return encoding conventions.
pub mod ret;
