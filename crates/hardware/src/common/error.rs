//! Error definitions.
//!
//! This module defines every recoverable and fatal error the ISA layer reports. It provides:
//! 1. **Checkpoint Errors:** Missing sections, missing or malformed fields, inconsistent
//!    packed translation entries. These abort only the restore that hit them.
//! 2. **Memory Errors:** Accesses to unmapped simulated memory.
//! 3. **Debug Errors:** State-machine violations, access denials, and the fatal
//!    "unimplemented for this architecture" condition.
//! 4. **Syscall Errors:** Unknown versus not-yet-implemented call numbers.
//! 5. **Process and Simulation Errors:** Startup misuse and the driver's aggregate error.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::isa::ArchId;

/// Failure to persist or restore checkpoint state.
///
/// Every variant names the section it concerns so the persistence subsystem can
/// report which object refused to load.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The requested section does not exist in the checkpoint.
    #[error("checkpoint has no section [{section}]")]
    MissingSection {
        /// Section that was looked up.
        section: String,
    },

    /// A required `name = value` pair is absent from its section.
    #[error("checkpoint section [{section}] has no entry `{name}`")]
    MissingField {
        /// Section that was searched.
        section: String,
        /// Name of the missing entry.
        name: String,
    },

    /// A value could not be parsed as the expected type.
    #[error("checkpoint section [{section}]: `{name}` = {value:?} is malformed")]
    Malformed {
        /// Section holding the entry.
        section: String,
        /// Entry name.
        name: String,
        /// Raw text that failed to parse.
        value: String,
    },

    /// A sequence entry has the wrong number of elements.
    #[error("checkpoint section [{section}]: `{name}` holds {found} elements, expected {expected}")]
    LengthMismatch {
        /// Section holding the entry.
        section: String,
        /// Entry name.
        name: String,
        /// Element count the restoring object requires.
        expected: usize,
        /// Element count found in the checkpoint.
        found: usize,
    },

    /// A packed translation entry is malformed or disagrees with its fields.
    #[error("checkpoint section [{section}]: inconsistent translation entry: {reason}")]
    InconsistentEntry {
        /// Section holding the entry.
        section: String,
        /// What was wrong with the packed scalar.
        reason: String,
    },

    /// The checkpoint text is not in `[section]` / `name=value` form.
    #[error("checkpoint line {line}: {reason}")]
    Syntax {
        /// One-based line number.
        line: usize,
        /// Description of the problem.
        reason: String,
    },

    /// Reading or writing the checkpoint file failed.
    #[error("checkpoint file {}: {source}", .path.display())]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl CheckpointError {
    /// Returns the section this error refers to, if any.
    pub fn section(&self) -> Option<&str> {
        match self {
            Self::MissingSection { section }
            | Self::MissingField { section, .. }
            | Self::Malformed { section, .. }
            | Self::LengthMismatch { section, .. }
            | Self::InconsistentEntry { section, .. } => Some(section),
            Self::Syntax { .. } | Self::Io { .. } => None,
        }
    }
}

/// Access to simulated memory that is not mapped.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    /// Some byte of `[addr, addr + len)` lies outside every mapped page.
    #[error("access of {len} bytes at {addr:#x} touches unmapped memory")]
    Unmapped {
        /// First address of the access.
        addr: u64,
        /// Length of the access in bytes.
        len: usize,
    },
}

/// Errors reported by the remote debug stub.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DebugError {
    /// The request needs an attached debugger but none is attached.
    #[error("no debugger is attached")]
    NotAttached,

    /// `attach` was requested while a session is already open.
    #[error("a debugger is already attached")]
    AlreadyAttached,

    /// Register or memory access was requested while the target runs.
    #[error("target is running; request rejected")]
    TargetRunning,

    /// A stop was reported while the target was not running.
    #[error("target is not running")]
    NotRunning,

    /// The debugger asked for memory outside the simulated address space.
    #[error("access denied: {len} bytes at {addr:#x}")]
    AccessDenied {
        /// First address requested.
        addr: u64,
        /// Requested length in bytes.
        len: usize,
    },

    /// `remove_breakpoint` named an address with no inserted breakpoint.
    #[error("no breakpoint inserted at {addr:#x}")]
    NoBreakpoint {
        /// Address that was named.
        addr: u64,
    },

    /// A register write carried the wrong number of values.
    #[error("register block holds {found} values, expected {expected}")]
    RegisterCount {
        /// Wire register count of the active architecture.
        expected: usize,
        /// Count supplied by the debugger.
        found: usize,
    },

    /// A debug primitive is not implemented for this architecture.
    ///
    /// This is fatal: a session that silently skipped the operation would
    /// mislead the user.
    #[error("remote debug `{op}` is unimplemented for {arch}")]
    Unimplemented {
        /// Architecture lacking the primitive.
        arch: ArchId,
        /// Name of the missing primitive.
        op: &'static str,
    },
}

impl DebugError {
    /// Returns `true` for errors that must terminate the simulator.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Unimplemented { .. })
    }
}

/// Failure to find a usable syscall descriptor.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SyscallError {
    /// The call number has no entry in the descriptor table.
    #[error("unsupported syscall number {num}")]
    UnknownCall {
        /// Call number requested by the program.
        num: u64,
    },

    /// The call number is known but its emulation is not written yet.
    #[error("syscall {name} ({num}) is not implemented")]
    Unimplemented {
        /// Call number requested by the program.
        num: u64,
        /// Descriptor name.
        name: &'static str,
    },
}

/// Errors from emulated-process setup.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProcessError {
    /// `startup` was invoked a second time.
    #[error("process startup already ran")]
    AlreadyStarted,

    /// Arguments, environment and auxiliary vector do not fit the initial stack.
    #[error("initial stack needs {needed} bytes but only {available} are reserved")]
    StackTooSmall {
        /// Bytes the initial frame requires.
        needed: u64,
        /// Bytes reserved for the stack.
        available: u64,
    },

    /// Writing the image or the stack failed.
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Aggregate error surfaced by the simulator driver.
#[derive(Debug, Error)]
pub enum SimError {
    /// Checkpoint persistence failed.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// Remote debugging failed.
    #[error(transparent)]
    Debug(#[from] DebugError),

    /// Process setup failed.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Simulated memory access failed.
    #[error(transparent)]
    Memory(#[from] MemoryError),

    /// The executor hit a trap the ISA layer cannot service.
    #[error("unhandled trap at pc {pc:#x}: {reason}")]
    UnhandledTrap {
        /// PC of the trapping instruction.
        pc: u64,
        /// Description supplied by the executor or driver.
        reason: String,
    },
}

impl SimError {
    /// Returns `true` when the simulator process must terminate.
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::Debug(e) => e.is_fatal(),
            Self::UnhandledTrap { .. } => true,
            Self::Checkpoint(_) | Self::Process(_) | Self::Memory(_) => false,
        }
    }
}
