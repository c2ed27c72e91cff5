//! Remote debug stub state machine.
//!
//! Wire framing belongs to the transport; this stub owns what the transport
//! asks about. It provides:
//! 1. **Session State:** `Detached -> Attached -> Running <-> Stopped`, with requests
//!    rejected in states where they make no sense.
//! 2. **Target Access:** Register blocks in debugger order and checked memory access.
//! 3. **Execution Control:** Breakpoints, single-step and continue, including stepping
//!    transparently over a breakpoint at the resume address.
//!
//! The simulator driver feeds the stub three events: an instruction retired, a
//! breakpoint trap was taken, or the program exited.

use std::marker::PhantomData;

use tracing::{debug, error, info};

use crate::common::error::DebugError;
use crate::core::context::ThreadContext;
use crate::debug::arch::DebugArch;
use crate::debug::breakpoints::BreakpointTable;

/// Why the target stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Executed an inserted breakpoint.
    Breakpoint(u64),
    /// Executed a trap word the debugger did not insert.
    Trap(u64),
    /// A single step completed; holds the new PC.
    Step(u64),
    /// Stopped on the debugger's request.
    Interrupted(u64),
    /// The program exited with this code.
    Exited(i64),
}

/// Session state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebugState {
    /// No debugger.
    #[default]
    Detached,
    /// Debugger connected; target has not been resumed yet.
    Attached,
    /// Target executing.
    Running,
    /// Target halted.
    Stopped(StopReason),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Resume {
    /// Stop after the next retired instruction.
    stepping: bool,
    /// Breakpoint lifted to execute the instruction under it.
    reinsert_at: Option<u64>,
}

/// Remote debug stub for architecture `I`.
#[derive(Clone, Debug, Default)]
pub struct RemoteDebugStub<I: DebugArch> {
    state: DebugState,
    resume: Resume,
    breakpoints: BreakpointTable,
    _isa: PhantomData<I>,
}

impl<I: DebugArch> RemoteDebugStub<I> {
    /// Creates a detached stub.
    pub fn new() -> Self {
        Self {
            state: DebugState::Detached,
            resume: Resume::default(),
            breakpoints: BreakpointTable::new(),
            _isa: PhantomData,
        }
    }

    /// Current session state.
    pub const fn state(&self) -> DebugState {
        self.state
    }

    /// Returns `true` while a debugger is attached.
    pub const fn is_attached(&self) -> bool {
        !matches!(self.state, DebugState::Detached)
    }

    /// Returns `true` while the target may execute.
    pub const fn is_running(&self) -> bool {
        matches!(self.state, DebugState::Running)
    }

    /// Inserted breakpoints.
    pub const fn breakpoints(&self) -> &BreakpointTable {
        &self.breakpoints
    }

    /// Opens a session. The target is halted until resumed.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::AlreadyAttached`] if a session is open.
    pub fn attach(&mut self) -> Result<(), DebugError> {
        if self.is_attached() {
            return Err(DebugError::AlreadyAttached);
        }
        self.state = DebugState::Attached;
        self.resume = Resume::default();
        info!(arch = %I::ID, "remote debugger attached");
        Ok(())
    }

    /// Closes the session, restoring every instruction under a breakpoint.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::NotAttached`] without a session, or the error of
    /// disarming a pending step.
    pub fn detach(&mut self, tc: &mut ThreadContext<I>) -> Result<(), DebugError> {
        if !self.is_attached() {
            return Err(DebugError::NotAttached);
        }
        if self.resume.stepping {
            I::clear_single_step(tc)?;
        }
        self.breakpoints.restore_all::<I>(&mut tc.mem);
        self.resume = Resume::default();
        self.state = DebugState::Detached;
        info!(arch = %I::ID, "remote debugger detached");
        Ok(())
    }

    fn ensure_halted(&self) -> Result<(), DebugError> {
        match self.state {
            DebugState::Attached | DebugState::Stopped(_) => Ok(()),
            DebugState::Running => Err(DebugError::TargetRunning),
            DebugState::Detached => Err(DebugError::NotAttached),
        }
    }

    fn check_access(tc: &ThreadContext<I>, addr: u64, len: usize) -> Result<(), DebugError> {
        if I::memory_accessible(tc, addr, len) {
            Ok(())
        } else {
            Err(DebugError::AccessDenied { addr, len })
        }
    }

    /// Reads the register block in debugger order.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::TargetRunning`] or [`DebugError::NotAttached`].
    pub fn read_registers(&self, tc: &ThreadContext<I>) -> Result<Vec<u64>, DebugError> {
        self.ensure_halted()?;
        let mut wire = vec![0; I::NUM_WIRE_REGS];
        I::read_wire_registers(tc, &mut wire);
        Ok(wire)
    }

    /// Writes the register block in debugger order.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::RegisterCount`] for a block of the wrong size, or a
    /// state error.
    pub fn write_registers(
        &mut self,
        tc: &mut ThreadContext<I>,
        wire: &[u64],
    ) -> Result<(), DebugError> {
        self.ensure_halted()?;
        if wire.len() != I::NUM_WIRE_REGS {
            return Err(DebugError::RegisterCount {
                expected: I::NUM_WIRE_REGS,
                found: wire.len(),
            });
        }
        I::write_wire_registers(tc, wire);
        Ok(())
    }

    /// Reads `len` bytes of target memory.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::AccessDenied`] outside the accessible address space,
    /// or a state error.
    pub fn read_memory(
        &self,
        tc: &ThreadContext<I>,
        addr: u64,
        len: usize,
    ) -> Result<Vec<u8>, DebugError> {
        self.ensure_halted()?;
        Self::check_access(tc, addr, len)?;
        let mut buf = vec![0; len];
        tc.mem
            .read(addr, &mut buf)
            .map_err(|_| DebugError::AccessDenied { addr, len })?;
        Ok(buf)
    }

    /// Writes target memory.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::AccessDenied`] outside the accessible address space,
    /// or a state error.
    pub fn write_memory(
        &mut self,
        tc: &mut ThreadContext<I>,
        addr: u64,
        data: &[u8],
    ) -> Result<(), DebugError> {
        self.ensure_halted()?;
        let len = data.len();
        Self::check_access(tc, addr, len)?;
        tc.mem
            .write(addr, data)
            .map_err(|_| DebugError::AccessDenied { addr, len })
    }

    /// Inserts a software breakpoint at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::AccessDenied`] if the instruction word is not
    /// accessible, or a state error.
    pub fn insert_breakpoint(
        &mut self,
        tc: &mut ThreadContext<I>,
        addr: u64,
    ) -> Result<(), DebugError> {
        self.ensure_halted()?;
        let len = I::INSN_BYTES as usize;
        Self::check_access(tc, addr, len)?;
        self.breakpoints
            .insert::<I>(&mut tc.mem, addr)
            .map_err(|_| DebugError::AccessDenied { addr, len })?;
        debug!(addr = format_args!("{addr:#x}"), "breakpoint set");
        Ok(())
    }

    /// Removes one reference to the breakpoint at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::NoBreakpoint`] if none is inserted there, or a state error.
    pub fn remove_breakpoint(
        &mut self,
        tc: &mut ThreadContext<I>,
        addr: u64,
    ) -> Result<(), DebugError> {
        self.ensure_halted()?;
        self.breakpoints.remove::<I>(&mut tc.mem, addr)
    }

    /// Resumes execution for exactly one instruction.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::Unimplemented`] where the architecture cannot step;
    /// the caller must treat that as fatal. State errors otherwise.
    pub fn step(&mut self, tc: &mut ThreadContext<I>) -> Result<(), DebugError> {
        self.ensure_halted()?;
        let target = I::set_single_step(tc).inspect_err(|e| {
            error!(arch = %I::ID, error = %e, "cannot single-step");
        })?;
        self.resume.stepping = true;
        self.resume_from(tc)?;
        debug!(
            pc = format_args!("{:#x}", tc.pc()),
            expect = format_args!("{target:#x}"),
            "single step"
        );
        Ok(())
    }

    /// Resumes execution until a breakpoint, an interrupt or exit.
    ///
    /// # Errors
    ///
    /// Returns a state error.
    pub fn cont(&mut self, tc: &mut ThreadContext<I>) -> Result<(), DebugError> {
        self.ensure_halted()?;
        self.resume.stepping = false;
        self.resume_from(tc)?;
        debug!(pc = format_args!("{:#x}", tc.pc()), "continue");
        Ok(())
    }

    fn resume_from(&mut self, tc: &mut ThreadContext<I>) -> Result<(), DebugError> {
        let pc = tc.pc();
        if self.breakpoints.contains(pc) {
            self.breakpoints
                .lift::<I>(&mut tc.mem, pc)
                .map_err(|_| DebugError::AccessDenied {
                    addr: pc,
                    len: I::INSN_BYTES as usize,
                })?;
            self.resume.reinsert_at = Some(pc);
        }
        self.state = DebugState::Running;
        Ok(())
    }

    /// Puts back the trap word lifted for the last resume, if any.
    fn rearm_lifted(&mut self, tc: &mut ThreadContext<I>) -> Result<(), DebugError> {
        if let Some(addr) = self.resume.reinsert_at.take() {
            self.breakpoints
                .reinsert::<I>(&mut tc.mem, addr)
                .map_err(|_| DebugError::AccessDenied {
                    addr,
                    len: I::INSN_BYTES as usize,
                })?;
        }
        Ok(())
    }

    fn stop(&mut self, reason: StopReason) -> StopReason {
        self.state = DebugState::Stopped(reason);
        info!(?reason, "target stopped");
        reason
    }

    /// Notifies the stub that one instruction retired.
    ///
    /// Re-arms a breakpoint that was stepped over and completes a pending step.
    ///
    /// # Returns
    ///
    /// The stop reason if the target is now halted.
    ///
    /// # Errors
    ///
    /// Returns the error of disarming the step.
    pub fn on_retire(&mut self, tc: &mut ThreadContext<I>) -> Result<Option<StopReason>, DebugError> {
        if !self.is_running() {
            return Ok(None);
        }
        self.rearm_lifted(tc)?;
        if self.resume.stepping {
            I::clear_single_step(tc)?;
            self.resume.stepping = false;
            return Ok(Some(self.stop(StopReason::Step(tc.pc()))));
        }
        Ok(None)
    }

    /// Reports that the target executed a trap word at its current PC.
    ///
    /// A breakpoint lifted for the resume is re-armed first.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::NotRunning`] unless the target is running, or the
    /// error of re-arming.
    pub fn report_trap(&mut self, tc: &mut ThreadContext<I>) -> Result<StopReason, DebugError> {
        if !self.is_running() {
            return Err(DebugError::NotRunning);
        }
        self.rearm_lifted(tc)?;
        let pc = tc.pc();
        self.resume = Resume::default();
        let reason = if self.breakpoints.contains(pc) {
            StopReason::Breakpoint(pc)
        } else {
            StopReason::Trap(pc)
        };
        Ok(self.stop(reason))
    }

    /// Halts a running target on the debugger's request.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::NotRunning`] unless the target is running.
    pub fn interrupt(&mut self, tc: &mut ThreadContext<I>) -> Result<StopReason, DebugError> {
        if !self.is_running() {
            return Err(DebugError::NotRunning);
        }
        self.rearm_lifted(tc)?;
        if self.resume.stepping {
            I::clear_single_step(tc)?;
            self.resume.stepping = false;
        }
        Ok(self.stop(StopReason::Interrupted(tc.pc())))
    }

    /// Notifies the stub that the program exited.
    ///
    /// Every instruction under a breakpoint is restored. An attached session
    /// stays open and reports the exit.
    pub fn on_process_exit(&mut self, tc: &mut ThreadContext<I>, code: i64) -> Option<StopReason> {
        self.breakpoints.restore_all::<I>(&mut tc.mem);
        self.resume = Resume::default();
        if self.is_attached() {
            Some(self.stop(StopReason::Exited(code)))
        } else {
            None
        }
    }
}
