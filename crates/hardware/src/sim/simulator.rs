//! Simulator: owns one thread context, its process and its debug stub side-by-side.
//!
//! Instruction semantics come from an external [`Executor`]; the driver
//! services the traps the ISA layer owns (syscalls and breakpoints) and feeds
//! retire events to the debug stub.

use tracing::{debug, error, info};

use crate::common::error::{DebugError, SimError};
use crate::config::Config;
use crate::core::context::{ThreadContext, ThreadStatus};
use crate::debug::arch::DebugArch;
use crate::debug::stub::{DebugState, RemoteDebugStub, StopReason};
use crate::isa::Isa;
use crate::process::image::LoadedImage;
use crate::process::os::OsPersonality;
use crate::process::{EmulatedProcess, ProcessArch};
use crate::sim::checkpoint::{Checkpoint, CheckpointOut, Serializable};
use crate::syscall::desc::SyscallTable;

/// Checkpoint section holding the thread context.
pub const THREAD_SECTION: &str = "system.cpu.xc";
/// Checkpoint section holding the emulated process.
pub const PROCESS_SECTION: &str = "system.process";
/// Checkpoint section holding driver counters.
pub const DRIVER_SECTION: &str = "system";

/// What one executed instruction did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecOutcome {
    /// An ordinary instruction retired and the PC moved on.
    Retired,
    /// A syscall trap; the PC already names the following instruction.
    Syscall,
    /// A breakpoint trap; the PC still names the trap word.
    Breakpoint,
}

/// Executes instructions against a thread context.
pub trait Executor<I: Isa> {
    /// Executes the instruction at `tc.pc()`.
    fn execute(&mut self, tc: &mut ThreadContext<I>) -> ExecOutcome;
}

/// Result of one driver tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// One instruction executed; keep going.
    Executed,
    /// The debugger holds the target; nothing executed.
    Paused,
    /// The target stopped under the debugger.
    Stopped(StopReason),
    /// The program exited with this code.
    Exited(i64),
    /// The thread halted after a fatal error.
    Halted,
}

/// Top-level simulator for one emulated process.
#[derive(Debug)]
pub struct Simulator<I, O, E>
where
    I: ProcessArch + SyscallTable<O> + DebugArch,
    O: OsPersonality,
    E: Executor<I>,
{
    /// Architectural state of the only thread.
    pub tc: ThreadContext<I>,
    /// Process the thread belongs to.
    pub process: EmulatedProcess<I, O>,
    debug: Option<RemoteDebugStub<I>>,
    executor: E,
    config: Config,
    retired: u64,
}

impl<I, O, E> Simulator<I, O, E>
where
    I: ProcessArch + SyscallTable<O> + DebugArch,
    O: OsPersonality,
    E: Executor<I>,
{
    /// Creates a simulator and starts the process on its thread.
    ///
    /// # Errors
    ///
    /// Returns the process error if the image cannot be placed or the initial
    /// stack does not fit.
    pub fn new(image: LoadedImage, config: Config, executor: E) -> Result<Self, SimError> {
        let mut tc = ThreadContext::new(config.memory.tlb_entries);
        let mut process = EmulatedProcess::new(image, &config.process);
        process.startup(&mut tc)?;
        let debug = config.debug.enabled.then(RemoteDebugStub::new);
        Ok(Self {
            tc,
            process,
            debug,
            executor,
            config,
            retired: 0,
        })
    }

    /// Instructions retired so far.
    pub const fn retired(&self) -> u64 {
        self.retired
    }

    /// The debug stub, if debugging is enabled.
    pub const fn debug_stub(&self) -> Option<&RemoteDebugStub<I>> {
        self.debug.as_ref()
    }

    /// Runs one debugger request against the stub and the thread.
    ///
    /// A fatal debug error halts the thread; every later tick reports
    /// [`TickOutcome::Halted`].
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::NotAttached`] when debugging is disabled, or the
    /// request's own error.
    pub fn debug_request<R>(
        &mut self,
        request: impl FnOnce(&mut RemoteDebugStub<I>, &mut ThreadContext<I>) -> Result<R, DebugError>,
    ) -> Result<R, SimError> {
        let stub = self.debug.as_mut().ok_or(DebugError::NotAttached)?;
        request(stub, &mut self.tc).map_err(|e| {
            if e.is_fatal() {
                error!(arch = %I::ID, error = %e, "fatal debug error; halting thread");
                self.tc.status = ThreadStatus::Halted;
                self.tc.regs.dump();
            }
            SimError::from(e)
        })
    }

    fn held_by_debugger(&self) -> bool {
        self.debug.as_ref().is_some_and(|stub| match stub.state() {
            DebugState::Detached => self.config.debug.wait_for_attach,
            DebugState::Running => false,
            DebugState::Attached | DebugState::Stopped(_) => true,
        })
    }

    /// Executes one instruction unless the program has exited or the debugger
    /// holds the target.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnhandledTrap`] for a breakpoint trap with no running
    /// debugger, or a debug error from the stub.
    pub fn tick(&mut self) -> Result<TickOutcome, SimError> {
        if let Some(code) = self.process.exit_status() {
            return Ok(TickOutcome::Exited(code));
        }
        if self.tc.status == ThreadStatus::Halted {
            return Ok(TickOutcome::Halted);
        }
        if self.held_by_debugger() {
            return Ok(TickOutcome::Paused);
        }

        match self.executor.execute(&mut self.tc) {
            ExecOutcome::Retired => {}
            ExecOutcome::Syscall => {
                let num = self.tc.syscall_num();
                let ret = self.process.syscall(&mut self.tc);
                if self.config.general.trace_syscalls {
                    info!(num, value = ret.value(), success = ret.is_success(), "syscall");
                }
            }
            ExecOutcome::Breakpoint => {
                let pc = self.tc.pc();
                return match self.debug.as_mut().filter(|stub| stub.is_running()) {
                    Some(stub) => Ok(TickOutcome::Stopped(stub.report_trap(&mut self.tc)?)),
                    None => {
                        error!(pc = format_args!("{pc:#x}"), "unhandled breakpoint trap");
                        self.tc.regs.dump();
                        Err(SimError::UnhandledTrap {
                            pc,
                            reason: "breakpoint trap with no debugger running".to_owned(),
                        })
                    }
                };
            }
        }
        self.retired += 1;

        if let Some(code) = self.process.exit_status() {
            if let Some(stub) = self.debug.as_mut() {
                let _ = stub.on_process_exit(&mut self.tc, code);
            }
            info!(code, retired = self.retired, "program exited");
            return Ok(TickOutcome::Exited(code));
        }
        if let Some(stub) = self.debug.as_mut()
            && let Some(reason) = stub.on_retire(&mut self.tc)?
        {
            return Ok(TickOutcome::Stopped(reason));
        }
        Ok(TickOutcome::Executed)
    }

    /// Ticks until something other than an ordinary instruction happens, or
    /// until the configured instruction limit.
    ///
    /// # Errors
    ///
    /// Propagates the first [`tick`](Self::tick) error.
    pub fn run_until_stop(&mut self) -> Result<TickOutcome, SimError> {
        let limit = self.config.general.max_instructions;
        loop {
            if limit.is_some_and(|max| self.retired >= max) {
                debug!(retired = self.retired, "instruction limit reached");
                return Ok(TickOutcome::Executed);
            }
            match self.tick()? {
                TickOutcome::Executed => {}
                other => return Ok(other),
            }
        }
    }

    /// Captures the thread and process state.
    pub fn checkpoint(&self) -> CheckpointOut {
        let mut out = CheckpointOut::new();
        out.section(DRIVER_SECTION).param("retired", &self.retired);
        self.tc.serialize(&mut out, THREAD_SECTION);
        self.process.serialize(&mut out, PROCESS_SECTION);
        out
    }

    /// Restores the thread and process state captured by [`checkpoint`](Self::checkpoint).
    ///
    /// Nothing changes unless every section restores.
    ///
    /// # Errors
    ///
    /// Returns the first checkpoint error.
    pub fn restore(&mut self, cp: &Checkpoint) -> Result<(), SimError> {
        let retired = cp.section(DRIVER_SECTION)?.param("retired")?;
        let mut tc = self.tc.clone();
        tc.unserialize(cp, THREAD_SECTION)?;
        self.process.unserialize(cp, PROCESS_SECTION)?;
        self.tc = tc;
        self.retired = retired;
        info!(retired, "restored from checkpoint");
        Ok(())
    }
}

/// Simulator for the architecture selected at build time.
pub type DefaultSimulator<O, E> = Simulator<crate::isa::TheIsa, O, E>;
