//! Mock executors for driving the simulator without a decoder.

use multisim_core::core::ThreadContext;
use multisim_core::isa::Isa;
use multisim_core::sim::{ExecOutcome, Executor};

/// Word the mock treats as a syscall trap.
pub const SYSCALL_WORD: u32 = 0x0000_000c;

/// Word the mock treats as an ordinary instruction.
pub const NOP_WORD: u32 = 0x0000_0000;

/// Executes straight-line code: every word is an ordinary instruction except
/// the architecture's breakpoint word and [`SYSCALL_WORD`].
///
/// Records the address of every word it executes.
#[derive(Debug, Default)]
pub struct StraightLine {
    /// Addresses executed, in order.
    pub trace: Vec<u64>,
}

impl<I: Isa> Executor<I> for StraightLine {
    fn execute(&mut self, tc: &mut ThreadContext<I>) -> ExecOutcome {
        let pc = tc.pc();
        let word = tc
            .mem
            .read_u32(pc, I::BYTE_ORDER)
            .unwrap_or_else(|e| panic!("fetch fault at {pc:#x}: {e}"));
        self.trace.push(pc);
        if word == I::BREAKPOINT_INSN {
            return ExecOutcome::Breakpoint;
        }
        tc.advance_pc();
        if word == SYSCALL_WORD {
            ExecOutcome::Syscall
        } else {
            ExecOutcome::Retired
        }
    }
}
