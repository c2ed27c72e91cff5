//! # MIPS Debug Session
//!
//! Attach, step, breakpoints and exit, driven through the simulator exactly
//! as a debugger transport would.

use multisim_core::config::Config;
use multisim_core::debug::{DebugArch, DebugState, StopReason};
use multisim_core::isa::Isa;
use multisim_core::isa::mips::{self, Mips};
use multisim_core::process::os::Linux;
use multisim_core::sim::{Simulator, TickOutcome};
use pretty_assertions::assert_eq;

use crate::common::harness::{config_with_args, program, text_base};
use crate::common::mocks::{NOP_WORD, SYSCALL_WORD, StraightLine};

const WIRE_PC: usize = 37;

type MipsSim = Simulator<Mips, Linux, StraightLine>;

fn debug_config() -> Config {
    let mut config = config_with_args(&["prog"]);
    config.debug.enabled = true;
    config
}

fn session(config: Config) -> MipsSim {
    let words = [NOP_WORD, NOP_WORD, NOP_WORD, SYSCALL_WORD, NOP_WORD];
    let mut sim = Simulator::new(program::<Mips>(&words), config, StraightLine::default()).unwrap();
    sim.tc.set_int_reg(mips::reg::V0, 4001);
    sim.tc.set_int_reg(mips::reg::A0, 5);
    sim.debug_request(|stub, _| stub.attach()).unwrap();
    sim
}

fn snapshot(sim: &mut MipsSim) -> Vec<u64> {
    sim.debug_request(|stub, tc| stub.read_registers(tc)).unwrap()
}

#[test]
fn test_attached_target_is_held() {
    let mut sim = session(debug_config());
    assert_eq!(sim.tick().unwrap(), TickOutcome::Paused);
    assert_eq!(sim.run_until_stop().unwrap(), TickOutcome::Paused);
    assert_eq!(sim.retired(), 0);
    assert_eq!(sim.tc.pc(), text_base::<Mips>());
}

#[test]
fn test_single_steps_change_only_pc() {
    let base = text_base::<Mips>();
    let mut sim = session(debug_config());
    let before = snapshot(&mut sim);

    sim.debug_request(|stub, tc| stub.step(tc)).unwrap();
    assert_eq!(
        sim.tick().unwrap(),
        TickOutcome::Stopped(StopReason::Step(base + 4))
    );
    let middle = snapshot(&mut sim);

    sim.debug_request(|stub, tc| stub.step(tc)).unwrap();
    assert_eq!(
        sim.run_until_stop().unwrap(),
        TickOutcome::Stopped(StopReason::Step(base + 8))
    );
    let after = snapshot(&mut sim);

    for (prev, next, pc) in [(&before, &middle, base + 4), (&middle, &after, base + 8)] {
        let changed: Vec<usize> = (0..Mips::NUM_WIRE_REGS)
            .filter(|&i| prev[i] != next[i])
            .collect();
        assert_eq!(changed, [WIRE_PC]);
        assert_eq!(next[WIRE_PC], pc);
    }
    assert_eq!(sim.retired(), 2);
}

#[test]
fn test_breakpoint_hit_step_over_and_exit() {
    let base = text_base::<Mips>();
    let bp = base + 8;
    let mut sim = session(debug_config());

    sim.debug_request(|stub, tc| stub.insert_breakpoint(tc, bp)).unwrap();
    sim.debug_request(|stub, tc| stub.cont(tc)).unwrap();
    assert_eq!(
        sim.run_until_stop().unwrap(),
        TickOutcome::Stopped(StopReason::Breakpoint(bp))
    );
    assert_eq!(sim.tc.pc(), bp);
    assert_eq!(sim.retired(), 2);

    // Stepping executes the original word and re-arms the trap behind it.
    sim.debug_request(|stub, tc| stub.step(tc)).unwrap();
    assert_eq!(
        sim.tick().unwrap(),
        TickOutcome::Stopped(StopReason::Step(bp + 4))
    );
    assert_eq!(
        sim.tc.mem.read_u32(bp, Mips::BYTE_ORDER).unwrap(),
        Mips::BREAKPOINT_INSN
    );

    sim.debug_request(|stub, tc| stub.remove_breakpoint(tc, bp)).unwrap();
    assert_eq!(sim.tc.mem.read_u32(bp, Mips::BYTE_ORDER).unwrap(), NOP_WORD);

    sim.debug_request(|stub, tc| stub.cont(tc)).unwrap();
    assert_eq!(sim.run_until_stop().unwrap(), TickOutcome::Exited(5));
    assert_eq!(
        sim.debug_stub().map(|stub| stub.state()),
        Some(DebugState::Stopped(StopReason::Exited(5)))
    );
}

#[test]
fn test_continue_over_breakpoint_at_resume_address() {
    let base = text_base::<Mips>();
    let mut sim = session(debug_config());

    sim.debug_request(|stub, tc| stub.insert_breakpoint(tc, base)).unwrap();
    sim.debug_request(|stub, tc| stub.insert_breakpoint(tc, base + 4)).unwrap();
    sim.debug_request(|stub, tc| stub.cont(tc)).unwrap();
    assert_eq!(
        sim.run_until_stop().unwrap(),
        TickOutcome::Stopped(StopReason::Breakpoint(base + 4))
    );
    assert_eq!(
        sim.tc.mem.read_u32(base, Mips::BYTE_ORDER).unwrap(),
        Mips::BREAKPOINT_INSN
    );
}

#[test]
fn test_exit_restores_breakpointed_code() {
    let base = text_base::<Mips>();
    let mut sim = session(debug_config());
    sim.debug_request(|stub, tc| stub.insert_breakpoint(tc, base + 16)).unwrap();
    sim.debug_request(|stub, tc| stub.cont(tc)).unwrap();

    assert_eq!(sim.run_until_stop().unwrap(), TickOutcome::Exited(5));
    assert_eq!(
        sim.tc.mem.read_u32(base + 16, Mips::BYTE_ORDER).unwrap(),
        NOP_WORD
    );
    assert!(sim.debug_stub().is_some_and(|stub| stub.breakpoints().is_empty()));
    assert_eq!(sim.tick().unwrap(), TickOutcome::Exited(5));
}

#[test]
fn test_wait_for_attach_holds_until_continue() {
    let mut config = debug_config();
    config.debug.wait_for_attach = true;
    let mut sim: MipsSim =
        Simulator::new(program::<Mips>(&[NOP_WORD; 4]), config, StraightLine::default()).unwrap();

    assert_eq!(sim.tick().unwrap(), TickOutcome::Paused);
    sim.debug_request(|stub, _| stub.attach()).unwrap();
    assert_eq!(sim.tick().unwrap(), TickOutcome::Paused);
    sim.debug_request(|stub, tc| stub.cont(tc)).unwrap();
    assert_eq!(sim.tick().unwrap(), TickOutcome::Executed);
    assert_eq!(sim.retired(), 1);
}
