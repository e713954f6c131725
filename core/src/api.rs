//! The library-level convenience entry point: run a loaded [`Program`] from
//! its default board to completion, recursing through every board call
//! synchronously (the same path [`RunState::tick`] takes with
//! `use_prepared = false`). Callers who want to step sub-board evaluation
//! manually should drive a [`RunState`] directly instead.

use crate::board::{BoardCall, Program};
use crate::config::EvalConfig;
use crate::io::{BufferIoPort, IoPort};
use crate::random::{Random, ZeroRandom};
use crate::run_state::{CallResult, EvalContext, RunState};

/// A completed run of the entry board: its outputs, every byte written to
/// stdout along the way, and how many ticks it took.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub result: CallResult,
    pub stdout: Vec<u8>,
    pub ticks: u64,
}

/// Run `program`'s entry board to completion with caller-supplied I/O and
/// randomness, honoring `config`.
pub fn run_entry_with<IO: IoPort, R: Random>(
    program: &Program,
    inputs: &[u8; 36],
    config: &EvalConfig,
    io: &mut IO,
    rng: &mut R,
) -> RunOutcome {
    let entry_call = BoardCall {
        board: program.entry(),
        x: 0,
        y: 0,
    };
    let mut rs = RunState::new(program, &entry_call, inputs, 0);
    let mut ctx = EvalContext { program, io, rng, config };
    while rs.tick(&mut ctx, false) {}
    rs.finalize(program);

    let stdout = std::mem::take(&mut rs.stdout_text);
    let ticks = rs.tick_number();
    RunOutcome {
        result: rs.into_result(),
        stdout,
        ticks,
    }
}

/// Run `program`'s entry board to completion with no stdin and no
/// randomness beyond always drawing `0` — deterministic, for callers that
/// only care about a board's numbered outputs.
pub fn run_entry(program: &Program, inputs: &[u8; 36]) -> RunOutcome {
    let config = EvalConfig::default();
    let mut io = BufferIoPort::default();
    let mut rng = ZeroRandom;
    run_entry_with(program, inputs, &config, &mut io, &mut rng)
}

/// Load `text` as a single in-memory source (no `#include` support) and run
/// its entry board to completion.
pub fn run_source(name: &str, text: &str, inputs: &[u8; 36]) -> Result<RunOutcome, crate::loader::LoadError> {
    let program = crate::loader::load_source(name, text)?;
    Ok(run_entry(&program, inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_falls_straight_down_onto_output() {
        let src = "}0\n{0";
        let mut inputs = [0u8; 36];
        inputs[0] = 42;
        let outcome = run_source("pass.mbl", src, &inputs).unwrap();
        assert_eq!(outcome.result.outputs[0], Some(42));
    }

    #[test]
    fn run_entry_reports_tick_count() {
        let src = "{0..";
        let mut inputs = [0u8; 36];
        inputs[0] = 0;
        let outcome = run_source("const.mbl", src, &inputs).unwrap();
        assert!(outcome.ticks >= 1);
    }
}
