//! The tick-based evaluator: one [`RunState`] per board invocation, double
//! buffering marbles between `cur` and `next` each tick.

use crate::board::{Board, BoardCall, BoardId, Program};
use crate::config::EvalConfig;
use crate::device::{DeviceKind, OUTPUT_LEFT, OUTPUT_RIGHT, RANDOM_SELF};
use crate::io::IoPort;
use crate::marble::Marble;
use crate::random::Random;

/// Everything a tick needs beyond the evaluating board's own state: the
/// program it was loaded from, and the capabilities it was given.
pub struct EvalContext<'a, IO, R> {
    pub program: &'a Program,
    pub io: &'a mut IO,
    pub rng: &'a mut R,
    pub config: &'a EvalConfig,
}

/// The result of running a board to completion: its numbered outputs and
/// the two directional outputs, each present only if that output device
/// ever received a marble.
#[derive(Clone, Debug, Default)]
pub struct CallResult {
    pub outputs: [Option<u8>; 36],
    pub output_left: Option<u8>,
    pub output_right: Option<u8>,
}

/// One invocation of a board: its own marble planes plus a tree of
/// sub-invocations for the board calls nested inside it.
pub struct RunState {
    board: BoardId,
    call_x: u16,
    call_y: u16,
    indents: usize,

    cur_marbles: Vec<Marble>,
    next_marbles: Vec<Marble>,
    stdout_values: Vec<Marble>,
    /// Bytes written to stdout so far, retained only when verbose.
    pub stdout_text: Vec<u8>,

    tick_number: u64,

    outputs: [Marble; 36],
    output_left: Marble,
    output_right: Marble,

    /// Populated by [`RunState::prepare_board_calls`]; a caller driving the
    /// stepwise API moves finished entries into `processed_board_calls`
    /// before calling [`RunState::tick`] with `use_prepared = true`.
    pub prepared_board_calls: Vec<RunState>,
    pub processed_board_calls: Vec<RunState>,

    marbles_moved: bool,
    terminator_reached: bool,
    outputs_filled: [bool; 36],
    left_filled: bool,
    right_filled: bool,
    no_output: bool,
}

fn is_empty_cell(marble: Marble) -> bool {
    !marble.is_occupied()
}

impl RunState {
    /// Build a fresh invocation of `board_call.board`, called from cell
    /// `(board_call.x, board_call.y)` on whatever board holds it (or from
    /// outside the program, for the entry point).
    pub fn new(program: &Program, board_call: &BoardCall, inputs: &[u8; 36], indents: usize) -> RunState {
        let board = program.board(board_call.board);
        let mut cur_marbles = vec![Marble::EMPTY; board.cell_count()];
        for &(loc, value) in &board.initial_marbles {
            cur_marbles[loc as usize] = Marble::occupied(value);
        }
        for i in 0..36 {
            for &loc in &board.inputs[i] {
                cur_marbles[loc as usize] = Marble::occupied(inputs[i]);
            }
        }
        let outputs_filled = std::array::from_fn(|i| board.outputs[i].is_empty());
        let left_filled = board.output_left.is_empty();
        let right_filled = board.output_right.is_empty();
        let no_output = outputs_filled.iter().all(|&f| f) && left_filled && right_filled;
        let next_marbles = vec![Marble::EMPTY; board.cell_count()];
        let stdout_values = vec![Marble::EMPTY; board.width as usize];

        RunState {
            board: board_call.board,
            call_x: board_call.x,
            call_y: board_call.y,
            indents,
            cur_marbles,
            next_marbles,
            stdout_values,
            stdout_text: Vec::new(),
            tick_number: 0,
            outputs: [Marble::EMPTY; 36],
            output_left: Marble::EMPTY,
            output_right: Marble::EMPTY,
            prepared_board_calls: Vec::new(),
            processed_board_calls: Vec::new(),
            marbles_moved: true,
            terminator_reached: false,
            outputs_filled,
            left_filled,
            right_filled,
            no_output,
        }
    }

    pub fn tick_number(&self) -> u64 {
        self.tick_number
    }

    fn board<'p>(&self, program: &'p Program) -> &'p Board {
        program.board(self.board)
    }

    /// Drive each nested board call far enough to know its inputs, and
    /// build a fresh `RunState` for it — used by callers that want to step
    /// sub-board evaluation manually rather than run it to completion in
    /// one call.
    pub fn prepare_board_calls(&mut self, program: &Program, config: &EvalConfig) {
        let board = self.board(program);
        for board_call in &board.board_calls {
            let loc = board.index(board_call.x, board_call.y) as usize;
            let callee = program.board(board_call.board);
            let can_call = (0..callee.length as usize)
                .all(|i| callee.inputs[i].is_empty() || !is_empty_cell(self.cur_marbles[loc + i]));
            if !can_call {
                for i in loc..loc + callee.length as usize {
                    if !is_empty_cell(self.cur_marbles[i]) {
                        let value = self.cur_marbles[i].value();
                        self.set_marble(program, config, i as u32, 0, 0, value);
                    }
                }
                continue;
            }
            let mut inputs = [0u8; 36];
            for i in 0..callee.length as usize {
                inputs[i] = self.cur_marbles[loc + i].value();
            }
            self.prepared_board_calls
                .push(RunState::new(program, board_call, &inputs, self.indents + 1));
        }
    }

    /// Advance one tick. `use_prepared`: fold in `processed_board_calls`
    /// (already driven to completion by the caller); otherwise, drive and
    /// finish every board call synchronously within this tick.
    pub fn tick<IO: IoPort, R: Random>(&mut self, ctx: &mut EvalContext<IO, R>, use_prepared: bool) -> bool {
        self.marbles_moved = false;

        if use_prepared {
            let processed = std::mem::take(&mut self.processed_board_calls);
            for rs in &processed {
                self.splice_call_result(ctx.program, ctx.config, rs);
            }
        } else {
            self.process_board_calls_now(ctx);
        }
        self.prepared_board_calls.clear();
        self.processed_board_calls.clear();

        self.process_synchronisers(ctx.program, ctx.config);

        let board = self.board(ctx.program);
        for y in 0..board.height {
            for x in 0..board.width {
                let loc = board.index(x, y);
                if is_empty_cell(self.cur_marbles[loc as usize]) {
                    continue;
                }
                let cell = board.cells[loc as usize];
                self.process_cell(ctx, x, y, cell);
            }
        }

        std::mem::swap(&mut self.cur_marbles, &mut self.next_marbles);
        self.next_marbles.iter_mut().for_each(|m| *m = Marble::EMPTY);

        for value in &mut self.stdout_values {
            if let Some(byte) = value.to_option() {
                ctx.io.write_byte(byte);
                self.stdout_text.push(byte);
                *value = Marble::EMPTY;
            }
        }

        self.tick_number += 1;
        !self.is_finished()
    }

    fn splice_call_result(&mut self, program: &Program, config: &EvalConfig, rs: &RunState) {
        let board = program.board(self.board);
        let loc = board.index(rs.call_x, rs.call_y);
        let callee = program.board(rs.board);
        for i in 0..callee.length as usize {
            if let Some(value) = rs.outputs[i].to_option() {
                self.set_marble(program, config, loc + i as u32, 0, 1, value);
            }
        }
        if let Some(value) = rs.output_left.to_option() {
            self.set_marble(program, config, loc, -1, 0, value);
        }
        if let Some(value) = rs.output_right.to_option() {
            self.set_marble(program, config, loc + callee.length as u32 - 1, 1, 0, value);
        }
        self.marbles_moved = true;
    }

    /// Run every board call on this tick to completion recursively, then
    /// splice its result in immediately — the non-stepwise evaluation path.
    fn process_board_calls_now<IO: IoPort, R: Random>(&mut self, ctx: &mut EvalContext<IO, R>) {
        let board = self.board(ctx.program);
        let board_calls = board.board_calls.clone();
        for board_call in &board_calls {
            let loc = board.index(board_call.x, board_call.y) as usize;
            let callee = ctx.program.board(board_call.board);
            let can_call = (0..callee.length as usize)
                .all(|i| callee.inputs[i].is_empty() || !is_empty_cell(self.cur_marbles[loc + i]));
            if !can_call {
                for i in loc..loc + callee.length as usize {
                    if !is_empty_cell(self.cur_marbles[i]) {
                        let value = self.cur_marbles[i].value();
                        self.set_marble(ctx.program, ctx.config, i as u32, 0, 0, value);
                    }
                }
                continue;
            }
            let mut inputs = [0u8; 36];
            for i in 0..callee.length as usize {
                inputs[i] = self.cur_marbles[loc + i].value();
            }
            let mut rs = RunState::new(ctx.program, board_call, &inputs, self.indents + 1);
            while rs.tick(ctx, false) {}
            rs.finalize(ctx.program);
            self.splice_call_result(ctx.program, ctx.config, &rs);
        }
    }

    fn process_synchronisers(&mut self, program: &Program, config: &EvalConfig) {
        let board = program.board(self.board);
        for i in 0..36 {
            let locs = &board.synchronisers[i];
            if locs.is_empty() {
                continue;
            }
            let all_set = locs.iter().all(|&loc| !is_empty_cell(self.cur_marbles[loc as usize]));
            if all_set {
                let locs = locs.clone();
                for loc in locs {
                    let value = self.cur_marbles[loc as usize].value();
                    self.set_marble(program, config, loc, 0, 1, value);
                    self.marbles_moved = true;
                }
            } else {
                let locs = locs.clone();
                for loc in locs {
                    if !is_empty_cell(self.cur_marbles[loc as usize]) {
                        let value = self.cur_marbles[loc as usize].value();
                        self.set_marble(program, config, loc, 0, 0, value);
                    }
                }
            }
        }
    }

    fn process_cell<IO: IoPort, R: Random>(
        &mut self,
        ctx: &mut EvalContext<IO, R>,
        x: u16,
        y: u16,
        cell: crate::board::Cell,
    ) {
        use crate::board::Cell;
        let board = self.board(ctx.program);
        let loc = board.index(x, y);
        let value = self.cur_marbles[loc as usize].value();

        let (kind, param) = match cell {
            Cell::Device(kind, param) => (kind, param),
            Cell::BoardRef(_) => return,
        };

        match kind {
            DeviceKind::LeftDeflector => {
                self.set_marble(ctx.program, ctx.config, loc, -1, 0, value);
                self.marbles_moved = true;
            }
            DeviceKind::RightDeflector => {
                self.set_marble(ctx.program, ctx.config, loc, 1, 0, value);
                self.marbles_moved = true;
            }
            DeviceKind::Portal => {
                let board = self.board(ctx.program);
                let portals = &board.portals[param as usize];
                let out_loc = if portals.len() <= 1 {
                    loc
                } else {
                    let self_index = portals.iter().position(|&p| p == loc).unwrap_or(0);
                    let mut pick = ctx.rng.random_range((portals.len() - 1) as u8) as usize;
                    if pick >= self_index {
                        pick += 1;
                    }
                    portals[pick]
                };
                self.set_marble(ctx.program, ctx.config, out_loc, 0, 1, value);
                self.marbles_moved = true;
            }
            DeviceKind::Equals => {
                if value == param {
                    self.set_marble(ctx.program, ctx.config, loc, 0, 1, value);
                } else {
                    self.set_marble(ctx.program, ctx.config, loc, 1, 0, value);
                }
                self.marbles_moved = true;
            }
            DeviceKind::GreaterThan => {
                if value > param {
                    self.set_marble(ctx.program, ctx.config, loc, 0, 1, value);
                } else {
                    self.set_marble(ctx.program, ctx.config, loc, 1, 0, value);
                }
                self.marbles_moved = true;
            }
            DeviceKind::LessThan => {
                if value < param {
                    self.set_marble(ctx.program, ctx.config, loc, 0, 1, value);
                } else {
                    self.set_marble(ctx.program, ctx.config, loc, 1, 0, value);
                }
                self.marbles_moved = true;
            }
            DeviceKind::Adder | DeviceKind::Incrementor => {
                self.set_marble(ctx.program, ctx.config, loc, 0, 1, value.wrapping_add(param));
                self.marbles_moved = true;
            }
            DeviceKind::Subtractor | DeviceKind::Decrementor => {
                self.set_marble(ctx.program, ctx.config, loc, 0, 1, value.wrapping_sub(param));
                self.marbles_moved = true;
            }
            DeviceKind::BitChecker => {
                let bit = if value & (1 << param) != 0 { 1 } else { 0 };
                self.set_marble(ctx.program, ctx.config, loc, 0, 1, bit);
                self.marbles_moved = true;
            }
            DeviceKind::LeftBitShifter => {
                self.set_marble(ctx.program, ctx.config, loc, 0, 1, value << 1);
                self.marbles_moved = true;
            }
            DeviceKind::RightBitShifter => {
                self.set_marble(ctx.program, ctx.config, loc, 0, 1, value >> 1);
                self.marbles_moved = true;
            }
            DeviceKind::BinaryNot => {
                self.set_marble(ctx.program, ctx.config, loc, 0, 1, !value);
                self.marbles_moved = true;
            }
            DeviceKind::Stdin => {
                if let Some(byte) = ctx.io.read_byte() {
                    self.set_marble(ctx.program, ctx.config, loc, 0, 1, byte);
                } else {
                    self.set_marble(ctx.program, ctx.config, loc, 1, 0, value);
                }
                self.marbles_moved = true;
            }
            DeviceKind::Output => {
                self.set_marble(ctx.program, ctx.config, loc, 0, 0, value);
            }
            DeviceKind::TrashBin => {
                self.marbles_moved = true;
            }
            DeviceKind::Cloner => {
                self.set_marble(ctx.program, ctx.config, loc, -1, 0, value);
                self.set_marble(ctx.program, ctx.config, loc, 1, 0, value);
                self.marbles_moved = true;
            }
            DeviceKind::Terminator => {
                self.terminator_reached = true;
            }
            DeviceKind::Random => {
                let max = if param == RANDOM_SELF { value } else { param };
                let drawn = ctx.rng.random_inclusive(max);
                self.set_marble(ctx.program, ctx.config, loc, 0, 1, drawn);
                self.marbles_moved = true;
            }
            DeviceKind::Blank | DeviceKind::Input => {
                self.set_marble(ctx.program, ctx.config, loc, 0, 1, value);
                self.marbles_moved = true;
            }
            DeviceKind::Synchroniser => {}
        }
    }

    fn set_marble(
        &mut self,
        program: &Program,
        config: &EvalConfig,
        loc: u32,
        x_disp: i32,
        y_disp: i32,
        value: u8,
    ) {
        let board = self.board(program);
        let (bx, by) = board.coords(loc);
        let mut x = bx as i32;
        let mut x_disp = x_disp;
        let width = board.width as i32;
        let height = board.height as i32;

        if x + x_disp >= width || x + x_disp < 0 {
            if config.cylindrical {
                x = if x + x_disp >= width { 0 } else { width - 1 };
                x_disp = 0;
            } else {
                return;
            }
        }
        let y = by as i32 + y_disp;
        if y < 0 {
            if config.verbose {
                log::warn!("marble displaced above the top of board {}; dropped", self.board);
            }
            return;
        }
        if y >= height {
            self.stdout_values[x as usize] = Marble::occupied(value);
            return;
        }
        x += x_disp;
        let target = board.index(x as u16, y as u16) as usize;
        self.next_marbles[target] = self.next_marbles[target].merge(value);

        match board.cells[target] {
            crate::board::Cell::Device(DeviceKind::Terminator, _) => self.terminator_reached = true,
            crate::board::Cell::Device(DeviceKind::Output, out_param) => match out_param {
                OUTPUT_LEFT => self.left_filled = true,
                OUTPUT_RIGHT => self.right_filled = true,
                n => self.outputs_filled[n as usize] = true,
            },
            _ => {}
        }
    }

    pub fn is_finished(&self) -> bool {
        let all_outputs_filled = self.outputs_filled.iter().all(|&f| f);
        self.terminator_reached
            || !self.marbles_moved
            || (!self.no_output && all_outputs_filled && self.left_filled && self.right_filled)
    }

    /// Aggregate marble values sitting on each output device into this
    /// invocation's result. Multiple output cells sharing the same label
    /// sum their values modulo 256.
    pub fn finalize(&mut self, program: &Program) {
        let board = self.board(program);
        for i in 0..board.length as usize {
            self.outputs[i] = copy_output(&self.cur_marbles, &board.outputs[i]);
        }
        self.output_left = copy_output(&self.cur_marbles, &board.output_left);
        self.output_right = copy_output(&self.cur_marbles, &board.output_right);
    }

    pub fn into_result(self) -> CallResult {
        let mut outputs = [None; 36];
        for (i, slot) in outputs.iter_mut().enumerate() {
            *slot = self.outputs[i].to_option();
        }
        CallResult {
            outputs,
            output_left: self.output_left.to_option(),
            output_right: self.output_right.to_option(),
        }
    }
}

fn copy_output(marbles: &[Marble], locs: &[u32]) -> Marble {
    if locs.is_empty() {
        return Marble::EMPTY;
    }
    let mut total: u8 = 0;
    let mut filled = false;
    for &loc in locs {
        let m = marbles[loc as usize];
        if m.is_occupied() {
            total = total.wrapping_add(m.value());
            filled = true;
        }
    }
    if filled {
        Marble::occupied(total)
    } else {
        Marble::EMPTY
    }
}
