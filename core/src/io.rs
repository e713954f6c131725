//! Capability traits the evaluator calls into instead of touching stdio or
//! an RNG directly, so a [`crate::run_state::RunState`] stays deterministic
//! and host-agnostic under test.

/// Byte-oriented input/output, as consumed by the `Stdin` device and
/// produced by `OUTPUT_LEFT`/`OUTPUT_RIGHT` output sentinels.
pub trait IoPort {
    /// Read one byte, or `None` at end of input. Called at most once per
    /// `Stdin` device per tick.
    fn read_byte(&mut self) -> Option<u8>;

    /// Flush one byte to the board's stdout stream.
    fn write_byte(&mut self, value: u8);
}

/// An `IoPort` that reads nothing and discards everything written — useful
/// for evaluating a sub-board in isolation, or for tests that only care
/// about a board's numbered outputs.
#[derive(Default)]
pub struct NullIoPort;

impl IoPort for NullIoPort {
    fn read_byte(&mut self) -> Option<u8> {
        None
    }

    fn write_byte(&mut self, _value: u8) {}
}

/// An `IoPort` backed by in-memory buffers, for tests that want to assert
/// on exactly what a board printed.
#[derive(Default)]
pub struct BufferIoPort {
    input: std::collections::VecDeque<u8>,
    pub output: Vec<u8>,
}

impl BufferIoPort {
    pub fn with_input(bytes: impl IntoIterator<Item = u8>) -> Self {
        BufferIoPort {
            input: bytes.into_iter().collect(),
            output: Vec::new(),
        }
    }
}

impl IoPort for BufferIoPort {
    fn read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn write_byte(&mut self, value: u8) {
        self.output.push(value);
    }
}
