//! Terminal-backed `IoPort`: stdin polled non-blockingly one byte at a time,
//! stdout written and flushed immediately so interactive programs see output
//! promptly.
//!
//! A `Stdin` device must be able to take its "nothing available" branch
//! without stalling the whole evaluator, so reading can't call a blocking
//! `Read::read` directly on the calling thread. A background thread owns the
//! actual blocking read loop and forwards each byte over a channel;
//! `read_byte` only ever does a non-blocking `try_recv`, mirroring the
//! original's `poll()`-before-`getchar()` pair in `io_functions.cpp`.

use std::io::Write;
use std::sync::mpsc::{self, Receiver};

use marbelous_core::IoPort;

pub struct StdIoPort {
    stdin_rx: Receiver<u8>,
    stdout: std::io::Stdout,
}

impl StdIoPort {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            use std::io::Read;
            let stdin = std::io::stdin();
            let mut locked = stdin.lock();
            let mut byte = [0u8; 1];
            loop {
                match locked.read(&mut byte) {
                    Ok(1) => {
                        if tx.send(byte[0]).is_err() {
                            break;
                        }
                    }
                    _ => break,
                }
            }
        });
        StdIoPort {
            stdin_rx: rx,
            stdout: std::io::stdout(),
        }
    }
}

impl Default for StdIoPort {
    fn default() -> Self {
        StdIoPort::new()
    }
}

impl IoPort for StdIoPort {
    fn read_byte(&mut self) -> Option<u8> {
        self.stdin_rx.try_recv().ok()
    }

    fn write_byte(&mut self, value: u8) {
        let _ = self.stdout.write_all(&[value]);
        let _ = self.stdout.flush();
    }
}
