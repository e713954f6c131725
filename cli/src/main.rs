//! Command-line front end for `marbelous-core`: load a source file, supply
//! its declared inputs from the remaining positionals, run it to
//! completion, and exit with the low byte of `outputs[0]`.

mod io;
mod random;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use marbelous_core::{load_file, run_entry_with, EvalConfig};

use crate::io::StdIoPort;
use crate::random::ThreadRandom;

/// Run a Marbelous program.
#[derive(Parser, Debug)]
#[command(name = "marbelous", version, about = "Run a Marbelous program")]
struct Args {
    /// Source file to load.
    source: PathBuf,

    /// One decimal byte per declared input label, in ascending order.
    inputs: Vec<String>,

    /// Increase log verbosity (structural warnings such as MarbleAboveTop).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Wrap marbles around the board's edges instead of dropping them.
    #[arg(long, conflicts_with = "disable_cylindrical")]
    enable_cylindrical: bool,

    /// Explicitly disable wraparound (the default).
    #[arg(long)]
    disable_cylindrical: bool,
}

/// Parse one positional input argument into a byte, mirroring the
/// original's two distinct diagnostics: a non-digit character is an error,
/// while an in-range-but-too-large value is only a warning, reduced mod 256.
fn parse_input(text: &str) -> Result<u8, String> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("input `{text}` is not a decimal number"));
    }
    let value: u32 = text.parse().map_err(|_| format!("input `{text}` is out of range"))?;
    if value > 255 {
        log::warn!("input `{text}` exceeds 255; reducing mod 256");
    }
    Ok((value % 256) as u8)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new().filter_level(log_level).init();

    let program = match load_file(&args.source) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let expected = program.board(program.entry()).declared_input_count() as usize;
    if args.inputs.len() != expected {
        eprintln!("Expected {expected} inputs, got {}", args.inputs.len());
        return ExitCode::FAILURE;
    }

    let mut inputs = [0u8; 36];
    for (i, text) in args.inputs.iter().enumerate().take(36) {
        match parse_input(text) {
            Ok(value) => inputs[i] = value,
            Err(message) => {
                eprintln!("{message}");
                return ExitCode::FAILURE;
            }
        }
    }

    let config = EvalConfig::new(args.enable_cylindrical && !args.disable_cylindrical, args.verbose > 0);

    let mut stdio = StdIoPort::new();
    let mut rng = ThreadRandom::new();
    let outcome = run_entry_with(&program, &inputs, &config, &mut stdio, &mut rng);

    let exit_code = outcome.result.outputs[0].unwrap_or(0);
    ExitCode::from(exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_input_accepts_decimal_digits() {
        assert_eq!(parse_input("42"), Ok(42));
        assert_eq!(parse_input("0"), Ok(0));
    }

    #[test]
    fn parse_input_rejects_non_digits() {
        assert!(parse_input("4a").is_err());
        assert!(parse_input("").is_err());
        assert!(parse_input("-1").is_err());
    }

    #[test]
    fn parse_input_wraps_values_above_255() {
        assert_eq!(parse_input("256"), Ok(0));
        assert_eq!(parse_input("300"), Ok(44));
    }
}
