//! Parses a two-character cell chunk into a device, a blank, or an initial
//! marble literal. Board-call references are not resolved here: an
//! unrecognized glyph falls through to [`CellClassification::BoardRef`] and
//! is stitched together with its neighbors and matched against declared
//! board names by `super::resolve`.

use crate::device::{parse_base36_digit, DeviceKind, OUTPUT_LEFT, OUTPUT_RIGHT, RANDOM_SELF};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellClassification {
    InitialMarble(u8),
    Blank,
    Device(DeviceKind, u8),
    BoardRef,
}

fn is_upper_hex(c: char) -> bool {
    matches!(c, '0'..='9' | 'A'..='F')
}

/// Classify a two-character cell chunk. `text` must be exactly two
/// characters (a malformed shorter chunk classifies as a board reference,
/// which later fails to match any declared name and reports a clean error).
pub fn classify_cell(text: &str) -> CellClassification {
    let mut chars = text.chars();
    let (Some(c0), Some(c1), None) = (chars.next(), chars.next(), chars.next()) else {
        return CellClassification::BoardRef;
    };
    if is_upper_hex(c0) && is_upper_hex(c1) {
        let value = u8::from_str_radix(text, 16).expect("validated hex digits");
        return CellClassification::InitialMarble(value);
    }
    if text == ".." || text == "  " {
        return CellClassification::Blank;
    }
    match parse_device_glyph([c0, c1]) {
        Some((kind, value)) => CellClassification::Device(kind, value),
        None => CellClassification::BoardRef,
    }
}

fn parse_device_glyph(pair: [char; 2]) -> Option<(DeviceKind, u8)> {
    use DeviceKind::*;
    match pair[0] {
        '/' => match pair[1] {
            '/' => Some((LeftDeflector, 0)),
            '\\' => Some((Cloner, 0)),
            _ => None,
        },
        '\\' => match pair[1] {
            '\\' => Some((RightDeflector, 0)),
            '/' => Some((TrashBin, 0)),
            _ => None,
        },
        '@' => parse_base36_digit(pair[1]).map(|d| (Portal, d)),
        '&' => parse_base36_digit(pair[1]).map(|d| (Synchroniser, d)),
        '=' => parse_base36_digit(pair[1]).map(|d| (Equals, d)),
        '>' => match pair[1] {
            '>' => Some((RightBitShifter, 0)),
            c => parse_base36_digit(c).map(|d| (GreaterThan, d)),
        },
        '<' => match pair[1] {
            '<' => Some((LeftBitShifter, 0)),
            c => parse_base36_digit(c).map(|d| (LessThan, d)),
        },
        '+' => match pair[1] {
            '+' => Some((Incrementor, 1)),
            c => parse_base36_digit(c).map(|d| (Adder, d)),
        },
        '-' => match pair[1] {
            '-' => Some((Decrementor, 1)),
            c => parse_base36_digit(c).map(|d| (Subtractor, d)),
        },
        // BIT_CHECKER only ever reads bits 0-7 of a byte; a digit outside
        // that range falls through to a board-call reference instead.
        '^' => match pair[1] {
            '0'..='7' => parse_base36_digit(pair[1]).map(|d| (BitChecker, d)),
            _ => None,
        },
        '~' if pair[1] == '~' => Some((BinaryNot, 0)),
        ']' if pair[1] == ']' => Some((Stdin, 0)),
        '}' => parse_base36_digit(pair[1]).map(|d| (Input, d)),
        '{' => match pair[1] {
            '<' => Some((Output, OUTPUT_LEFT)),
            '>' => Some((Output, OUTPUT_RIGHT)),
            c => parse_base36_digit(c).map(|d| (Output, d)),
        },
        '!' if pair[1] == '!' => Some((Terminator, 0)),
        '?' => match pair[1] {
            '?' => Some((Random, RANDOM_SELF)),
            c => parse_base36_digit(c).map(|d| (Random, d)),
        },
        '.' if pair[1] == '.' => Some((Blank, 0)),
        _ => None,
    }
}
