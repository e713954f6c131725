//! The closed set of cell kinds a [`crate::board::Cell::Device`] can name,
//! plus the glyph table used by the loader and by any visualiser built on
//! top of this crate.

/// Sentinel values for a device's `value` parameter that mean something
/// other than "base-36 digit".
pub const OUTPUT_LEFT: u8 = 255;
pub const OUTPUT_RIGHT: u8 = 254;
pub const RANDOM_SELF: u8 = 253;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum DeviceKind {
    LeftDeflector,
    RightDeflector,
    Portal,
    Synchroniser,
    Equals,
    GreaterThan,
    LessThan,
    Adder,
    Subtractor,
    Incrementor,
    Decrementor,
    BitChecker,
    LeftBitShifter,
    RightBitShifter,
    BinaryNot,
    Stdin,
    Input,
    Output,
    TrashBin,
    Cloner,
    Terminator,
    Random,
    Blank,
}

impl DeviceKind {
    /// The two-character glyph a loader or visualiser would print back for
    /// this `(kind, value)` pair. Round-trips with [`crate::loader::cell_parse::parse_cell`]
    /// for every glyph except a board reference, which is spelled by the
    /// callee's own `actual_name`, not by this table.
    pub fn glyph(self, value: u8) -> [char; 2] {
        match self {
            DeviceKind::LeftDeflector => ['/', '/'],
            DeviceKind::RightDeflector => ['\\', '\\'],
            DeviceKind::Portal => ['@', base36_digit(value)],
            DeviceKind::Synchroniser => ['&', base36_digit(value)],
            DeviceKind::Equals => ['=', base36_digit(value)],
            DeviceKind::GreaterThan => ['>', base36_digit(value)],
            DeviceKind::LessThan => ['<', base36_digit(value)],
            DeviceKind::Adder => ['+', base36_digit(value)],
            DeviceKind::Subtractor => ['-', base36_digit(value)],
            DeviceKind::Incrementor => ['+', '+'],
            DeviceKind::Decrementor => ['-', '-'],
            DeviceKind::BitChecker => ['^', base36_digit(value)],
            DeviceKind::LeftBitShifter => ['<', '<'],
            DeviceKind::RightBitShifter => ['>', '>'],
            DeviceKind::BinaryNot => ['~', '~'],
            DeviceKind::Stdin => [']', ']'],
            DeviceKind::Input => ['}', base36_digit(value)],
            DeviceKind::Output => match value {
                OUTPUT_LEFT => ['{', '<'],
                OUTPUT_RIGHT => ['{', '>'],
                k => ['{', base36_digit(k)],
            },
            DeviceKind::TrashBin => ['\\', '/'],
            DeviceKind::Cloner => ['/', '\\'],
            DeviceKind::Terminator => ['!', '!'],
            DeviceKind::Random => match value {
                RANDOM_SELF => ['?', '?'],
                p => ['?', base36_digit(p)],
            },
            DeviceKind::Blank => ['.', '.'],
        }
    }
}

/// Render a base-36 digit (0-9, A-Z) the way the source grammar spells a
/// device's label or parameter.
pub fn base36_digit(value: u8) -> char {
    match value {
        0..=9 => (b'0' + value) as char,
        10..=35 => (b'A' + (value - 10)) as char,
        // Out of range for any real device; `#` marks a malformed glyph
        // (only reachable when printing a cell that could not have been
        // parsed from valid source text).
        _ => '#',
    }
}

/// Parse a base-36 digit character back to its 0-35 value.
pub fn parse_base36_digit(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        'A'..='Z' => Some(c as u8 - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_round_trips() {
        for v in 0..36u8 {
            let c = base36_digit(v);
            assert_eq!(parse_base36_digit(c), Some(v));
        }
    }

    #[test]
    fn output_glyphs_use_directional_sentinels() {
        assert_eq!(DeviceKind::Output.glyph(OUTPUT_LEFT), ['{', '<']);
        assert_eq!(DeviceKind::Output.glyph(OUTPUT_RIGHT), ['{', '>']);
        assert_eq!(DeviceKind::Output.glyph(5), ['{', '5']);
    }

    #[test]
    fn random_self_glyph_is_double_question_mark() {
        assert_eq!(DeviceKind::Random.glyph(RANDOM_SELF), ['?', '?']);
        assert_eq!(DeviceKind::Random.glyph(9), ['?', '9']);
    }
}
