//! One physical line of source, kept alongside its file and line number so
//! later stages can still point an error back at an exact position.
//!
//! A trailing `#`-led comment is stripped for board content, but `#include`
//! directives and `:BoardName` declarations are recognized from the raw,
//! unstripped line — stripping first would erase the `#include` marker.

use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct SourceLine {
    pub file: Rc<str>,
    pub line_no: u32,
    raw: String,
}

const INCLUDE_PREFIX: &str = "#include";

impl SourceLine {
    pub fn new(file: Rc<str>, line_no: u32, raw: String) -> SourceLine {
        SourceLine { file, line_no, raw }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_include(&self) -> bool {
        self.raw.starts_with(INCLUDE_PREFIX)
    }

    /// The path text of an `#include "path"` directive, trimmed of
    /// surrounding whitespace and one layer of surrounding quotes if present.
    pub fn include_path(&self) -> &str {
        let rest = self.raw[INCLUDE_PREFIX.len()..].trim();
        rest.trim_matches('"')
    }

    pub fn is_board_decl(&self) -> bool {
        self.raw.starts_with(':')
    }

    /// The name following a `:` board declaration, with no trimming of
    /// internal content (a declaration is never a spaced-format grid line).
    pub fn board_decl_name(&self) -> &str {
        self.raw[1..].trim_end()
    }

    /// The line with a trailing `#`-led comment removed and trailing
    /// whitespace trimmed — the text that is actually grid content.
    pub fn stripped(&self) -> &str {
        let content = match self.raw.find('#') {
            Some(idx) => &self.raw[..idx],
            None => &self.raw[..],
        };
        content.trim_end()
    }

    pub fn is_blank(&self) -> bool {
        self.stripped().trim_start().is_empty()
    }

    /// "Spaced" cell format: exactly one space between two-character cells,
    /// so the line is `CC CC CC`. Detected on content, not raw text — a
    /// line with no isolated single space (and no stray double space) is
    /// unspaced.
    pub fn is_spaced(&self) -> bool {
        let content = self.stripped();
        !content.contains("  ") && content.contains(' ')
    }

    /// Two-character text for grid column `cell`, read from `stripped()`.
    pub fn cell_text(&self, cell: u16) -> &str {
        let content = self.stripped();
        let start = if self.is_spaced() { 3 * cell as usize } else { 2 * cell as usize };
        let end = (start + 2).min(content.len());
        if start >= content.len() {
            ""
        } else {
            &content[start..end]
        }
    }
}

/// Split `contents` into [`SourceLine`]s tagged with `file`. Unlike
/// [`SourceLine::is_blank`], this keeps every physical line (including
/// blank ones) — board-assembly is responsible for filtering, since
/// `#include` lines must never be dropped even though they strip to
/// nothing.
pub fn read_lines(file: &str, contents: &str) -> Vec<SourceLine> {
    let file: Rc<str> = Rc::from(file);
    contents
        .lines()
        .enumerate()
        .map(|(idx, raw)| SourceLine::new(file.clone(), idx as u32 + 1, raw.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_is_stripped_and_right_trimmed() {
        let lines = read_lines("b.mbl", "++ 00  # trailing comment");
        assert_eq!(lines[0].stripped(), "++ 00");
    }

    #[test]
    fn include_directive_is_recognized_from_raw_text() {
        let lines = read_lines("b.mbl", "#include \"other.mbl\"");
        assert!(lines[0].is_include());
        assert_eq!(lines[0].include_path(), "other.mbl");
        // stripped() would be empty since '#' truncates at position 0 -
        // callers must check is_include() before relying on stripped().
        assert_eq!(lines[0].stripped(), "");
    }

    #[test]
    fn board_declaration_name() {
        let lines = read_lines("b.mbl", ":Adder");
        assert!(lines[0].is_board_decl());
        assert_eq!(lines[0].board_decl_name(), "Adder");
    }

    #[test]
    fn spaced_format_detection() {
        assert!(read_lines("b.mbl", "++ 00 //")[0].is_spaced());
        assert!(!read_lines("b.mbl", "++00//")[0].is_spaced());
        assert!(!read_lines("b.mbl", "++  00")[0].is_spaced());
    }

    #[test]
    fn cell_text_reads_unspaced_and_spaced() {
        let unspaced = read_lines("b.mbl", "++//..")[0].clone();
        assert_eq!(unspaced.cell_text(0), "++");
        assert_eq!(unspaced.cell_text(1), "//");
        assert_eq!(unspaced.cell_text(2), "..");

        let spaced = read_lines("b.mbl", "++ // ..")[0].clone();
        assert_eq!(spaced.cell_text(0), "++");
        assert_eq!(spaced.cell_text(1), "//");
        assert_eq!(spaced.cell_text(2), "..");
    }
}
