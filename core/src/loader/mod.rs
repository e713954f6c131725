//! Turns Marbelous source text into a [`crate::board::Program`].
//!
//! Loading happens in two passes per file: [`load_boards`] reads every
//! board's grid and leaves board-call cells as placeholders, tracked by a
//! parallel reference mask; [`resolve_board_calls`] then walks that mask to
//! find each call's full text and match it against every board name visible
//! at that point in the file (longest match wins, ties broken by file
//! order). Included files run this same two-pass pipeline to completion,
//! independently, before the file that includes them resolves its own
//! calls — a board call can reach an included board, but an included file
//! never sees names declared only in whoever includes it.

pub mod cell_parse;
pub mod error;
pub mod source_line;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::board::{Board, BoardCall, BoardCallId, BoardId, Cell, Program};
use crate::device::{DeviceKind, OUTPUT_LEFT, OUTPUT_RIGHT};
use cell_parse::{classify_cell, CellClassification};
pub use error::LoadError;
use source_line::{read_lines, SourceLine};

/// Resolves the contents of an `#include` directive, given the label of
/// the file that contains it.
trait Includer {
    fn resolve(&mut self, from_label: &str, include_path: &str) -> Result<(String, String), LoadError>;
}

struct FsIncluder;

impl Includer for FsIncluder {
    fn resolve(&mut self, from_label: &str, include_path: &str) -> Result<(String, String), LoadError> {
        let base = Path::new(from_label).parent().unwrap_or_else(|| Path::new(""));
        let path = base.join(include_path);
        let contents = std::fs::read_to_string(&path).map_err(|source| LoadError::Io { path: path.clone(), source })?;
        Ok((path.to_string_lossy().into_owned(), contents))
    }
}

struct NoIncluder;

impl Includer for NoIncluder {
    fn resolve(&mut self, _from_label: &str, include_path: &str) -> Result<(String, String), LoadError> {
        Err(LoadError::semantic(
            include_path,
            0,
            "#include is not supported when loading from in-memory source text",
        ))
    }
}

/// Load a program from a file on disk. `#include` directives resolve
/// relative to the directory of the file that contains them.
pub fn load_file(path: impl AsRef<Path>) -> Result<Program, LoadError> {
    let path: PathBuf = path.as_ref().to_path_buf();
    let contents = std::fs::read_to_string(&path).map_err(|source| LoadError::Io { path: path.clone(), source })?;
    let label = path.to_string_lossy().into_owned();
    let mut boards = Vec::new();
    let mut in_progress = vec![label.clone()];
    load_boards(&label, &contents, &mut FsIncluder, &mut boards, &mut in_progress)?;
    Ok(Program { boards })
}

/// Load a program from an in-memory string. `name` labels the source in
/// error messages. `#include` directives are rejected — use [`load_file`]
/// for multi-file programs.
pub fn load_source(name: &str, text: &str) -> Result<Program, LoadError> {
    let mut boards = Vec::new();
    let mut in_progress = vec![name.to_string()];
    load_boards(name, text, &mut NoIncluder, &mut boards, &mut in_progress)?;
    Ok(Program { boards })
}

fn names_equivalent(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let (short, long) = if a.chars().count() <= b.chars().count() { (a, b) } else { (b, a) };
    let short_chars: Vec<char> = short.chars().collect();
    let mut si = 0usize;
    for lc in long.chars() {
        if lc != short_chars[si] {
            return false;
        }
        si += 1;
        if si == short_chars.len() {
            si = 0;
        }
    }
    true
}

fn remove_equivalent(map: &mut BTreeMap<String, usize>, name: &str) -> Option<(String, usize)> {
    let key = map.keys().find(|k| names_equivalent(k, name)).cloned()?;
    map.remove(&key).map(|id| (key, id))
}

fn make_full_name(file: &str, line: u32, name: &str) -> String {
    format!("{file}:{line}#{name}")
}

/// Load every board declared in `contents` (and transitively, every
/// `#include`d file), appending them to the shared `boards` vector, and
/// return the names visible to whoever included this file — every board
/// this file declares or re-exports, except the file's own default `MB`
/// board, which is never callable from outside.
fn load_boards<I: Includer>(
    label: &str,
    contents: &str,
    includer: &mut I,
    boards: &mut Vec<Board>,
    in_progress: &mut Vec<String>,
) -> Result<BTreeMap<String, usize>, LoadError> {
    let lines = read_lines(label, contents);

    let mut self_ids: BTreeMap<String, usize> = BTreeMap::new();
    let mut include_ids: BTreeMap<String, usize> = BTreeMap::new();
    let mut board_sources: BTreeMap<usize, Vec<SourceLine>> = BTreeMap::new();
    let mut ref_masks: BTreeMap<usize, Vec<bool>> = BTreeMap::new();

    let mut id = boards.len();
    boards.push(Board::empty("MB".to_string(), make_full_name(label, 0, "MB")));
    let mut cur_lines: Vec<SourceLine> = Vec::new();

    // Only a `:Name` declaration ends the board currently being collected;
    // `#include` just loads more boards in passing and leaves the current
    // board's line collection untouched.
    for line in &lines {
        if line.is_board_decl() {
            let mask = finalize_board(&mut boards[id], &cur_lines)?;
            ref_masks.insert(id, mask);
            board_sources.insert(id, std::mem::take(&mut cur_lines));
            self_ids.insert(boards[id].actual_name.clone(), id);
            remove_equivalent(&mut include_ids, &boards[id].short_name);

            id = boards.len();
            let short_name = line.board_decl_name().to_string();
            if short_name.is_empty() {
                return Err(LoadError::syntax(label, line.line_no, 1, "unnamed board declaration is forbidden"));
            }
            boards.push(Board::empty(short_name.clone(), make_full_name(label, line.line_no, &short_name)));
        } else if line.is_include() {
            let path = line.include_path();
            let (inc_label, inc_contents) = includer.resolve(label, path)?;
            if in_progress.contains(&inc_label) {
                return Err(LoadError::IncludeCycle { path: inc_label });
            }
            in_progress.push(inc_label.clone());
            let temp_lookup = load_boards(&inc_label, &inc_contents, includer, boards, in_progress);
            in_progress.pop();
            let temp_lookup = temp_lookup?;
            for (name, board_id) in temp_lookup {
                if names_equivalent("MB", &name) {
                    continue;
                }
                if let Some((_, removed_id)) = remove_equivalent(&mut self_ids, &name) {
                    board_sources.remove(&removed_id);
                    ref_masks.remove(&removed_id);
                }
                include_ids.insert(name, board_id);
            }
        } else if !line.is_blank() {
            cur_lines.push(line.clone());
        }
    }

    let mask = finalize_board(&mut boards[id], &cur_lines)?;
    ref_masks.insert(id, mask);
    board_sources.insert(id, cur_lines);
    self_ids.insert(boards[id].actual_name.clone(), id);
    remove_equivalent(&mut include_ids, &boards[id].short_name);

    resolve_board_calls(boards, &board_sources, &ref_masks, &self_ids, &include_ids)?;

    Ok(self_ids)
}

/// Measure a board's grid, parse every cell, and fill in everything except
/// board-call cells (left as blanks, with their positions recorded in the
/// returned mask for [`resolve_board_calls`] to pick up).
fn finalize_board(board: &mut Board, lines: &[SourceLine]) -> Result<Vec<bool>, LoadError> {
    board.height = lines.len() as u16;
    let mut width: u16 = 0;
    for line in lines {
        let content = line.stripped();
        let len = content.chars().count();
        if !line.is_spaced() {
            if len % 2 != 0 {
                return Err(LoadError::syntax(
                    &*line.file,
                    line.line_no,
                    len.saturating_sub(1) as u32,
                    "unexpected character: cell rows must have an even number of characters",
                ));
            }
            width = width.max((len / 2) as u16);
        } else {
            for (i, c) in content.chars().enumerate() {
                if i % 3 == 2 {
                    if c != ' ' {
                        return Err(LoadError::syntax(&*line.file, line.line_no, i as u32, "expecting space"));
                    }
                } else if c == ' ' {
                    log::warn!("{}:{}: unexpected space at column {}", line.file, line.line_no, i);
                }
            }
            width = width.max(((len + 2) / 3) as u16);
        }
    }

    let cell_count = width as usize * board.height as usize;
    board.cells = vec![Cell::Device(DeviceKind::Blank, 0); cell_count];
    board.width = width;
    let mut mask = vec![false; cell_count];

    for (y, line) in lines.iter().enumerate() {
        let content = line.stripped();
        let len = content.chars().count() as i32;
        let spaced = line.is_spaced();
        let mut x: i32 = 0;
        loop {
            let within = if spaced { 3 * x - 1 < len } else { 2 * x < len };
            if !within {
                break;
            }
            let pos = width as usize * y + x as usize;
            let text = line.cell_text(x as u16);
            apply_cell(board, &mut mask, pos, text);
            x += 1;
        }
    }

    board.length = board.compute_length();
    board.actual_name = Board::compute_actual_name(&board.short_name, board.length);

    Ok(mask)
}

fn apply_cell(board: &mut Board, mask: &mut [bool], pos: usize, text: &str) {
    match classify_cell(text) {
        CellClassification::InitialMarble(value) => {
            board.initial_marbles.push((pos as u32, value));
        }
        CellClassification::Blank => {}
        CellClassification::BoardRef => {
            mask[pos] = true;
        }
        CellClassification::Device(kind, value) => {
            match kind {
                DeviceKind::Input => board.inputs[value as usize].push(pos as u32),
                DeviceKind::Output => match value {
                    OUTPUT_LEFT => board.output_left.push(pos as u32),
                    OUTPUT_RIGHT => board.output_right.push(pos as u32),
                    n => board.outputs[n as usize].push(pos as u32),
                },
                DeviceKind::Synchroniser => board.synchronisers[value as usize].push(pos as u32),
                DeviceKind::Portal => board.portals[value as usize].push(pos as u32),
                _ => {}
            }
            board.cells[pos] = Cell::Device(kind, value);
        }
    }
}

/// For each board this file declares, scan its grid for contiguous runs of
/// board-ref cells, match each run's text against every name visible at
/// that point (this file's own boards plus whatever its `#include`s
/// exposed), and wire up the resulting [`BoardCall`]s.
fn resolve_board_calls(
    boards: &mut [Board],
    board_sources: &BTreeMap<usize, Vec<SourceLine>>,
    ref_masks: &BTreeMap<usize, Vec<bool>>,
    self_ids: &BTreeMap<String, usize>,
    include_ids: &BTreeMap<String, usize>,
) -> Result<(), LoadError> {
    for (_, &board_id) in self_ids {
        let source = &board_sources[&board_id];
        let mask = &ref_masks[&board_id];
        let width = boards[board_id].width;
        let height = boards[board_id].height;

        let mut calls: Vec<BoardCall> = Vec::new();
        let mut assignments: Vec<(usize, usize)> = Vec::new();

        for (y, line) in source.iter().enumerate().take(height as usize) {
            let y = y as u16;
            let mut x: u16 = 0;
            let mut start: Option<u16> = None;
            let mut call_text = String::new();

            while x <= width {
                let pos = width as usize * y as usize + x as usize;
                let is_ref = x != width && mask[pos];

                if (x == width || !is_ref) && start.is_some() {
                    let mut run_start = start.unwrap();
                    while !call_text.is_empty() {
                        match best_match(&call_text, self_ids, include_ids) {
                            Some((name_len, callee_id)) => {
                                let cell_span = (name_len / 2) as u16;
                                let call_index = calls.len();
                                calls.push(BoardCall { board: BoardId(callee_id), x: run_start, y });
                                for i in 0..cell_span {
                                    let cell_pos = width as usize * y as usize + (run_start + i) as usize;
                                    assignments.push((cell_pos, call_index));
                                }
                                call_text.drain(..name_len);
                                run_start += cell_span;
                            }
                            None => {
                                let column = if line.is_spaced() { 3 * run_start } else { 2 * run_start };
                                return Err(LoadError::syntax(
                                    &*line.file,
                                    line.line_no,
                                    column as u32,
                                    format!("no board found matching `{call_text}`"),
                                ));
                            }
                        }
                    }
                    start = None;
                } else if is_ref {
                    if start.is_none() {
                        start = Some(x);
                    }
                    call_text.push_str(line.cell_text(x));
                }
                x += 1;
            }
        }

        boards[board_id].board_calls = calls;
        for (pos, call_index) in assignments {
            boards[board_id].cells[pos] = Cell::BoardRef(BoardCallId(call_index));
        }
    }
    Ok(())
}

/// The longest name in either pool that `call_text` starts with. Ties
/// (equal-length matches) keep whichever the pools visit first — `self_ids`
/// before `include_ids`, each in lexicographic key order — mirroring a
/// file's own declarations taking priority over imported ones.
fn best_match(
    call_text: &str,
    self_ids: &BTreeMap<String, usize>,
    include_ids: &BTreeMap<String, usize>,
) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for (name, &id) in self_ids.iter().chain(include_ids.iter()) {
        if name.len() > best.map_or(0, |(len, _)| len) && call_text.starts_with(name.as_str()) {
            best = Some((name.len(), id));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_mb_board_with_no_declarations() {
        let program = load_source("t.mbl", "++ 00\n.. //").unwrap();
        assert_eq!(program.boards.len(), 1);
        assert_eq!(program.boards[0].short_name, "MB");
        assert_eq!(program.boards[0].width, 2);
        assert_eq!(program.boards[0].height, 2);
    }

    #[test]
    fn named_board_declaration_starts_a_new_board() {
        let program = load_source("t.mbl", ":Adder\n+0");
        let program = program.unwrap();
        assert_eq!(program.boards.len(), 2);
        assert_eq!(program.boards[0].short_name, "MB");
        assert_eq!(program.boards[1].short_name, "Adder");
    }

    #[test]
    fn unnamed_board_declaration_is_an_error() {
        let err = load_source("t.mbl", ":\n+0").unwrap_err();
        assert!(matches!(err, LoadError::Syntax { .. }));
    }

    #[test]
    fn odd_length_unspaced_row_is_an_error() {
        let err = load_source("t.mbl", "+").unwrap_err();
        assert!(matches!(err, LoadError::Syntax { .. }));
    }

    #[test]
    fn board_call_resolves_to_declared_board() {
        // MB's content must come before the `:Ad` declaration — a board's
        // body runs until the next `:Name` line (or end of file), so
        // anything after `:Ad` belongs to `Ad`, not to the default board.
        let src = "AdAd\n\n:Ad\n}0}1";
        let program = load_source("t.mbl", src).unwrap();
        let mb = &program.boards[0];
        // `Ad` declares inputs 0 and 1, so its length is 2 and its
        // `actual_name` ("AdAd") matches the whole call in one run.
        assert_eq!(mb.board_calls.len(), 1);
        assert!(matches!(mb.cells[0], Cell::BoardRef(_)));
        assert!(matches!(mb.cells[1], Cell::BoardRef(_)));
    }

    #[test]
    fn unmatched_board_ref_text_is_an_error() {
        let err = load_source("t.mbl", "ZzZz").unwrap_err();
        assert!(matches!(err, LoadError::Syntax { .. }));
    }

    #[test]
    fn names_equivalent_detects_cyclic_repetition() {
        assert!(names_equivalent("AdAd", "Ad"));
        assert!(names_equivalent("Ad", "AdAdAd"));
        assert!(!names_equivalent("Ad", "Bd"));
    }
}
