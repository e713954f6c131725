//! Loader tests that need real files on disk: `#include` resolution and
//! disk-level error reporting, which in-memory `load_source` can't exercise.

use std::io::Write;

use marbelous_core::{load_file, load_source, LoadError};

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn include_resolves_relative_to_the_including_file() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir, "lib.mbl", ":ID\n}0\n{0");
    let root = write_file(&dir, "main.mbl", "#include \"lib.mbl\"\n}0\nID\n{0");

    let program = load_file(&root).unwrap();
    // main's own MB, plus lib's MB (unused but still occupies a slot) and ID.
    assert_eq!(program.boards.len(), 3);
    assert_eq!(program.boards[0].short_name, "MB");
    assert_eq!(program.boards[0].board_calls.len(), 1);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_file("/no/such/path/for/this/test.mbl").unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn unresolved_board_reference_is_a_syntax_error() {
    let err = load_source("bad.mbl", "ZzZz").unwrap_err();
    match err {
        LoadError::Syntax { message, .. } => assert!(message.contains("ZzZz")),
        other => panic!("expected Syntax error, got {other:?}"),
    }
}

#[test]
fn circular_include_is_reported_instead_of_overflowing() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir, "a.mbl", "#include \"b.mbl\"\n:A\n}0\n{0");
    write_file(&dir, "b.mbl", "#include \"a.mbl\"\n:B\n}0\n{0");
    let root = dir.path().join("a.mbl");

    let err = load_file(&root).unwrap_err();
    assert!(matches!(err, LoadError::IncludeCycle { .. }), "expected IncludeCycle, got {err:?}");
}

#[test]
fn included_boards_are_not_visible_through_a_second_level_of_include() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir, "base.mbl", ":Base\n}0\n{0");
    write_file(&dir, "middle.mbl", "#include \"base.mbl\"\n:Middle\n}0\n{0");
    let root = write_file(&dir, "top.mbl", "#include \"middle.mbl\"\nMiMi");

    let program = load_file(&root).unwrap();
    let mb = &program.boards[0];
    // "MiMi" is two back-to-back one-cell calls to `Middle` (its actual_name
    // is "Mi", since its length is 1), not one call to a two-length board.
    assert_eq!(mb.board_calls.len(), 2);
}
