//! End-to-end tests that exercise the compiled `marbelous` binary against a
//! real source file on disk, the way a user actually invokes it.

use std::io::Write;
use std::process::Command;

fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn marbelous() -> Command {
    Command::new(env!("CARGO_BIN_EXE_marbelous"))
}

#[test]
fn exit_code_is_the_low_byte_of_the_first_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "pass.mbl", "}0\n{0");

    let output = marbelous().arg(&path).arg("42").output().unwrap();
    assert!(output.status.success());
    assert_eq!(output.status.code(), Some(42));
}

#[test]
fn missing_source_file_fails_with_a_message_on_stderr() {
    let output = marbelous().arg("/no/such/file/for/this/test.mbl").output().unwrap();
    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}

#[test]
fn non_digit_input_argument_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "pass.mbl", "}0\n{0");

    let output = marbelous().arg(&path).arg("not-a-number").output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn stdout_bytes_are_written_as_the_program_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "deflect.mbl", "41..\n\\\\..\n....");

    let output = marbelous().arg(&path).output().unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout, vec![0x41]);
}
