//! End-to-end smoke test driving the compiled binary directly with
//! `std::process::Command` (no `assert_cmd`), matching the teacher's
//! preference for `tempfile` over heavier test harnesses.

use std::{
    io::Write,
    process::{Command, Stdio},
};

fn run(args: &[&str], stdin: &str) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_parinfer"))
        .args(args)
        .current_dir(std::env::temp_dir())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn parinfer binary");

    child
        .stdin
        .take()
        .expect("piped stdin")
        .write_all(stdin.as_bytes())
        .expect("writing to stdin");

    let out = child.wait_with_output().expect("waiting for parinfer");
    (
        String::from_utf8(out.stdout).expect("stdout is utf8"),
        String::from_utf8(out.stderr).expect("stderr is utf8"),
        out.status.code().unwrap_or(-1),
    )
}

#[test]
fn smart_mode_via_stdin_balances_an_unclosed_list() {
    let (stdout, _stderr, code) = run(&["--mode", "smart"], "(foo bar");
    assert_eq!(code, 0);
    assert_eq!(stdout, "(foo bar)");
}

#[test]
fn paren_mode_via_stdin_indents_to_sit_inside_the_closer() {
    let (stdout, _stderr, code) = run(&["--mode", "paren"], "(foo\nbar)");
    assert_eq!(code, 0);
    assert_eq!(stdout, "(foo\n bar)");
}

#[test]
fn unclosed_quote_in_paren_mode_exits_nonzero_with_a_message() {
    let (_stdout, stderr, code) = run(&["--mode", "paren"], "(foo\"");
    assert_eq!(code, 1);
    assert!(stderr.contains("unclosed-quote"), "stderr was: {stderr}");
}

#[test]
fn json_flag_emits_a_full_output_document() {
    let (stdout, _stderr, code) = run(&["--mode", "indent", "--json"], "(foo bar");
    assert_eq!(code, 0);
    assert!(stdout.contains("\"success\""));
    assert!(stdout.contains("\"text\""));
}

#[test]
fn a_file_argument_reads_source_from_disk_instead_of_stdin() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file_path = dir.path().join("input.clj");
    std::fs::write(&file_path, "(foo bar").unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_parinfer"))
        .args(["--mode", "indent", file_path.to_str().unwrap()])
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn parinfer binary");
    let out = child.wait_with_output().expect("waiting for parinfer");
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "(foo bar)");
}
