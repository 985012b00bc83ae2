//! End-to-end tests: feed a script to the shell binary over a pipe and
//! check what comes back on stdout. Stdin is a pipe, so the shell runs
//! non-interactively and prints no prompts.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

fn run_in(dir: &Path, script: &str) -> String {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tsh"))
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn shell");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(script.as_bytes())
        .expect("failed to write script");
    let output = child.wait_with_output().expect("failed to wait for shell");
    assert!(output.status.success(), "shell exited non-zero");
    String::from_utf8(output.stdout).expect("shell output not utf-8")
}

fn run(script: &str) -> String {
    run_in(&std::env::temp_dir(), script)
}

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tsh-test-{}-{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn plain_command_inherits_streams() {
    assert_eq!(run("echo hello\n"), "hello\n");
}

#[test]
fn two_stage_pipeline() {
    assert_eq!(run("echo hello | tr a-z A-Z\n"), "HELLO\n");
}

#[test]
fn three_stage_pipeline_composes_left_to_right() {
    assert_eq!(run("echo abc | tr a-z A-Z | tr A-Z a-z\n"), "abc\n");
}

#[test]
fn unknown_command_reports_and_shell_continues() {
    let output = run("doesnotexist123\necho still here\n");
    assert_eq!(output, "doesnotexist123: command not found\nstill here\n");
}

#[test]
fn cd_then_pwd() {
    assert_eq!(run("cd /tmp\npwd\n"), "/tmp\n");
}

#[test]
fn failed_cd_leaves_directory_unchanged() {
    let dir = scratch_dir("cd-fail");
    let output = run_in(&dir, "cd /nonexistent-xyz\npwd\n");
    let mut lines = output.lines();
    assert!(lines.next().unwrap().starts_with("cd: /nonexistent-xyz"));
    assert_eq!(lines.next().unwrap(), dir.to_str().unwrap());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn redirection_round_trip() {
    let dir = scratch_dir("redirect");
    let output = run_in(&dir, "echo test > out.txt\ncat < out.txt\n");
    assert_eq!(output, "test\n");
    assert_eq!(fs::read(dir.join("out.txt")).unwrap(), b"test\n");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn redirection_round_trip_of_empty_output() {
    let dir = scratch_dir("redirect-empty");
    let output = run_in(&dir, "true > empty.txt\ncat < empty.txt\n");
    assert_eq!(output, "");
    assert_eq!(fs::read(dir.join("empty.txt")).unwrap(), b"");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn output_redirect_truncates_existing_file() {
    let dir = scratch_dir("truncate");
    fs::write(dir.join("out.txt"), "previous longer contents\n").unwrap();
    run_in(&dir, "echo new > out.txt\n");
    assert_eq!(fs::read(dir.join("out.txt")).unwrap(), b"new\n");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unreadable_redirect_target_is_reported_and_shell_continues() {
    let output = run("cat < /nonexistent-xyz/in.txt\necho after\n");
    let mut lines = output.lines();
    assert!(lines.next().unwrap().starts_with("tsh: cannot open /nonexistent-xyz/in.txt"));
    assert_eq!(lines.next().unwrap(), "after");
}

#[test]
fn help_lists_builtins() {
    let output = run("help\n");
    for name in ["help", "exit", "cd", "pwd"] {
        assert!(
            output.lines().any(|l| l.starts_with(&format!("{} - ", name))),
            "help output missing {}: {:?}",
            name,
            output
        );
    }
}

#[test]
fn exit_builtin_stops_reading() {
    assert_eq!(run("echo first\nexit\necho never\n"), "first\n");
}

#[test]
fn not_found_inside_pipeline_leaves_downstream_with_empty_input() {
    // The failed stage still terminates on its own; the next stage runs
    // and sees only the diagnostic line as its input.
    let output = run("doesnotexist123 | tr a-z A-Z\n");
    assert_eq!(output, "DOESNOTEXIST123: COMMAND NOT FOUND\n");
}
