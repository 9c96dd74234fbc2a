use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

const LEAVE_ALTERNATE_SCREEN: &str = "\x1b[?1049l";
const SHOW_CURSOR: &str = "\x1b[?25h";

#[test]
fn test_watch_help() {
    cargo_bin_cmd!("watch")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("COMMAND"))
        .stdout(predicate::str::contains("--safe"))
        .stdout(predicate::str::contains("--strict"))
        .stdout(predicate::str::contains("--log-file"));
}

#[test]
fn test_hw_info_help() {
    cargo_bin_cmd!("hw-info")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--interval"))
        .stdout(predicate::str::contains("--safe"));
}

#[test]
fn test_watch_requires_a_command() {
    cargo_bin_cmd!("watch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("COMMAND"));
}

#[test]
fn test_interval_must_be_positive() {
    cargo_bin_cmd!("watch")
        .args(["-n", "0", "date"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive"));
}

#[test]
fn test_strict_launch_failure_restores_the_terminal() {
    cargo_bin_cmd!("watch")
        .args(["--strict", "-n", "0.05", "pdwnutil-test-no-such-program"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(LEAVE_ALTERNATE_SCREEN))
        .stdout(predicate::str::contains(SHOW_CURSOR))
        .stderr(predicate::str::contains(
            "failed to launch `pdwnutil-test-no-such-program`",
        ));
}

#[cfg(unix)]
#[test]
fn test_strict_command_failure_restores_the_terminal() {
    cargo_bin_cmd!("watch")
        .args(["--strict", "-n", "0.05", "false"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(LEAVE_ALTERNATE_SCREEN))
        .stdout(predicate::str::contains(SHOW_CURSOR))
        .stderr(predicate::str::contains("`false` exited with"));
}

#[cfg(unix)]
#[test]
fn test_interrupt_exits_cleanly() {
    use std::{
        process::{Command, Stdio},
        thread,
        time::Duration,
    };

    let child = Command::new(assert_cmd::cargo::cargo_bin!("watch"))
        .args(["-n", "0.05", "echo", "tick"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    thread::sleep(Duration::from_millis(500));

    let killed = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tick"));
    assert_eq!(stdout.matches(LEAVE_ALTERNATE_SCREEN).count(), 1);
    assert_eq!(stdout.matches(SHOW_CURSOR).count(), 1);
    assert!(stdout.ends_with(LEAVE_ALTERNATE_SCREEN));
}
