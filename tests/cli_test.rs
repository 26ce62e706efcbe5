use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn missing_arguments_print_usage() {
    let mut cmd = Command::cargo_bin("sharescribe").expect("binary");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn single_argument_prints_usage() {
    let mut cmd = Command::cargo_bin("sharescribe").expect("binary");
    cmd.arg("meeting")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_both_positionals() {
    let mut cmd = Command::cargo_bin("sharescribe").expect("binary");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("FILENAME"))
        .stdout(predicate::str::contains("LINK"));
}
