//! CLI integration tests
//!
//! Tests argument handling of the script-mode binary. Flow behavior is
//! covered in `signin_flow.rs`; nothing here launches a browser.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_version_flag() {
    let mut cmd = cargo_bin_cmd!("linuxdo-signin");
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    let mut cmd = cargo_bin_cmd!("linuxdo-signin");
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--account"))
        .stdout(predicate::str::contains("--client-id"))
        .stdout(predicate::str::contains("--auth-state"))
        .stdout(predicate::str::contains("--cache-file"));
}

#[test]
fn test_missing_required_arguments() {
    let mut cmd = cargo_bin_cmd!("linuxdo-signin");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--account"));
}

#[test]
fn test_missing_credentials_reported() {
    let mut cmd = cargo_bin_cmd!("linuxdo-signin");
    cmd.env_remove("LINUXDO_USERNAME")
        .env_remove("LINUXDO_PASSWORD")
        .args(["--account", "alice", "--client-id", "c", "--auth-state", "s"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("LINUXDO_USERNAME"));
}
