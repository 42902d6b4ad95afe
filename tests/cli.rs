// ABOUTME: CLI tests for argument handling that fails before any connection.
// ABOUTME: Runs the sshexec binary with assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

fn sshexec() -> Command {
    Command::cargo_bin("sshexec").unwrap()
}

#[test]
fn help_lists_subcommands() {
    sshexec()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("exec").and(predicate::str::contains("shell")));
}

#[test]
fn host_flag_requires_password_env() {
    sshexec()
        .env_remove("SSHEXEC_PASSWORD")
        .args(["--host", "deploy@web1", "exec", "uptime"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SSHEXEC_PASSWORD"));
}

#[test]
fn invalid_success_pattern_is_rejected() {
    sshexec()
        .env("SSHEXEC_PASSWORD", "secret")
        .args([
            "--host",
            "deploy@web1",
            "exec",
            "uptime",
            "--success",
            "{regex}(unclosed",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid success pattern"));
}

#[test]
fn missing_config_file_in_directory() {
    let dir = tempfile::tempdir().unwrap();
    sshexec()
        .current_dir(dir.path())
        .args(["exec", "uptime"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn host_and_config_conflict() {
    sshexec()
        .args(["--host", "web1", "--config", "x.yml", "exec", "uptime"])
        .assert()
        .failure();
}
