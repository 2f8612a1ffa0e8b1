//! Integration tests for argument parsing, help and usage errors.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn bootstrap() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("agent-bootstrap"));
    cmd.env("NO_COLOR", "1");
    cmd.env(
        "AGENT_BOOTSTRAP_LOG_FILE",
        std::env::temp_dir().join("agent-bootstrap-cli-tests.log"),
    );
    for var in [
        "AGENT_BOOTSTRAP_PLATFORM",
        "AGENT_BOOTSTRAP_HTTP_PROXY",
        "AGENT_BOOTSTRAP_LOG_LEVEL",
        "AGENT_BOOTSTRAP_RESULT_FORMAT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// --- Help and version tests ---

#[test]
fn test_no_args_shows_help_and_exits_two() {
    bootstrap()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Install, register and verify"));
}

#[test]
fn test_help_lists_subcommands() {
    bootstrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("uninstall"))
        .stdout(predicate::str::contains("reregister"));
}

#[test]
fn test_help_lists_exit_codes() {
    bootstrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes:"))
        .stdout(predicate::str::contains("100: Failed to install package"))
        .stdout(predicate::str::contains("138: Failed to get token from OpenStack vendordata"));
}

#[test]
fn test_version_flag_shows_name() {
    bootstrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("agent-bootstrap "));
}

#[test]
fn test_install_help_lists_platforms() {
    bootstrap()
        .args(["install", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gcp"))
        .stdout(predicate::str::contains("openstack_flex"))
        .stdout(predicate::str::contains("--installer-download-region"));
}

// --- Usage errors ---

#[test]
fn test_install_requires_platform() {
    bootstrap()
        .arg("install")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--platform"));
}

#[test]
fn test_unknown_platform_is_rejected() {
    bootstrap()
        .args(["install", "--platform", "aws"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value 'aws'"));
}

#[test]
fn test_unknown_platform_from_env_is_rejected() {
    bootstrap()
        .arg("reregister")
        .env("AGENT_BOOTSTRAP_PLATFORM", "bogus")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("bogus"));
}

#[test]
fn test_invalid_proxy_is_rejected() {
    bootstrap()
        .args(["install", "-p", "gcp", "--http-proxy", "proxy.local:3128"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid proxy URI"));
}

#[test]
fn test_invalid_log_level_is_rejected() {
    bootstrap()
        .args(["uninstall", "--log-level", "LOUD"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("LOUD"));
}

#[test]
fn test_uninstall_takes_no_platform() {
    bootstrap()
        .args(["uninstall", "--platform", "gcp"])
        .assert()
        .code(2);
}
