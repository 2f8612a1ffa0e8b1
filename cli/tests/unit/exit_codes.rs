//! Exit code selection for failed runs.

use agent_bootstrap::commands::exit_code;
use agent_bootstrap::domain::error::{EXIT_CODES, GENERIC_EXIT_CODE, exit_codes_help};
use agent_bootstrap::domain::{BootstrapError, CommandFailure};
use anyhow::Context as _;

fn failure() -> CommandFailure {
    CommandFailure {
        command: "dpkg -i /tmp/x.deb".to_string(),
        code: Some(2),
        output: "dpkg: error".to_string(),
    }
}

#[test]
fn every_documented_code_is_reachable() {
    let errors = [
        BootstrapError::PackageInstallFailed(failure()),
        BootstrapError::NotRegistered,
        BootstrapError::PackageNotInstalled,
        BootstrapError::NoServiceManager,
        BootstrapError::UnknownDistro,
        BootstrapError::VmtoolsdMissing,
        BootstrapError::OpenStackToken {
            reason: "missing".to_string(),
        },
    ];
    for err in errors {
        let code = err.exit_code();
        assert!(
            EXIT_CODES.iter().any(|(c, _)| *c == code),
            "{code} is not in the exit code table"
        );
    }
}

#[test]
fn context_does_not_hide_the_code() {
    let err = Err::<(), _>(BootstrapError::PackageInstallFailed(failure()))
        .context("installing agent")
        .unwrap_err();
    assert_eq!(exit_code(&err), 100);
}

#[test]
fn unexpected_errors_use_generic_code() {
    assert_eq!(exit_code(&anyhow::anyhow!("disk on fire")), GENERIC_EXIT_CODE);
}

#[test]
fn help_lists_codes_in_order() {
    let help = exit_codes_help();
    let first = help.find("100:").unwrap_or(usize::MAX);
    let last = help.find("138:").unwrap_or(0);
    assert!(first < last);
    assert!(help.contains("137: 'vmtoolsd' is not installed"));
}

#[test]
fn command_failure_is_reported_in_message() {
    let err = BootstrapError::PackageInstallFailed(failure());
    let message = err.to_string();
    assert!(message.contains("dpkg -i /tmp/x.deb"));
    assert!(message.contains("dpkg: error"));
}
