//! Command implementations
//!
//! Handlers translate parsed arguments into workflow inputs and map
//! connection failures to the command-specific exit code.

pub mod install;
pub mod reregister;
pub mod uninstall;

use anyhow::Result;

use crate::application::ports::CommandRunner;
use crate::domain::error::GENERIC_EXIT_CODE;
use crate::domain::{BootstrapError, PlatformName, TransportError, is_truthy};

/// Set to a truthy value to run without root (test harnesses).
pub const SKIP_ROOT_CHECK_ENV: &str = "AGENT_BOOTSTRAP_SKIP_ROOT_CHECK";

/// Whether [`SKIP_ROOT_CHECK_ENV`] asks to bypass the root check.
#[must_use]
pub fn root_check_skipped() -> bool {
    skip_requested(std::env::var(SKIP_ROOT_CHECK_ENV).ok().as_deref())
}

fn skip_requested(value: Option<&str>) -> bool {
    value.is_some_and(|v| is_truthy(v.trim()))
}

/// Refuse to run unless invoked as root. `skip` bypasses the check
/// without running anything.
///
/// # Errors
///
/// Returns an error when the effective user is not root or cannot be
/// determined.
pub async fn ensure_root(runner: &impl CommandRunner, skip: bool) -> Result<()> {
    if skip {
        tracing::debug!("skipping root check");
        return Ok(());
    }
    let output = runner.run("id", &["-u"]).await?;
    let uid = String::from_utf8_lossy(&output.stdout).trim().to_string();
    anyhow::ensure!(
        output.status.success() && uid == "0",
        "agent-bootstrap must be run as root"
    );
    Ok(())
}

/// Warn when a deprecated platform alias was used.
pub(crate) fn warn_if_deprecated(platform: PlatformName) {
    if platform.is_deprecated() {
        tracing::warn!(
            "Platform '{platform}' is deprecated, use '{}' instead",
            platform.resolve()
        );
    }
}

/// Replace a bare `TransportError` with the command's own failure.
pub(crate) fn map_transport(
    err: anyhow::Error,
    wrap: fn(String) -> BootstrapError,
) -> anyhow::Error {
    if err.downcast_ref::<BootstrapError>().is_none()
        && err.downcast_ref::<TransportError>().is_some()
    {
        return wrap(format!("{err:#}")).into();
    }
    err
}

/// Process exit code for a failed run.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<BootstrapError>())
        .map_or(GENERIC_EXIT_CODE, BootstrapError::exit_code)
}
