//! Application service: agent OS service control.
//!
//! Prefers systemd and falls back to SysV `service`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{Clock, CommandLocator, CommandRunner, LocalFs};
use crate::application::services::{command_line, run_checked};
use crate::domain::distro::AGENT_PACKAGE;
use crate::domain::proxy::{SERVICE_OVERRIDE_DIR, SERVICE_OVERRIDE_FILE};
use crate::domain::{BootstrapError, CommandFailure, PollPolicy, ProxySettings};

const SYSTEMCTL: &str = "systemctl";
const SERVICE: &str = "service";

/// The init system driving the agent service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceManager {
    Systemd,
    SysV,
}

impl ServiceManager {
    /// Pick `systemctl` when available, else `service`.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::NoServiceManager`] when neither is on `$PATH`.
    pub fn detect(locator: &impl CommandLocator) -> Result<Self, BootstrapError> {
        if locator.command_exists(SYSTEMCTL) {
            Ok(Self::Systemd)
        } else if locator.command_exists(SERVICE) {
            Ok(Self::SysV)
        } else {
            Err(BootstrapError::NoServiceManager)
        }
    }

    fn command(self, action: &'static str) -> (&'static str, [&'static str; 2]) {
        match self {
            Self::Systemd => (SYSTEMCTL, [action, AGENT_PACKAGE]),
            Self::SysV => (SERVICE, [AGENT_PACKAGE, action]),
        }
    }

    fn status_action(self) -> &'static str {
        match self {
            Self::Systemd => "is-active",
            Self::SysV => "status",
        }
    }
}

/// Start the agent service and wait until it reports running.
///
/// # Errors
///
/// - [`BootstrapError::NoServiceManager`] with no init tooling
/// - [`BootstrapError::ServiceStartFailed`] if the start command fails
/// - [`BootstrapError::ServiceNotRunning`] after `policy.attempts` failed
///   status checks
pub async fn start(
    host: &(impl CommandRunner + CommandLocator + Clock),
    policy: PollPolicy,
) -> Result<()> {
    let manager = ServiceManager::detect(host)?;
    let (program, args) = manager.command("start");
    tracing::debug!(command = %command_line(program, &args), "running start agent service command");
    run_checked(host, program, &args)
        .await
        .map_err(BootstrapError::ServiceStartFailed)?;

    let (program, args) = manager.command(manager.status_action());
    let mut last: Option<CommandFailure> = None;
    for attempt in 1..=policy.attempts {
        tracing::debug!(attempt, "checking if agent service is running");
        match run_checked(host, program, &args).await {
            Ok(_) => {
                tracing::debug!("agent service is now running");
                return Ok(());
            }
            Err(failure) => {
                tracing::debug!(code = ?failure.code, "agent service is not running yet");
                last = Some(failure);
            }
        }
        if policy.has_next(attempt) {
            host.sleep(policy.interval).await;
        }
    }
    Err(BootstrapError::ServiceNotRunning {
        attempts: policy.attempts,
        last: last.unwrap_or_else(|| CommandFailure {
            command: command_line(program, &args),
            code: None,
            output: String::new(),
        }),
    }
    .into())
}

/// Stop the agent service. Single attempt.
///
/// # Errors
///
/// Returns [`BootstrapError::NoServiceManager`] or
/// [`BootstrapError::ServiceStopFailed`].
pub async fn stop(host: &(impl CommandRunner + CommandLocator)) -> Result<()> {
    let manager = ServiceManager::detect(host)?;
    let (program, args) = manager.command("stop");
    tracing::debug!(command = %command_line(program, &args), "running stop agent service command");
    run_checked(host, program, &args)
        .await
        .map_err(BootstrapError::ServiceStopFailed)?;
    Ok(())
}

/// Write the systemd drop-in that gives the agent service the proxy, then
/// reload unit files.
///
/// # Errors
///
/// Returns [`BootstrapError::NoServiceManager`] without systemd, or an
/// error if the drop-in cannot be written or `daemon-reload` fails.
pub async fn write_proxy_override(
    host: &(impl CommandRunner + CommandLocator + LocalFs),
    proxy: &ProxySettings,
) -> Result<()> {
    if !host.command_exists(SYSTEMCTL) {
        return Err(BootstrapError::NoServiceManager.into());
    }
    let dir = Path::new(SERVICE_OVERRIDE_DIR);
    host.create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(SERVICE_OVERRIDE_FILE);
    host.write(&path, &proxy.service_override())
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), proxy = %proxy, "configured agent service proxy");
    run_checked(host, SYSTEMCTL, &["daemon-reload"])
        .await
        .map_err(|failure| anyhow::anyhow!("Reloading systemd unit files failed\n{failure}"))?;
    Ok(())
}
