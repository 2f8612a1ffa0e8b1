//! Application service: install, uninstall and reregister workflows.
//!
//! Composes the package, platform, activation, service and agent services
//! into the three top-level use-cases. Every fatal condition is returned to
//! the caller; nothing downstream of a failure runs.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::Host;
use crate::application::services::activation::request_activation;
use crate::application::services::package::PackageManager;
use crate::application::services::platform::Platform;
use crate::application::services::profile::configure_profile;
use crate::application::services::{agent, agent_service};
use crate::domain::platform::IGNORE_TAG_KEY;
use crate::domain::profile::AGENT_CONFIG_DIR;
use crate::domain::{AgentRegistration, BootstrapConfig, BootstrapError};

pub const REGISTERED_MESSAGE: &str = "Management agent was registered successfully.";
pub const UNINSTALLED_MESSAGE: &str = "Agent was successfully uninstalled";

/// Final record of a successful workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Success {
    pub message: String,
    pub details: String,
}

impl Success {
    fn new(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: details.into(),
        }
    }

    fn registered(message: &str, registration: &AgentRegistration) -> Self {
        Self::new(message, registration.details())
    }

    fn skipped(platform: &Platform, action: &str) -> Self {
        Self::new(
            format!(
                "Found a truthy value for '{IGNORE_TAG_KEY}' in {} metadata, skipping agent {action}",
                platform.id()
            ),
            "",
        )
    }
}

/// Inputs of the install workflow.
#[derive(Debug)]
pub struct InstallOptions<'a> {
    pub platform: &'a Platform,
    /// Region for the installer download; the global URL when `None`.
    pub installer_region: Option<&'a str>,
    pub config: &'a BootstrapConfig,
}

/// Install, configure and register the agent, converging on a registered
/// and running agent. An already registered agent is never re-activated.
///
/// # Errors
///
/// Returns the first fatal `BootstrapError` of any step, or a
/// `TransportError` when an HTTP endpoint is unreachable.
pub async fn install(host: &impl Host, opts: InstallOptions<'_>) -> Result<Success> {
    let InstallOptions {
        platform,
        installer_region,
        config,
    } = opts;
    tracing::debug!(platform = %platform.id(), "executing install command");

    if platform.is_agent_disabled(host).await? {
        return Ok(Success::skipped(platform, "installation"));
    }
    tracing::debug!(tag = IGNORE_TAG_KEY, "agent install is enabled, ignore tag not found in metadata");

    let packages = PackageManager::detect(host)?;
    if !packages.is_installed(host).await {
        let installer = packages.download_installer(host, installer_region).await?;
        packages.install(host, &installer).await?;
    }

    let profile = configure_profile(host, Path::new(AGENT_CONFIG_DIR));
    let status_poll = config.timings.service_status;

    if let Some(existing) = agent::registration(host).await? {
        tracing::debug!(registration = %existing.details(), "agent is already registered");
        if profile.is_updated() {
            agent_service::stop(host).await?;
        }
        agent_service::start(host, status_poll).await?;
        let registration = agent::verify_registration(host).await?;
        return Ok(Success::registered(REGISTERED_MESSAGE, &registration));
    }

    let activation = request_activation(host, platform, config).await?;
    if let Some(proxy) = &config.proxy {
        agent_service::write_proxy_override(host, proxy).await?;
    }
    agent::activate(host, activation, config.proxy.as_ref(), status_poll).await?;
    settle(host, config).await;
    let registration = agent::verify_registration(host).await?;
    Ok(Success::registered(REGISTERED_MESSAGE, &registration))
}

/// Clear the registration and remove the agent package.
///
/// # Errors
///
/// Returns [`BootstrapError::PackageNotInstalled`] when there is nothing to
/// remove, or the first failing step's error.
pub async fn uninstall(host: &impl Host) -> Result<Success> {
    tracing::debug!("executing uninstall command");
    let packages = PackageManager::detect(host)?;
    if !packages.is_installed(host).await {
        return Err(BootstrapError::PackageNotInstalled.into());
    }
    agent::clear_registration(host).await?;
    packages.uninstall(host).await?;
    Ok(Success::new(UNINSTALLED_MESSAGE, ""))
}

/// Replace the agent's registration with a fresh activation.
///
/// # Errors
///
/// Returns [`BootstrapError::ReregisterNotInstalled`] without the package,
/// or the first failing step's error.
pub async fn reregister(
    host: &impl Host,
    platform: &Platform,
    config: &BootstrapConfig,
) -> Result<Success> {
    tracing::debug!(platform = %platform.id(), "executing reregister command");

    if platform.is_agent_disabled(host).await? {
        return Ok(Success::skipped(platform, "reregistration"));
    }

    let packages = PackageManager::detect(host)?;
    if !packages.is_installed(host).await {
        return Err(BootstrapError::ReregisterNotInstalled.into());
    }

    agent::clear_registration(host).await?;
    let activation = request_activation(host, platform, config).await?;
    agent::activate(
        host,
        activation,
        config.proxy.as_ref(),
        config.timings.service_status,
    )
    .await?;
    settle(host, config).await;
    let registration = agent::verify_registration(host).await?;
    Ok(Success::registered(REGISTERED_MESSAGE, &registration))
}

async fn settle(host: &impl Host, config: &BootstrapConfig) {
    tracing::debug!(
        secs = config.timings.settle.as_secs(),
        "waiting before checking agent activation status"
    );
    host.sleep(config.timings.settle).await;
}
