//! Application service: guest agent commands.
//!
//! Wraps `amazon-ssm-agent` registration and the `ssm-cli` queries used to
//! verify it.

use anyhow::{Context, Result};
use bootstrap_common::DiagnosticsOutput;

use crate::application::ports::{Clock, CommandLocator, CommandRunner};
use crate::application::services::{agent_service, run_checked, run_checked_with_env};
use crate::domain::agent::{AGENT_BIN, AGENT_CLI, failed_checks_report};
use crate::domain::{Activation, AgentRegistration, BootstrapError, PollPolicy, ProxySettings};

const CLEAR_ARGS: &[&str] = &["-register", "-clear"];
const INSTANCE_INFO_ARGS: &[&str] = &["get-instance-information"];
const DIAGNOSTICS_ARGS: &[&str] = &["get-diagnostics"];

/// Drop the agent's current registration.
///
/// # Errors
///
/// Returns [`BootstrapError::AgentToolMissing`] or
/// [`BootstrapError::ClearRegistrationFailed`].
pub async fn clear_registration(host: &(impl CommandRunner + CommandLocator)) -> Result<()> {
    if !host.command_exists(AGENT_BIN) {
        return Err(BootstrapError::AgentToolMissing.into());
    }
    run_checked(host, AGENT_BIN, CLEAR_ARGS)
        .await
        .map_err(BootstrapError::ClearRegistrationFailed)?;
    tracing::debug!("cleared agent registration");
    Ok(())
}

/// Current registration, `None` when the agent reports it is not registered.
///
/// # Errors
///
/// Returns [`BootstrapError::InstanceInfoToolMissing`] when `ssm-cli` is
/// absent, or an error if its output is not JSON.
pub async fn registration(
    host: &(impl CommandRunner + CommandLocator),
) -> Result<Option<AgentRegistration>> {
    if !host.command_exists(AGENT_CLI) {
        return Err(BootstrapError::InstanceInfoToolMissing.into());
    }
    let output = match run_checked(host, AGENT_CLI, INSTANCE_INFO_ARGS).await {
        Ok(output) => output,
        Err(failure) => {
            let errors: Vec<&str> = failure
                .output
                .lines()
                .filter(|line| line.contains("error:"))
                .collect();
            tracing::warn!(code = ?failure.code, ?errors, "agent is not registered");
            return Ok(None);
        }
    };
    let info = serde_json::from_slice(&output.stdout)
        .context("ssm-cli get-instance-information did not return JSON")?;
    Ok(Some(AgentRegistration { info }))
}

/// Run the agent's self-diagnostics.
///
/// # Errors
///
/// Returns [`BootstrapError::DiagnosticsToolMissing`] or
/// [`BootstrapError::DiagnosticsFailed`].
pub async fn diagnostics(host: &(impl CommandRunner + CommandLocator)) -> Result<DiagnosticsOutput> {
    if !host.command_exists(AGENT_CLI) {
        return Err(BootstrapError::DiagnosticsToolMissing.into());
    }
    let output = run_checked(host, AGENT_CLI, DIAGNOSTICS_ARGS)
        .await
        .map_err(|failure| BootstrapError::DiagnosticsFailed(failure.to_string()))?;
    serde_json::from_slice(&output.stdout).map_err(|e| {
        BootstrapError::DiagnosticsFailed(format!(
            "ssm-cli get-diagnostics returned unexpected output: {e}\n{}",
            String::from_utf8_lossy(&output.stdout).trim_end()
        ))
        .into()
    })
}

/// Register the agent. The proxy, if any, is set for this command only.
///
/// # Errors
///
/// Returns [`BootstrapError::RegistrationFailed`].
pub async fn register(
    runner: &impl CommandRunner,
    activation: Activation,
    proxy: Option<&ProxySettings>,
) -> Result<()> {
    let args = activation.register_args();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let proxy_env = proxy.map(ProxySettings::env);
    let env: &[(&str, &str)] = match &proxy_env {
        Some(env) => env,
        None => &[],
    };
    run_checked_with_env(runner, AGENT_BIN, &args, env)
        .await
        .map_err(BootstrapError::RegistrationFailed)?;
    tracing::debug!("agent registration succeeded");
    Ok(())
}

/// Stop the service, register with fresh credentials, start it again.
///
/// # Errors
///
/// Propagates the first failing step's error.
pub async fn activate(
    host: &(impl CommandRunner + CommandLocator + Clock),
    activation: Activation,
    proxy: Option<&ProxySettings>,
    status_poll: PollPolicy,
) -> Result<()> {
    agent_service::stop(host).await?;
    register(host, activation, proxy).await?;
    agent_service::start(host, status_poll).await
}

/// Check diagnostics and confirm the agent is registered.
///
/// Failed diagnostic checks are logged, never fatal.
///
/// # Errors
///
/// Returns [`BootstrapError::NotRegistered`] when no registration is
/// reported, or any error from [`diagnostics`] and [`registration`].
pub async fn verify_registration(
    host: &(impl CommandRunner + CommandLocator),
) -> Result<AgentRegistration> {
    let diagnostics = diagnostics(host).await?;
    let registration = registration(host).await?;
    if let Some(report) = failed_checks_report(&diagnostics) {
        tracing::warn!("Some management agent diagnostic checks failed, please review:\n{report}");
    }
    registration.ok_or_else(|| BootstrapError::NotRegistered.into())
}
