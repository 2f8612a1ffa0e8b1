//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. The dispatcher in `main` downcasts back to
//! [`BootstrapError`] to pick the process exit code.

use std::fmt;

use thiserror::Error;

/// Exit code for errors that have no dedicated entry in [`EXIT_CODES`].
pub const GENERIC_EXIT_CODE: i32 = 1;

/// Stable exit-code table consumed by external monitoring.
pub const EXIT_CODES: &[(i32, &str)] = &[
    (100, "Failed to install package 'amazon-ssm-agent'"),
    (101, "Failed to uninstall package 'amazon-ssm-agent'"),
    (102, "Unable to start 'amazon-ssm-agent' service"),
    (103, "Unable to stop 'amazon-ssm-agent' service"),
    (104, "Service 'amazon-ssm-agent' has not reached a 'running' status after multiple attempts"),
    (105, "GET request to activation job url failed"),
    (106, "SSM agent activation job was not successful"),
    (107, "Agent activation job did not complete after multiple attempts"),
    (108, "POST request to activation url failed"),
    (109, "POST request to activation url did not return a Location header"),
    (110, "Failed to execute agent registration command"),
    (111, "Failed to execute agent diagnostics command"),
    (112, "Management agent was not registered successfully"),
    (113, "'ssm-cli' command does not exist"),
    (114, "Failed to execute clear agent registration command"),
    (115, "HTTP request failed while installing Amazon SSM Agent"),
    (116, "Package 'amazon-ssm-agent' is not currently installed"),
    (117, "HTTP request failed while reregistering Amazon SSM Agent"),
    (118, "Could not retrieve VMware token after multiple attempts"),
    (119, "VMware get token command failed"),
    (120, "GET request to Azure instance metadata url failed"),
    (121, "GET request to Azure attested document url failed"),
    (122, "Token file not found"),
    (123, "Token file is empty"),
    (124, "GET request to GCP instance identity url failed"),
    (125, "GET request to GCP instance metadata url failed"),
    (126, "Downloading agent package installer failed"),
    (127, "Command 'amazon-ssm-agent' not found"),
    (128, "SSM package is not installed, cannot reregister agent"),
    (129, "'ssm-cli' command does not exist"),
    (130, "Neither systemctl nor service commands found in $PATH"),
    (131, "Could not determine guest operating system Linux distribution"),
    (132, "Operating system is not supported"),
    (137, "'vmtoolsd' is not installed"),
    (138, "Failed to get token from OpenStack vendordata"),
];

// ── Command failures ──────────────────────────────────────────────────────────

/// Captured result of an external command that exited unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    /// The command line as it was run.
    pub command: String,
    /// Exit code, `None` when the command never ran or was killed by a signal.
    pub code: Option<i32>,
    /// Combined stdout and stderr.
    pub output: String,
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Failed command: {}", self.command)?;
        match self.code {
            Some(code) => writeln!(f, "ExitCode: {code}")?,
            None => writeln!(f, "ExitCode: none")?,
        }
        write!(f, "Output: {}", self.output.trim_end())
    }
}

// ── Transport errors ──────────────────────────────────────────────────────────

/// Connection-level HTTP failure (DNS, refused, timeout, TLS).
///
/// Status-code failures are not transport errors: they are reported by the
/// call site that owns the request.
#[derive(Debug, Error)]
#[error("{method} request to {url} failed: {reason}")]
pub struct TransportError {
    pub method: &'static str,
    pub url: String,
    pub reason: String,
}

// ── Bootstrap errors ──────────────────────────────────────────────────────────

/// Every fatal condition of the bootstrap workflows.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Package install command failed\n{0}")]
    PackageInstallFailed(CommandFailure),

    #[error("Package uninstall command failed\n{0}")]
    PackageUninstallFailed(CommandFailure),

    #[error("Start agent service command failed\n{0}")]
    ServiceStartFailed(CommandFailure),

    #[error("Stop agent service command failed\n{0}")]
    ServiceStopFailed(CommandFailure),

    #[error("Agent service failed to reach a running state after {attempts} attempts\n{last}")]
    ServiceNotRunning { attempts: u32, last: CommandFailure },

    #[error("GET request to job url {url} failed: {detail}")]
    JobRequestFailed { url: String, detail: String },

    #[error("Agent activation job {url} completed unsuccessfully (status: {status}).\nJob Details:\n{job}")]
    JobUnsuccessful {
        url: String,
        status: String,
        job: String,
    },

    #[error("Agent activation job {url} did not complete after {attempts} attempts.\nLast Job Details:\n{job}")]
    JobIncomplete {
        url: String,
        attempts: u32,
        job: String,
    },

    #[error("POST request to activation url {url} failed: {detail}")]
    ActivationRequestFailed { url: String, detail: String },

    #[error("POST request to activation url {url} did not return a Location header\n{detail}")]
    MissingLocationHeader { url: String, detail: String },

    #[error("Agent registration command failed\n{0}")]
    RegistrationFailed(CommandFailure),

    #[error("Agent diagnostics command failed\n{0}")]
    DiagnosticsFailed(String),

    #[error(
        "Management agent was not registered successfully, view /var/log/amazon/ssm/errors.log for details"
    )]
    NotRegistered,

    #[error("Command: ssm-cli not found in $PATH")]
    InstanceInfoToolMissing,

    #[error("Agent registration clear command failed\n{0}")]
    ClearRegistrationFailed(CommandFailure),

    #[error("{0}")]
    InstallTransport(String),

    #[error("Package amazon-ssm-agent is not currently installed")]
    PackageNotInstalled,

    #[error("{0}")]
    ReregisterTransport(String),

    #[error(
        "Could not retrieve token after {attempts} attempts. Rackspace vmware provisioning is \
         responsible for setting the 'guestinfo.machine.id' custom property."
    )]
    VmwareTokenExhausted { attempts: u32 },

    #[error("Vmware get token command failed\n{0}")]
    VmwareTokenCommandFailed(CommandFailure),

    #[error("GET request to metadata instance url {url} failed: {detail}")]
    AzureInstanceMetadataFailed { url: String, detail: String },

    #[error("GET request to metadata attest url {url} failed: {detail}")]
    AzureAttestFailed { url: String, detail: String },

    #[error(
        "Token file not found: {path}. Rackspace dedicated server provisioning is responsible \
         for populating this file."
    )]
    TokenFileMissing { path: String },

    #[error(
        "Token file is empty: {path}. Rackspace dedicated server provisioning is responsible \
         for populating this file."
    )]
    TokenFileEmpty { path: String },

    #[error("GET request to instance identity url {url} failed: {detail}")]
    GcpIdentityFailed { url: String, detail: String },

    #[error("GET request to metadata url {url} failed: {detail}")]
    GcpMetadataFailed { url: String, detail: String },

    #[error("Downloading SSM package installer from {url} failed: {detail}")]
    InstallerDownloadFailed { url: String, detail: String },

    #[error("Command: amazon-ssm-agent not found in $PATH")]
    AgentToolMissing,

    #[error("SSM package is not installed, cannot reregister agent")]
    ReregisterNotInstalled,

    #[error("Command: ssm-cli not found in $PATH")]
    DiagnosticsToolMissing,

    #[error("Neither systemctl or service commands found in $PATH, bootstrap install cannot continue.")]
    NoServiceManager,

    #[error("Could not determine guest operating system Linux distribution.")]
    UnknownDistro,

    #[error("Operating system '{distro}' is not supported.")]
    UnsupportedOs { distro: String },

    #[error(
        "Installation cannot continue because 'vmtoolsd' is not installed, please install \
         'vmtoolsd' before continuing"
    )]
    VmtoolsdMissing,

    #[error("Failed to get token from OpenStack vendordata. {reason}")]
    OpenStackToken { reason: String },
}

impl BootstrapError {
    /// Process exit code for this condition.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PackageInstallFailed(_) => 100,
            Self::PackageUninstallFailed(_) => 101,
            Self::ServiceStartFailed(_) => 102,
            Self::ServiceStopFailed(_) => 103,
            Self::ServiceNotRunning { .. } => 104,
            Self::JobRequestFailed { .. } => 105,
            Self::JobUnsuccessful { .. } => 106,
            Self::JobIncomplete { .. } => 107,
            Self::ActivationRequestFailed { .. } => 108,
            Self::MissingLocationHeader { .. } => 109,
            Self::RegistrationFailed(_) => 110,
            Self::DiagnosticsFailed(_) => 111,
            Self::NotRegistered => 112,
            Self::InstanceInfoToolMissing => 113,
            Self::ClearRegistrationFailed(_) => 114,
            Self::InstallTransport(_) => 115,
            Self::PackageNotInstalled => 116,
            Self::ReregisterTransport(_) => 117,
            Self::VmwareTokenExhausted { .. } => 118,
            Self::VmwareTokenCommandFailed(_) => 119,
            Self::AzureInstanceMetadataFailed { .. } => 120,
            Self::AzureAttestFailed { .. } => 121,
            Self::TokenFileMissing { .. } => 122,
            Self::TokenFileEmpty { .. } => 123,
            Self::GcpIdentityFailed { .. } => 124,
            Self::GcpMetadataFailed { .. } => 125,
            Self::InstallerDownloadFailed { .. } => 126,
            Self::AgentToolMissing => 127,
            Self::ReregisterNotInstalled => 128,
            Self::DiagnosticsToolMissing => 129,
            Self::NoServiceManager => 130,
            Self::UnknownDistro => 131,
            Self::UnsupportedOs { .. } => 132,
            Self::VmtoolsdMissing => 137,
            Self::OpenStackToken { .. } => 138,
        }
    }
}

/// Exit-code table rendered for `--help`.
#[must_use]
pub fn exit_codes_help() -> String {
    let mut lines = vec!["Exit codes:".to_string()];
    lines.push(format!("  {GENERIC_EXIT_CODE}: Unexpected error"));
    lines.extend(EXIT_CODES.iter().map(|(code, desc)| format!("  {code}: {desc}")));
    lines.join("\n")
}

// ── Profile errors ────────────────────────────────────────────────────────────

/// The agent configuration file cannot be reconciled in place.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("agent configuration section '{0}' is not a JSON object")]
    NotAnObject(&'static str),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while validating command-line configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Invalid proxy URI '{value}': {reason}")]
    InvalidProxy { value: String, reason: String },
}
