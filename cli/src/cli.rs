//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use clap::builder::PossibleValue;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::app::AppContext;
use crate::application::services::bootstrap::Success;
use crate::commands;
use crate::domain::config::{DEFAULT_BASE_URL, PollPolicy, Timings};
use crate::domain::error::exit_codes_help;
use crate::domain::{BootstrapConfig, PlatformName, ProxySettings};
use crate::output::ResultFormat;
use crate::output::logging::{DEFAULT_LOG_FILE, LogLevel};

/// Install, register and verify the management agent on this host
#[derive(Debug, Parser)]
#[command(
    name = "agent-bootstrap",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true,
    after_help = exit_codes_help()
)]
pub struct Cli {
    /// Diagnostic log level (logs go to stderr and the log file)
    #[arg(
        long,
        global = true,
        value_enum,
        ignore_case = true,
        default_value = "DEBUG",
        env = "AGENT_BOOTSTRAP_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// Also append diagnostic logs to this file
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        default_value = DEFAULT_LOG_FILE,
        env = "AGENT_BOOTSTRAP_LOG_FILE"
    )]
    pub log_file: PathBuf,

    /// Format of the final result record
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = ResultFormat::Text,
        env = "AGENT_BOOTSTRAP_RESULT_FORMAT"
    )]
    pub result_format: ResultFormat,

    /// Proxy for every HTTP request and for the registered agent
    #[arg(
        long,
        global = true,
        value_name = "URI",
        value_parser = ProxySettings::from_str,
        env = "AGENT_BOOTSTRAP_HTTP_PROXY"
    )]
    pub http_proxy: Option<ProxySettings>,

    /// Seconds between agent service status checks
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        default_value_t = 1,
        env = "AGENT_BOOTSTRAP_SERVICE_STATUS_INTERVAL"
    )]
    pub service_status_interval: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Install and register the agent
    Install(InstallArgs),

    /// Clear the registration and remove the agent
    Uninstall(UninstallArgs),

    /// Replace the agent's registration with a fresh activation
    Reregister(ReregisterArgs),
}

/// Platform Services endpoint override shared by every subcommand.
#[derive(Debug, Args)]
pub struct ApiArgs {
    /// Platform Services API base URL
    #[arg(
        long,
        value_name = "URL",
        default_value = DEFAULT_BASE_URL,
        env = "AGENT_BOOTSTRAP_PLATFORM_SERVICES_BASE_URL"
    )]
    pub platform_services_base_url: String,
}

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Platform this host runs on
    #[arg(short, long, value_enum, env = "AGENT_BOOTSTRAP_PLATFORM")]
    pub platform: PlatformName,

    /// Download the agent installer from this AWS region
    #[arg(long, value_name = "REGION", env = "AGENT_BOOTSTRAP_INSTALLER_DOWNLOAD_REGION")]
    pub installer_download_region: Option<String>,

    #[command(flatten)]
    pub api: ApiArgs,
}

#[derive(Debug, Args)]
pub struct UninstallArgs {
    #[command(flatten)]
    pub api: ApiArgs,
}

#[derive(Debug, Args)]
pub struct ReregisterArgs {
    /// Platform this host runs on
    #[arg(short, long, value_enum, env = "AGENT_BOOTSTRAP_PLATFORM")]
    pub platform: PlatformName,

    #[command(flatten)]
    pub api: ApiArgs,
}

impl ValueEnum for PlatformName {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        let value = PossibleValue::new(self.as_str());
        Some(if self.is_deprecated() {
            value.help("deprecated alias of 'openstack'")
        } else {
            value
        })
    }
}

impl Cli {
    /// Run configuration for this invocation.
    #[must_use]
    pub fn config(&self) -> BootstrapConfig {
        let base_url = match &self.command {
            Command::Install(args) => &args.api.platform_services_base_url,
            Command::Uninstall(args) => &args.api.platform_services_base_url,
            Command::Reregister(args) => &args.api.platform_services_base_url,
        };
        let defaults = Timings::default();
        BootstrapConfig {
            base_url: base_url.clone(),
            proxy: self.http_proxy.clone(),
            timings: Timings {
                service_status: PollPolicy::new(
                    defaults.service_status.attempts,
                    Duration::from_secs(self.service_status_interval),
                ),
                ..defaults
            },
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns the failing workflow's error; `main` maps it to an exit code.
    pub async fn run(self) -> Result<Success> {
        let app = AppContext::new(self.config())?;
        commands::ensure_root(&app.host, commands::root_check_skipped()).await?;
        match self.command {
            Command::Install(args) => commands::install::run(&app, args).await,
            Command::Uninstall(_) => commands::uninstall::run(&app).await,
            Command::Reregister(args) => commands::reregister::run(&app, args).await,
        }
    }
}
