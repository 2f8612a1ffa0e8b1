//! End-to-end install workflow against a scripted host.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use agent_bootstrap::application::services::bootstrap::{
    InstallOptions, REGISTERED_MESSAGE, install,
};
use agent_bootstrap::application::services::platform::Platform;
use agent_bootstrap::commands::exit_code;
use agent_bootstrap::domain::{BootstrapConfig, PlatformId, ProxySettings, Timings};

use crate::helpers::{
    DIAGNOSTICS_OK, DIAGNOSTICS_WITH_FAILURE, INSTANCE_INFO, accepted, err_output, job,
    ok_output, response, succeeded_job,
};
use crate::mocks::ScriptedHost;

const BASE: &str = "https://ps.example.com";
const GCP_IGNORE: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/attributes/rackspace-addon-ignore";
const GCP_IDENTITY: &str = "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/identity?audience=platform.manage.rackspace.com&format=full";
const ACTIVATE: &str = "https://ps.example.com/v1.0/instance/gcp/activate";
const JOB: &str = "https://ps.example.com/jobs/7";
const DEB_URL: &str =
    "https://s3.amazonaws.com/ec2-downloads-windows/SSMAgent/latest/debian_amd64/amazon-ssm-agent.deb";

const DETECT: &str = "dpkg -l amazon-ssm-agent";
const INSTANCE_INFO_CMD: &str = "ssm-cli get-instance-information";
const DIAGNOSTICS_CMD: &str = "ssm-cli get-diagnostics";
const REGISTER: &str = "amazon-ssm-agent -y -register -code CODE -id ID -region us-east-1";

fn config() -> BootstrapConfig {
    BootstrapConfig {
        base_url: BASE.to_string(),
        ..BootstrapConfig::default()
    }
}

fn gcp() -> Platform {
    Platform::for_id(PlatformId::Gcp, &Timings::default())
}

/// Ubuntu host with systemd and the agent tooling on `$PATH`.
fn ubuntu() -> ScriptedHost {
    ScriptedHost::new()
        .on_path(&["systemctl", "amazon-ssm-agent", "ssm-cli"])
        .file("/etc/os-release", "NAME=\"Ubuntu\"\nID=ubuntu\n")
        .get(GCP_IGNORE, vec![response(404, "")])
}

/// Ubuntu host that has never seen the agent.
fn fresh_ubuntu() -> ScriptedHost {
    ubuntu()
        .command(DETECT, vec![err_output(1, b"no packages found")])
        .download(DEB_URL, response(200, ""))
        .command(
            INSTANCE_INFO_CMD,
            vec![err_output(1, b"error: not registered"), ok_output(INSTANCE_INFO)],
        )
        .command(DIAGNOSTICS_CMD, vec![ok_output(DIAGNOSTICS_OK)])
        .get(GCP_IDENTITY, vec![response(200, "jwt-token")])
        .post(ACTIVATE, accepted(JOB))
        .get(JOB, vec![job("RUNNING"), succeeded_job()])
}

async fn run_install(host: &ScriptedHost, config: &BootstrapConfig) -> anyhow::Result<String> {
    let platform = gcp();
    install(
        host,
        InstallOptions {
            platform: &platform,
            installer_region: None,
            config,
        },
    )
    .await
    .map(|s| s.message)
}

#[tokio::test]
async fn fresh_install_registers_agent() {
    let host = fresh_ubuntu();
    let message = run_install(&host, &config()).await.unwrap();
    assert_eq!(message, REGISTERED_MESSAGE);

    assert!(host.requested(&format!("DOWNLOAD {DEB_URL}")));
    assert!(host.ran("dpkg -i /tmp/scripted/amazon-ssm-agent.deb"));
    assert!(host.ran("systemctl stop amazon-ssm-agent"));
    assert!(host.ran(REGISTER));
    assert!(host.ran("systemctl start amazon-ssm-agent"));
    assert_eq!(host.request_count(&format!("GET {JOB}")), 2);
    // one job poll interval, then the settle delay
    assert_eq!(
        *host.sleeps.borrow(),
        vec![Duration::from_secs(10), Duration::from_secs(10)]
    );
}

#[tokio::test]
async fn registration_happens_in_order() {
    let host = fresh_ubuntu();
    run_install(&host, &config()).await.unwrap();
    let runs = host.commands_run.borrow();
    let position = |line: &str| runs.iter().position(|c| c == line).unwrap();
    assert!(position("systemctl stop amazon-ssm-agent") < position(REGISTER));
    assert!(position(REGISTER) < position("systemctl start amazon-ssm-agent"));
    assert!(position("systemctl start amazon-ssm-agent") < position(DIAGNOSTICS_CMD));
}

#[tokio::test]
async fn already_registered_agent_is_never_reactivated() {
    let host = ubuntu()
        .command(DETECT, vec![ok_output(b"ii  amazon-ssm-agent")])
        .command(INSTANCE_INFO_CMD, vec![ok_output(INSTANCE_INFO)])
        .command(DIAGNOSTICS_CMD, vec![ok_output(DIAGNOSTICS_OK)]);
    let message = run_install(&host, &config()).await.unwrap();
    assert_eq!(message, REGISTERED_MESSAGE);
    assert!(!host.requested(&format!("GET {GCP_IDENTITY}")));
    assert!(!host.requested(&format!("POST {ACTIVATE}")));
    assert!(!host.ran(REGISTER));
    assert!(!host.ran("systemctl stop amazon-ssm-agent"));
    assert!(!host.requests.borrow().iter().any(|r| r.starts_with("DOWNLOAD")));
    assert!(host.commands_run.borrow().iter().all(|c| !c.starts_with("dpkg -i")));
    let starts = host
        .commands_run
        .borrow()
        .iter()
        .filter(|c| *c == "systemctl start amazon-ssm-agent")
        .count();
    assert_eq!(starts, 1);
    assert!(host.ran(DIAGNOSTICS_CMD));
}

#[tokio::test]
async fn registered_agent_restarts_when_profile_changes() {
    let host = ubuntu()
        .command(DETECT, vec![ok_output(b"ii  amazon-ssm-agent")])
        .command(INSTANCE_INFO_CMD, vec![ok_output(INSTANCE_INFO)])
        .command(DIAGNOSTICS_CMD, vec![ok_output(DIAGNOSTICS_OK)])
        .file("/etc/amazon/ssm/amazon-ssm-agent.json", r#"{"Profile": {}}"#);
    run_install(&host, &config()).await.unwrap();
    assert!(host.ran("systemctl stop amazon-ssm-agent"));
    let written = host.read("/etc/amazon/ssm/amazon-ssm-agent.json").unwrap();
    assert!(written.contains("\"ShareProfile\": \"rackspace\""));
}

#[tokio::test]
async fn missing_location_header_is_109_without_polling() {
    let host = fresh_ubuntu().post(ACTIVATE, response(202, ""));
    let err = run_install(&host, &config()).await.unwrap_err();
    assert_eq!(exit_code(&err), 109);
    assert!(!host.requested(&format!("GET {JOB}")));
    assert!(!host.ran(REGISTER));
}

#[tokio::test]
async fn failed_job_is_106() {
    let host = fresh_ubuntu().get(JOB, vec![job("FAILED")]);
    let err = run_install(&host, &config()).await.unwrap_err();
    assert_eq!(exit_code(&err), 106);
    assert!(format!("{err:#}").contains("FAILED"));
}

#[tokio::test]
async fn job_still_running_after_budget_is_107() {
    let host = fresh_ubuntu().get(JOB, vec![job("RUNNING")]);
    let err = run_install(&host, &config()).await.unwrap_err();
    assert_eq!(exit_code(&err), 107);
    assert_eq!(host.request_count(&format!("GET {JOB}")), 10);
    assert_eq!(host.sleeps.borrow().len(), 9);
}

#[tokio::test]
async fn installer_download_failure_is_126() {
    let host = fresh_ubuntu().download(DEB_URL, response(403, "denied"));
    let err = run_install(&host, &config()).await.unwrap_err();
    assert_eq!(exit_code(&err), 126);
    assert!(host.commands_run.borrow().iter().all(|c| !c.starts_with("dpkg -i")));
}

#[tokio::test]
async fn regional_installer_url_is_used() {
    let regional =
        "https://amazon-ssm-eu-west-1.s3.eu-west-1.amazonaws.com/latest/debian_amd64/amazon-ssm-agent.deb";
    let host = fresh_ubuntu().download(regional, response(200, ""));
    let platform = gcp();
    let config = config();
    install(
        &host,
        InstallOptions {
            platform: &platform,
            installer_region: Some("eu-west-1"),
            config: &config,
        },
    )
    .await
    .unwrap();
    assert!(host.requested(&format!("DOWNLOAD {regional}")));
}

#[tokio::test]
async fn proxy_install_writes_override_and_passes_env() {
    let proxy: ProxySettings = "http://proxy.local:3128".parse().unwrap();
    let config = BootstrapConfig {
        proxy: Some(proxy),
        ..config()
    };
    let host = fresh_ubuntu();
    run_install(&host, &config).await.unwrap();

    let override_conf = host
        .read("/etc/systemd/system/amazon-ssm-agent.service.d/override.conf")
        .unwrap();
    assert!(override_conf.contains("http://proxy.local:3128"));
    assert!(host.ran("systemctl daemon-reload"));

    let envs = host.command_envs.borrow();
    let env = envs.get(REGISTER).unwrap();
    assert!(env.iter().any(|(k, v)| k == "https_proxy" && v == "http://proxy.local:3128"));
}

#[tokio::test]
async fn unregistered_after_activation_is_112() {
    let host = fresh_ubuntu().command(
        INSTANCE_INFO_CMD,
        vec![err_output(1, b"error: not registered")],
    );
    let err = run_install(&host, &config()).await.unwrap_err();
    assert_eq!(exit_code(&err), 112);
}

#[tokio::test]
async fn failed_diagnostic_checks_are_not_fatal() {
    let host = fresh_ubuntu().command(DIAGNOSTICS_CMD, vec![ok_output(DIAGNOSTICS_WITH_FAILURE)]);
    assert_eq!(run_install(&host, &config()).await.unwrap(), REGISTERED_MESSAGE);
}

#[tokio::test]
async fn service_never_running_is_104() {
    let host = fresh_ubuntu().command(
        "systemctl is-active amazon-ssm-agent",
        vec![err_output(3, b"inactive")],
    );
    let err = run_install(&host, &config()).await.unwrap_err();
    assert_eq!(exit_code(&err), 104);
}

#[tokio::test]
async fn unknown_distro_is_131() {
    let host = ScriptedHost::new().get(GCP_IGNORE, vec![response(404, "")]);
    let err = run_install(&host, &config()).await.unwrap_err();
    assert_eq!(exit_code(&err), 131);
    assert!(host.commands_run.borrow().is_empty());
}

#[tokio::test]
async fn unsupported_distro_is_132() {
    let host = ScriptedHost::new()
        .get(GCP_IGNORE, vec![response(404, "")])
        .file("/etc/os-release", "ID=arch\n");
    let err = run_install(&host, &config()).await.unwrap_err();
    assert_eq!(exit_code(&err), 132);
}
