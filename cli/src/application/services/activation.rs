//! Application service: activation request and job polling.
//!
//! Exchanges a platform token for activation credentials: one POST to the
//! platform's activation URL, then bounded polling of the returned job.

use anyhow::Result;
use bootstrap_common::{JobEnvelope, JobItem};
use serde_json::json;

use crate::application::ports::{Clock, Host, HttpClient};
use crate::application::services::platform::Platform;
use crate::domain::config::USER_AGENT;
use crate::domain::{Activation, BootstrapConfig, BootstrapError, PollPolicy, Token};

/// Header carrying the platform token on every Platform Services call.
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Acquire a token for `platform` and exchange it for activation credentials.
///
/// # Errors
///
/// Returns the platform's token error, or any error from [`submit`] and
/// [`poll_job`].
pub async fn request_activation(
    host: &impl Host,
    platform: &Platform,
    config: &BootstrapConfig,
) -> Result<Activation> {
    let activation_url = platform.activation_url(&config.base_url);
    tracing::debug!(platform = %platform.id(), "getting auth token for agent activation");
    let token = platform.token(host).await?;
    let job_url = submit(host, &activation_url, &token).await?;
    poll_job(host, &job_url, &token, config.timings.job).await
}

/// POST an activation request and return the job URL from `Location`.
///
/// # Errors
///
/// - [`BootstrapError::ActivationRequestFailed`] on a non-ok status
/// - [`BootstrapError::MissingLocationHeader`] when no job URL came back
pub async fn submit(http: &impl HttpClient, url: &str, token: &Token) -> Result<String> {
    tracing::debug!(%url, "requesting agent activation");
    let headers = [(AUTH_HEADER, token.as_str()), ("User-Agent", USER_AGENT)];
    let response = http.post_json(url, &json!({}), &headers).await?;
    if !response.is_ok() {
        return Err(BootstrapError::ActivationRequestFailed {
            url: url.to_string(),
            detail: response.dump(),
        }
        .into());
    }
    let Some(job_url) = response.header("location").filter(|v| !v.trim().is_empty()) else {
        return Err(BootstrapError::MissingLocationHeader {
            url: url.to_string(),
            detail: response.dump(),
        }
        .into());
    };
    tracing::debug!(job_url, "agent activation request responded with job");
    Ok(job_url.trim().to_string())
}

/// Poll the activation job until it leaves `RUNNING`.
///
/// Sleeps `policy.interval` between polls, never after the last one.
///
/// # Errors
///
/// - [`BootstrapError::JobRequestFailed`] on a non-ok or malformed response
/// - [`BootstrapError::JobUnsuccessful`] on any terminal status but `SUCCEEDED`
/// - [`BootstrapError::JobIncomplete`] if the job is still running after
///   `policy.attempts` polls
pub async fn poll_job(
    host: &(impl HttpClient + Clock),
    job_url: &str,
    token: &Token,
    policy: PollPolicy,
) -> Result<Activation> {
    let headers = [(AUTH_HEADER, token.as_str())];
    let mut last_job: Option<JobItem> = None;
    for attempt in 1..=policy.attempts {
        tracing::debug!(attempt, job_url, "requesting agent activation job");
        let response = host.get(job_url, &headers).await?;
        let request_failed = |detail: String| BootstrapError::JobRequestFailed {
            url: job_url.to_string(),
            detail,
        };
        if !response.is_ok() {
            return Err(request_failed(response.dump()).into());
        }
        let job = response
            .json::<JobEnvelope>()
            .map_err(|e| request_failed(format!("{e:#}")))?
            .into_job()
            .map_err(|e| request_failed(format!("{e}\n{}", response.text())))?;

        if job.is_succeeded() {
            tracing::debug!(job_url, "agent activation job completed successfully");
            let message = job
                .activation_message()
                .map_err(|e| request_failed(format!("{e}\n{}", describe(&job))))?;
            return Ok(Activation::from(message));
        }
        if !job.is_running() {
            return Err(BootstrapError::JobUnsuccessful {
                url: job_url.to_string(),
                status: job.status.clone(),
                job: describe(&job),
            }
            .into());
        }
        tracing::debug!(
            job_url,
            interval_secs = policy.interval.as_secs(),
            "agent activation job still running"
        );
        last_job = Some(job);
        if policy.has_next(attempt) {
            host.sleep(policy.interval).await;
        }
    }
    Err(BootstrapError::JobIncomplete {
        url: job_url.to_string(),
        attempts: policy.attempts,
        job: last_job.as_ref().map(describe).unwrap_or_default(),
    }
    .into())
}

fn describe(job: &JobItem) -> String {
    serde_json::to_string(job).unwrap_or_else(|_| job.status.clone())
}
