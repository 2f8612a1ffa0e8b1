//! Platform Services activation API payloads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Job status reported while the activation is still being prepared.
pub const JOB_RUNNING: &str = "RUNNING";
/// Job status reported once activation credentials have been issued.
pub const JOB_SUCCEEDED: &str = "SUCCEEDED";

/// Errors raised when an API payload does not have the expected shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("job response contains no items")]
    NoJobItems,

    #[error("job message is missing field '{0}'")]
    MissingField(&'static str),
}

/// Body of `GET <job url>`: `{"data":{"items":[job, ...]}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub data: JobData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobData {
    #[serde(default)]
    pub items: Vec<JobItem>,
}

/// A single activation job as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobItem {
    pub status: String,
    /// Free-form while the job runs or fails; carries the activation once
    /// the job has succeeded.
    #[serde(default)]
    pub message: serde_json::Value,
}

impl JobEnvelope {
    /// The job the API is reporting on (always the first item).
    pub fn into_job(self) -> Result<JobItem, WireError> {
        self.data.items.into_iter().next().ok_or(WireError::NoJobItems)
    }
}

impl JobItem {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == JOB_RUNNING
    }

    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.status == JOB_SUCCEEDED
    }

    /// Extract the activation credentials from a succeeded job.
    pub fn activation_message(&self) -> Result<ActivationMessage, WireError> {
        let field = |name: &'static str| {
            self.message
                .get(name)
                .and_then(serde_json::Value::as_str)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or(WireError::MissingField(name))
        };
        Ok(ActivationMessage {
            activation_code: field("activation_code")?,
            activation_id: field("activation_id")?,
            region: field("region")?,
            system_account: field("system_account")?,
        })
    }
}

/// Activation credentials carried in a succeeded job's `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationMessage {
    pub activation_code: String,
    pub activation_id: String,
    pub region: String,
    pub system_account: String,
}
