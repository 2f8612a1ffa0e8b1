//! Output of the agent's local `ssm-cli` commands.

use serde::{Deserialize, Serialize};

/// Outcome of one diagnostic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Success,
    Failed,
    Skipped,
    #[serde(other)]
    Other,
}

/// One entry of `ssm-cli get-diagnostics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiagnosticCheck {
    pub check: String,
    pub status: CheckStatus,
    #[serde(default)]
    pub note: String,
}

/// `ssm-cli get-diagnostics` payload: `{"DiagnosticsOutput":[...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticsOutput {
    #[serde(rename = "DiagnosticsOutput", default)]
    pub checks: Vec<DiagnosticCheck>,
}

impl DiagnosticsOutput {
    /// Checks with the given status, in report order.
    pub fn with_status(&self, status: CheckStatus) -> impl Iterator<Item = &DiagnosticCheck> {
        self.checks.iter().filter(move |c| c.status == status)
    }

    #[must_use]
    pub fn failed(&self) -> Vec<&DiagnosticCheck> {
        self.with_status(CheckStatus::Failed).collect()
    }
}
