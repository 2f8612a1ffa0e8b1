//! Registration and diagnostics state reported by the installed agent.

use bootstrap_common::{DiagnosticCheck, DiagnosticsOutput};

/// Agent command-line tools.
pub const AGENT_BIN: &str = "amazon-ssm-agent";
pub const AGENT_CLI: &str = "ssm-cli";

/// Proof that the agent is registered: its instance-information payload.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRegistration {
    pub info: serde_json::Value,
}

impl AgentRegistration {
    /// Compact JSON used as result details.
    #[must_use]
    pub fn details(&self) -> String {
        self.info.to_string()
    }
}

/// Pretty-printed list of failed checks, `None` when every check passed or
/// was skipped.
#[must_use]
pub fn failed_checks_report(diagnostics: &DiagnosticsOutput) -> Option<String> {
    let failed: Vec<&DiagnosticCheck> = diagnostics.failed();
    if failed.is_empty() {
        return None;
    }
    serde_json::to_string_pretty(&failed).ok()
}
