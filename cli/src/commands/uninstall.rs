//! `agent-bootstrap uninstall`: clear the registration and remove the agent.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::bootstrap::{self, Success};

/// Run `agent-bootstrap uninstall`.
///
/// # Errors
///
/// Returns the workflow's error.
pub async fn run(app: &AppContext) -> Result<Success> {
    bootstrap::uninstall(&app.host).await
}
