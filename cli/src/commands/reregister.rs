//! `agent-bootstrap reregister`: replace the agent's registration.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::bootstrap::{self, Success};
use crate::application::services::platform::Platform;
use crate::cli::ReregisterArgs;
use crate::commands::{map_transport, warn_if_deprecated};
use crate::domain::BootstrapError;

/// Run `agent-bootstrap reregister`.
///
/// # Errors
///
/// Returns the workflow's error; unreachable endpoints become
/// [`BootstrapError::ReregisterTransport`].
pub async fn run(app: &AppContext, args: ReregisterArgs) -> Result<Success> {
    warn_if_deprecated(args.platform);
    let platform = Platform::for_id(args.platform.resolve(), &app.config.timings);
    bootstrap::reregister(&app.host, &platform, &app.config)
        .await
        .map_err(|e| map_transport(e, BootstrapError::ReregisterTransport))
}
