//! `agent-bootstrap install`: install, configure and register the agent.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::bootstrap::{self, InstallOptions, Success};
use crate::application::services::platform::Platform;
use crate::cli::InstallArgs;
use crate::commands::{map_transport, warn_if_deprecated};
use crate::domain::BootstrapError;

/// Run `agent-bootstrap install`.
///
/// # Errors
///
/// Returns the workflow's error; unreachable endpoints become
/// [`BootstrapError::InstallTransport`].
pub async fn run(app: &AppContext, args: InstallArgs) -> Result<Success> {
    warn_if_deprecated(args.platform);
    let platform = Platform::for_id(args.platform.resolve(), &app.config.timings);
    let opts = InstallOptions {
        platform: &platform,
        installer_region: args.installer_download_region.as_deref(),
        config: &app.config,
    };
    bootstrap::install(&app.host, opts)
        .await
        .map_err(|e| map_transport(e, BootstrapError::InstallTransport))
}
