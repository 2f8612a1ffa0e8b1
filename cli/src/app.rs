//! Application context: unified state passed to every command handler.
//!
//! `AppContext` bundles the production host adapters with the run
//! configuration so command handlers never construct infrastructure.

use anyhow::Result;

use crate::domain::BootstrapConfig;
use crate::infra::SystemHost;

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Production adapters for every port.
    pub host: SystemHost,
    pub config: BootstrapConfig,
}

impl AppContext {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be configured with the
    /// requested proxy.
    pub fn new(config: BootstrapConfig) -> Result<Self> {
        let host = SystemHost::new(config.proxy.as_ref())?;
        Ok(Self { host, config })
    }
}
