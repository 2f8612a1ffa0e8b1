//! Platform token providers.
//!
//! Exactly one [`Platform`] is active per run. Each variant knows how to
//! prove the instance's identity to Platform Services and whether the
//! instance has opted out of agent bootstrap.

pub mod azure;
pub mod dedicated;
pub mod gcp;
pub mod openstack;
pub mod vmware;

use anyhow::Result;

use crate::application::ports::Host;
use crate::domain::{PlatformId, Timings, Token};

pub use azure::Azure;
pub use dedicated::Dedicated;
pub use gcp::Gcp;
pub use openstack::Openstack;
pub use vmware::Vmware;

/// The active platform and its token acquisition strategy.
#[derive(Debug, Clone)]
pub enum Platform {
    Gcp(Gcp),
    Azure(Azure),
    Vmware(Vmware),
    Dedicated(Dedicated),
    Openstack(Openstack),
}

impl Platform {
    /// Build the provider for `id`, taking token poll budgets from `timings`.
    #[must_use]
    pub fn for_id(id: PlatformId, timings: &Timings) -> Self {
        match id {
            PlatformId::Gcp => Self::Gcp(Gcp),
            PlatformId::Azure => Self::Azure(Azure),
            PlatformId::Vmware => Self::Vmware(Vmware { poll: timings.token }),
            PlatformId::Dedicated => Self::Dedicated(Dedicated::default()),
            PlatformId::Openstack => Self::Openstack(Openstack { poll: timings.token }),
        }
    }

    #[must_use]
    pub fn id(&self) -> PlatformId {
        match self {
            Self::Gcp(_) => PlatformId::Gcp,
            Self::Azure(_) => PlatformId::Azure,
            Self::Vmware(_) => PlatformId::Vmware,
            Self::Dedicated(_) => PlatformId::Dedicated,
            Self::Openstack(_) => PlatformId::Openstack,
        }
    }

    #[must_use]
    pub fn activation_url(&self, base_url: &str) -> String {
        self.id().activation_url(base_url)
    }

    /// Acquire the identity token, polling where the platform requires it.
    ///
    /// # Errors
    ///
    /// Returns the platform's `BootstrapError` on fatal failures, or a
    /// `TransportError` when a metadata endpoint is unreachable.
    pub async fn token(&self, host: &impl Host) -> Result<Token> {
        match self {
            Self::Gcp(p) => p.token(host).await,
            Self::Azure(p) => p.token(host).await,
            Self::Vmware(p) => p.token(host).await,
            Self::Dedicated(p) => p.token(host),
            Self::Openstack(p) => p.token(host).await,
        }
    }

    /// Whether the instance carries a truthy ignore tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform metadata cannot be read.
    pub async fn is_agent_disabled(&self, host: &impl Host) -> Result<bool> {
        match self {
            Self::Gcp(p) => p.is_agent_disabled(host).await,
            Self::Azure(p) => p.is_agent_disabled(host).await,
            Self::Vmware(_) | Self::Dedicated(_) | Self::Openstack(_) => {
                tracing::debug!(
                    platform = %self.id(),
                    "platform does not support bypassing agent bootstrap using tags"
                );
                Ok(false)
            }
        }
    }
}
