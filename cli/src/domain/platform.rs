//! Platform identifiers, identity tokens, and the ignore-tag convention.
//!
//! Pure functions only: no I/O, no async.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::ConfigError;

/// Metadata tag/attribute that opts an instance out of agent bootstrap.
pub const IGNORE_TAG_KEY: &str = "rackspace-addon-ignore";

/// Platform identifier as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformName {
    Gcp,
    Azure,
    Vmware,
    Dedicated,
    /// Deprecated spelling of [`PlatformName::Openstack`].
    OpenstackFlex,
    Openstack,
}

impl PlatformName {
    pub const ALL: [Self; 6] = [
        Self::Gcp,
        Self::Azure,
        Self::Vmware,
        Self::Dedicated,
        Self::OpenstackFlex,
        Self::Openstack,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gcp => "gcp",
            Self::Azure => "azure",
            Self::Vmware => "vmware",
            Self::Dedicated => "dedicated",
            Self::OpenstackFlex => "openstack_flex",
            Self::Openstack => "openstack",
        }
    }

    #[must_use]
    pub fn is_deprecated(self) -> bool {
        self == Self::OpenstackFlex
    }

    /// The platform implementation this identifier selects.
    #[must_use]
    pub fn resolve(self) -> PlatformId {
        match self {
            Self::Gcp => PlatformId::Gcp,
            Self::Azure => PlatformId::Azure,
            Self::Vmware => PlatformId::Vmware,
            Self::Dedicated => PlatformId::Dedicated,
            Self::OpenstackFlex | Self::Openstack => PlatformId::Openstack,
        }
    }
}

impl fmt::Display for PlatformName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownPlatform(s.to_string()))
    }
}

/// A supported platform implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformId {
    Gcp,
    Azure,
    Vmware,
    Dedicated,
    Openstack,
}

impl PlatformId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gcp => "gcp",
            Self::Azure => "azure",
            Self::Vmware => "vmware",
            Self::Dedicated => "dedicated",
            Self::Openstack => "openstack",
        }
    }

    /// Path appended to the Platform Services base URL to request activation.
    #[must_use]
    pub fn activation_path(self) -> &'static str {
        match self {
            Self::Gcp => "/v1.0/instance/gcp/activate",
            Self::Azure => "/v1.0/instance/azure/activate",
            Self::Vmware | Self::Dedicated => "/v1.0/instance/activate",
            Self::Openstack => "/v2/instance/activate",
        }
    }

    /// Full activation URL for the given Platform Services base URL.
    #[must_use]
    pub fn activation_url(self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.activation_path())
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform-issued proof of identity. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token, trimming surrounding whitespace.
    ///
    /// Returns `None` when nothing is left after trimming.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials: keep them out of debug output.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(<{} bytes>)", self.0.len())
    }
}

/// Truthy tag values: `t`, `true`, `y`, `yes`, `1` (case-insensitive).
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "t" | "true" | "y" | "yes" | "1"
    )
}
