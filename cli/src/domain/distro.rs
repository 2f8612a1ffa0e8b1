//! Supported Linux distributions and their package tooling.
//!
//! Pure functions only: no I/O, no async.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::BootstrapError;

/// Name of the agent package and of its OS service.
pub const AGENT_PACKAGE: &str = "amazon-ssm-agent";

/// Release files checked, in priority order, to identify the distribution.
pub const CENTOS_RELEASE: &str = "/etc/centos-release";
pub const REDHAT_RELEASE: &str = "/etc/redhat-release";
pub const OS_RELEASE: &str = "/etc/os-release";

const REGION_PLACEHOLDER: &str = "{region}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistroId {
    Ubuntu,
    Debian,
    Rhel,
    Centos,
    Sles,
}

impl DistroId {
    pub const ALL: [Self; 5] = [
        Self::Ubuntu,
        Self::Debian,
        Self::Rhel,
        Self::Centos,
        Self::Sles,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ubuntu => "ubuntu",
            Self::Debian => "debian",
            Self::Rhel => "rhel",
            Self::Centos => "centos",
            Self::Sles => "sles",
        }
    }

    /// Package tooling for this distribution.
    #[must_use]
    pub fn config(self) -> &'static DistroConfig {
        match self {
            Self::Ubuntu | Self::Debian => &DEBIAN_FAMILY,
            Self::Rhel | Self::Centos => &RHEL_FAMILY,
            Self::Sles => &SLES,
        }
    }
}

impl fmt::Display for DistroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistroId {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| BootstrapError::UnsupportedOs {
                distro: s.to_string(),
            })
    }
}

/// Package tooling for one distribution family.
///
/// Commands are argv vectors; the install command takes the installer path
/// as its final argument.
#[derive(Debug, PartialEq, Eq)]
pub struct DistroConfig {
    pub default_installer_url: &'static str,
    /// Installer URL containing `{region}` placeholders.
    pub regional_installer_url: &'static str,
    pub install_cmd: &'static [&'static str],
    pub uninstall_cmd: &'static [&'static str],
    pub detect_cmd: &'static [&'static str],
}

static DEBIAN_FAMILY: DistroConfig = DistroConfig {
    default_installer_url: "https://s3.amazonaws.com/ec2-downloads-windows/SSMAgent/latest/debian_amd64/amazon-ssm-agent.deb",
    regional_installer_url: "https://amazon-ssm-{region}.s3.{region}.amazonaws.com/latest/debian_amd64/amazon-ssm-agent.deb",
    install_cmd: &["dpkg", "-i"],
    uninstall_cmd: &["dpkg", "-r", AGENT_PACKAGE],
    detect_cmd: &["dpkg", "-l", AGENT_PACKAGE],
};

static RHEL_FAMILY: DistroConfig = DistroConfig {
    default_installer_url: "https://s3.amazonaws.com/ec2-downloads-windows/SSMAgent/latest/linux_amd64/amazon-ssm-agent.rpm",
    regional_installer_url: "https://amazon-ssm-{region}.s3.{region}.amazonaws.com/latest/linux_amd64/amazon-ssm-agent.rpm",
    install_cmd: &["yum", "install", "-y"],
    uninstall_cmd: &["yum", "remove", "-y", AGENT_PACKAGE],
    detect_cmd: &["yum", "list", "installed", AGENT_PACKAGE],
};

static SLES: DistroConfig = DistroConfig {
    default_installer_url: "https://s3.amazonaws.com/ec2-downloads-windows/SSMAgent/latest/linux_amd64/amazon-ssm-agent.rpm",
    regional_installer_url: "https://amazon-ssm-{region}.s3.{region}.amazonaws.com/latest/linux_amd64/amazon-ssm-agent.rpm",
    install_cmd: &["rpm", "--install"],
    uninstall_cmd: &["rpm", "-e", AGENT_PACKAGE],
    detect_cmd: &["rpm", "-q", AGENT_PACKAGE],
};

impl DistroConfig {
    /// Installer URL, regional when `region` is given.
    #[must_use]
    pub fn installer_url(&self, region: Option<&str>) -> String {
        match region {
            Some(region) => self.regional_installer_url.replace(REGION_PLACEHOLDER, region),
            None => self.default_installer_url.to_string(),
        }
    }

    /// Install argv for the given installer path.
    #[must_use]
    pub fn install_args(&self, installer: &str) -> Vec<String> {
        self.install_cmd
            .iter()
            .map(|s| (*s).to_string())
            .chain(std::iter::once(installer.to_string()))
            .collect()
    }
}

/// Which release file identified the distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseFile {
    Centos,
    Redhat,
    OsRelease,
}

impl ReleaseFile {
    pub const PRIORITY: [Self; 3] = [Self::Centos, Self::Redhat, Self::OsRelease];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Centos => CENTOS_RELEASE,
            Self::Redhat => REDHAT_RELEASE,
            Self::OsRelease => OS_RELEASE,
        }
    }
}

/// Value of the `ID=` line of an os-release file, unquoted.
#[must_use]
pub fn parse_os_release_id(content: &str) -> Option<&str> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("ID="))
        .map(|v| v.trim().trim_matches('"').trim_matches('\''))
        .filter(|v| !v.is_empty())
}
