//! Application service: distro detection and agent package lifecycle.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, HttpClient, LocalFs};
use crate::application::services::{command_line, run_checked};
use crate::domain::distro::{ReleaseFile, parse_os_release_id};
use crate::domain::{BootstrapError, DistroConfig, DistroId, TransportError};

/// Identify the local distribution from its release files.
///
/// # Errors
///
/// - [`BootstrapError::UnknownDistro`] when no release file identifies it
/// - [`BootstrapError::UnsupportedOs`] when it is not one we package for
pub fn resolve_distro(fs: &impl LocalFs) -> Result<DistroId> {
    for release in ReleaseFile::PRIORITY {
        let path = Path::new(release.path());
        if !fs.exists(path) {
            continue;
        }
        let distro = match release {
            ReleaseFile::Centos => DistroId::Centos.as_str().to_string(),
            ReleaseFile::Redhat => DistroId::Rhel.as_str().to_string(),
            ReleaseFile::OsRelease => {
                let content = fs
                    .read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                match parse_os_release_id(&content) {
                    Some(id) => id.to_string(),
                    None => continue,
                }
            }
        };
        tracing::debug!(file = release.path(), %distro, "found release file");
        return Ok(distro.parse::<DistroId>()?);
    }
    Err(BootstrapError::UnknownDistro.into())
}

/// Package tooling bound to the detected distribution.
#[derive(Debug, Clone, Copy)]
pub struct PackageManager {
    pub distro: DistroId,
    config: &'static DistroConfig,
}

impl PackageManager {
    #[must_use]
    pub fn new(distro: DistroId) -> Self {
        Self {
            distro,
            config: distro.config(),
        }
    }

    /// Detect the local distribution and bind its tooling.
    ///
    /// # Errors
    ///
    /// See [`resolve_distro`].
    pub fn detect(fs: &impl LocalFs) -> Result<Self> {
        resolve_distro(fs).map(Self::new)
    }

    /// Whether the agent package is installed. A failing detect command
    /// means "not installed".
    pub async fn is_installed(&self, runner: &impl CommandRunner) -> bool {
        let (program, args) = split(self.config.detect_cmd);
        tracing::debug!(
            command = %command_line(program, args),
            "checking if agent package is already installed"
        );
        match run_checked(runner, program, args).await {
            Ok(_) => true,
            Err(failure) => {
                tracing::debug!("package is not currently installed\n{failure}");
                false
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`BootstrapError::PackageInstallFailed`] on failure.
    pub async fn install(&self, runner: &impl CommandRunner, installer: &Path) -> Result<()> {
        let argv = self.config.install_args(&installer.display().to_string());
        let args: Vec<&str> = argv.iter().skip(1).map(String::as_str).collect();
        let program = argv.first().map_or("", String::as_str);
        let output = run_checked(runner, program, &args)
            .await
            .map_err(BootstrapError::PackageInstallFailed)?;
        tracing::debug!(
            output = %String::from_utf8_lossy(&output.stdout).trim_end(),
            "installed agent package"
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`BootstrapError::PackageUninstallFailed`] on failure.
    pub async fn uninstall(&self, runner: &impl CommandRunner) -> Result<()> {
        let (program, args) = split(self.config.uninstall_cmd);
        run_checked(runner, program, args)
            .await
            .map_err(BootstrapError::PackageUninstallFailed)?;
        tracing::debug!("uninstalled agent package");
        Ok(())
    }

    /// Download the installer into a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::InstallerDownloadFailed`] on a non-ok
    /// response or a body that could not be saved, or a `TransportError`
    /// if the server is unreachable.
    pub async fn download_installer(
        &self,
        host: &(impl HttpClient + LocalFs),
        region: Option<&str>,
    ) -> Result<PathBuf> {
        let url = self.config.installer_url(region);
        let dir = host.temp_dir()?;
        tracing::debug!(%url, dir = %dir.display(), "downloading agent package installer");
        let (response, path) = host.download(&url, &dir).await.map_err(|err| {
            if err.downcast_ref::<TransportError>().is_some() {
                err
            } else {
                BootstrapError::InstallerDownloadFailed {
                    url: url.clone(),
                    detail: format!("{err:#}"),
                }
                .into()
            }
        })?;
        if !response.is_ok() {
            return Err(BootstrapError::InstallerDownloadFailed {
                url,
                detail: response.dump(),
            }
            .into());
        }
        let path = path.ok_or_else(|| BootstrapError::InstallerDownloadFailed {
            url: url.clone(),
            detail: "no installer file was written".to_string(),
        })?;
        tracing::debug!(path = %path.display(), "download complete");
        Ok(path)
    }
}

fn split(argv: &'static [&'static str]) -> (&'static str, &'static [&'static str]) {
    match argv.split_first() {
        Some((program, args)) => (*program, args),
        None => ("", &[]),
    }
}
