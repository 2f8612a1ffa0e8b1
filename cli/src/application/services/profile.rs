//! Application service: agent profile configuration.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;
use crate::domain::profile::{
    AGENT_CONFIG_FILE, AGENT_CONFIG_TEMPLATE, ProfileChange, reconcile_share_profile,
};

/// Make the agent use the shared profile, creating its configuration from
/// the packaged template when needed.
///
/// Failures are logged and reported as [`ProfileChange::Unchanged`]; a
/// misconfigured profile must not abort the install.
pub fn configure_profile(fs: &impl LocalFs, config_dir: &Path) -> ProfileChange {
    match try_configure_profile(fs, config_dir) {
        Ok(change) => change,
        Err(e) => {
            tracing::error!("Failed to update agent configuration: {e:#}");
            ProfileChange::Unchanged
        }
    }
}

fn try_configure_profile(fs: &impl LocalFs, config_dir: &Path) -> Result<ProfileChange> {
    let config = config_dir.join(AGENT_CONFIG_FILE);
    if !fs.exists(&config) {
        let template = config_dir.join(AGENT_CONFIG_TEMPLATE);
        if !fs.exists(&template) {
            tracing::debug!(template = %template.display(), "agent template configuration file not found");
            return Ok(ProfileChange::Unchanged);
        }
        tracing::debug!("creating agent configuration file from template");
        fs.copy(&template, &config)
            .with_context(|| format!("failed to copy {}", template.display()))?;
    }

    let content = fs
        .read_to_string(&config)
        .with_context(|| format!("failed to read {}", config.display()))?;
    let mut document: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", config.display()))?;

    let change = reconcile_share_profile(&mut document)?;
    if change.is_updated() {
        let mut rendered = serde_json::to_string_pretty(&document)?;
        rendered.push('\n');
        fs.write(&config, &rendered)
            .with_context(|| format!("failed to write {}", config.display()))?;
        tracing::info!("Updated agent configuration to use the shared profile");
    } else {
        tracing::debug!("agent configuration already uses the shared profile");
    }
    Ok(change)
}
