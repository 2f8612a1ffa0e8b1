//! Agent profile reconciliation for `amazon-ssm-agent.json`.
//!
//! Pure functions only: the application layer does the file I/O.

use serde_json::{Map, Value};

use crate::domain::error::ProfileError;

pub const AGENT_CONFIG_DIR: &str = "/etc/amazon/ssm";
pub const AGENT_CONFIG_FILE: &str = "amazon-ssm-agent.json";
pub const AGENT_CONFIG_TEMPLATE: &str = "amazon-ssm-agent.json.template";

/// Value `Profile.ShareProfile` must hold.
pub const REQUIRED_SHARE_PROFILE: &str = "rackspace";

/// Whether reconciliation modified the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileChange {
    Updated,
    Unchanged,
}

impl ProfileChange {
    #[must_use]
    pub fn is_updated(self) -> bool {
        self == Self::Updated
    }
}

/// Ensure `Profile.ShareProfile` equals [`REQUIRED_SHARE_PROFILE`].
///
/// Creates the `Profile` section when missing and leaves every other key
/// untouched.
///
/// # Errors
///
/// Returns an error if the document root or an existing `Profile` is not a
/// JSON object.
pub fn reconcile_share_profile(config: &mut Value) -> Result<ProfileChange, ProfileError> {
    let root = config
        .as_object_mut()
        .ok_or(ProfileError::NotAnObject("<root>"))?;
    let profile = root
        .entry("Profile")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or(ProfileError::NotAnObject("Profile"))?;

    if profile.get("ShareProfile").and_then(Value::as_str) == Some(REQUIRED_SHARE_PROFILE) {
        return Ok(ProfileChange::Unchanged);
    }
    profile.insert(
        "ShareProfile".to_string(),
        Value::String(REQUIRED_SHARE_PROFILE.to_string()),
    );
    Ok(ProfileChange::Updated)
}
