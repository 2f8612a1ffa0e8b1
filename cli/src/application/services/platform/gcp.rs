//! Google Compute Engine: identity from the instance metadata server.

use anyhow::Result;

use crate::application::ports::HttpClient;
use crate::domain::{BootstrapError, Token, is_truthy, platform::IGNORE_TAG_KEY};

const METADATA_BASE_URL: &str = "http://metadata.google.internal/computeMetadata/v1/instance";

pub const IDENTITY_URL: &str = "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/identity?audience=platform.manage.rackspace.com&format=full";

const METADATA_HEADERS: &[(&str, &str)] = &[("Metadata-Flavor", "Google")];

#[derive(Debug, Clone, Copy, Default)]
pub struct Gcp;

/// URL of a custom instance metadata attribute.
#[must_use]
pub fn attribute_url(key: &str) -> String {
    format!("{METADATA_BASE_URL}/attributes/{key}")
}

impl Gcp {
    /// Fetch a signed instance identity JWT.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::GcpIdentityFailed`] on a non-ok or empty
    /// response.
    pub async fn token(&self, http: &impl HttpClient) -> Result<Token> {
        let response = http.get(IDENTITY_URL, METADATA_HEADERS).await?;
        if !response.is_ok() {
            return Err(BootstrapError::GcpIdentityFailed {
                url: IDENTITY_URL.to_string(),
                detail: response.dump(),
            }
            .into());
        }
        Token::new(&response.text()).ok_or_else(|| {
            BootstrapError::GcpIdentityFailed {
                url: IDENTITY_URL.to_string(),
                detail: "metadata server returned an empty identity token".to_string(),
            }
            .into()
        })
    }

    /// Read the ignore attribute. A missing attribute (404) means enabled.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::GcpMetadataFailed`] on any other non-ok
    /// response.
    pub async fn is_agent_disabled(&self, http: &impl HttpClient) -> Result<bool> {
        tracing::debug!(tag = IGNORE_TAG_KEY, "checking GCP metadata for ignore tag");
        let url = attribute_url(IGNORE_TAG_KEY);
        let response = http.get(&url, METADATA_HEADERS).await?;
        if response.is_ok() {
            return Ok(is_truthy(response.text().trim()));
        }
        if response.status == 404 {
            return Ok(false);
        }
        Err(BootstrapError::GcpMetadataFailed {
            url,
            detail: response.dump(),
        }
        .into())
    }
}
