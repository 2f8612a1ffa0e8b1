//! Azure: identity built from instance metadata plus the attested document.

use anyhow::{Context, Result};
use bootstrap_common::{AzureAttestedDocument, AzureComputeMetadata, AzureIdentityToken};

use crate::application::ports::HttpClient;
use crate::domain::{BootstrapError, Token, is_truthy, platform::IGNORE_TAG_KEY};

pub const INSTANCE_URL: &str =
    "http://169.254.169.254/metadata/instance/compute?api-version=2021-01-01&format=json";
pub const ATTEST_URL: &str =
    "http://169.254.169.254/metadata/attested/document?api-version=2021-01-01";

const METADATA_HEADERS: &[(&str, &str)] = &[("Metadata", "true")];

#[derive(Debug, Clone, Copy, Default)]
pub struct Azure;

impl Azure {
    /// Combine instance metadata and the attested document into a JSON token.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::AzureInstanceMetadataFailed`] or
    /// [`BootstrapError::AzureAttestFailed`] when either document cannot be
    /// fetched or lacks a required field.
    pub async fn token(&self, http: &impl HttpClient) -> Result<Token> {
        let metadata = compute_metadata(http).await?;
        let attested = attested_document(http).await?;
        let token = serde_json::to_string(&AzureIdentityToken::new(&metadata, attested))
            .context("failed to encode Azure identity token")?;
        Token::new(&token).context("Azure identity token is empty")
    }

    /// Look up the ignore tag in the instance's `tagsList`.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::AzureInstanceMetadataFailed`] when instance
    /// metadata is unavailable.
    pub async fn is_agent_disabled(&self, http: &impl HttpClient) -> Result<bool> {
        tracing::debug!(tag = IGNORE_TAG_KEY, "checking Azure metadata for ignore tag");
        let metadata = compute_metadata(http).await?;
        Ok(metadata.tag(IGNORE_TAG_KEY).is_some_and(is_truthy))
    }
}

async fn compute_metadata(http: &impl HttpClient) -> Result<AzureComputeMetadata> {
    let response = http.get(INSTANCE_URL, METADATA_HEADERS).await?;
    let fail = |detail: String| BootstrapError::AzureInstanceMetadataFailed {
        url: INSTANCE_URL.to_string(),
        detail,
    };
    if !response.is_ok() {
        return Err(fail(response.dump()).into());
    }
    response
        .json()
        .map_err(|e| fail(format!("{e:#}")).into())
}

async fn attested_document(http: &impl HttpClient) -> Result<AzureAttestedDocument> {
    let response = http.get(ATTEST_URL, METADATA_HEADERS).await?;
    let fail = |detail: String| BootstrapError::AzureAttestFailed {
        url: ATTEST_URL.to_string(),
        detail,
    };
    if !response.is_ok() {
        return Err(fail(response.dump()).into());
    }
    response
        .json()
        .map_err(|e| fail(format!("{e:#}")).into())
}
