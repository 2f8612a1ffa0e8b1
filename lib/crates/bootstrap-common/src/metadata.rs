//! Cloud metadata service payloads (Azure IMDS, OpenStack vendordata).

use serde::{Deserialize, Serialize};

/// Subset of `GET /metadata/instance/compute` used for identity and tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureComputeMetadata {
    pub location: String,
    pub name: String,
    pub subscription_id: String,
    pub vm_id: String,
    #[serde(default)]
    pub vm_scale_set_name: String,
    #[serde(default)]
    pub tags_list: Vec<AzureTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureTag {
    pub name: String,
    pub value: String,
}

impl AzureComputeMetadata {
    /// Value of the first tag named `key`, if any.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags_list
            .iter()
            .find(|t| t.name == key)
            .map(|t| t.value.as_str())
    }
}

/// `GET /metadata/attested/document`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureAttestedDocument {
    pub signature: String,
    pub encoding: String,
}

/// Token sent to Platform Services for Azure instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureIdentityToken {
    pub instance: AzureInstanceIdentity,
    pub signature: String,
    pub encoding: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureInstanceIdentity {
    pub location: String,
    pub name: String,
    pub subscription_id: String,
    pub vm_id: String,
    pub vm_scale_set_name: String,
}

impl AzureIdentityToken {
    #[must_use]
    pub fn new(metadata: &AzureComputeMetadata, attested: AzureAttestedDocument) -> Self {
        Self {
            instance: AzureInstanceIdentity {
                location: metadata.location.clone(),
                name: metadata.name.clone(),
                subscription_id: metadata.subscription_id.clone(),
                vm_id: metadata.vm_id.clone(),
                vm_scale_set_name: metadata.vm_scale_set_name.clone(),
            },
            signature: attested.signature,
            encoding: attested.encoding,
        }
    }
}

/// `GET /openstack/latest/vendor_data2.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorData {
    #[serde(default)]
    pub platform_services: Option<PlatformServicesVendorData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformServicesVendorData {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub error: Option<VendorDataError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorDataError {
    #[serde(default)]
    pub message: Option<String>,
}

impl VendorData {
    /// Non-empty token published for this instance.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.platform_services
            .as_ref()
            .and_then(|p| p.token.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    /// Error reported by the upstream token issuer.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.platform_services
            .as_ref()
            .and_then(|p| p.error.as_ref())
            .and_then(|e| e.message.as_deref())
            .filter(|m| !m.is_empty())
    }
}
