pub mod agent;
pub mod api;
pub mod metadata;
pub mod types;

pub use agent::{CheckStatus, DiagnosticCheck, DiagnosticsOutput};
pub use api::{ActivationMessage, JobEnvelope, JobItem, WireError};
pub use metadata::{
    AzureAttestedDocument, AzureComputeMetadata, AzureIdentityToken, AzureInstanceIdentity,
    AzureTag, VendorData,
};
pub use types::{ResultLevel, ResultRecord};
