//! Activation credentials issued by Platform Services.

use bootstrap_common::ActivationMessage;

/// Credentials authorizing exactly one agent registration.
///
/// Not `Clone`: registration takes it by value so it cannot be replayed.
#[derive(Debug, PartialEq, Eq)]
pub struct Activation {
    pub code: String,
    pub id: String,
    pub region: String,
    pub system_account: String,
}

impl From<ActivationMessage> for Activation {
    fn from(msg: ActivationMessage) -> Self {
        Self {
            code: msg.activation_code,
            id: msg.activation_id,
            region: msg.region,
            system_account: msg.system_account,
        }
    }
}

impl Activation {
    /// Arguments for `amazon-ssm-agent` that register with these credentials.
    #[must_use]
    pub fn register_args(self) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-register".to_string(),
            "-code".to_string(),
            self.code,
            "-id".to_string(),
            self.id,
            "-region".to_string(),
            self.region,
        ]
    }
}
