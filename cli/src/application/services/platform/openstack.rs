//! OpenStack: identity published in the vendordata document.

use anyhow::Result;
use bootstrap_common::VendorData;

use crate::application::ports::{Clock, HttpClient};
use crate::domain::{BootstrapError, PollPolicy, Token};

pub const VENDORDATA_URL: &str = "http://169.254.169.254/openstack/latest/vendor_data2.json";

#[derive(Debug, Clone, Copy)]
pub struct Openstack {
    pub poll: PollPolicy,
}

impl Openstack {
    /// Poll vendordata until Platform Services has published a token.
    ///
    /// # Errors
    ///
    /// Every failure is [`BootstrapError::OpenStackToken`]: a non-ok or
    /// malformed response, an upstream error message, or exhaustion.
    pub async fn token(&self, host: &(impl HttpClient + Clock)) -> Result<Token> {
        for attempt in 1..=self.poll.attempts {
            tracing::debug!(attempt, url = VENDORDATA_URL, "getting OpenStack vendordata");
            let response = host.get(VENDORDATA_URL, &[]).await?;
            if !response.is_ok() {
                return Err(openstack_error(format!(
                    "GET request to vendordata url {VENDORDATA_URL} failed: {}",
                    response.dump()
                )));
            }
            let vendordata: VendorData = response
                .json()
                .map_err(|e| openstack_error(format!("Malformed vendordata: {e:#}")))?;
            if let Some(token) = vendordata.token().and_then(Token::new) {
                return Ok(token);
            }
            if let Some(message) = vendordata.error_message() {
                tracing::debug!(%message, "vendordata API reported an error");
                return Err(openstack_error(format!("Reason: {message}")));
            }
            tracing::debug!("no token found in vendordata yet");
            if self.poll.has_next(attempt) {
                host.sleep(self.poll.interval).await;
            }
        }
        Err(openstack_error(format!(
            "Could not retrieve token after {} attempts. This is likely caused by an outage \
             in the Platform Services API. Please try again later.",
            self.poll.attempts
        )))
    }
}

fn openstack_error(reason: String) -> anyhow::Error {
    BootstrapError::OpenStackToken { reason }.into()
}
