//! HTTP proxy settings and the agent service override that carries them.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::domain::error::ConfigError;

/// systemd drop-in directory for the agent service.
pub const SERVICE_OVERRIDE_DIR: &str = "/etc/systemd/system/amazon-ssm-agent.service.d";
pub const SERVICE_OVERRIDE_FILE: &str = "override.conf";

/// Address excluded from proxying so the agent can still reach the
/// instance metadata service.
pub const NO_PROXY: &str = "169.254.169.254";

const SCHEMES: &[&str] = &["http", "https", "socks5"];

/// A validated proxy URI such as `http://proxy.example.com:8080`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    uri: String,
    host: String,
    port: Option<u16>,
}

impl ProxySettings {
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Environment applied to the single child process that needs the proxy.
    #[must_use]
    pub fn env(&self) -> [(&'static str, &str); 2] {
        [("http_proxy", &self.uri), ("https_proxy", &self.uri)]
    }

    /// Content of the agent's systemd override file.
    #[must_use]
    pub fn service_override(&self) -> String {
        format!(
            "[Service]\n\
             Environment=\"http_proxy={uri}\"\n\
             Environment=\"https_proxy={uri}\"\n\
             Environment=\"no_proxy={NO_PROXY}\"\n",
            uri = self.uri
        )
    }
}

impl fmt::Display for ProxySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl FromStr for ProxySettings {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ConfigError::InvalidProxy {
            value: s.to_string(),
            reason,
        };
        let url = Url::parse(s.trim()).map_err(|e| invalid(e.to_string()))?;
        if !SCHEMES.contains(&url.scheme()) {
            return Err(invalid(format!(
                "unsupported scheme '{}', expected http, https or socks5",
                url.scheme()
            )));
        }
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host".to_string()))?;
        let port = url.port_or_known_default();

        // Path, query and fragment carry no meaning for a proxy.
        let mut uri = format!("{}://", url.scheme());
        if !url.username().is_empty() {
            uri.push_str(url.username());
            if let Some(password) = url.password() {
                uri.push(':');
                uri.push_str(password);
            }
            uri.push('@');
        }
        uri.push_str(host);
        if let Some(port) = port {
            uri.push_str(&format!(":{port}"));
        }

        Ok(Self {
            uri,
            host: host.to_string(),
            port,
        })
    }
}
