//! Run configuration: API endpoint, proxy, and retry budgets.
//!
//! Pure data only: no I/O, no async.

use std::time::Duration;

use crate::domain::proxy::ProxySettings;

/// Platform Services API used unless overridden on the command line.
pub const DEFAULT_BASE_URL: &str = "https://add-ons.api.manage.rackspace.com";

/// Sent with the activation request.
pub const USER_AGENT: &str = "Rackspace-SSM-Bootstrap/2.0";

/// A bounded polling budget: at most `attempts` tries with `interval`
/// between consecutive tries (never after the last one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    #[must_use]
    pub const fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// Whether another attempt follows `attempt` (1-based).
    #[must_use]
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt < self.attempts
    }
}

/// Activation job polling: 10 attempts, 10 s apart.
pub const JOB_POLL: PollPolicy = PollPolicy::new(10, Duration::from_secs(10));

/// Token polling for VMware and OpenStack: 20 attempts, one minute apart.
pub const TOKEN_POLL: PollPolicy = PollPolicy::new(20, Duration::from_secs(60));

/// Default service status polling: 9 attempts, one second apart.
pub const SERVICE_STATUS_POLL: PollPolicy = PollPolicy::new(9, Duration::from_secs(1));

/// Wait between registration and verification.
pub const SETTLE_DELAY: Duration = Duration::from_secs(10);

/// Timing knobs for every polling loop of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub job: PollPolicy,
    pub token: PollPolicy,
    pub service_status: PollPolicy,
    pub settle: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            job: JOB_POLL,
            token: TOKEN_POLL,
            service_status: SERVICE_STATUS_POLL,
            settle: SETTLE_DELAY,
        }
    }
}

/// Everything a workflow needs to know about the current run.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Platform Services base URL.
    pub base_url: String,
    /// Proxy for HTTP traffic and for the registered agent.
    pub proxy: Option<ProxySettings>,
    pub timings: Timings,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy: None,
            timings: Timings::default(),
        }
    }
}
