//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod activation;
pub mod agent;
pub mod config;
pub mod distro;
pub mod error;
pub mod platform;
pub mod profile;
pub mod proxy;

pub use activation::Activation;
pub use agent::AgentRegistration;
pub use config::{BootstrapConfig, PollPolicy, Timings};
pub use distro::{DistroConfig, DistroId};
pub use error::{BootstrapError, CommandFailure, ConfigError, TransportError};
pub use platform::{PlatformId, PlatformName, Token, is_truthy};
pub use profile::ProfileChange;
pub use proxy::ProxySettings;
