//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

// ── Value Types ───────────────────────────────────────────────────────────────

/// A fully-read HTTP response.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    /// Header names are stored lowercase.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Statuses up to 202 are treated as success by every caller.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status <= 202
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).context("response body is not the expected JSON")
    }

    /// `"404 Not Found"`.
    #[must_use]
    pub fn full_status(&self) -> String {
        format!("{} {}", self.status, self.reason).trim_end().to_string()
    }

    /// Status, headers and body for error reports.
    #[must_use]
    pub fn dump(&self) -> String {
        let headers = self
            .headers
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{}\nHTTP Response:\n{{{headers}}}\n{}",
            self.full_status(),
            self.text()
        )
    }
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// A command that runs and exits non-zero is `Ok` with a failing status;
/// `Err` is reserved for commands that could not be run at all.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with extra environment variables set for that child only.
    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<Output>;
}

/// Abstracts `$PATH` lookups.
pub trait CommandLocator {
    /// Returns `true` if `program` resolves to an executable on `$PATH`.
    fn command_exists(&self, program: &str) -> bool;
}

// ── HTTP Port ─────────────────────────────────────────────────────────────────

/// Abstracts HTTP access (metadata services, Platform Services, downloads).
///
/// Non-success statuses are returned as responses; only connection-level
/// failures are errors, carrying a `domain::TransportError`.
#[allow(async_fn_in_trait)]
pub trait HttpClient {
    /// `GET url` with extra request headers.
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse>;
    /// `POST url` with a JSON body.
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse>;
    /// Download `url` into `dir`, naming the file after the last path segment.
    ///
    /// Returns the written path when the response was successful; the
    /// body is then in the file and the returned response's body is empty.
    async fn download(&self, url: &str, dir: &Path) -> Result<(HttpResponse, Option<PathBuf>)>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Abstracts the few filesystem primitives the workflows need.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    /// Create a fresh, persistent temporary directory.
    fn temp_dir(&self) -> Result<PathBuf>;
}

// ── Clock Port ────────────────────────────────────────────────────────────────

/// Abstracts waiting so polling loops can be tested without real delays.
#[allow(async_fn_in_trait)]
pub trait Clock {
    async fn sleep(&self, duration: Duration);
}

// ── Composite ─────────────────────────────────────────────────────────────────

/// Everything a bootstrap workflow touches on the host.
pub trait Host: CommandRunner + CommandLocator + HttpClient + LocalFs + Clock {}

/// Blanket implementation: any type implementing all sub-traits is a `Host`.
impl<T> Host for T where T: CommandRunner + CommandLocator + HttpClient + LocalFs + Clock {}
