//! Infrastructure implementation of the `HttpClient` port over `ureq`.
//!
//! `ureq` is blocking, so every request runs on `spawn_blocking` and is
//! awaited immediately. Non-success statuses come back as responses;
//! connection-level failures become `TransportError`.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use crate::application::ports::{HttpClient, HttpResponse};
use crate::domain::{ProxySettings, TransportError};

pub const GET_TIMEOUT: Duration = Duration::from_secs(10);
pub const POST_TIMEOUT: Duration = Duration::from_secs(15);
/// Applies to each connect and each socket read, not the whole transfer.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Largest response body accepted (installer packages included).
const MAX_BODY_BYTES: u64 = 256 * 1024 * 1024;

/// Production `HttpClient`, optionally tunnelled through a proxy.
#[derive(Clone)]
pub struct UreqHttpClient {
    agent: ureq::Agent,
    download_agent: ureq::Agent,
}

impl UreqHttpClient {
    /// # Errors
    ///
    /// Returns an error if `ureq` rejects the proxy URI.
    pub fn new(proxy: Option<&ProxySettings>) -> Result<Self> {
        let mut builder = ureq::AgentBuilder::new();
        let mut download_builder = ureq::AgentBuilder::new()
            .timeout_connect(DOWNLOAD_TIMEOUT)
            .timeout_read(DOWNLOAD_TIMEOUT);
        if let Some(proxy) = proxy {
            let proxy = ureq::Proxy::new(proxy.uri())
                .with_context(|| format!("invalid proxy {proxy}"))?;
            builder = builder.proxy(proxy.clone());
            download_builder = download_builder.proxy(proxy);
        }
        Ok(Self {
            agent: builder.build(),
            download_agent: download_builder.build(),
        })
    }

    async fn send(&self, request: Request) -> Result<HttpResponse> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || request.execute(&agent))
            .await
            .context("HTTP worker task failed")?
    }
}

/// An owned request, movable into a blocking task.
struct Request {
    method: &'static str,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    /// Deadline for the whole exchange; `None` leaves the agent's limits.
    timeout: Option<Duration>,
}

impl Request {
    fn new(
        method: &'static str,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            method,
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            body: None,
            timeout,
        }
    }

    fn transport_error(&self, reason: String) -> anyhow::Error {
        TransportError {
            method: self.method,
            url: self.url.clone(),
            reason,
        }
        .into()
    }

    /// Send the request. Status errors still yield the response.
    fn call(&self, agent: &ureq::Agent) -> Result<ureq::Response> {
        tracing::debug!(method = self.method, url = %self.url, "sending HTTP request");
        let mut request = agent.request(self.method, &self.url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        for (name, value) in &self.headers {
            request = request.set(name, value);
        }
        let result = match &self.body {
            Some(body) => request
                .set("Content-Type", "application/json")
                .send_bytes(body),
            None => request.call(),
        };
        match result {
            Ok(response) | Err(ureq::Error::Status(_, response)) => Ok(response),
            Err(ureq::Error::Transport(transport)) => {
                Err(self.transport_error(transport.to_string()))
            }
        }
    }

    fn execute(self, agent: &ureq::Agent) -> Result<HttpResponse> {
        let response = self.call(agent)?;
        read_response(response).map_err(|e| self.transport_error(format!("{e:#}")))
    }

    /// Stream a successful body into `target`. Error bodies are read into
    /// the response and no file is written.
    fn download_to(
        self,
        agent: &ureq::Agent,
        target: &Path,
    ) -> Result<(HttpResponse, Option<PathBuf>)> {
        let response = self.call(agent)?;
        let head = response_head(&response);
        if !head.is_ok() {
            let response =
                read_response(response).map_err(|e| self.transport_error(format!("{e:#}")))?;
            return Ok((response, None));
        }
        let mut file = std::fs::File::create(target)
            .with_context(|| format!("creating {}", target.display()))?;
        let copied = copy_capped(response.into_reader(), &mut file, MAX_BODY_BYTES);
        drop(file);
        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(err) => {
                let _ = std::fs::remove_file(target);
                return Err(match err {
                    CopyError::Read(e) => self.transport_error(e.to_string()),
                    CopyError::Write(e) => anyhow::Error::new(e)
                        .context(format!("writing {}", target.display())),
                    CopyError::TooLarge => anyhow::anyhow!(
                        "download from {} exceeds {MAX_BODY_BYTES} bytes",
                        self.url
                    ),
                });
            }
        };
        tracing::debug!(path = %target.display(), bytes, "download written");
        Ok((head, Some(target.to_path_buf())))
    }
}

/// Status line and headers of `response`, with an empty body.
fn response_head(response: &ureq::Response) -> HttpResponse {
    let headers = response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            let value = response.header(&name)?.to_string();
            Some((name.to_ascii_lowercase(), value))
        })
        .collect();
    HttpResponse {
        status: response.status(),
        reason: response.status_text().to_string(),
        headers,
        body: Vec::new(),
    }
}

fn read_response(response: ureq::Response) -> Result<HttpResponse> {
    let mut head = response_head(&response);
    match copy_capped(response.into_reader(), &mut head.body, MAX_BODY_BYTES) {
        Ok(_) => Ok(head),
        Err(CopyError::TooLarge) => anyhow::bail!("response body exceeds {MAX_BODY_BYTES} bytes"),
        Err(CopyError::Read(e) | CopyError::Write(e)) => {
            Err(anyhow::Error::new(e).context("reading response body"))
        }
    }
}

#[derive(Debug)]
enum CopyError {
    Read(std::io::Error),
    Write(std::io::Error),
    TooLarge,
}

/// Copy at most `limit` bytes. A source holding more is an error, never a
/// silent truncation.
fn copy_capped(
    reader: impl Read,
    writer: &mut impl Write,
    limit: u64,
) -> std::result::Result<u64, CopyError> {
    let mut reader = reader.take(limit.saturating_add(1));
    let mut buf = [0u8; 64 * 1024];
    let mut copied = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        copied += n as u64;
        if copied > limit {
            return Err(CopyError::TooLarge);
        }
        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
    }
    writer.flush().map_err(CopyError::Write)?;
    Ok(copied)
}

/// File name for a download: the last non-empty URL path segment.
fn file_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|url| {
            url.path_segments()?
                .rfind(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "download".to_string())
}

impl HttpClient for UreqHttpClient {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        self.send(Request::new("GET", url, headers, Some(GET_TIMEOUT)))
            .await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let mut request = Request::new("POST", url, headers, Some(POST_TIMEOUT));
        request.body = Some(serde_json::to_vec(body).context("encoding request body")?);
        self.send(request).await
    }

    async fn download(&self, url: &str, dir: &Path) -> Result<(HttpResponse, Option<PathBuf>)> {
        let agent = self.download_agent.clone();
        let request = Request::new("GET", url, &[], None);
        let target = dir.join(file_name(url));
        tokio::task::spawn_blocking(move || request.download_to(&agent, &target))
            .await
            .context("download task failed")?
    }
}
