//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, `$PATH`
//! lookups, HTTP, filesystem access, and timers.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod clock;
pub mod command_runner;
pub mod fs;
pub mod http;

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{
    Clock, CommandLocator, CommandRunner, HttpClient, HttpResponse, LocalFs,
};
use crate::domain::ProxySettings;
use clock::TokioClock;
use command_runner::{PathLocator, TokioCommandRunner};
use fs::StdFs;
use http::UreqHttpClient;

/// The real host: every port backed by its production adapter.
pub struct SystemHost {
    runner: TokioCommandRunner,
    http: UreqHttpClient,
}

impl SystemHost {
    /// # Errors
    ///
    /// Returns an error if the HTTP client rejects the proxy.
    pub fn new(proxy: Option<&ProxySettings>) -> Result<Self> {
        Ok(Self {
            runner: TokioCommandRunner::default(),
            http: UreqHttpClient::new(proxy)?,
        })
    }
}

impl CommandRunner for SystemHost {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.runner.run(program, args).await
    }

    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<Output> {
        self.runner.run_with_env(program, args, env).await
    }
}

impl CommandLocator for SystemHost {
    fn command_exists(&self, program: &str) -> bool {
        PathLocator.command_exists(program)
    }
}

impl HttpClient for SystemHost {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        self.http.get(url, headers).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        self.http.post_json(url, body, headers).await
    }

    async fn download(&self, url: &str, dir: &Path) -> Result<(HttpResponse, Option<PathBuf>)> {
        self.http.download(url, dir).await
    }
}

impl LocalFs for SystemHost {
    fn exists(&self, path: &Path) -> bool {
        StdFs.exists(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        StdFs.read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        StdFs.write(path, content)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        StdFs.copy(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        StdFs.create_dir_all(path)
    }

    fn temp_dir(&self) -> Result<PathBuf> {
        StdFs.temp_dir()
    }
}

impl Clock for SystemHost {
    async fn sleep(&self, duration: Duration) {
        TokioClock.sleep(duration).await;
    }
}
