//! Shared test helpers for bootstrap service tests.
//!
//! Provides cross-platform `exit_status()`, output constructors, and a
//! scriptable `FakeHost` implementing every port.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{
    Clock, CommandLocator, CommandRunner, HttpClient, HttpResponse, LocalFs,
};
use crate::domain::TransportError;

/// Build an `ExitStatus` from a logical exit code (cross-platform).
#[cfg(unix)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    std::process::ExitStatus::from_raw(code as u32)
}

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn fail_output(code: i32) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: b"error: failed".to_vec(),
    }
}

pub fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        reason: String::new(),
        headers: Vec::new(),
        body: body.as_bytes().to_vec(),
    }
}

/// Scripted replies: each call pops the front; the last reply repeats.
struct Script<T>(VecDeque<T>);

impl<T: Clone> Script<T> {
    fn next(&mut self) -> Option<T> {
        if self.0.len() > 1 {
            self.0.pop_front()
        } else {
            self.0.front().cloned()
        }
    }
}

#[derive(Clone)]
enum CommandReply {
    Output(Output),
    SpawnError,
}

#[derive(Clone)]
enum HttpReply {
    Response(HttpResponse),
    TransportError,
}

/// In-memory host. Unscripted commands succeed with empty output;
/// unscripted HTTP requests fail the test.
#[derive(Default)]
pub struct FakeHost {
    commands: RefCell<HashMap<String, Script<CommandReply>>>,
    http: RefCell<HashMap<String, Script<HttpReply>>>,
    path: RefCell<HashSet<String>>,
    files: RefCell<HashMap<PathBuf, String>>,
    /// Every command line run, in order.
    pub runs: RefCell<Vec<String>>,
    /// Environment passed with each `run_with_env` call, by command line.
    pub envs: RefCell<Vec<(String, Vec<(String, String)>)>>,
    /// `"GET url"` / `"POST url"` / `"DOWNLOAD url"`, in order.
    pub requests: RefCell<Vec<String>>,
    /// Headers of every request, in order.
    pub request_headers: RefCell<Vec<Vec<(String, String)>>>,
    /// Paths written through `LocalFs::write`.
    pub writes: RefCell<Vec<PathBuf>>,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put programs on the fake `$PATH`.
    pub fn with_path(self, programs: &[&str]) -> Self {
        self.path
            .borrow_mut()
            .extend(programs.iter().map(|p| (*p).to_string()));
        self
    }

    pub fn with_command(self, command_line: &str, output: Output) -> Self {
        self.with_commands(command_line, vec![output])
    }

    pub fn with_commands(self, command_line: &str, outputs: Vec<Output>) -> Self {
        self.commands.borrow_mut().insert(
            command_line.to_string(),
            Script(outputs.into_iter().map(CommandReply::Output).collect()),
        );
        self
    }

    pub fn with_spawn_error(self, command_line: &str) -> Self {
        self.commands.borrow_mut().insert(
            command_line.to_string(),
            Script(VecDeque::from([CommandReply::SpawnError])),
        );
        self
    }

    pub fn with_get(self, url: &str, responses: Vec<HttpResponse>) -> Self {
        self.script_http("GET", url, responses)
    }

    pub fn with_post(self, url: &str, response: HttpResponse) -> Self {
        self.script_http("POST", url, vec![response])
    }

    pub fn with_download(self, url: &str, response: HttpResponse) -> Self {
        self.script_http("DOWNLOAD", url, vec![response])
    }

    pub fn with_transport_error(self, method: &str, url: &str) -> Self {
        self.http.borrow_mut().insert(
            format!("{method} {url}"),
            Script(VecDeque::from([HttpReply::TransportError])),
        );
        self
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.files
            .borrow_mut()
            .insert(PathBuf::from(path), content.to_string());
        self
    }

    fn script_http(self, method: &str, url: &str, responses: Vec<HttpResponse>) -> Self {
        self.http.borrow_mut().insert(
            format!("{method} {url}"),
            Script(responses.into_iter().map(HttpReply::Response).collect()),
        );
        self
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.borrow().get(Path::new(path)).cloned()
    }

    pub fn ran(&self, command_line: &str) -> bool {
        self.runs.borrow().iter().any(|c| c == command_line)
    }

    pub fn run_count(&self, command_line: &str) -> usize {
        self.runs.borrow().iter().filter(|c| *c == command_line).count()
    }

    pub fn requested(&self, request: &str) -> bool {
        self.requests.borrow().iter().any(|r| r == request)
    }

    fn reply(&self, program: &str, args: &[&str]) -> Result<Output> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.runs.borrow_mut().push(line.clone());
        let reply = self
            .commands
            .borrow_mut()
            .get_mut(&line)
            .and_then(Script::next);
        match reply {
            Some(CommandReply::Output(output)) => Ok(output),
            Some(CommandReply::SpawnError) => anyhow::bail!("failed to spawn {program}"),
            None => Ok(ok_output(b"")),
        }
    }

    fn http_reply(
        &self,
        method: &'static str,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let key = format!("{method} {url}");
        self.requests.borrow_mut().push(key.clone());
        self.request_headers.borrow_mut().push(
            headers
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        );
        let reply = self.http.borrow_mut().get_mut(&key).and_then(Script::next);
        match reply {
            Some(HttpReply::Response(r)) => Ok(r),
            Some(HttpReply::TransportError) => Err(TransportError {
                method,
                url: url.to_string(),
                reason: "connection refused".to_string(),
            }
            .into()),
            None => anyhow::bail!("unexpected request: {key}"),
        }
    }
}

impl CommandRunner for FakeHost {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.reply(program, args)
    }

    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<Output> {
        let output = self.reply(program, args);
        let line = self.runs.borrow().last().cloned().unwrap_or_default();
        self.envs.borrow_mut().push((
            line,
            env.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        ));
        output
    }
}

impl CommandLocator for FakeHost {
    fn command_exists(&self, program: &str) -> bool {
        self.path.borrow().contains(program)
    }
}

impl HttpClient for FakeHost {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        self.http_reply("GET", url, headers)
    }

    async fn post_json(
        &self,
        url: &str,
        _body: &serde_json::Value,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        self.http_reply("POST", url, headers)
    }

    async fn download(&self, url: &str, dir: &Path) -> Result<(HttpResponse, Option<PathBuf>)> {
        let response = self.http_reply("DOWNLOAD", url, &[])?;
        let path = response.is_ok().then(|| {
            dir.join(url.rsplit('/').next().unwrap_or("download"))
        });
        Ok((response, path))
    }
}

impl LocalFs for FakeHost {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such file: {}", path.display()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.writes.borrow_mut().push(path.to_path_buf());
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let content = self.read_to_string(from)?;
        self.files.borrow_mut().insert(to.to_path_buf(), content);
        Ok(())
    }

    fn create_dir_all(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn temp_dir(&self) -> Result<PathBuf> {
        Ok(PathBuf::from("/tmp/bootstrap-test"))
    }
}

impl Clock for FakeHost {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}
