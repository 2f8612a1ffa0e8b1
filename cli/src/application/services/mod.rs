//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod activation;
pub mod agent;
pub mod agent_service;
pub mod bootstrap;
pub mod package;
pub mod platform;
pub mod profile;

#[cfg(test)]
pub(crate) mod test_support;

use std::process::Output;

use crate::application::ports::CommandRunner;
use crate::domain::CommandFailure;

/// `program arg1 arg2` for logs and error reports.
pub(crate) fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Combined stdout and stderr of a finished command.
pub(crate) fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

/// Run a command that must exit successfully.
///
/// Spawn errors and non-zero exits both come back as a [`CommandFailure`]
/// so the caller can wrap them in the matching `BootstrapError`.
pub(crate) async fn run_checked(
    runner: &impl CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<Output, CommandFailure> {
    run_checked_with_env(runner, program, args, &[]).await
}

pub(crate) async fn run_checked_with_env(
    runner: &impl CommandRunner,
    program: &str,
    args: &[&str],
    env: &[(&str, &str)],
) -> Result<Output, CommandFailure> {
    let command = command_line(program, args);
    tracing::debug!(%command, "running command");
    let result = if env.is_empty() {
        runner.run(program, args).await
    } else {
        runner.run_with_env(program, args, env).await
    };
    match result {
        Ok(output) if output.status.success() => Ok(output),
        Ok(output) => Err(CommandFailure {
            command,
            code: output.status.code(),
            output: combined_output(&output),
        }),
        Err(e) => Err(CommandFailure {
            command,
            code: None,
            output: format!("{e:#}"),
        }),
    }
}
