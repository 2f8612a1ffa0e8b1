//! VMware: identity from the `guestinfo.machine.id` guest variable.

use anyhow::Result;

use crate::application::ports::{Clock, CommandLocator, CommandRunner};
use crate::application::services::{combined_output, command_line};
use crate::domain::{BootstrapError, CommandFailure, PollPolicy, Token};

pub const VMTOOLSD: &str = "vmtoolsd";
pub const TOKEN_ARGS: &[&str] = &["--cmd", "info-get guestinfo.machine.id"];

/// `vmtoolsd` exits 1 while the variable is not set yet.
const NO_VALUE_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone, Copy)]
pub struct Vmware {
    pub poll: PollPolicy,
}

impl Vmware {
    /// Poll `vmtoolsd` until the provisioning system has set the token.
    ///
    /// # Errors
    ///
    /// - [`BootstrapError::VmtoolsdMissing`] when `vmtoolsd` is not on `$PATH`
    /// - [`BootstrapError::VmwareTokenCommandFailed`] on any unexpected exit
    /// - [`BootstrapError::VmwareTokenExhausted`] when every attempt came up empty
    pub async fn token(
        &self,
        host: &(impl CommandRunner + CommandLocator + Clock),
    ) -> Result<Token> {
        if !host.command_exists(VMTOOLSD) {
            return Err(BootstrapError::VmtoolsdMissing.into());
        }
        let command = command_line(VMTOOLSD, TOKEN_ARGS);
        for attempt in 1..=self.poll.attempts {
            tracing::debug!(attempt, %command, "running vmware get token command");
            let output = host.run(VMTOOLSD, TOKEN_ARGS).await.map_err(|e| {
                BootstrapError::VmwareTokenCommandFailed(CommandFailure {
                    command: command.clone(),
                    code: None,
                    output: format!("{e:#}"),
                })
            })?;
            match output.status.code() {
                Some(0) => {
                    if let Some(token) = Token::new(&String::from_utf8_lossy(&output.stdout)) {
                        tracing::debug!("found vmware auth token");
                        return Ok(token);
                    }
                    tracing::debug!("vmware get token command returned an empty token");
                }
                Some(NO_VALUE_EXIT_CODE) => {
                    tracing::debug!("vmware get token command returned no token");
                }
                code => {
                    return Err(BootstrapError::VmwareTokenCommandFailed(CommandFailure {
                        command,
                        code,
                        output: combined_output(&output),
                    })
                    .into());
                }
            }
            if self.poll.has_next(attempt) {
                host.sleep(self.poll.interval).await;
            }
        }
        Err(BootstrapError::VmwareTokenExhausted {
            attempts: self.poll.attempts,
        }
        .into())
    }
}
