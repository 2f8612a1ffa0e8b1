//! Dedicated servers: identity written to disk by provisioning.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;
use crate::domain::{BootstrapError, Token};

pub const TOKEN_FILE: &str = "/var/lib/rackspace/rackspace_agent/token";

#[derive(Debug, Clone)]
pub struct Dedicated {
    pub token_file: PathBuf,
}

impl Default for Dedicated {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from(TOKEN_FILE),
        }
    }
}

impl Dedicated {
    /// Read the token file once; there is nothing to wait for.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::TokenFileMissing`] or
    /// [`BootstrapError::TokenFileEmpty`], or an I/O error if the file
    /// exists but cannot be read.
    pub fn token(&self, fs: &impl LocalFs) -> Result<Token> {
        let path = self.token_file.display().to_string();
        if !fs.exists(&self.token_file) {
            return Err(BootstrapError::TokenFileMissing { path }.into());
        }
        let content = fs
            .read_to_string(&self.token_file)
            .with_context(|| format!("failed to read token file {path}"))?;
        Token::new(&content).ok_or_else(|| BootstrapError::TokenFileEmpty { path }.into())
    }
}
