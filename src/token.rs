// Access token from the locally installed, already authenticated gcloud CLI.

use anyhow::{bail, Context, Result};
use std::process::Command;
use tracing::debug;

pub trait TokenSource {
    fn access_token(&self) -> Result<String>;
}

/// Runs `<program> auth print-access-token` and reads the token from stdout.
pub struct GcloudCli {
    program: String,
}

impl GcloudCli {
    pub fn new(program: impl Into<String>) -> Self {
        GcloudCli {
            program: program.into(),
        }
    }
}

impl Default for GcloudCli {
    fn default() -> Self {
        GcloudCli::new("gcloud")
    }
}

impl TokenSource for GcloudCli {
    fn access_token(&self) -> Result<String> {
        debug!(program = %self.program, "requesting access token");
        let output = Command::new(&self.program)
            .args(["auth", "print-access-token"])
            .output()
            .with_context(|| format!("Failed to run `{} auth print-access-token`", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "`{} auth print-access-token` exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }

        let token = String::from_utf8(output.stdout).context("Access token is not UTF-8")?;
        let token = token.trim_end_matches(['\r', '\n']).to_string();
        if token.is_empty() {
            bail!("`{} auth print-access-token` printed nothing", self.program);
        }
        Ok(token)
    }
}
