//! Git process builder

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// A single `git` invocation rooted at a repository path
#[derive(Debug, Clone)]
pub struct GitCommand {
    cwd: PathBuf,
    args: Vec<String>,
}

impl GitCommand {
    /// Start a command that runs in `cwd`
    pub fn new(cwd: &Path) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `arg` only when `cond` holds
    #[must_use]
    pub fn arg_if(self, cond: bool, arg: impl Into<String>) -> Self {
        if cond { self.arg(arg) } else { self }
    }

    /// Run and return the raw process output, whatever the exit status
    pub async fn output(&self) -> Result<Output> {
        debug!(cwd = %self.cwd.display(), command = %self, "running git");
        Command::new("git")
            .args(&self.args)
            .current_dir(&self.cwd)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("FILTER_BRANCH_SQUELCH_WARNING", "1")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::VcsCommandFailed {
                command: self.to_string(),
                stderr: e.to_string(),
            })
    }

    /// Run and return stdout with trailing whitespace removed
    pub async fn run(&self) -> Result<String> {
        let output = self.output().await?;
        if !output.status.success() {
            return Err(self.failure(&output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    fn failure(&self, output: &Output) -> Error {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if stdout.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stdout
            }
        } else {
            stderr
        };
        Error::VcsCommandFailed {
            command: self.to_string(),
            stderr: detail,
        }
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("git")?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}
