//! CLI commands
//!
//! Command implementations for the `prc` binary.

mod auth;
mod branches;
mod commits;
mod output;
mod pr;
mod progress;
mod rewrite;
mod style;

pub use auth::{run_auth_setup, run_auth_test};
pub use branches::{run_create_branch, run_detect_branches};
pub use commits::{run_commit_contents, run_commit_messages};
pub use output::report_error;
pub use pr::{SubmitArgs, run_prepare_pr, run_submit_pr, run_update_pr};
pub use rewrite::{MessagesSource, run_replace_messages, run_squash};

use pr_command::config::Config;
use pr_command::error::{Error, Result};
use pr_command::git::{GitCommand, GitRepo};
use std::path::{Path, PathBuf};

/// Repository and configuration for one invocation
pub struct Session {
    pub repo: GitRepo,
    pub config: Config,
}

impl Session {
    /// Open the repository containing `path` and load its configuration
    pub async fn open(path: &Path) -> Result<Self> {
        let root = GitCommand::new(path)
            .args(["rev-parse", "--show-toplevel"])
            .run()
            .await
            .map_err(|_| Error::InvalidInput(format!("not a git repository: {}", path.display())))?;
        let root = PathBuf::from(root);
        let config = Config::load(&root)?;
        let repo = GitRepo::open(&root, config.remote.clone()).await?;
        Ok(Self { repo, config })
    }

    /// `current`, or the checked-out branch when not given
    pub async fn current_branch(&self, current: Option<&str>) -> Result<String> {
        match current {
            Some(name) => Ok(name.to_string()),
            None => self.repo.current_branch().await,
        }
    }
}

/// Text given inline or read from a file
#[derive(Debug, Clone)]
pub enum TextSource {
    Inline(String),
    File(PathBuf),
}

impl TextSource {
    /// Prefer the file when both are somehow present
    pub fn new(inline: Option<String>, file: Option<PathBuf>) -> Self {
        match file {
            Some(path) => Self::File(path),
            None => Self::Inline(inline.unwrap_or_default()),
        }
    }

    /// The text itself
    pub async fn read(self) -> Result<String> {
        match self {
            Self::Inline(text) => Ok(text),
            Self::File(path) => Ok(tokio::fs::read_to_string(&path).await?),
        }
    }
}
