//! History-rewrite commands - replace-messages and squash

use crate::cli::output::emit;
use crate::cli::progress::CliProgress;
use crate::cli::style::{Stylize, check};
use crate::cli::{Session, TextSource};
use anstream::println;
use dialoguer::Confirm;
use pr_command::error::{Error, Result};
use pr_command::workflow::{replace_commit_messages, squash_commits};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Where the replacement messages come from
#[derive(Debug, Clone)]
pub enum MessagesSource {
    /// Repeated `--message` flags
    Inline(Vec<String>),
    /// A JSON array of strings
    JsonFile(PathBuf),
}

impl MessagesSource {
    async fn read(self) -> Result<Vec<String>> {
        match self {
            Self::Inline(messages) => Ok(messages),
            Self::JsonFile(path) => {
                let content = tokio::fs::read_to_string(&path).await?;
                Ok(serde_json::from_str(&content)?)
            }
        }
    }
}

/// Run the replace-messages command
pub async fn run_replace_messages(
    path: &Path,
    json: bool,
    target: &str,
    current: Option<&str>,
    source: MessagesSource,
    yes: bool,
) -> Result<()> {
    let session = Session::open(path).await?;
    let current = session.current_branch(current).await?;
    let messages = source.read().await?;
    if messages.is_empty() {
        return Err(Error::InvalidInput(
            "at least one commit message is required".to_string(),
        ));
    }

    confirm(
        yes,
        &format!("Rewrite {} commit message(s) on '{current}' and force-push?", messages.len()),
    )?;

    let progress = CliProgress::new(json);
    let result = replace_commit_messages(
        &session.repo,
        &session.config,
        &current,
        target,
        &messages,
        &progress,
    )
    .await;
    progress.finish();
    let out = result?;

    emit(json, &out, |out| {
        if out.replaced == 0 {
            println!("{} Commit messages already up to date", check());
            return;
        }
        println!(
            "{} Replaced {} message(s), {} changed",
            check(),
            out.replaced.accent(),
            out.changed.accent()
        );
        if let Some(backup) = &out.backup {
            println!("  Backup: {}", backup.muted());
        }
    })
}

/// Run the squash command
pub async fn run_squash(
    path: &Path,
    json: bool,
    target: &str,
    current: Option<&str>,
    message: TextSource,
    yes: bool,
) -> Result<()> {
    let session = Session::open(path).await?;
    let current = session.current_branch(current).await?;
    let message = message.read().await?;

    confirm(
        yes,
        &format!("Squash all commits on '{current}' since '{target}' into one and force-push?"),
    )?;

    let progress = CliProgress::new(json);
    let result = squash_commits(
        &session.repo,
        &session.config,
        &current,
        target,
        &message,
        &progress,
    )
    .await;
    progress.finish();
    let out = result?;

    emit(json, &out, |out| {
        println!(
            "{} Squashed {} commit(s) into one",
            check(),
            out.commit_count.accent()
        );
        if let Some(backup) = &out.backup {
            println!("  Backup: {}", backup.muted());
        }
    })
}

/// Ask before a force-push unless `yes` was given
fn confirm(yes: bool, prompt: &str) -> Result<()> {
    if yes {
        return Ok(());
    }
    if !std::io::stdin().is_terminal() {
        return Err(Error::InvalidInput(
            "refusing to rewrite history without --yes in a non-interactive session".to_string(),
        ));
    }
    let accepted = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| Error::InvalidInput(format!("confirmation failed: {e}")))?;
    if accepted {
        Ok(())
    } else {
        Err(Error::InvalidInput("aborted by user".to_string()))
    }
}
