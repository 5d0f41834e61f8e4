//! Commit inspection and history rewriting operations

use crate::changes::generate_change_bundle;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::{GitRepo, LogFormat, LogOptions, RefResolver};
use crate::rewrite::{ReplaceOutcome, RewriteEngine, RewriteProgress, SquashOutcome};
use crate::types::RefScope;
use serde::Serialize;
use std::path::PathBuf;

/// Result of [`get_commit_messages`]
#[derive(Debug, Clone, Serialize)]
pub struct CommitMessagesOutput {
    /// Full messages of `target..current`, oldest first
    pub commits: Vec<String>,
}

/// Messages of the commits on `current` that are not on `target`
///
/// `current` is looked up locally first, `target` on the remote first. If
/// either is missing, both are fetched once before giving up. A branch found
/// only on the remote is fetched before the log is read.
pub async fn get_commit_messages(
    repo: &GitRepo,
    config: &Config,
    current: &str,
    target: &str,
) -> Result<CommitMessagesOutput> {
    let resolver = RefResolver::new(repo, config);
    let head_order = [RefScope::Local, RefScope::Remote];
    let base_order = [RefScope::Remote, RefScope::Local];

    let mut head = resolver.locate(current, &head_order).await;
    let mut base = resolver.locate(target, &base_order).await;
    if head.is_none() || base.is_none() {
        repo.try_fetch(&[target, current]).await;
        head = resolver.locate(current, &head_order).await;
        base = resolver.locate(target, &base_order).await;
    }
    let head = head.ok_or_else(|| Error::RefNotFound(current.to_string()))?;
    let base = base.ok_or_else(|| Error::RefNotFound(target.to_string()))?;
    resolver.materialize(current, head).await?;
    resolver.materialize(target, base).await?;

    let options = LogOptions::new(LogFormat::Messages).scopes(base, head);
    let commits = repo.messages_between(target, current, options).await?;
    Ok(CommitMessagesOutput { commits })
}

/// Result of [`get_commit_contents`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitContentsOutput {
    /// Rendered change bundle
    pub changes_file: PathBuf,
}

/// Write the change bundle for `target..current` and return its path
pub async fn get_commit_contents(
    repo: &GitRepo,
    config: &Config,
    current: &str,
    target: &str,
) -> Result<CommitContentsOutput> {
    let changes = generate_change_bundle(repo, config, target, current).await?;
    Ok(CommitContentsOutput {
        changes_file: changes.path,
    })
}

/// Replace every message in `target..current`, oldest first
pub async fn replace_commit_messages(
    repo: &GitRepo,
    config: &Config,
    current: &str,
    target: &str,
    commits: &[String],
    progress: &dyn RewriteProgress,
) -> Result<ReplaceOutcome> {
    RewriteEngine::new(repo, config)
        .with_progress(progress)
        .replace_commit_messages(current, target, commits)
        .await
}

/// Squash `target..current` into one commit
pub async fn squash_commits(
    repo: &GitRepo,
    config: &Config,
    current: &str,
    target: &str,
    message: &str,
    progress: &dyn RewriteProgress,
) -> Result<SquashOutcome> {
    RewriteEngine::new(repo, config)
        .with_progress(progress)
        .squash_commits(current, target, message)
        .await
}
