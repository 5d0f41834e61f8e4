//! Rewrite state machine
//!
//! `Validating → BackupEstablished → Isolated → Rewriting → Reapplying →
//! Published | RolledBack`. Nothing is mutated before the backup exists, and
//! all rewriting happens on a scratch branch.

use crate::attempt::{attempt, attempt_sync};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::{
    CheckoutOptions, CommitMessage, CommitOptions, GitRepo, LogFormat, LogOptions, PushOptions,
    RefResolver, ResetMode,
};
use crate::rewrite::backup::BackupTag;
use crate::rewrite::filter::{MessageMapping, MsgFilterScript};
use crate::rewrite::progress::{NoopProgress, RewritePhase, RewriteProgress};
use crate::rewrite::TEMP_BRANCH_PREFIX;
use crate::rewrite::temp_branch::TempBranch;
use crate::types::{CommitRecord, RefScope};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Result of replacing commit messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOutcome {
    /// Messages applied (the supplied count), 0 when nothing changed
    pub replaced: usize,
    /// Commits whose message actually differed
    pub changed: usize,
    /// Backup tag kept for manual recovery
    pub backup: Option<String>,
}

/// Result of squashing a range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SquashOutcome {
    /// Whether the branch was rewritten
    pub squashed: bool,
    /// Commits collapsed into one
    pub commit_count: usize,
    /// Backup tag kept for manual recovery
    pub backup: Option<String>,
}

/// A validated `target..current` range
#[derive(Debug)]
struct ResolvedRange {
    base_ref: String,
    head_ref: String,
    commits: Vec<CommitRecord>,
    return_to: String,
}

/// Safe commit-history rewriting for one repository
pub struct RewriteEngine<'a> {
    repo: &'a GitRepo,
    config: &'a Config,
    progress: &'a dyn RewriteProgress,
}

impl<'a> RewriteEngine<'a> {
    /// Engine over `repo` governed by `config`
    pub fn new(repo: &'a GitRepo, config: &'a Config) -> Self {
        Self {
            repo,
            config,
            progress: &NoopProgress,
        }
    }

    /// Report phase changes to `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: &'a dyn RewriteProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Replace the messages of every commit in `target..current`
    ///
    /// `messages` is oldest-first and must have one entry per commit. Commits
    /// whose message already matches are left alone; if none differ the call
    /// is a no-op reporting `replaced = 0`.
    pub async fn replace_commit_messages(
        &self,
        current: &str,
        target: &str,
        messages: &[String],
    ) -> Result<ReplaceOutcome> {
        if let Some(i) = messages.iter().position(|m| m.trim().is_empty()) {
            return Err(Error::InvalidInput(format!(
                "replacement message {} is empty",
                i + 1
            )));
        }

        let range = self.validate(current, target).await?;
        if range.commits.len() != messages.len() {
            return Err(Error::CommitCountMismatch {
                expected: range.commits.len(),
                got: messages.len(),
            });
        }

        let stamp = timestamp();
        let backup = self.establish_backup(current, &range, &stamp).await?;
        let temp = self
            .isolate(format!("{TEMP_BRANCH_PREFIX}rewrite-messages-{stamp}"), &range, &backup)
            .await?;

        self.progress.on_phase(RewritePhase::Rewriting).await;
        let mapping = message_mapping(&range.commits, messages);

        if mapping.is_empty() {
            info!(branch = current, "commit messages already match; nothing to rewrite");
            temp.discard(self.repo).await;
            attempt("delete backup tag", backup.delete(self.repo)).await;
            self.progress
                .on_message("Commit messages already up to date")
                .await;
            return Ok(ReplaceOutcome {
                replaced: 0,
                changed: 0,
                backup: None,
            });
        }

        let changed = mapping.len();
        let result: Result<()> = async {
            self.apply_mapping(&mapping, &range, &temp, &stamp).await?;
            self.progress.on_phase(RewritePhase::Reapplying).await;
            self.reapply(current, &temp).await
        }
        .await;

        let backup_name = backup.name().to_string();
        self.finish(current, backup, temp, result).await?;
        Ok(ReplaceOutcome {
            replaced: messages.len(),
            changed,
            backup: Some(backup_name),
        })
    }

    /// Collapse every commit in `target..current` into one carrying `message`
    pub async fn squash_commits(
        &self,
        current: &str,
        target: &str,
        message: &str,
    ) -> Result<SquashOutcome> {
        if message.trim().is_empty() {
            return Err(Error::InvalidInput(
                "squash commit message must not be empty".to_string(),
            ));
        }

        let range = self.validate(current, target).await?;
        let commit_count = range.commits.len();

        let stamp = timestamp();
        let backup = self.establish_backup(current, &range, &stamp).await?;
        let temp = self
            .isolate(format!("{TEMP_BRANCH_PREFIX}squash-{stamp}"), &range, &backup)
            .await?;

        self.progress.on_phase(RewritePhase::Rewriting).await;
        let result: Result<()> = async {
            self.squash_on_temp(&range, message, &stamp).await?;
            self.progress.on_phase(RewritePhase::Reapplying).await;
            self.reapply(current, &temp).await
        }
        .await;

        let backup_name = backup.name().to_string();
        self.finish(current, backup, temp, result).await?;
        Ok(SquashOutcome {
            squashed: true,
            commit_count,
            backup: Some(backup_name),
        })
    }

    // ------------------------------------------------------------------
    // States
    // ------------------------------------------------------------------

    async fn validate(&self, current: &str, target: &str) -> Result<ResolvedRange> {
        self.progress.on_phase(RewritePhase::Validating).await;

        if self.config.is_protected(current) {
            return Err(Error::ProtectedBranch {
                branch: current.to_string(),
            });
        }

        // filter-branch refuses dirty trees, and rollback runs `reset --hard`
        let status = self.repo.status_porcelain().await?;
        if !status.trim().is_empty() {
            return Err(Error::DirtyWorkingTree(status));
        }

        self.repo.try_fetch(&[target, current]).await;

        let resolver = RefResolver::new(self.repo, self.config);
        let head_scope = resolver
            .locate(current, &[RefScope::Local, RefScope::Remote])
            .await
            .ok_or_else(|| Error::RefNotFound(current.to_string()))?;
        let base_scope = resolver
            .locate(target, &[RefScope::Remote, RefScope::Local])
            .await
            .ok_or_else(|| Error::RefNotFound(target.to_string()))?;

        let options = LogOptions::new(LogFormat::Records).scopes(base_scope, head_scope);
        let commits = self.repo.commits_between(target, current, options).await?;
        if commits.is_empty() {
            return Err(Error::NoCommitsInRange {
                base: target.to_string(),
                head: current.to_string(),
            });
        }

        let return_to = match self.repo.current_branch().await? {
            detached if detached == "HEAD" => self.repo.rev_parse("HEAD").await?,
            branch => branch,
        };

        Ok(ResolvedRange {
            base_ref: self.repo.qualify(target, base_scope),
            head_ref: self.repo.qualify(current, head_scope),
            commits,
            return_to,
        })
    }

    async fn establish_backup(
        &self,
        current: &str,
        range: &ResolvedRange,
        stamp: &str,
    ) -> Result<BackupTag> {
        let backup = BackupTag::create(self.repo, current, &range.head_ref, stamp).await?;
        self.progress.on_phase(RewritePhase::BackupEstablished).await;
        self.progress
            .on_message(&format!("Backup: {}", backup.name()))
            .await;
        Ok(backup)
    }

    async fn isolate(
        &self,
        name: String,
        range: &ResolvedRange,
        backup: &BackupTag,
    ) -> Result<TempBranch> {
        match TempBranch::create(self.repo, name, &range.head_ref, range.return_to.clone()).await {
            Ok(temp) => {
                self.progress.on_phase(RewritePhase::Isolated).await;
                Ok(temp)
            }
            Err(e) => {
                attempt("delete backup tag", backup.clone().delete(self.repo)).await;
                Err(e)
            }
        }
    }

    async fn apply_mapping(
        &self,
        mapping: &MessageMapping,
        range: &ResolvedRange,
        temp: &TempBranch,
        stamp: &str,
    ) -> Result<()> {
        let script = MsgFilterScript::write(mapping, stamp).await?;
        let filtered = self
            .repo
            .filter_branch_msg_filter(&range.base_ref, temp.name(), script.path())
            .await;
        attempt_sync("remove message filter", script.remove());
        attempt(
            "delete filter-branch original ref",
            self.repo
                .delete_ref(&format!("refs/original/refs/heads/{}", temp.name())),
        )
        .await;
        filtered
    }

    async fn squash_on_temp(&self, range: &ResolvedRange, message: &str, stamp: &str) -> Result<()> {
        let msg_file = self
            .repo
            .git_dir()
            .join(format!("PR_COMMAND_SQUASH_MSG_{stamp}"));
        tokio::fs::write(&msg_file, format!("{}\n", message.trim_end())).await?;
        let commit = |amend| CommitOptions {
            message: CommitMessage::File(&msg_file),
            amend,
            allow_empty: true,
        };

        let result = if range.commits.len() == 1 {
            self.repo.commit(commit(true)).await
        } else {
            match self.repo.merge_base(&range.base_ref, "HEAD").await {
                Ok(base) => match self.repo.reset(ResetMode::Soft, Some(&base)).await {
                    Ok(()) => self.repo.commit(commit(false)).await,
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            }
        };

        attempt_sync("remove squash message file", std::fs::remove_file(&msg_file));
        result
    }

    async fn reapply(&self, current: &str, temp: &TempBranch) -> Result<()> {
        let tip = self.repo.rev_parse(temp.name()).await?;
        self.repo.branch_force_update(current, &tip).await?;
        self.repo
            .checkout_branch(current, CheckoutOptions::default())
            .await?;
        self.repo
            .push(
                current,
                PushOptions {
                    force: true,
                    ..PushOptions::default()
                },
            )
            .await?;
        info!(branch = current, tip = %tip, "rewritten branch published");
        Ok(())
    }

    /// Publish or roll back, then always drop the scratch branch
    async fn finish<T>(
        &self,
        current: &str,
        backup: BackupTag,
        temp: TempBranch,
        result: Result<T>,
    ) -> Result<T> {
        let result = match result {
            Ok(value) => {
                self.progress.on_phase(RewritePhase::Published).await;
                Ok(value)
            }
            Err(cause) => Err(self.roll_back(current, &backup, cause).await),
        };
        temp.discard(self.repo).await;
        result
    }

    async fn roll_back(&self, current: &str, backup: &BackupTag, cause: Error) -> Error {
        warn!(branch = current, error = %cause, "rewrite failed; rolling back");
        self.progress.on_error(&cause).await;
        match backup.restore(self.repo, current).await {
            Ok(()) => {
                self.progress.on_phase(RewritePhase::RolledBack).await;
                Error::RolledBack {
                    backup: backup.name().to_string(),
                    source: Box::new(cause),
                }
            }
            Err(restore_error) => Error::RestoreFailed {
                branch: current.to_string(),
                backup: backup.name().to_string(),
                cause: cause.to_string(),
                restore_error: restore_error.to_string(),
            },
        }
    }
}

/// Pair each commit with its replacement, keeping only real changes
fn message_mapping(commits: &[CommitRecord], messages: &[String]) -> MessageMapping {
    let mapping = MessageMapping::from_pairs(
        commits
            .iter()
            .zip(messages)
            .map(|(commit, new)| (commit.hash.clone(), commit.message.clone(), new.clone())),
    );
    for commit in commits.iter().filter(|c| mapping.get(&c.hash).is_some()) {
        debug!(hash = %commit.hash, subject = commit.subject(), "message will change");
    }
    mapping
}

fn timestamp() -> String {
    Utc::now().format("%Y%m%d%H%M%S%3f").to_string()
}
