//! Backup tags
//!
//! A lightweight local tag `backup/<branch>/<timestamp>` pins the branch tip
//! before anything is rewritten. Rollback restores from this tag and nothing
//! else.

use crate::error::{Error, Result};
use crate::git::{CheckoutOptions, GitRepo, ResetMode};
use tracing::{info, warn};

/// Tag namespace for backups
pub const BACKUP_PREFIX: &str = "backup";

/// A created backup tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupTag {
    name: String,
}

impl BackupTag {
    /// Tag `rev` as the backup of `branch`
    pub async fn create(repo: &GitRepo, branch: &str, rev: &str, stamp: &str) -> Result<Self> {
        let name = format!("{BACKUP_PREFIX}/{branch}/{stamp}");
        repo.create_tag(&name, rev)
            .await
            .map_err(|e| Error::BackupFailed {
                branch: branch.to_string(),
                reason: e.to_string(),
            })?;
        info!(tag = %name, rev, "backup created");
        Ok(Self { name })
    }

    /// Tag name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reset `branch` to the backup and check it out
    ///
    /// Partial state left by a failed step is discarded first, then the
    /// branch is recreated at the tag and untracked leftovers are cleaned.
    pub async fn restore(&self, repo: &GitRepo, branch: &str) -> Result<()> {
        warn!(branch, backup = %self.name, "restoring branch from backup");
        repo.reset(ResetMode::Hard, None).await?;
        repo.checkout_branch(
            branch,
            CheckoutOptions {
                reset: true,
                start_point: Some(&self.name),
                ..CheckoutOptions::default()
            },
        )
        .await?;
        repo.reset(ResetMode::Hard, Some(&self.name)).await?;
        repo.clean().await
    }

    /// Remove the tag
    pub async fn delete(self, repo: &GitRepo) -> Result<()> {
        repo.delete_tag(&self.name).await
    }
}
