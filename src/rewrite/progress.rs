//! Progress callback trait for interface-agnostic updates
//!
//! Lets the CLI (or any other front end) follow a rewrite through its states.

use crate::error::Error;
use async_trait::async_trait;
use std::fmt;

/// State of a history rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewritePhase {
    /// Checking policy and the commit range
    Validating,
    /// Backup reference created
    BackupEstablished,
    /// Scratch branch checked out
    Isolated,
    /// Rewriting history on the scratch branch
    Rewriting,
    /// Moving the real branch and force-pushing
    Reapplying,
    /// Done, remote updated
    Published,
    /// Failure recovered from the backup
    RolledBack,
}

impl fmt::Display for RewritePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validating => "Validating",
            Self::BackupEstablished => "Backup created",
            Self::Isolated => "Working on scratch branch",
            Self::Rewriting => "Rewriting history",
            Self::Reapplying => "Updating branch and pushing",
            Self::Published => "Published",
            Self::RolledBack => "Rolled back",
        };
        f.write_str(s)
    }
}

/// Progress callback trait
#[async_trait]
pub trait RewriteProgress: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: RewritePhase);

    /// Called when a failure triggers a rollback
    async fn on_error(&self, error: &Error);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl RewriteProgress for NoopProgress {
    async fn on_phase(&self, _phase: RewritePhase) {}
    async fn on_error(&self, _error: &Error) {}
    async fn on_message(&self, _message: &str) {}
}
