//! History-rewrite engine
//!
//! Replaces commit messages 1:1 or squashes a range into one commit. Both
//! operations share the same safety pattern:
//!
//! 1. Validating - protected branch, clean tree, non-empty range, counts
//! 2. BackupEstablished - `backup/<branch>/<timestamp>` tag at the tip
//! 3. Isolated - scratch branch `temp/...` checked out at the tip
//! 4. Rewriting - filter-branch or soft reset + commit on the scratch branch
//! 5. Reapplying - force the real branch to the new tip, check out, force-push
//! 6. Published, or RolledBack from the backup tag on any failure in 4-5
//!
//! The scratch branch is removed on every exit path. The backup tag is kept
//! after a rewrite (successful or not) so manual recovery stays possible.

mod backup;
mod engine;
mod filter;
mod progress;
mod temp_branch;

pub use backup::{BACKUP_PREFIX, BackupTag};
pub use engine::{ReplaceOutcome, RewriteEngine, SquashOutcome};
pub use filter::{MessageMapping, MsgFilterScript};
pub use progress::{NoopProgress, RewritePhase, RewriteProgress};
pub use temp_branch::TempBranch;

/// Prefix shared by every scratch branch
pub const TEMP_BRANCH_PREFIX: &str = "temp/";
