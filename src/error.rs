//! Error types for pr-command

use thiserror::Error;

/// Errors produced by pr-command
#[derive(Debug, Error)]
pub enum Error {
    /// A branch or commit could not be resolved in any checked scope
    #[error("ref not found: {0}")]
    RefNotFound(String),

    /// The range `base..head` holds no commits
    #[error("no commits found between '{base}' and '{head}'")]
    NoCommitsInRange {
        /// Base ref of the range
        base: String,
        /// Head ref of the range
        head: String,
    },

    /// The number of supplied messages does not match the commits in range
    #[error("commit count mismatch: {expected} commits in range but {got} messages supplied")]
    CommitCountMismatch {
        /// Commits found in the range
        expected: usize,
        /// Messages supplied by the caller
        got: usize,
    },

    /// History rewrite requested on a protected branch
    #[error("refusing to rewrite history on protected branch '{branch}'")]
    ProtectedBranch {
        /// The protected branch
        branch: String,
    },

    /// Working tree has uncommitted or untracked changes
    #[error(
        "working tree is not clean; commit, stash or clean these changes first:\n{0}"
    )]
    DirtyWorkingTree(String),

    /// A git invocation exited unsuccessfully
    #[error("`{command}` failed: {stderr}")]
    VcsCommandFailed {
        /// The command line that was run
        command: String,
        /// Captured stderr (or stdout when stderr was empty)
        stderr: String,
    },

    /// The backup reference could not be created; nothing was changed
    #[error("could not create a backup of '{branch}': {reason}")]
    BackupFailed {
        /// Branch that was about to be rewritten
        branch: String,
        /// Underlying failure
        reason: String,
    },

    /// A rewrite step failed and the branch was restored from its backup
    #[error("{source} (branch restored from backup '{backup}')")]
    RolledBack {
        /// Backup tag the branch was restored from
        backup: String,
        /// The failure that triggered the rollback
        source: Box<Error>,
    },

    /// Rollback itself failed; repository state is ambiguous
    #[error(
        "restore of '{branch}' from backup '{backup}' failed: {restore_error} \
         (original failure: {cause}). Recover manually with \
         `git checkout {branch} && git reset --hard {backup}`"
    )]
    RestoreFailed {
        /// Branch being restored
        branch: String,
        /// Backup tag holding the pre-operation tip
        backup: String,
        /// The failure that triggered the rollback
        cause: String,
        /// Why the restore failed
        restore_error: String,
    },

    /// Pushing a branch was rejected by the remote
    #[error(
        "failed to push '{branch}': {reason}. Pull/rebase or resolve conflicts, then try again"
    )]
    PushRejected {
        /// Branch that failed to push
        branch: String,
        /// Underlying failure
        reason: String,
    },

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// PR gateway error (gh CLI or API) that is not an HTTP failure
    #[error("platform error: {0}")]
    Platform(String),

    /// Authentication error
    #[error("authentication error: {0}")]
    Auth(String),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid caller input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No supported remotes found
    #[error("no supported remotes found (GitHub)")]
    NoSupportedRemotes,

    /// Remote not found
    #[error("remote '{0}' not found")]
    RemoteNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<octocrab::Error> for Error {
    fn from(e: octocrab::Error) -> Self {
        Self::GitHubApi(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl Error {
    /// Whether the error was raised before anything in the repository changed
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::RefNotFound(_)
                | Self::NoCommitsInRange { .. }
                | Self::CommitCountMismatch { .. }
                | Self::ProtectedBranch { .. }
                | Self::DirtyWorkingTree(_)
                | Self::BackupFailed { .. }
        )
    }

    /// Stable machine-readable name of the variant
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RefNotFound(_) => "refNotFound",
            Self::NoCommitsInRange { .. } => "noCommitsInRange",
            Self::CommitCountMismatch { .. } => "commitCountMismatch",
            Self::ProtectedBranch { .. } => "protectedBranch",
            Self::DirtyWorkingTree(_) => "dirtyWorkingTree",
            Self::VcsCommandFailed { .. } => "vcsCommandFailed",
            Self::BackupFailed { .. } => "backupFailed",
            Self::RolledBack { .. } => "rolledBack",
            Self::RestoreFailed { .. } => "restoreFailed",
            Self::PushRejected { .. } => "pushRejected",
            Self::GitHubApi(_) => "gitHubApi",
            Self::Platform(_) => "platform",
            Self::Auth(_) => "auth",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
            Self::InvalidInput(_) => "invalidInput",
            Self::NoSupportedRemotes => "noSupportedRemotes",
            Self::RemoteNotFound(_) => "remoteNotFound",
            Self::Io(_) => "io",
        }
    }
}

/// Result type alias for pr-command operations
pub type Result<T> = std::result::Result<T, Error>;
