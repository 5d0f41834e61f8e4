//! Repository handle

use crate::attempt::attempt;
use crate::error::{Error, Result};
use crate::git::GitCommand;
use crate::git::log::{LogFormat, LogOptions, parse_messages, parse_records};
use crate::types::{CommitRecord, GitRemote, RefScope};
use std::path::{Path, PathBuf};

/// `git reset` mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Move HEAD only; index and working tree kept
    Soft,
    /// Discard index and working tree changes
    Hard,
}

/// Options for [`GitRepo::checkout_branch`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutOptions<'a> {
    /// Create the branch (`-b`)
    pub create: bool,
    /// Create or reset the branch (`-B`); wins over `create`
    pub reset: bool,
    /// Start point for a created branch
    pub start_point: Option<&'a str>,
}

/// Message source for [`GitRepo::commit`]
#[derive(Debug, Clone, Copy)]
pub enum CommitMessage<'a> {
    /// Inline message (`-m`)
    Inline(&'a str),
    /// Message file (`-F`)
    File(&'a Path),
}

/// Options for [`GitRepo::commit`]
#[derive(Debug, Clone, Copy)]
pub struct CommitOptions<'a> {
    /// The message
    pub message: CommitMessage<'a>,
    /// Amend HEAD instead of creating a new commit
    pub amend: bool,
    /// Allow a commit with no changes
    pub allow_empty: bool,
}

/// Options for [`GitRepo::push`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PushOptions {
    /// `--force`
    pub force: bool,
    /// `--set-upstream`
    pub set_upstream: bool,
}

/// A git repository rooted at an explicit path
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
    git_dir: PathBuf,
    remote: String,
}

impl GitRepo {
    /// Open the repository containing `path`, using `remote` for remote refs
    pub async fn open(path: &Path, remote: impl Into<String>) -> Result<Self> {
        let root = GitCommand::new(path)
            .args(["rev-parse", "--show-toplevel"])
            .run()
            .await?;
        let root = PathBuf::from(root);
        let git_dir = GitCommand::new(&root)
            .args(["rev-parse", "--absolute-git-dir"])
            .run()
            .await?;
        Ok(Self {
            root,
            git_dir: PathBuf::from(git_dir),
            remote: remote.into(),
        })
    }

    /// Working tree root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.git` directory
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Default remote name
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// A git command rooted at this repository
    pub fn command(&self) -> GitCommand {
        GitCommand::new(&self.root)
    }

    /// Qualify a branch name for `scope`
    ///
    /// Remote scope gets the `<remote>/` prefix; local and any are left as-is.
    pub fn qualify(&self, name: &str, scope: RefScope) -> String {
        match scope {
            RefScope::Remote => format!("{}/{name}", self.remote),
            RefScope::Local | RefScope::Any => name.to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Checked-out branch name (`HEAD` when detached)
    pub async fn current_branch(&self) -> Result<String> {
        self.command()
            .args(["rev-parse", "--abbrev-ref", "HEAD"])
            .run()
            .await
    }

    /// Resolve a revision to a commit hash
    pub async fn rev_parse(&self, rev: &str) -> Result<String> {
        self.command()
            .args(["rev-parse", "--verify", "--quiet"])
            .arg(format!("{rev}^{{commit}}"))
            .run()
            .await
    }

    /// Local branch names in `for-each-ref` order
    pub async fn local_branches(&self) -> Result<Vec<String>> {
        let out = self
            .command()
            .args(["for-each-ref", "--format=%(refname:short)", "refs/heads"])
            .run()
            .await?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .collect())
    }

    /// URL of a remote
    pub async fn remote_url(&self, name: &str) -> Result<GitRemote> {
        let url = self
            .command()
            .args(["remote", "get-url", name])
            .run()
            .await
            .map_err(|_| Error::RemoteNotFound(name.to_string()))?;
        Ok(GitRemote {
            name: name.to_string(),
            url,
        })
    }

    /// Raw log of `base..head`
    pub async fn log_range(&self, base: &str, head: &str, options: LogOptions) -> Result<String> {
        let range = format!(
            "{}..{}",
            self.qualify(base, options.base_scope),
            self.qualify(head, options.head_scope)
        );
        self.command()
            .arg("log")
            .arg(options.format.pretty())
            .arg(range)
            .run()
            .await
    }

    /// Commit messages of `base..head`, oldest first
    pub async fn messages_between(
        &self,
        base: &str,
        head: &str,
        options: LogOptions,
    ) -> Result<Vec<String>> {
        let options = LogOptions {
            format: LogFormat::Messages,
            ..options
        };
        Ok(parse_messages(&self.log_range(base, head, options).await?))
    }

    /// Commit records of `base..head`, oldest first
    pub async fn commits_between(
        &self,
        base: &str,
        head: &str,
        options: LogOptions,
    ) -> Result<Vec<CommitRecord>> {
        let options = LogOptions {
            format: LogFormat::Records,
            ..options
        };
        Ok(parse_records(&self.log_range(base, head, options).await?))
    }

    /// Diff of `base...head` (changes on head since the merge-base)
    pub async fn diff(&self, base: &str, head: &str, stat: bool) -> Result<String> {
        self.command()
            .arg("diff")
            .arg_if(stat, "--stat")
            .arg(format!("{base}...{head}"))
            .run()
            .await
    }

    /// Best common ancestor of two revisions
    pub async fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        self.command().args(["merge-base", a, b]).run().await
    }

    /// Number of commits in `base..head`
    pub async fn rev_list_count(&self, base: &str, head: &str) -> Result<usize> {
        let out = self
            .command()
            .args(["rev-list", "--count"])
            .arg(format!("{base}..{head}"))
            .run()
            .await?;
        out.trim()
            .parse()
            .map_err(|_| Error::Parse(format!("unexpected rev-list count: {out}")))
    }

    /// `git status --porcelain` output; empty means clean
    pub async fn status_porcelain(&self) -> Result<String> {
        self.command().args(["status", "--porcelain"]).run().await
    }

    // ------------------------------------------------------------------
    // Remote sync
    // ------------------------------------------------------------------

    /// Fetch one ref from the default remote
    pub async fn fetch(&self, refname: &str) -> Result<()> {
        self.command()
            .args(["fetch", self.remote.as_str(), refname])
            .run()
            .await
            .map(drop)
    }

    /// Fetch each ref, ignoring failures
    pub async fn try_fetch(&self, refs: &[&str]) {
        for refname in refs {
            attempt(&format!("fetch {refname}"), self.fetch(refname)).await;
        }
    }

    /// Push `branch` to the default remote
    pub async fn push(&self, branch: &str, options: PushOptions) -> Result<()> {
        self.command()
            .arg("push")
            .arg_if(options.force, "--force")
            .arg_if(options.set_upstream, "--set-upstream")
            .arg(self.remote.as_str())
            .arg(branch)
            .run()
            .await
            .map(drop)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Check out a branch, optionally creating or resetting it
    pub async fn checkout_branch(&self, name: &str, options: CheckoutOptions<'_>) -> Result<()> {
        let mut cmd = self.command().arg("checkout");
        if options.reset {
            cmd = cmd.arg("-B");
        } else if options.create {
            cmd = cmd.arg("-b");
        }
        cmd = cmd.arg(name);
        if let Some(start) = options.start_point {
            cmd = cmd.arg(start);
        }
        cmd.run().await.map(drop)
    }

    /// Create a branch without checking it out
    pub async fn create_branch(&self, name: &str, start_point: &str) -> Result<()> {
        self.command()
            .args(["branch", name, start_point])
            .run()
            .await
            .map(drop)
    }

    /// `git reset --soft|--hard [rev]`
    pub async fn reset(&self, mode: ResetMode, rev: Option<&str>) -> Result<()> {
        let flag = match mode {
            ResetMode::Soft => "--soft",
            ResetMode::Hard => "--hard",
        };
        let mut cmd = self.command().args(["reset", flag]);
        if let Some(rev) = rev {
            cmd = cmd.arg(rev);
        }
        cmd.run().await.map(drop)
    }

    /// Create or amend a commit
    pub async fn commit(&self, options: CommitOptions<'_>) -> Result<()> {
        let cmd = self
            .command()
            .arg("commit")
            .arg_if(options.amend, "--amend")
            .arg_if(options.allow_empty, "--allow-empty");
        let cmd = match options.message {
            CommitMessage::Inline(msg) => cmd.arg("-m").arg(msg),
            CommitMessage::File(path) => cmd.arg("-F").arg(path.to_string_lossy()),
        };
        cmd.run().await.map(drop)
    }

    /// Point `branch` at `rev`, creating it if needed
    pub async fn branch_force_update(&self, branch: &str, rev: &str) -> Result<()> {
        self.command()
            .args(["branch", "-f", branch, rev])
            .run()
            .await
            .map(drop)
    }

    /// Force-delete a local branch
    pub async fn delete_branch(&self, name: &str) -> Result<()> {
        self.command()
            .args(["branch", "-D", name])
            .run()
            .await
            .map(drop)
    }

    /// Create a lightweight tag at `rev`
    pub async fn create_tag(&self, name: &str, rev: &str) -> Result<()> {
        self.command().args(["tag", name, rev]).run().await.map(drop)
    }

    /// Delete a local tag
    pub async fn delete_tag(&self, name: &str) -> Result<()> {
        self.command()
            .args(["tag", "-d", name])
            .run()
            .await
            .map(drop)
    }

    /// Delete an arbitrary ref
    pub async fn delete_ref(&self, full_name: &str) -> Result<()> {
        self.command()
            .args(["update-ref", "-d", full_name])
            .run()
            .await
            .map(drop)
    }

    /// Remove untracked files and directories
    pub async fn clean(&self) -> Result<()> {
        self.command().args(["clean", "-fd"]).run().await.map(drop)
    }

    /// Rewrite messages of `base..head` through a shell filter script
    pub async fn filter_branch_msg_filter(
        &self,
        base: &str,
        head: &str,
        script: &Path,
    ) -> Result<()> {
        let filter = format!("sh {}", shell_quote(&script.to_string_lossy()));
        self.command()
            .args(["filter-branch", "-f", "--msg-filter"])
            .arg(filter)
            .arg(format!("{base}..{head}"))
            .run()
            .await
            .map(drop)
    }
}

/// Single-quote a string for POSIX `sh`
pub(crate) fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/tmp/a b"), "'/tmp/a b'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_qualify() {
        let repo = GitRepo {
            root: PathBuf::from("/r"),
            git_dir: PathBuf::from("/r/.git"),
            remote: "origin".to_string(),
        };
        assert_eq!(repo.qualify("main", RefScope::Remote), "origin/main");
        assert_eq!(repo.qualify("main", RefScope::Local), "main");
    }
}
