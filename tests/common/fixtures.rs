//! Throwaway git repositories for integration tests
//!
//! Every [`TestRepo`] is a working clone with a bare `origin` next to it,
//! both inside one temp dir. `main` and `staging` exist on both sides.

use pr_command::git::GitRepo;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Working clone plus bare origin
pub struct TestRepo {
    _dir: TempDir,
    work: PathBuf,
    origin: PathBuf,
}

impl TestRepo {
    /// Fresh repository with one commit on `main` and `staging`, both pushed
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let origin = dir.path().join("origin.git");
        let work = dir.path().join("work");

        run_git(dir.path(), &["init", "--quiet", "--bare", "-b", "main", "origin.git"]);
        run_git(dir.path(), &["init", "--quiet", "-b", "main", "work"]);

        let repo = Self {
            _dir: dir,
            work,
            origin,
        };
        repo.git(&["config", "user.name", "Test Author"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.git(&["config", "tag.gpgsign", "false"]);
        repo.git(&["remote", "add", "origin", path_str(&repo.origin)]);

        repo.commit_file("README.md", "# test\n", "chore: initial commit");
        repo.git(&["push", "--quiet", "-u", "origin", "main"]);
        repo.git(&["branch", "staging"]);
        repo.git(&["push", "--quiet", "origin", "staging"]);
        repo
    }

    /// Working tree root
    pub fn path(&self) -> &Path {
        &self.work
    }

    /// Bare origin path
    pub fn origin_path(&self) -> &Path {
        &self.origin
    }

    /// `.git` directory of the working clone
    pub fn git_dir(&self) -> PathBuf {
        self.work.join(".git")
    }

    /// Open the working clone through the library
    pub async fn open(&self) -> GitRepo {
        GitRepo::open(&self.work, "origin")
            .await
            .expect("open test repo")
    }

    /// Run git in the working clone, panicking on failure; returns trimmed stdout
    pub fn git(&self, args: &[&str]) -> String {
        run_git(&self.work, args)
    }

    /// Run git in the working clone without checking the status
    pub fn try_git(&self, args: &[&str]) -> Output {
        Command::new("git")
            .args(args)
            .current_dir(&self.work)
            .output()
            .expect("spawn git")
    }

    /// Write `name`, stage it and commit; returns the new commit hash
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> String {
        let path = self.work.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, content).expect("write file");
        self.git(&["add", name]);
        self.git(&["commit", "--quiet", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    /// Create `branch` from the current HEAD, check it out and commit `messages`
    pub fn feature_branch(&self, branch: &str, messages: &[&str]) -> Vec<String> {
        self.git(&["checkout", "--quiet", "-b", branch]);
        messages
            .iter()
            .enumerate()
            .map(|(i, message)| {
                let file = format!("{}-{i}.txt", branch.replace('/', "-"));
                self.commit_file(&file, &format!("{message}\n"), message)
            })
            .collect()
    }

    /// Push `branch` to origin
    pub fn push(&self, branch: &str) {
        self.git(&["push", "--quiet", "origin", branch]);
    }

    /// Push `branch` with `messages` from a second clone of origin
    ///
    /// The working clone never fetches it, so only `ls-remote` can see it.
    pub fn push_from_other_clone(&self, branch: &str, messages: &[&str]) {
        let parent = self.work.parent().expect("temp dir parent");
        let other = parent.join(format!("other-{}", branch.replace('/', "-")));
        run_git(
            parent,
            &["clone", "--quiet", path_str(&self.origin), path_str(&other)],
        );
        run_git(&other, &["config", "user.name", "Other Author"]);
        run_git(&other, &["config", "user.email", "other@example.com"]);
        run_git(&other, &["config", "commit.gpgsign", "false"]);
        run_git(&other, &["checkout", "--quiet", "-b", branch]);
        for (i, message) in messages.iter().enumerate() {
            let file = format!("{}-{i}.txt", branch.replace('/', "-"));
            fs::write(other.join(&file), format!("{message}\n")).expect("write file");
            run_git(&other, &["add", &file]);
            run_git(&other, &["commit", "--quiet", "-m", message]);
        }
        run_git(&other, &["push", "--quiet", "origin", branch]);
    }

    /// Whether the working clone has a remote-tracking ref for `branch`
    pub fn has_tracking_ref(&self, branch: &str) -> bool {
        self.try_git(&[
            "rev-parse",
            "--verify",
            "--quiet",
            &format!("refs/remotes/origin/{branch}"),
        ])
        .status
        .success()
    }

    /// Local tip of `branch`
    pub fn branch_tip(&self, branch: &str) -> String {
        self.git(&["rev-parse", &format!("refs/heads/{branch}")])
    }

    /// Tip of `branch` in the bare origin
    pub fn remote_tip(&self, branch: &str) -> String {
        run_git(&self.origin, &["rev-parse", &format!("refs/heads/{branch}")])
    }

    /// Checked-out branch
    pub fn current_branch(&self) -> String {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Local branch names
    pub fn branches(&self) -> Vec<String> {
        lines(&self.git(&["for-each-ref", "--format=%(refname:short)", "refs/heads"]))
    }

    /// Local tag names
    pub fn tags(&self) -> Vec<String> {
        lines(&self.git(&["tag", "--list"]))
    }

    /// Full messages of `base..head`, oldest first
    pub fn messages(&self, base: &str, head: &str) -> Vec<String> {
        self.git(&[
            "log",
            "--reverse",
            "--format=%B%x00",
            &format!("{base}..{head}"),
        ])
        .split('\0')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(ToString::to_string)
        .collect()
    }

    /// Number of commits in `base..head`
    pub fn count(&self, base: &str, head: &str) -> usize {
        self.git(&["rev-list", "--count", &format!("{base}..{head}")])
            .parse()
            .expect("numeric count")
    }

    /// Make every push to origin fail
    pub fn reject_pushes(&self) {
        install_hook(
            &self.origin.join("hooks"),
            "pre-receive",
            "#!/bin/sh\necho 'pushes are frozen' >&2\nexit 1\n",
        );
    }

    /// Make every local `git commit` fail
    pub fn fail_commits(&self) {
        install_hook(
            &self.git_dir().join("hooks"),
            "commit-msg",
            "#!/bin/sh\necho 'commit rejected by hook' >&2\nexit 1\n",
        );
    }

    /// Write an untracked file so the tree is dirty
    pub fn make_dirty(&self) {
        fs::write(self.work.join("scratch.txt"), "wip\n").expect("write scratch file");
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn run_git(cwd: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn install_hook(dir: &Path, name: &str, script: &str) {
    fs::create_dir_all(dir).expect("create hooks dir");
    let path = dir.join(name);
    fs::write(&path, script).expect("write hook");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod hook");
}

fn lines(out: &str) -> Vec<String> {
    out.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}
