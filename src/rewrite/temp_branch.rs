//! Scratch branch guard

use crate::attempt::{attempt, attempt_sync};
use crate::error::Result;
use crate::git::{CheckoutOptions, GitRepo};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// A checked-out scratch branch that is always deleted
///
/// Call [`TempBranch::discard`] on every exit path. If the guard is dropped
/// without it (a panic mid-rewrite), `Drop` falls back to blocking git calls.
#[derive(Debug)]
pub struct TempBranch {
    name: String,
    root: PathBuf,
    return_to: String,
    armed: bool,
}

impl TempBranch {
    /// Create `name` at `start_point` and check it out
    ///
    /// `return_to` is checked out again if the guard has to remove the
    /// branch while it is still checked out.
    pub async fn create(
        repo: &GitRepo,
        name: String,
        start_point: &str,
        return_to: String,
    ) -> Result<Self> {
        repo.checkout_branch(
            &name,
            CheckoutOptions {
                create: true,
                start_point: Some(start_point),
                ..CheckoutOptions::default()
            },
        )
        .await?;
        debug!(branch = %name, start_point, "scratch branch created");
        Ok(Self {
            name,
            root: repo.root().to_path_buf(),
            return_to,
            armed: true,
        })
    }

    /// Branch name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delete the branch, leaving it first if it is checked out
    pub async fn discard(mut self, repo: &GitRepo) {
        self.armed = false;
        let on_branch = repo
            .current_branch()
            .await
            .is_ok_and(|b| b == self.name);
        if on_branch {
            attempt(
                "leave scratch branch",
                repo.checkout_branch(&self.return_to, CheckoutOptions::default()),
            )
            .await;
        }
        if attempt("delete scratch branch", repo.delete_branch(&self.name))
            .await
            .is_some()
        {
            debug!(branch = %self.name, "scratch branch deleted");
        }
    }
}

impl Drop for TempBranch {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(branch = %self.name, "scratch branch dropped without cleanup; removing");
        let git = |args: &[&str]| {
            Command::new("git")
                .args(args)
                .current_dir(&self.root)
                .output()
                .map(drop)
        };
        attempt_sync(
            "leave scratch branch",
            git(&["checkout", "--quiet", self.return_to.as_str()]),
        );
        attempt_sync("delete scratch branch", git(&["branch", "-D", self.name.as_str()]));
    }
}
