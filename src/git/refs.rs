//! Reference resolution across local and remote scopes
//!
//! Existence checks are predicates: every underlying failure (missing repo,
//! unreachable remote, malformed name) collapses to `false`.

use crate::config::Config;
use crate::error::Result;
use crate::git::GitRepo;
use crate::types::RefScope;
use std::path::Path;
use tracing::debug;

/// Decides where a named branch can be found
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    repo: &'a GitRepo,
    remote: &'a str,
}

impl<'a> RefResolver<'a> {
    /// Resolver over `repo`, using the configured remote
    pub fn new(repo: &'a GitRepo, config: &'a Config) -> Self {
        Self {
            repo,
            remote: &config.remote,
        }
    }

    /// Whether `name` exists in `scope` on the configured remote
    pub async fn exists(&self, name: &str, scope: RefScope) -> bool {
        self.exists_on(name, scope, self.remote).await
    }

    /// Whether `name` exists in `scope`, using `remote` for remote lookups
    pub async fn exists_on(&self, name: &str, scope: RefScope, remote: &str) -> bool {
        let found = match scope {
            RefScope::Local => self.local_exists(name).await,
            RefScope::Remote => self.remote_exists(name, remote).await,
            RefScope::Any => {
                self.local_exists(name).await || self.remote_exists(name, remote).await
            }
        };
        debug!(name, %scope, remote, found, "ref lookup");
        found
    }

    /// First scope in `order` where `name` exists
    ///
    /// `RefScope::Any` entries are answered as [`RefScope::Local`] or
    /// [`RefScope::Remote`] so the result can be used to qualify the name.
    pub async fn locate(&self, name: &str, order: &[RefScope]) -> Option<RefScope> {
        for &scope in order {
            match scope {
                RefScope::Any => {
                    if self.local_exists(name).await {
                        return Some(RefScope::Local);
                    }
                    if self.remote_exists(name, self.remote).await {
                        return Some(RefScope::Remote);
                    }
                }
                concrete => {
                    if self.exists(name, concrete).await {
                        return Some(concrete);
                    }
                }
            }
        }
        None
    }

    /// Make `name` readable at `scope`
    ///
    /// Remote lookups ask the server directly, but logs and diffs read the
    /// remote-tracking ref, which only exists after a fetch.
    pub async fn materialize(&self, name: &str, scope: RefScope) -> Result<()> {
        if scope == RefScope::Remote {
            debug!(name, remote = self.remote, "fetching remote-only ref");
            self.repo.fetch(name).await?;
        }
        Ok(())
    }

    async fn local_exists(&self, name: &str) -> bool {
        let full_name = local_ref_name(name);
        let git_dir = self.repo.git_dir().to_path_buf();
        tokio::task::spawn_blocking(move || find_local_ref(&git_dir, &full_name))
            .await
            .unwrap_or(false)
    }

    async fn remote_exists(&self, name: &str, remote: &str) -> bool {
        let full_name = local_ref_name(name);
        let Ok(out) = self
            .repo
            .command()
            .args(["ls-remote", "--heads", remote, full_name.as_str()])
            .run()
            .await
        else {
            return false;
        };
        out.lines()
            .filter_map(|line| line.split_whitespace().nth(1))
            .any(|r| r == full_name)
    }
}

/// `refs/heads/<name>` unless `name` is already a full ref
fn local_ref_name(name: &str) -> String {
    if name.starts_with("refs/") {
        name.to_string()
    } else {
        format!("refs/heads/{name}")
    }
}

fn find_local_ref(git_dir: &Path, full_name: &str) -> bool {
    let Ok(repo) = gix::open(git_dir) else {
        return false;
    };
    matches!(repo.try_find_reference(full_name), Ok(Some(_)))
}
