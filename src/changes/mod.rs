//! Change-set extraction
//!
//! Collects the commits and diff between a review baseline (`target`, which
//! must exist on the remote) and a working branch (`current`, local or
//! remote), and persists them as one text artifact.

mod scratch;

pub use scratch::ScratchDir;

use crate::attempt::attempt;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::{GitRepo, LogOptions, LogFormat, RefResolver};
use crate::types::{ChangeBundle, ChangesFile, RefScope};
use chrono::Utc;
use tracing::info;

/// Placeholder when `diff --stat` is empty
pub const NO_DIFF: &str = "No diff available";

/// Placeholder when the full diff is empty or failed
pub const NO_CODE_DIFF: &str = "No code diff available";

/// Separator between commits in the rendered artifact
pub const COMMIT_SEPARATOR: &str = "\n---\n";

/// Build the change bundle for `target..current` and write it to the scratch folder
pub async fn generate_change_bundle(
    repo: &GitRepo,
    config: &Config,
    target: &str,
    current: &str,
) -> Result<ChangesFile> {
    let resolver = RefResolver::new(repo, config);

    let head_scope = resolver
        .locate(current, &[RefScope::Local, RefScope::Remote])
        .await
        .ok_or_else(|| Error::RefNotFound(current.to_string()))?;
    if !resolver.exists(target, RefScope::Remote).await {
        return Err(Error::RefNotFound(format!("{}/{target}", config.remote)));
    }

    repo.fetch(target).await?;
    resolver.materialize(current, head_scope).await?;

    let options = LogOptions::new(LogFormat::Messages).scopes(RefScope::Remote, head_scope);
    let commit_messages = repo.messages_between(target, current, options).await?;

    let base_ref = repo.qualify(target, RefScope::Remote);
    let head_ref = repo.qualify(current, head_scope);

    let stat = repo.diff(&base_ref, &head_ref, true).await?;
    let diff_summary = if stat.trim().is_empty() {
        NO_DIFF.to_string()
    } else {
        stat
    };

    let full_diff = attempt("full diff", repo.diff(&base_ref, &head_ref, false))
        .await
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| NO_CODE_DIFF.to_string());

    let bundle = ChangeBundle {
        commit_messages,
        diff_summary,
        full_diff,
    };

    let name = format!("changes-{}.md", Utc::now().format("%Y%m%d%H%M%S%3f"));
    let path = ScratchDir::for_repo(repo)
        .write_chunks(&name, render_sections(&bundle))
        .await?;

    info!(
        path = %path.display(),
        commits = bundle.commit_messages.len(),
        "change bundle written"
    );
    Ok(ChangesFile { path, bundle })
}

/// Rendered artifact sections in write order
pub fn render_sections(bundle: &ChangeBundle) -> [String; 3] {
    let commits = if bundle.commit_messages.is_empty() {
        "(no commits)".to_string()
    } else {
        bundle.commit_messages.join(COMMIT_SEPARATOR)
    };
    [
        format!("## Commits\n\n{commits}\n\n"),
        format!("## Diff Summary\n\n{}\n\n", bundle.diff_summary.trim_end()),
        format!("## Code Diff\n\n```diff\n{}\n```\n", bundle.full_diff.trim_end()),
    ]
}

/// Whole artifact as one string
pub fn render_bundle(bundle: &ChangeBundle) -> String {
    render_sections(bundle).concat()
}
