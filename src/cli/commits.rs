//! Commit inspection commands

use crate::cli::Session;
use crate::cli::output::emit;
use crate::cli::style::{Stylize, bullet};
use anstream::println;
use pr_command::error::Result;
use pr_command::workflow::{get_commit_contents, get_commit_messages};
use std::path::Path;

/// Run the commit-messages command
pub async fn run_commit_messages(
    path: &Path,
    json: bool,
    target: &str,
    current: Option<&str>,
) -> Result<()> {
    let session = Session::open(path).await?;
    let current = session.current_branch(current).await?;
    let out = get_commit_messages(&session.repo, &session.config, &current, target).await?;

    emit(json, &out, |out| {
        if out.commits.is_empty() {
            println!("{}", format!("No commits between {target} and {current}").muted());
            return;
        }
        println!(
            "{} commit(s) in {}..{}",
            out.commits.len().accent(),
            target,
            current.emphasis()
        );
        for message in &out.commits {
            let mut lines = message.lines();
            println!("  {} {}", bullet(), lines.next().unwrap_or_default());
            for line in lines.filter(|l| !l.trim().is_empty()) {
                println!("      {}", line.muted());
            }
        }
    })
}

/// Run the commit-contents command
pub async fn run_commit_contents(
    path: &Path,
    json: bool,
    target: &str,
    current: Option<&str>,
) -> Result<()> {
    let session = Session::open(path).await?;
    let current = session.current_branch(current).await?;
    let out = get_commit_contents(&session.repo, &session.config, &current, target).await?;

    emit(json, &out, |out| {
        println!("Changes written to {}", out.changes_file.display().accent());
    })
}
