//! Branch commands - detect-branches and create-branch

use crate::cli::Session;
use crate::cli::output::{emit, print_next_actions};
use crate::cli::style::{Stylize, check};
use anstream::println;
use pr_command::config::BranchType;
use pr_command::error::Result;
use pr_command::workflow::{create_branch, detect_branches};
use std::path::Path;

/// Run the detect-branches command
pub async fn run_detect_branches(path: &Path, json: bool, target: Option<&str>) -> Result<()> {
    let session = Session::open(path).await?;
    let out = detect_branches(&session.repo, &session.config, target).await?;

    emit(json, &out, |out| {
        println!("Current branch: {}", out.current_branch.accent());
        println!("Target branch:  {}", out.suggested_target.accent());
        if let Some(link) = &out.inferred_card_link {
            println!("Card link:      {}", link.muted());
        }
        print_next_actions(&out.next_actions);
    })
}

/// Run the create-branch command
pub async fn run_create_branch(
    path: &Path,
    json: bool,
    branch_type: BranchType,
    suffix: &str,
    base: Option<&str>,
) -> Result<()> {
    let session = Session::open(path).await?;
    let out = create_branch(&session.repo, &session.config, branch_type, suffix, base).await?;

    emit(json, &out, |out| {
        println!(
            "{} Created {} from {}",
            check(),
            out.branch_name.accent(),
            out.base_branch.emphasis()
        );
    })
}
