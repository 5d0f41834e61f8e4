//! Branch detection and creation

use crate::attempt::attempt;
use crate::config::{BranchType, Config};
use crate::error::{Error, Result};
use crate::git::{CheckoutOptions, GitRepo, RefResolver};
use crate::types::RefScope;
use crate::workflow::card_link::CardLinker;
use crate::workflow::numbered;
use serde::Serialize;
use tracing::{debug, info};

/// Result of [`detect_branches`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectBranchesOutput {
    /// Checked-out branch
    pub current_branch: String,
    /// Proposed PR target
    pub suggested_target: String,
    /// Card link inferred from the current branch name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inferred_card_link: Option<String>,
    /// Numbered steps for the caller
    pub next_actions: Vec<String>,
}

/// Work out the current branch and a sensible PR target
///
/// Without `target`, the suggestion is the local branch closest to the
/// current one (fewest commits between their merge-base and the current tip),
/// falling back to the homologation branch.
pub async fn detect_branches(
    repo: &GitRepo,
    config: &Config,
    target: Option<&str>,
) -> Result<DetectBranchesOutput> {
    let current_branch = repo.current_branch().await?;
    let linker = CardLinker::new(&config.card_links)?;

    let suggested_target = match target {
        Some(t) => t.to_string(),
        None => closest_branch(repo, &current_branch)
            .await
            .unwrap_or_else(|| config.branch_schema.homologation.clone()),
    };
    let inferred_card_link = linker.infer(&current_branch);

    let mut actions = Vec::new();
    if target.is_none() {
        actions.push(format!(
            "Confirm with the user that '{suggested_target}' is the target branch for '{current_branch}'"
        ));
    }
    if let Some(link) = &inferred_card_link {
        actions.push(format!("Confirm the card link inferred from the branch name: {link}"));
    }
    actions.push(format!(
        "Run prepare-pr with targetBranch '{suggested_target}' and currentBranch '{current_branch}'"
    ));

    Ok(DetectBranchesOutput {
        current_branch,
        suggested_target,
        inferred_card_link,
        next_actions: numbered(actions),
    })
}

async fn closest_branch(repo: &GitRepo, current: &str) -> Option<String> {
    let branches = attempt("list local branches", repo.local_branches()).await?;
    let mut best: Option<(usize, String)> = None;

    for branch in branches.into_iter().filter(|b| b != current) {
        let Some(base) = attempt("merge-base", repo.merge_base(current, &branch)).await else {
            continue;
        };
        let Some(distance) = attempt("rev-list count", repo.rev_list_count(&base, current)).await
        else {
            continue;
        };
        debug!(branch = %branch, distance, "candidate target");
        if distance > 0 && best.as_ref().is_none_or(|(d, _)| distance < *d) {
            best = Some((distance, branch));
        }
    }

    best.map(|(_, branch)| branch)
}

/// Result of [`create_branch`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchOutput {
    /// Name of the new branch
    pub branch_name: String,
    /// Branch it was cut from
    pub base_branch: String,
}

/// Create and check out `<type>/<suffix>` from the right base branch
pub async fn create_branch(
    repo: &GitRepo,
    config: &Config,
    branch_type: BranchType,
    suffix: &str,
    base: Option<&str>,
) -> Result<CreateBranchOutput> {
    let suffix = normalize_suffix(suffix);
    if suffix.is_empty() {
        return Err(Error::InvalidInput("branch suffix must not be empty".to_string()));
    }
    let branch_name = format!("{branch_type}/{suffix}");
    let base_branch = base.map_or_else(
        || config.origin_branch(branch_type).to_string(),
        ToString::to_string,
    );

    repo.try_fetch(&[base_branch.as_str()]).await;

    let resolver = RefResolver::new(repo, config);
    let scope = resolver
        .locate(&base_branch, &[RefScope::Remote, RefScope::Local])
        .await
        .ok_or_else(|| Error::RefNotFound(base_branch.clone()))?;
    let start_point = repo.qualify(&base_branch, scope);

    repo.checkout_branch(
        &branch_name,
        CheckoutOptions {
            create: true,
            start_point: Some(&start_point),
            ..CheckoutOptions::default()
        },
    )
    .await?;
    info!(branch = %branch_name, base = %start_point, "branch created");

    Ok(CreateBranchOutput {
        branch_name,
        base_branch,
    })
}

/// Trim, collapse whitespace runs to `-`, lowercase
fn normalize_suffix(suffix: &str) -> String {
    suffix
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
