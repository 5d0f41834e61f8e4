//! PR preparation and submission

use crate::attempt::attempt;
use crate::changes::{ScratchDir, generate_change_bundle};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::{GitRepo, PushOptions, RefResolver};
use crate::platform::{PrGateway, parse_pr_number};
use crate::types::{NewPullRequest, PrDetails, PrField, RefScope};
use crate::workflow::card_link::{CardLinker, push_unique};
use crate::workflow::numbered;
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const PR_TEMPLATE_NAME: &str = "pull_request_template.md";

/// Input of [`prepare_pr`]
#[derive(Debug, Clone, Copy)]
pub struct PreparePrRequest<'a> {
    /// Branch the PR merges into
    pub target_branch: &'a str,
    /// Branch holding the changes
    pub current_branch: &'a str,
    /// Card link supplied by the caller
    pub card_link: Option<&'a str>,
}

/// Result of [`prepare_pr`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparePrOutput {
    /// Open PR from current into target, if any
    pub pr_number: Option<u64>,
    /// PR template path relative to the repository root
    pub pr_template: Option<String>,
    /// Generated files the caller should read
    pub files_to_read: Vec<PathBuf>,
    /// Card links from input, branch name and existing PR
    pub card_links: Vec<String>,
    /// Preferred language for the PR text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Numbered steps for the caller
    pub next_actions: Vec<String>,
}

/// Gather everything needed to write or update a PR
pub async fn prepare_pr(
    repo: &GitRepo,
    config: &Config,
    gateway: &dyn PrGateway,
    request: PreparePrRequest<'_>,
) -> Result<PreparePrOutput> {
    let PreparePrRequest {
        target_branch: target,
        current_branch: current,
        card_link,
    } = request;
    if target.trim().is_empty() || current.trim().is_empty() {
        return Err(Error::InvalidInput(
            "targetBranch and currentBranch are required".to_string(),
        ));
    }

    let linker = CardLinker::new(&config.card_links)?;
    let scratch = ScratchDir::for_repo(repo);
    let pr_template = find_pr_template(repo.root()).await;

    let pr_number = gateway.list(target, current).await?.first().map(|p| p.number);
    let mut existing: Option<PrDetails> = None;
    let mut pr_content_file = None;
    if let Some(number) = pr_number {
        existing = gateway
            .view(number, &[PrField::Title, PrField::Body])
            .await?;
        if let Some(pr) = &existing {
            let content = format!("Title: {}\n\n{}", pr.title, pr.body);
            pr_content_file = Some(
                scratch
                    .write(&format!("pr-content-{number}.md"), &content)
                    .await?,
            );
        }
    }

    ensure_local_target(repo, config, target).await?;
    let changes = generate_change_bundle(repo, config, target, current).await?;

    let mut card_links = Vec::new();
    if let Some(link) = card_link {
        push_unique(&mut card_links, link.trim().to_string());
    }
    if let Some(link) = linker.infer(current) {
        push_unique(&mut card_links, link);
    }
    if let Some(pr) = &existing {
        for link in linker.extract(&format!("{}\n{}", pr.title, pr.body)) {
            push_unique(&mut card_links, link);
        }
    }

    let mut files_to_read = vec![changes.path];
    files_to_read.extend(pr_content_file);

    let mut actions = vec!["Read the filesToRead files for context".to_string()];
    if pr_template.is_some() {
        actions.push("Use prTemplate as the PR body template".to_string());
    }
    if !card_links.is_empty() {
        actions.push(
            "Fetch the cardLinks details with an available card/ticket tool before writing anything"
                .to_string(),
        );
    }
    actions.push(
        "Write the PR title and body from the gathered information, following the template structure"
            .to_string(),
    );
    actions.push(
        "Show the user the title and full body as a code block and wait for confirmation; apply requested changes and show them again"
            .to_string(),
    );
    actions.push(match pr_number {
        Some(n) => format!("Run submit-pr with prNumber {n} to update the existing PR"),
        None => "Run submit-pr to open the PR".to_string(),
    });

    info!(target, current, pr = ?pr_number, "PR prepared");
    Ok(PreparePrOutput {
        pr_number,
        pr_template,
        files_to_read,
        card_links,
        language: config.language.clone(),
        next_actions: numbered(actions),
    })
}

/// `.github/pull_request_template.md`, matched case-insensitively
async fn find_pr_template(root: &Path) -> Option<String> {
    let mut entries = tokio::fs::read_dir(root.join(".github")).await.ok()?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.eq_ignore_ascii_case(PR_TEMPLATE_NAME) {
            return Some(format!(".github/{name}"));
        }
    }
    None
}

/// Make sure `target` exists locally, creating it from the remote if needed
async fn ensure_local_target(repo: &GitRepo, config: &Config, target: &str) -> Result<()> {
    let resolver = RefResolver::new(repo, config);
    let local = resolver.exists(target, RefScope::Local).await;
    let remote = resolver.exists(target, RefScope::Remote).await;
    if !local && !remote {
        return Err(Error::RefNotFound(target.to_string()));
    }
    if remote {
        repo.fetch(target).await?;
        if !local {
            repo.create_branch(target, &repo.qualify(target, RefScope::Remote))
                .await?;
        }
    }
    Ok(())
}

/// Input of [`submit_pr`]
#[derive(Debug, Clone, Copy)]
pub struct SubmitPrRequest<'a> {
    /// Existing PR to update; `None` opens a new one
    pub pr_number: Option<u64>,
    /// PR title
    pub title: &'a str,
    /// PR body
    pub body: &'a str,
    /// Branch the PR merges into
    pub target_branch: &'a str,
    /// Branch holding the changes
    pub current_branch: &'a str,
    /// Keep the scratch folder afterwards
    pub keep_scratch: bool,
}

/// Result of [`submit_pr`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPrOutput {
    /// URL of the created or updated PR
    pub pr_url: Option<String>,
    /// Numbered steps for the caller
    pub next_actions: Vec<String>,
}

/// Push the current branch and create or update its PR
pub async fn submit_pr(
    repo: &GitRepo,
    config: &Config,
    gateway: &dyn PrGateway,
    request: SubmitPrRequest<'_>,
) -> Result<SubmitPrOutput> {
    if request.title.trim().is_empty() {
        return Err(Error::InvalidInput("PR title must not be empty".to_string()));
    }
    let current = request.current_branch;

    let resolver = RefResolver::new(repo, config);
    if resolver.exists(current, RefScope::Local).await {
        push_branch(repo, current).await?;
    } else {
        warn!(branch = current, "branch not found locally; skipping push");
    }

    let scratch = ScratchDir::for_repo(repo);
    let body_file = scratch
        .write(
            &format!("pr-body-{}.md", Utc::now().format("%Y%m%d%H%M%S%3f")),
            request.body,
        )
        .await?;

    let result = publish(gateway, &request, &body_file).await;
    if !request.keep_scratch {
        attempt("clear scratch folder", scratch.clear()).await;
    }
    let pr_url = result?;

    let mut actions = Vec::new();
    if let Some(url) = &pr_url {
        actions.push(format!("Share the PR link with the user: {url}"));
    }
    Ok(SubmitPrOutput {
        pr_url,
        next_actions: numbered(actions),
    })
}

async fn publish(
    gateway: &dyn PrGateway,
    request: &SubmitPrRequest<'_>,
    body_file: &Path,
) -> Result<Option<String>> {
    if let Some(number) = request.pr_number {
        let url = gateway
            .view(number, &[PrField::Url])
            .await?
            .map(|pr| pr.url)
            .filter(|url| !url.is_empty());
        gateway.edit(number, request.title, body_file).await?;
        info!(pr = number, "PR updated");
        Ok(url)
    } else {
        let url = gateway
            .create(&NewPullRequest {
                base: request.target_branch,
                head: request.current_branch,
                title: request.title,
                body_file,
            })
            .await?;
        info!(url = %url, "PR created");
        Ok(Some(url))
    }
}

/// Push `branch` to the same name on the remote, setting upstream on retry
async fn push_branch(repo: &GitRepo, branch: &str) -> Result<()> {
    let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
    if let Err(first) = repo.push(&refspec, PushOptions::default()).await {
        warn!(branch, error = %first, "push failed; retrying with --set-upstream");
        repo.push(
            &refspec,
            PushOptions {
                set_upstream: true,
                ..PushOptions::default()
            },
        )
        .await
        .map_err(|e| Error::PushRejected {
            branch: branch.to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

/// Input of [`update_pr_by_link`]
#[derive(Debug, Clone, Copy)]
pub struct UpdatePrByLinkRequest<'a> {
    /// PR URL, e.g. `https://github.com/o/r/pull/12`
    pub pr_url: &'a str,
    /// Card link supplied by the caller
    pub card_link: Option<&'a str>,
}

/// Result of [`update_pr_by_link`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrByLinkOutput {
    /// Head branch of the PR
    pub current_branch: String,
    /// Base branch of the PR
    pub target_branch: String,
    /// Output of the prepare step
    #[serde(flatten)]
    pub prepared: PreparePrOutput,
}

/// Prepare an update for the PR behind `pr_url`
pub async fn update_pr_by_link(
    repo: &GitRepo,
    config: &Config,
    gateway: &dyn PrGateway,
    request: UpdatePrByLinkRequest<'_>,
) -> Result<UpdatePrByLinkOutput> {
    let number = parse_pr_number(request.pr_url)
        .ok_or_else(|| Error::InvalidInput(format!("not a PR URL: {}", request.pr_url)))?;

    let pr = gateway
        .view(number, &[PrField::HeadRefName, PrField::BaseRefName])
        .await?
        .ok_or_else(|| Error::Platform(format!("PR #{number} not found")))?;
    let (Some(current_branch), Some(target_branch)) = (pr.head_ref_name, pr.base_ref_name) else {
        return Err(Error::Platform(format!(
            "PR #{number} did not report its head and base branches"
        )));
    };

    let prepared = prepare_pr(
        repo,
        config,
        gateway,
        PreparePrRequest {
            target_branch: &target_branch,
            current_branch: &current_branch,
            card_link: request.card_link,
        },
    )
    .await?;

    Ok(UpdatePrByLinkOutput {
        current_branch,
        target_branch,
        prepared,
    })
}
