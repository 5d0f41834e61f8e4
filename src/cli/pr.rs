//! PR commands - prepare-pr, submit-pr and update-pr

use crate::cli::output::{emit, print_next_actions};
use crate::cli::style::{Stream, Stylize, bullet, check, hyperlink_url};
use crate::cli::{Session, TextSource};
use anstream::println;
use pr_command::error::Result;
use pr_command::platform::create_gateway;
use pr_command::workflow::{
    PreparePrOutput, PreparePrRequest, SubmitPrRequest, UpdatePrByLinkRequest, prepare_pr,
    submit_pr, update_pr_by_link,
};
use std::path::Path;

/// Arguments of the submit-pr command
pub struct SubmitArgs {
    pub target: String,
    pub current: Option<String>,
    pub title: String,
    pub body: TextSource,
    pub pr: Option<u64>,
    pub keep_scratch: bool,
}

/// Run the prepare-pr command
pub async fn run_prepare_pr(
    path: &Path,
    json: bool,
    target: &str,
    current: Option<&str>,
    card_link: Option<&str>,
) -> Result<()> {
    let session = Session::open(path).await?;
    let current = session.current_branch(current).await?;
    let gateway = create_gateway(&session.repo, &session.config).await?;

    let out = prepare_pr(
        &session.repo,
        &session.config,
        gateway.as_ref(),
        PreparePrRequest {
            target_branch: target,
            current_branch: &current,
            card_link,
        },
    )
    .await?;

    emit(json, &out, render_prepared)
}

/// Run the submit-pr command
pub async fn run_submit_pr(path: &Path, json: bool, args: SubmitArgs) -> Result<()> {
    let session = Session::open(path).await?;
    let current = session.current_branch(args.current.as_deref()).await?;
    let body = args.body.read().await?;
    let gateway = create_gateway(&session.repo, &session.config).await?;

    let out = submit_pr(
        &session.repo,
        &session.config,
        gateway.as_ref(),
        SubmitPrRequest {
            pr_number: args.pr,
            title: &args.title,
            body: &body,
            target_branch: &args.target,
            current_branch: &current,
            keep_scratch: args.keep_scratch,
        },
    )
    .await?;

    emit(json, &out, |out| {
        let verb = if args.pr.is_some() { "Updated" } else { "Created" };
        match &out.pr_url {
            Some(url) => println!(
                "{} {verb} PR {}",
                check(),
                hyperlink_url(Stream::Stdout, url).accent()
            ),
            None => println!("{} {verb} PR", check()),
        }
    })
}

/// Run the update-pr command
pub async fn run_update_pr(
    path: &Path,
    json: bool,
    url: &str,
    card_link: Option<&str>,
) -> Result<()> {
    let session = Session::open(path).await?;
    let gateway = create_gateway(&session.repo, &session.config).await?;

    let out = update_pr_by_link(
        &session.repo,
        &session.config,
        gateway.as_ref(),
        UpdatePrByLinkRequest {
            pr_url: url,
            card_link,
        },
    )
    .await?;

    emit(json, &out, |out| {
        println!(
            "PR branches: {} → {}",
            out.current_branch.accent(),
            out.target_branch.accent()
        );
        render_prepared(&out.prepared);
    })
}

fn render_prepared(out: &PreparePrOutput) {
    match out.pr_number {
        Some(n) => println!("Existing PR: {}", format!("#{n}").accent()),
        None => println!("Existing PR: {}", "none".muted()),
    }
    if let Some(template) = &out.pr_template {
        println!("Template:    {}", template.emphasis());
    }
    if let Some(language) = &out.language {
        println!("Language:    {language}");
    }
    println!("Files to read:");
    for file in &out.files_to_read {
        println!("  {} {}", bullet(), file.display());
    }
    if !out.card_links.is_empty() {
        println!("Card links:");
        for link in &out.card_links {
            println!("  {} {}", bullet(), hyperlink_url(Stream::Stdout, link));
        }
    }
    print_next_actions(&out.next_actions);
}
