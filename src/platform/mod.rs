//! Remote PR gateway
//!
//! One capability interface with two interchangeable implementations: the
//! `gh` CLI ([`GhCliGateway`]) and the GitHub REST API ([`GitHubApiGateway`]).
//! [`create_gateway`] picks one from [`Config::gateway`](crate::config::Config).

mod detection;
mod factory;
mod gh_cli;
mod github;

pub use detection::{is_github_remote, parse_pr_number, parse_repo_info};
pub use factory::create_gateway;
pub use gh_cli::GhCliGateway;
pub use github::GitHubApiGateway;

use crate::error::Result;
use crate::types::{NewPullRequest, PrDetails, PrField, PrSummary};
use async_trait::async_trait;
use std::path::Path;

/// Pull request operations used by the workflow
#[async_trait]
pub trait PrGateway: Send + Sync {
    /// Open PRs from `head` into `base`
    async fn list(&self, base: &str, head: &str) -> Result<Vec<PrSummary>>;

    /// Requested fields of PR `number`, or `None` if it does not exist
    async fn view(&self, number: u64, fields: &[PrField]) -> Result<Option<PrDetails>>;

    /// Replace title and body of PR `number`
    async fn edit(&self, number: u64, title: &str, body_file: &Path) -> Result<()>;

    /// Open a PR and return its URL
    async fn create(&self, request: &NewPullRequest<'_>) -> Result<String>;
}
